//! Scripts
//!
//! Executing script source text is the job of an external runtime. The engine
//! only sees the [`ScriptRuntime`] trait: give it source text and a name, get
//! back a logic node whose trees declare the script's interface.
//!
//! [`NativeScripts`] is a runtime whose "source text" is a key into a table
//! of host-registered [`ScriptProgram`]s. It is enough to run, save and
//! reload graphs without embedding an interpreter.

use std::any::Any;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{LogicError, RuntimeError};
use crate::property::{Property, PropertySemantics};

use super::{LogicNode, NodeCore, NodeDescriptor};

/// Turns script source text into logic nodes.
pub trait ScriptRuntime {
    fn compile(&self, source: &str, name: &str) -> Result<Box<dyn LogicNode>, Vec<LogicError>>;
}

/// A script body: an interface declaration and an update function.
pub trait ScriptProgram {
    /// Declare the script's inputs and outputs under the given roots.
    fn interface(&self, inputs: &mut Property, outputs: &mut Property)
        -> Result<(), RuntimeError>;

    /// Compute the outputs from the inputs.
    fn run(&self, inputs: &Property, outputs: &mut Property) -> Result<(), RuntimeError>;
}

/// A [`ScriptProgram`] made of two closures.
pub struct FnProgram<I, R> {
    interface: I,
    run: R,
}

/// Build a [`ScriptProgram`] from an interface closure and a run closure.
pub fn program_fn<I, R>(interface: I, run: R) -> FnProgram<I, R>
where
    I: Fn(&mut Property, &mut Property),
    R: Fn(&Property, &mut Property) -> Result<(), RuntimeError>,
{
    FnProgram { interface, run }
}

impl<I, R> ScriptProgram for FnProgram<I, R>
where
    I: Fn(&mut Property, &mut Property),
    R: Fn(&Property, &mut Property) -> Result<(), RuntimeError>,
{
    fn interface(
        &self,
        inputs: &mut Property,
        outputs: &mut Property,
    ) -> Result<(), RuntimeError> {
        (self.interface)(inputs, outputs);
        Ok(())
    }

    fn run(&self, inputs: &Property, outputs: &mut Property) -> Result<(), RuntimeError> {
        (self.run)(inputs, outputs)
    }
}

/// Script runtime backed by host-registered programs, keyed by source text.
#[derive(Default, Clone)]
pub struct NativeScripts {
    programs: IndexMap<String, Arc<dyn ScriptProgram>>,
}

impl NativeScripts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a program under the given source text, replacing any
    /// program registered before under the same text.
    pub fn register(
        &mut self,
        source: impl Into<String>,
        program: impl ScriptProgram + 'static,
    ) -> &mut Self {
        self.programs.insert(source.into(), Arc::new(program));
        self
    }

    /// Builder-style variant of [`NativeScripts::register`].
    pub fn with(mut self, source: impl Into<String>, program: impl ScriptProgram + 'static) -> Self {
        self.register(source, program);
        self
    }
}

impl ScriptRuntime for NativeScripts {
    fn compile(&self, source: &str, name: &str) -> Result<Box<dyn LogicNode>, Vec<LogicError>> {
        let Some(program) = self.programs.get(source) else {
            return Err(vec![LogicError::ScriptCompile {
                script: name.to_owned(),
                message: "no program registered for this source".to_owned(),
            }]);
        };
        let node = ScriptNode::new(name, source, Arc::clone(program)).map_err(|err| vec![err])?;
        Ok(Box::new(node))
    }
}

/// A logic node running a [`ScriptProgram`].
///
/// Input root is named `IN`, output root `OUT`.
pub struct ScriptNode {
    core: NodeCore,
    source: String,
    program: Arc<dyn ScriptProgram>,
}

impl ScriptNode {
    pub fn new(
        name: &str,
        source: impl Into<String>,
        program: Arc<dyn ScriptProgram>,
    ) -> Result<Self, LogicError> {
        let mut inputs = Property::structure("IN", PropertySemantics::ScriptInput);
        let mut outputs = Property::structure("OUT", PropertySemantics::ScriptOutput);
        program
            .interface(&mut inputs, &mut outputs)
            .map_err(|err| LogicError::ScriptCompile {
                script: name.to_owned(),
                message: err.message().to_owned(),
            })?;
        debug!(
            script = name,
            inputs = inputs.child_count(),
            outputs = outputs.child_count(),
            "declared script interface"
        );
        Ok(Self {
            core: NodeCore::new(name, inputs, Some(outputs)),
            source: source.into(),
            program,
        })
    }

    /// The source text this script was created from.
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl LogicNode for ScriptNode {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }

    fn update(&mut self) -> Result<(), RuntimeError> {
        let (inputs, outputs) = self.core.split_mut();
        let Some(outputs) = outputs else {
            return Err(RuntimeError::new("script has no output tree"));
        };
        self.program.run(inputs, outputs)
    }

    fn descriptor(&self) -> NodeDescriptor {
        NodeDescriptor::Script {
            source: self.source.clone(),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;
    use crate::property::PropertyType;

    fn doubler() -> impl ScriptProgram {
        program_fn(
            |inputs, outputs| {
                inputs.declare("value", PropertyType::Int32);
                outputs.declare("doubled", PropertyType::Int32);
            },
            |inputs, outputs| {
                let value = inputs
                    .child_by_name("value")
                    .and_then(|p| p.get::<i32>().ok())
                    .unwrap_or_default();
                if let Some(doubled) = outputs.child_by_name_mut("doubled") {
                    doubled
                        .set_output(value * 2)
                        .map_err(|err| RuntimeError::new(err.to_string()))?;
                }
                Ok(())
            },
        )
    }

    #[test]
    fn compile_builds_interface() {
        let runtime = NativeScripts::new().with("double", doubler());
        let node = runtime.compile("double", "d").unwrap();

        assert_eq!(node.name(), "d");
        assert_eq!(node.kind(), NodeKind::Script);
        assert_eq!(node.inputs().name(), "IN");
        assert_eq!(node.outputs().map(Property::name), Some("OUT"));
        assert!(node.inputs().has_child("value"));
        assert_eq!(
            node.descriptor(),
            NodeDescriptor::Script {
                source: "double".into()
            }
        );
    }

    #[test]
    fn unknown_source_fails_to_compile() {
        let runtime = NativeScripts::new();
        let errors = runtime.compile("nope", "s").err().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], LogicError::ScriptCompile { script, .. } if script == "s"));
    }

    #[test]
    fn update_runs_program() {
        let runtime = NativeScripts::new().with("double", doubler());
        let mut node = runtime.compile("double", "d").unwrap();
        node.core_mut()
            .inputs_mut()
            .child_by_name_mut("value")
            .unwrap()
            .set_value(crate::property::PropertyValue::Int32(21))
            .unwrap();

        node.update().unwrap();
        let doubled = node.outputs().unwrap().child_by_name("doubled").unwrap();
        assert_eq!(doubled.get::<i32>(), Ok(42));
    }
}
