//! Logic Nodes
//!
//! A logic node is a unit of computation owned by a logic engine. It owns an
//! input property tree, optionally an output property tree, and a single
//! `update()` operation that reads the inputs and writes the outputs or
//! applies them to an external object.
//!
//! # Node Kinds
//!
//! - Scripts: computations declared by a [`ScriptRuntime`]; they have both
//!   input and output trees.
//! - Bindings: write their inputs into a host scene object; no outputs.
//! - Custom: any other [`LogicNode`] implementation registered by the host.
//!   Custom nodes take part in linking and updating, but cannot be saved.

use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::binding::{ObjectRef, RotationConvention};
use crate::error::RuntimeError;
use crate::property::Property;

mod script;

pub use script::{program_fn, FnProgram, NativeScripts, ScriptNode, ScriptProgram, ScriptRuntime};

/// State shared by every logic node implementation.
#[derive(Debug)]
pub struct NodeCore {
    name: String,
    dirty: bool,
    inputs: Property,
    outputs: Option<Property>,
}

impl NodeCore {
    /// Create the core of a node from its root properties.
    ///
    /// The node starts dirty so it runs on the first update.
    ///
    /// # Panics
    ///
    /// Panics if `inputs` is not an input struct or `outputs` is not an
    /// output struct.
    pub fn new(name: impl Into<String>, inputs: Property, outputs: Option<Property>) -> Self {
        assert!(
            inputs.is_input() && inputs.property_type().can_have_children(),
            "input root must be an input struct"
        );
        if let Some(outputs) = &outputs {
            assert!(
                outputs.is_output() && outputs.property_type().can_have_children(),
                "output root must be an output struct"
            );
        }
        Self {
            name: name.into(),
            dirty: true,
            inputs,
            outputs,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    pub fn inputs(&self) -> &Property {
        &self.inputs
    }

    pub(crate) fn inputs_mut(&mut self) -> &mut Property {
        &mut self.inputs
    }

    pub fn outputs(&self) -> Option<&Property> {
        self.outputs.as_ref()
    }

    pub(crate) fn outputs_mut(&mut self) -> Option<&mut Property> {
        self.outputs.as_mut()
    }

    /// Inputs for reading and outputs for writing at the same time, for use
    /// inside a node's `update()`.
    pub fn split_mut(&mut self) -> (&mut Property, Option<&mut Property>) {
        (&mut self.inputs, self.outputs.as_mut())
    }
}

/// The kind of a logic node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Script,
    TransformBinding,
    CameraBinding,
    AppearanceBinding,
    Custom,
}

impl NodeKind {
    pub fn is_binding(self) -> bool {
        matches!(
            self,
            NodeKind::TransformBinding | NodeKind::CameraBinding | NodeKind::AppearanceBinding
        )
    }
}

/// What is needed, besides the property values, to recreate a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeDescriptor {
    Script {
        source: String,
    },
    Transform {
        object: ObjectRef,
        rotation_convention: RotationConvention,
    },
    Camera {
        object: ObjectRef,
    },
    Appearance {
        object: ObjectRef,
    },
    Custom,
}

impl NodeDescriptor {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeDescriptor::Script { .. } => NodeKind::Script,
            NodeDescriptor::Transform { .. } => NodeKind::TransformBinding,
            NodeDescriptor::Camera { .. } => NodeKind::CameraBinding,
            NodeDescriptor::Appearance { .. } => NodeKind::AppearanceBinding,
            NodeDescriptor::Custom => NodeKind::Custom,
        }
    }
}

/// A unit of computation in the logic graph.
///
/// Implementors only provide access to their [`NodeCore`], the update body
/// and a descriptor; naming, dirtiness and tree access are shared.
pub trait LogicNode: Any {
    fn core(&self) -> &NodeCore;

    fn core_mut(&mut self) -> &mut NodeCore;

    /// Read the inputs and write the outputs or the bound object.
    ///
    /// Called at most once per update pass. A failure is reported to the
    /// caller of the pass and leaves the node dirty.
    fn update(&mut self) -> Result<(), RuntimeError>;

    fn descriptor(&self) -> NodeDescriptor;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn kind(&self) -> NodeKind {
        self.descriptor().kind()
    }

    fn name(&self) -> &str {
        self.core().name()
    }

    fn set_name(&mut self, name: &str) {
        self.core_mut().set_name(name);
    }

    fn is_dirty(&self) -> bool {
        self.core().is_dirty()
    }

    fn set_dirty(&mut self, dirty: bool) {
        self.core_mut().set_dirty(dirty);
    }

    fn inputs(&self) -> &Property {
        self.core().inputs()
    }

    fn outputs(&self) -> Option<&Property> {
        self.core().outputs()
    }
}

impl std::fmt::Debug for dyn LogicNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogicNode")
            .field("name", &self.name())
            .field("kind", &self.kind())
            .field("dirty", &self.is_dirty())
            .finish()
    }
}
