//! Appearance binding: one input per shader uniform of a host appearance.

use std::any::Any;

use tracing::{debug, warn};

use crate::error::RuntimeError;
use crate::node::{LogicNode, NodeCore, NodeDescriptor};
use crate::property::{Property, PropertySemantics};

use super::{mark_applied, pending, SharedAppearance};

/// Logic node writing uniform values into a host appearance.
///
/// Inputs are created in the order the appearance declares its uniforms.
/// Uniforms without a property counterpart get no input.
pub struct AppearanceBinding {
    core: NodeCore,
    appearance: SharedAppearance,
}

impl AppearanceBinding {
    pub fn new(name: &str, appearance: SharedAppearance) -> Self {
        let semantics = PropertySemantics::BindingInput;
        let mut inputs = Property::structure("IN", semantics);

        for uniform in appearance.lock().uniforms() {
            match uniform.property_type {
                Some(ty) => {
                    inputs.declare(uniform.name, ty);
                }
                None => {
                    warn!(
                        binding = name,
                        uniform = %uniform.name,
                        "skipping uniform with unsupported type"
                    );
                }
            }
        }
        debug!(binding = name, inputs = inputs.child_count(), "created appearance inputs");

        Self {
            core: NodeCore::new(name, inputs, None),
            appearance,
        }
    }

    pub fn appearance(&self) -> &SharedAppearance {
        &self.appearance
    }

    fn apply(&self, index: usize) -> Result<(), RuntimeError> {
        let Some(uniform) = self.core.inputs().child(index) else {
            return Ok(());
        };
        match uniform.value() {
            Some(value) => self.appearance.lock().set_uniform(uniform.name(), value),
            None => Ok(()),
        }
    }
}

impl LogicNode for AppearanceBinding {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }

    fn update(&mut self) -> Result<(), RuntimeError> {
        let fresh = pending(self.core.inputs());
        for (done, &index) in fresh.iter().enumerate() {
            if let Err(err) = self.apply(index) {
                mark_applied(self.core.inputs_mut(), &fresh[..done]);
                return Err(err);
            }
        }
        mark_applied(self.core.inputs_mut(), &fresh);
        Ok(())
    }

    fn descriptor(&self) -> NodeDescriptor {
        NodeDescriptor::Appearance {
            object: self.appearance.lock().object_ref(),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
