//! Transform binding: drives visibility and transformation of a scene node.

use std::any::Any;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::RuntimeError;
use crate::node::{LogicNode, NodeCore, NodeDescriptor};
use crate::property::{Property, PropertySemantics};

use super::{input, mark_applied, pending, SharedSceneNode};

const VISIBILITY: usize = 0;
const ROTATION: usize = 1;
const TRANSLATION: usize = 2;
const SCALING: usize = 3;

/// Order in which Euler angles are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RotationConvention {
    #[default]
    Xyz,
    Xzy,
    Yxz,
    Yzx,
    Zxy,
    Zyx,
}

/// Logic node writing `visibility`, `rotation`, `translation` and `scaling`
/// into a host scene node.
pub struct TransformBinding {
    core: NodeCore,
    node: SharedSceneNode,
    rotation_convention: RotationConvention,
}

impl TransformBinding {
    pub fn new(name: &str, node: SharedSceneNode, rotation_convention: RotationConvention) -> Self {
        let semantics = PropertySemantics::BindingInput;
        let inputs = Property::structure("IN", semantics)
            .with_child(Property::with_value("visibility", semantics, true))
            .with_child(Property::with_value("rotation", semantics, [0.0f32; 3]))
            .with_child(Property::with_value("translation", semantics, [0.0f32; 3]))
            .with_child(Property::with_value("scaling", semantics, [1.0f32; 3]));

        Self {
            core: NodeCore::new(name, inputs, None),
            node,
            rotation_convention,
        }
    }

    pub fn scene_node(&self) -> &SharedSceneNode {
        &self.node
    }

    pub fn rotation_convention(&self) -> RotationConvention {
        self.rotation_convention
    }

    /// Used for every rotation applied from now on; does not re-apply the
    /// current rotation.
    pub fn set_rotation_convention(&mut self, convention: RotationConvention) {
        self.rotation_convention = convention;
    }

    fn apply(&self, index: usize) -> Result<(), RuntimeError> {
        let inputs = self.core.inputs();
        let mut node = self.node.lock();
        match index {
            VISIBILITY => node.set_visibility(input(inputs, VISIBILITY)?),
            ROTATION => node.set_rotation(input(inputs, ROTATION)?, self.rotation_convention),
            TRANSLATION => node.set_translation(input(inputs, TRANSLATION)?),
            SCALING => node.set_scaling(input(inputs, SCALING)?),
            _ => Ok(()),
        }
    }
}

impl LogicNode for TransformBinding {
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

        trace!(binding = self.core.name(), applied = ?fresh, "applied transform");
        Ok(())
    }

    fn descriptor(&self) -> NodeDescriptor {
        NodeDescriptor::Transform {
            object: self.node.lock().object_ref(),
            rotation_convention: self.rotation_convention,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
