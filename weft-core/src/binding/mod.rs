//! Resource Bindings
//!
//! Bindings are logic nodes whose update writes their inputs into an object
//! of the host's scene: a scene node, a camera or an appearance. They have no
//! outputs, and all their inputs use binding semantics, so every external
//! write is applied on the next update even when the value is unchanged.
//!
//! The host scene is reached only through the traits in this module. Objects
//! are shared with the host as `Arc<Mutex<dyn Trait>>` handles, and are
//! identified across save and load by their [`ObjectId`].

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::RuntimeError;
use crate::property::{Primitive, Property, PropertyType, PropertyValue};

mod appearance;
mod camera;
mod transform;

pub use appearance::AppearanceBinding;
pub use camera::CameraBinding;
pub use transform::{RotationConvention, TransformBinding};

/// Host-assigned identity of a scene object, stable across save and load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The kind of a scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Node,
    PerspectiveCamera,
    OrthographicCamera,
    Appearance,
}

impl ObjectKind {
    pub fn is_camera(self) -> bool {
        matches!(
            self,
            ObjectKind::PerspectiveCamera | ObjectKind::OrthographicCamera
        )
    }
}

/// Reference to a bound scene object as stored in saved graphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    pub id: ObjectId,
    pub kind: ObjectKind,
}

/// Common surface of every bindable scene object.
pub trait SceneObject {
    fn object_id(&self) -> ObjectId;

    fn object_kind(&self) -> ObjectKind;

    fn object_ref(&self) -> ObjectRef {
        ObjectRef {
            id: self.object_id(),
            kind: self.object_kind(),
        }
    }
}

/// A node of the host scene with a transformation and visibility.
pub trait SceneNode: SceneObject {
    fn set_visibility(&mut self, visible: bool) -> Result<(), RuntimeError>;

    fn set_rotation(
        &mut self,
        rotation: [f32; 3],
        convention: RotationConvention,
    ) -> Result<(), RuntimeError>;

    fn set_translation(&mut self, translation: [f32; 3]) -> Result<(), RuntimeError>;

    fn set_scaling(&mut self, scaling: [f32; 3]) -> Result<(), RuntimeError>;
}

/// A camera of the host scene.
///
/// Its [`ObjectKind`] tells whether it uses a perspective or an orthographic
/// frustum.
pub trait Camera: SceneObject {
    fn set_viewport(&mut self, offset: [i32; 2], size: [u32; 2]) -> Result<(), RuntimeError>;

    fn set_perspective_frustum(
        &mut self,
        field_of_view: f32,
        aspect_ratio: f32,
        near_plane: f32,
        far_plane: f32,
    ) -> Result<(), RuntimeError>;

    /// Planes in the order left, right, bottom, top, near, far.
    fn set_frustum(&mut self, planes: [f32; 6]) -> Result<(), RuntimeError>;
}

/// A uniform input declared by an appearance's shader.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformDecl {
    pub name: String,
    /// `None` when the uniform's type has no property counterpart.
    pub property_type: Option<PropertyType>,
}

impl UniformDecl {
    pub fn new(name: impl Into<String>, property_type: Option<PropertyType>) -> Self {
        Self {
            name: name.into(),
            property_type,
        }
    }
}

/// A material of the host scene exposing shader uniforms.
pub trait Appearance: SceneObject {
    fn uniforms(&self) -> Vec<UniformDecl>;

    fn set_uniform(&mut self, name: &str, value: &PropertyValue) -> Result<(), RuntimeError>;
}

pub type SharedSceneNode = Arc<Mutex<dyn SceneNode>>;
pub type SharedCamera = Arc<Mutex<dyn Camera>>;
pub type SharedAppearance = Arc<Mutex<dyn Appearance>>;

/// Finds the scene objects of saved bindings while loading.
///
/// Each call receives the saved binding's name and the saved object id.
pub trait ResourceResolver {
    fn find_scene_node(&self, binding: &str, id: ObjectId) -> Option<SharedSceneNode>;

    fn find_camera(&self, binding: &str, id: ObjectId) -> Option<SharedCamera>;

    fn find_appearance(&self, binding: &str, id: ObjectId) -> Option<SharedAppearance>;
}

/// Resolver for graphs that contain no bindings.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoResources;

impl ResourceResolver for NoResources {
    fn find_scene_node(&self, _binding: &str, _id: ObjectId) -> Option<SharedSceneNode> {
        None
    }

    fn find_camera(&self, _binding: &str, _id: ObjectId) -> Option<SharedCamera> {
        None
    }

    fn find_appearance(&self, _binding: &str, _id: ObjectId) -> Option<SharedAppearance> {
        None
    }
}

/// Positions of the children of `group` holding a value not yet applied.
fn pending(group: &Property) -> Vec<usize> {
    group
        .children()
        .enumerate()
        .filter(|(_, child)| child.has_new_value())
        .map(|(index, _)| index)
        .collect()
}

/// Clear the new-value flags of `indices` once the host accepted them.
/// Flags of inputs that were not applied stay set for the next pass.
fn mark_applied(group: &mut Property, indices: &[usize]) {
    for &index in indices {
        if let Some(child) = group.child_mut(index) {
            child.consume_new_value();
        }
    }
}

/// Typed read of a binding input, as seen from inside `update()`.
fn input<T: Primitive>(group: &Property, index: usize) -> Result<T, RuntimeError> {
    group
        .child(index)
        .ok_or_else(|| RuntimeError::new(format!("missing input {index} of '{}'", group.name())))?
        .get::<T>()
        .map_err(|err| RuntimeError::new(err.to_string()))
}
