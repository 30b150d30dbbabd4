//! Camera binding: drives viewport and frustum of a perspective or
//! orthographic camera.
//!
//! ```text
//! IN
//! ├── viewport { offsetX, offsetY, width, height }        INT
//! └── frustum  { nearPlane, farPlane,                     FLOAT
//!                fieldOfView, aspectRatio }                perspective
//!              { nearPlane, farPlane,
//!                leftPlane, rightPlane, bottomPlane, topPlane } orthographic
//! ```
//!
//! Each group is applied as a whole when any of its inputs received a value.

use std::any::Any;

use tracing::trace;

use crate::error::{LogicError, RuntimeError};
use crate::node::{LogicNode, NodeCore, NodeDescriptor};
use crate::property::{Property, PropertySemantics};

use super::{input, mark_applied, pending, ObjectKind, SharedCamera};

const VIEWPORT: usize = 0;
const FRUSTUM: usize = 1;

/// Logic node writing viewport and frustum parameters into a host camera.
pub struct CameraBinding {
    core: NodeCore,
    camera: SharedCamera,
    kind: ObjectKind,
}

impl CameraBinding {
    /// Create a binding whose frustum inputs match the camera's projection.
    ///
    /// Fails with [`LogicError::WrongObjectKind`] if the object reports a
    /// kind other than a camera.
    pub fn new(name: &str, camera: SharedCamera) -> Result<Self, LogicError> {
        let (kind, id) = {
            let camera = camera.lock();
            (camera.object_kind(), camera.object_id())
        };
        if !kind.is_camera() {
            return Err(LogicError::WrongObjectKind {
                object: format!("Scene object {id} bound by '{name}'"),
                expected: "camera",
                found: kind,
            });
        }

        let semantics = PropertySemantics::BindingInput;
        let viewport = Property::structure("viewport", semantics)
            .with_child(Property::with_value("offsetX", semantics, 0))
            .with_child(Property::with_value("offsetY", semantics, 0))
            .with_child(Property::with_value("width", semantics, 16))
            .with_child(Property::with_value("height", semantics, 16));

        let mut frustum = Property::structure("frustum", semantics)
            .with_child(Property::with_value("nearPlane", semantics, 0.1f32))
            .with_child(Property::with_value("farPlane", semantics, 1.0f32));
        if kind == ObjectKind::PerspectiveCamera {
            frustum.add_child(Property::with_value("fieldOfView", semantics, 168.579f32));
            frustum.add_child(Property::with_value("aspectRatio", semantics, 1.0f32));
        } else {
            frustum.add_child(Property::with_value("leftPlane", semantics, -1.0f32));
            frustum.add_child(Property::with_value("rightPlane", semantics, 1.0f32));
            frustum.add_child(Property::with_value("bottomPlane", semantics, -1.0f32));
            frustum.add_child(Property::with_value("topPlane", semantics, 1.0f32));
        }

        let inputs = Property::structure("IN", semantics)
            .with_child(viewport)
            .with_child(frustum);

        Ok(Self {
            core: NodeCore::new(name, inputs, None),
            camera,
            kind,
        })
    }

    pub fn camera(&self) -> &SharedCamera {
        &self.camera
    }

    /// Perspective or orthographic, fixed at construction.
    pub fn camera_kind(&self) -> ObjectKind {
        self.kind
    }

    fn group(&self, index: usize) -> Result<&Property, RuntimeError> {
        self.core
            .inputs()
            .child(index)
            .ok_or_else(|| RuntimeError::new("camera binding inputs are incomplete"))
    }

    fn group_mut(&mut self, index: usize) -> Result<&mut Property, RuntimeError> {
        self.core
            .inputs_mut()
            .child_mut(index)
            .ok_or_else(|| RuntimeError::new("camera binding inputs are incomplete"))
    }

    fn apply_viewport(&self) -> Result<(), RuntimeError> {
        let viewport = self.group(VIEWPORT)?;
        let offset = [input::<i32>(viewport, 0)?, input::<i32>(viewport, 1)?];
        let (width, height) = (input::<i32>(viewport, 2)?, input::<i32>(viewport, 3)?);
        if width <= 0 || height <= 0 {
            return Err(RuntimeError::new(format!(
                "Camera viewport size must be positive! (width: {width}; height: {height})"
            )));
        }
        self.camera
            .lock()
            .set_viewport(offset, [width as u32, height as u32])
    }

    fn apply_frustum(&self) -> Result<(), RuntimeError> {
        let frustum = self.group(FRUSTUM)?;
        let near = input::<f32>(frustum, 0)?;
        let far = input::<f32>(frustum, 1)?;
        let mut camera = self.camera.lock();
        if self.kind == ObjectKind::PerspectiveCamera {
            camera.set_perspective_frustum(input(frustum, 2)?, input(frustum, 3)?, near, far)
        } else {
            camera.set_frustum([
                input(frustum, 2)?,
                input(frustum, 3)?,
                input(frustum, 4)?,
                input(frustum, 5)?,
                near,
                far,
            ])
        }
    }
}

impl LogicNode for CameraBinding {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }

    fn update(&mut self) -> Result<(), RuntimeError> {
        // A group keeps its flags until the camera accepted it, so a failed
        // group is retried on the next pass.
        let viewport = pending(self.group(VIEWPORT)?);
        if !viewport.is_empty() {
            self.apply_viewport()?;
            mark_applied(self.group_mut(VIEWPORT)?, &viewport);
        }

        let frustum = pending(self.group(FRUSTUM)?);
        if !frustum.is_empty() {
            self.apply_frustum()?;
            mark_applied(self.group_mut(FRUSTUM)?, &frustum);
        }

        trace!(
            binding = self.core.name(),
            viewport_changed = !viewport.is_empty(),
            frustum_changed = !frustum.is_empty(),
            "applied camera"
        );
        Ok(())
    }

    fn descriptor(&self) -> NodeDescriptor {
        NodeDescriptor::Camera {
            object: self.camera.lock().object_ref(),
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
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::binding::mock::RecordingCamera;
    use crate::property::PropertyValue;

    fn binding(kind: ObjectKind) -> (CameraBinding, Arc<Mutex<RecordingCamera>>) {
        let camera = Arc::new(Mutex::new(RecordingCamera::new(kind)));
        let binding = CameraBinding::new("cam", camera.clone()).unwrap();
        (binding, camera)
    }

    fn write(binding: &mut CameraBinding, path: &[u32], value: PropertyValue) {
        binding
            .core_mut()
            .inputs_mut()
            .at_path_mut(path)
            .unwrap()
            .set_value(value)
            .unwrap();
    }

    #[test]
    fn frustum_inputs_follow_camera_kind() {
        let (perspective, _) = binding(ObjectKind::PerspectiveCamera);
        let frustum = perspective.inputs().child_by_name("frustum").unwrap();
        assert_eq!(frustum.child_count(), 4);
        assert_eq!(
            frustum.child_by_name("fieldOfView").unwrap().get::<f32>(),
            Ok(168.579)
        );

        let (ortho, _) = binding(ObjectKind::OrthographicCamera);
        let frustum = ortho.inputs().child_by_name("frustum").unwrap();
        assert_eq!(frustum.child_count(), 6);
        assert_eq!(frustum.child_by_name("leftPlane").unwrap().get::<f32>(), Ok(-1.0));

        let viewport = ortho.inputs().child_by_name("viewport").unwrap();
        assert_eq!(viewport.child_by_name("width").unwrap().get::<i32>(), Ok(16));
    }

    #[test]
    fn non_cameras_are_rejected() {
        let node = Arc::new(Mutex::new(RecordingCamera::new(ObjectKind::Node)));
        let err = CameraBinding::new("cam", node).err().unwrap();
        assert_eq!(
            err,
            LogicError::WrongObjectKind {
                object: "Scene object #100 bound by 'cam'".into(),
                expected: "camera",
                found: ObjectKind::Node,
            }
        );
        assert_eq!(
            err.to_string(),
            "Scene object #100 bound by 'cam' is a Node, but a camera is required"
        );
    }

    #[test]
    fn viewport_is_applied_as_a_group() {
        let (mut binding, camera) = binding(ObjectKind::PerspectiveCamera);
        write(&mut binding, &[0, 2], PropertyValue::Int32(640));
        write(&mut binding, &[0, 3], PropertyValue::Int32(480));
        binding.update().unwrap();

        assert_eq!(camera.lock().calls, vec!["viewport [0, 0] [640, 480]".to_string()]);
        // Both flags were consumed by the first update
        camera.lock().calls.clear();
        binding.update().unwrap();
        assert!(camera.lock().calls.is_empty());
    }

    #[test]
    fn non_positive_viewport_fails() {
        let (mut binding, camera) = binding(ObjectKind::OrthographicCamera);
        write(&mut binding, &[0, 2], PropertyValue::Int32(0));
        let err = binding.update().unwrap_err();
        assert_eq!(
            err.message(),
            "Camera viewport size must be positive! (width: 0; height: 16)"
        );
        assert!(camera.lock().calls.is_empty());
    }

    #[test]
    fn orthographic_frustum_passes_all_planes() {
        let (mut binding, camera) = binding(ObjectKind::OrthographicCamera);
        write(&mut binding, &[1, 5], PropertyValue::Float(2.0));
        binding.update().unwrap();
        assert_eq!(
            camera.lock().calls,
            vec!["frustum [-1.0, 1.0, -1.0, 2.0, 0.1, 1.0]".to_string()]
        );
    }

    #[test]
    fn failed_group_is_retried_with_the_other_group() {
        let (mut binding, camera) = binding(ObjectKind::PerspectiveCamera);
        write(&mut binding, &[0, 2], PropertyValue::Int32(0));
        write(&mut binding, &[1, 2], PropertyValue::Float(45.0));
        assert!(binding.update().is_err());
        assert!(camera.lock().calls.is_empty());

        // Fixing the viewport alone must still bring the frustum through
        write(&mut binding, &[0, 2], PropertyValue::Int32(640));
        binding.update().unwrap();
        assert_eq!(
            camera.lock().calls,
            vec![
                "viewport [0, 0] [640, 16]".to_string(),
                "perspective 45 1 0.1 1".to_string(),
            ]
        );

        camera.lock().calls.clear();
        binding.update().unwrap();
        assert!(camera.lock().calls.is_empty());
    }
}
