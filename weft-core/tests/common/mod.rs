//! Shared fixtures for the integration tests: recording scene objects, a
//! resolver over them and a small set of native scripts.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use weft_core::binding::{SharedAppearance, SharedCamera, SharedSceneNode};
use weft_core::prelude::*;

#[derive(Debug, Default)]
pub struct MockNode {
    pub id: u64,
    pub visible: Option<bool>,
    pub translation: Option<[f32; 3]>,
    pub rotation: Option<[f32; 3]>,
    pub convention: Option<RotationConvention>,
    pub scaling: Option<[f32; 3]>,
}

impl MockNode {
    pub fn shared(id: u64) -> Arc<Mutex<MockNode>> {
        Arc::new(Mutex::new(MockNode {
            id,
            ..Default::default()
        }))
    }
}

impl SceneObject for MockNode {
    fn object_id(&self) -> ObjectId {
        ObjectId(self.id)
    }

    fn object_kind(&self) -> ObjectKind {
        ObjectKind::Node
    }
}

impl SceneNode for MockNode {
    fn set_visibility(&mut self, visible: bool) -> Result<(), RuntimeError> {
        self.visible = Some(visible);
        Ok(())
    }

    fn set_rotation(
        &mut self,
        rotation: [f32; 3],
        convention: RotationConvention,
    ) -> Result<(), RuntimeError> {
        self.rotation = Some(rotation);
        self.convention = Some(convention);
        Ok(())
    }

    fn set_translation(&mut self, translation: [f32; 3]) -> Result<(), RuntimeError> {
        self.translation = Some(translation);
        Ok(())
    }

    fn set_scaling(&mut self, scaling: [f32; 3]) -> Result<(), RuntimeError> {
        self.scaling = Some(scaling);
        Ok(())
    }
}

#[derive(Debug)]
pub struct MockCamera {
    pub id: u64,
    pub kind: ObjectKind,
    pub viewport: Option<([i32; 2], [u32; 2])>,
    pub frustum: Option<Vec<f32>>,
}

impl MockCamera {
    pub fn shared(id: u64, kind: ObjectKind) -> Arc<Mutex<MockCamera>> {
        Arc::new(Mutex::new(MockCamera {
            id,
            kind,
            viewport: None,
            frustum: None,
        }))
    }
}

impl SceneObject for MockCamera {
    fn object_id(&self) -> ObjectId {
        ObjectId(self.id)
    }

    fn object_kind(&self) -> ObjectKind {
        self.kind
    }
}

impl Camera for MockCamera {
    fn set_viewport(&mut self, offset: [i32; 2], size: [u32; 2]) -> Result<(), RuntimeError> {
        self.viewport = Some((offset, size));
        Ok(())
    }

    fn set_perspective_frustum(
        &mut self,
        field_of_view: f32,
        aspect_ratio: f32,
        near_plane: f32,
        far_plane: f32,
    ) -> Result<(), RuntimeError> {
        self.frustum = Some(vec![field_of_view, aspect_ratio, near_plane, far_plane]);
        Ok(())
    }

    fn set_frustum(&mut self, planes: [f32; 6]) -> Result<(), RuntimeError> {
        self.frustum = Some(planes.to_vec());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MockAppearance {
    pub id: u64,
    pub uniforms: Vec<UniformDecl>,
    pub values: HashMap<String, PropertyValue>,
}

impl MockAppearance {
    pub fn shared(id: u64, uniforms: Vec<UniformDecl>) -> Arc<Mutex<MockAppearance>> {
        Arc::new(Mutex::new(MockAppearance {
            id,
            uniforms,
            values: HashMap::new(),
        }))
    }
}

impl SceneObject for MockAppearance {
    fn object_id(&self) -> ObjectId {
        ObjectId(self.id)
    }

    fn object_kind(&self) -> ObjectKind {
        ObjectKind::Appearance
    }
}

impl Appearance for MockAppearance {
    fn uniforms(&self) -> Vec<UniformDecl> {
        self.uniforms.clone()
    }

    fn set_uniform(&mut self, name: &str, value: &PropertyValue) -> Result<(), RuntimeError> {
        self.values.insert(name.to_owned(), value.clone());
        Ok(())
    }
}

/// Hands out registered scene objects by id.
#[derive(Default)]
pub struct MockScene {
    pub nodes: HashMap<u64, Arc<Mutex<MockNode>>>,
    pub cameras: HashMap<u64, Arc<Mutex<MockCamera>>>,
    pub appearances: HashMap<u64, Arc<Mutex<MockAppearance>>>,
}

impl MockScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&mut self, id: u64) -> Arc<Mutex<MockNode>> {
        let node = MockNode::shared(id);
        self.nodes.insert(id, node.clone());
        node
    }

    pub fn camera(&mut self, id: u64, kind: ObjectKind) -> Arc<Mutex<MockCamera>> {
        let camera = MockCamera::shared(id, kind);
        self.cameras.insert(id, camera.clone());
        camera
    }

    pub fn appearance(&mut self, id: u64, uniforms: Vec<UniformDecl>) -> Arc<Mutex<MockAppearance>> {
        let appearance = MockAppearance::shared(id, uniforms);
        self.appearances.insert(id, appearance.clone());
        appearance
    }
}

impl ResourceResolver for MockScene {
    fn find_scene_node(&self, _binding: &str, id: ObjectId) -> Option<SharedSceneNode> {
        self.nodes
            .get(&id.0)
            .map(|node| node.clone() as SharedSceneNode)
    }

    fn find_camera(&self, _binding: &str, id: ObjectId) -> Option<SharedCamera> {
        self.cameras
            .get(&id.0)
            .map(|camera| camera.clone() as SharedCamera)
    }

    fn find_appearance(&self, _binding: &str, id: ObjectId) -> Option<SharedAppearance> {
        self.appearances
            .get(&id.0)
            .map(|appearance| appearance.clone() as SharedAppearance)
    }
}

fn int_input(inputs: &Property, name: &str) -> i32 {
    inputs
        .child_by_name(name)
        .and_then(|p| p.get::<i32>().ok())
        .unwrap_or_default()
}

fn write(outputs: &mut Property, name: &str, value: impl Into<PropertyValue>) -> Result<(), RuntimeError> {
    outputs
        .child_by_name_mut(name)
        .ok_or_else(|| RuntimeError::new(format!("no output '{name}'")))?
        .set_output(value)
        .map_err(|err| RuntimeError::new(err.to_string()))
}

/// Scripts used across the tests:
///
/// - `copy`: `IN.value` to `OUT.value` (INT)
/// - `add`: `IN.a + IN.b` to `OUT.sum` (INT)
/// - `nested`: struct and array inputs, a vec3 output
/// - `const`: no inputs, `OUT.value` is 5
pub fn scripts() -> NativeScripts {
    NativeScripts::new()
        .with(
            "copy",
            program_fn(
                |inputs, outputs| {
                    inputs.declare("value", PropertyType::Int32);
                    outputs.declare("value", PropertyType::Int32);
                },
                |inputs, outputs| write(outputs, "value", int_input(inputs, "value")),
            ),
        )
        .with(
            "add",
            program_fn(
                |inputs, outputs| {
                    inputs.declare("a", PropertyType::Int32);
                    inputs.declare("b", PropertyType::Int32);
                    outputs.declare("sum", PropertyType::Int32);
                },
                |inputs, outputs| {
                    let sum = int_input(inputs, "a") + int_input(inputs, "b");
                    write(outputs, "sum", sum)
                },
            ),
        )
        .with(
            "nested",
            program_fn(
                |inputs, outputs| {
                    let settings = inputs.declare("settings", PropertyType::Struct);
                    settings.declare("enabled", PropertyType::Bool);
                    settings.declare("label", PropertyType::String);
                    inputs.declare_array("weights", 3, PropertyType::Float);
                    inputs.declare("offset", PropertyType::Int32);
                    outputs.declare("position", PropertyType::Vec3f);
                },
                |inputs, outputs| {
                    let weights: Vec<f32> = inputs
                        .child_by_name("weights")
                        .map(|array| {
                            array
                                .children()
                                .map(|w| w.get::<f32>().unwrap_or_default())
                                .collect()
                        })
                        .unwrap_or_default();
                    let offset = int_input(inputs, "offset") as f32;
                    let mut position = [offset; 3];
                    for (slot, weight) in position.iter_mut().zip(weights) {
                        *slot += weight;
                    }
                    write(outputs, "position", position)
                },
            ),
        )
        .with(
            "const",
            program_fn(
                |_, outputs| {
                    outputs.declare("value", PropertyType::Int32);
                },
                |_, outputs| write(outputs, "value", 5),
            ),
        )
}

/// Link `from.OUT.<output>` to `to.IN.<input>`.
pub fn connect(
    engine: &mut LogicEngine,
    from: NodeId,
    output: &str,
    to: NodeId,
    input: &str,
) -> Result<(), LogicError> {
    let source = engine.output(from, &[output]).expect("output exists");
    let target = engine.input(to, &[input]).expect("input exists");
    engine.link(&source, &target)
}
