//! Identity-Preserving Serialization
//!
//! Saving writes every node and every property exactly once and records, in
//! a [`SerializationMap`], at which position each live property ended up.
//! Links are then written as pairs of positions.
//!
//! Loading works in two phases:
//!
//! 1. Rebuild every node: scripts are recompiled from their source text,
//!    bindings are reconnected to host objects through a
//!    [`ResourceResolver`]. The saved trees must match the interface the node
//!    declares; their values are restored without marking anything dirty.
//!    Each rebuilt property is recorded in a [`DeserializationMap`].
//! 2. Re-create the links by resolving both positions through that map.
//!
//! Loading builds a fresh engine and only hands it out when both phases
//! succeed, so a failed load never produces a partial graph.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, error, warn};

use crate::binding::{
    AppearanceBinding, CameraBinding, ObjectRef, ResourceResolver, TransformBinding,
};
use crate::engine::LogicEngine;
use crate::error::LogicError;
use crate::node::{LogicNode, NodeDescriptor, ScriptRuntime};
use crate::property::{Property, PropertySemantics};

mod format;
mod maps;

pub use format::{
    Document, Header, PropertyIndex, SerializedLink, SerializedNode, SerializedProperty, Version,
    FORMAT_VERSION, MAGIC,
};
pub use maps::{DeserializationMap, SerializationMap};

impl LogicEngine {
    /// Encode the whole graph.
    ///
    /// Fails for graphs containing custom nodes, which have no descriptor to
    /// be recreated from.
    pub fn save_to_bytes(&mut self) -> Result<Vec<u8>, LogicError> {
        let result = self.to_document().and_then(|document| document.encode());
        self.report(None, result)
    }

    pub fn save_to_file(&mut self, path: impl AsRef<Path>) -> Result<(), LogicError> {
        let path = path.as_ref();
        let bytes = self.save_to_bytes()?;
        let result = std::fs::write(path, bytes).map_err(|err| {
            LogicError::serialization(format!("cannot write '{}': {err}", path.display()))
        });
        self.report(None, result)
    }

    /// Describe the graph as a [`Document`].
    pub fn to_document(&self) -> Result<Document, LogicError> {
        if self.bindings_dirty() {
            warn!("saving while bindings hold values not yet applied; call update() first");
        }

        let mut map = SerializationMap::new();
        let mut properties = Vec::new();
        let mut nodes = Vec::with_capacity(self.node_count());

        for (_, node) in self.nodes() {
            let descriptor = node.descriptor();
            if descriptor == NodeDescriptor::Custom {
                return Err(LogicError::serialization(format!(
                    "logic node '{}' is a custom node and cannot be saved",
                    node.name()
                )));
            }
            let inputs = write_property(node.inputs(), &mut properties, &mut map);
            let outputs = node
                .outputs()
                .map(|outputs| write_property(outputs, &mut properties, &mut map));
            nodes.push(SerializedNode {
                name: node.name().to_owned(),
                descriptor,
                inputs,
                outputs,
            });
        }

        let links = self
            .links()
            .map(|link| {
                Ok(SerializedLink {
                    source: map.resolve(&link.source)?,
                    target: map.resolve(&link.target)?,
                })
            })
            .collect::<Result<Vec<_>, LogicError>>()?;

        debug!(
            nodes = nodes.len(),
            properties = properties.len(),
            links = links.len(),
            "serialized logic graph"
        );
        Ok(Document {
            header: Header::current(),
            nodes,
            properties,
            links,
        })
    }

    /// Rebuild a graph saved by [`LogicEngine::save_to_bytes`].
    pub fn load_from_bytes(
        bytes: &[u8],
        runtime: &dyn ScriptRuntime,
        resolver: &dyn ResourceResolver,
    ) -> Result<LogicEngine, Vec<LogicError>> {
        let result = Document::decode(bytes)
            .map_err(|err| vec![err])
            .and_then(|document| Self::from_document(&document, runtime, resolver));
        if let Err(errors) = &result {
            for err in errors {
                error!(%err, "failed to load logic graph");
            }
        }
        result
    }

    pub fn load_from_file(
        path: impl AsRef<Path>,
        runtime: &dyn ScriptRuntime,
        resolver: &dyn ResourceResolver,
    ) -> Result<LogicEngine, Vec<LogicError>> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|err| {
            vec![LogicError::serialization(format!(
                "cannot read '{}': {err}",
                path.display()
            ))]
        })?;
        Self::load_from_bytes(&bytes, runtime, resolver)
    }

    /// Rebuild a graph from a decoded [`Document`].
    pub fn from_document(
        document: &Document,
        runtime: &dyn ScriptRuntime,
        resolver: &dyn ResourceResolver,
    ) -> Result<LogicEngine, Vec<LogicError>> {
        let mut engine = LogicEngine::new();
        let mut map = DeserializationMap::new();
        let mut claimed = HashSet::new();

        for saved in &document.nodes {
            let node = rebuild_node(document, saved, runtime, resolver, &mut claimed)?;
            let id = engine.register(node);

            let Some(node) = engine.node(id) else {
                continue;
            };
            map_tree(document, saved.inputs, node.inputs(), &mut map).map_err(|err| vec![err])?;
            if let (Some(index), Some(outputs)) = (saved.outputs, node.outputs()) {
                map_tree(document, index, outputs, &mut map).map_err(|err| vec![err])?;
            }
        }

        for link in &document.links {
            let source = map.resolve(link.source).map_err(|err| vec![err])?.clone();
            let target = map.resolve(link.target).map_err(|err| vec![err])?.clone();
            engine.try_link(&source, &target).map_err(|err| {
                vec![LogicError::serialization(format!("cannot restore link: {err}"))]
            })?;
        }

        debug!(
            nodes = engine.node_count(),
            links = engine.link_count(),
            "loaded logic graph"
        );
        Ok(engine)
    }
}

/// Append a property and its subtree, children first. Returns its position.
fn write_property(
    property: &Property,
    out: &mut Vec<SerializedProperty>,
    map: &mut SerializationMap,
) -> PropertyIndex {
    let children = property
        .children()
        .map(|child| write_property(child, out, map))
        .collect();

    let index = out.len() as PropertyIndex;
    out.push(SerializedProperty {
        name: property.name().to_owned(),
        ty: property.property_type(),
        value: property.value().cloned(),
        children,
    });
    if let Some(handle) = property.handle() {
        map.store(handle.clone(), index);
    }
    index
}

/// Rebuild a detached tree from the document.
fn read_tree(
    document: &Document,
    index: PropertyIndex,
    semantics: PropertySemantics,
    claimed: &mut HashSet<PropertyIndex>,
) -> Result<Property, LogicError> {
    let saved = document
        .properties
        .get(index as usize)
        .ok_or_else(|| LogicError::serialization(format!("missing property {index}")))?;
    if !claimed.insert(index) {
        return Err(LogicError::serialization(format!(
            "property {index} is referenced more than once"
        )));
    }

    let mut property = match (&saved.value, saved.ty.is_primitive()) {
        (Some(value), true) if value.property_type() == saved.ty => {
            Property::with_value(saved.name.clone(), semantics, value.clone())
        }
        (None, false) => Property::new(saved.name.clone(), saved.ty, semantics),
        _ => {
            return Err(LogicError::serialization(format!(
                "property '{}' has a value that does not match its type {}",
                saved.name, saved.ty
            )))
        }
    };
    for &child in &saved.children {
        let child = read_tree(document, child, semantics, claimed)?;
        property.add_child(child);
    }
    Ok(property)
}

/// Record which live property was rebuilt from each position.
fn map_tree(
    document: &Document,
    index: PropertyIndex,
    live: &Property,
    map: &mut DeserializationMap,
) -> Result<(), LogicError> {
    let saved = document
        .properties
        .get(index as usize)
        .ok_or_else(|| LogicError::serialization(format!("missing property {index}")))?;
    let handle = live.handle().cloned().ok_or_else(|| {
        LogicError::serialization(format!("property '{}' was not registered", live.name()))
    })?;
    map.store(index, handle)?;
    for (&child, live_child) in saved.children.iter().zip(live.children()) {
        map_tree(document, child, live_child, map)?;
    }
    Ok(())
}

fn rebuild_node(
    document: &Document,
    saved: &SerializedNode,
    runtime: &dyn ScriptRuntime,
    resolver: &dyn ResourceResolver,
    claimed: &mut HashSet<PropertyIndex>,
) -> Result<Box<dyn LogicNode>, Vec<LogicError>> {
    let name = saved.name.as_str();
    let input_semantics = match saved.descriptor {
        NodeDescriptor::Script { .. } => PropertySemantics::ScriptInput,
        _ => PropertySemantics::BindingInput,
    };

    let inputs = read_tree(document, saved.inputs, input_semantics, claimed).map_err(|e| vec![e])?;
    let outputs = saved
        .outputs
        .map(|index| read_tree(document, index, PropertySemantics::ScriptOutput, claimed))
        .transpose()
        .map_err(|e| vec![e])?;

    let mut node: Box<dyn LogicNode> = match &saved.descriptor {
        NodeDescriptor::Script { source } => runtime.compile(source, name)?,
        NodeDescriptor::Transform {
            object,
            rotation_convention,
        } => {
            let scene_node = resolver
                .find_scene_node(name, object.id)
                .ok_or_else(|| vec![missing_object(name, object)])?;
            check_kind(name, object, scene_node.lock().object_ref())?;
            Box::new(TransformBinding::new(name, scene_node, *rotation_convention))
        }
        NodeDescriptor::Camera { object } => {
            let camera = resolver
                .find_camera(name, object.id)
                .ok_or_else(|| vec![missing_object(name, object)])?;
            check_kind(name, object, camera.lock().object_ref())?;
            Box::new(CameraBinding::new(name, camera).map_err(|e| vec![e])?)
        }
        NodeDescriptor::Appearance { object } => {
            let appearance = resolver
                .find_appearance(name, object.id)
                .ok_or_else(|| vec![missing_object(name, object)])?;
            check_kind(name, object, appearance.lock().object_ref())?;
            Box::new(AppearanceBinding::new(name, appearance))
        }
        NodeDescriptor::Custom => {
            return Err(vec![LogicError::serialization(format!(
                "logic node '{name}' is a custom node and cannot be loaded"
            ))])
        }
    };

    let shapes_match = node.inputs().same_shape(&inputs)
        && match (node.outputs(), &outputs) {
            (Some(expected), Some(saved)) => expected.same_shape(saved),
            (None, None) => true,
            _ => false,
        };
    if !shapes_match {
        return Err(vec![LogicError::serialization(format!(
            "saved properties of logic node '{name}' do not match its interface"
        ))]);
    }

    let (live_inputs, live_outputs) = node.core_mut().split_mut();
    live_inputs.restore_values_from(&inputs);
    if let (Some(live), Some(saved)) = (live_outputs, &outputs) {
        live.restore_values_from(saved);
    }
    Ok(node)
}

fn missing_object(name: &str, object: &ObjectRef) -> LogicError {
    LogicError::serialization(format!(
        "{:?} object {} bound by '{name}' could not be resolved",
        object.kind, object.id
    ))
}

fn check_kind(name: &str, saved: &ObjectRef, resolved: ObjectRef) -> Result<(), Vec<LogicError>> {
    if saved.kind != resolved.kind {
        return Err(vec![LogicError::serialization(format!(
            "object {} bound by '{name}' was saved as {:?} but resolved as {:?}",
            saved.id, saved.kind, resolved.kind
        ))]);
    }
    Ok(())
}
