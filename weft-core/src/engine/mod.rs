//! Logic Engine
//!
//! The engine owns every logic node, the links between their properties and
//! the error sink. All graph mutations go through it, so it can enforce
//! that:
//!
//! - objects of another engine are never accepted (ownership is checked
//!   through the [`GraphId`] embedded in every [`NodeId`]),
//! - a rejected operation leaves no trace besides its error,
//! - every value change marks exactly the nodes that need to run again.
//!
//! # Example
//!
//! ```rust
//! use weft_core::prelude::*;
//!
//! let runtime = NativeScripts::new().with(
//!     "add_one",
//!     program_fn(
//!         |inputs, outputs| {
//!             inputs.declare("value", PropertyType::Int32);
//!             outputs.declare("value", PropertyType::Int32);
//!         },
//!         |inputs, outputs| {
//!             let value = inputs.child(0).map(|p| p.get::<i32>()).transpose();
//!             let value = value.map_err(|e| RuntimeError::new(e.to_string()))?.unwrap_or(0);
//!             if let Some(out) = outputs.child_mut(0) {
//!                 out.set_output(value + 1).map_err(|e| RuntimeError::new(e.to_string()))?;
//!             }
//!             Ok(())
//!         },
//!     ),
//! );
//!
//! let mut engine = LogicEngine::new();
//! let first = engine.create_script(&runtime, "add_one", "first").unwrap();
//! let second = engine.create_script(&runtime, "add_one", "second").unwrap();
//!
//! let out = engine.output(first, &["value"]).unwrap();
//! let inp = engine.input(second, &["value"]).unwrap();
//! engine.link(&out, &inp).unwrap();
//!
//! engine.update().unwrap();
//! let result = engine.output(second, &["value"]).unwrap();
//! assert_eq!(engine.get::<i32>(&result), Ok(2));
//! ```

use indexmap::IndexMap;
use tracing::debug;

use crate::binding::{
    AppearanceBinding, CameraBinding, RotationConvention, SharedAppearance, SharedCamera,
    SharedSceneNode, TransformBinding,
};
use crate::error::{LinkViolationKind, LogicError};
use crate::graph::{GraphId, Link, LinkGraph, NodeId};
use crate::node::{LogicNode, NodeKind, ScriptRuntime};
use crate::property::{Primitive, Property, PropertyHandle, PropertyValue, Side};

mod builder;
mod errors;
mod update;

pub use builder::{EngineBuilder, EngineConfig};
pub use errors::{ErrorReporting, ReportedError};
pub use update::{NodeFailure, UpdateError, UpdateMode, UpdateReport};

/// Owner of a logic graph.
#[derive(Debug)]
pub struct LogicEngine {
    graph: GraphId,
    config: EngineConfig,
    /// Nodes in registration order.
    nodes: IndexMap<NodeId, Box<dyn LogicNode>>,
    links: LinkGraph,
    next_serial: u64,
    errors: ErrorReporting,
}

impl Default for LogicEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LogicEngine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            graph: GraphId::new(),
            config,
            nodes: IndexMap::new(),
            links: LinkGraph::new(),
            next_serial: 0,
            errors: ErrorReporting::new(),
        }
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Toggle whether `update()` runs only dirty nodes or every node.
    pub fn set_dirty_tracking(&mut self, enabled: bool) {
        self.config.dirty_tracking = enabled;
    }

    pub fn graph_id(&self) -> GraphId {
        self.graph
    }

    // ---------------------------------------------------------------------
    // Node lifecycle
    // ---------------------------------------------------------------------

    /// Take ownership of a logic node and assign identities to its trees.
    ///
    /// # Panics
    ///
    /// Panics if the node's trees are already owned by a logic node.
    pub fn register(&mut self, mut node: Box<dyn LogicNode>) -> NodeId {
        let id = NodeId::new(self.graph, self.next_serial);
        self.next_serial += 1;

        let (inputs, outputs) = node.core_mut().split_mut();
        inputs.attach(id, Side::Inputs);
        if let Some(outputs) = outputs {
            outputs.attach(id, Side::Outputs);
        }

        self.links.add_node(id);
        debug!(node = %id, name = node.name(), kind = ?node.kind(), "registered logic node");
        self.nodes.insert(id, node);
        id
    }

    /// Compile a script through the given runtime and register it.
    pub fn create_script(
        &mut self,
        runtime: &dyn ScriptRuntime,
        source: &str,
        name: &str,
    ) -> Result<NodeId, LogicError> {
        match runtime.compile(source, name) {
            Ok(node) => Ok(self.register(node)),
            Err(errors) => {
                let first = errors.first().cloned().unwrap_or_else(|| LogicError::ScriptCompile {
                    script: name.to_owned(),
                    message: "script runtime reported no details".to_owned(),
                });
                if errors.is_empty() {
                    self.errors.add(None, first.clone());
                }
                for error in errors {
                    self.errors.add(None, error);
                }
                Err(first)
            }
        }
    }

    pub fn create_transform_binding(&mut self, node: SharedSceneNode, name: &str) -> NodeId {
        self.register(Box::new(TransformBinding::new(
            name,
            node,
            RotationConvention::default(),
        )))
    }

    pub fn create_camera_binding(
        &mut self,
        camera: SharedCamera,
        name: &str,
    ) -> Result<NodeId, LogicError> {
        let result = CameraBinding::new(name, camera).map(|binding| self.register(Box::new(binding)));
        self.report(None, result)
    }

    pub fn create_appearance_binding(&mut self, appearance: SharedAppearance, name: &str) -> NodeId {
        self.register(Box::new(AppearanceBinding::new(name, appearance)))
    }

    /// Destroy a node and every link it takes part in.
    ///
    /// Inputs that were fed by the node become writable again.
    pub fn destroy(&mut self, node: NodeId) -> Result<(), LogicError> {
        if !self.owns(node) {
            let error = LogicError::OwnershipViolation {
                what: format!("Logic node {node}"),
            };
            return self.report(Some(node), Err(error));
        }

        let removed = self.links.remove_node(node);
        for link in &removed {
            if link.target.node() != node {
                if let Some(target) = self.property_mut(&link.target) {
                    target.set_linked_input(false);
                }
            }
        }

        if let Some(destroyed) = self.nodes.shift_remove(&node) {
            debug!(
                node = %node,
                name = destroyed.name(),
                links = removed.len(),
                "destroyed logic node"
            );
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Node queries
    // ---------------------------------------------------------------------

    pub fn node(&self, node: NodeId) -> Option<&dyn LogicNode> {
        self.nodes.get(&node).map(|node| node.as_ref())
    }

    /// Typed access to a node, e.g. a [`TransformBinding`].
    pub fn node_as<T: LogicNode>(&self, node: NodeId) -> Option<&T> {
        self.nodes.get(&node)?.as_any().downcast_ref::<T>()
    }

    /// All nodes in registration order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &dyn LogicNode)> + '_ {
        self.nodes.iter().map(|(id, node)| (*id, node.as_ref()))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether `node` was created by this engine and not yet destroyed.
    pub fn owns(&self, node: NodeId) -> bool {
        node.graph() == self.graph && self.nodes.contains_key(&node)
    }

    /// First node with exactly this name, in registration order.
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.find(name, |_| true)
    }

    pub fn find_script(&self, name: &str) -> Option<NodeId> {
        self.find(name, |kind| kind == NodeKind::Script)
    }

    pub fn find_transform_binding(&self, name: &str) -> Option<NodeId> {
        self.find(name, |kind| kind == NodeKind::TransformBinding)
    }

    pub fn find_camera_binding(&self, name: &str) -> Option<NodeId> {
        self.find(name, |kind| kind == NodeKind::CameraBinding)
    }

    pub fn find_appearance_binding(&self, name: &str) -> Option<NodeId> {
        self.find(name, |kind| kind == NodeKind::AppearanceBinding)
    }

    fn find(&self, name: &str, accept: impl Fn(NodeKind) -> bool) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.name() == name && accept(node.kind()))
            .map(|(id, _)| *id)
    }

    pub fn set_node_name(&mut self, node: NodeId, name: &str) -> Result<(), LogicError> {
        if !self.owns(node) {
            let error = LogicError::OwnershipViolation {
                what: format!("Logic node {node}"),
            };
            return self.report(Some(node), Err(error));
        }
        if let Some(entry) = self.nodes.get_mut(&node) {
            entry.set_name(name);
        }
        Ok(())
    }

    /// Change the Euler order a transform binding uses for the rotations it
    /// applies from now on.
    pub fn set_rotation_convention(
        &mut self,
        node: NodeId,
        convention: RotationConvention,
    ) -> Result<(), LogicError> {
        if !self.owns(node) {
            let error = LogicError::OwnershipViolation {
                what: format!("Logic node {node}"),
            };
            return self.report(Some(node), Err(error));
        }
        let binding = self
            .nodes
            .get_mut(&node)
            .and_then(|entry| entry.as_any_mut().downcast_mut::<TransformBinding>());
        match binding {
            Some(binding) => {
                binding.set_rotation_convention(convention);
                debug!(node = %node, ?convention, "changed rotation convention");
                Ok(())
            }
            None => {
                let error = LogicError::NotFound {
                    what: format!("Transform binding {node}"),
                };
                self.report(Some(node), Err(error))
            }
        }
    }

    /// Whether any node will run on the next dirty-tracked update.
    pub fn is_dirty(&self) -> bool {
        self.nodes.values().any(|node| node.is_dirty())
    }

    /// Whether any binding holds values not yet applied to its object.
    pub fn bindings_dirty(&self) -> bool {
        self.nodes
            .values()
            .any(|node| node.kind().is_binding() && node.is_dirty())
    }

    // ---------------------------------------------------------------------
    // Properties
    // ---------------------------------------------------------------------

    pub fn inputs(&self, node: NodeId) -> Option<&Property> {
        self.nodes.get(&node).map(|node| node.inputs())
    }

    pub fn outputs(&self, node: NodeId) -> Option<&Property> {
        self.nodes.get(&node)?.outputs()
    }

    /// Handle of the property reached by child names from a node's root.
    ///
    /// Missing nodes or children are logged and yield `None`.
    pub fn resolve(&self, node: NodeId, side: Side, names: &[&str]) -> Option<PropertyHandle> {
        let root = match side {
            Side::Inputs => self.inputs(node),
            Side::Outputs => self.outputs(node),
        };
        let mut current = root?;
        for name in names {
            current = current.child_by_name(name)?;
        }
        current.handle().cloned()
    }

    pub fn input(&self, node: NodeId, names: &[&str]) -> Option<PropertyHandle> {
        self.resolve(node, Side::Inputs, names)
    }

    pub fn output(&self, node: NodeId, names: &[&str]) -> Option<PropertyHandle> {
        self.resolve(node, Side::Outputs, names)
    }

    pub fn property(&self, handle: &PropertyHandle) -> Option<&Property> {
        let node = self.nodes.get(&handle.node())?;
        let root = match handle.side() {
            Side::Inputs => node.inputs(),
            Side::Outputs => node.outputs()?,
        };
        root.at_path(handle.path())
    }

    pub(crate) fn property_mut(&mut self, handle: &PropertyHandle) -> Option<&mut Property> {
        let core = self.nodes.get_mut(&handle.node())?.core_mut();
        let root = match handle.side() {
            Side::Inputs => core.inputs_mut(),
            Side::Outputs => core.outputs_mut()?,
        };
        root.at_path_mut(handle.path())
    }

    /// Typed read of a property value.
    pub fn get<T: Primitive>(&self, handle: &PropertyHandle) -> Result<T, LogicError> {
        self.property(handle)
            .ok_or_else(|| not_found(handle))?
            .get::<T>()
            .map_err(|error| self.qualify(error, handle))
    }

    /// Write an input from outside the graph.
    ///
    /// Fails without changing anything when the property is an output, is
    /// currently linked, or has a different type. Marks the owning node dirty
    /// when the value changed, and always for binding inputs.
    pub fn set_value(
        &mut self,
        handle: &PropertyHandle,
        value: impl Into<PropertyValue>,
    ) -> Result<(), LogicError> {
        let result = self.try_set_value(handle, value.into());
        self.report(Some(handle.node()), result)
    }

    fn try_set_value(
        &mut self,
        handle: &PropertyHandle,
        value: PropertyValue,
    ) -> Result<(), LogicError> {
        self.check_owned(handle)?;
        let outcome = self
            .property_mut(handle)
            .ok_or_else(|| not_found(handle))?
            .set_value(value);
        match outcome {
            Ok(true) => self.mark_dirty(handle.node()),
            Ok(false) => {}
            Err(error) => return Err(self.qualify(error, handle)),
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Links
    // ---------------------------------------------------------------------

    /// Link an output to an input of another node.
    ///
    /// The target takes the source's current value and its node becomes
    /// dirty. The target rejects external writes until unlinked.
    pub fn link(
        &mut self,
        source: &PropertyHandle,
        target: &PropertyHandle,
    ) -> Result<(), LogicError> {
        let result = self.try_link(source, target);
        self.report(Some(target.node()), result)
    }

    pub(crate) fn try_link(
        &mut self,
        source: &PropertyHandle,
        target: &PropertyHandle,
    ) -> Result<(), LogicError> {
        self.check_owned(source)?;
        self.check_owned(target)?;

        let source_property = self.property(source).ok_or_else(|| not_found(source))?;
        let target_property = self.property(target).ok_or_else(|| not_found(target))?;
        if let Err(reason) = self.links.validate_link(source_property, target_property) {
            return Err(self.link_error(source, target, reason));
        }
        let value = source_property.value().cloned();

        self.links.insert(source.clone(), target.clone());
        if let Some(target_property) = self.property_mut(target) {
            target_property.set_linked_input(true);
            if let Some(value) = value {
                target_property.assign_tracked(value);
            }
        }
        self.mark_dirty(target.node());

        debug!(
            from = %self.describe(source),
            to = %self.describe(target),
            "linked properties"
        );
        Ok(())
    }

    /// Remove a link. The target keeps its last value.
    pub fn unlink(
        &mut self,
        source: &PropertyHandle,
        target: &PropertyHandle,
    ) -> Result<(), LogicError> {
        let result = self.try_unlink(source, target);
        self.report(Some(target.node()), result)
    }

    fn try_unlink(
        &mut self,
        source: &PropertyHandle,
        target: &PropertyHandle,
    ) -> Result<(), LogicError> {
        self.check_owned(source)?;
        self.check_owned(target)?;

        if let Err(reason) = self.links.remove(source, target) {
            return Err(self.link_error(source, target, reason));
        }
        if let Some(target_property) = self.property_mut(target) {
            target_property.set_linked_input(false);
        }

        debug!(
            from = %self.describe(source),
            to = %self.describe(target),
            "unlinked properties"
        );
        Ok(())
    }

    /// The output feeding `target`, if it is linked.
    pub fn linked_output(&self, target: &PropertyHandle) -> Option<&PropertyHandle> {
        self.links.linked_output(target)
    }

    /// Whether the node is the source or target of any link.
    pub fn is_linked(&self, node: NodeId) -> bool {
        self.links.is_linked(node)
    }

    /// Every link, in the order their targets were linked.
    pub fn links(&self) -> impl Iterator<Item = Link> + '_ {
        self.links.links()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    // ---------------------------------------------------------------------
    // Errors
    // ---------------------------------------------------------------------

    /// Everything reported since the list was last drained.
    pub fn errors(&self) -> &[ReportedError] {
        self.errors.errors()
    }

    pub fn take_errors(&mut self) -> Vec<ReportedError> {
        self.errors.take()
    }

    pub(crate) fn report<T>(
        &mut self,
        node: Option<NodeId>,
        result: Result<T, LogicError>,
    ) -> Result<T, LogicError> {
        if let Err(error) = &result {
            self.errors.add(node, error.clone());
        }
        result
    }

    fn check_owned(&self, handle: &PropertyHandle) -> Result<(), LogicError> {
        if self.owns(handle.node()) {
            Ok(())
        } else {
            Err(LogicError::OwnershipViolation {
                what: format!("Property {handle}"),
            })
        }
    }

    fn link_error(
        &self,
        source: &PropertyHandle,
        target: &PropertyHandle,
        reason: LinkViolationKind,
    ) -> LogicError {
        LogicError::LinkViolation {
            from: self.describe(source),
            to: self.describe(target),
            reason,
        }
    }

    /// Replace a bare property name in an error by its full path.
    fn qualify(&self, error: LogicError, handle: &PropertyHandle) -> LogicError {
        match error {
            LogicError::TypeMismatch {
                expected, found, ..
            } => LogicError::TypeMismatch {
                property: self.describe(handle),
                expected,
                found,
            },
            LogicError::InvalidAccess { reason, .. } => LogicError::InvalidAccess {
                property: self.describe(handle),
                reason,
            },
            other => other,
        }
    }

    /// Human-readable path like `node.OUT.struct.field` or `node.IN.array[1]`.
    pub fn describe(&self, handle: &PropertyHandle) -> String {
        let Some(node) = self.nodes.get(&handle.node()) else {
            return handle.to_string();
        };
        let root = match handle.side() {
            Side::Inputs => Some(node.inputs()),
            Side::Outputs => node.outputs(),
        };
        let Some(mut current) = root else {
            return handle.to_string();
        };

        let mut text = format!("{}.{}", node.name(), current.name());
        for &index in handle.path() {
            let Some(child) = current.at_path(&[index]) else {
                break;
            };
            if child.name().is_empty() {
                text.push_str(&format!("[{index}]"));
            } else {
                text.push('.');
                text.push_str(child.name());
            }
            current = child;
        }
        text
    }

    pub(crate) fn mark_dirty(&mut self, node: NodeId) {
        if let Some(node) = self.nodes.get_mut(&node) {
            node.set_dirty(true);
        }
    }
}

fn not_found(handle: &PropertyHandle) -> LogicError {
    LogicError::NotFound {
        what: format!("Property {handle}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AccessViolation;
    use crate::node::{program_fn, NativeScripts};
    use crate::property::PropertyType;

    fn runtime() -> NativeScripts {
        NativeScripts::new().with(
            "pass",
            program_fn(
                |inputs, outputs| {
                    inputs.declare("value", PropertyType::Int32);
                    outputs.declare("value", PropertyType::Int32);
                },
                |_, _| Ok(()),
            ),
        )
    }

    fn two_scripts() -> (LogicEngine, NodeId, NodeId) {
        let runtime = runtime();
        let mut engine = LogicEngine::new();
        let a = engine.create_script(&runtime, "pass", "a").unwrap();
        let b = engine.create_script(&runtime, "pass", "b").unwrap();
        (engine, a, b)
    }

    #[test]
    fn set_value_marks_dirty_only_on_change() {
        let (mut engine, a, _) = two_scripts();
        let input = engine.input(a, &["value"]).unwrap();
        engine.update().unwrap();
        assert!(!engine.node(a).unwrap().is_dirty());

        engine.set_value(&input, 0).unwrap();
        assert!(!engine.node(a).unwrap().is_dirty());

        engine.set_value(&input, 3).unwrap();
        assert!(engine.node(a).unwrap().is_dirty());
        assert_eq!(engine.get::<i32>(&input), Ok(3));
    }

    #[test]
    fn rotation_convention_needs_an_own_transform_binding() {
        let (mut engine, a, _) = two_scripts();
        let err = engine
            .set_rotation_convention(a, RotationConvention::Zyx)
            .unwrap_err();
        assert_eq!(
            err,
            LogicError::NotFound {
                what: format!("Transform binding {a}")
            }
        );

        let (_other, foreign, _) = two_scripts();
        assert!(matches!(
            engine.set_rotation_convention(foreign, RotationConvention::Zyx),
            Err(LogicError::OwnershipViolation { .. })
        ));
        assert_eq!(engine.take_errors().len(), 2);
    }

    #[test]
    fn rejected_writes_are_reported_with_full_path() {
        let (mut engine, a, _) = two_scripts();
        let output = engine.output(a, &["value"]).unwrap();
        let err = engine.set_value(&output, 1).unwrap_err();
        assert_eq!(
            err,
            LogicError::InvalidAccess {
                property: "a.OUT.value".into(),
                reason: AccessViolation::Output,
            }
        );
        assert_eq!(engine.errors().len(), 1);
        assert_eq!(engine.errors()[0].node, Some(a));

        let input = engine.input(a, &["value"]).unwrap();
        assert!(matches!(
            engine.set_value(&input, 1.0f32),
            Err(LogicError::TypeMismatch { .. })
        ));
        assert_eq!(engine.take_errors().len(), 2);
        assert!(engine.errors().is_empty());
    }

    #[test]
    fn link_copies_value_and_marks_target_dirty() {
        let (mut engine, a, b) = two_scripts();
        let out = engine.output(a, &["value"]).unwrap();
        let inp = engine.input(b, &["value"]).unwrap();
        engine.update().unwrap();
        assert!(!engine.is_dirty());

        engine.link(&out, &inp).unwrap();
        assert!(engine.node(b).unwrap().is_dirty());
        assert!(!engine.node(a).unwrap().is_dirty());
        assert_eq!(engine.linked_output(&inp), Some(&out));
        assert!(engine.is_linked(a) && engine.is_linked(b));

        let err = engine.link(&out, &inp).unwrap_err();
        assert!(matches!(
            err,
            LogicError::LinkViolation {
                reason: LinkViolationKind::TargetAlreadyLinked,
                ..
            }
        ));
    }

    #[test]
    fn unlink_restores_writability_without_dirtying() {
        let (mut engine, a, b) = two_scripts();
        let out = engine.output(a, &["value"]).unwrap();
        let inp = engine.input(b, &["value"]).unwrap();
        engine.link(&out, &inp).unwrap();
        engine.update().unwrap();

        engine.unlink(&out, &inp).unwrap();
        assert!(!engine.is_dirty());
        assert!(engine.linked_output(&inp).is_none());
        engine.set_value(&inp, 9).unwrap();

        let err = engine.unlink(&out, &inp).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot link 'a.OUT.value' to 'b.IN.value': no such link exists"
        );
    }

    #[test]
    fn foreign_handles_are_rejected() {
        let (mut engine, a, _) = two_scripts();
        let (other, foreign, _) = two_scripts();
        let foreign_input = other.input(foreign, &["value"]).unwrap();
        let out = engine.output(a, &["value"]).unwrap();

        assert!(matches!(
            engine.link(&out, &foreign_input),
            Err(LogicError::OwnershipViolation { .. })
        ));
        assert!(matches!(
            engine.set_value(&foreign_input, 1),
            Err(LogicError::OwnershipViolation { .. })
        ));
        assert!(matches!(
            engine.destroy(foreign),
            Err(LogicError::OwnershipViolation { .. })
        ));
        assert_eq!(engine.node_count(), 2);
    }

    #[test]
    fn lookups_by_name_and_kind() {
        let (mut engine, a, b) = two_scripts();
        assert_eq!(engine.find_node("a"), Some(a));
        assert_eq!(engine.find_script("b"), Some(b));
        assert_eq!(engine.find_transform_binding("a"), None);
        assert_eq!(engine.find_node("A"), None);

        engine.set_node_name(a, "renamed").unwrap();
        assert_eq!(engine.find_node("a"), None);
        assert_eq!(engine.find_node("renamed"), Some(a));
    }

    #[test]
    fn unknown_script_is_reported() {
        let mut engine = LogicEngine::new();
        let err = engine.create_script(&runtime(), "missing", "s").unwrap_err();
        assert!(matches!(err, LogicError::ScriptCompile { .. }));
        assert_eq!(engine.errors().len(), 1);
        assert_eq!(engine.node_count(), 0);
    }

    #[test]
    fn describe_names_array_elements_by_index() {
        let runtime = NativeScripts::new().with(
            "arrays",
            program_fn(
                |inputs, _| {
                    inputs.declare_array("points", 2, PropertyType::Vec2f);
                },
                |_, _| Ok(()),
            ),
        );
        let mut engine = LogicEngine::new();
        let node = engine.create_script(&runtime, "arrays", "s").unwrap();
        let points = engine.inputs(node).unwrap().child(0).unwrap();
        let second = points.child(1).unwrap().handle().unwrap().clone();
        assert_eq!(engine.describe(&second), "s.IN.points[1]");
    }
}
