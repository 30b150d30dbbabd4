//! Link Graph
//!
//! Links connect one output property to one input property of another logic
//! node. The link graph stores them keyed by target, so "what feeds this
//! input" is a single lookup, and mirrors them as counted node-level edges in
//! the [`UpdateScheduler`] for ordering and cycle checks.
//!
//! Cycles are prevented at logic-node granularity: a link from node A to
//! node B is rejected whenever B already reaches A, no matter through which
//! properties.

use indexmap::IndexMap;

use crate::error::LinkViolationKind;
use crate::property::{Property, PropertyHandle};

use super::node::NodeId;
use super::scheduler::UpdateScheduler;

/// A directed data link from an output property to an input property.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Link {
    pub source: PropertyHandle,
    pub target: PropertyHandle,
}

/// All links of one logic engine.
#[derive(Debug, Default)]
pub struct LinkGraph {
    /// Target to source; a target has at most one incoming link.
    incoming: IndexMap<PropertyHandle, PropertyHandle>,

    /// Per source node, its outgoing links in creation order.
    outgoing: IndexMap<NodeId, Vec<Link>>,

    scheduler: UpdateScheduler,
}

impl LinkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: NodeId) {
        self.scheduler.add_node(node);
    }

    /// Remove a node and every link it takes part in.
    ///
    /// Returns the removed links so the caller can release their targets.
    pub fn remove_node(&mut self, node: NodeId) -> Vec<Link> {
        let removed: Vec<Link> = self
            .links()
            .filter(|link| link.source.node() == node || link.target.node() == node)
            .collect();

        for link in &removed {
            self.detach(link);
        }
        self.scheduler.remove_node(node);

        removed
    }

    /// Check whether `source` may be linked to `target`.
    ///
    /// Both properties must be attached to logic nodes.
    pub fn validate_link(
        &self,
        source: &Property,
        target: &Property,
    ) -> Result<(), LinkViolationKind> {
        if !source.is_output() {
            return Err(LinkViolationKind::SourceNotOutput);
        }
        if !target.is_input() {
            return Err(LinkViolationKind::TargetNotInput);
        }
        if !source.property_type().is_primitive() || !target.property_type().is_primitive() {
            return Err(LinkViolationKind::NotPrimitive);
        }
        if source.property_type() != target.property_type() {
            return Err(LinkViolationKind::TypeMismatch);
        }

        let (Some(source_handle), Some(target_handle)) = (source.handle(), target.handle()) else {
            return Err(LinkViolationKind::NoSuchLink);
        };
        if self.incoming.contains_key(target_handle) {
            return Err(LinkViolationKind::TargetAlreadyLinked);
        }

        let (from, to) = (source_handle.node(), target_handle.node());
        if from == to {
            return Err(LinkViolationKind::SameNode);
        }
        // The new edge from -> to closes a loop iff `to` already reaches `from`.
        if self.scheduler.reaches(to, from) {
            return Err(LinkViolationKind::WouldCreateCycle);
        }

        Ok(())
    }

    /// Record a link that passed [`validate_link`](Self::validate_link).
    pub fn insert(&mut self, source: PropertyHandle, target: PropertyHandle) {
        debug_assert!(!self.incoming.contains_key(&target));
        self.scheduler.add_edge(source.node(), target.node());
        self.outgoing
            .entry(source.node())
            .or_default()
            .push(Link {
                source: source.clone(),
                target: target.clone(),
            });
        self.incoming.insert(target, source);
    }

    /// Remove the link between `source` and `target`.
    pub fn remove(
        &mut self,
        source: &PropertyHandle,
        target: &PropertyHandle,
    ) -> Result<Link, LinkViolationKind> {
        match self.incoming.get(target) {
            Some(linked) if linked == source => {}
            _ => return Err(LinkViolationKind::NoSuchLink),
        }
        let link = Link {
            source: source.clone(),
            target: target.clone(),
        };
        self.detach(&link);
        Ok(link)
    }

    fn detach(&mut self, link: &Link) {
        self.incoming.shift_remove(&link.target);
        if let Some(links) = self.outgoing.get_mut(&link.source.node()) {
            links.retain(|existing| existing != link);
            if links.is_empty() {
                self.outgoing.shift_remove(&link.source.node());
            }
        }
        self.scheduler
            .remove_edge(link.source.node(), link.target.node());
    }

    /// The output feeding `target`, if any.
    pub fn linked_output(&self, target: &PropertyHandle) -> Option<&PropertyHandle> {
        self.incoming.get(target)
    }

    /// Links leaving the given node, in creation order.
    pub fn outgoing(&self, node: NodeId) -> &[Link] {
        self.outgoing.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether the node takes part in any link, as source or target.
    pub fn is_linked(&self, node: NodeId) -> bool {
        self.outgoing.contains_key(&node) || self.incoming.keys().any(|target| target.node() == node)
    }

    /// Every link, in the order their targets were linked.
    pub fn links(&self) -> impl Iterator<Item = Link> + '_ {
        self.incoming.iter().map(|(target, source)| Link {
            source: source.clone(),
            target: target.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.incoming.len()
    }

    pub fn is_empty(&self) -> bool {
        self.incoming.is_empty()
    }

    /// Whether `dependent` is downstream of `dependency`, at any distance.
    pub fn depends_transitively(&self, dependent: NodeId, dependency: NodeId) -> bool {
        dependent != dependency && self.scheduler.reaches(dependency, dependent)
    }

    /// Direct upstream nodes of `node`.
    pub fn dependencies(&self, node: NodeId) -> Vec<NodeId> {
        self.scheduler
            .get_node(node)
            .map(|entry| entry.dependencies().collect())
            .unwrap_or_default()
    }

    /// All registered nodes, dependencies first.
    pub fn execution_order(&mut self) -> Vec<NodeId> {
        self.scheduler.execution_order()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::GraphId;
    use crate::property::{PropertySemantics, PropertyType, Side};

    struct Fixture {
        graph: LinkGraph,
        outputs: Vec<Property>,
        inputs: Vec<Property>,
    }

    /// `count` nodes, each with an Int32 and a Float on both sides.
    fn fixture(count: u64) -> Fixture {
        let id = GraphId::new();
        let mut graph = LinkGraph::new();
        let mut outputs = Vec::new();
        let mut inputs = Vec::new();
        for serial in 0..count {
            let node = NodeId::new(id, serial);
            graph.add_node(node);

            let mut out = Property::structure("OUT", PropertySemantics::ScriptOutput);
            out.declare("int", PropertyType::Int32);
            out.declare("float", PropertyType::Float);
            out.attach(node, Side::Outputs);
            outputs.push(out);

            let mut inp = Property::structure("IN", PropertySemantics::ScriptInput);
            inp.declare("int", PropertyType::Int32);
            inp.declare("float", PropertyType::Float);
            inp.attach(node, Side::Inputs);
            inputs.push(inp);
        }
        Fixture {
            graph,
            outputs,
            inputs,
        }
    }

    impl Fixture {
        fn out(&self, node: usize, index: usize) -> &Property {
            self.outputs[node].child(index).unwrap()
        }

        fn inp(&self, node: usize, index: usize) -> &Property {
            self.inputs[node].child(index).unwrap()
        }

        fn link(&mut self, from: usize, to: usize, index: usize) -> Result<(), LinkViolationKind> {
            let source = self.out(from, index).clone();
            let target = self.inp(to, index).clone();
            self.graph.validate_link(&source, &target)?;
            self.graph.insert(
                source.handle().unwrap().clone(),
                target.handle().unwrap().clone(),
            );
            Ok(())
        }
    }

    #[test]
    fn semantics_and_types_are_checked() {
        let f = fixture(2);
        let graph = &f.graph;
        assert_eq!(
            graph.validate_link(f.inp(0, 0), f.inp(1, 0)),
            Err(LinkViolationKind::SourceNotOutput)
        );
        assert_eq!(
            graph.validate_link(f.out(0, 0), f.out(1, 0)),
            Err(LinkViolationKind::TargetNotInput)
        );
        assert_eq!(
            graph.validate_link(f.out(0, 0), f.inp(1, 1)),
            Err(LinkViolationKind::TypeMismatch)
        );
        assert_eq!(
            graph.validate_link(&f.outputs[0], &f.inputs[1]),
            Err(LinkViolationKind::NotPrimitive)
        );
        assert_eq!(
            graph.validate_link(f.out(0, 0), f.inp(0, 0)),
            Err(LinkViolationKind::SameNode)
        );
        assert_eq!(graph.validate_link(f.out(0, 0), f.inp(1, 0)), Ok(()));
    }

    #[test]
    fn target_accepts_a_single_link() {
        let mut f = fixture(3);
        f.link(0, 2, 0).unwrap();
        assert_eq!(f.link(1, 2, 0), Err(LinkViolationKind::TargetAlreadyLinked));
        assert_eq!(f.link(0, 2, 0), Err(LinkViolationKind::TargetAlreadyLinked));

        let target = f.inp(2, 0).handle().unwrap().clone();
        assert_eq!(
            f.graph.linked_output(&target),
            f.out(0, 0).handle()
        );
    }

    #[test]
    fn cycles_are_detected_between_nodes() {
        let mut f = fixture(4);
        f.link(0, 1, 0).unwrap();
        f.link(1, 2, 0).unwrap();
        f.link(2, 3, 0).unwrap();

        // Different properties, but the loop closes at node level.
        assert_eq!(f.link(3, 0, 1), Err(LinkViolationKind::WouldCreateCycle));
        assert_eq!(f.link(1, 0, 1), Err(LinkViolationKind::WouldCreateCycle));

        // A second parallel edge is fine.
        f.link(0, 1, 1).unwrap();
        assert_eq!(f.graph.len(), 4);
    }

    #[test]
    fn removing_one_of_two_parallel_links_keeps_the_edge() {
        let mut f = fixture(2);
        f.link(0, 1, 0).unwrap();
        f.link(0, 1, 1).unwrap();

        let source = f.out(0, 0).handle().unwrap().clone();
        let target = f.inp(1, 0).handle().unwrap().clone();
        f.graph.remove(&source, &target).unwrap();

        assert!(f.graph.depends_transitively(
            f.inputs[1].owner().unwrap(),
            f.outputs[0].owner().unwrap()
        ));
        assert_eq!(f.link(1, 0, 0), Err(LinkViolationKind::WouldCreateCycle));
    }

    #[test]
    fn unlink_requires_an_existing_link() {
        let mut f = fixture(3);
        f.link(0, 1, 0).unwrap();

        let wrong_source = f.out(2, 0).handle().unwrap().clone();
        let target = f.inp(1, 0).handle().unwrap().clone();
        assert_eq!(
            f.graph.remove(&wrong_source, &target),
            Err(LinkViolationKind::NoSuchLink)
        );

        let source = f.out(0, 0).handle().unwrap().clone();
        assert!(f.graph.remove(&source, &target).is_ok());
        assert_eq!(
            f.graph.remove(&source, &target),
            Err(LinkViolationKind::NoSuchLink)
        );
        assert!(f.graph.is_empty());
    }

    #[test]
    fn removing_a_node_removes_only_its_links() {
        let mut f = fixture(4);
        f.link(0, 1, 0).unwrap();
        f.link(1, 2, 0).unwrap();
        f.link(0, 3, 1).unwrap();

        let middle = f.inputs[1].owner().unwrap();
        let removed = f.graph.remove_node(middle);
        assert_eq!(removed.len(), 2);
        assert_eq!(f.graph.len(), 1);
        assert!(!f.graph.is_linked(middle));
        assert!(f.graph.is_linked(f.inputs[3].owner().unwrap()));
    }

    #[test]
    fn order_follows_links() {
        let mut f = fixture(3);
        f.link(2, 0, 0).unwrap();
        let order = f.graph.execution_order();
        let owners: Vec<_> = (0..3).map(|i| f.inputs[i].owner().unwrap()).collect();
        assert_eq!(order, vec![owners[1], owners[2], owners[0]]);
        assert_eq!(f.graph.dependencies(owners[0]), vec![owners[2]]);
    }
}
