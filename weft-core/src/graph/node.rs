//! Graph Nodes
//!
//! This module defines the identifiers of logic nodes and the per-node edge
//! bookkeeping of the dependency graph.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;

/// Identifies one logic engine instance.
///
/// Every engine draws a fresh id, so node ids minted by one engine can never
/// be mistaken for nodes of another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GraphId(u64);

impl GraphId {
    /// Generate a new unique graph ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for GraphId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for a logic node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    graph: GraphId,
    serial: u64,
}

impl NodeId {
    pub(crate) fn new(graph: GraphId, serial: u64) -> Self {
        Self { graph, serial }
    }

    #[cfg(test)]
    pub(crate) fn detached(serial: u64) -> Self {
        Self::new(GraphId::new(), serial)
    }

    /// The engine this node was registered with.
    pub fn graph(&self) -> GraphId {
        self.graph
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.serial)
    }
}

/// A node in the dependency graph.
///
/// Two logic nodes can be joined by several links; an edge between them
/// exists as long as at least one link does, so edges carry a count.
#[derive(Debug, Default)]
pub struct DependencyNode {
    /// Nodes this node reads from, with the number of links from each.
    dependencies: IndexMap<NodeId, usize>,

    /// Nodes reading from this node, with the number of links to each.
    dependents: IndexMap<NodeId, usize>,
}

impl DependencyNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_dependency(&mut self, node_id: NodeId) {
        *self.dependencies.entry(node_id).or_insert(0) += 1;
    }

    pub(crate) fn remove_dependency(&mut self, node_id: NodeId) {
        decrement(&mut self.dependencies, node_id);
    }

    pub(crate) fn add_dependent(&mut self, node_id: NodeId) {
        *self.dependents.entry(node_id).or_insert(0) += 1;
    }

    pub(crate) fn remove_dependent(&mut self, node_id: NodeId) {
        decrement(&mut self.dependents, node_id);
    }

    /// Nodes this node reads from.
    pub fn dependencies(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.dependencies.keys().copied()
    }

    /// Nodes reading from this node.
    pub fn dependents(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.dependents.keys().copied()
    }

    pub fn depends_on(&self, node_id: NodeId) -> bool {
        self.dependencies.contains_key(&node_id)
    }

    /// Number of distinct nodes this node reads from.
    pub fn in_degree(&self) -> usize {
        self.dependencies.len()
    }
}

fn decrement(edges: &mut IndexMap<NodeId, usize>, node_id: NodeId) {
    if let Some(count) = edges.get_mut(&node_id) {
        *count -= 1;
        if *count == 0 {
            edges.shift_remove(&node_id);
        }
    }
}
