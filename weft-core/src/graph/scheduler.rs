//! Update Scheduler
//!
//! The scheduler owns the node-level dependency graph and determines the
//! order in which logic nodes are visited by an update pass. Dependencies are
//! always visited before their dependents.
//!
//! # Algorithm
//!
//! We use Kahn's topological sort over all registered nodes:
//!
//! 1. Compute every node's in-degree (number of distinct nodes it reads from)
//! 2. Seed a min-heap with all nodes of in-degree zero
//! 3. Pop the node registered earliest, emit it, and decrement its dependents
//! 4. Push dependents whose in-degree dropped to zero
//!
//! Using registration order as the tie-break makes the order a pure function
//! of the graph: two engines holding the same nodes and links always update
//! in the same order. The result is cached until the next structural change.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use indexmap::IndexMap;
use tracing::{error, trace};

use super::node::{DependencyNode, NodeId};

/// The update scheduler manages the dependency graph and orders updates.
#[derive(Debug, Default)]
pub struct UpdateScheduler {
    /// All nodes in the graph, in registration order.
    nodes: IndexMap<NodeId, DependencyNode>,

    /// Cached execution order, dropped on every structural change.
    order: Option<Vec<NodeId>>,
}

impl UpdateScheduler {
    /// Create a new empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the graph.
    pub fn add_node(&mut self, id: NodeId) {
        self.nodes.insert(id, DependencyNode::new());
        self.order = None;
    }

    /// Remove a node from the graph.
    ///
    /// Also removes all edges involving this node.
    pub fn remove_node(&mut self, node_id: NodeId) {
        let Some(node) = self.nodes.shift_remove(&node_id) else {
            return;
        };

        for dep_id in node.dependencies() {
            if let Some(dep) = self.nodes.get_mut(&dep_id) {
                while dep.dependents().any(|id| id == node_id) {
                    dep.remove_dependent(node_id);
                }
            }
        }

        for dependent_id in node.dependents() {
            if let Some(dependent) = self.nodes.get_mut(&dependent_id) {
                while dependent.depends_on(node_id) {
                    dependent.remove_dependency(node_id);
                }
            }
        }

        self.order = None;
    }

    /// Get a reference to a node.
    pub fn get_node(&self, node_id: NodeId) -> Option<&DependencyNode> {
        self.nodes.get(&node_id)
    }

    /// Add a dependency edge: `dependent` depends on `dependency`.
    ///
    /// Edges are counted, every call must be matched by one
    /// [`remove_edge`](Self::remove_edge) before the edge disappears.
    pub fn add_edge(&mut self, dependency: NodeId, dependent: NodeId) {
        if let Some(dep_node) = self.nodes.get_mut(&dependency) {
            dep_node.add_dependent(dependent);
        }
        if let Some(dependent_node) = self.nodes.get_mut(&dependent) {
            dependent_node.add_dependency(dependency);
        }
        self.order = None;
    }

    /// Remove one count of a dependency edge.
    pub fn remove_edge(&mut self, dependency: NodeId, dependent: NodeId) {
        if let Some(dep_node) = self.nodes.get_mut(&dependency) {
            dep_node.remove_dependent(dependent);
        }
        if let Some(dependent_node) = self.nodes.get_mut(&dependent) {
            dependent_node.remove_dependency(dependency);
        }
        self.order = None;
    }

    /// Whether `to` can be reached from `from` by following dependents.
    ///
    /// A node always reaches itself.
    pub fn reaches(&self, from: NodeId, to: NodeId) -> bool {
        let mut visited = HashSet::new();
        let mut stack = vec![from];

        while let Some(node_id) = stack.pop() {
            if node_id == to {
                return true;
            }
            if !visited.insert(node_id) {
                continue;
            }
            if let Some(node) = self.nodes.get(&node_id) {
                stack.extend(node.dependents());
            }
        }

        false
    }

    /// All nodes, dependencies before dependents, ties in registration order.
    pub fn execution_order(&mut self) -> Vec<NodeId> {
        if let Some(order) = &self.order {
            return order.clone();
        }

        let order = self.topological_sort();
        trace!(nodes = order.len(), "recomputed execution order");
        self.order = Some(order.clone());
        order
    }

    fn topological_sort(&self) -> Vec<NodeId> {
        let mut in_degree: HashMap<NodeId, usize> = HashMap::with_capacity(self.nodes.len());
        let mut ready = BinaryHeap::new();
        let mut result = Vec::with_capacity(self.nodes.len());

        for (index, (&node_id, node)) in self.nodes.iter().enumerate() {
            let degree = node.in_degree();
            in_degree.insert(node_id, degree);
            if degree == 0 {
                ready.push(Reverse(index));
            }
        }

        // Kahn's algorithm
        while let Some(Reverse(index)) = ready.pop() {
            let Some((&node_id, node)) = self.nodes.get_index(index) else {
                continue;
            };
            result.push(node_id);

            for dependent_id in node.dependents() {
                if let Some(degree) = in_degree.get_mut(&dependent_id) {
                    *degree = degree.saturating_sub(1);
                    if *degree == 0 {
                        if let Some(dependent_index) = self.nodes.get_index_of(&dependent_id) {
                            ready.push(Reverse(dependent_index));
                        }
                    }
                }
            }
        }

        if result.len() != self.nodes.len() {
            // Links are checked for cycles before insertion; reaching this
            // means the graph was corrupted.
            error!(
                sorted = result.len(),
                total = self.nodes.len(),
                "dependency graph contains a cycle"
            );
        }

        result
    }

    /// Get the total number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
