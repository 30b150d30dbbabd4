//! Dependency Graph
//!
//! This module implements the graph that connects logic nodes through links
//! and decides in which order they are updated.
//!
//! # Overview
//!
//! There are two levels to the graph:
//!
//! - Links connect individual properties: an output of one node feeds an
//!   input of another.
//! - Scheduling happens per logic node: if any output of A feeds any input of
//!   B, then B depends on A.
//!
//! # Design Decisions
//!
//! 1. We use a centralized graph rather than per-property link lists because:
//!    - It enables a single topological ordering for each update pass
//!    - It makes node-level cycle detection a reachability query
//!
//! 2. Links are indexed by target for O(1) "what feeds this input" lookups.
//!
//! 3. We maintain both forward (dependencies) and reverse (dependents) edges
//!    to enable efficient traversal in both directions. Edges are counted so
//!    parallel links between the same two nodes share one edge.

mod links;
mod node;
mod scheduler;

pub use links::{Link, LinkGraph};
pub use node::{DependencyNode, GraphId, NodeId};
pub use scheduler::UpdateScheduler;
