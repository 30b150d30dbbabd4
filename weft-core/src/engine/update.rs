//! Update Pass
//!
//! One call to [`LogicEngine::update`] visits every node once, in
//! topological order:
//!
//! 1. A node runs if it is dirty, or unconditionally in [`UpdateMode::Full`]
//! 2. After a successful run the node is clean and the current value of every
//!    linked output is written into its target, marking the target's node
//!    dirty when the value changed (always for binding inputs)
//! 3. Targets are visited later in the same pass, so one call settles the
//!    whole graph
//!
//! A node whose `update()` fails stays dirty and is retried on the next
//! pass. Its outputs are not propagated, and every node downstream of it is
//! skipped for this pass. Nodes that do not depend on it still run.

use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, instrument, trace};

use crate::error::{LogicError, RuntimeError};
use crate::graph::NodeId;

use super::LogicEngine;

/// Which nodes an update pass runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// Only dirty nodes.
    DirtyOnly,
    /// Every node, regardless of its dirty flag.
    Full,
}

/// A node whose `update()` failed.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeFailure {
    pub node: NodeId,
    pub name: String,
    pub error: RuntimeError,
}

/// What happened during one update pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateReport {
    /// Nodes that ran successfully, in execution order.
    pub executed: Vec<NodeId>,
    /// Nodes that would have run but sit downstream of a failure.
    pub skipped: Vec<NodeId>,
    pub failures: Vec<NodeFailure>,
}

impl UpdateReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Returned by an update pass in which at least one node failed.
///
/// Carries the full report: independent nodes may still have run.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{} logic node(s) failed to update", .report.failures.len())]
pub struct UpdateError {
    pub report: UpdateReport,
}

impl LogicEngine {
    /// Run one update pass using the configured dirty tracking.
    pub fn update(&mut self) -> Result<UpdateReport, UpdateError> {
        let mode = if self.config.dirty_tracking {
            UpdateMode::DirtyOnly
        } else {
            UpdateMode::Full
        };
        self.update_with(mode)
    }

    /// Run one update pass in the given mode.
    #[instrument(skip(self), fields(nodes = self.nodes.len()))]
    pub fn update_with(&mut self, mode: UpdateMode) -> Result<UpdateReport, UpdateError> {
        let order = self.links.execution_order();
        let mut report = UpdateReport::default();
        let mut blocked: HashSet<NodeId> = HashSet::new();

        for id in order {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            let wants_run = node.is_dirty() || mode == UpdateMode::Full;

            if self
                .links
                .dependencies(id)
                .iter()
                .any(|upstream| blocked.contains(upstream))
            {
                blocked.insert(id);
                if wants_run {
                    trace!(node = %id, "skipped, upstream node failed");
                    report.skipped.push(id);
                }
                continue;
            }
            if !wants_run {
                trace!(node = %id, "skipped, clean");
                continue;
            }

            let Some(node) = self.nodes.get_mut(&id) else {
                continue;
            };
            match node.update() {
                Ok(()) => {
                    node.set_dirty(false);
                    report.executed.push(id);
                    self.propagate(id);
                }
                Err(error) => {
                    let name = node.name().to_owned();
                    debug!(node = %id, %name, %error, "logic node failed");
                    self.errors.add(
                        Some(id),
                        LogicError::Runtime {
                            node: name.clone(),
                            message: error.message().to_owned(),
                        },
                    );
                    report.failures.push(NodeFailure {
                        node: id,
                        name,
                        error,
                    });
                    blocked.insert(id);
                }
            }
        }

        debug!(
            executed = report.executed.len(),
            skipped = report.skipped.len(),
            failed = report.failures.len(),
            "update pass finished"
        );
        if report.is_success() {
            Ok(report)
        } else {
            Err(UpdateError { report })
        }
    }

    /// Push the outputs of `node` across its links.
    fn propagate(&mut self, node: NodeId) {
        let links = self.links.outgoing(node).to_vec();
        for link in links {
            let Some(value) = self.property(&link.source).and_then(|p| p.value()).cloned() else {
                continue;
            };
            let dirtied = self
                .property_mut(&link.target)
                .map(|target| target.assign_tracked(value))
                .unwrap_or(false);
            if dirtied {
                self.mark_dirty(link.target.node());
            }
        }
    }
}
