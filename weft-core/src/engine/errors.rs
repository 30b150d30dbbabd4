//! Error sink of a logic engine.
//!
//! Every failed engine operation returns its error and also appends it here,
//! so hosts that only poll once per frame still see everything that went
//! wrong since they last looked.

use std::fmt;

use tracing::error;

use crate::error::LogicError;
use crate::graph::NodeId;

/// An error together with the logic node it concerns, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportedError {
    pub node: Option<NodeId>,
    pub error: LogicError,
}

impl fmt::Display for ReportedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

/// Accumulating list of reported errors, drained by the host.
#[derive(Debug, Default)]
pub struct ErrorReporting {
    errors: Vec<ReportedError>,
}

impl ErrorReporting {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, node: Option<NodeId>, error: LogicError) {
        match node {
            Some(node) => error!(%node, %error, "logic error"),
            None => error!(%error, "logic error"),
        }
        self.errors.push(ReportedError { node, error });
    }

    pub fn errors(&self) -> &[ReportedError] {
        &self.errors
    }

    /// Remove and return everything reported so far.
    pub fn take(&mut self) -> Vec<ReportedError> {
        std::mem::take(&mut self.errors)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}
