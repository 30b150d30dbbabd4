//! Error types shared by every part of the engine.
//!
//! Structural and API-misuse errors are returned immediately and never leave
//! partially applied state behind. Failures inside a node's `update()` are
//! reported as [`RuntimeError`] and turned into [`LogicError::Runtime`] by the
//! update pass.

use thiserror::Error;

use crate::binding::ObjectKind;
use crate::property::PropertyType;

/// Errors produced by engine operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LogicError {
    #[error("Type mismatch on property '{property}': expected {expected}, but found {found}")]
    TypeMismatch {
        property: String,
        expected: PropertyType,
        found: PropertyType,
    },

    #[error("{what} not found")]
    NotFound { what: String },

    #[error("Cannot set property '{property}': {reason}")]
    InvalidAccess {
        property: String,
        reason: AccessViolation,
    },

    #[error("Cannot link '{from}' to '{to}': {reason}")]
    LinkViolation {
        from: String,
        to: String,
        reason: LinkViolationKind,
    },

    #[error("Logic node '{node}' failed to update: {message}")]
    Runtime { node: String, message: String },

    #[error("Script '{script}' could not be created: {message}")]
    ScriptCompile { script: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("{what} does not belong to this logic engine")]
    OwnershipViolation { what: String },

    #[error("{object} is a {found:?}, but a {expected} is required")]
    WrongObjectKind {
        object: String,
        expected: &'static str,
        found: ObjectKind,
    },
}

impl LogicError {
    pub(crate) fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }
}

/// Why a value write was rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessViolation {
    #[error("property is an output")]
    Output,

    #[error("property is currently linked, unlink it first")]
    LinkedInput,

    #[error("only outputs can be written by their logic node")]
    NotOutput,
}

/// Why a link could not be created or removed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkViolationKind {
    #[error("source must be an output property")]
    SourceNotOutput,

    #[error("target must be an input property")]
    TargetNotInput,

    #[error("only primitive properties can be linked")]
    NotPrimitive,

    #[error("source and target have different types")]
    TypeMismatch,

    #[error("target is already linked to another output")]
    TargetAlreadyLinked,

    #[error("source and target belong to the same logic node")]
    SameNode,

    #[error("link would create a cycle between logic nodes")]
    WouldCreateCycle,

    #[error("no such link exists")]
    NoSuchLink,
}

/// Error returned by a logic node whose `update()` body failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RuntimeError {
    message: String,
}

impl RuntimeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
