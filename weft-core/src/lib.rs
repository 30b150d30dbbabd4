//! Weft Core
//!
//! This crate provides a logic-binding engine: small units of computation
//! (scripts) and bindings to host scene objects, connected through typed
//! property trees and data links, re-evaluated incrementally every frame.
//!
//! It implements:
//!
//! - Typed property trees with input/output semantics
//! - A link graph with node-level cycle prevention
//! - A deterministic, dirty-gated update pass in topological order
//! - Identity-preserving save and load of whole graphs
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `property`: property types, values and trees
//! - `node`: the logic node abstraction and the script boundary
//! - `binding`: logic nodes driving host scene objects
//! - `graph`: node identities, link bookkeeping and scheduling
//! - `engine`: the public entry point owning a whole graph
//! - `serialization`: save and load
//!
//! # Example
//!
//! ```rust
//! use weft_core::prelude::*;
//!
//! let runtime = NativeScripts::new().with(
//!     "negate",
//!     program_fn(
//!         |inputs, outputs| {
//!             inputs.declare("flag", PropertyType::Bool);
//!             outputs.declare("flag", PropertyType::Bool);
//!         },
//!         |inputs, outputs| {
//!             let flag = inputs.child(0).and_then(|p| p.get::<bool>().ok()).unwrap_or(false);
//!             if let Some(out) = outputs.child_mut(0) {
//!                 out.set_output(!flag).map_err(|e| RuntimeError::new(e.to_string()))?;
//!             }
//!             Ok(())
//!         },
//!     ),
//! );
//!
//! let mut engine = LogicEngine::new();
//! let script = engine.create_script(&runtime, "negate", "negate").unwrap();
//! engine.update().unwrap();
//!
//! let output = engine.output(script, &["flag"]).unwrap();
//! assert_eq!(engine.get::<bool>(&output), Ok(true));
//! ```

pub mod binding;
pub mod engine;
pub mod error;
pub mod graph;
pub mod node;
pub mod property;
pub mod serialization;

pub use engine::LogicEngine;
pub use error::{LogicError, RuntimeError};

/// The types needed by most hosts.
pub mod prelude {
    pub use crate::binding::{
        Appearance, Camera, NoResources, ObjectId, ObjectKind, ObjectRef, ResourceResolver,
        RotationConvention, SceneNode, SceneObject, UniformDecl,
    };
    pub use crate::engine::{LogicEngine, UpdateError, UpdateMode, UpdateReport};
    pub use crate::error::{LinkViolationKind, LogicError, RuntimeError};
    pub use crate::graph::NodeId;
    pub use crate::node::{program_fn, LogicNode, NativeScripts, ScriptProgram, ScriptRuntime};
    pub use crate::property::{
        Property, PropertyHandle, PropertySemantics, PropertyType, PropertyValue, Side,
    };
}
