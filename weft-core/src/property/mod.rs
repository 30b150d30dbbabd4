//! Typed Property Trees
//!
//! Every logic node exposes its data as property trees: one input tree and,
//! for scripts, one output tree. Leaves are typed primitive values; inner
//! nodes are structs (named children) or arrays (positional children).

mod address;
mod tree;
mod value;

pub use address::{PropertyHandle, PropertyPath, Side};
pub use tree::Property;
pub use value::{Primitive, PropertySemantics, PropertyType, PropertyValue};
