//! Property Addresses
//!
//! Links reference properties by identity, never by value. A property's
//! identity is its position inside the trees of its owning node: which root
//! it hangs off and the child indices leading to it. Tree shapes are fixed
//! once a node is registered, so an address stays valid for the node's
//! whole lifetime.

use std::fmt;

use smallvec::SmallVec;

use crate::graph::NodeId;

/// Which root tree of a logic node a property belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Inputs,
    Outputs,
}

/// Child indices from a root property down to a descendant.
pub type PropertyPath = SmallVec<[u32; 4]>;

/// Stable identity of a property registered with a logic engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyHandle {
    node: NodeId,
    side: Side,
    path: PropertyPath,
}

impl PropertyHandle {
    pub(crate) fn root(node: NodeId, side: Side) -> Self {
        Self {
            node,
            side,
            path: PropertyPath::new(),
        }
    }

    pub(crate) fn child(&self, index: usize) -> Self {
        let mut path = self.path.clone();
        path.push(index as u32);
        Self {
            node: self.node,
            side: self.side,
            path,
        }
    }

    /// The logic node owning the property.
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Child indices from the root; empty for the root itself.
    pub fn path(&self) -> &[u32] {
        &self.path
    }
}

impl fmt::Display for PropertyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let root = match self.side {
            Side::Inputs => "IN",
            Side::Outputs => "OUT",
        };
        write!(f, "{}/{root}", self.node)?;
        for index in &self.path {
            write!(f, "/{index}")?;
        }
        Ok(())
    }
}
