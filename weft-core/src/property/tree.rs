//! Property Trees
//!
//! A [`Property`] is either a primitive leaf holding a [`PropertyValue`] or a
//! struct/array holding an ordered list of child properties. Which of the two
//! is decided by the type at construction and can never change afterwards.
//!
//! # Write paths
//!
//! There are three ways a value can change, each with its own rules:
//!
//! 1. External writes (through the engine): rejected for outputs and for
//!    linked inputs, type-checked, and reported back so the engine can mark
//!    the owning node dirty. Binding inputs always flag a new value, even when
//!    the written value equals the old one.
//! 2. Output writes from the owning node's `update()` via
//!    [`Property::set_output`]: no dirty tracking.
//! 3. Link propagation by the update pass: same dirty rules as external
//!    writes, but allowed on linked inputs.
//!
//! # Ownership
//!
//! Trees are built detached, then attached to exactly one logic node when
//! the node is registered. Attaching assigns every property its
//! [`PropertyHandle`]; attaching twice is a programming error.

use tracing::error;

use crate::error::{AccessViolation, LogicError};
use crate::graph::NodeId;

use super::address::{PropertyHandle, Side};
use super::value::{Primitive, PropertySemantics, PropertyType, PropertyValue};

#[derive(Debug, Clone)]
enum Content {
    Value(PropertyValue),
    Children(Vec<Property>),
}

/// A node in a typed property tree.
#[derive(Debug, Clone)]
pub struct Property {
    name: String,
    ty: PropertyType,
    semantics: PropertySemantics,
    content: Content,
    linked_input: bool,
    has_new_value: bool,
    handle: Option<PropertyHandle>,
}

impl Property {
    /// Create a property of the given type.
    ///
    /// Primitive properties start with the zero value of their type, struct
    /// and array properties start without children.
    pub fn new(name: impl Into<String>, ty: PropertyType, semantics: PropertySemantics) -> Self {
        let content = match PropertyValue::default_for(ty) {
            Some(value) => Content::Value(value),
            None => Content::Children(Vec::new()),
        };
        Self {
            name: name.into(),
            ty,
            semantics,
            content,
            linked_input: false,
            has_new_value: false,
            handle: None,
        }
    }

    /// Create a primitive property whose type is taken from its initial value.
    pub fn with_value(
        name: impl Into<String>,
        semantics: PropertySemantics,
        value: impl Into<PropertyValue>,
    ) -> Self {
        let value = value.into();
        Self {
            name: name.into(),
            ty: value.property_type(),
            semantics,
            content: Content::Value(value),
            linked_input: false,
            has_new_value: false,
            handle: None,
        }
    }

    /// Create an empty struct property.
    pub fn structure(name: impl Into<String>, semantics: PropertySemantics) -> Self {
        Self::new(name, PropertyType::Struct, semantics)
    }

    /// Append a child.
    ///
    /// # Panics
    ///
    /// Panics if this property cannot have children, if the child's semantics
    /// differ from this property's, or if either tree is already attached to a
    /// logic node. Trees are only built by trusted constructors, so any of
    /// these is a bug in the caller.
    pub fn add_child(&mut self, child: Property) -> &mut Property {
        assert_eq!(
            self.semantics, child.semantics,
            "child '{}' has different semantics than parent '{}'",
            child.name, self.name
        );
        assert!(
            self.handle.is_none() && child.handle.is_none(),
            "cannot add children to a property tree owned by a logic node"
        );
        match &mut self.content {
            Content::Children(children) => {
                children.push(child);
                let last = children.len() - 1;
                &mut children[last]
            }
            Content::Value(_) => panic!(
                "property '{}' of type {} cannot have children",
                self.name, self.ty
            ),
        }
    }

    /// Builder-style variant of [`Property::add_child`].
    pub fn with_child(mut self, child: Property) -> Self {
        self.add_child(child);
        self
    }

    /// Declare a child with this property's semantics and return it.
    pub fn declare(&mut self, name: impl Into<String>, ty: PropertyType) -> &mut Property {
        let child = Property::new(name, ty, self.semantics);
        self.add_child(child)
    }

    /// Declare an array of `len` unnamed elements of type `element`.
    pub fn declare_array(
        &mut self,
        name: impl Into<String>,
        len: usize,
        element: PropertyType,
    ) -> &mut Property {
        let semantics = self.semantics;
        let array = self.declare(name, PropertyType::Array);
        for _ in 0..len {
            array.add_child(Property::new("", element, semantics));
        }
        array
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn property_type(&self) -> PropertyType {
        self.ty
    }

    pub fn semantics(&self) -> PropertySemantics {
        self.semantics
    }

    pub fn is_input(&self) -> bool {
        self.semantics.is_input()
    }

    pub fn is_output(&self) -> bool {
        self.semantics.is_output()
    }

    /// Whether this property is currently the target of a link.
    pub fn is_linked_input(&self) -> bool {
        self.linked_input
    }

    /// The identity of this property, once attached to a logic node.
    pub fn handle(&self) -> Option<&PropertyHandle> {
        self.handle.as_ref()
    }

    /// The logic node owning this property, once attached.
    pub fn owner(&self) -> Option<NodeId> {
        self.handle.as_ref().map(PropertyHandle::node)
    }

    pub fn child_count(&self) -> usize {
        match &self.content {
            Content::Children(children) => children.len(),
            Content::Value(_) => 0,
        }
    }

    pub fn children(&self) -> impl Iterator<Item = &Property> {
        let children: &[Property] = match &self.content {
            Content::Children(children) => children,
            Content::Value(_) => &[],
        };
        children.iter()
    }

    /// Child by position. Logs and returns `None` when out of range.
    pub fn child(&self, index: usize) -> Option<&Property> {
        let found = match &self.content {
            Content::Children(children) => children.get(index),
            Content::Value(_) => None,
        };
        if found.is_none() {
            error!(index, parent = %self.name, "no child property with this index");
        }
        found
    }

    /// Mutable child by position. Logs and returns `None` when out of range.
    pub fn child_mut(&mut self, index: usize) -> Option<&mut Property> {
        let name = &self.name;
        let found = match &mut self.content {
            Content::Children(children) => children.get_mut(index),
            Content::Value(_) => None,
        };
        if found.is_none() {
            error!(index, parent = %name, "no child property with this index");
        }
        found
    }

    /// Child by name. Logs and returns `None` when there is no such child.
    pub fn child_by_name(&self, name: &str) -> Option<&Property> {
        let found = self.children().find(|child| child.name == name);
        if found.is_none() {
            error!(child = name, parent = %self.name, "no child property with this name");
        }
        found
    }

    /// Mutable child by name. Logs and returns `None` when there is no such child.
    pub fn child_by_name_mut(&mut self, name: &str) -> Option<&mut Property> {
        let parent = &self.name;
        let found = match &mut self.content {
            Content::Children(children) => children.iter_mut().find(|child| child.name == name),
            Content::Value(_) => None,
        };
        if found.is_none() {
            error!(child = name, parent = %parent, "no child property with this name");
        }
        found
    }

    /// Whether a child with this name exists. Does not log.
    pub fn has_child(&self, name: &str) -> bool {
        self.children().any(|child| child.name == name)
    }

    /// Descendant reached by following child indices.
    pub fn at_path(&self, path: &[u32]) -> Option<&Property> {
        let mut current = self;
        for &index in path {
            current = match &current.content {
                Content::Children(children) => children.get(index as usize)?,
                Content::Value(_) => return None,
            };
        }
        Some(current)
    }

    pub(crate) fn at_path_mut(&mut self, path: &[u32]) -> Option<&mut Property> {
        let mut current = self;
        for &index in path {
            current = match &mut current.content {
                Content::Children(children) => children.get_mut(index as usize)?,
                Content::Value(_) => return None,
            };
        }
        Some(current)
    }

    /// The stored value, `None` for struct and array properties.
    pub fn value(&self) -> Option<&PropertyValue> {
        match &self.content {
            Content::Value(value) => Some(value),
            Content::Children(_) => None,
        }
    }

    /// Typed read of a primitive value.
    pub fn get<T: Primitive>(&self) -> Result<T, LogicError> {
        self.value()
            .and_then(T::from_value)
            .ok_or_else(|| LogicError::TypeMismatch {
                property: self.name.clone(),
                expected: self.ty,
                found: T::TYPE,
            })
    }

    /// Write an output value from inside the owning node's `update()`.
    ///
    /// Only valid on output properties; does not affect dirtiness.
    pub fn set_output(&mut self, value: impl Into<PropertyValue>) -> Result<(), LogicError> {
        let value = value.into();
        if !self.is_output() {
            return Err(LogicError::InvalidAccess {
                property: self.name.clone(),
                reason: AccessViolation::NotOutput,
            });
        }
        self.check_assignable(&value)?;
        if let Content::Value(current) = &mut self.content {
            *current = value;
        }
        Ok(())
    }

    /// External write with dirty tracking.
    ///
    /// Returns whether the owning node has to be marked dirty.
    pub(crate) fn set_value(&mut self, value: PropertyValue) -> Result<bool, LogicError> {
        if self.is_output() {
            return Err(LogicError::InvalidAccess {
                property: self.name.clone(),
                reason: AccessViolation::Output,
            });
        }
        if self.linked_input {
            return Err(LogicError::InvalidAccess {
                property: self.name.clone(),
                reason: AccessViolation::LinkedInput,
            });
        }
        self.check_assignable(&value)?;
        Ok(self.assign_tracked(value))
    }

    /// Assign an already type-checked value, applying dirty rules.
    ///
    /// Returns whether the owning node has to be marked dirty.
    pub(crate) fn assign_tracked(&mut self, value: PropertyValue) -> bool {
        let Content::Value(current) = &mut self.content else {
            debug_assert!(false, "tracked assignment to non-primitive '{}'", self.name);
            return false;
        };
        debug_assert_eq!(current.property_type(), value.property_type());

        let changed = *current != value;
        if changed {
            *current = value;
        }

        // Binding inputs re-assert their value even when it did not change.
        if self.semantics == PropertySemantics::BindingInput {
            self.has_new_value = true;
            return true;
        }
        changed
    }

    fn check_assignable(&self, value: &PropertyValue) -> Result<(), LogicError> {
        let found = value.property_type();
        if found != self.ty {
            return Err(LogicError::TypeMismatch {
                property: self.name.clone(),
                expected: self.ty,
                found,
            });
        }
        Ok(())
    }

    /// Whether a binding input received a write since it was last consumed.
    pub fn has_new_value(&self) -> bool {
        self.has_new_value
    }

    /// Read and clear the new-value flag of a binding input.
    pub fn consume_new_value(&mut self) -> bool {
        std::mem::take(&mut self.has_new_value)
    }

    pub(crate) fn set_linked_input(&mut self, linked: bool) {
        self.linked_input = linked;
    }

    /// Attach this tree to a logic node.
    ///
    /// # Panics
    ///
    /// Panics if the tree is already attached; properties are never
    /// transferred between logic nodes.
    pub(crate) fn attach(&mut self, node: NodeId, side: Side) {
        self.attach_at(PropertyHandle::root(node, side));
    }

    fn attach_at(&mut self, handle: PropertyHandle) {
        assert!(
            self.handle.is_none(),
            "property '{}' is already owned by logic node {}",
            self.name,
            self.owner().map(|id| id.to_string()).unwrap_or_default()
        );
        if let Content::Children(children) = &mut self.content {
            for (index, child) in children.iter_mut().enumerate() {
                child.attach_at(handle.child(index));
            }
        }
        self.handle = Some(handle);
    }

    /// Duplicate the tree's names, types and values.
    ///
    /// The copy is detached and carries no link or new-value flags, so it can
    /// serve as a fresh instance of a template interface.
    pub fn deep_copy(&self) -> Property {
        let content = match &self.content {
            Content::Value(value) => Content::Value(value.clone()),
            Content::Children(children) => {
                Content::Children(children.iter().map(Property::deep_copy).collect())
            }
        };
        Property {
            name: self.name.clone(),
            ty: self.ty,
            semantics: self.semantics,
            content,
            linked_input: false,
            has_new_value: false,
            handle: None,
        }
    }

    /// Whether both trees have the same names and types at every position.
    pub fn same_shape(&self, other: &Property) -> bool {
        self.name == other.name
            && self.ty == other.ty
            && self.child_count() == other.child_count()
            && self
                .children()
                .zip(other.children())
                .all(|(a, b)| a.same_shape(b))
    }

    /// Copy every primitive value from a tree of identical shape, without
    /// dirty tracking.
    pub(crate) fn restore_values_from(&mut self, other: &Property) {
        debug_assert!(self.same_shape(other));
        match (&mut self.content, &other.content) {
            (Content::Value(current), Content::Value(value)) => *current = value.clone(),
            (Content::Children(children), Content::Children(others)) => {
                for (child, source) in children.iter_mut().zip(others) {
                    child.restore_values_from(source);
                }
            }
            _ => {}
        }
    }
}
