//! Identity maps used while saving and loading.
//!
//! Links are stored as pairs of property positions. Saving needs to know
//! at which position each live property was written; loading needs to know
//! which live property was rebuilt from each position.

use std::collections::HashMap;

use crate::error::LogicError;
use crate::property::PropertyHandle;

use super::format::PropertyIndex;

/// Live property to its position in the document being written.
#[derive(Debug, Default)]
pub struct SerializationMap {
    properties: HashMap<PropertyHandle, PropertyIndex>,
}

impl SerializationMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember where a property was written.
    ///
    /// Every property is written exactly once; storing one twice is a bug
    /// in the writer.
    pub fn store(&mut self, handle: PropertyHandle, index: PropertyIndex) {
        let previous = self.properties.insert(handle, index);
        debug_assert!(previous.is_none(), "property written twice");
    }

    pub fn resolve(&self, handle: &PropertyHandle) -> Result<PropertyIndex, LogicError> {
        self.properties.get(handle).copied().ok_or_else(|| {
            LogicError::serialization(format!("property {handle} was not written"))
        })
    }
}

/// Position in the document being read to the rebuilt live property.
#[derive(Debug, Default)]
pub struct DeserializationMap {
    properties: HashMap<PropertyIndex, PropertyHandle>,
}

impl DeserializationMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember which property was rebuilt from a position.
    ///
    /// Fails if the position was already used, which means two trees in
    /// the document share a property.
    pub fn store(&mut self, index: PropertyIndex, handle: PropertyHandle) -> Result<(), LogicError> {
        if self.properties.contains_key(&index) {
            return Err(LogicError::serialization(format!(
                "property {index} is referenced more than once"
            )));
        }
        self.properties.insert(index, handle);
        Ok(())
    }

    pub fn resolve(&self, index: PropertyIndex) -> Result<&PropertyHandle, LogicError> {
        self.properties.get(&index).ok_or_else(|| {
            LogicError::serialization(format!("link refers to unknown property {index}"))
        })
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}
