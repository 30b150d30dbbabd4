//! On-disk schema.
//!
//! A saved graph is one MessagePack document. Properties live in a flat
//! table and refer to their children by position, nodes refer to their
//! root properties by position, and links are pairs of positions. Positions
//! are only meaningful inside one document.

use serde::{Deserialize, Serialize};

use crate::error::LogicError;
use crate::node::NodeDescriptor;
use crate::property::{PropertyType, PropertyValue};

pub const MAGIC: [u8; 4] = *b"WEFT";

/// Documents with a different major version are rejected.
pub const FORMAT_VERSION: Version = Version { major: 1, minor: 0 };

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub major: u16,
    pub minor: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub magic: [u8; 4],
    pub version: Version,
    /// Name and version of the library that wrote the file.
    pub producer: String,
}

impl Header {
    pub fn current() -> Self {
        Self {
            magic: MAGIC,
            version: FORMAT_VERSION,
            producer: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn check(&self) -> Result<(), LogicError> {
        if self.magic != MAGIC {
            return Err(LogicError::serialization(
                "data is not a saved logic graph (wrong magic)",
            ));
        }
        if self.version.major != FORMAT_VERSION.major {
            return Err(LogicError::serialization(format!(
                "format version {}.{} is not supported, expected {}.x (written by '{}')",
                self.version.major, self.version.minor, FORMAT_VERSION.major, self.producer
            )));
        }
        Ok(())
    }
}

/// Position of a property in [`Document::properties`].
pub type PropertyIndex = u32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedProperty {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: PropertyType,
    /// Present exactly for primitive types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<PropertyValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PropertyIndex>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedNode {
    pub name: String,
    pub descriptor: NodeDescriptor,
    pub inputs: PropertyIndex,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<PropertyIndex>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedLink {
    pub source: PropertyIndex,
    pub target: PropertyIndex,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub header: Header,
    pub nodes: Vec<SerializedNode>,
    pub properties: Vec<SerializedProperty>,
    pub links: Vec<SerializedLink>,
}

impl Document {
    pub fn encode(&self) -> Result<Vec<u8>, LogicError> {
        rmp_serde::to_vec_named(self).map_err(|err| LogicError::serialization(err.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, LogicError> {
        let document: Document = rmp_serde::from_slice(bytes)
            .map_err(|err| LogicError::serialization(format!("malformed data: {err}")))?;
        document.header.check()?;
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty() -> Document {
        Document {
            header: Header::current(),
            nodes: Vec::new(),
            properties: Vec::new(),
            links: Vec::new(),
        }
    }

    #[test]
    fn header_is_checked() {
        let mut document = empty();
        document.header.magic = *b"NOPE";
        let bytes = document.encode().unwrap();
        assert!(matches!(
            Document::decode(&bytes),
            Err(LogicError::Serialization(msg)) if msg.contains("magic")
        ));

        let mut document = empty();
        document.header.version.major += 1;
        let bytes = document.encode().unwrap();
        assert!(Document::decode(&bytes).is_err());

        let mut document = empty();
        document.header.version.minor += 1;
        let bytes = document.encode().unwrap();
        assert!(Document::decode(&bytes).is_ok());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            Document::decode(&[0xc1, 0x00, 0x13]),
            Err(LogicError::Serialization(_))
        ));
        assert!(Document::decode(&[]).is_err());
    }
}
