//! Property Types and Values
//!
//! A property's type and its stored value are never independent: primitive
//! values are a closed sum type, and a property's [`PropertyType`] is derived
//! from the value it was constructed with (or the default for that type).

use std::fmt;

use serde::{Deserialize, Serialize};

/// The type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    Bool,
    Int32,
    Float,
    String,
    Vec2f,
    Vec3f,
    Vec4f,
    Vec2i,
    Vec3i,
    Vec4i,
    Struct,
    Array,
}

impl PropertyType {
    /// Whether properties of this type carry a value.
    pub fn is_primitive(self) -> bool {
        !self.can_have_children()
    }

    /// Whether properties of this type carry children instead of a value.
    pub fn can_have_children(self) -> bool {
        matches!(self, PropertyType::Struct | PropertyType::Array)
    }

    /// Human-readable type name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            PropertyType::Bool => "BOOL",
            PropertyType::Int32 => "INT",
            PropertyType::Float => "FLOAT",
            PropertyType::String => "STRING",
            PropertyType::Vec2f => "VEC2F",
            PropertyType::Vec3f => "VEC3F",
            PropertyType::Vec4f => "VEC4F",
            PropertyType::Vec2i => "VEC2I",
            PropertyType::Vec3i => "VEC3I",
            PropertyType::Vec4i => "VEC4I",
            PropertyType::Struct => "STRUCT",
            PropertyType::Array => "ARRAY",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Who is allowed to write a property.
///
/// Fixed at construction and uniform across a whole tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertySemantics {
    /// Input of a script; written by the host or by a link.
    ScriptInput,
    /// Output of a script; written only by the owning node's `update()`.
    ScriptOutput,
    /// Input of a resource binding; every external write flags a new value.
    BindingInput,
}

impl PropertySemantics {
    pub fn is_input(self) -> bool {
        matches!(
            self,
            PropertySemantics::ScriptInput | PropertySemantics::BindingInput
        )
    }

    pub fn is_output(self) -> bool {
        self == PropertySemantics::ScriptOutput
    }
}

/// The value of a primitive property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Bool(bool),
    Int32(i32),
    Float(f32),
    String(String),
    Vec2f([f32; 2]),
    Vec3f([f32; 3]),
    Vec4f([f32; 4]),
    Vec2i([i32; 2]),
    Vec3i([i32; 3]),
    Vec4i([i32; 4]),
}

impl PropertyValue {
    /// The property type this value belongs to.
    pub fn property_type(&self) -> PropertyType {
        match self {
            PropertyValue::Bool(_) => PropertyType::Bool,
            PropertyValue::Int32(_) => PropertyType::Int32,
            PropertyValue::Float(_) => PropertyType::Float,
            PropertyValue::String(_) => PropertyType::String,
            PropertyValue::Vec2f(_) => PropertyType::Vec2f,
            PropertyValue::Vec3f(_) => PropertyType::Vec3f,
            PropertyValue::Vec4f(_) => PropertyType::Vec4f,
            PropertyValue::Vec2i(_) => PropertyType::Vec2i,
            PropertyValue::Vec3i(_) => PropertyType::Vec3i,
            PropertyValue::Vec4i(_) => PropertyType::Vec4i,
        }
    }

    /// The zero value of a primitive type, `None` for struct and array.
    pub fn default_for(ty: PropertyType) -> Option<Self> {
        let value = match ty {
            PropertyType::Bool => PropertyValue::Bool(false),
            PropertyType::Int32 => PropertyValue::Int32(0),
            PropertyType::Float => PropertyValue::Float(0.0),
            PropertyType::String => PropertyValue::String(String::new()),
            PropertyType::Vec2f => PropertyValue::Vec2f([0.0; 2]),
            PropertyType::Vec3f => PropertyValue::Vec3f([0.0; 3]),
            PropertyType::Vec4f => PropertyValue::Vec4f([0.0; 4]),
            PropertyType::Vec2i => PropertyValue::Vec2i([0; 2]),
            PropertyType::Vec3i => PropertyValue::Vec3i([0; 3]),
            PropertyType::Vec4i => PropertyValue::Vec4i([0; 4]),
            PropertyType::Struct | PropertyType::Array => return None,
        };
        Some(value)
    }
}

/// Rust types that map onto exactly one primitive [`PropertyType`].
pub trait Primitive: Sized {
    const TYPE: PropertyType;

    fn from_value(value: &PropertyValue) -> Option<Self>;

    fn into_value(self) -> PropertyValue;
}

macro_rules! primitive {
    ($($rust:ty => $variant:ident),* $(,)?) => {
        $(
            impl Primitive for $rust {
                const TYPE: PropertyType = PropertyType::$variant;

                fn from_value(value: &PropertyValue) -> Option<Self> {
                    match value {
                        PropertyValue::$variant(v) => Some(v.clone()),
                        _ => None,
                    }
                }

                fn into_value(self) -> PropertyValue {
                    PropertyValue::$variant(self)
                }
            }

            impl From<$rust> for PropertyValue {
                fn from(value: $rust) -> Self {
                    PropertyValue::$variant(value)
                }
            }
        )*
    };
}

primitive! {
    bool => Bool,
    i32 => Int32,
    f32 => Float,
    String => String,
    [f32; 2] => Vec2f,
    [f32; 3] => Vec3f,
    [f32; 4] => Vec4f,
    [i32; 2] => Vec2i,
    [i32; 3] => Vec3i,
    [i32; 4] => Vec4i,
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_owned())
    }
}
