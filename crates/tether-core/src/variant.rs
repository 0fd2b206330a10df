//! The dynamically tagged [`Variant`] value.
//!
//! A variant is a closed sum over the value kinds a native array can hold.
//! Scalars and strings are copied by value. [`Variant::Array`] shares its
//! [`SharedArray`] storage (cloning the variant aliases the array), and
//! [`Variant::Object`] is an opaque foreign reference that no operation
//! ever duplicates.

use std::cmp::Ordering;
use std::fmt;

use crate::id::ObjectId;
use crate::status::NativeStatus;
use crate::storage::SharedArray;
use crate::DEFAULT_MAX_RECURSION;

/// A dynamically tagged value.
#[derive(Clone, Debug, Default)]
pub enum Variant {
    /// The absence of a value. New array slots hold `Nil`.
    #[default]
    Nil,
    /// A boolean.
    Bool(bool),
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit float.
    Float(f64),
    /// An owned string.
    String(String),
    /// A reference to a native array.
    Array(SharedArray),
    /// A reference to a foreign object.
    Object(ObjectId),
}

/// The kind tag of a [`Variant`], used in diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VariantKind {
    /// [`Variant::Nil`].
    Nil,
    /// [`Variant::Bool`].
    Bool,
    /// [`Variant::Int`].
    Int,
    /// [`Variant::Float`].
    Float,
    /// [`Variant::String`].
    String,
    /// [`Variant::Array`].
    Array,
    /// [`Variant::Object`].
    Object,
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Nil => "nil",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        };
        f.write_str(name)
    }
}

impl Variant {
    /// The kind tag of this value.
    pub fn kind(&self) -> VariantKind {
        match self {
            Self::Nil => VariantKind::Nil,
            Self::Bool(_) => VariantKind::Bool,
            Self::Int(_) => VariantKind::Int,
            Self::Float(_) => VariantKind::Float,
            Self::String(_) => VariantKind::String,
            Self::Array(_) => VariantKind::Array,
            Self::Object(_) => VariantKind::Object,
        }
    }

    /// Whether this is [`Variant::Nil`].
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// The boolean payload, if any.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The integer payload, if any.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The float payload, if any.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// The string payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The nested array, if any.
    pub fn as_array(&self) -> Option<&SharedArray> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// The object reference, if any.
    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Self::Object(id) => Some(*id),
            _ => None,
        }
    }

    /// Copy this value.
    ///
    /// With `deep`, nested arrays are duplicated recursively; otherwise they
    /// are shared. Objects are never duplicated. `depth_left` bounds the
    /// recursion.
    pub fn duplicate(&self, deep: bool, depth_left: usize) -> Result<Variant, NativeStatus> {
        match self {
            Self::Array(array) if deep => Ok(Self::Array(array.duplicate(true, depth_left)?)),
            other => Ok(other.clone()),
        }
    }

    /// Structural equality: nested arrays compare by content.
    ///
    /// Ints and floats compare numerically.
    pub fn recursive_eq(&self, other: &Variant, depth_left: usize) -> Result<bool, NativeStatus> {
        Ok(match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Int(a), Self::Float(b)) | (Self::Float(b), Self::Int(a)) => (*a as f64) == *b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a.recursive_eq(b, depth_left)?,
            _ => false,
        })
    }

    /// The variant ordering, if the two values are mutually comparable.
    ///
    /// Numbers compare numerically across `Int`/`Float`, strings
    /// lexicographically, arrays element-wise. `Nil` and objects are not
    /// ordered.
    pub fn compare(&self, other: &Variant, depth_left: usize) -> Option<Ordering> {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Int(a), Self::Float(b)) => (*a as f64).partial_cmp(b),
            (Self::Float(a), Self::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            (Self::Array(a), Self::Array(b)) => a.compare(b, depth_left),
            _ => None,
        }
    }

    /// Write this value the way it appears inside a stringified array:
    /// strings are quoted.
    pub(crate) fn write_nested(&self, out: &mut String, depth_left: usize) {
        match self {
            Self::String(s) => {
                out.push('"');
                out.push_str(s);
                out.push('"');
            }
            Self::Array(array) => array.write_to(out, depth_left),
            other => out.push_str(&other.to_string()),
        }
    }
}

impl PartialEq for Variant {
    fn eq(&self, other: &Self) -> bool {
        self.recursive_eq(other, DEFAULT_MAX_RECURSION)
            .unwrap_or(false)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("<null>"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => {
                if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 {
                    write!(f, "{x:.1}")
                } else {
                    write!(f, "{x}")
                }
            }
            Self::String(s) => f.write_str(s),
            Self::Array(array) => f.write_str(&array.stringify(DEFAULT_MAX_RECURSION)),
            Self::Object(id) => write!(f, "<Object#{id}>"),
        }
    }
}

impl From<bool> for Variant {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Variant {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Variant {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<u32> for Variant {
    fn from(v: u32) -> Self {
        Self::Int(v.into())
    }
}

impl From<f64> for Variant {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<f32> for Variant {
    fn from(v: f32) -> Self {
        Self::Float(v.into())
    }
}

impl From<&str> for Variant {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for Variant {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<SharedArray> for Variant {
    fn from(v: SharedArray) -> Self {
        Self::Array(v)
    }
}

impl From<ObjectId> for Variant {
    fn from(v: ObjectId) -> Self {
        Self::Object(v)
    }
}
