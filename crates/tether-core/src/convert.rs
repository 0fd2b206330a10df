//! Conversion between fixed element types and [`Variant`].
//!
//! [`Element`] is implemented by every type a typed array view can hold.
//! [`Converter`] captures an element type's conversion pair as two plain
//! function pointers, so a typed view resolves it once at construction
//! and never dispatches per call.
//!
//! Conversions are lossless or fail: no kind coercion, no truncation.

use std::fmt;

use crate::error::ConversionError;
use crate::id::ObjectId;
use crate::storage::SharedArray;
use crate::variant::Variant;

/// A type that round-trips through [`Variant`] without loss.
pub trait Element: Sized {
    /// Name used in conversion errors.
    const TYPE_NAME: &'static str;

    /// Wrap the value in a variant.
    fn to_variant(&self) -> Variant;

    /// Extract a value, failing if the variant does not hold one exactly.
    fn from_variant(variant: &Variant) -> Result<Self, ConversionError>;
}

/// The to/from-variant function pair for one element type.
pub struct Converter<E> {
    to: fn(&E) -> Variant,
    from: fn(&Variant) -> Result<E, ConversionError>,
}

impl<E> Converter<E> {
    /// Build a converter from an explicit function pair.
    pub fn new(to: fn(&E) -> Variant, from: fn(&Variant) -> Result<E, ConversionError>) -> Self {
        Self { to, from }
    }

    /// Convert an element to a variant.
    pub fn to_variant(&self, value: &E) -> Variant {
        (self.to)(value)
    }

    /// Convert a variant to an element.
    pub fn from_variant(&self, variant: &Variant) -> Result<E, ConversionError> {
        (self.from)(variant)
    }
}

impl<E: Element> Converter<E> {
    /// The converter of an [`Element`] type.
    pub fn of() -> Self {
        Self::new(E::to_variant, E::from_variant)
    }
}

impl<E: Element> Default for Converter<E> {
    fn default() -> Self {
        Self::of()
    }
}

impl<E> Clone for Converter<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Converter<E> {}

impl<E> fmt::Debug for Converter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("element", &std::any::type_name::<E>())
            .finish()
    }
}

fn wrong_kind<T: Element>(variant: &Variant) -> ConversionError {
    ConversionError::WrongKind {
        expected: T::TYPE_NAME,
        found: variant.kind(),
    }
}

fn not_representable<T: Element>(variant: &Variant) -> ConversionError {
    ConversionError::NotRepresentable {
        expected: T::TYPE_NAME,
        value: variant.to_string(),
    }
}

/// Largest magnitude below which every integer is an exact `f64`.
const F64_EXACT_INT: u64 = 1 << 53;
/// Largest magnitude below which every integer is an exact `f32`.
const F32_EXACT_INT: u64 = 1 << 24;

impl Element for Variant {
    const TYPE_NAME: &'static str = "Variant";

    fn to_variant(&self) -> Variant {
        self.clone()
    }

    fn from_variant(variant: &Variant) -> Result<Self, ConversionError> {
        Ok(variant.clone())
    }
}

impl Element for bool {
    const TYPE_NAME: &'static str = "bool";

    fn to_variant(&self) -> Variant {
        Variant::Bool(*self)
    }

    fn from_variant(variant: &Variant) -> Result<Self, ConversionError> {
        variant.as_bool().ok_or_else(|| wrong_kind::<Self>(variant))
    }
}

impl Element for i64 {
    const TYPE_NAME: &'static str = "i64";

    fn to_variant(&self) -> Variant {
        Variant::Int(*self)
    }

    fn from_variant(variant: &Variant) -> Result<Self, ConversionError> {
        variant.as_int().ok_or_else(|| wrong_kind::<Self>(variant))
    }
}

impl Element for i32 {
    const TYPE_NAME: &'static str = "i32";

    fn to_variant(&self) -> Variant {
        Variant::Int((*self).into())
    }

    fn from_variant(variant: &Variant) -> Result<Self, ConversionError> {
        let wide = variant.as_int().ok_or_else(|| wrong_kind::<Self>(variant))?;
        i32::try_from(wide).map_err(|_| not_representable::<Self>(variant))
    }
}

impl Element for u32 {
    const TYPE_NAME: &'static str = "u32";

    fn to_variant(&self) -> Variant {
        Variant::Int((*self).into())
    }

    fn from_variant(variant: &Variant) -> Result<Self, ConversionError> {
        let wide = variant.as_int().ok_or_else(|| wrong_kind::<Self>(variant))?;
        u32::try_from(wide).map_err(|_| not_representable::<Self>(variant))
    }
}

impl Element for f64 {
    const TYPE_NAME: &'static str = "f64";

    fn to_variant(&self) -> Variant {
        Variant::Float(*self)
    }

    fn from_variant(variant: &Variant) -> Result<Self, ConversionError> {
        match variant {
            Variant::Float(x) => Ok(*x),
            Variant::Int(i) if i.unsigned_abs() <= F64_EXACT_INT => Ok(*i as f64),
            Variant::Int(_) => Err(not_representable::<Self>(variant)),
            _ => Err(wrong_kind::<Self>(variant)),
        }
    }
}

impl Element for f32 {
    const TYPE_NAME: &'static str = "f32";

    fn to_variant(&self) -> Variant {
        Variant::Float((*self).into())
    }

    fn from_variant(variant: &Variant) -> Result<Self, ConversionError> {
        match variant {
            Variant::Float(x) => {
                let narrow = *x as f32;
                if x.is_nan() || f64::from(narrow) == *x {
                    Ok(narrow)
                } else {
                    Err(not_representable::<Self>(variant))
                }
            }
            Variant::Int(i) if i.unsigned_abs() <= F32_EXACT_INT => Ok(*i as f32),
            Variant::Int(_) => Err(not_representable::<Self>(variant)),
            _ => Err(wrong_kind::<Self>(variant)),
        }
    }
}

impl Element for String {
    const TYPE_NAME: &'static str = "String";

    fn to_variant(&self) -> Variant {
        Variant::String(self.clone())
    }

    fn from_variant(variant: &Variant) -> Result<Self, ConversionError> {
        variant
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| wrong_kind::<Self>(variant))
    }
}

impl Element for ObjectId {
    const TYPE_NAME: &'static str = "ObjectId";

    fn to_variant(&self) -> Variant {
        Variant::Object(*self)
    }

    fn from_variant(variant: &Variant) -> Result<Self, ConversionError> {
        variant.as_object().ok_or_else(|| wrong_kind::<Self>(variant))
    }
}

impl Element for SharedArray {
    const TYPE_NAME: &'static str = "Array";

    fn to_variant(&self) -> Variant {
        Variant::Array(self.clone())
    }

    fn from_variant(variant: &Variant) -> Result<Self, ConversionError> {
        variant
            .as_array()
            .cloned()
            .ok_or_else(|| wrong_kind::<Self>(variant))
    }
}
