//! Typed values exchanged between schemas and the codec registry.
//!
//! ## Core Types
//!
//! - [`Value`]: one attribute value (or one list element) in transit between a
//!   schema instance and its text form
//! - [`ValueType`]: the declared type of an attribute, used to pick a converter
//! - [`ConfigType`]: bridges a concrete Rust type to [`Value`] and [`ValueType`]
//!
//! Every built-in scalar (`bool`, `char`, the integer and float widths and
//! `String`) implements [`ConfigType`]. Enums opt in with
//! [`config_enum!`](crate::config_enum) and types handled by a custom codec
//! opt in with [`config_custom!`](crate::config_custom).
//!
//! ```rust
//! use mcfg::{ConfigType, Value, ValueType};
//!
//! assert_eq!(i32::value_type(), ValueType::I32);
//! assert_eq!(42i32.to_value(), Value::I32(42));
//! assert_eq!(i32::from_value(Value::I32(7)).unwrap(), 7);
//! ```

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use serde::{Serialize, Serializer};
use std::any::{Any, TypeId};
use std::fmt;

/// A single config value.
///
/// Nested objects and lists are not values: they are reached through the
/// attribute kinds of a [`Schema`](crate::Schema). `Custom` holds an opaque
/// value that only a registered converter knows how to read and write.
pub enum Value {
    Bool(bool),
    Char(char),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    /// Name of an enum constant.
    Enum(&'static str),
    Custom(Box<dyn Any>),
}

impl Value {
    /// Short name of the variant, used in error messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::I8(_) => "i8",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::U8(_) => "u8",
            Value::U16(_) => "u16",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::String(_) => "string",
            Value::Enum(_) => "enum",
            Value::Custom(_) => "custom",
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns any signed or unsigned integer that fits in an `i64`.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::I8(v) => Some(i64::from(v)),
            Value::I16(v) => Some(i64::from(v)),
            Value::I32(v) => Some(i64::from(v)),
            Value::I64(v) => Some(v),
            Value::U8(v) => Some(i64::from(v)),
            Value::U16(v) => Some(i64::from(v)),
            Value::U32(v) => Some(i64::from(v)),
            Value::U64(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::F32(v) => Some(f64::from(v)),
            Value::F64(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_enum(&self) -> Option<&'static str> {
        match self {
            Value::Enum(name) => Some(*name),
            _ => None,
        }
    }

    /// Unwraps a `Custom` value holding a `T`.
    ///
    /// # Errors
    ///
    /// Returns a schema error if the value is not `Custom` or holds another type.
    pub fn downcast<T: Any>(self) -> Result<T> {
        let expected = std::any::type_name::<T>();
        match self {
            Value::Custom(inner) => inner
                .downcast::<T>()
                .map(|boxed| *boxed)
                .map_err(|_| Error::schema(format!("custom value is not a {}", expected))),
            other => Err(Error::schema(format!(
                "expected custom {} value, found {}",
                expected,
                other.kind_name()
            ))),
        }
    }

    /// `true` if this value is an instance of `ty`. Enum names must be one of
    /// the declared constants.
    #[must_use]
    pub fn is_of_type(&self, ty: &ValueType) -> bool {
        match (self, ty) {
            (Value::Bool(_), ValueType::Bool)
            | (Value::Char(_), ValueType::Char)
            | (Value::I8(_), ValueType::I8)
            | (Value::I16(_), ValueType::I16)
            | (Value::I32(_), ValueType::I32)
            | (Value::I64(_), ValueType::I64)
            | (Value::U8(_), ValueType::U8)
            | (Value::U16(_), ValueType::U16)
            | (Value::U32(_), ValueType::U32)
            | (Value::U64(_), ValueType::U64)
            | (Value::F32(_), ValueType::F32)
            | (Value::F64(_), ValueType::F64)
            | (Value::String(_), ValueType::String) => true,
            (Value::Enum(name), ValueType::Enum(names)) => names.contains(name),
            (Value::Custom(inner), ValueType::Custom(custom)) => (**inner).type_id() == custom.id(),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Value::Char(v) => f.debug_tuple("Char").field(v).finish(),
            Value::I8(v) => f.debug_tuple("I8").field(v).finish(),
            Value::I16(v) => f.debug_tuple("I16").field(v).finish(),
            Value::I32(v) => f.debug_tuple("I32").field(v).finish(),
            Value::I64(v) => f.debug_tuple("I64").field(v).finish(),
            Value::U8(v) => f.debug_tuple("U8").field(v).finish(),
            Value::U16(v) => f.debug_tuple("U16").field(v).finish(),
            Value::U32(v) => f.debug_tuple("U32").field(v).finish(),
            Value::U64(v) => f.debug_tuple("U64").field(v).finish(),
            Value::F32(v) => f.debug_tuple("F32").field(v).finish(),
            Value::F64(v) => f.debug_tuple("F64").field(v).finish(),
            Value::String(v) => f.debug_tuple("String").field(v).finish(),
            Value::Enum(v) => f.debug_tuple("Enum").field(v).finish(),
            Value::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Structural equality. Custom values never compare equal, since only their
/// converter knows what they contain.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::I8(a), Value::I8(b)) => a == b,
            (Value::I16(a), Value::I16(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::U8(a), Value::U8(b)) => a == b,
            (Value::U16(a), Value::U16(b)) => a == b,
            (Value::U32(a), Value::U32(b)) => a == b,
            (Value::U64(a), Value::U64(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            _ => false,
        }
    }
}

/// Text form of built-in values, exactly as written after `=`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::Char(v) => write!(f, "{}", v),
            Value::I8(v) => write!(f, "{}", v),
            Value::I16(v) => write!(f, "{}", v),
            Value::I32(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::U8(v) => write!(f, "{}", v),
            Value::U16(v) => write!(f, "{}", v),
            Value::U32(v) => write!(f, "{}", v),
            Value::U64(v) => write!(f, "{}", v),
            Value::F32(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::String(v) => f.write_str(v),
            Value::Enum(v) => f.write_str(v),
            Value::Custom(_) => f.write_str("<custom>"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Char(v) => serializer.serialize_char(*v),
            Value::I8(v) => serializer.serialize_i8(*v),
            Value::I16(v) => serializer.serialize_i16(*v),
            Value::I32(v) => serializer.serialize_i32(*v),
            Value::I64(v) => serializer.serialize_i64(*v),
            Value::U8(v) => serializer.serialize_u8(*v),
            Value::U16(v) => serializer.serialize_u16(*v),
            Value::U32(v) => serializer.serialize_u32(*v),
            Value::U64(v) => serializer.serialize_u64(*v),
            Value::F32(v) => serializer.serialize_f32(*v),
            Value::F64(v) => serializer.serialize_f64(*v),
            Value::String(v) => serializer.serialize_str(v),
            Value::Enum(v) => serializer.serialize_str(v),
            Value::Custom(_) => Err(serde::ser::Error::custom(
                "custom values must be formatted by their converter before serializing",
            )),
        }
    }
}

macro_rules! impl_from_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from_primitive! {
    bool => Bool,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => String,
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

/// Identity of a type handled by a custom converter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CustomType {
    id: TypeId,
    name: &'static str,
}

impl CustomType {
    #[must_use]
    pub fn of<T: Any>() -> Self {
        CustomType {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// The declared type of a scalar attribute or list element.
///
/// Built-ins and enums are *scalar*: they are parsed and formatted by the
/// registry itself. `Custom` types need a converter registered with
/// [`TypeRegistry::register`](crate::TypeRegistry::register).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueType {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    String,
    /// Enum matched by constant name; holds the declared names in order.
    Enum(&'static [&'static str]),
    Custom(CustomType),
}

impl ValueType {
    #[must_use]
    pub fn custom<T: Any>() -> Self {
        ValueType::Custom(CustomType::of::<T>())
    }

    /// `true` for built-ins and enums, `false` for custom types.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        !matches!(self, ValueType::Custom(_))
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Bool => "bool",
            ValueType::Char => "char",
            ValueType::I8 => "i8",
            ValueType::I16 => "i16",
            ValueType::I32 => "i32",
            ValueType::I64 => "i64",
            ValueType::U8 => "u8",
            ValueType::U16 => "u16",
            ValueType::U32 => "u32",
            ValueType::U64 => "u64",
            ValueType::F32 => "f32",
            ValueType::F64 => "f64",
            ValueType::String => "string",
            ValueType::Enum(_) => "enum",
            ValueType::Custom(custom) => custom.name(),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Enum(names) => write!(f, "enum [{}]", names.join(", ")),
            other => f.write_str(other.name()),
        }
    }
}

/// A Rust type that can be stored in a scalar attribute or list.
pub trait ConfigType: Sized + 'static {
    fn value_type() -> ValueType;

    fn to_value(&self) -> Value;

    /// # Errors
    ///
    /// Returns a schema error if `value` does not hold this type.
    fn from_value(value: Value) -> Result<Self>;
}

fn mismatch(expected: ValueType, found: &Value) -> Error {
    Error::schema(format!(
        "expected {} value, found {}",
        expected.name(),
        found.kind_name()
    ))
}

macro_rules! impl_config_type {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl ConfigType for $ty {
                fn value_type() -> ValueType {
                    ValueType::$variant
                }

                fn to_value(&self) -> Value {
                    Value::$variant(self.clone())
                }

                fn from_value(value: Value) -> Result<Self> {
                    match value {
                        Value::$variant(v) => Ok(v),
                        other => Err(mismatch(ValueType::$variant, &other)),
                    }
                }
            }
        )*
    };
}

impl_config_type! {
    bool => Bool,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => String,
}

// Handled by the codecs bundled in `TypeRegistry::new`.
crate::config_custom!(DateTime<Utc>, BigInt);
