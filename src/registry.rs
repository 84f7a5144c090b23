//! Converters between config text and typed values.
//!
//! The [`TypeRegistry`] knows how to parse and format every built-in scalar
//! type and enum by itself. Anything else is a *custom* type and needs a
//! [`Converter`] registered for its [`TypeId`]:
//!
//! ```rust
//! use mcfg::{config_custom, TypeRegistry, ValueType};
//! use std::str::FromStr;
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Port(u16);
//!
//! config_custom!(Port);
//!
//! let mut registry = TypeRegistry::new();
//! registry.register(
//!     |text: &str| u16::from_str(text.trim_start_matches(':')).map(Port),
//!     |port: &Port| format!(":{}", port.0),
//! );
//!
//! let value = registry.parse(":8080", &ValueType::custom::<Port>()).unwrap();
//! assert_eq!(value.downcast::<Port>().unwrap(), Port(8080));
//! ```
//!
//! `TypeRegistry::new` also bundles converters for `chrono::DateTime<Utc>`
//! (RFC 3339) and `num_bigint::BigInt` (decimal digits).

use crate::{Error, Result, Value, ValueType};
use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use std::any::{Any, TypeId};
use std::fmt;
use std::str::FromStr;

type ParseFn = Box<dyn Fn(&str) -> Result<Box<dyn Any>> + Send + Sync>;
type FormatFn = Box<dyn Fn(&dyn Any) -> Option<String> + Send + Sync>;

/// A parse/format pair for one custom type.
pub struct Converter {
    type_name: &'static str,
    parse: ParseFn,
    format: FormatFn,
}

impl Converter {
    /// Builds a converter from a fallible parser and a formatter.
    pub fn new<T, E, P, F>(parse: P, format: F) -> Self
    where
        T: Any,
        E: fmt::Display,
        P: Fn(&str) -> std::result::Result<T, E> + Send + Sync + 'static,
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        let type_name = std::any::type_name::<T>();
        Converter {
            type_name,
            parse: Box::new(move |text: &str| match parse(text) {
                Ok(value) => Ok(Box::new(value) as Box<dyn Any>),
                Err(e) => Err(Error::conversion(text, type_name, e)),
            }),
            format: Box::new(move |value: &dyn Any| value.downcast_ref::<T>().map(&format)),
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Parses `text` into a [`Value::Custom`].
    ///
    /// # Errors
    ///
    /// Returns a conversion error if the parser rejects `text`.
    pub fn parse(&self, text: &str) -> Result<Value> {
        (self.parse)(text).map(Value::Custom)
    }

    /// Formats a value of this converter's type.
    ///
    /// # Errors
    ///
    /// Returns a schema error if `value` holds a different type.
    pub fn format(&self, value: &dyn Any) -> Result<String> {
        (self.format)(value).ok_or_else(|| {
            Error::schema(format!(
                "converter for {} received a value of another type",
                self.type_name
            ))
        })
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Maps value types to converters.
#[derive(Debug)]
pub struct TypeRegistry {
    converters: Vec<(TypeId, Converter)>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Creates a registry with the built-ins and the bundled `DateTime<Utc>`
    /// and `BigInt` converters.
    #[must_use]
    pub fn new() -> Self {
        Self::empty()
            .with_codec(
                |text: &str| DateTime::parse_from_rfc3339(text).map(|dt| dt.with_timezone(&Utc)),
                |dt: &DateTime<Utc>| dt.to_rfc3339(),
            )
            .with_codec(BigInt::from_str, BigInt::to_string)
    }

    /// Creates a registry that only handles built-in scalars and enums.
    #[must_use]
    pub fn empty() -> Self {
        TypeRegistry {
            converters: Vec::new(),
        }
    }

    /// Registers a converter for `T`.
    ///
    /// Lookup is by exact type and the first registration for a type wins,
    /// so registering `T` twice keeps the original converter.
    pub fn register<T, E, P, F>(&mut self, parse: P, format: F) -> &mut Self
    where
        T: Any,
        E: fmt::Display,
        P: Fn(&str) -> std::result::Result<T, E> + Send + Sync + 'static,
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.converters
            .push((TypeId::of::<T>(), Converter::new(parse, format)));
        self
    }

    /// Builder form of [`TypeRegistry::register`].
    #[must_use]
    pub fn with_codec<T, E, P, F>(mut self, parse: P, format: F) -> Self
    where
        T: Any,
        E: fmt::Display,
        P: Fn(&str) -> std::result::Result<T, E> + Send + Sync + 'static,
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.register(parse, format);
        self
    }

    /// Finds the converter for a type, or `None` if nothing was registered.
    #[must_use]
    pub fn lookup(&self, id: TypeId) -> Option<&Converter> {
        self.converters
            .iter()
            .find(|(key, _)| *key == id)
            .map(|(_, converter)| converter)
    }

    #[must_use]
    pub fn contains<T: Any>(&self) -> bool {
        self.lookup(TypeId::of::<T>()).is_some()
    }

    /// `true` if `ty` is written with leaf syntax by the registry itself.
    #[must_use]
    pub fn is_scalar(&self, ty: &ValueType) -> bool {
        ty.is_scalar()
    }

    /// Returns `true` if values of `ty` can be parsed and formatted.
    #[must_use]
    pub fn supports(&self, ty: &ValueType) -> bool {
        match ty {
            ValueType::Custom(custom) => self.lookup(custom.id()).is_some(),
            _ => true,
        }
    }

    /// Converts `text` into a value of the declared type.
    ///
    /// # Errors
    ///
    /// Returns a conversion error for malformed text or an unknown enum
    /// constant, and a schema error for a custom type with no converter.
    pub fn parse(&self, text: &str, ty: &ValueType) -> Result<Value> {
        let value = match ty {
            ValueType::Bool => Value::Bool(parse_str(text, ty)?),
            ValueType::Char => Value::Char(parse_str(text, ty)?),
            ValueType::I8 => Value::I8(parse_str(text, ty)?),
            ValueType::I16 => Value::I16(parse_str(text, ty)?),
            ValueType::I32 => Value::I32(parse_str(text, ty)?),
            ValueType::I64 => Value::I64(parse_str(text, ty)?),
            ValueType::U8 => Value::U8(parse_str(text, ty)?),
            ValueType::U16 => Value::U16(parse_str(text, ty)?),
            ValueType::U32 => Value::U32(parse_str(text, ty)?),
            ValueType::U64 => Value::U64(parse_str(text, ty)?),
            ValueType::F32 => Value::F32(parse_str(text, ty)?),
            ValueType::F64 => Value::F64(parse_str(text, ty)?),
            ValueType::String => Value::String(text.to_string()),
            ValueType::Enum(names) => {
                let name = names.iter().find(|name| **name == text).ok_or_else(|| {
                    Error::conversion(text, "enum", format!("expected one of {}", names.join(", ")))
                })?;
                Value::Enum(*name)
            }
            ValueType::Custom(custom) => self
                .lookup(custom.id())
                .ok_or_else(|| {
                    Error::schema(format!("no converter registered for {}", custom.name()))
                })?
                .parse(text)?,
        };
        Ok(value)
    }

    /// Formats a value of the declared type as config text.
    ///
    /// # Errors
    ///
    /// Returns a schema error if the value is not of the declared type, or
    /// if a custom value has no converter.
    pub fn format(&self, value: &Value, ty: &ValueType) -> Result<String> {
        if !value.is_of_type(ty) {
            return Err(Error::schema(format!(
                "{} value `{:?}` declared as {}",
                value.kind_name(),
                value,
                ty
            )));
        }
        match (value, ty) {
            (Value::Custom(inner), ValueType::Custom(custom)) => self
                .lookup(custom.id())
                .ok_or_else(|| {
                    Error::schema(format!("no converter registered for {}", custom.name()))
                })?
                .format(&**inner),
            (value, _) => Ok(value.to_string()),
        }
    }
}

fn parse_str<T>(text: &str, ty: &ValueType) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    text.parse::<T>()
        .map_err(|e| Error::conversion(text, ty.name(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Celsius(f64);

    crate::config_custom!(Celsius);

    #[test]
    fn test_parse_builtins() {
        let registry = TypeRegistry::empty();
        assert_eq!(registry.parse("true", &ValueType::Bool).unwrap(), Value::Bool(true));
        assert_eq!(registry.parse("x", &ValueType::Char).unwrap(), Value::Char('x'));
        assert_eq!(registry.parse("-12", &ValueType::I8).unwrap(), Value::I8(-12));
        assert_eq!(registry.parse("65535", &ValueType::U16).unwrap(), Value::U16(65535));
        assert_eq!(registry.parse("2.5", &ValueType::F32).unwrap(), Value::F32(2.5));
        assert_eq!(
            registry.parse(" padded ", &ValueType::String).unwrap(),
            Value::String(" padded ".to_string())
        );
    }

    #[test]
    fn test_parse_malformed_numeral() {
        let registry = TypeRegistry::empty();
        let err = registry.parse("12abc", &ValueType::I32).unwrap_err();
        assert!(err.is_conversion());
        assert!(registry.parse("300", &ValueType::U8).unwrap_err().is_conversion());
        assert!(registry.parse("yes", &ValueType::Bool).unwrap_err().is_conversion());
        assert!(registry.parse("ab", &ValueType::Char).unwrap_err().is_conversion());
    }

    #[test]
    fn test_parse_enum_exact_match() {
        let registry = TypeRegistry::empty();
        let ty = ValueType::Enum(&["Red", "Green"]);
        assert_eq!(registry.parse("Green", &ty).unwrap(), Value::Enum("Green"));

        let err = registry.parse("green", &ty).unwrap_err();
        assert!(err.is_conversion());
        assert!(err.to_string().contains("Red, Green"));
    }

    #[test]
    fn test_custom_codec_round_trip() {
        let registry = TypeRegistry::empty().with_codec(
            |text: &str| text.trim_end_matches('C').parse::<f64>().map(Celsius),
            |c: &Celsius| format!("{}C", c.0),
        );
        let ty = ValueType::custom::<Celsius>();

        let value = registry.parse("21.5C", &ty).unwrap();
        assert_eq!(registry.format(&value, &ty).unwrap(), "21.5C");
        assert_eq!(value.downcast::<Celsius>().unwrap(), Celsius(21.5));

        assert!(registry.parse("warm", &ty).unwrap_err().is_conversion());
    }

    #[test]
    fn test_missing_converter_is_schema_error() {
        let registry = TypeRegistry::empty();
        let ty = ValueType::custom::<Celsius>();
        assert!(registry.lookup(TypeId::of::<Celsius>()).is_none());
        assert!(!registry.supports(&ty));
        assert!(registry.parse("1C", &ty).unwrap_err().is_schema());

        let value = Value::Custom(Box::new(Celsius(1.0)));
        assert!(registry.format(&value, &ty).unwrap_err().is_schema());
    }

    #[test]
    fn test_format_rejects_value_of_other_type() {
        let registry = TypeRegistry::empty();
        assert_eq!(registry.format(&Value::U8(200), &ValueType::U8).unwrap(), "200");

        let err = registry.format(&Value::I32(300), &ValueType::U8).unwrap_err();
        assert!(err.is_schema());
        assert!(err.to_string().contains("u8"));
        assert!(registry
            .format(&Value::from("x"), &ValueType::U8)
            .unwrap_err()
            .is_schema());
        assert!(registry
            .format(&Value::Enum("Blue"), &ValueType::Enum(&["Red", "Green"]))
            .unwrap_err()
            .is_schema());

        let celsius = Value::Custom(Box::new(Celsius(1.0)));
        assert!(registry.format(&celsius, &ValueType::String).unwrap_err().is_schema());
    }

    #[test]
    fn test_first_registration_wins() {
        let mut registry = TypeRegistry::empty();
        registry
            .register(|t: &str| t.parse::<f64>().map(Celsius), |c: &Celsius| format!("first {}", c.0))
            .register(|t: &str| t.parse::<f64>().map(Celsius), |c: &Celsius| format!("second {}", c.0));

        let ty = ValueType::custom::<Celsius>();
        let value = Value::Custom(Box::new(Celsius(3.0)));
        assert_eq!(registry.format(&value, &ty).unwrap(), "first 3");
    }

    #[test]
    fn test_bundled_codecs() {
        let registry = TypeRegistry::new();
        assert!(registry.contains::<DateTime<Utc>>());
        assert!(registry.contains::<BigInt>());

        let ty = ValueType::custom::<BigInt>();
        let big = "123456789012345678901234567890";
        let value = registry.parse(big, &ty).unwrap();
        assert_eq!(registry.format(&value, &ty).unwrap(), big);

        let ty = ValueType::custom::<DateTime<Utc>>();
        let value = registry.parse("2024-01-15T10:30:00+00:00", &ty).unwrap();
        assert_eq!(
            registry.format(&value, &ty).unwrap(),
            "2024-01-15T10:30:00+00:00"
        );
    }

    #[test]
    fn test_scalar_classification() {
        let registry = TypeRegistry::new();
        assert!(registry.is_scalar(&ValueType::String));
        assert!(registry.is_scalar(&ValueType::Enum(&["A"])));
        assert!(!registry.is_scalar(&ValueType::custom::<BigInt>()));
    }
}
