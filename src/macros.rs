/// Declares an enum whose constants are stored in config files by name.
///
/// The generated type implements [`ConfigType`](crate::ConfigType) with
/// [`ValueType::Enum`](crate::ValueType::Enum), plus an inherent `NAMES`
/// constant and a `name()` accessor. Parsing requires an exact,
/// case-sensitive match against a constant name.
///
/// ```rust
/// use mcfg::{config_enum, ConfigType, Value};
///
/// config_enum! {
///     #[derive(Debug, Clone, Copy, PartialEq, Default)]
///     pub enum Quality {
///         Low,
///         #[default]
///         Medium,
///         High,
///     }
/// }
///
/// assert_eq!(Quality::High.name(), "High");
/// assert_eq!(Quality::from_value(Value::Enum("Low")).unwrap(), Quality::Low);
/// ```
#[macro_export]
macro_rules! config_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),+
        }

        impl $name {
            /// Constant names in declaration order.
            pub const NAMES: &'static [&'static str] = &[$(stringify!($variant)),+];

            /// The constant's name as written to config files.
            pub fn name(&self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }
        }

        impl $crate::ConfigType for $name {
            fn value_type() -> $crate::ValueType {
                $crate::ValueType::Enum(Self::NAMES)
            }

            fn to_value(&self) -> $crate::Value {
                $crate::Value::Enum(self.name())
            }

            fn from_value(value: $crate::Value) -> $crate::Result<Self> {
                let name = value.as_enum().ok_or_else(|| {
                    $crate::Error::schema(format!(
                        "expected {} constant, found {}",
                        stringify!($name),
                        value.kind_name()
                    ))
                })?;
                $(
                    if name == stringify!($variant) {
                        return Ok($name::$variant);
                    }
                )+
                Err($crate::Error::conversion(
                    name,
                    stringify!($name),
                    "no constant with this name",
                ))
            }
        }
    };
}

/// Marks `Clone` types as custom attribute types.
///
/// Values of these types travel as [`Value::Custom`](crate::Value::Custom)
/// and are parsed and formatted by the converter registered for them in a
/// [`TypeRegistry`](crate::TypeRegistry).
///
/// ```rust
/// use mcfg::{config_custom, ConfigType, ValueType};
///
/// #[derive(Clone, Debug, PartialEq)]
/// pub struct Rgb(u8, u8, u8);
///
/// config_custom!(Rgb);
///
/// assert_eq!(Rgb::value_type(), ValueType::custom::<Rgb>());
/// ```
#[macro_export]
macro_rules! config_custom {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::ConfigType for $ty {
                fn value_type() -> $crate::ValueType {
                    $crate::ValueType::custom::<$ty>()
                }

                fn to_value(&self) -> $crate::Value {
                    $crate::Value::Custom(::std::boxed::Box::new(::std::clone::Clone::clone(self)))
                }

                fn from_value(value: $crate::Value) -> $crate::Result<Self> {
                    value.downcast::<$ty>()
                }
            }
        )+
    };
}
