//! # mcfg
//!
//! A small, indentation-based config file format bound to explicit schemas.
//!
//! A config type lists its attributes once, in a [`Schema`] table. The same
//! table drives reading, writing and canonicalization: every time a file is
//! loaded through [`get_or_create`] it is rewritten from the schema, so new
//! attributes appear with their defaults, removed attributes disappear and
//! comments always match the code.
//!
//! ## Quick Start
//!
//! ```rust
//! use mcfg::{config_enum, from_str_into, to_string, Attribute, Schema};
//!
//! config_enum! {
//!     #[derive(Debug, Clone, Copy, PartialEq)]
//!     pub enum Quality {
//!         Low,
//!         High,
//!     }
//! }
//!
//! #[derive(Debug, PartialEq)]
//! struct Window {
//!     width: u32,
//!     height: u32,
//! }
//!
//! #[derive(Debug, PartialEq)]
//! struct Graphics {
//!     quality: Quality,
//!     window: Window,
//!     fps_caps: Vec<u16>,
//! }
//!
//! impl Schema for Window {
//!     fn attributes() -> Vec<Attribute<Self>> {
//!         vec![
//!             Attribute::scalar("width", |w: &Self| &w.width, |w: &mut Self| &mut w.width),
//!             Attribute::scalar("height", |w: &Self| &w.height, |w: &mut Self| &mut w.height),
//!         ]
//!     }
//! }
//!
//! impl Schema for Graphics {
//!     fn attributes() -> Vec<Attribute<Self>> {
//!         vec![
//!             Attribute::scalar("quality", |g: &Self| &g.quality, |g: &mut Self| &mut g.quality)
//!                 .comment("Low or High"),
//!             Attribute::nested("window", |g: &Self| &g.window, |g: &mut Self| &mut g.window),
//!             Attribute::list("fps_caps", |g: &Self| &g.fps_caps, |g: &mut Self| &mut g.fps_caps),
//!         ]
//!     }
//! }
//!
//! let graphics = Graphics {
//!     quality: Quality::High,
//!     window: Window { width: 1280, height: 720 },
//!     fps_caps: vec![30, 60],
//! };
//!
//! let text = to_string(&graphics).unwrap();
//! assert_eq!(
//!     text,
//!     "//Low or High\nquality=High\n\nwindow:\n    width=1280\n    height=720\nfps_caps[\n    30\n    60\n]\n"
//! );
//!
//! let mut loaded = Graphics {
//!     quality: Quality::Low,
//!     window: Window { width: 0, height: 0 },
//!     fps_caps: Vec::new(),
//! };
//! from_str_into(&text, &mut loaded).unwrap();
//! assert_eq!(loaded, graphics);
//! ```
//!
//! ## File Format
//!
//! | Construct | Syntax |
//! |---|---|
//! | Indentation | 4 spaces per nesting level; tabs are not indentation |
//! | Comment | a line whose trimmed text starts with `//` |
//! | Blank | an empty or all-space line |
//! | Scalar | `name=value`, split on the first `=`; leading spaces of the value are dropped |
//! | Nested block | `name:` followed by its body one level deeper |
//! | List block | `name[`, one element per line, then a line holding only `]` |
//! | Enum | the bare constant name, matched case-sensitively |
//!
//! Comments and blank lines are ignored everywhere except inside a list
//! block, where every line other than `]` is an element. Values are not
//! quoted or escaped, so writing text that would not read back the same
//! (a line break, a leading space, trailing whitespace) is a schema error.
//!
//! ## Errors
//!
//! Reading stops at the first problem: a malformed line is
//! [`Error::Format`], a value that does not parse is [`Error::Conversion`],
//! and a schema the engine cannot handle is [`Error::Schema`]. Names the
//! schema does not declare are skipped, so older and newer files stay
//! loadable. Writing renders the whole document in memory first and never
//! leaves a partial file.
//!
//! ## Logging
//!
//! The crate emits [`tracing`](https://docs.rs/tracing) events at `debug` and
//! `trace` level (file creation, rewrites, skipped keys). It never installs
//! a subscriber.

pub mod de;
pub mod error;
pub mod macros;
pub mod map;
pub mod options;
pub mod registry;
pub mod schema;
pub mod ser;
pub mod store;
pub mod value;

pub use de::{Reader, STRING_SOURCE};
pub use error::{Error, Result};
pub use map::{snapshot_with, ConfigMap, Entry};
pub use options::{ConfigDir, PathResolver, DEFAULT_EXTENSION};
pub use registry::{Converter, TypeRegistry};
pub use schema::{Attribute, Descriptor, Kind, Schema, SchemaWalker};
pub use ser::Writer;
pub use store::{
    get_or_create, get_or_create_with, load, load_with, save, save_with, ConfigStore,
};
pub use value::{ConfigType, CustomType, Value, ValueType};

use std::io;

/// Reads config text into `instance`, using the default [`TypeRegistry`].
///
/// Attributes missing from `text` keep their current values.
///
/// # Examples
///
/// ```rust
/// use mcfg::{from_str_into, Attribute, Schema};
///
/// struct Point { x: i32, y: i32 }
///
/// impl Schema for Point {
///     fn attributes() -> Vec<Attribute<Self>> {
///         vec![
///             Attribute::scalar("x", |p: &Self| &p.x, |p: &mut Self| &mut p.x),
///             Attribute::scalar("y", |p: &Self| &p.y, |p: &mut Self| &mut p.y),
///         ]
///     }
/// }
///
/// let mut point = Point { x: 0, y: 5 };
/// from_str_into("x=1", &mut point).unwrap();
/// assert_eq!((point.x, point.y), (1, 5));
/// ```
///
/// # Errors
///
/// Returns the first format, conversion or schema error. Attributes set
/// before that point keep their new values.
pub fn from_str_into(text: &str, instance: &mut dyn SchemaWalker) -> Result<()> {
    from_str_into_with(text, instance, &TypeRegistry::new())
}

/// [`from_str_into`] with a caller-provided registry.
///
/// # Errors
///
/// See [`from_str_into`].
pub fn from_str_into_with(
    text: &str,
    instance: &mut dyn SchemaWalker,
    registry: &TypeRegistry,
) -> Result<()> {
    Reader::new(registry, STRING_SOURCE).read(text, instance)
}

/// Renders `instance` as config text, using the default [`TypeRegistry`].
///
/// # Errors
///
/// Returns a schema error if an attribute cannot be rendered.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string(instance: &dyn SchemaWalker) -> Result<String> {
    to_string_with(instance, &TypeRegistry::new())
}

/// [`to_string`] with a caller-provided registry.
///
/// # Errors
///
/// See [`to_string`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with(instance: &dyn SchemaWalker, registry: &TypeRegistry) -> Result<String> {
    Writer::new(registry).write(instance)
}

/// Renders `instance` into a writer.
///
/// Nothing is written if rendering fails.
///
/// # Examples
///
/// ```rust
/// use mcfg::{to_writer, Attribute, Schema};
///
/// struct Flag { on: bool }
///
/// impl Schema for Flag {
///     fn attributes() -> Vec<Attribute<Self>> {
///         vec![Attribute::scalar("on", |f: &Self| &f.on, |f: &mut Self| &mut f.on)]
///     }
/// }
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &Flag { on: true }).unwrap();
/// assert_eq!(buffer, b"on=true\n");
/// ```
///
/// # Errors
///
/// Returns a schema error if rendering fails, or an I/O error if the writer
/// fails.
pub fn to_writer<W>(mut writer: W, instance: &dyn SchemaWalker) -> Result<()>
where
    W: io::Write,
{
    let text = to_string(instance)?;
    writer
        .write_all(text.as_bytes())
        .map_err(|e| Error::io(e.to_string()))?;
    Ok(())
}

/// Ordered, serializable view of `instance`, using the default
/// [`TypeRegistry`] for custom values.
///
/// # Errors
///
/// Returns a schema error for a custom value with no converter.
pub fn snapshot(instance: &dyn SchemaWalker) -> Result<ConfigMap> {
    snapshot_with(instance, &TypeRegistry::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use num_bigint::BigInt;

    crate::config_enum! {
        #[derive(Debug, Clone, Copy, PartialEq)]
        enum Channel {
            Stable,
            Beta,
            Nightly,
        }
    }

    #[derive(Debug, PartialEq)]
    struct Limits {
        soft: u32,
        hard: u32,
    }

    #[derive(Debug, PartialEq)]
    struct Release {
        channel: Channel,
        built: DateTime<Utc>,
        serial: BigInt,
        limits: Limits,
        mirrors: Vec<String>,
    }

    impl Schema for Limits {
        fn attributes() -> Vec<Attribute<Self>> {
            vec![
                Attribute::scalar("soft", |l: &Self| &l.soft, |l: &mut Self| &mut l.soft),
                Attribute::scalar("hard", |l: &Self| &l.hard, |l: &mut Self| &mut l.hard),
            ]
        }
    }

    impl Schema for Release {
        fn attributes() -> Vec<Attribute<Self>> {
            vec![
                Attribute::scalar("channel", |r: &Self| &r.channel, |r: &mut Self| {
                    &mut r.channel
                }),
                Attribute::scalar("built", |r: &Self| &r.built, |r: &mut Self| &mut r.built),
                Attribute::scalar("serial", |r: &Self| &r.serial, |r: &mut Self| &mut r.serial),
                Attribute::nested("limits", |r: &Self| &r.limits, |r: &mut Self| &mut r.limits),
                Attribute::list("mirrors", |r: &Self| &r.mirrors, |r: &mut Self| {
                    &mut r.mirrors
                }),
            ]
        }
    }

    fn release() -> Release {
        Release {
            channel: Channel::Beta,
            built: Utc.with_ymd_and_hms(2023, 11, 2, 8, 30, 0).unwrap(),
            serial: "123456789012345678901234567890".parse().unwrap(),
            limits: Limits { soft: 10, hard: 20 },
            mirrors: vec!["eu".to_string(), "us".to_string()],
        }
    }

    fn blank() -> Release {
        Release {
            channel: Channel::Stable,
            built: Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap(),
            serial: BigInt::from(0),
            limits: Limits { soft: 0, hard: 0 },
            mirrors: Vec::new(),
        }
    }

    #[test]
    fn test_round_trip_with_bundled_codecs() {
        let text = to_string(&release()).unwrap();
        assert_eq!(
            text,
            "channel=Beta\n\
             built=2023-11-02T08:30:00+00:00\n\
             serial=123456789012345678901234567890\n\
             limits:\n    soft=10\n    hard=20\n\
             mirrors[\n    eu\n    us\n]\n"
        );

        let mut loaded = blank();
        from_str_into(&text, &mut loaded).unwrap();
        assert_eq!(loaded, release());
    }

    #[test]
    fn test_to_writer_matches_to_string() {
        let mut buffer = Vec::new();
        to_writer(&mut buffer, &release()).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), to_string(&release()).unwrap());
    }

    #[test]
    fn test_empty_registry_cannot_write_custom_types() {
        let err = to_string_with(&release(), &TypeRegistry::empty()).unwrap_err();
        assert!(err.is_schema());
    }

    #[test]
    fn test_string_source_in_format_error() {
        let err = from_str_into("nonsense", &mut blank()).unwrap_err();
        assert!(err.to_string().contains(STRING_SOURCE));
    }

    #[test]
    fn test_snapshot_to_json() {
        let map = snapshot(&release()).unwrap();
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json["channel"], "Beta");
        assert_eq!(json["limits"]["hard"], 20);
        assert_eq!(json["mirrors"][1], "us");
    }
}
