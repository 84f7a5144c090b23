//! Error types for reading and writing `.mcfg` files.
//!
//! ## Error Categories
//!
//! - **Format errors**: a line that matches none of the grammar's constructs
//! - **Conversion errors**: a value that cannot be parsed as its declared type
//! - **Schema errors**: a schema that cannot be read or written as declared
//!   (missing list element type, custom type without a codec, ...)
//! - **I/O errors**: file reading/writing failures
//!
//! Unknown attribute names are *not* errors: the reader skips them so that
//! files written by older or newer versions of a schema still load.
//!
//! ## Examples
//!
//! ```rust
//! use mcfg::{from_str_into, Attribute, Error, Schema};
//!
//! #[derive(Default)]
//! struct Settings { volume: i32 }
//!
//! impl Schema for Settings {
//!     fn attributes() -> Vec<Attribute<Self>> {
//!         vec![Attribute::scalar("volume", |s: &Self| &s.volume, |s: &mut Self| &mut s.volume)]
//!     }
//! }
//!
//! let mut settings = Settings::default();
//! let err = from_str_into("volume=loud", &mut settings).unwrap_err();
//! assert!(err.is_conversion());
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur while reading or writing a config.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// A line that is neither an assignment, a block header, nor a comment.
    #[error("Unable to read config line \"{line}\" (line {line_no}) for file {source_name}")]
    Format {
        line: String,
        line_no: usize,
        source_name: String,
    },

    /// Text that cannot be converted to the declared type of its attribute.
    #[error("Cannot convert \"{value}\" to {expected}: {reason}")]
    Conversion {
        value: String,
        expected: String,
        reason: String,
    },

    /// The schema cannot be read or written as declared.
    #[error("Schema error: {0}")]
    Schema(String),

    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),
}

impl Error {
    /// Creates a format error for a malformed line.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mcfg::Error;
    ///
    /// let err = Error::format("garbage", 3, "client.mcfg");
    /// assert!(err.to_string().contains("\"garbage\""));
    /// assert!(err.to_string().contains("client.mcfg"));
    /// ```
    pub fn format(line: &str, line_no: usize, source_name: &str) -> Self {
        Error::Format {
            line: line.to_string(),
            line_no,
            source_name: source_name.to_string(),
        }
    }

    /// Creates a conversion error for a value that does not parse as `expected`.
    pub fn conversion<R: fmt::Display>(value: &str, expected: &str, reason: R) -> Self {
        Error::Conversion {
            value: value.to_string(),
            expected: expected.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates a schema error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mcfg::Error;
    ///
    /// let err = Error::schema("list `ports` has no element type");
    /// assert!(err.is_schema());
    /// ```
    pub fn schema<T: fmt::Display>(msg: T) -> Self {
        Error::Schema(msg.to_string())
    }

    /// Creates an I/O error for file reading/writing failures.
    pub fn io<T: fmt::Display>(msg: T) -> Self {
        Error::Io(msg.to_string())
    }

    #[must_use]
    pub fn is_format(&self) -> bool {
        matches!(self, Error::Format { .. })
    }

    #[must_use]
    pub fn is_conversion(&self) -> bool {
        matches!(self, Error::Conversion { .. })
    }

    #[must_use]
    pub fn is_schema(&self) -> bool {
        matches!(self, Error::Schema(_))
    }

    #[must_use]
    pub fn is_io(&self) -> bool {
        matches!(self, Error::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
