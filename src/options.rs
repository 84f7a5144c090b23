//! Where config files live.
//!
//! A [`PathResolver`] turns a short config name such as `"audio"` into a
//! file path. [`ConfigDir`] is the standard policy: one base directory and
//! a fixed extension.
//!
//! ## Examples
//!
//! ```rust
//! use mcfg::{ConfigDir, PathResolver};
//! use std::path::Path;
//!
//! let dir = ConfigDir::new("/etc/myapp");
//! assert_eq!(dir.resolve("audio"), Path::new("/etc/myapp/audio.mcfg"));
//!
//! let dir = ConfigDir::new("/etc/myapp").with_extension(".cfg");
//! assert_eq!(dir.resolve("audio"), Path::new("/etc/myapp/audio.cfg"));
//! ```

use std::path::{Path, PathBuf};

/// Extension appended by [`ConfigDir`] unless overridden.
pub const DEFAULT_EXTENSION: &str = "mcfg";

/// Maps a config name to a file path.
///
/// Any `Fn(&str) -> PathBuf` closure is a resolver:
///
/// ```rust
/// use mcfg::PathResolver;
/// use std::path::PathBuf;
///
/// let resolver = |name: &str| PathBuf::from(format!("/tmp/{}.conf", name));
/// assert_eq!(resolver.resolve("net"), PathBuf::from("/tmp/net.conf"));
/// ```
pub trait PathResolver {
    fn resolve(&self, name: &str) -> PathBuf;
}

impl<F> PathResolver for F
where
    F: Fn(&str) -> PathBuf,
{
    fn resolve(&self, name: &str) -> PathBuf {
        self(name)
    }
}

/// A base directory holding `<name>.<extension>` files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigDir {
    pub base: PathBuf,
    pub extension: String,
}

impl ConfigDir {
    /// Uses `base` with the default `mcfg` extension.
    #[must_use]
    pub fn new(base: impl Into<PathBuf>) -> Self {
        ConfigDir {
            base: base.into(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Sets the file extension. A leading `.` is ignored and an empty
    /// extension means bare names.
    ///
    /// ```rust
    /// use mcfg::ConfigDir;
    ///
    /// let dir = ConfigDir::new("conf").with_extension("");
    /// assert_eq!(dir.path_of("main"), std::path::Path::new("conf/main"));
    /// ```
    #[must_use]
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    #[must_use]
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Path of the file for `name`.
    #[must_use]
    pub fn path_of(&self, name: &str) -> PathBuf {
        if self.extension.is_empty() {
            self.base.join(name)
        } else {
            self.base.join(format!("{}.{}", name, self.extension))
        }
    }
}

impl PathResolver for ConfigDir {
    fn resolve(&self, name: &str) -> PathBuf {
        self.path_of(name)
    }
}
