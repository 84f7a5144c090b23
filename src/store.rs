//! Loading, creating and canonicalizing config files.
//!
//! [`get_or_create`] is the main entry point: it fills an instance from its
//! file when the file exists, then rewrites the file from the instance. After
//! every successful call the file on disk is the canonical rendering of the
//! returned instance, with new attributes at their defaults, obsolete keys
//! gone and comments refreshed.
//!
//! ```rust
//! use mcfg::{get_or_create, Attribute, Schema};
//!
//! #[derive(Debug, PartialEq)]
//! struct Audio {
//!     volume: u8,
//! }
//!
//! impl Schema for Audio {
//!     fn attributes() -> Vec<Attribute<Self>> {
//!         vec![Attribute::scalar("volume", |a: &Self| &a.volume, |a: &mut Self| &mut a.volume)]
//!     }
//! }
//!
//! let dir = std::env::temp_dir().join("mcfg-store-doc");
//! let path = dir.join("audio.mcfg");
//! # let _ = std::fs::remove_file(&path);
//!
//! let audio = get_or_create(&path, Audio { volume: 40 }).unwrap();
//! assert_eq!(audio, Audio { volume: 40 });
//! assert_eq!(std::fs::read_to_string(&path).unwrap(), "volume=40\n");
//! # std::fs::remove_dir_all(&dir).unwrap();
//! ```

use crate::de::Reader;
use crate::ser::Writer;
use crate::{ConfigDir, Error, PathResolver, Result, Schema, SchemaWalker, TypeRegistry};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads `instance` from `path` if the file exists, then rewrites the file
/// from the instance, using the default [`TypeRegistry`].
///
/// # Errors
///
/// Returns the first format, conversion, schema or I/O error. A failed read
/// leaves the file untouched.
pub fn get_or_create<S: Schema>(path: impl AsRef<Path>, instance: S) -> Result<S> {
    get_or_create_with(path, instance, &TypeRegistry::new())
}

/// [`get_or_create`] with a caller-provided registry.
///
/// # Errors
///
/// See [`get_or_create`].
pub fn get_or_create_with<S: Schema>(
    path: impl AsRef<Path>,
    mut instance: S,
    registry: &TypeRegistry,
) -> Result<S> {
    let path = path.as_ref();
    if exists(path)? {
        debug!(path = %path.display(), "loading config");
        load_with(path, &mut instance, registry)?;
        debug!(path = %path.display(), "rewriting config");
    } else {
        debug!(path = %path.display(), "creating config with defaults");
    }
    save_with(path, &instance, registry)?;
    Ok(instance)
}

/// Reads `path` into `instance` without writing anything back.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read, or the first format,
/// conversion or schema error in its contents.
pub fn load(path: impl AsRef<Path>, instance: &mut dyn SchemaWalker) -> Result<()> {
    load_with(path, instance, &TypeRegistry::new())
}

/// [`load`] with a caller-provided registry.
///
/// # Errors
///
/// See [`load`].
pub fn load_with(
    path: impl AsRef<Path>,
    instance: &mut dyn SchemaWalker,
    registry: &TypeRegistry,
) -> Result<()> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .map_err(|e| Error::io(format!("failed to read {}: {}", path.display(), e)))?;
    Reader::new(registry, path.display().to_string()).read(&text, instance)
}

/// Writes the canonical rendering of `instance` to `path`, creating parent
/// directories as needed.
///
/// # Errors
///
/// Returns a schema error if the instance cannot be rendered, in which case
/// the file is not touched, or an I/O error if writing fails.
pub fn save(path: impl AsRef<Path>, instance: &dyn SchemaWalker) -> Result<()> {
    save_with(path, instance, &TypeRegistry::new())
}

/// [`save`] with a caller-provided registry.
///
/// # Errors
///
/// See [`save`].
pub fn save_with(
    path: impl AsRef<Path>,
    instance: &dyn SchemaWalker,
    registry: &TypeRegistry,
) -> Result<()> {
    let path = path.as_ref();
    let text = Writer::new(registry).write(instance)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| Error::io(format!("failed to create {}: {}", parent.display(), e)))?;
    }
    fs::write(path, text)
        .map_err(|e| Error::io(format!("failed to write {}: {}", path.display(), e)))
}

fn exists(path: &Path) -> Result<bool> {
    path.try_exists()
        .map_err(|e| Error::io(format!("failed to inspect {}: {}", path.display(), e)))
}

/// A set of named config files sharing one resolver and one registry.
///
/// ```rust
/// use mcfg::{Attribute, ConfigDir, ConfigStore, Schema};
///
/// struct Video {
///     vsync: bool,
/// }
///
/// impl Schema for Video {
///     fn attributes() -> Vec<Attribute<Self>> {
///         vec![Attribute::scalar("vsync", |v: &Self| &v.vsync, |v: &mut Self| &mut v.vsync)]
///     }
/// }
///
/// let dir = std::env::temp_dir().join("mcfg-config-store-doc");
/// let store = ConfigStore::new(&dir);
/// assert_eq!(store.path_of("video"), dir.join("video.mcfg"));
///
/// let video = store.get_or_create("video", Video { vsync: true }).unwrap();
/// assert!(video.vsync);
/// # std::fs::remove_dir_all(&dir).unwrap();
/// ```
pub struct ConfigStore {
    resolver: Box<dyn PathResolver + Send + Sync>,
    registry: TypeRegistry,
}

impl ConfigStore {
    /// A store over `<base>/<name>.mcfg` files with the default registry.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        ConfigStore {
            resolver: Box::new(ConfigDir::new(base)),
            registry: TypeRegistry::new(),
        }
    }

    #[must_use]
    pub fn with_registry(mut self, registry: TypeRegistry) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn with_resolver<R>(mut self, resolver: R) -> Self
    where
        R: PathResolver + Send + Sync + 'static,
    {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut TypeRegistry {
        &mut self.registry
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.resolver.resolve(name)
    }

    /// Loads and canonicalizes the config called `name`.
    ///
    /// # Errors
    ///
    /// See [`get_or_create`].
    pub fn get_or_create<S: Schema>(&self, name: &str, instance: S) -> Result<S> {
        get_or_create_with(self.path_of(name), instance, &self.registry)
    }

    /// Reads the config called `name` into `instance`.
    ///
    /// # Errors
    ///
    /// See [`load`].
    pub fn load(&self, name: &str, instance: &mut dyn SchemaWalker) -> Result<()> {
        load_with(self.path_of(name), instance, &self.registry)
    }

    /// Writes `instance` as the config called `name`.
    ///
    /// # Errors
    ///
    /// See [`save`].
    pub fn save(&self, name: &str, instance: &dyn SchemaWalker) -> Result<()> {
        save_with(self.path_of(name), instance, &self.registry)
    }
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
