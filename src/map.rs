//! Ordered snapshots of schema instances.
//!
//! [`ConfigMap`] is a plain, owned view of an instance: attribute names
//! mapped to values in declaration order. Custom values are stored in their
//! formatted text form, so a snapshot can always be serialized with any
//! serde format.
//!
//! ## Examples
//!
//! ```rust
//! use mcfg::{snapshot, Attribute, Entry, Schema, Value};
//!
//! struct Net {
//!     retries: u8,
//!     peers: Vec<String>,
//! }
//!
//! impl Schema for Net {
//!     fn attributes() -> Vec<Attribute<Self>> {
//!         vec![
//!             Attribute::scalar("retries", |n: &Self| &n.retries, |n: &mut Self| &mut n.retries),
//!             Attribute::list("peers", |n: &Self| &n.peers, |n: &mut Self| &mut n.peers),
//!         ]
//!     }
//! }
//!
//! let net = Net { retries: 3, peers: vec!["10.0.0.1".into()] };
//! let map = snapshot(&net).unwrap();
//!
//! let keys: Vec<_> = map.keys().cloned().collect();
//! assert_eq!(keys, vec!["retries", "peers"]);
//! assert_eq!(map.get("retries"), Some(&Entry::Value(Value::U8(3))));
//! ```

use crate::schema::Kind;
use crate::{Error, Result, SchemaWalker, TypeRegistry, Value, ValueType};
use indexmap::IndexMap;
use serde::Serialize;

/// One attribute in a [`ConfigMap`].
#[derive(Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Entry {
    Value(Value),
    List(Vec<Value>),
    Nested(ConfigMap),
}

impl Entry {
    #[must_use]
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Entry::Value(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Entry::List(values) => Some(values),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_nested(&self) -> Option<&ConfigMap> {
        match self {
            Entry::Nested(map) => Some(map),
            _ => None,
        }
    }
}

/// Attribute names mapped to entries, in declaration order.
#[derive(Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConfigMap(IndexMap<String, Entry>);

impl ConfigMap {
    #[must_use]
    pub fn new() -> Self {
        ConfigMap(IndexMap::new())
    }

    pub fn insert(&mut self, key: String, entry: Entry) -> Option<Entry> {
        self.0.insert(key, entry)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.0.get(key)
    }

    /// Looks up a dotted path such as `"window.width"`.
    ///
    /// ```rust
    /// use mcfg::{ConfigMap, Entry, Value};
    ///
    /// let mut inner = ConfigMap::new();
    /// inner.insert("width".to_string(), Entry::Value(Value::U32(640)));
    /// let mut map = ConfigMap::new();
    /// map.insert("window".to_string(), Entry::Nested(inner));
    ///
    /// assert_eq!(map.get_path("window.width"), Some(&Entry::Value(Value::U32(640))));
    /// assert_eq!(map.get_path("window.height"), None);
    /// ```
    #[must_use]
    pub fn get_path(&self, path: &str) -> Option<&Entry> {
        let mut segments = path.split('.');
        let mut entry = self.get(segments.next()?)?;
        for segment in segments {
            entry = entry.as_nested()?.get(segment)?;
        }
        Some(entry)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Entry> {
        self.0.keys()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Entry> {
        self.0.iter()
    }
}

impl IntoIterator for ConfigMap {
    type Item = (String, Entry);
    type IntoIter = indexmap::map::IntoIter<String, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(String, Entry)> for ConfigMap {
    fn from_iter<T: IntoIterator<Item = (String, Entry)>>(iter: T) -> Self {
        ConfigMap(IndexMap::from_iter(iter))
    }
}

/// Copies every attribute of `node` into a [`ConfigMap`], formatting custom
/// values with `registry`.
///
/// # Errors
///
/// Returns a schema error for a custom value with no converter.
pub fn snapshot_with(node: &dyn SchemaWalker, registry: &TypeRegistry) -> Result<ConfigMap> {
    let mut map = ConfigMap::new();
    for descriptor in node.descriptors() {
        let entry = match descriptor.kind {
            Kind::Scalar(_) => Entry::Value(read_value(node, descriptor.name)?),
            Kind::Custom(custom) => {
                let value = read_value(node, descriptor.name)?;
                let text = registry.format(&value, &ValueType::Custom(custom))?;
                Entry::Value(Value::String(text))
            }
            Kind::List(element) => {
                let mut values = Vec::new();
                node.for_each_element(descriptor.name, &mut |value| {
                    values.push(owned(value, element, registry)?);
                    Ok(())
                })?;
                Entry::List(values)
            }
            Kind::Nested => {
                let nested = node.nested(descriptor.name).ok_or_else(|| {
                    Error::schema(format!("nested attribute `{}` is not reachable", descriptor.name))
                })?;
                Entry::Nested(snapshot_with(nested, registry)?)
            }
        };
        map.insert(descriptor.name.to_string(), entry);
    }
    Ok(map)
}

fn read_value(node: &dyn SchemaWalker, name: &str) -> Result<Value> {
    node.get(name)
        .ok_or_else(|| Error::schema(format!("attribute `{}` has no readable value", name)))
}

/// Owned copy of a list element; custom values become their text form.
fn owned(value: &Value, element: Option<ValueType>, registry: &TypeRegistry) -> Result<Value> {
    let copy = match value {
        Value::Bool(v) => Value::Bool(*v),
        Value::Char(v) => Value::Char(*v),
        Value::I8(v) => Value::I8(*v),
        Value::I16(v) => Value::I16(*v),
        Value::I32(v) => Value::I32(*v),
        Value::I64(v) => Value::I64(*v),
        Value::U8(v) => Value::U8(*v),
        Value::U16(v) => Value::U16(*v),
        Value::U32(v) => Value::U32(*v),
        Value::U64(v) => Value::U64(*v),
        Value::F32(v) => Value::F32(*v),
        Value::F64(v) => Value::F64(*v),
        Value::String(v) => Value::String(v.clone()),
        Value::Enum(v) => Value::Enum(*v),
        Value::Custom(_) => match element {
            Some(ty) => Value::String(registry.format(value, &ty)?),
            None => return Err(Error::schema("custom value in a list without element type")),
        },
    };
    Ok(copy)
}
