//! Schema descriptors and generic attribute access.
//!
//! A config type describes itself by implementing [`Schema`]: an ordered table
//! of [`Attribute`]s, each pairing a name with accessor functions for one
//! field. Declaration order is the order attributes are written in.
//!
//! ```rust
//! use mcfg::{Attribute, Schema};
//!
//! #[derive(Default)]
//! struct Window {
//!     width: u32,
//!     height: u32,
//! }
//!
//! #[derive(Default)]
//! struct Display {
//!     fullscreen: bool,
//!     window: Window,
//!     refresh_rates: Vec<u32>,
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
//! impl Schema for Display {
//!     fn attributes() -> Vec<Attribute<Self>> {
//!         vec![
//!             Attribute::scalar("fullscreen", |d: &Self| &d.fullscreen, |d: &mut Self| &mut d.fullscreen)
//!                 .comment("Start in fullscreen mode"),
//!             Attribute::nested("window", |d: &Self| &d.window, |d: &mut Self| &mut d.window),
//!             Attribute::list("refresh_rates", |d: &Self| &d.refresh_rates, |d: &mut Self| &mut d.refresh_rates),
//!         ]
//!     }
//! }
//! ```
//!
//! The engine never touches a schema directly: it goes through the
//! object-safe [`SchemaWalker`] trait, implemented for every `Schema`.

use crate::{ConfigType, Error, Result, Value, ValueType};
use crate::value::CustomType;
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// A config type described by an explicit attribute table.
pub trait Schema: Sized + 'static {
    /// Attributes in declaration order. Names must be unique.
    ///
    /// Called once per type and thread; the table is cached afterwards, so
    /// it must not depend on runtime state.
    fn attributes() -> Vec<Attribute<Self>>;
}

/// The shape of an attribute, as seen by the reader and writer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    /// Built-in or enum value, written as `name=value`.
    Scalar(ValueType),
    /// Value handled by a registered converter, written as `name=value`.
    Custom(CustomType),
    /// Nested schema, written as a `name:` block.
    Nested,
    /// List block `name[ ... ]`; `None` when no element type was declared.
    List(Option<ValueType>),
}

/// Metadata for one attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Descriptor {
    pub name: &'static str,
    pub comment: Option<&'static str>,
    pub kind: Kind,
}

/// One named slot of a [`Schema`].
pub struct Attribute<S> {
    name: &'static str,
    comment: Option<&'static str>,
    access: Access<S>,
}

enum Access<S> {
    Value(Box<dyn ValueAccess<S>>),
    Nested(Box<dyn NestedAccess<S>>),
    List(Box<dyn ListAccess<S>>),
}

impl<S: Schema> Attribute<S> {
    /// A leaf attribute: built-in scalar, enum, or custom type.
    pub fn scalar<T: ConfigType>(
        name: &'static str,
        get: fn(&S) -> &T,
        get_mut: fn(&mut S) -> &mut T,
    ) -> Self {
        Self::with_access(name, Access::Value(Box::new(ValueField { get, get_mut })))
    }

    /// A nested schema, written as an indented block.
    pub fn nested<N: Schema>(
        name: &'static str,
        get: fn(&S) -> &N,
        get_mut: fn(&mut S) -> &mut N,
    ) -> Self {
        Self::with_access(name, Access::Nested(Box::new(NestedField { get, get_mut })))
    }

    /// A list whose element type is known from `T`.
    pub fn list<T: ConfigType>(
        name: &'static str,
        get: fn(&S) -> &Vec<T>,
        get_mut: fn(&mut S) -> &mut Vec<T>,
    ) -> Self {
        Self::with_access(name, Access::List(Box::new(ListField { get, get_mut })))
    }

    /// A list of loosely typed [`Value`]s.
    ///
    /// Without an `element` type such a list can still be written (built-in
    /// values only), but reading it back is a schema error.
    pub fn values(
        name: &'static str,
        element: Option<ValueType>,
        get: fn(&S) -> &Vec<Value>,
        get_mut: fn(&mut S) -> &mut Vec<Value>,
    ) -> Self {
        Self::with_access(
            name,
            Access::List(Box::new(ValueListField {
                element,
                get,
                get_mut,
            })),
        )
    }

    fn with_access(name: &'static str, access: Access<S>) -> Self {
        Attribute {
            name,
            comment: None,
            access,
        }
    }

    /// Attaches comment text, written as `//` lines above the attribute.
    /// Multi-line text yields one comment line per line.
    #[must_use]
    pub fn comment(mut self, text: &'static str) -> Self {
        self.comment = Some(text);
        self
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn descriptor(&self) -> Descriptor {
        let kind = match &self.access {
            Access::Value(access) => match access.value_type() {
                ValueType::Custom(custom) => Kind::Custom(custom),
                ty => Kind::Scalar(ty),
            },
            Access::Nested(_) => Kind::Nested,
            Access::List(access) => Kind::List(access.element_type()),
        };
        Descriptor {
            name: self.name,
            comment: self.comment,
            kind,
        }
    }
}

trait ValueAccess<S> {
    fn value_type(&self) -> ValueType;
    fn get(&self, target: &S) -> Value;
    fn set(&self, target: &mut S, value: Value) -> Result<()>;
}

struct ValueField<S, T> {
    get: fn(&S) -> &T,
    get_mut: fn(&mut S) -> &mut T,
}

impl<S, T: ConfigType> ValueAccess<S> for ValueField<S, T> {
    fn value_type(&self) -> ValueType {
        T::value_type()
    }

    fn get(&self, target: &S) -> Value {
        (self.get)(target).to_value()
    }

    fn set(&self, target: &mut S, value: Value) -> Result<()> {
        *(self.get_mut)(target) = T::from_value(value)?;
        Ok(())
    }
}

trait NestedAccess<S> {
    fn get<'a>(&self, target: &'a S) -> &'a dyn SchemaWalker;
    fn get_mut<'a>(&self, target: &'a mut S) -> &'a mut dyn SchemaWalker;
}

struct NestedField<S, N> {
    get: fn(&S) -> &N,
    get_mut: fn(&mut S) -> &mut N,
}

impl<S, N: Schema> NestedAccess<S> for NestedField<S, N> {
    fn get<'a>(&self, target: &'a S) -> &'a dyn SchemaWalker {
        (self.get)(target)
    }

    fn get_mut<'a>(&self, target: &'a mut S) -> &'a mut dyn SchemaWalker {
        (self.get_mut)(target)
    }
}

trait ListAccess<S> {
    fn element_type(&self) -> Option<ValueType>;
    fn visit(&self, target: &S, visit: &mut dyn FnMut(&Value) -> Result<()>) -> Result<()>;
    fn clear(&self, target: &mut S);
    fn push(&self, target: &mut S, value: Value) -> Result<()>;
}

struct ListField<S, T> {
    get: fn(&S) -> &Vec<T>,
    get_mut: fn(&mut S) -> &mut Vec<T>,
}

impl<S, T: ConfigType> ListAccess<S> for ListField<S, T> {
    fn element_type(&self) -> Option<ValueType> {
        Some(T::value_type())
    }

    fn visit(&self, target: &S, visit: &mut dyn FnMut(&Value) -> Result<()>) -> Result<()> {
        (self.get)(target)
            .iter()
            .try_for_each(|element| visit(&element.to_value()))
    }

    fn clear(&self, target: &mut S) {
        (self.get_mut)(target).clear();
    }

    fn push(&self, target: &mut S, value: Value) -> Result<()> {
        (self.get_mut)(target).push(T::from_value(value)?);
        Ok(())
    }
}

struct ValueListField<S> {
    element: Option<ValueType>,
    get: fn(&S) -> &Vec<Value>,
    get_mut: fn(&mut S) -> &mut Vec<Value>,
}

impl<S> ListAccess<S> for ValueListField<S> {
    fn element_type(&self) -> Option<ValueType> {
        self.element
    }

    fn visit(&self, target: &S, visit: &mut dyn FnMut(&Value) -> Result<()>) -> Result<()> {
        (self.get)(target).iter().try_for_each(visit)
    }

    fn clear(&self, target: &mut S) {
        (self.get_mut)(target).clear();
    }

    fn push(&self, target: &mut S, value: Value) -> Result<()> {
        (self.get_mut)(target).push(value);
        Ok(())
    }
}

/// Generic, object-safe access to a schema instance.
///
/// Name lookups that fail return `None` rather than an error; it is up to
/// the caller to decide whether a missing attribute matters.
pub trait SchemaWalker {
    fn schema_name(&self) -> &'static str;

    /// Attribute descriptors in declaration order.
    fn descriptors(&self) -> Vec<Descriptor>;

    fn find(&self, name: &str) -> Option<Descriptor>;

    /// Current value of a scalar or custom attribute.
    fn get(&self, name: &str) -> Option<Value>;

    /// Stores a value into a scalar or custom attribute.
    ///
    /// # Errors
    ///
    /// Returns a schema error if there is no such attribute or the value
    /// does not match its type.
    fn set(&mut self, name: &str, value: Value) -> Result<()>;

    fn nested(&self, name: &str) -> Option<&dyn SchemaWalker>;

    fn nested_mut(&mut self, name: &str) -> Option<&mut dyn SchemaWalker>;

    /// Calls `visit` with each element of a list attribute, in order.
    ///
    /// # Errors
    ///
    /// Returns a schema error if there is no such list, or the first error
    /// returned by `visit`.
    fn for_each_element(
        &self,
        name: &str,
        visit: &mut dyn FnMut(&Value) -> Result<()>,
    ) -> Result<()>;

    /// Empties a list attribute in place.
    ///
    /// # Errors
    ///
    /// Returns a schema error if there is no such list.
    fn clear_list(&mut self, name: &str) -> Result<()>;

    /// Appends one element to a list attribute.
    ///
    /// # Errors
    ///
    /// Returns a schema error if there is no such list or the value does not
    /// match its element type.
    fn push_element(&mut self, name: &str, value: Value) -> Result<()>;
}

thread_local! {
    static TABLES: RefCell<HashMap<TypeId, Rc<dyn Any>>> = RefCell::new(HashMap::new());
}

/// The attribute table of `S`, built on first use.
fn table<S: Schema>() -> Rc<Vec<Attribute<S>>> {
    TABLES.with(|tables| {
        let cached = tables.borrow().get(&TypeId::of::<S>()).cloned();
        if let Some(table) = cached.and_then(|table| table.downcast().ok()) {
            return table;
        }
        let table = Rc::new(S::attributes());
        tables
            .borrow_mut()
            .insert(TypeId::of::<S>(), Rc::clone(&table) as Rc<dyn Any>);
        table
    })
}

fn with_attribute<S: Schema, R>(name: &str, f: impl FnOnce(Option<&Attribute<S>>) -> R) -> R {
    let table = table::<S>();
    f(table.iter().find(|attr| attr.name == name))
}

fn missing<S: Schema>(what: &str, name: &str) -> Error {
    Error::schema(format!(
        "{} has no {} attribute `{}`",
        std::any::type_name::<S>(),
        what,
        name
    ))
}

impl<S: Schema> SchemaWalker for S {
    fn schema_name(&self) -> &'static str {
        std::any::type_name::<S>()
    }

    fn descriptors(&self) -> Vec<Descriptor> {
        table::<S>().iter().map(Attribute::descriptor).collect()
    }

    fn find(&self, name: &str) -> Option<Descriptor> {
        with_attribute::<S, _>(name, move |attr| attr.map(Attribute::descriptor))
    }

    fn get(&self, name: &str) -> Option<Value> {
        with_attribute::<S, _>(name, move |attr| match &attr?.access {
            Access::Value(access) => Some(access.get(self)),
            _ => None,
        })
    }

    fn set(&mut self, name: &str, value: Value) -> Result<()> {
        with_attribute::<S, _>(name, move |attr| match attr.map(|attr| &attr.access) {
            Some(Access::Value(access)) => access.set(self, value),
            _ => Err(missing::<S>("scalar", name)),
        })
    }

    fn nested(&self, name: &str) -> Option<&dyn SchemaWalker> {
        with_attribute::<S, _>(name, move |attr| match &attr?.access {
            Access::Nested(access) => Some(access.get(self)),
            _ => None,
        })
    }

    fn nested_mut(&mut self, name: &str) -> Option<&mut dyn SchemaWalker> {
        with_attribute::<S, _>(name, move |attr| match &attr?.access {
            Access::Nested(access) => Some(access.get_mut(self)),
            _ => None,
        })
    }

    fn for_each_element(
        &self,
        name: &str,
        visit: &mut dyn FnMut(&Value) -> Result<()>,
    ) -> Result<()> {
        with_attribute::<S, _>(name, move |attr| match attr.map(|attr| &attr.access) {
            Some(Access::List(access)) => access.visit(self, visit),
            _ => Err(missing::<S>("list", name)),
        })
    }

    fn clear_list(&mut self, name: &str) -> Result<()> {
        with_attribute::<S, _>(name, move |attr| match attr.map(|attr| &attr.access) {
            Some(Access::List(access)) => {
                access.clear(self);
                Ok(())
            }
            _ => Err(missing::<S>("list", name)),
        })
    }

    fn push_element(&mut self, name: &str, value: Value) -> Result<()> {
        with_attribute::<S, _>(name, move |attr| match attr.map(|attr| &attr.access) {
            Some(Access::List(access)) => access.push(self, value),
            _ => Err(missing::<S>("list", name)),
        })
    }
}
