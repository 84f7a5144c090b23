//! Rendering schema instances as config text.
//!
//! The [`Writer`] walks a schema instance attribute by attribute, in
//! declaration order, and renders the whole document into memory. Nothing
//! is written anywhere until rendering has succeeded, so a schema error
//! halfway through never leaves a half-written file behind.
//!
//! ```rust
//! use mcfg::{Attribute, Schema, TypeRegistry, Writer};
//!
//! struct Server {
//!     port: u16,
//!     hosts: Vec<String>,
//! }
//!
//! impl Schema for Server {
//!     fn attributes() -> Vec<Attribute<Self>> {
//!         vec![
//!             Attribute::scalar("port", |s: &Self| &s.port, |s: &mut Self| &mut s.port)
//!                 .comment("Listening port"),
//!             Attribute::list("hosts", |s: &Self| &s.hosts, |s: &mut Self| &mut s.hosts),
//!         ]
//!     }
//! }
//!
//! let server = Server { port: 8080, hosts: vec!["a".into(), "b".into()] };
//! let registry = TypeRegistry::new();
//! let text = Writer::new(&registry).write(&server).unwrap();
//! assert_eq!(text, "//Listening port\nport=8080\n\nhosts[\n    a\n    b\n]\n");
//! ```

use crate::de::INDENT_WIDTH;
use crate::schema::{Descriptor, Kind};
use crate::{Error, Result, SchemaWalker, TypeRegistry, Value, ValueType};
use std::collections::HashSet;
use tracing::trace;

/// Renders a schema instance as config text.
pub struct Writer<'r> {
    registry: &'r TypeRegistry,
    output: String,
    path: Vec<&'static str>,
}

impl<'r> Writer<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Writer {
            registry,
            output: String::with_capacity(256),
            path: Vec::new(),
        }
    }

    /// Renders `root` and returns the complete document.
    ///
    /// # Errors
    ///
    /// Returns a schema error for a custom attribute without a registered
    /// converter, a custom value inside an untyped list, a schema that
    /// declares the same name twice, or a value whose text would not read
    /// back unchanged.
    pub fn write(mut self, root: &dyn SchemaWalker) -> Result<String> {
        self.write_node(root, 0)?;
        Ok(self.output)
    }

    fn write_node(&mut self, node: &dyn SchemaWalker, depth: usize) -> Result<()> {
        let indent = " ".repeat(depth * INDENT_WIDTH);
        let mut seen = HashSet::new();

        for descriptor in node.descriptors() {
            if !seen.insert(descriptor.name) {
                return Err(Error::schema(format!(
                    "{} declares attribute `{}` more than once",
                    node.schema_name(),
                    self.location(descriptor.name)
                )));
            }

            if let Some(comment) = descriptor.comment {
                if comment.is_empty() {
                    self.output.push_str(&indent);
                    self.output.push_str("//\n");
                }
                for line in comment.lines() {
                    self.output.push_str(&indent);
                    self.output.push_str("//");
                    self.output.push_str(line);
                    self.output.push('\n');
                }
            }

            match descriptor.kind {
                Kind::Scalar(ty) => self.write_scalar(node, &descriptor, ty, &indent)?,
                Kind::Custom(custom) => {
                    self.write_scalar(node, &descriptor, ValueType::Custom(custom), &indent)?
                }
                Kind::List(element) => {
                    self.write_list(node, &descriptor, element, depth, &indent)?
                }
                Kind::Nested => {
                    self.write_nested(node, &descriptor, depth, &indent)?;
                    continue;
                }
            }

            if descriptor.comment.is_some() {
                self.output.push_str(&indent);
                self.output.push('\n');
            }
        }
        Ok(())
    }

    fn write_scalar(
        &mut self,
        node: &dyn SchemaWalker,
        descriptor: &Descriptor,
        ty: ValueType,
        indent: &str,
    ) -> Result<()> {
        if !self.registry.supports(&ty) {
            return Err(Error::schema(format!(
                "no converter registered for {} (attribute `{}`)",
                ty,
                self.location(descriptor.name)
            )));
        }
        let value = node.get(descriptor.name).ok_or_else(|| {
            Error::schema(format!(
                "attribute `{}` has no readable value",
                self.location(descriptor.name)
            ))
        })?;
        let text = self.registry.format(&value, &ty)?;
        if let Some(reason) = unreadable(&text, Slot::Leaf) {
            return Err(Error::schema(format!(
                "value {:?} of `{}` {}",
                text,
                self.location(descriptor.name),
                reason
            )));
        }

        self.output.push_str(indent);
        self.output.push_str(descriptor.name);
        self.output.push('=');
        self.output.push_str(&text);
        self.output.push('\n');
        Ok(())
    }

    fn write_list(
        &mut self,
        node: &dyn SchemaWalker,
        descriptor: &Descriptor,
        element: Option<ValueType>,
        depth: usize,
        indent: &str,
    ) -> Result<()> {
        if let Some(ty) = element.filter(|ty| !self.registry.supports(ty)) {
            return Err(Error::schema(format!(
                "no converter registered for {} (elements of `{}`)",
                ty,
                self.location(descriptor.name)
            )));
        }

        let registry = self.registry;
        let location = self.location(descriptor.name);
        let element_indent = " ".repeat((depth + 1) * INDENT_WIDTH);
        let mut body = String::new();
        node.for_each_element(descriptor.name, &mut |value| {
            let text = match (element, value) {
                (Some(ty), value) => registry.format(value, &ty)?,
                (None, Value::Custom(_)) => {
                    return Err(Error::schema(format!(
                        "list `{}` has no element type and holds a custom value",
                        location
                    )))
                }
                (None, value) => value.to_string(),
            };
            if let Some(reason) = unreadable(&text, Slot::Element) {
                return Err(Error::schema(format!(
                    "element {:?} of `{}` {}",
                    text, location, reason
                )));
            }
            body.push_str(&element_indent);
            body.push_str(&text);
            body.push('\n');
            Ok(())
        })?;

        self.output.push_str(indent);
        self.output.push_str(descriptor.name);
        self.output.push_str("[\n");
        self.output.push_str(&body);
        self.output.push_str(indent);
        self.output.push_str("]\n");
        Ok(())
    }

    fn write_nested(
        &mut self,
        node: &dyn SchemaWalker,
        descriptor: &Descriptor,
        depth: usize,
        indent: &str,
    ) -> Result<()> {
        let nested = node.nested(descriptor.name).ok_or_else(|| {
            Error::schema(format!(
                "nested attribute `{}` is not reachable",
                self.location(descriptor.name)
            ))
        })?;

        self.output.push_str(indent);
        self.output.push_str(descriptor.name);
        self.output.push_str(":\n");

        trace!(attribute = descriptor.name, depth, "writing block");
        self.path.push(descriptor.name);
        let result = self.write_node(nested, depth + 1);
        self.path.pop();
        result
    }

    /// Dotted path of `name` below the current block, for error messages.
    fn location(&self, name: &str) -> String {
        let mut location = String::new();
        for segment in &self.path {
            location.push_str(segment);
            location.push('.');
        }
        location.push_str(name);
        location
    }
}

/// Where a formatted value lands: after `name=`, or alone on an element line.
#[derive(Clone, Copy, PartialEq)]
enum Slot {
    Leaf,
    Element,
}

/// Reason `text` would come back different from its line, if any. Lines are
/// trimmed on read and leaf values lose their leading spaces.
fn unreadable(text: &str, slot: Slot) -> Option<&'static str> {
    let leading = match slot {
        Slot::Leaf => text.starts_with(' '),
        Slot::Element => text.starts_with(char::is_whitespace),
    };
    if text.contains(|c| c == '\n' || c == '\r') {
        Some("contains a line break")
    } else if leading {
        Some("starts with whitespace")
    } else if text.ends_with(char::is_whitespace) {
        Some("ends with whitespace")
    } else if slot == Slot::Element && text == "]" {
        Some("would close the list")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Attribute, Schema};

    #[derive(Clone, Debug, PartialEq)]
    struct Opaque(u8);

    crate::config_custom!(Opaque);

    #[derive(Default)]
    struct Inner {
        inner: i32,
    }

    #[derive(Default)]
    struct Outer {
        outer: Inner,
    }

    impl Schema for Inner {
        fn attributes() -> Vec<Attribute<Self>> {
            vec![Attribute::scalar("inner", |i: &Self| &i.inner, |i: &mut Self| &mut i.inner)]
        }
    }

    impl Schema for Outer {
        fn attributes() -> Vec<Attribute<Self>> {
            vec![Attribute::nested("outer", |o: &Self| &o.outer, |o: &mut Self| &mut o.outer)]
        }
    }

    fn render(root: &dyn SchemaWalker) -> Result<String> {
        let registry = TypeRegistry::empty();
        Writer::new(&registry).write(root)
    }

    #[test]
    fn test_nested_block() {
        let outer = Outer {
            outer: Inner { inner: 1 },
        };
        assert_eq!(render(&outer).unwrap(), "outer:\n    inner=1\n");
    }

    #[test]
    fn test_int_list_and_empty_list() {
        struct Numbers {
            values: Vec<i32>,
        }
        impl Schema for Numbers {
            fn attributes() -> Vec<Attribute<Self>> {
                vec![Attribute::list("values", |n: &Self| &n.values, |n: &mut Self| &mut n.values)]
            }
        }

        let numbers = Numbers {
            values: vec![1, 2, 3],
        };
        assert_eq!(render(&numbers).unwrap(), "values[\n    1\n    2\n    3\n]\n");

        let empty = Numbers { values: Vec::new() };
        assert_eq!(render(&empty).unwrap(), "values[\n]\n");
    }

    #[test]
    fn test_commented_nested_header_owes_no_blank_line() {
        struct Commented {
            limit: u8,
            outer: Inner,
        }
        impl Schema for Commented {
            fn attributes() -> Vec<Attribute<Self>> {
                vec![
                    Attribute::scalar("limit", |c: &Self| &c.limit, |c: &mut Self| &mut c.limit)
                        .comment("first\nsecond"),
                    Attribute::nested("outer", |c: &Self| &c.outer, |c: &mut Self| &mut c.outer)
                        .comment("block"),
                ]
            }
        }

        let commented = Commented {
            limit: 3,
            outer: Inner { inner: 7 },
        };
        assert_eq!(
            render(&commented).unwrap(),
            "//first\n//second\nlimit=3\n\n//block\nouter:\n    inner=7\n"
        );
    }

    #[test]
    fn test_custom_without_converter_is_schema_error() {
        struct Holder {
            opaque: Opaque,
        }
        impl Schema for Holder {
            fn attributes() -> Vec<Attribute<Self>> {
                vec![Attribute::scalar("opaque", |h: &Self| &h.opaque, |h: &mut Self| {
                    &mut h.opaque
                })]
            }
        }

        let err = render(&Holder { opaque: Opaque(1) }).unwrap_err();
        assert!(err.is_schema());
        assert!(err.to_string().contains("opaque"));

        let registry = TypeRegistry::empty().with_codec(
            |text: &str| text.parse::<u8>().map(Opaque),
            |value: &Opaque| value.0.to_string(),
        );
        let text = Writer::new(&registry)
            .write(&Holder { opaque: Opaque(9) })
            .unwrap();
        assert_eq!(text, "opaque=9\n");
    }

    #[test]
    fn test_untyped_list() {
        struct Loose {
            items: Vec<Value>,
        }
        impl Schema for Loose {
            fn attributes() -> Vec<Attribute<Self>> {
                vec![Attribute::values("items", None, |l: &Self| &l.items, |l: &mut Self| {
                    &mut l.items
                })]
            }
        }

        let loose = Loose {
            items: vec![Value::I32(4), Value::from("four"), Value::Bool(false)],
        };
        assert_eq!(render(&loose).unwrap(), "items[\n    4\n    four\n    false\n]\n");

        let custom = Loose {
            items: vec![Value::Custom(Box::new(Opaque(2)))],
        };
        assert!(render(&custom).unwrap_err().is_schema());
    }

    #[test]
    fn test_empty_comment_is_bare_marker() {
        struct Marked {
            flag: bool,
        }
        impl Schema for Marked {
            fn attributes() -> Vec<Attribute<Self>> {
                vec![Attribute::scalar("flag", |m: &Self| &m.flag, |m: &mut Self| &mut m.flag)
                    .comment("")]
            }
        }

        assert_eq!(render(&Marked { flag: true }).unwrap(), "//\nflag=true\n\n");
    }

    #[test]
    fn test_text_that_cannot_read_back_is_rejected() {
        struct Text {
            sep: char,
            label: String,
        }
        impl Schema for Text {
            fn attributes() -> Vec<Attribute<Self>> {
                vec![
                    Attribute::scalar("sep", |t: &Self| &t.sep, |t: &mut Self| &mut t.sep),
                    Attribute::scalar("label", |t: &Self| &t.label, |t: &mut Self| &mut t.label),
                ]
            }
        }

        let text = |sep: char, label: &str| Text {
            sep,
            label: label.to_string(),
        };
        assert_eq!(render(&text(',', "a\tb")).unwrap(), "sep=,\nlabel=a\tb\n");
        assert_eq!(render(&text(',', "")).unwrap(), "sep=,\nlabel=\n");
        assert_eq!(render(&text(',', "\tx")).unwrap(), "sep=,\nlabel=\tx\n");

        let err = render(&text(' ', "ok")).unwrap_err();
        assert!(err.is_schema());
        assert!(err.to_string().contains("sep"));
        assert!(render(&text(',', " lead")).unwrap_err().is_schema());
        assert!(render(&text(',', "trail\t")).unwrap_err().is_schema());
        assert!(render(&text(',', "two\nlines")).unwrap_err().is_schema());
    }

    #[test]
    fn test_list_element_that_cannot_read_back_is_rejected() {
        struct Words {
            words: Vec<String>,
        }
        impl Schema for Words {
            fn attributes() -> Vec<Attribute<Self>> {
                vec![Attribute::list("words", |w: &Self| &w.words, |w: &mut Self| &mut w.words)]
            }
        }

        fn words(items: &[&str]) -> Words {
            Words {
                words: items.iter().map(|s| s.to_string()).collect(),
            }
        }
        assert_eq!(
            render(&words(&["a]", "", "// not a comment"])).unwrap(),
            "words[\n    a]\n    \n    // not a comment\n]\n"
        );
        assert!(render(&words(&["]"])).unwrap_err().is_schema());
        assert!(render(&words(&["\tx"])).unwrap_err().is_schema());
        assert!(render(&words(&["x "])).unwrap_err().is_schema());
        assert!(render(&words(&["a\nb"])).unwrap_err().is_schema());
    }

    #[test]
    fn test_declared_element_type_is_enforced() {
        struct Typed {
            items: Vec<Value>,
        }
        impl Schema for Typed {
            fn attributes() -> Vec<Attribute<Self>> {
                vec![Attribute::values("items", Some(ValueType::U8), |t: &Self| &t.items, |t: &mut Self| {
                    &mut t.items
                })]
            }
        }

        let ok = Typed {
            items: vec![Value::U8(7)],
        };
        assert_eq!(render(&ok).unwrap(), "items[\n    7\n]\n");

        let wide = Typed {
            items: vec![Value::I32(300)],
        };
        assert!(render(&wide).unwrap_err().is_schema());
        let text = Typed {
            items: vec![Value::from("x")],
        };
        assert!(render(&text).unwrap_err().is_schema());
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        struct Twice {
            a: bool,
            b: bool,
        }
        impl Schema for Twice {
            fn attributes() -> Vec<Attribute<Self>> {
                vec![
                    Attribute::scalar("flag", |t: &Self| &t.a, |t: &mut Self| &mut t.a),
                    Attribute::scalar("flag", |t: &Self| &t.b, |t: &mut Self| &mut t.b),
                ]
            }
        }

        let err = render(&Twice { a: true, b: false }).unwrap_err();
        assert!(err.is_schema());
    }

    #[test]
    fn test_error_location_includes_block_path() {
        struct Deep {
            holder: Wrapper,
        }
        struct Wrapper {
            opaque: Opaque,
        }
        impl Schema for Wrapper {
            fn attributes() -> Vec<Attribute<Self>> {
                vec![Attribute::scalar("opaque", |w: &Self| &w.opaque, |w: &mut Self| {
                    &mut w.opaque
                })]
            }
        }
        impl Schema for Deep {
            fn attributes() -> Vec<Attribute<Self>> {
                vec![Attribute::nested("holder", |d: &Self| &d.holder, |d: &mut Self| {
                    &mut d.holder
                })]
            }
        }

        let deep = Deep {
            holder: Wrapper { opaque: Opaque(0) },
        };
        let err = render(&deep).unwrap_err();
        assert!(err.to_string().contains("holder.opaque"));
    }
}
