//! Reading config text into a schema instance.
//!
//! The [`Reader`] is a line-oriented state machine. It walks the text once,
//! keeping a stack of frames for the nested blocks it is inside of, and
//! stores every value it understands into the caller's instance in place.
//! Attributes that are missing from the text keep whatever value the
//! instance already held, and names the schema does not declare are skipped.
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use mcfg::{from_str_into, Attribute, Schema};
//!
//! #[derive(Debug, PartialEq)]
//! struct Audio {
//!     volume: u8,
//!     device: String,
//! }
//!
//! impl Schema for Audio {
//!     fn attributes() -> Vec<Attribute<Self>> {
//!         vec![
//!             Attribute::scalar("volume", |a: &Self| &a.volume, |a: &mut Self| &mut a.volume),
//!             Attribute::scalar("device", |a: &Self| &a.device, |a: &mut Self| &mut a.device),
//!         ]
//!     }
//! }
//!
//! let mut audio = Audio { volume: 50, device: "default".to_string() };
//! from_str_into("// comment\nvolume=80\nbitrate=320\n", &mut audio).unwrap();
//! assert_eq!(audio, Audio { volume: 80, device: "default".to_string() });
//! ```

use crate::schema::{Descriptor, Kind};
use crate::{Error, Result, SchemaWalker, TypeRegistry, ValueType};
use tracing::{debug, trace};

/// Number of spaces per nesting level.
pub(crate) const INDENT_WIDTH: usize = 4;

/// Source name used in errors when reading from a string.
pub const STRING_SOURCE: &str = "<string>";

#[derive(Clone, Copy, Debug)]
enum Frame {
    Root,
    /// A nested attribute of the frame below; its body lines are at `body_depth`.
    Attribute {
        name: &'static str,
        body_depth: usize,
    },
    /// Body of a block the schema does not declare.
    Discard { body_depth: usize },
}

impl Frame {
    fn body_depth(&self) -> usize {
        match self {
            Frame::Root => 0,
            Frame::Attribute { body_depth, .. } | Frame::Discard { body_depth } => *body_depth,
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum State {
    Normal,
    InArray(ArrayTarget),
}

#[derive(Clone, Copy, Debug)]
enum ArrayTarget {
    List {
        name: &'static str,
        element: ValueType,
    },
    Discard,
}

/// Parses config text into a schema instance.
pub struct Reader<'r> {
    registry: &'r TypeRegistry,
    source_name: String,
    frames: Vec<Frame>,
    state: State,
    line_no: usize,
}

impl<'r> Reader<'r> {
    /// Creates a reader. `source_name` identifies the input in errors,
    /// usually the file path.
    pub fn new(registry: &'r TypeRegistry, source_name: impl Into<String>) -> Self {
        Reader {
            registry,
            source_name: source_name.into(),
            frames: vec![Frame::Root],
            state: State::Normal,
            line_no: 0,
        }
    }

    /// Reads `text` into `root`.
    ///
    /// # Errors
    ///
    /// Stops at the first malformed line, unconvertible value or schema
    /// mismatch. Attributes set before that point keep their new values.
    pub fn read(mut self, text: &str, root: &mut dyn SchemaWalker) -> Result<()> {
        for (index, line) in text.lines().enumerate() {
            self.line_no = index + 1;
            self.read_line(line, root)?;
        }
        if let State::InArray(_) = self.state {
            debug!(source = %self.source_name, "list block not closed before end of input");
        }
        Ok(())
    }

    fn read_line(&mut self, raw: &str, root: &mut dyn SchemaWalker) -> Result<()> {
        let line = raw.trim();

        if let State::InArray(target) = self.state {
            return self.read_element(line, target, root);
        }

        if line.is_empty() || line.starts_with("//") {
            return Ok(());
        }

        self.close_blocks(indent_depth(raw));

        if let Some((name, value)) = line.split_once('=') {
            return self.assign(name.trim(), value.trim_start_matches(' '), root);
        }
        if let Some(name) = line.strip_suffix(':') {
            return self.open_nested(name.trim(), indent_depth(raw), root);
        }
        if let Some(name) = line.strip_suffix('[') {
            return self.open_list(name.trim(), root);
        }

        Err(Error::format(line, self.line_no, &self.source_name))
    }

    /// Pops every frame whose body is deeper than `depth`. The root frame
    /// is never popped.
    fn close_blocks(&mut self, depth: usize) {
        while self.frames.len() > 1 {
            match self.frames.last() {
                Some(frame) if frame.body_depth() > depth => {
                    trace!(line = self.line_no, ?frame, "closing block");
                    self.frames.pop();
                }
                _ => break,
            }
        }
    }

    /// Resolves the instance the current frame points at, or `None` while
    /// inside an undeclared block.
    fn current<'n>(
        &self,
        root: &'n mut dyn SchemaWalker,
    ) -> Result<Option<&'n mut dyn SchemaWalker>> {
        let mut node = root;
        for frame in &self.frames {
            match *frame {
                Frame::Root => {}
                Frame::Attribute { name, .. } => {
                    node = node.nested_mut(name).ok_or_else(|| {
                        Error::schema(format!("nested attribute `{}` is no longer reachable", name))
                    })?;
                }
                Frame::Discard { .. } => return Ok(None),
            }
        }
        Ok(Some(node))
    }

    fn assign(&mut self, name: &str, value: &str, root: &mut dyn SchemaWalker) -> Result<()> {
        let Some(node) = self.current(root)? else {
            return Ok(());
        };
        let Some(descriptor) = node.find(name) else {
            debug!(
                source = %self.source_name,
                line = self.line_no,
                attribute = name,
                "ignoring unknown attribute"
            );
            return Ok(());
        };
        let ty = match descriptor.kind {
            Kind::Scalar(ty) => ty,
            Kind::Custom(custom) => ValueType::Custom(custom),
            Kind::Nested | Kind::List(_) => {
                return Err(self.kind_mismatch(node, &descriptor, "assigned with `=`"))
            }
        };
        let value = self.registry.parse(value, &ty)?;
        node.set(descriptor.name, value)
    }

    fn open_nested(
        &mut self,
        name: &str,
        depth: usize,
        root: &mut dyn SchemaWalker,
    ) -> Result<()> {
        let body_depth = depth + 1;
        let frame = match self.current(root)? {
            None => Frame::Discard { body_depth },
            Some(node) => match node.find(name) {
                Some(Descriptor {
                    name,
                    kind: Kind::Nested,
                    ..
                }) => Frame::Attribute { name, body_depth },
                Some(descriptor) => {
                    return Err(self.kind_mismatch(node, &descriptor, "opened as a nested block"))
                }
                None => {
                    debug!(
                        source = %self.source_name,
                        line = self.line_no,
                        attribute = name,
                        "skipping unknown block"
                    );
                    Frame::Discard { body_depth }
                }
            },
        };
        trace!(line = self.line_no, ?frame, "opening block");
        self.frames.push(frame);
        Ok(())
    }

    fn open_list(&mut self, name: &str, root: &mut dyn SchemaWalker) -> Result<()> {
        let target = match self.current(root)? {
            None => ArrayTarget::Discard,
            Some(node) => match node.find(name) {
                Some(Descriptor {
                    name,
                    kind: Kind::List(Some(element)),
                    ..
                }) => {
                    node.clear_list(name)?;
                    ArrayTarget::List { name, element }
                }
                Some(Descriptor {
                    name,
                    kind: Kind::List(None),
                    ..
                }) => {
                    return Err(Error::schema(format!(
                        "list `{}` of {} declares no element type (line {})",
                        name,
                        node.schema_name(),
                        self.line_no
                    )))
                }
                Some(descriptor) => {
                    return Err(self.kind_mismatch(node, &descriptor, "opened as a list"))
                }
                None => {
                    debug!(
                        source = %self.source_name,
                        line = self.line_no,
                        attribute = name,
                        "skipping unknown list"
                    );
                    ArrayTarget::Discard
                }
            },
        };
        self.state = State::InArray(target);
        Ok(())
    }

    fn read_element(
        &mut self,
        line: &str,
        target: ArrayTarget,
        root: &mut dyn SchemaWalker,
    ) -> Result<()> {
        if line == "]" {
            self.state = State::Normal;
            return Ok(());
        }
        let ArrayTarget::List { name, element } = target else {
            return Ok(());
        };
        let value = self.registry.parse(line, &element)?;
        match self.current(root)? {
            Some(node) => node.push_element(name, value),
            None => Ok(()),
        }
    }

    fn kind_mismatch(&self, node: &dyn SchemaWalker, descriptor: &Descriptor, usage: &str) -> Error {
        Error::schema(format!(
            "attribute `{}` of {} cannot be {} (line {} of {})",
            descriptor.name,
            node.schema_name(),
            usage,
            self.line_no,
            self.source_name
        ))
    }
}

/// Nesting depth of a line: leading spaces divided by four. Tabs do not count.
pub(crate) fn indent_depth(line: &str) -> usize {
    line.bytes().take_while(|b| *b == b' ').count() / INDENT_WIDTH
}
