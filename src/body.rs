//! The document tree that encoding writes into.
//!
//! A [`Body`] holds attributes and nested [`Block`]s. Attributes always come
//! before blocks: the two groups are stored separately, so a renderer can put
//! a single blank line between them.
//!
//! The tree offers only what the encoder needs (set an attribute, append a
//! block, reach a block's body) plus read accessors. Rendering to text is left
//! to the consumer.
//!
//! ## Examples
//!
//! ```rust
//! use serde_blocks::{Body, Value};
//!
//! let mut body = Body::new();
//! body.set_attribute("name", "awesome-app");
//!
//! let service = body.append_block("service", ["web"]);
//! service.set_attribute("executable", Value::List(vec!["./web".into()]));
//!
//! assert_eq!(body.attributes().len(), 1);
//! assert_eq!(body.blocks()[0].labels(), ["web"]);
//! ```

use crate::Value;
use serde::{Serialize, Serializer};

/// Newtype name under which a [`Body`] serializes itself.
///
/// The encoder recognizes it to take a caller-authored body embedded in a
/// `remain,body` field as a body rather than as plain data.
pub(crate) const BODY_TOKEN: &str = "$serde_blocks::private::Body";

/// A single `name = value` entry.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Attribute {
    name: String,
    value: Value,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Attribute {
            name: name.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// A named, optionally labeled, nested body.
#[derive(Clone, Debug, PartialEq, Default, Serialize)]
pub struct Block {
    #[serde(rename = "type")]
    ident: String,
    labels: Vec<String>,
    body: Body,
}

impl Block {
    /// Creates an empty block of type `ident` with the given labels.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_blocks::Block;
    ///
    /// let block = Block::new("service", ["web"]);
    /// assert_eq!(block.ident(), "service");
    /// assert!(block.body().is_empty());
    /// ```
    pub fn new<I>(ident: impl Into<String>, labels: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Block {
            ident: ident.into(),
            labels: labels.into_iter().map(Into::into).collect(),
            body: Body::new(),
        }
    }

    /// The block type name.
    #[must_use]
    pub fn ident(&self) -> &str {
        &self.ident
    }

    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    #[must_use]
    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

/// A sequence of attributes followed by a sequence of blocks.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Body {
    attributes: Vec<Attribute>,
    blocks: Vec<Block>,
}

impl Body {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the attribute `name` to `value`.
    ///
    /// An existing attribute of the same name keeps its position and gets the
    /// new value; otherwise the attribute is added after the existing ones.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_blocks::{Body, Value};
    ///
    /// let mut body = Body::new();
    /// body.set_attribute("a", 1);
    /// body.set_attribute("b", 2);
    /// body.set_attribute("a", 3);
    ///
    /// let names: Vec<_> = body.attributes().iter().map(|a| a.name()).collect();
    /// assert_eq!(names, ["a", "b"]);
    /// assert_eq!(body.get_attribute("a"), Some(&Value::from(3)));
    /// ```
    pub fn set_attribute(&mut self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|attr| attr.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute::new(name, value)),
        }
    }

    /// Appends a new empty block and returns its body for filling in.
    pub fn append_block<I>(&mut self, ident: &str, labels: I) -> &mut Body
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.push_block(Block::new(ident, labels))
    }

    /// Appends an already built block and returns its body.
    pub fn push_block(&mut self, block: Block) -> &mut Body {
        let index = self.blocks.len();
        self.blocks.push(block);
        &mut self.blocks[index].body
    }

    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<&Value> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(Attribute::value)
    }

    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Iterates over the blocks of type `ident`, in order.
    pub fn blocks_of_type<'a>(&'a self, ident: &'a str) -> impl Iterator<Item = &'a Block> + 'a {
        self.blocks.iter().filter(move |block| block.ident == ident)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.blocks.is_empty()
    }

    pub(crate) fn from_parts(attributes: Vec<Attribute>, blocks: Vec<Block>) -> Self {
        Body { attributes, blocks }
    }
}

impl Serialize for Body {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        #[derive(Serialize)]
        #[serde(rename = "Body")]
        struct Contents<'a> {
            attributes: &'a [Attribute],
            blocks: &'a [Block],
        }

        serializer.serialize_newtype_struct(
            BODY_TOKEN,
            &Contents {
                attributes: &self.attributes,
                blocks: &self.blocks,
            },
        )
    }
}
