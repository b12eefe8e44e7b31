//! The struct walker.
//!
//! [`Encoder`] writes one struct into a [`Body`] in two passes over its fields
//! in declaration order: first every attribute (including what a remainder
//! field contributes), then every block, recursing into each block's body.
//! The first error aborts the walk; whatever was written before it stays.
//!
//! Recursion depth follows the nesting of the value. A value that contains
//! itself cannot be captured in finite form; [`EncodeOptions::max_depth`]
//! bounds the capture that precedes the walk and reports [`Error::Cycle`]
//! past it, so the walk only ever sees finite trees.

use crate::body::{Block, Body};
use crate::classify::classify;
use crate::expand::{expand, labels_of, BlockContent};
use crate::schema::{self, Schema};
use crate::ser::{self, Node, StructNode};
use crate::tag::{FieldDescriptor, FieldRole};
use crate::{EncodeOptions, Error, Result};
use serde::Serialize;

/// Encodes tagged structs into document bodies.
///
/// # Examples
///
/// ```rust
/// use serde::Serialize;
/// use serde_blocks::{Body, EncodeOptions, Encoder};
///
/// #[derive(Serialize)]
/// struct Constraints {
///     #[serde(rename = "os")]
///     os: String,
/// }
///
/// let encoder = Encoder::new(EncodeOptions::new().with_max_depth(4));
/// let mut body = Body::new();
/// encoder.encode(&Constraints { os: "linux".into() }, &mut body).unwrap();
/// assert_eq!(body.get_attribute("os").and_then(|v| v.as_str()), Some("linux"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Encoder {
    options: EncodeOptions,
}

impl Encoder {
    #[must_use]
    pub fn new(options: EncodeOptions) -> Self {
        Encoder { options }
    }

    #[must_use]
    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    /// Appends the attributes and blocks of `value` to `body`.
    ///
    /// `body` is not cleared first. A `None` root encodes nothing.
    ///
    /// # Errors
    ///
    /// Returns the first schema, type, collision or depth error met. Anything
    /// written before it remains in `body`.
    pub fn encode<T>(&self, value: &T, body: &mut Body) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        match ser::capture(value, &self.options)? {
            Node::Absent => Ok(()),
            Node::Struct(node) => self.encode_struct(&node, body, 0),
            other => Err(Error::type_mismatch(
                "<root>",
                "structured value",
                other.kind(),
            )),
        }
    }

    /// Encodes `value` as a standalone block of type `block_type`, labeled by
    /// the value's own label fields.
    ///
    /// # Errors
    ///
    /// As [`Encoder::encode`]; an absent root is a type mismatch here.
    pub fn encode_as_block<T>(&self, value: &T, block_type: &str) -> Result<Block>
    where
        T: ?Sized + Serialize,
    {
        let node = match ser::capture(value, &self.options)? {
            Node::Struct(node) => node,
            other => {
                return Err(Error::type_mismatch(
                    "<root>",
                    "structured value",
                    other.kind(),
                ))
            }
        };
        let schema = schema::schema_for(&node)?;
        let mut block = Block::new(block_type, labels_of(&node, &schema)?);
        self.encode_struct(&node, block.body_mut(), 0)?;
        Ok(block)
    }

    fn encode_struct(&self, node: &StructNode, body: &mut Body, depth: usize) -> Result<()> {
        let schema = schema::schema_for(node)?;
        log::trace!("encoding {} at depth {}", node.name, depth);

        for (index, (desc, (_, value))) in schema.fields().iter().zip(&node.fields).enumerate() {
            match desc.role {
                FieldRole::Attribute => {
                    let path = schema.path(index);
                    let classification = classify(desc, value, &path, &self.options)?;
                    if classification.is_attribute() {
                        body.set_attribute(&desc.name, value.to_value(&path)?);
                    } else {
                        log::trace!("skipping attribute {}", path);
                    }
                }
                FieldRole::Remainder => {
                    self.write_remainder_attributes(desc, value, &schema, index, body)?;
                }
                FieldRole::Label | FieldRole::Block => {}
            }
        }

        for (index, (desc, (_, value))) in schema.fields().iter().zip(&node.fields).enumerate() {
            match desc.role {
                FieldRole::Block => {
                    let path = schema.path(index);
                    let classification = classify(desc, value, &path, &self.options)?;
                    for instance in expand(value, classification, &path)? {
                        let child = body.append_block(&desc.name, instance.labels);
                        match instance.content {
                            BlockContent::Struct(item) => {
                                self.encode_struct(item, child, depth + 1)?;
                            }
                            BlockContent::Entries(entries) => {
                                self.write_entries(entries.into_iter(), child, &path)?;
                            }
                        }
                    }
                }
                FieldRole::Remainder if desc.body_mode => {
                    if let Node::Body(extra) = value {
                        for block in extra.blocks() {
                            body.push_block(block.clone());
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn write_remainder_attributes(
        &self,
        desc: &FieldDescriptor,
        value: &Node,
        schema: &Schema,
        index: usize,
        body: &mut Body,
    ) -> Result<()> {
        let path = schema.path(index);
        match (desc.body_mode, value) {
            (_, Node::Absent) => Ok(()),
            (true, Node::Body(extra)) => {
                for attr in extra.attributes() {
                    if schema.defines(attr.name()) {
                        return Err(Error::name_collision(&path, attr.name()));
                    }
                    body.set_attribute(attr.name(), attr.value().clone());
                }
                Ok(())
            }
            (false, Node::Map(entries)) => {
                let mut sorted: Vec<_> = entries.iter().collect();
                sorted.sort_by(|a, b| a.0.cmp(&b.0));
                if let Some((name, _)) = sorted.iter().find(|(name, _)| schema.defines(name)) {
                    return Err(Error::name_collision(&path, name));
                }
                self.write_entries(sorted.into_iter(), body, &path)
            }
            (true, other) => Err(Error::type_mismatch(&path, "document body", other.kind())),
            (false, other) => Err(Error::type_mismatch(
                &path,
                "mapping of attribute values",
                other.kind(),
            )),
        }
    }

    fn write_entries<'a, I>(&self, entries: I, body: &mut Body, path: &str) -> Result<()>
    where
        I: Iterator<Item = &'a (String, Node)>,
    {
        for (name, value) in entries {
            if matches!(value, Node::Absent) && self.options.skip_absent_attributes {
                continue;
            }
            body.set_attribute(name, value.to_value(path)?);
        }
        Ok(())
    }
}
