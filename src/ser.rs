//! Value capture through serde.
//!
//! [`NodeSerializer`] turns any `T: Serialize` into a [`Node`] tree. Unlike a
//! plain [`Value`], a node remembers where it came from: structs keep their
//! type name and their field tags in declaration order, absent optionals stay
//! distinguishable from explicit values, and a [`Body`] embedded in a struct
//! comes back out as a body. The walker reads this tree; it never sees the
//! original value.
//!
//! Capture counts nesting of structs, sequences and maps. A value deeper than
//! [`EncodeOptions::max_depth`] (for instance one whose `Serialize` impl
//! refers back to itself) fails with [`Error::Cycle`] instead of recursing
//! without bound.

use crate::body::{Attribute, Block, Body, BODY_TOKEN};
use crate::{tag, EncodeOptions, Error, Number, Result, Value, ValueMap};
use serde::{ser, Serialize};

/// Captured shape of a serialized value.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Node {
    /// `None`, `()` or a field skipped by `skip_serializing_if`
    Absent,
    Scalar(Value),
    Seq(Vec<Node>),
    Map(Vec<(String, Node)>),
    Struct(StructNode),
    Body(Body),
}

/// A struct with its serde name and `(tag, value)` fields in declaration order.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct StructNode {
    pub name: &'static str,
    pub fields: Vec<(&'static str, Node)>,
}

impl StructNode {
    pub fn tags(&self) -> Vec<&'static str> {
        self.fields.iter().map(|(tag, _)| *tag).collect()
    }
}

impl Node {
    /// Short name of the node's shape, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Absent => "absent value",
            Node::Scalar(value) => value.kind(),
            Node::Seq(_) => "sequence",
            Node::Map(_) => "mapping",
            Node::Struct(_) => "structured value",
            Node::Body(_) => "document body",
        }
    }

    pub fn is_struct(&self) -> bool {
        matches!(self, Node::Struct(_))
    }

    /// Converts the node to a generic value for an attribute write.
    ///
    /// Nested structs become maps keyed by their fields' target names.
    pub fn to_value(&self, path: &str) -> Result<Value> {
        match self {
            Node::Absent => Ok(Value::Null),
            Node::Scalar(value) => Ok(value.clone()),
            Node::Seq(items) => items
                .iter()
                .map(|item| item.to_value(path))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
            Node::Map(entries) => entries
                .iter()
                .map(|(key, item)| Ok((key.clone(), item.to_value(path)?)))
                .collect::<Result<ValueMap>>()
                .map(Value::Map),
            Node::Struct(node) => node
                .fields
                .iter()
                .filter_map(|(field_tag, item)| {
                    let name = tag::target_name(field_tag);
                    (!name.is_empty()).then(|| Ok((name.to_string(), item.to_value(path)?)))
                })
                .collect::<Result<ValueMap>>()
                .map(Value::Map),
            Node::Body(_) => Err(Error::type_mismatch(
                path,
                "attribute value",
                self.kind(),
            )),
        }
    }
}

/// Captures any `T: Serialize` as a [`Node`], bounded by `options.max_depth`.
pub(crate) fn capture<T: Serialize + ?Sized>(value: &T, options: &EncodeOptions) -> Result<Node> {
    value.serialize(NodeSerializer {
        depth: 0,
        max_depth: options.max_depth,
    })
}

#[derive(Clone, Copy)]
pub(crate) struct NodeSerializer {
    depth: usize,
    max_depth: Option<usize>,
}

impl NodeSerializer {
    /// The serializer for the contents of a struct, sequence or map.
    fn nested(self) -> Result<NodeSerializer> {
        let depth = self.depth + 1;
        match self.max_depth {
            Some(limit) if depth > limit => Err(Error::cycle(limit)),
            _ => Ok(NodeSerializer { depth, ..self }),
        }
    }
}

pub(crate) struct SerializeVec {
    inner: NodeSerializer,
    vec: Vec<Node>,
}

pub(crate) struct SerializeMap {
    inner: NodeSerializer,
    entries: Vec<(String, Node)>,
    current_key: Option<String>,
}

pub(crate) struct SerializeStruct {
    inner: NodeSerializer,
    node: StructNode,
}

impl ser::Serializer for NodeSerializer {
    type Ok = Node;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = ser::Impossible<Node, Error>;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeStruct;
    type SerializeStructVariant = ser::Impossible<Node, Error>;

    fn serialize_bool(self, v: bool) -> Result<Node> {
        Ok(Node::Scalar(Value::Bool(v)))
    }

    fn serialize_i8(self, v: i8) -> Result<Node> {
        Ok(Node::Scalar(Value::Number(Number::from(v))))
    }

    fn serialize_i16(self, v: i16) -> Result<Node> {
        Ok(Node::Scalar(Value::Number(Number::from(v))))
    }

    fn serialize_i32(self, v: i32) -> Result<Node> {
        Ok(Node::Scalar(Value::Number(Number::from(v))))
    }

    fn serialize_i64(self, v: i64) -> Result<Node> {
        Ok(Node::Scalar(Value::Number(Number::from(v))))
    }

    fn serialize_i128(self, v: i128) -> Result<Node> {
        Ok(Node::Scalar(Value::Number(Number::from(v))))
    }

    fn serialize_u8(self, v: u8) -> Result<Node> {
        Ok(Node::Scalar(Value::Number(Number::from(v))))
    }

    fn serialize_u16(self, v: u16) -> Result<Node> {
        Ok(Node::Scalar(Value::Number(Number::from(v))))
    }

    fn serialize_u32(self, v: u32) -> Result<Node> {
        Ok(Node::Scalar(Value::Number(Number::from(v))))
    }

    fn serialize_u64(self, v: u64) -> Result<Node> {
        Ok(Node::Scalar(Value::Number(Number::from(v))))
    }

    fn serialize_u128(self, v: u128) -> Result<Node> {
        Ok(Node::Scalar(Value::Number(Number::from(v))))
    }

    fn serialize_f32(self, v: f32) -> Result<Node> {
        Ok(Node::Scalar(Value::Number(Number::from(v))))
    }

    fn serialize_f64(self, v: f64) -> Result<Node> {
        Ok(Node::Scalar(Value::Number(Number::from(v))))
    }

    fn serialize_char(self, v: char) -> Result<Node> {
        Ok(Node::Scalar(Value::String(v.to_string())))
    }

    fn serialize_str(self, v: &str) -> Result<Node> {
        Ok(Node::Scalar(Value::String(v.to_string())))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Node> {
        let vec = v
            .iter()
            .map(|&b| Node::Scalar(Value::Number(Number::from(b))))
            .collect();
        Ok(Node::Seq(vec))
    }

    fn serialize_none(self) -> Result<Node> {
        Ok(Node::Absent)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Node>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Node> {
        Ok(Node::Absent)
    }

    // A fieldless struct still encodes as an (empty) block.
    fn serialize_unit_struct(self, name: &'static str) -> Result<Node> {
        Ok(Node::Struct(StructNode {
            name,
            fields: Vec::new(),
        }))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Node> {
        Ok(Node::Scalar(Value::String(variant.to_string())))
    }

    fn serialize_newtype_struct<T>(self, name: &'static str, value: &T) -> Result<Node>
    where
        T: ?Sized + Serialize,
    {
        let node = value.serialize(self)?;
        if name == BODY_TOKEN {
            return rebuild_body(node).map(Node::Body);
        }
        Ok(node)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Node>
    where
        T: ?Sized + Serialize,
    {
        Err(Error::unsupported_type("newtype variants"))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec::new(self.nested()?, len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(self.nested()?, len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(self.nested()?, len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(Error::unsupported_type("tuple variants"))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap {
            inner: self.nested()?,
            entries: Vec::with_capacity(len.unwrap_or(0)),
            current_key: None,
        })
    }

    fn serialize_struct(self, name: &'static str, len: usize) -> Result<SerializeStruct> {
        Ok(SerializeStruct {
            inner: self.nested()?,
            node: StructNode {
                name,
                fields: Vec::with_capacity(len),
            },
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(Error::unsupported_type("struct variants"))
    }
}

impl SerializeVec {
    fn new(inner: NodeSerializer, capacity: usize) -> Self {
        SerializeVec {
            inner,
            vec: Vec::with_capacity(capacity),
        }
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Node;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(value.serialize(self.inner)?);
        Ok(())
    }

    fn end(self) -> Result<Node> {
        Ok(Node::Seq(self.vec))
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Node;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(value.serialize(self.inner)?);
        Ok(())
    }

    fn end(self) -> Result<Node> {
        Ok(Node::Seq(self.vec))
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Node;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(value.serialize(self.inner)?);
        Ok(())
    }

    fn end(self) -> Result<Node> {
        Ok(Node::Seq(self.vec))
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Node;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = match key.serialize(self.inner)? {
            Node::Scalar(Value::String(s)) => s,
            Node::Scalar(Value::Number(n)) => n.to_string(),
            Node::Scalar(Value::Bool(b)) => b.to_string(),
            other => {
                return Err(Error::unsupported_type(&format!(
                    "map key of shape {}",
                    other.kind()
                )))
            }
        };
        self.current_key = Some(key);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.entries.push((key, value.serialize(self.inner)?));
        Ok(())
    }

    fn end(self) -> Result<Node> {
        Ok(Node::Map(self.entries))
    }
}

impl ser::SerializeStruct for SerializeStruct {
    type Ok = Node;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.node.fields.push((key, value.serialize(self.inner)?));
        Ok(())
    }

    fn skip_field(&mut self, key: &'static str) -> Result<()> {
        self.node.fields.push((key, Node::Absent));
        Ok(())
    }

    fn end(self) -> Result<Node> {
        Ok(Node::Struct(self.node))
    }
}

/// Reassembles a [`Body`] from the node its `Serialize` impl produced.
fn rebuild_body(node: Node) -> Result<Body> {
    let malformed = || Error::custom("malformed embedded document body");

    let Node::Struct(contents) = node else {
        return Err(malformed());
    };
    let mut attributes = Vec::new();
    let mut blocks = Vec::new();
    for (field, value) in contents.fields {
        match (field, value) {
            ("attributes", Node::Seq(items)) => {
                for item in items {
                    let Node::Struct(attr) = item else {
                        return Err(malformed());
                    };
                    let mut name = None;
                    let mut value = Value::Null;
                    for (key, part) in attr.fields {
                        match (key, part) {
                            ("name", Node::Scalar(Value::String(s))) => name = Some(s),
                            ("value", part) => value = part.to_value("<body>")?,
                            _ => return Err(malformed()),
                        }
                    }
                    attributes.push(Attribute::new(name.ok_or_else(malformed)?, value));
                }
            }
            ("blocks", Node::Seq(items)) => {
                for item in items {
                    blocks.push(rebuild_block(item).ok_or_else(malformed)?);
                }
            }
            _ => return Err(malformed()),
        }
    }
    Ok(Body::from_parts(attributes, blocks))
}

fn rebuild_block(node: Node) -> Option<Block> {
    let Node::Struct(block) = node else {
        return None;
    };
    let mut ident = None;
    let mut labels = Vec::new();
    let mut body = Body::new();
    for (key, part) in block.fields {
        match (key, part) {
            ("type", Node::Scalar(Value::String(s))) => ident = Some(s),
            ("labels", Node::Seq(items)) => {
                for item in items {
                    match item {
                        Node::Scalar(Value::String(s)) => labels.push(s),
                        _ => return None,
                    }
                }
            }
            ("body", Node::Body(inner)) => body = inner,
            _ => return None,
        }
    }
    let mut rebuilt = Block::new(ident?, labels);
    *rebuilt.body_mut() = body;
    Some(rebuilt)
}
