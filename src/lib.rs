//! # serde_blocks
//!
//! Encode tagged Rust structs into HCL-style document trees of attributes and
//! nested blocks.
//!
//! ## How fields are tagged
//!
//! A field's serde name is its tag: a target name, optionally followed by
//! comma-separated modifiers (see [`tag`] for the full list).
//!
//! - `"name"`: an attribute `name = ...`
//! - `"name,label"`: a label of the enclosing block
//! - `"name,block"`: one nested `name { ... }` block per value; `Option`,
//!   `Vec` and maps are expanded into zero, one or many blocks
//! - `",remain"`: extra attributes from a map; `",remain,body"` merges a
//!   hand-built [`Body`]
//!
//! ## Quick Start
//!
//! ```rust
//! use serde::Serialize;
//! use serde_blocks::to_body;
//!
//! #[derive(Serialize)]
//! struct Service {
//!     #[serde(rename = "name,label")]
//!     name: String,
//!     #[serde(rename = "executable")]
//!     exe: Vec<String>,
//! }
//!
//! #[derive(Serialize)]
//! struct Constraints {
//!     #[serde(rename = "os")]
//!     os: String,
//!     #[serde(rename = "arch")]
//!     arch: String,
//! }
//!
//! #[derive(Serialize)]
//! struct App {
//!     #[serde(rename = "name")]
//!     name: String,
//!     #[serde(rename = "description")]
//!     desc: String,
//!     #[serde(rename = "constraints,block")]
//!     constraints: Option<Constraints>,
//!     #[serde(rename = "service,block")]
//!     services: Vec<Service>,
//! }
//!
//! let app = App {
//!     name: "awesome-app".into(),
//!     desc: "Such an awesome application".into(),
//!     constraints: Some(Constraints { os: "linux".into(), arch: "amd64".into() }),
//!     services: vec![
//!         Service { name: "web".into(), exe: vec!["./web".into(), "--listen=:8080".into()] },
//!         Service { name: "worker".into(), exe: vec!["./worker".into()] },
//!     ],
//! };
//!
//! let body = to_body(&app).unwrap();
//! assert_eq!(body.attributes().len(), 2);
//!
//! let blocks: Vec<_> = body.blocks().iter().map(|b| (b.ident(), b.labels().to_vec())).collect();
//! assert_eq!(blocks[0], ("constraints", vec![]));
//! assert_eq!(blocks[1], ("service", vec!["web".to_string()]));
//! assert_eq!(blocks[2], ("service", vec!["worker".to_string()]));
//! ```
//!
//! ## Ordering
//!
//! Within every body, attributes come first and blocks second, each group in
//! field declaration order. Maps are always walked in ascending key order, so
//! the output does not depend on a `HashMap`'s iteration order.
//!
//! ## Errors
//!
//! Encoding stops at the first bad field. Output already written is kept; see
//! [`Error`] for the categories.

pub mod body;
pub mod encode;
pub mod error;
pub mod macros;
pub mod map;
pub mod options;
pub mod schema;
pub mod tag;
pub mod value;

mod classify;
mod expand;
mod ser;

pub use body::{Attribute, Block, Body};
pub use encode::Encoder;
pub use error::{Error, Result};
pub use map::ValueMap;
pub use options::EncodeOptions;
pub use schema::Schema;
pub use tag::{parse_tag, FieldDescriptor, FieldRole};
pub use value::{Number, Value};

use serde::Serialize;

/// Appends the attributes and blocks of a tagged struct to `body`.
///
/// `body` is not cleared; existing content is kept, and an existing attribute
/// with the same name as an encoded one gets the new value.
///
/// # Examples
///
/// ```rust
/// use serde::Serialize;
/// use serde_blocks::{encode_into_body, Body};
///
/// #[derive(Serialize)]
/// struct Child {
///     #[serde(rename = "name,label")]
///     name: String,
///     #[serde(rename = "prop,optional")]
///     property: String,
/// }
///
/// #[derive(Serialize)]
/// struct Base {
///     #[serde(rename = "testMap,block")]
///     test_map: std::collections::HashMap<String, Child>,
/// }
///
/// let mut base = Base { test_map: Default::default() };
/// base.test_map.insert("test".into(), Child { name: "test".into(), property: "property".into() });
///
/// let mut body = Body::new();
/// encode_into_body(&base, &mut body).unwrap();
///
/// let block = &body.blocks()[0];
/// assert_eq!(block.ident(), "testMap");
/// assert_eq!(block.labels(), ["test"]);
/// assert_eq!(block.body().get_attribute("prop").and_then(|v| v.as_str()), Some("property"));
/// ```
///
/// # Errors
///
/// Returns an error if the value is not a struct (or `None`), if its tags are
/// malformed, or if a field's value does not fit its role.
pub fn encode_into_body<T>(value: &T, body: &mut Body) -> Result<()>
where
    T: ?Sized + Serialize,
{
    encode_into_body_with_options(value, body, &EncodeOptions::default())
}

/// Like [`encode_into_body`], with custom options.
///
/// # Errors
///
/// As [`encode_into_body`], plus [`Error::Cycle`] when nesting exceeds
/// [`EncodeOptions::max_depth`].
pub fn encode_into_body_with_options<T>(
    value: &T,
    body: &mut Body,
    options: &EncodeOptions,
) -> Result<()>
where
    T: ?Sized + Serialize,
{
    Encoder::new(options.clone()).encode(value, body)
}

/// Encodes a tagged struct as one block of type `block_type`.
///
/// The block's labels are the struct's own `label` fields.
///
/// # Examples
///
/// ```rust
/// use serde::Serialize;
/// use serde_blocks::encode_as_block;
///
/// #[derive(Serialize)]
/// struct Service {
///     #[serde(rename = "name,label")]
///     name: String,
///     #[serde(rename = "executable")]
///     exe: Vec<String>,
/// }
///
/// let block = encode_as_block(&Service { name: "web".into(), exe: vec!["./web".into()] }, "service").unwrap();
/// assert_eq!(block.labels(), ["web"]);
/// assert!(block.body().get_attribute("executable").is_some());
/// ```
///
/// # Errors
///
/// As [`encode_into_body`]; a non-string label is a type mismatch.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode_as_block<T>(value: &T, block_type: &str) -> Result<Block>
where
    T: ?Sized + Serialize,
{
    Encoder::default().encode_as_block(value, block_type)
}

/// Encodes a tagged struct into a fresh [`Body`].
///
/// Encoding into a fresh body and merging on success is the way to get
/// all-or-nothing behavior.
///
/// # Errors
///
/// As [`encode_into_body`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_body<T>(value: &T) -> Result<Body>
where
    T: ?Sized + Serialize,
{
    let mut body = Body::new();
    encode_into_body(value, &mut body)?;
    Ok(body)
}

/// Converts any `T: Serialize` to a generic [`Value`].
///
/// Structs become maps keyed by their fields' target names; `None` becomes
/// [`Value::Null`].
///
/// # Examples
///
/// ```rust
/// use serde_blocks::{to_value, Value};
///
/// let value = to_value(&Some(vec![1, 2, 3])).unwrap();
/// assert_eq!(value.as_list().map(Vec::len), Some(3));
/// assert_eq!(to_value(&None::<u8>).unwrap(), Value::Null);
/// ```
///
/// # Errors
///
/// Returns an error for enum variants carrying data, non-scalar map keys,
/// embedded document bodies, and values nested deeper than the default
/// [`EncodeOptions::max_depth`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    ser::capture(value, &EncodeOptions::default())?.to_value("<value>")
}
