//! Error types for block encoding.
//!
//! Every failure is reported eagerly, on the first offending field, and aborts
//! the remaining encode of that value. Output already written to the target
//! [`Body`](crate::Body) is not rolled back; encode into a fresh body and merge
//! on success when atomicity matters.
//!
//! ## Error Categories
//!
//! - **Schema errors**: the field tags of a type are malformed or contradict
//!   each other (unknown modifier, labels after attributes, two remainders)
//! - **Type mismatches**: a field's runtime value cannot take its declared role
//! - **Name collisions**: a remainder field contributes an attribute that a
//!   named field already defines
//! - **Cycle errors**: nesting went deeper than the configured bound
//!
//! ## Examples
//!
//! ```rust
//! use serde::Serialize;
//! use serde_blocks::{to_body, Error};
//!
//! #[derive(Serialize)]
//! struct Broken {
//!     #[serde(rename = "name,sorted")]
//!     name: String,
//! }
//!
//! let err = to_body(&Broken { name: "x".into() }).unwrap_err();
//! assert!(matches!(err, Error::Schema { .. }));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur while encoding a value into a body.
///
/// `path` fields name the offending field as `Type.field`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Malformed or self-contradictory field tags
    #[error("Schema error at {path}: {msg}")]
    Schema { path: String, msg: String },

    /// Runtime value shape incompatible with the field's declared role
    #[error("Type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },

    /// A remainder attribute with the same name as a named field
    #[error("Name collision at {path}: remainder attribute {name:?} is already defined by a named field")]
    NameCollision { path: String, name: String },

    /// Nesting exceeded the configured depth bound
    #[error("Nesting depth exceeded {limit} levels; the value graph may be cyclic")]
    Cycle { limit: usize },

    /// Unsupported type for encoding
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a schema error for the field at `path`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_blocks::Error;
    ///
    /// let err = Error::schema("App.service", "unknown modifier \"sorted\"");
    /// assert!(err.to_string().contains("App.service"));
    /// ```
    pub fn schema(path: &str, msg: &str) -> Self {
        Error::Schema {
            path: path.to_string(),
            msg: msg.to_string(),
        }
    }

    /// Creates a type mismatch error when a value cannot take its field's role.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_blocks::Error;
    ///
    /// let err = Error::type_mismatch("Service.name", "string label", "number");
    /// assert!(err.to_string().contains("expected string label"));
    /// ```
    pub fn type_mismatch(path: &str, expected: &str, found: &str) -> Self {
        Error::TypeMismatch {
            path: path.to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Creates a name collision error for a remainder attribute.
    pub fn name_collision(path: &str, name: &str) -> Self {
        Error::NameCollision {
            path: path.to_string(),
            name: name.to_string(),
        }
    }

    /// Creates a cycle error for a nesting bound of `limit` levels.
    pub fn cycle(limit: usize) -> Self {
        Error::Cycle { limit }
    }

    /// Creates an unsupported type error for serde shapes the encoder cannot represent.
    pub fn unsupported_type(msg: &str) -> Self {
        Error::UnsupportedType(msg.to_string())
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_blocks::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Returns `true` for errors caused by the tag schema rather than by the value.
    #[must_use]
    pub fn is_schema(&self) -> bool {
        matches!(self, Error::Schema { .. })
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
