//! Field tag parsing.
//!
//! A field's tag is its serde name, usually set with `#[serde(rename = "...")]`.
//! The part before the first comma is the target name in the document; the
//! rest is a comma-separated list of modifiers:
//!
//! | Modifier   | Meaning                                                       |
//! |------------|---------------------------------------------------------------|
//! | *(none)*   | attribute                                                     |
//! | `label`    | the field is one of the block's labels                        |
//! | `block`    | the field becomes one or more nested blocks                   |
//! | `optional` | an absent value is left out (attributes and labels only)      |
//! | `remain`   | the field carries extra attributes not named by other fields  |
//! | `body`     | with `remain`: the field holds a [`Body`](crate::Body) to merge |
//!
//! ```rust
//! use serde_blocks::{parse_tag, FieldRole};
//!
//! let desc = parse_tag("service,block").unwrap();
//! assert_eq!(desc.name, "service");
//! assert_eq!(desc.role, FieldRole::Block);
//!
//! assert!(parse_tag("service,block,optional").is_err());
//! ```

use crate::{Error, Result};

/// What a field turns into when its struct is encoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldRole {
    Label,
    Attribute,
    Block,
    Remainder,
}

/// The parsed form of one field tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Target name in the document; empty for remainder fields.
    pub name: String,
    pub role: FieldRole,
    pub optional: bool,
    /// The remainder field holds a body rather than a map of attributes.
    pub body_mode: bool,
}

/// Parses a field tag into its descriptor.
///
/// # Errors
///
/// Returns [`Error::Schema`] for an unknown modifier, for conflicting role
/// modifiers, for `optional` on a block or remainder field, for `body` without
/// `remain`, and for a missing target name on a non-remainder field.
pub fn parse_tag(tag: &str) -> Result<FieldDescriptor> {
    parse_field(tag, tag)
}

/// Returns the target-name part of a tag without validating its modifiers.
#[must_use]
pub fn target_name(tag: &str) -> &str {
    match tag.split_once(',') {
        Some((name, _)) => name.trim(),
        None => tag.trim(),
    }
}

/// Parses `tag`, reporting errors against `path`.
pub(crate) fn parse_field(tag: &str, path: &str) -> Result<FieldDescriptor> {
    let (name, modifiers) = match tag.split_once(',') {
        Some((name, rest)) => (name.trim(), rest),
        None => (tag.trim(), ""),
    };

    let (mut label, mut block, mut optional, mut remain, mut body) =
        (false, false, false, false, false);
    for modifier in modifiers.split(',').map(str::trim).filter(|m| !m.is_empty()) {
        match modifier {
            "label" => label = true,
            "block" => block = true,
            "optional" => optional = true,
            "remain" => remain = true,
            "body" => body = true,
            other => {
                return Err(Error::schema(
                    path,
                    &format!("unknown modifier {:?}", other),
                ))
            }
        }
    }

    if remain && (label || block) {
        return Err(Error::schema(
            path,
            "`remain` cannot be combined with `label` or `block`",
        ));
    }
    if label && block {
        return Err(Error::schema(path, "`label` and `block` are mutually exclusive"));
    }
    if optional && (block || remain) {
        return Err(Error::schema(
            path,
            "`optional` applies only to attribute and label fields",
        ));
    }
    if body && !remain {
        return Err(Error::schema(path, "`body` requires `remain`"));
    }

    let role = if remain {
        FieldRole::Remainder
    } else if label {
        FieldRole::Label
    } else if block {
        FieldRole::Block
    } else {
        FieldRole::Attribute
    };

    if role != FieldRole::Remainder && name.is_empty() {
        return Err(Error::schema(path, "missing target name"));
    }

    Ok(FieldDescriptor {
        name: name.to_string(),
        role,
        optional,
        body_mode: body,
    })
}
