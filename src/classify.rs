//! Deciding how a field's runtime value is represented.

use crate::ser::Node;
use crate::tag::{FieldDescriptor, FieldRole};
use crate::{EncodeOptions, Error, Result};

/// The representation chosen for one attribute or block field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Classification {
    ScalarAttr,
    ListAttr,
    MapAttr,
    SingleBlock,
    /// One block per element of a sequence
    RepeatedList,
    /// One block per entry of a mapping of structs, labeled by key
    RepeatedMap,
    /// A single block whose attributes are the entries of a mapping
    MapBlock,
    Skip,
}

impl Classification {
    pub fn is_attribute(self) -> bool {
        matches!(
            self,
            Classification::ScalarAttr | Classification::ListAttr | Classification::MapAttr
        )
    }
}

/// Classifies the value of an attribute or block field.
///
/// Label and remainder fields are never written by the attribute or block
/// passes and always classify as [`Classification::Skip`].
pub(crate) fn classify(
    desc: &FieldDescriptor,
    node: &Node,
    path: &str,
    options: &EncodeOptions,
) -> Result<Classification> {
    match desc.role {
        FieldRole::Attribute => classify_attribute(desc, node, path, options),
        FieldRole::Block => classify_block(node, path),
        FieldRole::Label | FieldRole::Remainder => Ok(Classification::Skip),
    }
}

fn classify_attribute(
    desc: &FieldDescriptor,
    node: &Node,
    path: &str,
    options: &EncodeOptions,
) -> Result<Classification> {
    match node {
        Node::Absent if desc.optional || options.skip_absent_attributes => {
            Ok(Classification::Skip)
        }
        Node::Absent | Node::Scalar(_) => Ok(Classification::ScalarAttr),
        Node::Seq(_) => Ok(Classification::ListAttr),
        Node::Map(_) => Ok(Classification::MapAttr),
        // Structs without a `block` tag are left out.
        Node::Struct(_) => Ok(Classification::Skip),
        Node::Body(_) => Err(Error::type_mismatch(path, "attribute value", node.kind())),
    }
}

fn classify_block(node: &Node, path: &str) -> Result<Classification> {
    match node {
        Node::Absent => Ok(Classification::Skip),
        Node::Struct(_) => Ok(Classification::SingleBlock),
        Node::Seq(items) => {
            if let Some(bad) = items
                .iter()
                .find(|item| !matches!(item, Node::Struct(_) | Node::Absent))
            {
                return Err(Error::type_mismatch(
                    path,
                    "sequence of structured values",
                    &format!("sequence containing {}", bad.kind()),
                ));
            }
            Ok(Classification::RepeatedList)
        }
        Node::Map(entries) => {
            if entries.is_empty() {
                return Ok(Classification::Skip);
            }
            let structs = entries.iter().filter(|(_, value)| value.is_struct()).count();
            let plain = entries
                .iter()
                .filter(|(_, value)| !matches!(value, Node::Struct(_) | Node::Absent | Node::Body(_)))
                .count();
            let bodies = entries
                .iter()
                .any(|(_, value)| matches!(value, Node::Body(_)));
            if bodies || (structs > 0 && plain > 0) {
                return Err(Error::type_mismatch(
                    path,
                    "mapping of structured values or of attribute values",
                    "mapping with mixed values",
                ));
            }
            // Absent entries take no part in choosing the shape.
            match (structs, plain) {
                (0, 0) => Ok(Classification::Skip),
                (_, 0) => Ok(Classification::RepeatedMap),
                _ => Ok(Classification::MapBlock),
            }
        }
        Node::Scalar(_) | Node::Body(_) => Err(Error::type_mismatch(
            path,
            "structured value, sequence or mapping",
            node.kind(),
        )),
    }
}
