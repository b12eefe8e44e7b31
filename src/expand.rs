//! Expanding a block field into its block instances.
//!
//! A block field yields zero or more `(labels, content)` pairs. Lists keep
//! their element order and take labels from each element's own label fields;
//! mappings of structs are emitted in ascending key order with the key as the
//! only label. Every instance of a field is resolved before the walker
//! appends the first one, so a failing field leaves no blocks behind.

use crate::classify::Classification;
use crate::schema::{self, Schema};
use crate::ser::{Node, StructNode};
use crate::tag::FieldRole;
use crate::{Error, Result, Value};

/// What fills the body of one block instance.
#[derive(Debug)]
pub(crate) enum BlockContent<'a> {
    Struct(&'a StructNode),
    /// Attribute entries, already in ascending key order
    Entries(Vec<&'a (String, Node)>),
}

#[derive(Debug)]
pub(crate) struct BlockInstance<'a> {
    pub labels: Vec<String>,
    pub content: BlockContent<'a>,
}

/// Expands a classified block field value into its block instances.
pub(crate) fn expand<'a>(
    node: &'a Node,
    classification: Classification,
    path: &str,
) -> Result<Vec<BlockInstance<'a>>> {
    match (classification, node) {
        (Classification::SingleBlock, Node::Struct(item)) => Ok(vec![single(item)?]),
        (Classification::RepeatedList, Node::Seq(items)) => items
            .iter()
            .filter_map(|item| match item {
                Node::Struct(item) => Some(single(item)),
                _ => None,
            })
            .collect(),
        (Classification::RepeatedMap, Node::Map(entries)) => {
            let mut instances = Vec::with_capacity(entries.len());
            for (key, value) in sorted(entries) {
                let Node::Struct(item) = value else {
                    continue;
                };
                let schema = schema::schema_for(item)?;
                if schema.label_count() != 1 {
                    return Err(Error::schema(
                        path,
                        &format!(
                            "a mapping of blocks needs exactly one label field on {}, found {}",
                            item.name,
                            schema.label_count()
                        ),
                    ));
                }
                check_label_is_string(item, &schema)?;
                instances.push(BlockInstance {
                    labels: vec![key.clone()],
                    content: BlockContent::Struct(item),
                });
            }
            Ok(instances)
        }
        (Classification::MapBlock, Node::Map(entries)) => Ok(vec![BlockInstance {
            labels: Vec::new(),
            content: BlockContent::Entries(sorted(entries)),
        }]),
        (Classification::Skip, _) => Ok(Vec::new()),
        _ => Err(Error::type_mismatch(
            path,
            "block value",
            node.kind(),
        )),
    }
}

/// Collects the label sequence of a struct from its own label fields.
///
/// Absent `optional` labels are left out; any other non-string label is an error.
pub(crate) fn labels_of(node: &StructNode, schema: &Schema) -> Result<Vec<String>> {
    let mut labels = Vec::with_capacity(schema.label_count());
    for (index, (desc, (_, value))) in schema.fields().iter().zip(&node.fields).enumerate() {
        if desc.role != FieldRole::Label {
            continue;
        }
        match value {
            Node::Scalar(Value::String(s)) => labels.push(s.clone()),
            Node::Absent if desc.optional => {}
            other => {
                return Err(Error::type_mismatch(
                    &schema.path(index),
                    "string label",
                    other.kind(),
                ))
            }
        }
    }
    Ok(labels)
}

fn single(item: &StructNode) -> Result<BlockInstance<'_>> {
    let schema = schema::schema_for(item)?;
    Ok(BlockInstance {
        labels: labels_of(item, &schema)?,
        content: BlockContent::Struct(item),
    })
}

// The key supplies the label of a mapped block, so the label field itself may
// be left empty or absent, but it must not hold anything other than a string.
fn check_label_is_string(node: &StructNode, schema: &Schema) -> Result<()> {
    for (index, (desc, (_, value))) in schema.fields().iter().zip(&node.fields).enumerate() {
        if desc.role == FieldRole::Label
            && !matches!(value, Node::Scalar(Value::String(_)) | Node::Absent)
        {
            return Err(Error::type_mismatch(
                &schema.path(index),
                "string label",
                value.kind(),
            ));
        }
    }
    Ok(())
}

fn sorted(entries: &[(String, Node)]) -> Vec<&(String, Node)> {
    let mut sorted: Vec<_> = entries.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labeled(type_name: &'static str, tags: &[&'static str], label: &str) -> Node {
        let mut fields: Vec<(&'static str, Node)> = tags
            .iter()
            .map(|tag| (*tag, Node::Scalar(Value::from(label))))
            .collect();
        fields.push(("prop,optional", Node::Scalar(Value::from("v"))));
        Node::Struct(StructNode {
            name: type_name,
            fields,
        })
    }

    fn labels(instances: &[BlockInstance<'_>]) -> Vec<Vec<String>> {
        instances.iter().map(|i| i.labels.clone()).collect()
    }

    #[test]
    fn test_list_keeps_order_and_skips_absent() {
        let node = Node::Seq(vec![
            labeled("ExpandSvc", &["name,label"], "web"),
            Node::Absent,
            labeled("ExpandSvc", &["name,label"], "worker"),
        ]);

        let instances = expand(&node, Classification::RepeatedList, "T.service").unwrap();
        assert_eq!(labels(&instances), vec![vec!["web"], vec!["worker"]]);
    }

    #[test]
    fn test_map_sorted_by_key_with_key_label() {
        let node = Node::Map(vec![
            ("zulu".into(), labeled("ExpandChild", &["name,label"], "ignored")),
            ("alpha".into(), labeled("ExpandChild", &["name,label"], "ignored")),
        ]);

        let instances = expand(&node, Classification::RepeatedMap, "T.child").unwrap();
        assert_eq!(labels(&instances), vec![vec!["alpha"], vec!["zulu"]]);
    }

    #[test]
    fn test_map_requires_exactly_one_label() {
        let two = Node::Map(vec![(
            "k".into(),
            labeled("ExpandTwo", &["a,label", "b,label"], "x"),
        )]);
        let err = expand(&two, Classification::RepeatedMap, "T.child").unwrap_err();
        assert!(err.is_schema());

        let none = Node::Map(vec![("k".into(), labeled("ExpandNone", &[], "x"))]);
        let err = expand(&none, Classification::RepeatedMap, "T.child").unwrap_err();
        assert!(err.to_string().contains("found 0"));
    }

    #[test]
    fn test_non_string_label() {
        let node = Node::Struct(StructNode {
            name: "ExpandNum",
            fields: vec![("id,label", Node::Scalar(Value::from(7)))],
        });
        let err = expand(&node, Classification::SingleBlock, "T.item").unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { ref path, .. } if path == "ExpandNum.id"));
    }

    #[test]
    fn test_optional_absent_label_is_omitted() {
        let node = Node::Struct(StructNode {
            name: "ExpandOpt",
            fields: vec![
                ("kind,label", Node::Scalar(Value::from("a"))),
                ("alias,label,optional", Node::Absent),
            ],
        });
        let instances = expand(&node, Classification::SingleBlock, "T.item").unwrap();
        assert_eq!(labels(&instances), vec![vec!["a"]]);
    }

    #[test]
    fn test_map_block_entries_sorted() {
        let node = Node::Map(vec![
            ("image".into(), Node::Scalar(Value::from("busybox"))),
            ("cmd".into(), Node::Seq(vec![Node::Scalar(Value::from("/bin/ls"))])),
        ]);
        let instances = expand(&node, Classification::MapBlock, "T.config").unwrap();
        assert_eq!(instances.len(), 1);
        match &instances[0].content {
            BlockContent::Entries(entries) => {
                let keys: Vec<_> = entries.iter().map(|(k, _)| k.as_str()).collect();
                assert_eq!(keys, ["cmd", "image"]);
            }
            BlockContent::Struct(_) => panic!("Expected entries"),
        }
    }
}
