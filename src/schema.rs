//! Per-type field schemas and their process-wide cache.
//!
//! A [`Schema`] is the list of field descriptors of one struct type, validated
//! as a whole. It is a pure function of the struct's serde name and field tags,
//! so it is built once per type and shared by every encode afterwards. Entries
//! are never invalidated.

use crate::ser::StructNode;
use crate::tag::{self, FieldDescriptor, FieldRole};
use crate::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

/// The validated field descriptors of one struct type, in declaration order.
///
/// # Examples
///
/// ```rust
/// use serde_blocks::{FieldRole, Schema};
///
/// let schema = Schema::parse("Service", &["name,label", "executable"]).unwrap();
/// assert_eq!(schema.label_count(), 1);
/// assert_eq!(schema.fields()[1].role, FieldRole::Attribute);
///
/// let err = Schema::parse("Service", &["executable", "name,label"]).unwrap_err();
/// assert!(err.is_schema());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Schema {
    type_name: String,
    fields: Vec<FieldDescriptor>,
    label_count: usize,
    remainder: Option<usize>,
}

impl Schema {
    /// Parses and validates the tags of a struct type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] when a tag is malformed, when a label follows an
    /// attribute, block or remainder field, when an attribute follows a block or
    /// remainder field, when there is more than one remainder field, or when two
    /// attribute/block fields share a target name.
    pub fn parse(type_name: &str, tags: &[&str]) -> Result<Self> {
        let mut fields = Vec::with_capacity(tags.len());
        let mut names = HashSet::new();
        let mut label_count = 0;
        let mut remainder = None;
        let mut seen_attribute = false;
        let mut seen_block = false;

        for (index, raw) in tags.iter().enumerate() {
            let path = field_path(type_name, raw);
            let desc = tag::parse_field(raw, &path)?;
            match desc.role {
                FieldRole::Label => {
                    if seen_attribute || seen_block {
                        return Err(Error::schema(
                            &path,
                            "labels must precede attributes and blocks",
                        ));
                    }
                    label_count += 1;
                }
                FieldRole::Attribute => {
                    if seen_block {
                        return Err(Error::schema(&path, "attributes must precede blocks"));
                    }
                    seen_attribute = true;
                }
                FieldRole::Block => seen_block = true,
                FieldRole::Remainder => {
                    if remainder.is_some() {
                        return Err(Error::schema(&path, "more than one `remain` field"));
                    }
                    remainder = Some(index);
                    seen_block = true;
                }
            }
            if matches!(desc.role, FieldRole::Attribute | FieldRole::Block)
                && !names.insert(desc.name.clone())
            {
                return Err(Error::schema(
                    &path,
                    &format!("duplicate target name {:?}", desc.name),
                ));
            }
            fields.push(desc);
        }

        Ok(Schema {
            type_name: type_name.to_string(),
            fields,
            label_count,
            remainder,
        })
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Number of `label` fields.
    #[must_use]
    pub fn label_count(&self) -> usize {
        self.label_count
    }

    /// The remainder field, if the type has one.
    #[must_use]
    pub fn remainder(&self) -> Option<&FieldDescriptor> {
        self.remainder.map(|index| &self.fields[index])
    }

    /// Returns `true` if an attribute or block field targets `name`.
    #[must_use]
    pub fn defines(&self, name: &str) -> bool {
        self.fields.iter().any(|desc| {
            matches!(desc.role, FieldRole::Attribute | FieldRole::Block) && desc.name == name
        })
    }

    /// `Type.field` path of the field at `index`, for error messages.
    pub(crate) fn path(&self, index: usize) -> String {
        let desc = &self.fields[index];
        let name = if desc.name.is_empty() {
            "<remain>"
        } else {
            desc.name.as_str()
        };
        format!("{}.{}", self.type_name, name)
    }
}

fn field_path(type_name: &str, raw: &str) -> String {
    let name = tag::target_name(raw);
    if name.is_empty() {
        format!("{}.<remain>", type_name)
    } else {
        format!("{}.{}", type_name, name)
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct SchemaKey {
    type_name: &'static str,
    tags: Vec<&'static str>,
}

type SchemaCache = RwLock<HashMap<SchemaKey, Arc<Schema>>>;

static CACHE: OnceLock<SchemaCache> = OnceLock::new();

fn cache() -> &'static SchemaCache {
    CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Returns the schema of a captured struct, building and caching it on first use.
///
/// Failed schemas are not cached; they fail again on every use.
pub(crate) fn schema_for(node: &StructNode) -> Result<Arc<Schema>> {
    let key = SchemaKey {
        type_name: node.name,
        tags: node.tags(),
    };

    if let Some(schema) = cache()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
    {
        return Ok(Arc::clone(schema));
    }

    let schema = Arc::new(Schema::parse(key.type_name, &key.tags)?);
    log::debug!(
        "cached schema for {} ({} fields)",
        key.type_name,
        schema.fields.len()
    );
    let mut entries = cache().write().unwrap_or_else(PoisonError::into_inner);
    // Another thread may have built the same schema meanwhile; keep the first.
    Ok(Arc::clone(entries.entry(key).or_insert(schema)))
}
