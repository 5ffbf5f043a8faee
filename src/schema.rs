//! Document schemas: which front-matter fields each document type accepts.
//!
//! | Type    | Location         | Required                                        | Optional        |
//! |---------|------------------|-------------------------------------------------|-----------------|
//! | Blog    | `blog/*.mdx`     | `title`, `publishedAt`, `summary`               | `image`, `tags` |
//! | Project | `project/*.mdx`  | `title`, `publishedAt`, `summary`, `image`, `tag` |               |
//!
//! Required string fields must be present and non-empty. Optional fields may
//! be absent or null. Unknown fields are tolerated (logged at `warn`) so
//! authors can keep editor-specific keys in their front matter.
//!
//! Validation runs against the raw YAML mapping before typed deserialization,
//! which lets errors name the offending field instead of surfacing a generic
//! serde message.

use crate::types::{DocumentFields, DocumentKind};
use serde_yaml::{Mapping, Value};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("{kind}: missing required field `{field}`")]
    MissingField {
        kind: DocumentKind,
        field: &'static str,
    },
    #[error("{kind}: required field `{field}` must not be empty")]
    EmptyField {
        kind: DocumentKind,
        field: &'static str,
    },
    #[error("{kind}: field `{field}` must be {expected}")]
    WrongType {
        kind: DocumentKind,
        field: &'static str,
        expected: &'static str,
    },
    #[error("{kind}: {source}")]
    Deserialize {
        kind: DocumentKind,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Type of a front-matter field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    /// A list whose items are all strings.
    StringList,
}

impl FieldType {
    fn describe(self) -> &'static str {
        match self {
            FieldType::String => "a string",
            FieldType::StringList => "a list of strings",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::StringList => value
                .as_sequence()
                .is_some_and(|items| items.iter().all(Value::is_string)),
        }
    }
}

/// A recognised front-matter field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub field_type: FieldType,
    pub required: bool,
}

const fn required(name: &'static str) -> FieldDef {
    FieldDef {
        name,
        field_type: FieldType::String,
        required: true,
    }
}

const fn optional(name: &'static str, field_type: FieldType) -> FieldDef {
    FieldDef {
        name,
        field_type,
        required: false,
    }
}

/// Schema of one document type.
#[derive(Debug, Clone, Copy)]
pub struct DocumentType {
    pub kind: DocumentKind,
    pub fields: &'static [FieldDef],
}

pub const BLOG: DocumentType = DocumentType {
    kind: DocumentKind::Blog,
    fields: &[
        required("title"),
        required("publishedAt"),
        required("summary"),
        optional("image", FieldType::String),
        optional("tags", FieldType::StringList),
    ],
};

pub const PROJECT: DocumentType = DocumentType {
    kind: DocumentKind::Project,
    fields: &[
        required("title"),
        required("publishedAt"),
        required("summary"),
        required("image"),
        required("tag"),
    ],
};

/// All document types, in the order they are scanned.
pub const DOCUMENT_TYPES: &[DocumentType] = &[BLOG, PROJECT];

/// Look up the schema for a document kind.
pub fn document_type(kind: DocumentKind) -> &'static DocumentType {
    match kind {
        DocumentKind::Blog => &BLOG,
        DocumentKind::Project => &PROJECT,
    }
}

impl DocumentType {
    /// Check a raw front-matter mapping against this schema.
    pub fn validate(&self, front_matter: &Mapping) -> Result<(), SchemaError> {
        for def in self.fields {
            let value = front_matter.get(def.name).filter(|v| !v.is_null());
            match value {
                None if def.required => {
                    return Err(SchemaError::MissingField {
                        kind: self.kind,
                        field: def.name,
                    });
                }
                None => {}
                Some(v) if !def.field_type.accepts(v) => {
                    return Err(SchemaError::WrongType {
                        kind: self.kind,
                        field: def.name,
                        expected: def.field_type.describe(),
                    });
                }
                Some(v) => {
                    if def.required && v.as_str().is_some_and(|s| s.trim().is_empty()) {
                        return Err(SchemaError::EmptyField {
                            kind: self.kind,
                            field: def.name,
                        });
                    }
                }
            }
        }

        for key in front_matter.keys() {
            let known = key
                .as_str()
                .is_some_and(|k| self.fields.iter().any(|def| def.name == k));
            if !known {
                warn!(kind = %self.kind, field = ?key, "ignoring unknown front-matter field");
            }
        }
        Ok(())
    }

    /// Validate, then deserialize into the typed field struct.
    ///
    /// Null optional values are dropped first so they deserialize as absent.
    pub fn resolve<F: DocumentFields>(&self, front_matter: &Mapping) -> Result<F, SchemaError> {
        debug_assert_eq!(self.kind, F::KIND);
        self.validate(front_matter)?;
        let cleaned: Mapping = front_matter
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        serde_yaml::from_value(Value::Mapping(cleaned)).map_err(|source| {
            SchemaError::Deserialize {
                kind: self.kind,
                source,
            }
        })
    }
}
