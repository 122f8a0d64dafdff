use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::error::{ActionError, Result};

pub const OPER_INDEX: &str = "index";
pub const OPER_CREATE: &str = "create";
pub const OPER_UPDATE: &str = "update";
pub const OPER_DELETE: &str = "delete";

/// Verb of a bulk action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Index,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Index,
        Operation::Create,
        Operation::Update,
        Operation::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Index => OPER_INDEX,
            Operation::Create => OPER_CREATE,
            Operation::Update => OPER_UPDATE,
            Operation::Delete => OPER_DELETE,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = ActionError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            OPER_INDEX => Ok(Operation::Index),
            OPER_CREATE => Ok(Operation::Create),
            OPER_UPDATE => Ok(Operation::Update),
            OPER_DELETE => Ok(Operation::Delete),
            other => Err(ActionError::UnknownOperation(other.to_string())),
        }
    }
}

/// One entry of a `_bulk` request.
///
/// Only the operation is mandatory. Index and type may instead come from the
/// request path, so every targeting field is optional and an absent field is
/// left out of the wire header entirely.
///
/// Values are immutable; use [`BulkAction::to_builder`] to derive a changed copy.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "BulkActionBuilder")]
pub struct BulkAction {
    operation: Operation,
    index: Option<String>,
    #[serde(rename = "type")]
    doc_type: Option<String>,
    id: Option<String>,
    parent: Option<String>,
    routing: Option<String>,
    source: Option<String>,
    version: Option<i64>,
    refresh: Option<bool>,
    wait_for_active_shards: Option<bool>,
}

impl BulkAction {
    pub fn builder() -> BulkActionBuilder {
        BulkActionBuilder::default()
    }

    pub fn to_builder(&self) -> BulkActionBuilder {
        BulkActionBuilder {
            operation: Some(self.operation),
            index: self.index.clone(),
            doc_type: self.doc_type.clone(),
            id: self.id.clone(),
            parent: self.parent.clone(),
            routing: self.routing.clone(),
            source: self.source.clone(),
            version: self.version,
            refresh: self.refresh,
            wait_for_active_shards: self.wait_for_active_shards,
        }
    }

    pub fn get_operation(&self) -> Operation {
        self.operation
    }
    pub fn get_index(&self) -> Option<&str> {
        self.index.as_deref()
    }
    pub fn get_type(&self) -> Option<&str> {
        self.doc_type.as_deref()
    }
    pub fn get_id(&self) -> Option<&str> {
        self.id.as_deref()
    }
    pub fn get_parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }
    pub fn get_routing(&self) -> Option<&str> {
        self.routing.as_deref()
    }
    pub fn get_source(&self) -> Option<&str> {
        self.source.as_deref()
    }
    pub fn get_version(&self) -> Option<i64> {
        self.version
    }
    pub fn get_refresh(&self) -> Option<bool> {
        self.refresh
    }
    pub fn get_wait_for_active_shards(&self) -> Option<bool> {
        self.wait_for_active_shards
    }
    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// Returns true when `source` holds a raw line break, which would split the
    /// body over several lines of the newline-delimited request.
    ///
    /// Encoding never checks this; callers that accept `source` text from
    /// elsewhere can use it to reject or repair such actions up front.
    pub fn source_breaks_framing(&self) -> bool {
        match &self.source {
            Some(source) => source.contains(['\n', '\r']),
            None => false,
        }
    }
}

/// Collects the attributes of a [`BulkAction`].
///
/// Setters may be called in any order; calling one twice keeps the last value.
/// `build` checks only that an operation was given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BulkActionBuilder {
    operation: Option<Operation>,
    index: Option<String>,
    #[serde(rename = "type")]
    doc_type: Option<String>,
    id: Option<String>,
    parent: Option<String>,
    routing: Option<String>,
    source: Option<String>,
    version: Option<i64>,
    refresh: Option<bool>,
    wait_for_active_shards: Option<bool>,
}

impl BulkActionBuilder {
    pub fn operation(mut self, operation: Operation) -> Self {
        self.operation = Some(operation);
        self
    }
    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }
    pub fn doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = Some(doc_type.into());
        self
    }
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }
    pub fn routing(mut self, routing: impl Into<String>) -> Self {
        self.routing = Some(routing.into());
        self
    }

    /// Sets the document body. The text is sent verbatim, so it must already be
    /// serialized JSON on a single line.
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the document body from a JSON value, serialized compactly.
    pub fn source_value(mut self, value: &serde_json::Value) -> Self {
        // Value keys are always strings, serialization cannot fail.
        self.source = Some(value.to_string());
        self
    }

    pub fn version(mut self, version: i64) -> Self {
        self.version = Some(version);
        self
    }
    pub fn refresh(mut self, refresh: bool) -> Self {
        self.refresh = Some(refresh);
        self
    }
    pub fn wait_for_active_shards(mut self, wait: bool) -> Self {
        self.wait_for_active_shards = Some(wait);
        self
    }

    pub fn has_index(&self) -> bool {
        self.index.is_some()
    }
    pub fn has_type(&self) -> bool {
        self.doc_type.is_some()
    }

    pub fn build(self) -> Result<BulkAction> {
        let operation = self
            .operation
            .ok_or(ActionError::MissingRequiredField("operation"))?;

        Ok(BulkAction {
            operation,
            index: self.index,
            doc_type: self.doc_type,
            id: self.id,
            parent: self.parent,
            routing: self.routing,
            source: self.source,
            version: self.version,
            refresh: self.refresh,
            wait_for_active_shards: self.wait_for_active_shards,
        })
    }
}

impl TryFrom<BulkActionBuilder> for BulkAction {
    type Error = ActionError;

    fn try_from(builder: BulkActionBuilder) -> Result<Self> {
        builder.build()
    }
}
