use tracing::trace;

use crate::encoder::{encode, EncodedAction};
use crate::models::bulk::BulkAction;

pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// Request body for the `_bulk` endpoint.
///
/// Records are appended in push order and every line, the last one included,
/// ends with `\n`. Deciding when to flush and sending the body are left to
/// the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkPayload {
    body: String,
    actions: usize,
}

impl BulkPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            body: String::with_capacity(bytes),
            actions: 0,
        }
    }

    pub fn content_type() -> &'static str {
        NDJSON_CONTENT_TYPE
    }

    pub fn push(&mut self, action: &BulkAction) {
        self.push_encoded(&encode(action));
    }

    pub fn push_encoded(&mut self, encoded: &EncodedAction) {
        encoded.push_to(&mut self.body);
        self.actions += 1;
        trace!(
            lines = encoded.line_count(),
            bytes = self.body.len(),
            "bulk record appended"
        );
    }

    pub fn action_count(&self) -> usize {
        self.actions
    }
    pub fn len_bytes(&self) -> usize {
        self.body.len()
    }
    pub fn is_empty(&self) -> bool {
        self.actions == 0
    }
    pub fn as_str(&self) -> &str {
        &self.body
    }
    pub fn into_string(self) -> String {
        self.body
    }

    pub fn clear(&mut self) {
        self.body.clear();
        self.actions = 0;
    }
}

impl<'a> Extend<&'a BulkAction> for BulkPayload {
    fn extend<I: IntoIterator<Item = &'a BulkAction>>(&mut self, iter: I) {
        for action in iter {
            self.push(action);
        }
    }
}

impl<'a> FromIterator<&'a BulkAction> for BulkPayload {
    fn from_iter<I: IntoIterator<Item = &'a BulkAction>>(iter: I) -> Self {
        let mut payload = BulkPayload::new();
        payload.extend(iter);
        payload
    }
}
