//! Wire encoding of a single bulk action.
//!
//! Each action becomes a header line naming the operation and its metadata,
//! followed by the document source when one is set:
//!
//! ```text
//! {"index":{"_index":"docs","_id":"1"}}
//! {"a":1}
//! ```

use std::io::{self, Write};

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_with::skip_serializing_none;

use crate::models::bulk::{BulkAction, Operation};

/// Metadata object nested under the operation key. Field order is the wire order.
#[skip_serializing_none]
#[derive(Debug, Serialize)]
struct HeaderMeta<'a> {
    #[serde(rename = "_index")]
    index: Option<&'a str>,
    #[serde(rename = "_type")]
    doc_type: Option<&'a str>,
    #[serde(rename = "_id")]
    id: Option<&'a str>,
    #[serde(rename = "_parent")]
    parent: Option<&'a str>,
    #[serde(rename = "_routing")]
    routing: Option<&'a str>,
    #[serde(rename = "_version")]
    version: Option<i64>,
    refresh: Option<bool>,
    wait_for_active_shards: Option<bool>,
}

#[derive(Debug)]
struct Header<'a> {
    operation: Operation,
    meta: HeaderMeta<'a>,
}

impl Serialize for Header<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.operation.as_str(), &self.meta)?;
        map.end()
    }
}

impl<'a> From<&'a BulkAction> for Header<'a> {
    fn from(action: &'a BulkAction) -> Self {
        Self {
            operation: action.get_operation(),
            meta: HeaderMeta {
                index: action.get_index(),
                doc_type: action.get_type(),
                id: action.get_id(),
                parent: action.get_parent(),
                routing: action.get_routing(),
                version: action.get_version(),
                refresh: action.get_refresh(),
                wait_for_active_shards: action.get_wait_for_active_shards(),
            },
        }
    }
}

/// The lines of one encoded action, without trailing newlines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAction {
    header: String,
    body: Option<String>,
}

impl EncodedAction {
    pub fn get_header(&self) -> &str {
        &self.header
    }
    pub fn get_body(&self) -> Option<&str> {
        self.body.as_deref()
    }
    pub fn line_count(&self) -> usize {
        if self.body.is_some() {
            2
        } else {
            1
        }
    }

    /// Number of bytes `write_to` produces, newlines included.
    pub fn len_bytes(&self) -> usize {
        self.header.len() + 1 + self.body.as_ref().map_or(0, |body| body.len() + 1)
    }

    /// Writes the record with every line newline-terminated.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(self.header.as_bytes())?;
        out.write_all(b"\n")?;
        if let Some(body) = &self.body {
            out.write_all(body.as_bytes())?;
            out.write_all(b"\n")?;
        }
        Ok(())
    }

    pub fn to_ndjson(&self) -> String {
        let mut text = String::with_capacity(self.len_bytes());
        self.push_to(&mut text);
        text
    }

    pub(crate) fn push_to(&self, text: &mut String) {
        text.push_str(&self.header);
        text.push('\n');
        if let Some(body) = &self.body {
            text.push_str(body);
            text.push('\n');
        }
    }
}

/// Encodes an action into its header line and optional body line.
///
/// Any combination of fields is accepted. `source` is copied verbatim and is
/// expected to be single-line JSON; a raw newline in it corrupts the framing of
/// the whole request (see [`BulkAction::source_breaks_framing`]).
pub fn encode(action: &BulkAction) -> EncodedAction {
    let header = serde_json::to_string(&Header::from(action))
        .expect("bulk header holds only strings, integers and booleans");

    EncodedAction {
        header,
        body: action.get_source().map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::bulk::BulkActionBuilder;
    use serde_json::{json, Value};

    fn header_value(action: &BulkAction) -> Value {
        serde_json::from_str(encode(action).get_header()).unwrap()
    }

    #[test]
    fn operation_only_has_empty_metadata() {
        for operation in Operation::ALL {
            let action = BulkAction::builder().operation(operation).build().unwrap();
            let encoded = encode(&action);
            assert_eq!(
                encoded.get_header(),
                format!(r#"{{"{}":{{}}}}"#, operation.as_str())
            );
            assert_eq!(encoded.get_body(), None);
            assert_eq!(encoded.line_count(), 1);
        }
    }

    #[test]
    fn delete_with_index_and_id() {
        let action = BulkAction::builder()
            .operation(Operation::Delete)
            .id("42")
            .index("docs")
            .build()
            .unwrap();
        let encoded = encode(&action);
        assert_eq!(encoded.get_header(), r#"{"delete":{"_index":"docs","_id":"42"}}"#);
        assert_eq!(encoded.get_body(), None);
    }

    #[test]
    fn index_with_source_body() {
        let action = BulkAction::builder()
            .operation(Operation::Index)
            .index("docs")
            .id("1")
            .source(r#"{"a":1}"#)
            .build()
            .unwrap();
        let encoded = encode(&action);
        assert_eq!(encoded.get_header(), r#"{"index":{"_index":"docs","_id":"1"}}"#);
        assert_eq!(encoded.get_body(), Some(r#"{"a":1}"#));
        assert_eq!(
            encoded.to_ndjson(),
            "{\"index\":{\"_index\":\"docs\",\"_id\":\"1\"}}\n{\"a\":1}\n"
        );
    }

    #[test]
    fn all_fields_in_wire_order() {
        let action = BulkAction::builder()
            .wait_for_active_shards(true)
            .refresh(false)
            .version(3)
            .routing("r")
            .parent("p")
            .id("1")
            .doc_type("doc")
            .index("docs")
            .operation(Operation::Update)
            .source(r#"{"doc":{"a":1}}"#)
            .build()
            .unwrap();
        assert_eq!(
            encode(&action).get_header(),
            concat!(
                r#"{"update":{"_index":"docs","_type":"doc","_id":"1","_parent":"p","#,
                r#""_routing":"r","_version":3,"refresh":false,"wait_for_active_shards":true}}"#
            )
        );
    }

    #[test]
    fn unset_fields_never_appear() {
        let keys = [
            "_index",
            "_type",
            "_id",
            "_parent",
            "_routing",
            "_version",
            "refresh",
            "wait_for_active_shards",
        ];
        let setters: [fn(BulkActionBuilder) -> BulkActionBuilder; 8] = [
            |b| b.index("i"),
            |b| b.doc_type("t"),
            |b| b.id("d"),
            |b| b.parent("p"),
            |b| b.routing("r"),
            |b| b.version(1),
            |b| b.refresh(true),
            |b| b.wait_for_active_shards(true),
        ];

        // Every subset of the eight optional fields.
        for mask in 0u32..(1 << setters.len()) {
            let mut builder = BulkAction::builder().operation(Operation::Index);
            for (bit, setter) in setters.iter().enumerate() {
                if mask & (1 << bit) != 0 {
                    builder = setter(builder);
                }
            }
            let action = builder.build().unwrap();
            let header = encode(&action);
            let header = header.get_header();
            assert!(!header.contains("null"), "null in {header}");

            let value: Value = serde_json::from_str(header).unwrap();
            let meta = value["index"].as_object().unwrap();
            for (bit, key) in keys.iter().enumerate() {
                assert_eq!(meta.contains_key(*key), mask & (1 << bit) != 0, "{key} in {header}");
            }
        }
    }

    #[test]
    fn metadata_keeps_native_types() {
        let action = BulkAction::builder()
            .operation(Operation::Create)
            .index("docs")
            .doc_type("doc")
            .id("7")
            .parent("p7")
            .routing("shard-a")
            .version(12)
            .refresh(true)
            .wait_for_active_shards(false)
            .build()
            .unwrap();
        assert_eq!(
            header_value(&action),
            json!({ "create": {
                "_index": "docs",
                "_type": "doc",
                "_id": "7",
                "_parent": "p7",
                "_routing": "shard-a",
                "_version": 12,
                "refresh": true,
                "wait_for_active_shards": false,
            }})
        );
    }

    #[test]
    fn encoding_is_idempotent() {
        let action = BulkAction::builder()
            .operation(Operation::Index)
            .index("docs")
            .version(1)
            .source(r#"{"b":[1,2]}"#)
            .build()
            .unwrap();
        assert_eq!(encode(&action), encode(&action));
        assert_eq!(encode(&action).to_ndjson(), encode(&action).to_ndjson());
    }

    #[test]
    fn equal_actions_encode_identically() {
        let build = || {
            BulkAction::builder()
                .operation(Operation::Update)
                .id("x")
                .routing("y")
                .build()
                .unwrap()
        };
        assert_eq!(build(), build());
        assert_eq!(encode(&build()), encode(&build()));
    }

    #[test]
    fn source_is_passed_through_untouched() {
        let action = BulkAction::builder()
            .operation(Operation::Delete)
            .source("not json {")
            .build()
            .unwrap();
        let encoded = encode(&action);
        assert_eq!(encoded.get_header(), r#"{"delete":{}}"#);
        assert_eq!(encoded.get_body(), Some("not json {"));
    }

    #[test]
    fn strings_are_json_escaped_in_header() {
        let action = BulkAction::builder()
            .operation(Operation::Index)
            .id("a\"b\nc")
            .build()
            .unwrap();
        let encoded = encode(&action);
        assert!(!encoded.get_header().contains('\n'));
        assert_eq!(header_value(&action)["index"]["_id"], "a\"b\nc");
    }

    #[test]
    fn write_to_matches_to_ndjson() {
        let action = BulkAction::builder()
            .operation(Operation::Index)
            .source("{}")
            .build()
            .unwrap();
        let encoded = encode(&action);
        let mut out = Vec::new();
        encoded.write_to(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), encoded.to_ndjson());
        assert_eq!(encoded.len_bytes(), encoded.to_ndjson().len());
    }

    #[test]
    fn concurrent_encoding_is_byte_identical() {
        let action = BulkAction::builder()
            .operation(Operation::Index)
            .index("docs")
            .source(r#"{"a":1}"#)
            .build()
            .unwrap();
        let expected = encode(&action).to_ndjson();
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| encode(&action).to_ndjson()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }
}
