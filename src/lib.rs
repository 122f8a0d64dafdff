//! Bulk actions for the Elasticsearch `_bulk` API and their newline-delimited
//! wire encoding.
//!
//! A [`BulkAction`] is built once through [`BulkAction::builder`], then turned
//! into its header/body lines with [`encode`]. [`BulkPayload`] concatenates
//! encoded actions into a request body a transport can send as-is.

pub mod encoder;
pub mod error;
pub mod models;
pub mod payload;

pub use encoder::{encode, EncodedAction};
pub use error::ActionError;
pub use models::bulk::{BulkAction, BulkActionBuilder, Operation};
pub use payload::BulkPayload;
