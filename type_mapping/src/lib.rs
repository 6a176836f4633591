//! Unified value model shared by the glider crates.
//! Bound parameters and materialized row cells both use [`Value`]; the
//! binding layer narrows values to a [`WireType`] before they reach a backend.

pub mod serialize;
pub mod types;
pub mod wire;

pub use serialize::{serialize_to_fields, value_from_json, value_to_json, values_to_json_object};
pub use types::Value;
pub use wire::WireType;
