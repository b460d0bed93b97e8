//! List-request display helpers
//!
//! [`DisplaySpec`] is a ready-made body type for list endpoints that take
//! client-driven filtering and sorting, typically bound through
//! `Relay::handle_body` or `Relay::paged_body`. The filter block is a free
//! JSON map; typed accessors pull individual keys out of it.
//!
//! # Example
//!
//! ```rust
//! use axum_relay::request::{DisplaySpec, Orderable};
//! use serde_json::json;
//!
//! let spec: DisplaySpec = serde_json::from_value(json!({
//!     "filter": {"color": "red", "in_stock": true},
//!     "sort": {"by": "price", "order": "desc"},
//! }))
//! .unwrap();
//!
//! assert_eq!(spec.filter_str("color").unwrap(), "red");
//! assert_eq!(spec.order(), "desc");
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Filter accessor failures
///
/// Carries no detail beyond the kind so services can register envelope
/// codes against the values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DisplayError {
    /// The requested key is not present in the filter map
    #[error("missing filter key")]
    MissingKey,
    /// The key is present but its value has another JSON type
    #[error("invalid filter type")]
    InvalidType,
}

/// Sort request of a list endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sorter {
    /// Field to sort by
    #[serde(default)]
    pub by: String,
    /// Sort direction, service-defined
    #[serde(default)]
    pub order: String,
}

/// Filtering and sorting request body for list endpoints
///
/// Wire shape: `{"filter": {...}, "sort": {"by": "...", "order": "..."}}`,
/// both blocks optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplaySpec {
    /// Free-form filter map, keys are service-defined
    #[serde(default)]
    pub filter: Map<String, Value>,
    /// Requested ordering
    #[serde(default, rename = "sort")]
    pub sorter: Sorter,
}

impl DisplaySpec {
    /// String value of a filter key
    pub fn filter_str(&self, key: &str) -> Result<&str, DisplayError> {
        let value = self.filter.get(key).ok_or(DisplayError::MissingKey)?;
        value.as_str().ok_or(DisplayError::InvalidType)
    }

    /// Numeric value of a filter key
    pub fn filter_num(&self, key: &str) -> Result<f64, DisplayError> {
        let value = self.filter.get(key).ok_or(DisplayError::MissingKey)?;
        value.as_f64().ok_or(DisplayError::InvalidType)
    }

    /// Boolean value of a filter key
    pub fn filter_bool(&self, key: &str) -> Result<bool, DisplayError> {
        let value = self.filter.get(key).ok_or(DisplayError::MissingKey)?;
        value.as_bool().ok_or(DisplayError::InvalidType)
    }

    /// Decode a filter key into a typed value
    pub fn filter_as<T: DeserializeOwned>(&self, key: &str) -> Result<T, DisplayError> {
        let value = self.filter.get(key).ok_or(DisplayError::MissingKey)?;
        serde_json::from_value(value.clone()).map_err(|_| DisplayError::InvalidType)
    }
}

/// Access to the sort order of a request body
///
/// Lets filters and handlers normalize or default the ordering without
/// knowing the concrete body type.
pub trait Orderable {
    /// Requested sort direction
    fn order(&self) -> &str;

    /// Replace the sort direction
    fn set_order(&mut self, order: String);
}

impl Orderable for DisplaySpec {
    fn order(&self) -> &str {
        &self.sorter.order
    }

    fn set_order(&mut self, order: String) {
        self.sorter.order = order;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec() -> DisplaySpec {
        serde_json::from_value(json!({
            "filter": {
                "color": "red",
                "price": 9.5,
                "count": 3,
                "in_stock": true,
                "dims": {"w": 4, "h": 2},
            },
            "sort": {"by": "price", "order": "desc"},
        }))
        .unwrap()
    }

    #[test]
    fn test_deserialize_defaults_when_blocks_absent() {
        let spec: DisplaySpec = serde_json::from_value(json!({})).unwrap();
        assert!(spec.filter.is_empty());
        assert_eq!(spec.sorter, Sorter::default());
    }

    #[test]
    fn test_filter_str() {
        let spec = spec();
        assert_eq!(spec.filter_str("color").unwrap(), "red");
        assert_eq!(spec.filter_str("size").unwrap_err(), DisplayError::MissingKey);
        assert_eq!(
            spec.filter_str("in_stock").unwrap_err(),
            DisplayError::InvalidType
        );
    }

    #[test]
    fn test_filter_num_accepts_integers_and_floats() {
        let spec = spec();
        assert_eq!(spec.filter_num("price").unwrap(), 9.5);
        assert_eq!(spec.filter_num("count").unwrap(), 3.0);
        assert_eq!(
            spec.filter_num("color").unwrap_err(),
            DisplayError::InvalidType
        );
    }

    #[test]
    fn test_filter_bool() {
        let spec = spec();
        assert!(spec.filter_bool("in_stock").unwrap());
        assert_eq!(
            spec.filter_bool("missing").unwrap_err(),
            DisplayError::MissingKey
        );
    }

    #[test]
    fn test_filter_as_decodes_nested_object() {
        #[derive(Debug, PartialEq, Deserialize)]
        struct Dims {
            w: u32,
            h: u32,
        }

        let spec = spec();
        assert_eq!(spec.filter_as::<Dims>("dims").unwrap(), Dims { w: 4, h: 2 });
        assert_eq!(
            spec.filter_as::<Dims>("color").unwrap_err(),
            DisplayError::InvalidType
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(DisplayError::MissingKey.to_string(), "missing filter key");
        assert_eq!(DisplayError::InvalidType.to_string(), "invalid filter type");
    }

    #[test]
    fn test_orderable_get_and_set() {
        let mut spec = spec();
        assert_eq!(spec.order(), "desc");
        spec.set_order("asc".to_string());
        assert_eq!(spec.sorter.order, "asc");
    }
}
