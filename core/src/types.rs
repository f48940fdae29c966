//! Wire DTOs for the vehicle backend and the brand lookup service.
//!
//! # Design
//! Field names follow the backend's JSON: the identifier travels as `_id`
//! and the remaining fields are camelCase. The identifier is assigned by the
//! backend on creation, so it is optional and omitted from outgoing payloads
//! while absent.

use serde::{Deserialize, Serialize};

use crate::http::HttpMethod;

/// A vehicle record as exchanged with the `/cars` endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub brand: String,
    #[serde(default)]
    pub gas_type: i32,
    #[serde(default)]
    pub price: f64,
}

impl Car {
    pub fn new(name: impl Into<String>, brand: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            brand: brand.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// A brand entry returned by the FIPE lookup service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Brand {
    pub fipe_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

/// The mutating operations that share one request-building routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestOperation {
    Save,
    Update,
    Delete,
}

impl RestOperation {
    pub fn method(self) -> HttpMethod {
        match self {
            RestOperation::Save => HttpMethod::Post,
            RestOperation::Update => HttpMethod::Put,
            RestOperation::Delete => HttpMethod::Delete,
        }
    }
}
