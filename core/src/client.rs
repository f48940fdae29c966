//! Stateless HTTP request builder and response parser for the vehicle API.
//!
//! # Design
//! `CarsClient` holds only the two endpoint URLs and the session content
//! type. Every operation is split into a `build_*` method producing an
//! `HttpRequest` and a `parse_*` method consuming an `HttpResponse`; the
//! round-trip itself belongs to a `Transport` or to the native host.
//!
//! Save, update and delete share `build_apply` / `parse_apply`, which differ
//! only in the verb chosen by `RestOperation`.

use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::CarError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Brand, Car, RestOperation};

#[derive(Debug, Clone)]
pub struct CarsClient {
    base_url: String,
    brands_url: String,
    content_type: String,
}

impl CarsClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            brands_url: config.brands_url.clone(),
            content_type: config.content_type.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list_cars(&self) -> Result<HttpRequest, CarError> {
        let path = validate_url(&self.base_url)?;
        Ok(self.request(HttpMethod::Get, path, None))
    }

    pub fn build_list_brands(&self) -> Result<HttpRequest, CarError> {
        let path = validate_url(&self.brands_url)?;
        Ok(self.request(HttpMethod::Get, path, None))
    }

    /// Build the request for a save, update or delete of `car`.
    ///
    /// The target is `base/{id}`, or `base/` for a record without an id.
    /// The record is always encoded first; an encoding failure means no
    /// request is built.
    ///
    /// Delete requests deliberately carry no body, even though older
    /// clients of this backend sent the encoded record with them; the
    /// record is still encoded so a delete fails the same way a save would.
    pub fn build_apply(&self, car: &Car, operation: RestOperation) -> Result<HttpRequest, CarError> {
        let body = serde_json::to_string(car).map_err(|e| CarError::Serialization(e.to_string()))?;
        let path = validate_url(&format!(
            "{}/{}",
            self.base_url,
            car.id.as_deref().unwrap_or("")
        ))?;
        let body = match operation {
            RestOperation::Delete => None,
            RestOperation::Save | RestOperation::Update => Some(body),
        };
        Ok(self.request(operation.method(), path, body))
    }

    pub fn parse_list_cars(&self, response: HttpResponse) -> Result<Vec<Car>, CarError> {
        parse_list(response)
    }

    pub fn parse_list_brands(&self, response: HttpResponse) -> Result<Vec<Brand>, CarError> {
        parse_list(response)
    }

    /// Success only on exactly 200. Failures are logged and returned.
    pub fn parse_apply(&self, response: HttpResponse) -> Result<(), CarError> {
        if response.status == 200 {
            return Ok(());
        }
        let err = CarError::Status {
            code: response.status,
            body: response.body,
        };
        warn!(error = %err, "{}", err.message());
        Err(err)
    }

    fn request(&self, method: HttpMethod, path: String, body: Option<String>) -> HttpRequest {
        debug!(%method, %path, "Built request");
        HttpRequest {
            method,
            path,
            headers: vec![("content-type".to_string(), self.content_type.clone())],
            body,
        }
    }
}

fn validate_url(raw: &str) -> Result<String, CarError> {
    let url = Url::parse(raw).map_err(|e| CarError::Url(format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(raw.to_string()),
        other => Err(CarError::Url(format!("{raw}: unsupported scheme {other}"))),
    }
}

fn parse_list<T: DeserializeOwned>(response: HttpResponse) -> Result<Vec<T>, CarError> {
    if !(200..300).contains(&response.status) {
        return Err(CarError::Status {
            code: response.status,
            body: response.body,
        });
    }
    if response.body.trim().is_empty() {
        return Err(CarError::NoData);
    }
    serde_json::from_str(&response.body).map_err(|e| CarError::InvalidJson(e.to_string()))
}
