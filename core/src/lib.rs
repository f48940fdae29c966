//! Client core for the Carangas vehicle service.
//!
//! # Overview
//! Lists, saves, updates and deletes vehicles on a fixed REST backend and
//! looks up brands from a second service. Requests and responses are plain
//! data (host-does-IO): `CarsClient` builds and parses them, a `Transport`
//! executes them, and `Rest` ties the two together for callers that want a
//! single blocking call.
//!
//! # Design
//! - Every operation, read or write, returns `Result<_, CarError>`.
//! - `ClientConfig` is immutable and shared; `UreqTransport` keeps one
//!   session (timeout, per-host connection cap) for all requests.
//! - `CarsController` is the list screen's state with no I/O;
//!   `CarsScreen` runs requests on worker threads and hands results back
//!   to the UI thread through a queue.
//! - The FFI crate reuses `CarsClient` so a native host can execute the
//!   requests with its own HTTP stack.

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod http;
pub mod rest;
pub mod screen;
pub mod transport;
pub mod types;

pub use client::CarsClient;
pub use config::ClientConfig;
pub use controller::{Alert, AlertAction, CarsController, LoadState, LoadTicket, PendingDelete};
pub use error::CarError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use rest::Rest;
pub use screen::{CancelToken, CarsScreen, UiEvent, Workers};
pub use transport::{Transport, UreqTransport};
pub use types::{Brand, Car, RestOperation};
