//! C-ABI wrapper around `carangas-core`.
//!
//! # Overview
//! Lets a native mobile host build the vehicle and brand requests, execute
//! them with its own HTTP stack, and parse the responses into C structs,
//! without linking a Rust HTTP client.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `build_*` / `parse_*` mirror `CarsClient` 1:1. Save, update and delete
//!   share `carangas_parse_apply`. A failed build returns null and hands
//!   the typed error back through the `error_out` parameter.
//! - A single `FfiCarResult` envelope carries payloads and errors; a host
//!   whose own transport failed wraps the cause with
//!   `carangas_result_transport_error` so the screen sees one error shape.
//! - The C caller owns all returned pointers and must call the matching
//!   `carangas_free_*` function to release them.

pub mod types;

use std::ffi::CString;
use std::os::raw::c_char;
use std::panic::{catch_unwind, UnwindSafe};

use carangas_core::{CarError, ClientConfig, HttpResponse, RestOperation};

use types::*;

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client for `base_url`. `brands_url` may be null to use the
/// default brand lookup service.
///
/// Returns null if `base_url` is null or if an internal panic occurs.
/// The caller must free the returned pointer with `carangas_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn carangas_client_new(
    base_url: *const c_char,
    brands_url: *const c_char,
) -> *mut FfiCarsClient {
    catch_unwind(|| {
        let Some(base_url) = read_str(base_url) else {
            return std::ptr::null_mut();
        };
        let mut config = ClientConfig::with_base_url(&base_url);
        if let Some(brands_url) = read_str(brands_url) {
            config.brands_url = brands_url;
        }
        let client = carangas_core::CarsClient::new(&config);
        Box::into_raw(Box::new(FfiCarsClient { inner: client }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `carangas_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn carangas_client_free(client: *mut FfiCarsClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Hand a build failure to the caller through `error_out`, or drop it when
/// the caller passed null.
fn report_build_error(error_out: *mut *mut FfiCarResult, result: *mut FfiCarResult) {
    if error_out.is_null() {
        carangas_free_result(result);
    } else {
        unsafe { *error_out = result };
    }
}

fn build_error(err: CarError) -> *mut FfiCarResult {
    tracing::warn!(error = %err, "Failed to build request");
    FfiCarResult::from_error(err)
}

/// Run a build step behind `catch_unwind`, routing failures to `error_out`.
fn build_with(
    error_out: *mut *mut FfiCarResult,
    build: impl FnOnce() -> Result<carangas_core::HttpRequest, *mut FfiCarResult> + UnwindSafe,
) -> *mut FfiHttpRequest {
    if !error_out.is_null() {
        unsafe { *error_out = std::ptr::null_mut() };
    }
    let outcome = catch_unwind(|| build().map(FfiHttpRequest::from_core))
        .unwrap_or_else(|_| Err(FfiCarResult::panic("panic while building request")));
    match outcome {
        Ok(req) => req,
        Err(result) => {
            report_build_error(error_out, result);
            std::ptr::null_mut()
        }
    }
}

/// Build the request listing all cars.
///
/// Returns null if `client` is null or the base URL is invalid; the typed
/// failure is then stored in `*error_out` unless `error_out` is null, and
/// must be freed with `carangas_free_result`. On success `*error_out` is
/// set to null.
/// The caller must free the returned pointer with `carangas_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn carangas_build_list_cars(
    client: *const FfiCarsClient,
    error_out: *mut *mut FfiCarResult,
) -> *mut FfiHttpRequest {
    build_with(error_out, || {
        if client.is_null() {
            return Err(FfiCarResult::null_arg("client"));
        }
        let client = unsafe { &*client };
        client.inner.build_list_cars().map_err(build_error)
    })
}

/// Build the request listing brands from the lookup service.
///
/// Failures are reported as for `carangas_build_list_cars`.
#[unsafe(no_mangle)]
pub extern "C" fn carangas_build_list_brands(
    client: *const FfiCarsClient,
    error_out: *mut *mut FfiCarResult,
) -> *mut FfiHttpRequest {
    build_with(error_out, || {
        if client.is_null() {
            return Err(FfiCarResult::null_arg("client"));
        }
        let client = unsafe { &*client };
        client.inner.build_list_brands().map_err(build_error)
    })
}

fn build_apply(
    client: *const FfiCarsClient,
    car: *const FfiCarInput,
    operation: RestOperation,
    error_out: *mut *mut FfiCarResult,
) -> *mut FfiHttpRequest {
    build_with(error_out, || {
        if client.is_null() {
            return Err(FfiCarResult::null_arg("client"));
        }
        if car.is_null() {
            return Err(FfiCarResult::null_arg("car"));
        }
        let client = unsafe { &*client };
        let car = unsafe { &*car }.to_core();
        client.inner.build_apply(&car, operation).map_err(build_error)
    })
}

/// Build a POST creating `car`.
///
/// Returns null if `client` or `car` is null, or the request cannot be
/// built; see `carangas_build_list_cars` for `error_out`.
#[unsafe(no_mangle)]
pub extern "C" fn carangas_build_save(
    client: *const FfiCarsClient,
    car: *const FfiCarInput,
    error_out: *mut *mut FfiCarResult,
) -> *mut FfiHttpRequest {
    build_apply(client, car, RestOperation::Save, error_out)
}

/// Build a PUT replacing the record identified by `car->id`.
#[unsafe(no_mangle)]
pub extern "C" fn carangas_build_update(
    client: *const FfiCarsClient,
    car: *const FfiCarInput,
    error_out: *mut *mut FfiCarResult,
) -> *mut FfiHttpRequest {
    build_apply(client, car, RestOperation::Update, error_out)
}

/// Build a DELETE for the record identified by `car->id`.
#[unsafe(no_mangle)]
pub extern "C" fn carangas_build_delete(
    client: *const FfiCarsClient,
    car: *const FfiCarInput,
    error_out: *mut *mut FfiCarResult,
) -> *mut FfiHttpRequest {
    build_apply(client, car, RestOperation::Delete, error_out)
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Body of a list response. A 2xx body that is not UTF-8 fails as
/// `InvalidJson`; error statuses keep their status error.
fn listing_response(resp: &FfiHttpResponse) -> Result<HttpResponse, CarError> {
    match read_body(resp.body) {
        Ok(body) => Ok(HttpResponse::new(resp.status, body)),
        Err(err) if (200..300).contains(&resp.status) => Err(err),
        Err(_) => Ok(HttpResponse::new(resp.status, read_body_lossy(resp.body))),
    }
}

/// Save, update and delete only look at the status.
fn apply_response(resp: &FfiHttpResponse) -> Result<HttpResponse, CarError> {
    Ok(HttpResponse::new(resp.status, read_body_lossy(resp.body)))
}

fn parse_with(
    client: *const FfiCarsClient,
    response: *const FfiHttpResponse,
    decode: fn(&FfiHttpResponse) -> Result<HttpResponse, CarError>,
    parse: impl FnOnce(&carangas_core::CarsClient, HttpResponse) -> *mut FfiCarResult,
) -> *mut FfiCarResult {
    if client.is_null() {
        return FfiCarResult::null_arg("client");
    }
    if response.is_null() {
        return FfiCarResult::null_arg("response");
    }
    let client = unsafe { &*client };
    match decode(unsafe { &*response }) {
        Ok(resp) => parse(&client.inner, resp),
        Err(err) => {
            tracing::warn!(error = %err, "Response body is not UTF-8");
            FfiCarResult::from_error(err)
        }
    }
}

/// Parse the response to a list-cars request.
///
/// Returns a result with `data_tag = CarList` on success.
#[unsafe(no_mangle)]
pub extern "C" fn carangas_parse_list_cars(
    client: *const FfiCarsClient,
    response: *const FfiHttpResponse,
) -> *mut FfiCarResult {
    catch_unwind(|| {
        parse_with(client, response, listing_response, |client, resp| match client.parse_list_cars(resp) {
            Ok(cars) => FfiCarResult::ok_car_list(cars),
            Err(e) => FfiCarResult::from_error(e),
        })
    })
    .unwrap_or_else(|_| FfiCarResult::panic("panic in carangas_parse_list_cars"))
}

/// Parse the response to a list-brands request.
///
/// Returns a result with `data_tag = BrandList` on success.
#[unsafe(no_mangle)]
pub extern "C" fn carangas_parse_list_brands(
    client: *const FfiCarsClient,
    response: *const FfiHttpResponse,
) -> *mut FfiCarResult {
    catch_unwind(|| {
        parse_with(client, response, listing_response, |client, resp| match client.parse_list_brands(resp) {
            Ok(brands) => FfiCarResult::ok_brand_list(brands),
            Err(e) => FfiCarResult::from_error(e),
        })
    })
    .unwrap_or_else(|_| FfiCarResult::panic("panic in carangas_parse_list_brands"))
}

/// Parse the response to a save, update or delete request.
///
/// `Ok` only for status 200; `data_tag` is always `None`.
#[unsafe(no_mangle)]
pub extern "C" fn carangas_parse_apply(
    client: *const FfiCarsClient,
    response: *const FfiHttpResponse,
) -> *mut FfiCarResult {
    catch_unwind(|| {
        parse_with(client, response, apply_response, |client, resp| match client.parse_apply(resp) {
            Ok(()) => FfiCarResult::ok_empty(),
            Err(e) => FfiCarResult::from_error(e),
        })
    })
    .unwrap_or_else(|_| FfiCarResult::panic("panic in carangas_parse_apply"))
}

/// Wrap a failure of the host's own HTTP stack as a `Transport` result.
/// `cause` may be null.
#[unsafe(no_mangle)]
pub extern "C" fn carangas_result_transport_error(cause: *const c_char) -> *mut FfiCarResult {
    catch_unwind(|| {
        let cause = read_str(cause).unwrap_or_else(|| "unknown transport failure".to_string());
        tracing::warn!(%cause, "Host transport failure");
        FfiCarResult::from_error(CarError::Transport(cause))
    })
    .unwrap_or_else(|_| FfiCarResult::panic("panic in carangas_result_transport_error"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

/// Free an `FfiHttpRequest` returned by any `carangas_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn carangas_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.path);
        free_c_string(req.body);
        for h in unsafe { from_raw_list(req.headers, req.headers_len) } {
            free_c_string(h.key);
            free_c_string(h.value);
        }
    });
}

/// Free an `FfiCarResult` returned by any `carangas_parse_*` function.
/// Safe to call with null. Uses `data_tag` to determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn carangas_free_result(result: *mut FfiCarResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::CarList => {
                let list = unsafe { Box::from_raw(result.data as *mut FfiCarList) };
                for car in unsafe { from_raw_list(list.items, list.len) } {
                    free_c_string(car.id);
                    free_c_string(car.name);
                    free_c_string(car.brand);
                }
            }
            FfiDataTag::BrandList => {
                let list = unsafe { Box::from_raw(result.data as *mut FfiBrandList) };
                for brand in unsafe { from_raw_list(list.items, list.len) } {
                    free_c_string(brand.fipe_name);
                    free_c_string(brand.name);
                    free_c_string(brand.key);
                }
            }
            FfiDataTag::None => {}
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn carangas_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| free_c_string(s));
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
