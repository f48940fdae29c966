//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible fields: `*mut c_char`
//! for strings, pointer + length for lists, explicit enum discriminants.
//! Absent optional strings are null pointers. Conversions live here so
//! `lib.rs` stays focused on the `extern "C"` surface.

use std::ffi::{c_void, CStr, CString};
use std::os::raw::c_char;

use carangas_core::{Brand, Car, CarError, HttpMethod};

/// Opaque handle to a `CarsClient`.
pub struct FfiCarsClient {
    pub(crate) inner: carangas_core::CarsClient,
}

/// Copy a Rust string into a C string owned by the caller. Interior NULs
/// are dropped.
pub(crate) fn c_string(s: impl Into<Vec<u8>>) -> *mut c_char {
    let c = CString::new(s).unwrap_or_else(|e| {
        let mut bytes = e.into_vec();
        bytes.retain(|b| *b != 0);
        CString::new(bytes).unwrap_or_default()
    });
    c.into_raw()
}

fn c_string_opt(s: Option<String>) -> *mut c_char {
    s.map(c_string).unwrap_or(std::ptr::null_mut())
}

/// Read a borrowed C string; null reads as `None`, invalid UTF-8 as empty.
pub(crate) fn read_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(ptr) }.to_str().unwrap_or("").to_string())
}

/// Read a response body. Null is an empty body; bytes that are not UTF-8
/// cannot be JSON and fail as `InvalidJson`.
pub(crate) fn read_body(ptr: *const c_char) -> Result<String, CarError> {
    if ptr.is_null() {
        return Ok(String::new());
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map(str::to_string)
        .map_err(|e| CarError::InvalidJson(e.to_string()))
}

/// Read a response body, replacing bytes that are not UTF-8.
pub(crate) fn read_body_lossy(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request for the host to execute. `body` is null when the
/// request carries none.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub path: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    pub(crate) fn from_core(req: carangas_core::HttpRequest) -> *mut Self {
        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Vec<FfiHeader> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: c_string(k),
                    value: c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers.into_boxed_slice()) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            path: c_string(req.path),
            headers,
            headers_len,
            body: c_string_opt(req.body),
        }))
    }
}

/// The host's view of a completed HTTP exchange. Read, never freed, by
/// the library.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

/// A vehicle supplied by the host for save, update or delete.
/// `id` may be null for a record the backend has not created yet.
#[repr(C)]
pub struct FfiCarInput {
    pub id: *const c_char,
    pub name: *const c_char,
    pub brand: *const c_char,
    pub gas_type: i32,
    pub price: f64,
}

impl FfiCarInput {
    pub(crate) fn to_core(&self) -> Car {
        Car {
            id: read_str(self.id),
            name: read_str(self.name).unwrap_or_default(),
            brand: read_str(self.brand).unwrap_or_default(),
            gas_type: self.gas_type,
            price: self.price,
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// One code per `CarError` variant, plus the boundary's own failures.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    Url = 1,
    Transport = 2,
    NoResponse = 3,
    NoData = 4,
    Status = 5,
    InvalidJson = 6,
    Serialization = 7,
    Panic = 8,
    NullArg = 9,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    CarList = 1,
    BrandList = 2,
}

#[repr(C)]
pub struct FfiCar {
    pub id: *mut c_char,
    pub name: *mut c_char,
    pub brand: *mut c_char,
    pub gas_type: i32,
    pub price: f64,
}

impl From<Car> for FfiCar {
    fn from(car: Car) -> Self {
        FfiCar {
            id: c_string_opt(car.id),
            name: c_string(car.name),
            brand: c_string(car.brand),
            gas_type: car.gas_type,
            price: car.price,
        }
    }
}

#[repr(C)]
pub struct FfiCarList {
    pub items: *mut FfiCar,
    pub len: u32,
}

#[repr(C)]
pub struct FfiBrand {
    pub fipe_name: *mut c_char,
    pub name: *mut c_char,
    pub key: *mut c_char,
    pub has_id: bool,
    pub id: i64,
}

impl From<Brand> for FfiBrand {
    fn from(brand: Brand) -> Self {
        FfiBrand {
            fipe_name: c_string(brand.fipe_name),
            name: c_string_opt(brand.name),
            key: c_string_opt(brand.key),
            has_id: brand.id.is_some(),
            id: brand.id.unwrap_or(0),
        }
    }
}

#[repr(C)]
pub struct FfiBrandList {
    pub items: *mut FfiBrand,
    pub len: u32,
}

/// Leak a vector as a pointer + length pair; empty lists are null.
fn into_raw_list<T>(items: Vec<T>) -> (*mut T, u32) {
    let len = items.len() as u32;
    if items.is_empty() {
        return (std::ptr::null_mut(), 0);
    }
    (Box::into_raw(items.into_boxed_slice()) as *mut T, len)
}

/// Reclaim a list leaked by `into_raw_list`.
///
/// # Safety
/// `items`/`len` must come from `into_raw_list` and not have been freed.
pub(crate) unsafe fn from_raw_list<T>(items: *mut T, len: u32) -> Vec<T> {
    if items.is_null() || len == 0 {
        return Vec::new();
    }
    let slice = std::ptr::slice_from_raw_parts_mut(items, len as usize);
    unsafe { Box::from_raw(slice) }.into_vec()
}

/// Result envelope for every parse operation.
///
/// On success `error_code` is `Ok`, `error_message` is null and `data`
/// points at the payload named by `data_tag`. On failure `error_message`
/// holds the display text for the list screen and `data` is null.
#[repr(C)]
pub struct FfiCarResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut c_void,
}

impl FfiCarResult {
    fn boxed(
        error_code: FfiErrorCode,
        error_message: *mut c_char,
        http_status: u16,
        data_tag: FfiDataTag,
        data: *mut c_void,
    ) -> *mut Self {
        Box::into_raw(Box::new(FfiCarResult {
            error_code,
            error_message,
            http_status,
            data_tag,
            data,
        }))
    }

    pub(crate) fn ok_car_list(cars: Vec<Car>) -> *mut Self {
        let (items, len) = into_raw_list(cars.into_iter().map(FfiCar::from).collect());
        let list = Box::into_raw(Box::new(FfiCarList { items, len }));
        Self::boxed(FfiErrorCode::Ok, std::ptr::null_mut(), 200, FfiDataTag::CarList, list as *mut c_void)
    }

    pub(crate) fn ok_brand_list(brands: Vec<Brand>) -> *mut Self {
        let (items, len) = into_raw_list(brands.into_iter().map(FfiBrand::from).collect());
        let list = Box::into_raw(Box::new(FfiBrandList { items, len }));
        Self::boxed(FfiErrorCode::Ok, std::ptr::null_mut(), 200, FfiDataTag::BrandList, list as *mut c_void)
    }

    pub(crate) fn ok_empty() -> *mut Self {
        Self::boxed(FfiErrorCode::Ok, std::ptr::null_mut(), 200, FfiDataTag::None, std::ptr::null_mut())
    }

    pub(crate) fn from_error(err: CarError) -> *mut Self {
        let code = match &err {
            CarError::Url(_) => FfiErrorCode::Url,
            CarError::Transport(_) => FfiErrorCode::Transport,
            CarError::NoResponse => FfiErrorCode::NoResponse,
            CarError::NoData => FfiErrorCode::NoData,
            CarError::Status { .. } => FfiErrorCode::Status,
            CarError::InvalidJson(_) => FfiErrorCode::InvalidJson,
            CarError::Serialization(_) => FfiErrorCode::Serialization,
        };
        let status = err.status().unwrap_or(0);
        Self::boxed(code, c_string(err.message()), status, FfiDataTag::None, std::ptr::null_mut())
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::NullArg,
            c_string(format!("null argument: {name}")),
            0,
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::boxed(FfiErrorCode::Panic, c_string(msg), 0, FfiDataTag::None, std::ptr::null_mut())
    }
}
