//! Plays the native host: builds requests through the C API, executes them
//! with ureq against the live mock server, and parses the responses back
//! through the C API.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use carangas_ffi::types::*;
use carangas_ffi::*;

fn start_server() -> std::net::SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });
    addr
}

fn text(ptr: *const c_char) -> String {
    unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string()
}

/// Execute an `FfiHttpRequest` the way a host HTTP stack would and free it.
fn execute(req: *mut FfiHttpRequest) -> (u16, CString) {
    assert!(!req.is_null());
    let r = unsafe { &*req };
    let path = text(r.path);
    let body = (!r.body.is_null()).then(|| text(r.body));

    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();
    let result = match (&r.method, body) {
        (FfiHttpMethod::Get, _) => agent.get(&path).call(),
        (FfiHttpMethod::Delete, _) => agent.delete(&path).call(),
        (FfiHttpMethod::Post, Some(b)) => agent.post(&path).content_type("application/json").send(b.as_bytes()),
        (FfiHttpMethod::Post, None) => agent.post(&path).send_empty(),
        (FfiHttpMethod::Put, Some(b)) => agent.put(&path).content_type("application/json").send(b.as_bytes()),
        (FfiHttpMethod::Put, None) => agent.put(&path).send_empty(),
    };
    carangas_free_request(req);

    let mut response = result.expect("HTTP transport error");
    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();
    (status, CString::new(body).unwrap())
}

fn list_len(client: *const FfiCarsClient) -> u32 {
    let (status, body) = execute(carangas_build_list_cars(client, std::ptr::null_mut()));
    let resp = FfiHttpResponse {
        status,
        body: body.as_ptr(),
    };
    let result = carangas_parse_list_cars(client, &resp);
    let r = unsafe { &*result };
    assert_eq!(r.error_code, FfiErrorCode::Ok);
    let len = unsafe { &*(r.data as *const FfiCarList) }.len;
    carangas_free_result(result);
    len
}

#[test]
fn save_list_delete_through_the_c_api() {
    let addr = start_server();
    let base = CString::new(format!("http://{addr}/cars")).unwrap();
    let brands = CString::new(format!("http://{addr}/brands")).unwrap();
    let client = carangas_client_new(base.as_ptr(), brands.as_ptr());

    assert_eq!(list_len(client), 0);

    // Save.
    let name = CString::new("Gol").unwrap();
    let brand = CString::new("VW").unwrap();
    let input = FfiCarInput {
        id: std::ptr::null(),
        name: name.as_ptr(),
        brand: brand.as_ptr(),
        gas_type: 0,
        price: 30000.0,
    };
    let (status, body) = execute(carangas_build_save(client, &input, std::ptr::null_mut()));
    let resp = FfiHttpResponse {
        status,
        body: body.as_ptr(),
    };
    let result = carangas_parse_apply(client, &resp);
    assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::Ok);
    carangas_free_result(result);

    // The backend assigned the id.
    let (status, body) = execute(carangas_build_list_cars(client, std::ptr::null_mut()));
    let resp = FfiHttpResponse {
        status,
        body: body.as_ptr(),
    };
    let result = carangas_parse_list_cars(client, &resp);
    let list = unsafe { &*(unsafe { &*result }.data as *const FfiCarList) };
    let items = unsafe { std::slice::from_raw_parts(list.items, list.len as usize) };
    let id = CString::new(text(items[0].id)).unwrap();
    carangas_free_result(result);

    // Delete.
    let target = FfiCarInput {
        id: id.as_ptr(),
        ..input
    };
    let (status, body) = execute(carangas_build_delete(client, &target, std::ptr::null_mut()));
    let resp = FfiHttpResponse {
        status,
        body: body.as_ptr(),
    };
    let result = carangas_parse_apply(client, &resp);
    assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::Ok);
    carangas_free_result(result);

    assert_eq!(list_len(client), 0);

    // Deleting again is a 404 status error.
    let (status, body) = execute(carangas_build_delete(client, &target, std::ptr::null_mut()));
    let resp = FfiHttpResponse {
        status,
        body: body.as_ptr(),
    };
    let result = carangas_parse_apply(client, &resp);
    let r = unsafe { &*result };
    assert_eq!(r.error_code, FfiErrorCode::Status);
    assert_eq!(r.http_status, 404);
    carangas_free_result(result);

    carangas_client_free(client);
}

#[test]
fn brands_through_the_c_api() {
    let addr = start_server();
    let base = CString::new(format!("http://{addr}/cars")).unwrap();
    let brands = CString::new(format!("http://{addr}/brands")).unwrap();
    let client = carangas_client_new(base.as_ptr(), brands.as_ptr());

    let (status, body) = execute(carangas_build_list_brands(client, std::ptr::null_mut()));
    let resp = FfiHttpResponse {
        status,
        body: body.as_ptr(),
    };
    let result = carangas_parse_list_brands(client, &resp);
    let r = unsafe { &*result };
    assert_eq!(r.error_code, FfiErrorCode::Ok);
    let list = unsafe { &*(r.data as *const FfiBrandList) };
    assert_eq!(list.len as usize, mock_server::brands().len());

    carangas_free_result(result);
    carangas_client_free(client);
}
