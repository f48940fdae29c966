use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with, Brand, Car};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

fn seeded() -> axum::Router {
    app_with(
        ["1", "2", "3"]
            .into_iter()
            .map(|id| Car {
                id: Some(id.to_string()),
                name: format!("car {id}"),
                brand: "VW".to_string(),
                gas_type: 0,
                price: 0.0,
            })
            .collect(),
    )
}

// --- list ---

#[tokio::test]
async fn list_cars_empty() {
    let resp = app().oneshot(empty_request("GET", "/cars")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let cars: Vec<Car> = body_json(resp).await;
    assert!(cars.is_empty());
}

#[tokio::test]
async fn list_cars_keeps_insertion_order() {
    let resp = seeded().oneshot(empty_request("GET", "/cars")).await.unwrap();

    let cars: Vec<Car> = body_json(resp).await;
    let ids: Vec<_> = cars.iter().map(|c| c.id.clone().unwrap()).collect();
    assert_eq!(ids, ["1", "2", "3"]);
}

// --- create ---

#[tokio::test]
async fn create_car_returns_200_with_assigned_id() {
    let resp = app()
        .oneshot(json_request("POST", "/cars", r#"{"name":"Gol","brand":"VW"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let car: Car = body_json(resp).await;
    assert_eq!(car.name, "Gol");
    assert!(car.id.is_some());
}

#[tokio::test]
async fn create_car_accepts_trailing_slash() {
    let resp = app()
        .oneshot(json_request("POST", "/cars/", r#"{"name":"Gol","brand":"VW"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_car_ignores_client_supplied_id() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/cars",
            r#"{"_id":"mine","name":"Gol","brand":"VW"}"#,
        ))
        .await
        .unwrap();

    let car: Car = body_json(resp).await;
    assert_ne!(car.id.as_deref(), Some("mine"));
}

#[tokio::test]
async fn create_car_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/cars", r#"{"brand":"VW"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- get ---

#[tokio::test]
async fn get_car_not_found() {
    let resp = seeded().oneshot(empty_request("GET", "/cars/nope")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- update ---

#[tokio::test]
async fn update_car_replaces_fields_and_keeps_id() {
    let resp = seeded()
        .oneshot(json_request(
            "PUT",
            "/cars/2",
            r#"{"_id":"other","name":"Polo","brand":"VW","price":50000}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let car: Car = body_json(resp).await;
    assert_eq!(car.id.as_deref(), Some("2"));
    assert_eq!(car.name, "Polo");
    assert_eq!(car.price, 50000.0);
}

#[tokio::test]
async fn update_car_not_found() {
    let resp = app()
        .oneshot(json_request("PUT", "/cars/nope", r#"{"name":"Polo","brand":"VW"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- delete ---

#[tokio::test]
async fn delete_car_returns_200_and_removes_it() {
    let app = seeded();
    let resp = app
        .clone()
        .oneshot(empty_request("DELETE", "/cars/2"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let deleted: Car = body_json(resp).await;
    assert_eq!(deleted.id.as_deref(), Some("2"));

    let resp = app.oneshot(empty_request("GET", "/cars")).await.unwrap();
    let cars: Vec<Car> = body_json(resp).await;
    let ids: Vec<_> = cars.iter().map(|c| c.id.clone().unwrap()).collect();
    assert_eq!(ids, ["1", "3"]);
}

#[tokio::test]
async fn delete_car_not_found_has_empty_body() {
    let resp = app()
        .oneshot(empty_request("DELETE", "/cars/nope"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_bytes(resp).await.is_empty());
}

// --- brands ---

#[tokio::test]
async fn list_brands_returns_lookup_table() {
    let resp = app().oneshot(empty_request("GET", "/brands")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let brands: Vec<Brand> = body_json(resp).await;
    assert_eq!(brands, mock_server::brands());
}
