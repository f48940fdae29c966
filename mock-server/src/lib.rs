//! In-memory stand-in for the vehicle backend and the brand lookup.
//!
//! Speaks the same contract as the hosted service: list and create on
//! `/cars`, update and delete on `/cars/{id}`, every success answered with
//! 200. `/brands` serves a fixed lookup table.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Car {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub brand: String,
    #[serde(rename = "gasType", default)]
    pub gas_type: i32,
    #[serde(default)]
    pub price: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Brand {
    pub name: String,
    pub fipe_name: String,
    pub key: String,
    pub id: i64,
}

/// Cars in insertion order.
pub type Db = Arc<RwLock<Vec<Car>>>;

pub fn app() -> Router {
    app_with(Vec::new())
}

/// Router pre-seeded with `cars`. Records without an id get one.
pub fn app_with(cars: Vec<Car>) -> Router {
    let cars = cars
        .into_iter()
        .map(|mut car| {
            car.id.get_or_insert_with(new_id);
            car
        })
        .collect();
    let db: Db = Arc::new(RwLock::new(cars));
    Router::new()
        .route("/cars", get(list_cars).post(create_car))
        .route("/cars/", post(create_car))
        .route("/cars/{id}", get(get_car).put(update_car).delete(delete_car))
        .route("/brands", get(list_brands))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, app()).await
}

pub async fn serve(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock backend listening");
    }
    axum::serve(listener, router).await
}

pub fn brands() -> Vec<Brand> {
    [("AUDI", "Audi", 6), ("BMW", "BMW", 7), ("FIAT", "Fiat", 21), ("VW - VOLKSWAGEN", "VW - VolksWagen", 59)]
        .into_iter()
        .map(|(name, fipe_name, id)| Brand {
            name: name.to_string(),
            fipe_name: fipe_name.to_string(),
            key: format!("{}-{id}", fipe_name.to_lowercase().replace(' ', "")),
            id,
        })
        .collect()
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

async fn list_cars(State(db): State<Db>) -> Json<Vec<Car>> {
    let cars = db.read().await;
    debug!(count = cars.len(), "list cars");
    Json(cars.clone())
}

async fn create_car(State(db): State<Db>, Json(mut car): Json<Car>) -> Json<Car> {
    car.id = Some(new_id());
    db.write().await.push(car.clone());
    debug!(id = ?car.id, "created car");
    Json(car)
}

async fn get_car(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<Car>, StatusCode> {
    let cars = db.read().await;
    cars.iter()
        .find(|car| car.id.as_deref() == Some(id.as_str()))
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_car(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<Car>,
) -> Result<Json<Car>, StatusCode> {
    let mut cars = db.write().await;
    let car = cars
        .iter_mut()
        .find(|car| car.id.as_deref() == Some(id.as_str()))
        .ok_or(StatusCode::NOT_FOUND)?;
    *car = Car {
        id: Some(id),
        ..input
    };
    debug!(id = ?car.id, "updated car");
    Ok(Json(car.clone()))
}

async fn delete_car(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<Car>, StatusCode> {
    let mut cars = db.write().await;
    let index = cars
        .iter()
        .position(|car| car.id.as_deref() == Some(id.as_str()))
        .ok_or(StatusCode::NOT_FOUND)?;
    debug!(%id, "deleted car");
    Ok(Json(cars.remove(index)))
}

async fn list_brands() -> Json<Vec<Brand>> {
    Json(brands())
}
