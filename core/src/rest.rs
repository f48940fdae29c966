//! Blocking REST facade: build, execute and parse in one call.
//!
//! Every operation returns `Result<_, CarError>`. Mutation failures are
//! additionally logged so they are visible even when the caller only cares
//! about success.

use tracing::warn;

use crate::client::CarsClient;
use crate::config::ClientConfig;
use crate::error::CarError;
use crate::transport::{Transport, UreqTransport};
use crate::types::{Brand, Car, RestOperation};

pub struct Rest<T: Transport> {
    client: CarsClient,
    transport: T,
}

impl Rest<UreqTransport> {
    /// Facade over the shared ureq session described by `config`.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(CarsClient::new(config), UreqTransport::new(config))
    }
}

impl<T: Transport> Rest<T> {
    pub fn new(client: CarsClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &CarsClient {
        &self.client
    }

    pub fn load_cars(&self) -> Result<Vec<Car>, CarError> {
        let request = self.client.build_list_cars()?;
        let response = self.transport.execute(request)?;
        self.client.parse_list_cars(response)
    }

    pub fn load_brands(&self) -> Result<Vec<Brand>, CarError> {
        let request = self.client.build_list_brands()?;
        let response = self.transport.execute(request)?;
        self.client.parse_list_brands(response)
    }

    pub fn save(&self, car: &Car) -> Result<(), CarError> {
        self.apply_operation(car, RestOperation::Save)
    }

    pub fn update(&self, car: &Car) -> Result<(), CarError> {
        self.apply_operation(car, RestOperation::Update)
    }

    pub fn delete(&self, car: &Car) -> Result<(), CarError> {
        self.apply_operation(car, RestOperation::Delete)
    }

    pub fn apply_operation(&self, car: &Car, operation: RestOperation) -> Result<(), CarError> {
        let result = self
            .client
            .build_apply(car, operation)
            .and_then(|request| self.transport.execute(request));
        match result {
            Ok(response) => self.client.parse_apply(response),
            Err(err) => {
                warn!(?operation, id = ?car.id, error = %err, "{}", err.message());
                Err(err)
            }
        }
    }
}
