//! In-memory state of the vehicle list screen.
//!
//! # Design
//! `CarsController` performs no I/O. Loads and deletes are split into a
//! `begin_*` call that hands out a ticket and a `finish_*` call that applies
//! the network outcome, so whoever executes the request (a worker pool, the
//! native host, a test) only ever touches the state from one thread.
//!
//! At most one load is outstanding at a time: `begin_load` returns `None`
//! while a ticket is live, and `finish_load` ignores tickets that are not
//! the live one.

use tracing::{debug, info, warn};

use crate::error::CarError;
use crate::types::Car;

pub const LOADING_TEXT: &str = "Carregando dados...";
pub const EMPTY_TEXT: &str = "Sem dados";
pub const DELETE_ALERT_TITLE: &str = "Remover";
pub const DELETE_ALERT_MESSAGE: &str = "Não foi possível remover o carro.";

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    Empty,
    Errored(CarError),
}

/// Proof that a load was started; redeemed by `finish_load`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

/// A delete in flight: the row it was issued for and the record it targets.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingDelete {
    pub index: usize,
    pub car: Car,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertAction {
    Ok,
    Cancel,
}

impl AlertAction {
    pub fn label(self) -> &'static str {
        match self {
            AlertAction::Ok => "OK",
            AlertAction::Cancel => "Cancelar",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
    pub actions: Vec<AlertAction>,
}

impl Alert {
    fn delete_failed() -> Self {
        Self {
            title: DELETE_ALERT_TITLE.to_string(),
            message: DELETE_ALERT_MESSAGE.to_string(),
            actions: vec![AlertAction::Ok, AlertAction::Cancel],
        }
    }
}

#[derive(Debug)]
pub struct CarsController {
    cars: Vec<Car>,
    state: LoadState,
    background: Option<String>,
    alert: Option<Alert>,
    generation: u64,
    in_flight: Option<u64>,
}

impl Default for CarsController {
    fn default() -> Self {
        Self::new()
    }
}

impl CarsController {
    pub fn new() -> Self {
        Self {
            cars: Vec::new(),
            state: LoadState::Idle,
            background: Some(LOADING_TEXT.to_string()),
            alert: None,
            generation: 0,
            in_flight: None,
        }
    }

    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    pub fn len(&self) -> usize {
        self.cars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cars.is_empty()
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Placeholder text shown behind the rows; `None` while rows are shown.
    pub fn background(&self) -> Option<&str> {
        self.background.as_deref()
    }

    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    pub fn dismiss_alert(&mut self) -> Option<Alert> {
        self.alert.take()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Cell text for a row: the car's name and brand.
    pub fn row(&self, index: usize) -> Option<(&str, &str)> {
        self.cars
            .get(index)
            .map(|car| (car.name.as_str(), car.brand.as_str()))
    }

    /// A copy of the record at `index` for the detail screen.
    pub fn selected(&self, index: usize) -> Option<Car> {
        self.cars.get(index).cloned()
    }

    pub fn begin_load(&mut self) -> Option<LoadTicket> {
        if self.in_flight.is_some() {
            debug!("Load already in flight, coalescing");
            return None;
        }
        self.generation += 1;
        self.in_flight = Some(self.generation);
        self.state = LoadState::Loading;
        Some(LoadTicket {
            generation: self.generation,
        })
    }

    /// Apply a load outcome. Returns `false` if the ticket was stale.
    pub fn finish_load(&mut self, ticket: LoadTicket, result: Result<Vec<Car>, CarError>) -> bool {
        if self.in_flight != Some(ticket.generation) {
            debug!(generation = ticket.generation, "Ignoring stale load result");
            return false;
        }
        self.in_flight = None;

        match result {
            Ok(cars) if cars.is_empty() => {
                info!("Loaded empty list");
                self.cars = cars;
                self.show_empty();
            }
            Ok(cars) => {
                info!(count = cars.len(), "Loaded cars");
                self.cars = cars;
                self.state = LoadState::Loaded;
                self.background = None;
            }
            Err(err) => {
                warn!(error = %err, "Load failed");
                self.background = Some(err.message());
                self.state = LoadState::Errored(err);
            }
        }
        true
    }

    /// Capture the record at `index` for deletion; `None` if out of range.
    pub fn begin_delete(&mut self, index: usize) -> Option<PendingDelete> {
        let car = self.cars.get(index)?.clone();
        Some(PendingDelete { index, car })
    }

    /// Apply a delete outcome. Returns the index of the removed row.
    ///
    /// The row at the captured index is removed when it still holds the
    /// record; otherwise the row is located by identifier so a reload between
    /// begin and finish cannot remove the wrong record. Failure leaves the list
    /// untouched and raises the delete alert.
    pub fn finish_delete(&mut self, pending: PendingDelete, result: Result<(), CarError>) -> Option<usize> {
        if let Err(err) = result {
            warn!(error = %err, index = pending.index, "Delete failed");
            self.alert = Some(Alert::delete_failed());
            return None;
        }

        let in_place = self.cars.get(pending.index).is_some_and(|car| match &pending.car.id {
            Some(_) => car.id == pending.car.id,
            None => car == &pending.car,
        });
        let position = if in_place {
            Some(pending.index)
        } else {
            pending.car.id.as_deref().and_then(|id| {
                self.cars
                    .iter()
                    .position(|car| car.id.as_deref() == Some(id))
            })
        };

        let index = position?;
        self.cars.remove(index);
        info!(index, remaining = self.cars.len(), "Removed car");
        if self.cars.is_empty() {
            self.show_empty();
        }
        Some(index)
    }

    fn show_empty(&mut self) {
        self.state = LoadState::Empty;
        self.background = Some(EMPTY_TEXT.to_string());
    }
}
