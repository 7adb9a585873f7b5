use crate::models::Car;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Client-side availability projection over fetched results
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityMode {
    #[default]
    All,
    Available,
    Partial,
}

impl AvailabilityMode {
    /// Unrecognized modes mean no filtering
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "available" => AvailabilityMode::Available,
            "partial" => AvailabilityMode::Partial,
            _ => AvailabilityMode::All,
        }
    }

    pub fn matches(&self, car: &Car) -> bool {
        match self {
            AvailabilityMode::All => true,
            AvailabilityMode::Available => car.is_fully_available(),
            AvailabilityMode::Partial => car.is_partially_available(),
        }
    }
}

impl fmt::Display for AvailabilityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AvailabilityMode::All => "all",
            AvailabilityMode::Available => "available",
            AvailabilityMode::Partial => "partial",
        })
    }
}

/// Cars matching `mode`, in their original order
pub fn filter_by_availability(cars: &[Car], mode: AvailabilityMode) -> Vec<Car> {
    cars.iter().filter(|car| mode.matches(car)).cloned().collect()
}
