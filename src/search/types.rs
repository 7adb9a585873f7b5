use crate::models::{lenient, Car};
use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Pickup and return time used when the URL does not carry one
pub fn default_time() -> NaiveTime {
    NaiveTime::from_hms_opt(10, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Result ordering requested from the search endpoint
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Recommended,
    PriceLow,
    PriceHigh,
    Rating,
    Distance,
    Newest,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Recommended => "recommended",
            SortBy::PriceLow => "price_low",
            SortBy::PriceHigh => "price_high",
            SortBy::Rating => "rating",
            SortBy::Distance => "distance",
            SortBy::Newest => "newest",
        }
    }

    /// Unknown values fall back to `Recommended`
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "price_low" => SortBy::PriceLow,
            "price_high" => SortBy::PriceHigh,
            "rating" => SortBy::Rating,
            "distance" => SortBy::Distance,
            "newest" => SortBy::Newest,
            _ => SortBy::Recommended,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Transmission {
    Automatic,
    Manual,
}

impl Transmission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transmission::Automatic => "automatic",
            Transmission::Manual => "manual",
        }
    }

    /// `any` and unknown values mean no constraint
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "automatic" => Some(Transmission::Automatic),
            "manual" => Some(Transmission::Manual),
            _ => None,
        }
    }
}

/// Filter and sort state of the guest search page.
///
/// Multi-value fields hold normalized entries: trimmed, lowercase, no commas,
/// no duplicates, first-seen order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub location: String,
    pub pickup_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    pub pickup_time: NaiveTime,
    pub return_time: NaiveTime,
    pub sort_by: SortBy,
    pub car_type: Vec<String>,
    pub price_min: u32,
    pub price_max: Option<u32>,
    pub features: Vec<String>,
    pub instant_book: bool,
    pub transmission: Option<Transmission>,
    pub seats: Option<u8>,
    pub delivery: Vec<String>,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            location: String::new(),
            pickup_date: None,
            return_date: None,
            pickup_time: default_time(),
            return_time: default_time(),
            sort_by: SortBy::Recommended,
            car_type: Vec::new(),
            price_min: 0,
            price_max: None,
            features: Vec::new(),
            instant_book: false,
            transmission: None,
            seats: None,
            delivery: Vec::new(),
        }
    }
}

impl SearchQuery {
    /// Normalize a multi-value list the way the URL codec stores it
    pub fn normalize_values<I, S>(values: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for value in values {
            let value = value.as_ref().replace(',', " ").trim().to_lowercase();
            if !value.is_empty() && !out.contains(&value) {
                out.push(value);
            }
        }
        out
    }

    /// True when every filter (not location, dates or sort) is at its default
    pub fn has_no_filters(&self) -> bool {
        let defaults = SearchQuery::default();
        self.car_type.is_empty()
            && self.price_min == defaults.price_min
            && self.price_max.is_none()
            && self.features.is_empty()
            && !self.instant_book
            && self.transmission.is_none()
            && self.seats.is_none()
            && self.delivery.is_empty()
    }
}

/// One filter interaction on the search page
#[derive(Debug, Clone, PartialEq)]
pub enum FilterChange {
    Location(String),
    Dates {
        pickup: Option<NaiveDate>,
        return_date: Option<NaiveDate>,
    },
    Times {
        pickup: NaiveTime,
        return_time: NaiveTime,
    },
    Sort(SortBy),
    ToggleCarType(String),
    PriceRange { min: u32, max: Option<u32> },
    ToggleFeature(String),
    InstantBook(bool),
    Transmission(Option<Transmission>),
    Seats(Option<u8>),
    ToggleDelivery(String),
    /// Reset filters, keeping location, dates and times
    ClearFilters,
}

impl FilterChange {
    pub fn apply(self, query: &mut SearchQuery) {
        match self {
            FilterChange::Location(location) => query.location = location.trim().to_string(),
            FilterChange::Dates {
                pickup,
                return_date,
            } => {
                query.pickup_date = pickup;
                query.return_date = return_date;
            }
            FilterChange::Times {
                pickup,
                return_time,
            } => {
                query.pickup_time = whole_minutes(pickup);
                query.return_time = whole_minutes(return_time);
            }
            FilterChange::Sort(sort) => query.sort_by = sort,
            FilterChange::ToggleCarType(value) => toggle(&mut query.car_type, &value),
            FilterChange::PriceRange { min, max } => {
                query.price_min = min;
                query.price_max = max.map(|max| max.max(min));
            }
            FilterChange::ToggleFeature(value) => toggle(&mut query.features, &value),
            FilterChange::InstantBook(on) => query.instant_book = on,
            FilterChange::Transmission(t) => query.transmission = t,
            FilterChange::Seats(seats) => query.seats = seats.filter(|s| *s > 0),
            FilterChange::ToggleDelivery(value) => toggle(&mut query.delivery, &value),
            FilterChange::ClearFilters => {
                *query = SearchQuery {
                    location: std::mem::take(&mut query.location),
                    pickup_date: query.pickup_date,
                    return_date: query.return_date,
                    pickup_time: query.pickup_time,
                    return_time: query.return_time,
                    ..SearchQuery::default()
                };
            }
        }
    }
}

/// The URL carries `HH:MM`, so state never holds finer precision
fn whole_minutes(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

fn toggle(values: &mut Vec<String>, value: &str) {
    let Some(value) = SearchQuery::normalize_values([value]).pop() else {
        return;
    };
    if let Some(pos) = values.iter().position(|v| *v == value) {
        values.remove(pos);
    } else {
        values.push(value);
    }
}

/// Results of one applied search, replaced wholesale on every fetch
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultSet {
    pub cars: Vec<Car>,
    pub cars_in_city: Vec<Car>,
    pub nearby_cars: Vec<Car>,
    pub total_count: u64,
    pub searched_city: Option<String>,
    pub metadata: Value,
}

impl SearchResultSet {
    pub fn is_empty(&self) -> bool {
        self.cars.is_empty() && self.cars_in_city.is_empty() && self.nearby_cars.is_empty()
    }
}

/// Body of `GET /api/rentals/search`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchResponse {
    #[serde(deserialize_with = "lenient")]
    pub success: bool,
    #[serde(deserialize_with = "lenient")]
    pub results: Vec<Car>,
    #[serde(deserialize_with = "lenient")]
    pub cars_in_city: Vec<Car>,
    #[serde(deserialize_with = "lenient")]
    pub nearby_cars: Vec<Car>,
    #[serde(deserialize_with = "lenient")]
    pub searched_city: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub total: u64,
    pub metadata: Value,
    #[serde(deserialize_with = "lenient")]
    pub error: Option<String>,
}

impl From<SearchResponse> for SearchResultSet {
    fn from(response: SearchResponse) -> Self {
        let total_count = if response.total > 0 {
            response.total
        } else {
            response.results.len() as u64
        };
        Self {
            cars: response.results,
            cars_in_city: response.cars_in_city,
            nearby_cars: response.nearby_cars,
            total_count,
            searched_city: response.searched_city.filter(|c| !c.is_empty()),
            metadata: response.metadata,
        }
    }
}

/// Fetch lifecycle of the search page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FetchStatus::Idle => "idle",
            FetchStatus::Loading => "loading",
            FetchStatus::Success => "success",
            FetchStatus::Error => "error",
        };
        f.write_str(label)
    }
}
