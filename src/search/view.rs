//! Pure composition of the search page over already-fetched state.

use crate::models::Car;
use crate::search::filter::filter_by_availability;
use crate::search::rental::{rental_days, trip_total};
use crate::search::store::SearchState;
use serde::Serialize;

/// Map center used for cars without coordinates (downtown Phoenix)
pub const FALLBACK_CENTER: (f64, f64) = (33.4484, -112.0740);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarCard {
    pub id: String,
    pub title: String,
    pub daily_rate: f64,
    pub trip_total: Option<f64>,
    pub rating: Option<f32>,
    pub photo: Option<String>,
    pub city: String,
    pub instant_book: bool,
}

impl CarCard {
    fn from_car(car: &Car, days: Option<u32>) -> Self {
        Self {
            id: car.id.clone(),
            title: car.title(),
            daily_rate: car.daily_rate,
            trip_total: days.map(|d| trip_total(car.daily_rate, d)),
            rating: car.rating,
            photo: car.hero_photo().map(str::to_string),
            city: car.location.city.clone(),
            instant_book: car.instant_book,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub car_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub price_label: String,
    /// Placed at the fallback center because the car has no coordinates
    pub approximate: bool,
}

impl MapMarker {
    fn from_car(car: &Car) -> Self {
        let (latitude, longitude, approximate) = match car.coordinates() {
            Some((lat, lng)) => (lat, lng, false),
            None => (FALLBACK_CENTER.0, FALLBACK_CENTER.1, true),
        };
        Self {
            car_id: car.id.clone(),
            latitude,
            longitude,
            price_label: format!("${:.0}", car.daily_rate),
            approximate,
        }
    }
}

/// Message shown instead of (or above) the result grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Notice {
    /// The page was opened for a car type with no vehicles
    NoResultsForType(String),
    /// Nothing to show; a failed fetch looks the same
    NoCarsFound,
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::NoResultsForType(message) => message.as_str(),
            Notice::NoCarsFound => "No cars found",
        }
    }

    pub fn action(&self) -> Option<&'static str> {
        match self {
            Notice::NoResultsForType(_) => None,
            Notice::NoCarsFound => Some("Clear Filters"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListView {
    pub searched_city: Option<String>,
    pub in_city: Vec<CarCard>,
    pub nearby: Vec<CarCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub sidebar: Vec<CarCard>,
    pub markers: Vec<MapMarker>,
    pub center: (f64, f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Layout {
    List(ListView),
    Map(MapView),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    pub show_search_widget: bool,
    pub loading: bool,
    pub total_count: u64,
    pub rental_days: Option<u32>,
    pub notice: Option<Notice>,
    pub layout: Layout,
}

impl View {
    /// Car ids in display order, whichever layout is active
    pub fn car_ids(&self) -> Vec<&str> {
        match &self.layout {
            Layout::List(list) => list
                .in_city
                .iter()
                .chain(&list.nearby)
                .map(|c| c.id.as_str())
                .collect(),
            Layout::Map(map) => map.sidebar.iter().map(|c| c.id.as_str()).collect(),
        }
    }
}

/// The availability-filtered cars, split into in-city and nearby.
/// Falls back to the flat result list when the server did not group.
fn grouped_cars(state: &SearchState) -> (Vec<Car>, Vec<Car>) {
    let results = &state.results;
    if results.cars_in_city.is_empty() && results.nearby_cars.is_empty() {
        (filter_by_availability(&results.cars, state.availability), Vec::new())
    } else {
        (
            filter_by_availability(&results.cars_in_city, state.availability),
            filter_by_availability(&results.nearby_cars, state.availability),
        )
    }
}

pub fn compose(state: &SearchState) -> View {
    let days = rental_days(&state.query);
    let (in_city, nearby) = grouped_cars(state);
    let nothing_visible = in_city.is_empty() && nearby.is_empty();

    let notice = match &state.banner {
        Some(banner) => Some(Notice::NoResultsForType(banner.message())),
        None if nothing_visible && !state.is_loading() => Some(Notice::NoCarsFound),
        None => None,
    };

    let layout = if state.map_view {
        let cars: Vec<&Car> = in_city.iter().chain(&nearby).collect();
        let markers: Vec<MapMarker> = cars.iter().map(|car| MapMarker::from_car(car)).collect();
        Layout::Map(MapView {
            sidebar: cars.iter().map(|car| CarCard::from_car(car, days)).collect(),
            center: map_center(&markers),
            markers,
        })
    } else {
        Layout::List(ListView {
            searched_city: state.results.searched_city.clone(),
            in_city: in_city.iter().map(|car| CarCard::from_car(car, days)).collect(),
            nearby: nearby.iter().map(|car| CarCard::from_car(car, days)).collect(),
        })
    };

    View {
        show_search_widget: state.show_search_widget(),
        loading: state.is_loading(),
        total_count: state.results.total_count,
        rental_days: days,
        notice,
        layout,
    }
}

fn map_center(markers: &[MapMarker]) -> (f64, f64) {
    let placed: Vec<&MapMarker> = markers.iter().filter(|m| !m.approximate).collect();
    if placed.is_empty() {
        return FALLBACK_CENTER;
    }
    let n = placed.len() as f64;
    let lat = placed.iter().map(|m| m.latitude).sum::<f64>() / n;
    let lng = placed.iter().map(|m| m.longitude).sum::<f64>() / n;
    (lat, lng)
}
