//! Single source of truth for the search page.
//!
//! Every transition goes through [`reduce`], which is also the only place
//! that decides whether a fetch is issued and whether the URL is rewritten.
//! Fetches are stamped with a generation; a response for anything but the
//! latest generation is dropped.

use crate::search::filter::AvailabilityMode;
use crate::search::types::{FetchStatus, FilterChange, SearchQuery, SearchResultSet};
use crate::search::url_codec;
use tracing::debug;

/// Shown when the page was opened for a car type that has no vehicles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoResultsForType {
    pub car_types: Vec<String>,
}

impl NoResultsForType {
    pub fn message(&self) -> String {
        let labels: Vec<String> = self.car_types.iter().map(|t| car_type_label(t)).collect();
        format!("No {} vehicles available", labels.join(" or "))
    }
}

fn car_type_label(car_type: &str) -> String {
    match car_type {
        "suv" => "SUV".to_string(),
        "ev" => "EV".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}

/// What caused a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOrigin {
    /// First load with no server-rendered results
    Hydrate,
    Filter,
    Navigation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub generation: u64,
    pub origin: FetchOrigin,
    pub query: SearchQuery,
}

/// Side effects the owner of the store must carry out
#[derive(Debug, Default, PartialEq)]
pub struct Effects {
    pub fetch: Option<FetchRequest>,
    /// Non-navigating history replace with this query string
    pub replace_url: Option<String>,
}

impl Effects {
    pub fn is_empty(&self) -> bool {
        self.fetch.is_none() && self.replace_url.is_none()
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    /// Page mount; `initial` is server-rendered data trusted without refetch
    Hydrate {
        query_string: String,
        initial: Option<SearchResultSet>,
    },
    /// Browser navigation changed the query string
    UrlChanged(String),
    Filter(FilterChange),
    SetAvailability(AvailabilityMode),
    ToggleMapView,
    FetchSucceeded {
        generation: u64,
        results: SearchResultSet,
    },
    FetchFailed {
        generation: u64,
        reason: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub query: SearchQuery,
    pub results: SearchResultSet,
    pub status: FetchStatus,
    pub availability: AvailabilityMode,
    pub map_view: bool,
    pub banner: Option<NoResultsForType>,
    /// Query string the URL currently holds
    pub url: String,
    /// Latest issued fetch generation
    pub generation: u64,
    pub hydrated: bool,
    in_flight: Option<FetchOrigin>,
}

impl SearchState {
    pub fn is_loading(&self) -> bool {
        self.status == FetchStatus::Loading
    }

    /// Search widget is hidden in map view to free vertical space
    pub fn show_search_widget(&self) -> bool {
        !self.map_view
    }
}

pub fn reduce(state: &mut SearchState, action: Action) -> Effects {
    match action {
        Action::Hydrate {
            query_string,
            initial,
        } => hydrate(state, &query_string, initial),
        Action::UrlChanged(query_string) => {
            if !state.hydrated {
                return hydrate(state, &query_string, None);
            }
            let query = url_codec::decode(&query_string);
            if query == state.query {
                debug!("URL change matches current filters, nothing to do");
                return Effects {
                    fetch: None,
                    replace_url: canonical_rewrite(&query_string, &state.url),
                };
            }
            state.query = query;
            state.url = url_codec::encode(&state.query);
            Effects {
                fetch: Some(issue_fetch(state, FetchOrigin::Navigation)),
                replace_url: canonical_rewrite(&query_string, &state.url),
            }
        }
        Action::Filter(change) => {
            state.hydrated = true;
            state.banner = None;
            let mut query = state.query.clone();
            change.apply(&mut query);
            if query == state.query {
                return Effects::default();
            }
            state.query = query;
            state.url = url_codec::encode(&state.query);
            Effects {
                fetch: Some(issue_fetch(state, FetchOrigin::Filter)),
                replace_url: Some(state.url.clone()),
            }
        }
        Action::SetAvailability(mode) => {
            state.availability = mode;
            Effects::default()
        }
        Action::ToggleMapView => {
            state.map_view = !state.map_view;
            Effects::default()
        }
        Action::FetchSucceeded {
            generation,
            results,
        } => {
            if generation != state.generation {
                debug!(generation, latest = state.generation, "dropping stale search response");
                return Effects::default();
            }
            let origin = state.in_flight.take();
            state.banner = match origin {
                Some(FetchOrigin::Hydrate) => type_banner(&state.query, &results),
                _ => None,
            };
            state.results = results;
            state.status = FetchStatus::Success;
            Effects::default()
        }
        Action::FetchFailed { generation, reason } => {
            if generation != state.generation {
                debug!(generation, latest = state.generation, %reason, "dropping stale search failure");
                return Effects::default();
            }
            state.in_flight = None;
            state.results = SearchResultSet::default();
            state.status = FetchStatus::Error;
            Effects::default()
        }
    }
}

fn hydrate(state: &mut SearchState, query_string: &str, initial: Option<SearchResultSet>) -> Effects {
    state.query = url_codec::decode(query_string);
    state.url = url_codec::encode(&state.query);
    state.hydrated = true;
    let replace_url = canonical_rewrite(query_string, &state.url);

    match initial {
        Some(results) => {
            state.banner = type_banner(&state.query, &results);
            state.results = results;
            state.status = FetchStatus::Success;
            Effects {
                fetch: None,
                replace_url,
            }
        }
        None => Effects {
            fetch: Some(issue_fetch(state, FetchOrigin::Hydrate)),
            replace_url,
        },
    }
}

fn issue_fetch(state: &mut SearchState, origin: FetchOrigin) -> FetchRequest {
    state.generation += 1;
    state.status = FetchStatus::Loading;
    state.in_flight = Some(origin);
    FetchRequest {
        generation: state.generation,
        origin,
        query: state.query.clone(),
    }
}

fn type_banner(query: &SearchQuery, results: &SearchResultSet) -> Option<NoResultsForType> {
    (!query.car_type.is_empty() && results.is_empty()).then(|| NoResultsForType {
        car_types: query.car_type.clone(),
    })
}

/// Rewrite only when the incoming URL is not already in canonical form
fn canonical_rewrite(incoming: &str, canonical: &str) -> Option<String> {
    let incoming = incoming.trim().trim_start_matches('?');
    (incoming != canonical).then(|| canonical.to_string())
}

/// Owns a [`SearchState`] and funnels every change through [`reduce`]
#[derive(Debug, Default)]
pub struct SearchStore {
    state: SearchState,
}

impl SearchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&mut self, action: Action) -> Effects {
        reduce(&mut self.state, action)
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Car;
    use crate::search::types::SortBy;
    use chrono::NaiveTime;

    fn cars(n: usize) -> SearchResultSet {
        let cars: Vec<Car> = (0..n)
            .map(|i| Car {
                id: format!("car-{i}"),
                ..Car::default()
            })
            .collect();
        SearchResultSet {
            total_count: cars.len() as u64,
            cars,
            ..SearchResultSet::default()
        }
    }

    #[test]
    fn test_hydrate_with_initial_data_skips_fetch() {
        let mut store = SearchStore::new();
        let effects = store.dispatch(Action::Hydrate {
            query_string: "location=Phoenix".to_string(),
            initial: Some(cars(2)),
        });
        assert!(effects.is_empty());
        assert_eq!(store.state().status, FetchStatus::Success);
        assert_eq!(store.state().results.cars.len(), 2);
        assert_eq!(store.state().generation, 0);
    }

    #[test]
    fn test_hydrate_without_initial_data_fetches() {
        let mut store = SearchStore::new();
        let effects = store.dispatch(Action::Hydrate {
            query_string: "?location=Phoenix&sortBy=rating".to_string(),
            initial: None,
        });
        let fetch = effects.fetch.expect("fetch issued");
        assert_eq!(fetch.generation, 1);
        assert_eq!(fetch.origin, FetchOrigin::Hydrate);
        assert_eq!(fetch.query.sort_by, SortBy::Rating);
        assert!(effects.replace_url.is_none());
        assert!(store.state().is_loading());
    }

    #[test]
    fn test_hydrate_rewrites_non_canonical_url() {
        let mut store = SearchStore::new();
        let effects = store.dispatch(Action::Hydrate {
            query_string: "sortBy=recommended&location=Mesa&priceMin=0".to_string(),
            initial: Some(cars(1)),
        });
        assert_eq!(effects.replace_url.as_deref(), Some("location=Mesa"));
    }

    #[test]
    fn test_filter_change_rewrites_url_and_fetches() {
        let mut store = SearchStore::new();
        store.dispatch(Action::Hydrate {
            query_string: "location=Phoenix".to_string(),
            initial: Some(cars(3)),
        });
        let effects = store.dispatch(Action::Filter(FilterChange::InstantBook(true)));
        assert_eq!(
            effects.replace_url.as_deref(),
            Some("location=Phoenix&instantBook=true")
        );
        assert_eq!(effects.fetch.map(|f| f.origin), Some(FetchOrigin::Filter));
        assert_eq!(store.state().url, "location=Phoenix&instantBook=true");
    }

    #[test]
    fn test_noop_filter_change_issues_nothing() {
        let mut store = SearchStore::new();
        store.dispatch(Action::Hydrate {
            query_string: "location=Phoenix".to_string(),
            initial: Some(cars(3)),
        });
        let effects = store.dispatch(Action::Filter(FilterChange::Sort(SortBy::Recommended)));
        assert!(effects.is_empty());
    }

    #[test]
    fn test_url_change_matching_state_does_not_refetch() {
        let mut store = SearchStore::new();
        store.dispatch(Action::Hydrate {
            query_string: String::new(),
            initial: Some(cars(3)),
        });
        let effects = store.dispatch(Action::Filter(FilterChange::Location("Tempe".to_string())));
        let url = effects.replace_url.expect("url rewritten");

        // the history replace echoes back as a URL change
        let echo = store.dispatch(Action::UrlChanged(url));
        assert!(echo.is_empty());
    }

    #[test]
    fn test_time_with_seconds_echo_does_not_refetch() {
        let mut store = SearchStore::new();
        store.dispatch(Action::Hydrate {
            query_string: "location=Phoenix".to_string(),
            initial: Some(cars(3)),
        });
        let effects = store.dispatch(Action::Filter(FilterChange::Times {
            pickup: NaiveTime::from_hms_opt(9, 30, 15).unwrap(),
            return_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        }));
        let url = effects.replace_url.expect("url rewritten");
        assert_eq!(url, "location=Phoenix&pickupTime=09%3A30");
        assert_eq!(url_codec::decode(&url), store.state().query);

        let echo = store.dispatch(Action::UrlChanged(url));
        assert!(echo.is_empty());
        assert_eq!(store.state().generation, 1);
    }

    #[test]
    fn test_equivalent_url_change_is_canonicalized_without_fetch() {
        let mut store = SearchStore::new();
        store.dispatch(Action::Hydrate {
            query_string: "location=Phoenix".to_string(),
            initial: Some(cars(3)),
        });
        let effects = store.dispatch(Action::UrlChanged(
            "location=Phoenix&sortBy=recommended".to_string(),
        ));
        assert!(effects.fetch.is_none());
        assert_eq!(effects.replace_url.as_deref(), Some("location=Phoenix"));
        assert_eq!(store.state().url, "location=Phoenix");
    }

    #[test]
    fn test_external_url_change_refetches() {
        let mut store = SearchStore::new();
        store.dispatch(Action::Hydrate {
            query_string: "location=Phoenix".to_string(),
            initial: Some(cars(3)),
        });
        let effects = store.dispatch(Action::UrlChanged("location=Tucson".to_string()));
        assert_eq!(effects.fetch.map(|f| f.origin), Some(FetchOrigin::Navigation));
        assert_eq!(store.state().query.location, "Tucson");
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut store = SearchStore::new();
        store.dispatch(Action::Hydrate {
            query_string: String::new(),
            initial: Some(cars(0)),
        });
        store.dispatch(Action::Filter(FilterChange::Location("Mesa".to_string())));
        store.dispatch(Action::Filter(FilterChange::Location("Tempe".to_string())));
        assert_eq!(store.state().generation, 2);

        store.dispatch(Action::FetchSucceeded {
            generation: 2,
            results: cars(4),
        });
        store.dispatch(Action::FetchSucceeded {
            generation: 1,
            results: cars(9),
        });
        assert_eq!(store.state().results.cars.len(), 4);
        assert_eq!(store.state().status, FetchStatus::Success);
    }

    #[test]
    fn test_failure_clears_results() {
        let mut store = SearchStore::new();
        store.dispatch(Action::Hydrate {
            query_string: String::new(),
            initial: Some(cars(5)),
        });
        let fetch = store
            .dispatch(Action::Filter(FilterChange::Seats(Some(7))))
            .fetch
            .unwrap();
        store.dispatch(Action::FetchFailed {
            generation: fetch.generation,
            reason: "connection refused".to_string(),
        });
        let state = store.state();
        assert_eq!(state.status, FetchStatus::Error);
        assert!(state.results.is_empty());
        assert_eq!(state.results.total_count, 0);
    }

    #[test]
    fn test_type_banner_raised_at_load_and_cleared_by_filter() {
        let mut store = SearchStore::new();
        store.dispatch(Action::Hydrate {
            query_string: "location=Phoenix&carType=suv".to_string(),
            initial: Some(cars(0)),
        });
        let banner = store.state().banner.clone().expect("banner raised");
        assert_eq!(banner.message(), "No SUV vehicles available");

        store.dispatch(Action::Filter(FilterChange::PriceRange {
            min: 0,
            max: Some(300),
        }));
        assert!(store.state().banner.is_none());
    }

    #[test]
    fn test_type_banner_from_first_fetch() {
        let mut store = SearchStore::new();
        let fetch = store
            .dispatch(Action::Hydrate {
                query_string: "carType=convertible".to_string(),
                initial: None,
            })
            .fetch
            .unwrap();
        store.dispatch(Action::FetchSucceeded {
            generation: fetch.generation,
            results: cars(0),
        });
        assert_eq!(
            store.state().banner.as_ref().map(|b| b.message()),
            Some("No Convertible vehicles available".to_string())
        );
    }

    #[test]
    fn test_view_toggle_and_availability_are_local() {
        let mut store = SearchStore::new();
        store.dispatch(Action::Hydrate {
            query_string: String::new(),
            initial: Some(cars(2)),
        });
        assert!(store.dispatch(Action::ToggleMapView).is_empty());
        assert!(!store.state().show_search_widget());
        assert!(store
            .dispatch(Action::SetAvailability(AvailabilityMode::Partial))
            .is_empty());
        assert_eq!(store.state().generation, 0);
    }
}
