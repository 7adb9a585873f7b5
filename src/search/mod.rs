pub mod client;
pub mod filter;
pub mod orchestrator;
pub mod rental;
pub mod store;
pub mod traits;
pub mod types;
pub mod url_codec;
pub mod view;

pub use client::HttpSearchBackend;
pub use filter::{filter_by_availability, AvailabilityMode};
pub use orchestrator::{FetchOrchestrator, History, MemoryHistory};
pub use rental::rental_days;
pub use store::{Action, SearchState, SearchStore};
pub use traits::SearchBackend;
pub use types::{FetchStatus, FilterChange, SearchQuery, SearchResultSet, SortBy, Transmission};
pub use view::{Layout, Notice, View};
