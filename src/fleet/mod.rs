pub mod client;
pub mod types;

pub use client::FleetClient;
pub use types::{ActionOutcome, FundsRequest, LandingPageContent};
