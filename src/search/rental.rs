use crate::search::types::SearchQuery;

/// Billable days between the pickup and return dates.
///
/// Counts calendar days only; pickup and return times never add a day.
/// Returns `None` until both dates are set, or when return precedes pickup.
/// A same-day trip still bills one day.
pub fn rental_days(query: &SearchQuery) -> Option<u32> {
    let days = (query.return_date? - query.pickup_date?).num_days();
    if days < 0 {
        return None;
    }
    u32::try_from(days.max(1)).ok()
}

/// Trip total for a daily rate, rounded to cents
pub fn trip_total(daily_rate: f64, days: u32) -> f64 {
    (daily_rate * f64::from(days) * 100.0).round() / 100.0
}
