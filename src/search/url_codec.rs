//! Query-string codec for the search page.
//!
//! The URL is the only durable copy of the guest's filter state, so `encode`
//! drops every parameter sitting at its default and `decode` tolerates
//! anything a hand-edited or stale link may carry.

use crate::search::types::{SearchQuery, SortBy, Transmission};
use chrono::{NaiveDate, NaiveTime};
use url::form_urlencoded;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// Build a `SearchQuery` from a browser query string (with or without `?`)
pub fn decode(query_string: &str) -> SearchQuery {
    let raw = query_string.trim().trim_start_matches('?');
    let mut query = SearchQuery::default();

    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        match &*key {
            "location" => query.location = value.into_owned(),
            "pickupDate" => query.pickup_date = parse_date(&value),
            "returnDate" => query.return_date = parse_date(&value),
            "pickupTime" => {
                if let Some(time) = parse_time(&value) {
                    query.pickup_time = time;
                }
            }
            "returnTime" => {
                if let Some(time) = parse_time(&value) {
                    query.return_time = time;
                }
            }
            "sortBy" => query.sort_by = SortBy::parse(&value),
            "carType" => query.car_type = split_list(&value),
            "priceMin" => query.price_min = value.trim().parse().unwrap_or(0),
            "priceMax" => query.price_max = value.trim().parse().ok(),
            "features" => query.features = split_list(&value),
            "instantBook" => {
                query.instant_book = matches!(value.trim(), "true" | "1");
            }
            "transmission" => query.transmission = Transmission::parse(&value),
            "seats" => query.seats = value.trim().parse().ok().filter(|s: &u8| *s > 0),
            "delivery" => query.delivery = split_list(&value),
            _ => {}
        }
    }

    query
}

/// Serialize for the browser URL, omitting defaults
pub fn encode(query: &SearchQuery) -> String {
    write(query, false)
}

/// Serialize for the search endpoint: sort, price floor and times are
/// always sent so the server never applies its own defaults.
pub fn encode_for_api(query: &SearchQuery) -> String {
    write(query, true)
}

fn write(query: &SearchQuery, full: bool) -> String {
    let defaults = SearchQuery::default();
    let mut out = form_urlencoded::Serializer::new(String::new());

    if !query.location.is_empty() {
        out.append_pair("location", &query.location);
    }
    if let Some(date) = query.pickup_date {
        out.append_pair("pickupDate", &date.format(DATE_FORMAT).to_string());
    }
    if let Some(date) = query.return_date {
        out.append_pair("returnDate", &date.format(DATE_FORMAT).to_string());
    }
    if full || query.pickup_time != defaults.pickup_time {
        out.append_pair("pickupTime", &query.pickup_time.format(TIME_FORMAT).to_string());
    }
    if full || query.return_time != defaults.return_time {
        out.append_pair("returnTime", &query.return_time.format(TIME_FORMAT).to_string());
    }
    if full || query.sort_by != SortBy::Recommended {
        out.append_pair("sortBy", query.sort_by.as_str());
    }
    if !query.car_type.is_empty() {
        out.append_pair("carType", &join_list(&query.car_type));
    }
    if full || query.price_min != 0 {
        out.append_pair("priceMin", &query.price_min.to_string());
    }
    if let Some(max) = query.price_max {
        out.append_pair("priceMax", &max.to_string());
    }
    if !query.features.is_empty() {
        out.append_pair("features", &join_list(&query.features));
    }
    if query.instant_book {
        out.append_pair("instantBook", "true");
    }
    if let Some(transmission) = query.transmission {
        out.append_pair("transmission", transmission.as_str());
    }
    if let Some(seats) = query.seats {
        out.append_pair("seats", &seats.to_string());
    }
    if !query.delivery.is_empty() {
        out.append_pair("delivery", &join_list(&query.delivery));
    }

    out.finish()
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT).ok()
}

fn split_list(value: &str) -> Vec<String> {
    SearchQuery::normalize_values(value.split(','))
}

fn join_list(values: &[String]) -> String {
    SearchQuery::normalize_values(values).join(",")
}
