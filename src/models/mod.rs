use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Location information for a listed vehicle
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Location {
    #[serde(deserialize_with = "lenient")]
    pub city: String,
    #[serde(deserialize_with = "lenient")]
    pub state: String,
    #[serde(deserialize_with = "lenient")]
    pub address: Option<String>,
    #[serde(alias = "lat", deserialize_with = "lenient")]
    pub latitude: Option<f64>,
    #[serde(alias = "lng", alias = "lon", deserialize_with = "lenient")]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Photo {
    #[serde(deserialize_with = "lenient")]
    pub url: String,
}

/// Availability flags the search endpoint attaches for the requested window
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Availability {
    #[serde(deserialize_with = "lenient_true")]
    pub is_fully_available: bool,
    #[serde(deserialize_with = "lenient")]
    pub is_partially_available: bool,
    #[serde(deserialize_with = "lenient")]
    pub unavailable_dates: Vec<String>,
}

impl Default for Availability {
    fn default() -> Self {
        Self {
            is_fully_available: true,
            is_partially_available: false,
            unavailable_dates: Vec::new(),
        }
    }
}

/// A vehicle as returned by the search endpoint.
///
/// The record is owned by the server; every field is optional on the wire and
/// anything this crate does not model is kept in `raw_data` untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Car {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(deserialize_with = "lenient")]
    pub make: String,
    #[serde(deserialize_with = "lenient")]
    pub model: String,
    #[serde(deserialize_with = "lenient")]
    pub year: Option<i32>,
    #[serde(deserialize_with = "lenient")]
    pub daily_rate: f64,
    #[serde(deserialize_with = "lenient")]
    pub location: Location,
    #[serde(deserialize_with = "lenient")]
    pub rating: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub photos: Vec<Photo>,
    #[serde(deserialize_with = "lenient")]
    pub availability: Option<Availability>,
    #[serde(deserialize_with = "lenient")]
    pub car_type: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub transmission: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub seats: Option<u8>,
    #[serde(deserialize_with = "lenient")]
    pub instant_book: bool,
    #[serde(deserialize_with = "lenient")]
    pub features: Vec<String>,
    #[serde(flatten)]
    pub raw_data: Map<String, Value>,
}

impl Car {
    /// "2022 Toyota Camry", skipping whatever is missing
    pub fn title(&self) -> String {
        let year = self.year.map(|y| y.to_string());
        [year.as_deref(), Some(self.make.as_str()), Some(self.model.as_str())]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.location.latitude, self.location.longitude) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => Some((lat, lng)),
            _ => None,
        }
    }

    pub fn is_fully_available(&self) -> bool {
        self.availability
            .as_ref()
            .map_or(true, |a| a.is_fully_available)
    }

    pub fn is_partially_available(&self) -> bool {
        self.availability
            .as_ref()
            .map_or(false, |a| a.is_partially_available && !a.is_fully_available)
    }

    pub fn hero_photo(&self) -> Option<&str> {
        self.photos
            .iter()
            .map(|p| p.url.as_str())
            .find(|url| !url.is_empty())
    }
}

/// Deserialize a field, falling back to its default on null or a type mismatch
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

fn lenient_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_bool().unwrap_or(true))
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_car_defaults_missing_and_malformed_fields() {
        let car: Car = serde_json::from_value(json!({
            "id": 42,
            "make": "Toyota",
            "model": null,
            "dailyRate": "not a number",
            "rating": 4.8,
            "photos": "oops",
            "hostName": "Sam"
        }))
        .unwrap();

        assert_eq!(car.id, "42");
        assert_eq!(car.make, "Toyota");
        assert_eq!(car.model, "");
        assert_eq!(car.daily_rate, 0.0);
        assert_eq!(car.rating, Some(4.8));
        assert!(car.photos.is_empty());
        assert_eq!(car.raw_data.get("hostName"), Some(&json!("Sam")));
    }

    #[test]
    fn test_car_without_availability_counts_as_fully_available() {
        let car = Car::default();
        assert!(car.is_fully_available());
        assert!(!car.is_partially_available());
    }

    #[test]
    fn test_partial_availability_excludes_fully_available() {
        let car: Car = serde_json::from_value(json!({
            "id": "a",
            "availability": { "isFullyAvailable": false, "isPartiallyAvailable": true }
        }))
        .unwrap();
        assert!(!car.is_fully_available());
        assert!(car.is_partially_available());
    }

    #[test]
    fn test_location_accepts_short_coordinate_keys() {
        let car: Car = serde_json::from_value(json!({
            "id": "a",
            "location": { "city": "Phoenix", "state": "AZ", "lat": 33.45, "lng": -112.07 }
        }))
        .unwrap();
        assert_eq!(car.coordinates(), Some((33.45, -112.07)));
    }

    #[test]
    fn test_title_skips_missing_parts() {
        let car = Car {
            make: "Tesla".to_string(),
            model: "Model 3".to_string(),
            ..Car::default()
        };
        assert_eq!(car.title(), "Tesla Model 3");

        let car = Car {
            year: Some(2023),
            ..car
        };
        assert_eq!(car.title(), "2023 Tesla Model 3");
    }
}
