use crate::models::lenient;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body sent with charge and hold requests
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FundsRequest {
    pub amount: f64,
    pub reason: String,
}

impl FundsRequest {
    /// Amounts must be positive and finite; they are rounded to cents
    pub fn new(amount: f64, reason: &str) -> Result<Self> {
        if !amount.is_finite() || amount <= 0.0 {
            bail!("Amount must be a positive number, got {amount}");
        }
        let amount = (amount * 100.0).round() / 100.0;
        if amount == 0.0 {
            bail!("Amount rounds to zero");
        }
        let reason = reason.trim();
        if reason.is_empty() {
            bail!("A reason is required");
        }
        Ok(Self {
            amount,
            reason: reason.to_string(),
        })
    }
}

/// Content of a partner's public landing page
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct LandingPageContent {
    pub headline: String,
    pub subheadline: Option<String>,
    pub about: Option<String>,
    pub hero_image_url: Option<String>,
    pub published: bool,
}

/// Reply shape shared by the admin endpoints
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ActionOutcome {
    #[serde(deserialize_with = "lenient")]
    pub success: bool,
    #[serde(deserialize_with = "lenient")]
    pub message: Option<String>,
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub data: Value,
}
