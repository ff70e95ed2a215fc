//! Chapa payment gateway client.
//!
//! Wraps the two remote operations the payment flow needs: transaction
//! initialization and transaction verification. Both carry the bearer
//! secret and run under a bounded timeout.

use crate::config::ChapaConfig;
use crate::error::AppError;
use reqwest::Client;
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Chapa client for the transaction initialize/verify API.
#[derive(Clone)]
pub struct ChapaClient {
    client: Client,
    config: ChapaConfig,
}

/// Request body for `POST /transaction/initialize`.
#[derive(Debug, Serialize)]
pub struct InitializeRequest {
    pub amount: Decimal,
    pub currency: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub tx_ref: String,
    pub callback_url: String,
    pub return_url: String,
    pub customization: Customization,
}

/// Checkout page customization.
#[derive(Debug, Serialize)]
pub struct Customization {
    pub title: String,
    pub description: String,
}

/// Chapa response envelope. Every endpoint wraps its payload like this.
/// A missing or null `status` is kept as empty so the fail-closed status
/// mapping downstream treats it as failed.
#[derive(Debug, Deserialize)]
pub struct ChapaEnvelope<T> {
    #[serde(default)]
    pub status: Option<String>,
    pub message: Option<String>,
    pub data: Option<T>,
}

/// Payload of a successful initialization.
#[derive(Debug, Deserialize)]
pub struct InitializeData {
    pub checkout_url: String,
    /// Chapa echoes the tx_ref back; absent on some API versions.
    pub tx_ref: Option<String>,
}

/// Outcome of a verification call.
#[derive(Debug)]
pub struct VerifyOutcome {
    /// Raw remote status string ("success", "pending", "failed", ...).
    pub remote_status: String,
}

impl ChapaClient {
    /// Create a new Chapa client with a bounded request timeout.
    pub fn new(config: ChapaConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Config(anyhow::anyhow!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Check that a secret key is configured.
    pub fn is_configured(&self) -> bool {
        !self.config.secret_key.expose_secret().is_empty()
    }

    /// Initialize a transaction with Chapa and obtain a checkout URL.
    pub async fn initialize(
        &self,
        request: &InitializeRequest,
    ) -> Result<InitializeData, AppError> {
        let url = format!("{}/transaction/initialize", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.config.secret_key.expose_secret())
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::Gateway(format!("Chapa initialize request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Gateway(format!("Chapa initialize response unreadable: {}", e)))?;

        tracing::debug!(status = %status, body = %body, "Chapa initialize response");

        if !status.is_success() {
            tracing::error!(
                status = %status,
                tx_ref = %request.tx_ref,
                "Chapa transaction initialization failed"
            );
            return Err(AppError::Gateway(format!(
                "Failed to initiate payment with Chapa: {} - {}",
                status, body
            )));
        }

        let envelope: ChapaEnvelope<InitializeData> = serde_json::from_str(&body)
            .map_err(|e| anyhow::anyhow!("Unexpected Chapa initialize payload: {}", e))?;

        let data = envelope
            .data
            .ok_or_else(|| anyhow::anyhow!("Chapa initialize response carried no data"))?;

        tracing::info!(
            tx_ref = %request.tx_ref,
            checkout_url = %data.checkout_url,
            "Chapa transaction initialized"
        );

        Ok(data)
    }

    /// Verify a transaction and return its remote status string.
    pub async fn verify(&self, transaction_id: &str) -> Result<VerifyOutcome, AppError> {
        let url = format!(
            "{}/transaction/verify/{}",
            self.config.api_base_url, transaction_id
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(self.config.secret_key.expose_secret())
            .send()
            .await
            .map_err(|e| AppError::Gateway(format!("Chapa verify request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Gateway(format!("Chapa verify response unreadable: {}", e)))?;

        tracing::debug!(status = %status, body = %body, "Chapa verify response");

        if !status.is_success() {
            tracing::error!(
                status = %status,
                transaction_id = %transaction_id,
                "Chapa transaction verification failed"
            );
            return Err(AppError::Gateway(format!(
                "Failed to verify payment with Chapa: {} - {}",
                status, body
            )));
        }

        let envelope: ChapaEnvelope<serde_json::Value> = serde_json::from_str(&body)
            .map_err(|e| anyhow::anyhow!("Unexpected Chapa verify payload: {}", e))?;

        Ok(VerifyOutcome {
            remote_status: envelope.status.unwrap_or_default().to_lowercase(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn initialize_request_serializes_chapa_field_names() {
        let request = InitializeRequest {
            amount: dec!(120.00),
            currency: "ETB".to_string(),
            email: "jane@x.com".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            phone_number: "".to_string(),
            tx_ref: "booking_7_Jane_Doe".to_string(),
            callback_url: "http://localhost:3006/payments/verify/".to_string(),
            return_url: "http://localhost:3006/payments/success/".to_string(),
            customization: Customization {
                title: "Travel Booking Payment".to_string(),
                description: "Payment for booking: Lakeside Villa".to_string(),
            },
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["email"], "jane@x.com");
        assert_eq!(value["phone_number"], "");
        assert_eq!(value["tx_ref"], "booking_7_Jane_Doe");
        assert_eq!(value["customization"]["title"], "Travel Booking Payment");
        assert_eq!(value["amount"], serde_json::json!("120.00"));
    }

    #[test]
    fn envelope_parses_initialize_data() {
        let body = r#"{
            "status": "success",
            "message": "Hosted Link",
            "data": {
                "checkout_url": "https://checkout.chapa.co/checkout/payment/x",
                "tx_ref": "abc123"
            }
        }"#;

        let envelope: ChapaEnvelope<InitializeData> = serde_json::from_str(body).unwrap();
        let data = envelope.data.unwrap();
        assert_eq!(data.checkout_url, "https://checkout.chapa.co/checkout/payment/x");
        assert_eq!(data.tx_ref.as_deref(), Some("abc123"));
    }

    #[test]
    fn envelope_tolerates_missing_status() {
        let body = r#"{ "message": "ok", "data": null }"#;
        let envelope: ChapaEnvelope<serde_json::Value> = serde_json::from_str(body).unwrap();
        assert!(envelope.status.is_none());

        let body = r#"{ "status": null, "message": "ok", "data": null }"#;
        let envelope: ChapaEnvelope<serde_json::Value> = serde_json::from_str(body).unwrap();
        assert!(envelope.status.is_none());
    }

    #[test]
    fn envelope_tolerates_missing_tx_ref() {
        let body = r#"{
            "status": "success",
            "message": null,
            "data": { "checkout_url": "https://pay/x" }
        }"#;

        let envelope: ChapaEnvelope<InitializeData> = serde_json::from_str(body).unwrap();
        assert!(envelope.data.unwrap().tx_ref.is_none());
    }
}
