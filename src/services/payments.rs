//! Payment orchestrator.
//!
//! Owns the state transitions of a payment across initiation and
//! verification. Initiation calls the gateway first and only persists a
//! `pending` payment on gateway success; verification maps the remote
//! status onto the local one and re-applies it on every call
//! (last-write-wins, the mapping is a pure function of remote state).

use crate::config::ServerConfig;
use crate::error::AppError;
use crate::models::{CreatePayment, Payment, PaymentStatus};
use crate::services::chapa::{ChapaClient, Customization, InitializeRequest};
use crate::services::database::Database;
use uuid::Uuid;
use validator::ValidateEmail;

pub const DEFAULT_CURRENCY: &str = "ETB";

/// Initiation input. booking_id and customer_email are required; the
/// orchestrator rejects their absence so the contract holds no matter
/// which surface calls it.
#[derive(Debug, Clone, Default)]
pub struct InitiatePayment {
    pub booking_id: Option<Uuid>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub description: Option<String>,
}

/// Verification result: the updated payment plus the raw remote status
/// string for observability.
#[derive(Debug)]
pub struct VerifiedPayment {
    pub payment: Payment,
    pub chapa_status: String,
}

#[derive(Clone)]
pub struct PaymentFlow {
    db: Database,
    chapa: ChapaClient,
    public_base_url: String,
}

impl PaymentFlow {
    pub fn new(db: Database, chapa: ChapaClient, server: &ServerConfig) -> Self {
        Self {
            db,
            chapa,
            public_base_url: server.public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Initiate a payment for a booking against the gateway.
    ///
    /// On gateway success a payment row is persisted in `pending` state with
    /// the gateway-assigned transaction id and checkout URL. On gateway
    /// failure nothing is persisted.
    pub async fn initiate(&self, input: InitiatePayment) -> Result<Payment, AppError> {
        let (booking_id, customer_email) = match (input.booking_id, input.customer_email) {
            (Some(id), Some(email)) if !email.is_empty() => (id, email),
            _ => {
                return Err(AppError::Validation(
                    "booking_id and customer_email are required".to_string(),
                ))
            }
        };

        if !customer_email.validate_email() {
            return Err(AppError::Validation(format!(
                "'{}' is not a valid email address",
                customer_email
            )));
        }

        let booking = self
            .db
            .get_booking_with_listing(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Booking not found")))?;

        // Amount is the listing price as-is; no tax or fee logic.
        let amount = booking.listing_price;
        let (first_name, last_name) = split_guest_name(&booking.guest_name);
        let tx_ref = build_tx_ref(booking.booking_id, &booking.guest_name);

        let customer_phone = input.customer_phone.clone().unwrap_or_default();
        let customization_description = match input.description.as_deref() {
            Some(d) if !d.is_empty() => d.to_string(),
            _ => format!("Payment for booking: {}", booking.listing_title),
        };

        let request = InitializeRequest {
            amount,
            currency: DEFAULT_CURRENCY.to_string(),
            email: customer_email.clone(),
            first_name,
            last_name,
            phone_number: customer_phone,
            tx_ref: tx_ref.clone(),
            callback_url: format!("{}/payments/verify/", self.public_base_url),
            return_url: format!("{}/payments/success/", self.public_base_url),
            customization: Customization {
                title: "Travel Booking Payment".to_string(),
                description: customization_description,
            },
        };

        let initialized = self.chapa.initialize(&request).await?;

        // Prefer the gateway-echoed reference; fall back to the derived one.
        let transaction_id = initialized.tx_ref.unwrap_or(tx_ref);

        let payment = self
            .db
            .create_payment(&CreatePayment {
                booking_id: booking.booking_id,
                amount,
                currency: DEFAULT_CURRENCY.to_string(),
                transaction_id,
                checkout_url: Some(initialized.checkout_url),
                customer_email,
                customer_phone: input.customer_phone,
                description: input.description,
            })
            .await?;

        tracing::info!(
            payment_id = %payment.payment_id,
            booking_id = %booking.booking_id,
            transaction_id = ?payment.transaction_id,
            "Payment initiated"
        );

        Ok(payment)
    }

    /// Verify a payment against the gateway and apply the mapped status.
    ///
    /// The payment is left unmodified when the gateway call fails.
    pub async fn verify(&self, transaction_id: Option<String>) -> Result<VerifiedPayment, AppError> {
        let transaction_id = match transaction_id {
            Some(id) if !id.is_empty() => id,
            _ => {
                return Err(AppError::Validation(
                    "transaction_id is required".to_string(),
                ))
            }
        };

        let payment = self
            .db
            .get_payment_by_transaction_id(&transaction_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Payment not found")))?;

        // No idempotency guard: the mapped status is re-applied on every
        // call. A terminal payment being re-verified is still worth a trace.
        if payment.status().is_terminal() {
            tracing::debug!(
                payment_id = %payment.payment_id,
                status = %payment.status,
                "Re-verifying a payment already in a terminal state"
            );
        }

        let outcome = self.chapa.verify(&transaction_id).await?;
        let status = PaymentStatus::from_remote(&outcome.remote_status);

        let payment = self
            .db
            .update_payment_status(payment.payment_id, status)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Payment not found")))?;

        tracing::info!(
            payment_id = %payment.payment_id,
            transaction_id = %transaction_id,
            chapa_status = %outcome.remote_status,
            status = %payment.status,
            "Payment verified"
        );

        Ok(VerifiedPayment {
            payment,
            chapa_status: outcome.remote_status,
        })
    }

}

/// Split a guest name on whitespace: first token becomes the first name,
/// the remaining tokens joined become the last name. An empty or
/// whitespace-only name falls back to "Customer".
pub fn split_guest_name(guest_name: &str) -> (String, String) {
    let mut parts = guest_name.split_whitespace();
    match parts.next() {
        Some(first) => (first.to_string(), parts.collect::<Vec<_>>().join(" ")),
        None => ("Customer".to_string(), String::new()),
    }
}

/// Derive the deterministic gateway reference for a booking.
///
/// Not globally unique: repeated initiation for the same booking derives the
/// same value, and the payments unique constraint is what catches the
/// collision.
pub fn build_tx_ref(booking_id: Uuid, guest_name: &str) -> String {
    format!("booking_{}_{}", booking_id, guest_name.replace(' ', "_"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChapaConfig;
    use secrecy::Secret;

    fn test_flow() -> PaymentFlow {
        // Lazy pool: validation guards run before any query, so no server
        // is needed.
        let db = Database::connect_lazy("postgres://localhost:5432/unused").unwrap();
        let chapa = ChapaClient::new(ChapaConfig {
            secret_key: Secret::new("test-secret".to_string()),
            api_base_url: "http://127.0.0.1:1".to_string(),
            timeout_seconds: 1,
        })
        .unwrap();
        let server = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            public_base_url: "http://localhost:3006".to_string(),
        };
        PaymentFlow::new(db, chapa, &server)
    }

    #[tokio::test]
    async fn initiate_without_customer_email_is_validation_error() {
        let flow = test_flow();
        let err = flow
            .initiate(InitiatePayment {
                booking_id: Some(Uuid::new_v4()),
                customer_phone: Some("0911000000".to_string()),
                description: Some("weekend stay".to_string()),
                ..Default::default()
            })
            .await
            .expect_err("initiate should fail");
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn initiate_with_empty_customer_email_is_validation_error() {
        let flow = test_flow();
        let err = flow
            .initiate(InitiatePayment {
                booking_id: Some(Uuid::new_v4()),
                customer_email: Some(String::new()),
                ..Default::default()
            })
            .await
            .expect_err("initiate should fail");
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn initiate_without_booking_id_is_validation_error() {
        let flow = test_flow();
        let err = flow
            .initiate(InitiatePayment {
                customer_email: Some("jane@x.com".to_string()),
                ..Default::default()
            })
            .await
            .expect_err("initiate should fail");
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn initiate_with_malformed_email_is_validation_error() {
        let flow = test_flow();
        let err = flow
            .initiate(InitiatePayment {
                booking_id: Some(Uuid::new_v4()),
                customer_email: Some("not-an-email".to_string()),
                ..Default::default()
            })
            .await
            .expect_err("initiate should fail");
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn verify_without_transaction_id_is_validation_error() {
        let flow = test_flow();
        let err = flow.verify(None).await.expect_err("verify should fail");
        assert!(matches!(err, AppError::Validation(_)));

        let err = flow
            .verify(Some(String::new()))
            .await
            .expect_err("verify should fail");
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn splits_two_part_name() {
        assert_eq!(
            split_guest_name("Jane Doe"),
            ("Jane".to_string(), "Doe".to_string())
        );
    }

    #[test]
    fn splits_multi_part_name() {
        assert_eq!(
            split_guest_name("Jane van der Doe"),
            ("Jane".to_string(), "van der Doe".to_string())
        );
    }

    #[test]
    fn single_token_has_empty_last_name() {
        assert_eq!(split_guest_name("Jane"), ("Jane".to_string(), String::new()));
    }

    #[test]
    fn empty_name_falls_back_to_customer() {
        assert_eq!(
            split_guest_name(""),
            ("Customer".to_string(), String::new())
        );
        assert_eq!(
            split_guest_name("   "),
            ("Customer".to_string(), String::new())
        );
    }

    #[test]
    fn tx_ref_replaces_spaces_with_underscores() {
        let id = Uuid::nil();
        assert_eq!(
            build_tx_ref(id, "Jane Doe"),
            format!("booking_{}_Jane_Doe", id)
        );
    }

    #[test]
    fn tx_ref_is_deterministic() {
        let id = Uuid::new_v4();
        assert_eq!(build_tx_ref(id, "Jane Doe"), build_tx_ref(id, "Jane Doe"));
    }
}
