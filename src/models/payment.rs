//! Payment model: a gateway transaction attached to a booking.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Payment lifecycle status.
///
/// `Cancelled` is reserved: nothing in the current flow reaches it, but the
/// column accepts it so a future cancellation path needs no migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Processing => "processing",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "processing" => PaymentStatus::Processing,
            "completed" => PaymentStatus::Completed,
            "failed" => PaymentStatus::Failed,
            "cancelled" => PaymentStatus::Cancelled,
            _ => PaymentStatus::Pending,
        }
    }

    /// Map the gateway's remote status string to a local status.
    ///
    /// Case-insensitive. Anything unrecognized maps to `Failed`: an unknown
    /// remote state must never leave a payment looking collectible.
    pub fn from_remote(remote: &str) -> Self {
        match remote.to_lowercase().as_str() {
            "success" => PaymentStatus::Completed,
            "pending" => PaymentStatus::Pending,
            "failed" => PaymentStatus::Failed,
            _ => PaymentStatus::Failed,
        }
    }

    /// Terminal states are never left by the verify flow.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PaymentStatus::Completed | PaymentStatus::Failed | PaymentStatus::Cancelled
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub payment_id: Uuid,
    pub booking_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub status: String,
    pub transaction_id: Option<String>,
    pub checkout_url: Option<String>,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub description: Option<String>,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

impl Payment {
    pub fn status(&self) -> PaymentStatus {
        PaymentStatus::from_string(&self.status)
    }
}

/// Input for persisting a freshly initiated payment.
#[derive(Debug, Clone)]
pub struct CreatePayment {
    pub booking_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub transaction_id: String,
    pub checkout_url: Option<String>,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_status_mapping() {
        assert_eq!(PaymentStatus::from_remote("success"), PaymentStatus::Completed);
        assert_eq!(PaymentStatus::from_remote("pending"), PaymentStatus::Pending);
        assert_eq!(PaymentStatus::from_remote("failed"), PaymentStatus::Failed);
    }

    #[test]
    fn remote_status_mapping_is_case_insensitive() {
        assert_eq!(PaymentStatus::from_remote("SUCCESS"), PaymentStatus::Completed);
        assert_eq!(PaymentStatus::from_remote("Pending"), PaymentStatus::Pending);
        assert_eq!(PaymentStatus::from_remote("FaIlEd"), PaymentStatus::Failed);
    }

    #[test]
    fn unrecognized_remote_status_fails_closed() {
        assert_eq!(PaymentStatus::from_remote(""), PaymentStatus::Failed);
        assert_eq!(PaymentStatus::from_remote("refunded"), PaymentStatus::Failed);
        assert_eq!(PaymentStatus::from_remote("unknown"), PaymentStatus::Failed);
        assert_eq!(PaymentStatus::from_remote("timeout"), PaymentStatus::Failed);
    }

    #[test]
    fn string_round_trip() {
        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Processing,
            PaymentStatus::Completed,
            PaymentStatus::Failed,
            PaymentStatus::Cancelled,
        ] {
            assert_eq!(PaymentStatus::from_string(status.as_str()), status);
        }
    }

    #[test]
    fn terminal_states() {
        assert!(PaymentStatus::Completed.is_terminal());
        assert!(PaymentStatus::Failed.is_terminal());
        assert!(PaymentStatus::Cancelled.is_terminal());
        assert!(!PaymentStatus::Pending.is_terminal());
        assert!(!PaymentStatus::Processing.is_terminal());
    }
}
