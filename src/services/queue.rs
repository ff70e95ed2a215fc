//! Background task queue.
//!
//! Handlers depend only on the enqueue contract: `enqueue(task_name,
//! payload)`. A small worker pool consumes the channel and executes tasks
//! independently of any HTTP response, with no ordering guarantee, no
//! retries, and no error propagation back to the producer.

use crate::services::notifier::{EmailMessage, EmailSender};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

pub const TASK_BOOKING_CONFIRMATION: &str = "send_booking_confirmation";

/// A queued unit of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    pub payload: serde_json::Value,
}

/// Payload of a booking confirmation task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub to: String,
    pub booking_id: Uuid,
    pub details: String,
}

/// Cloneable producer handle.
#[derive(Clone)]
pub struct TaskQueue {
    tx: flume::Sender<Task>,
}

impl TaskQueue {
    pub fn new() -> (Self, flume::Receiver<Task>) {
        let (tx, rx) = flume::unbounded();
        (Self { tx }, rx)
    }

    /// Enqueue a task. Fire-and-forget: a full or disconnected queue is
    /// logged and dropped, never surfaced to the caller.
    pub fn enqueue(&self, name: &str, payload: serde_json::Value) {
        let task = Task {
            name: name.to_string(),
            payload,
        };
        if let Err(e) = self.tx.send(task) {
            tracing::error!(task = %name, error = %e, "Failed to enqueue task");
        }
    }
}

/// Spawn `count` workers consuming the shared receiver.
pub fn spawn_workers(
    count: usize,
    rx: flume::Receiver<Task>,
    email: Arc<dyn EmailSender>,
) -> Vec<JoinHandle<()>> {
    (0..count)
        .map(|worker_id| {
            let rx = rx.clone();
            let email = Arc::clone(&email);
            tokio::spawn(async move {
                tracing::debug!(worker_id, "Task worker started");
                while let Ok(task) = rx.recv_async().await {
                    handle_task(worker_id, task, email.as_ref()).await;
                }
                tracing::debug!(worker_id, "Task worker stopped");
            })
        })
        .collect()
}

async fn handle_task(worker_id: usize, task: Task, email: &dyn EmailSender) {
    tracing::debug!(worker_id, task = %task.name, "Handling task");

    match task.name.as_str() {
        TASK_BOOKING_CONFIRMATION => {
            let confirmation: BookingConfirmation = match serde_json::from_value(task.payload) {
                Ok(c) => c,
                Err(e) => {
                    tracing::error!(task = TASK_BOOKING_CONFIRMATION, error = %e, "Malformed task payload");
                    return;
                }
            };

            let message = EmailMessage {
                to: confirmation.to,
                subject: "Booking Confirmation".to_string(),
                body_text: format!(
                    "Dear Customer,\n\nYour booking has been confirmed!\n\nDetails:\n{}\n\nThank you for booking with us.",
                    confirmation.details
                ),
            };

            // At-most-once: a failed send is logged and gone.
            if let Err(e) = email.send(&message).await {
                tracing::error!(
                    booking_id = %confirmation.booking_id,
                    error = %e,
                    "Failed to send booking confirmation"
                );
            }
        }
        other => {
            tracing::warn!(task = %other, "Unknown task name, dropping");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::notifier::MockEmailSender;
    use std::time::Duration;

    async fn wait_for_count(mock: &MockEmailSender, expected: u64) -> bool {
        for _ in 0..50 {
            if mock.send_count() == expected {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        mock.send_count() == expected
    }

    #[tokio::test]
    async fn confirmation_task_reaches_email_sender() {
        let (queue, rx) = TaskQueue::new();
        let mock = Arc::new(MockEmailSender::new(true));
        let _workers = spawn_workers(2, rx, mock.clone());

        let payload = serde_json::to_value(BookingConfirmation {
            to: "jane@x.com".to_string(),
            booking_id: Uuid::new_v4(),
            details: "Booking ID: 7, Listing: Lakeside Villa".to_string(),
        })
        .unwrap();

        queue.enqueue(TASK_BOOKING_CONFIRMATION, payload);

        assert!(wait_for_count(&mock, 1).await);
    }

    #[tokio::test]
    async fn malformed_payload_does_not_kill_worker() {
        let (queue, rx) = TaskQueue::new();
        let mock = Arc::new(MockEmailSender::new(true));
        let _workers = spawn_workers(1, rx, mock.clone());

        queue.enqueue(TASK_BOOKING_CONFIRMATION, serde_json::json!({"bogus": true}));

        let payload = serde_json::to_value(BookingConfirmation {
            to: "jane@x.com".to_string(),
            booking_id: Uuid::new_v4(),
            details: "after the bad one".to_string(),
        })
        .unwrap();
        queue.enqueue(TASK_BOOKING_CONFIRMATION, payload);

        assert!(wait_for_count(&mock, 1).await);
    }

    #[tokio::test]
    async fn unknown_task_is_dropped() {
        let (queue, rx) = TaskQueue::new();
        let mock = Arc::new(MockEmailSender::new(true));
        let _workers = spawn_workers(1, rx, mock.clone());

        queue.enqueue("reticulate_splines", serde_json::json!({}));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(mock.send_count(), 0);
    }

    #[tokio::test]
    async fn send_failure_is_swallowed() {
        let (queue, rx) = TaskQueue::new();
        let mock = Arc::new(MockEmailSender::new(false));
        let _workers = spawn_workers(1, rx, mock.clone());

        let payload = serde_json::to_value(BookingConfirmation {
            to: "jane@x.com".to_string(),
            booking_id: Uuid::new_v4(),
            details: "disabled sender".to_string(),
        })
        .unwrap();
        queue.enqueue(TASK_BOOKING_CONFIRMATION, payload);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(mock.send_count(), 0);
    }
}
