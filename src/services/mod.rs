pub mod chapa;
pub mod database;
pub mod notifier;
pub mod payments;
pub mod queue;

pub use chapa::ChapaClient;
pub use database::Database;
pub use notifier::{EmailSender, MockEmailSender, SmtpSender};
pub use payments::PaymentFlow;
pub use queue::TaskQueue;
