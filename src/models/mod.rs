pub mod booking;
pub mod listing;
pub mod payment;
pub mod review;

pub use booking::{Booking, BookingWithListing, CreateBooking, UpdateBooking};
pub use listing::{CreateListing, Listing, UpdateListing};
pub use payment::{CreatePayment, Payment, PaymentStatus};
pub use review::{CreateReview, Review, UpdateReview};
