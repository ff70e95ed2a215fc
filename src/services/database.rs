//! Database service: PgPool wrapper and all SQL for the travel schema.

use crate::error::AppError;
use crate::models::{
    Booking, BookingWithListing, CreateBooking, CreateListing, CreatePayment, CreateReview,
    Listing, Payment, PaymentStatus, Review, UpdateBooking, UpdateListing, UpdateReview,
};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "travel-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Create a pool without connecting up front. Connections are
    /// established on first use, so callers that never issue a query
    /// (input-validation paths, unit tests) need no running server.
    pub fn connect_lazy(database_url: &str) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_secs(30))
            .connect_lazy(database_url)
            .map_err(|e| AppError::Database(anyhow::anyhow!("Invalid database URL: {}", e)))?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::Database(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Listing operations
    // -------------------------------------------------------------------------

    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create_listing(&self, input: &CreateListing) -> Result<Listing, AppError> {
        let listing = sqlx::query_as::<_, Listing>(
            r#"
            INSERT INTO listings (listing_id, title, description, price, location)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING listing_id, title, description, price, location, created_utc
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.price)
        .bind(&input.location)
        .fetch_one(&self.pool)
        .await?;

        info!(listing_id = %listing.listing_id, "Listing created");

        Ok(listing)
    }

    #[instrument(skip(self))]
    pub async fn get_listing(&self, listing_id: Uuid) -> Result<Option<Listing>, AppError> {
        let listing = sqlx::query_as::<_, Listing>(
            r#"
            SELECT listing_id, title, description, price, location, created_utc
            FROM listings
            WHERE listing_id = $1
            "#,
        )
        .bind(listing_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(listing)
    }

    #[instrument(skip(self))]
    pub async fn list_listings(&self, limit: i64, offset: i64) -> Result<Vec<Listing>, AppError> {
        let listings = sqlx::query_as::<_, Listing>(
            r#"
            SELECT listing_id, title, description, price, location, created_utc
            FROM listings
            ORDER BY created_utc DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(listings)
    }

    #[instrument(skip(self, input))]
    pub async fn update_listing(
        &self,
        listing_id: Uuid,
        input: &UpdateListing,
    ) -> Result<Option<Listing>, AppError> {
        let listing = sqlx::query_as::<_, Listing>(
            r#"
            UPDATE listings
            SET title = $2, description = $3, price = $4, location = $5
            WHERE listing_id = $1
            RETURNING listing_id, title, description, price, location, created_utc
            "#,
        )
        .bind(listing_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.price)
        .bind(&input.location)
        .fetch_optional(&self.pool)
        .await?;

        Ok(listing)
    }

    /// Delete a listing. Bookings and reviews cascade at the schema level.
    #[instrument(skip(self))]
    pub async fn delete_listing(&self, listing_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM listings WHERE listing_id = $1")
            .bind(listing_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // -------------------------------------------------------------------------
    // Booking operations
    // -------------------------------------------------------------------------

    #[instrument(skip(self, input), fields(listing_id = %input.listing_id))]
    pub async fn create_booking(&self, input: &CreateBooking) -> Result<Booking, AppError> {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (booking_id, listing_id, guest_name, guest_email, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING booking_id, listing_id, guest_name, guest_email, start_date, end_date, created_utc
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.listing_id)
        .bind(&input.guest_name)
        .bind(&input.guest_email)
        .bind(input.start_date)
        .bind(input.end_date)
        .fetch_one(&self.pool)
        .await?;

        info!(booking_id = %booking.booking_id, "Booking created");

        Ok(booking)
    }

    #[instrument(skip(self))]
    pub async fn get_booking(&self, booking_id: Uuid) -> Result<Option<Booking>, AppError> {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            SELECT booking_id, listing_id, guest_name, guest_email, start_date, end_date, created_utc
            FROM bookings
            WHERE booking_id = $1
            "#,
        )
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(booking)
    }

    /// Fetch a booking joined with the listing fields the payment flow needs.
    #[instrument(skip(self))]
    pub async fn get_booking_with_listing(
        &self,
        booking_id: Uuid,
    ) -> Result<Option<BookingWithListing>, AppError> {
        let booking = sqlx::query_as::<_, BookingWithListing>(
            r#"
            SELECT b.booking_id, b.listing_id, b.guest_name, b.guest_email,
                   b.start_date, b.end_date,
                   l.title AS listing_title, l.price AS listing_price
            FROM bookings b
            JOIN listings l ON l.listing_id = b.listing_id
            WHERE b.booking_id = $1
            "#,
        )
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(booking)
    }

    #[instrument(skip(self))]
    pub async fn list_bookings(&self, limit: i64, offset: i64) -> Result<Vec<Booking>, AppError> {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT booking_id, listing_id, guest_name, guest_email, start_date, end_date, created_utc
            FROM bookings
            ORDER BY created_utc DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    #[instrument(skip(self, input))]
    pub async fn update_booking(
        &self,
        booking_id: Uuid,
        input: &UpdateBooking,
    ) -> Result<Option<Booking>, AppError> {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET listing_id = $2, guest_name = $3, guest_email = $4, start_date = $5, end_date = $6
            WHERE booking_id = $1
            RETURNING booking_id, listing_id, guest_name, guest_email, start_date, end_date, created_utc
            "#,
        )
        .bind(booking_id)
        .bind(input.listing_id)
        .bind(&input.guest_name)
        .bind(&input.guest_email)
        .bind(input.start_date)
        .bind(input.end_date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(booking)
    }

    #[instrument(skip(self))]
    pub async fn delete_booking(&self, booking_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM bookings WHERE booking_id = $1")
            .bind(booking_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // -------------------------------------------------------------------------
    // Review operations
    // -------------------------------------------------------------------------

    #[instrument(skip(self, input), fields(listing_id = %input.listing_id))]
    pub async fn create_review(&self, input: &CreateReview) -> Result<Review, AppError> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (review_id, listing_id, reviewer_name, rating, comment)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING review_id, listing_id, reviewer_name, rating, comment, created_utc
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.listing_id)
        .bind(&input.reviewer_name)
        .bind(input.rating)
        .bind(&input.comment)
        .fetch_one(&self.pool)
        .await?;

        info!(review_id = %review.review_id, "Review created");

        Ok(review)
    }

    #[instrument(skip(self))]
    pub async fn get_review(&self, review_id: Uuid) -> Result<Option<Review>, AppError> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            SELECT review_id, listing_id, reviewer_name, rating, comment, created_utc
            FROM reviews
            WHERE review_id = $1
            "#,
        )
        .bind(review_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(review)
    }

    /// List reviews, optionally scoped to one listing.
    #[instrument(skip(self))]
    pub async fn list_reviews(
        &self,
        listing_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Review>, AppError> {
        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT review_id, listing_id, reviewer_name, rating, comment, created_utc
            FROM reviews
            WHERE ($1::uuid IS NULL OR listing_id = $1)
            ORDER BY created_utc DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(listing_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    #[instrument(skip(self, input))]
    pub async fn update_review(
        &self,
        review_id: Uuid,
        input: &UpdateReview,
    ) -> Result<Option<Review>, AppError> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            UPDATE reviews
            SET reviewer_name = $2, rating = $3, comment = $4
            WHERE review_id = $1
            RETURNING review_id, listing_id, reviewer_name, rating, comment, created_utc
            "#,
        )
        .bind(review_id)
        .bind(&input.reviewer_name)
        .bind(input.rating)
        .bind(&input.comment)
        .fetch_optional(&self.pool)
        .await?;

        Ok(review)
    }

    #[instrument(skip(self))]
    pub async fn delete_review(&self, review_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM reviews WHERE review_id = $1")
            .bind(review_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // -------------------------------------------------------------------------
    // Payment operations
    // -------------------------------------------------------------------------

    /// Persist a freshly initiated payment in `pending` state.
    ///
    /// A duplicate `transaction_id` violates the unique constraint and
    /// surfaces as `AppError::Conflict`.
    #[instrument(skip(self, input), fields(booking_id = %input.booking_id, transaction_id = %input.transaction_id))]
    pub async fn create_payment(&self, input: &CreatePayment) -> Result<Payment, AppError> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (payment_id, booking_id, amount, currency, status,
                                  transaction_id, checkout_url, customer_email,
                                  customer_phone, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING payment_id, booking_id, amount, currency, status, transaction_id,
                      checkout_url, customer_email, customer_phone, description,
                      created_utc, updated_utc
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.booking_id)
        .bind(input.amount)
        .bind(&input.currency)
        .bind(PaymentStatus::Pending.as_str())
        .bind(&input.transaction_id)
        .bind(&input.checkout_url)
        .bind(&input.customer_email)
        .bind(&input.customer_phone)
        .bind(&input.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!(
                    "A payment with transaction_id '{}' already exists",
                    input.transaction_id
                ))
            }
            _ => AppError::Database(anyhow::anyhow!("Failed to create payment: {}", e)),
        })?;

        info!(
            payment_id = %payment.payment_id,
            transaction_id = %input.transaction_id,
            "Payment created"
        );

        Ok(payment)
    }

    #[instrument(skip(self))]
    pub async fn get_payment(&self, payment_id: Uuid) -> Result<Option<Payment>, AppError> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            SELECT payment_id, booking_id, amount, currency, status, transaction_id,
                   checkout_url, customer_email, customer_phone, description,
                   created_utc, updated_utc
            FROM payments
            WHERE payment_id = $1
            "#,
        )
        .bind(payment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    #[instrument(skip(self))]
    pub async fn get_payment_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<Payment>, AppError> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            SELECT payment_id, booking_id, amount, currency, status, transaction_id,
                   checkout_url, customer_email, customer_phone, description,
                   created_utc, updated_utc
            FROM payments
            WHERE transaction_id = $1
            "#,
        )
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    #[instrument(skip(self))]
    pub async fn list_payments(&self, limit: i64, offset: i64) -> Result<Vec<Payment>, AppError> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT payment_id, booking_id, amount, currency, status, transaction_id,
                   checkout_url, customer_email, customer_phone, description,
                   created_utc, updated_utc
            FROM payments
            ORDER BY created_utc DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Apply a verified status to a payment and bump `updated_utc`.
    #[instrument(skip(self))]
    pub async fn update_payment_status(
        &self,
        payment_id: Uuid,
        status: PaymentStatus,
    ) -> Result<Option<Payment>, AppError> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            UPDATE payments
            SET status = $2, updated_utc = now()
            WHERE payment_id = $1
            RETURNING payment_id, booking_id, amount, currency, status, transaction_id,
                      checkout_url, customer_email, customer_phone, description,
                      created_utc, updated_utc
            "#,
        )
        .bind(payment_id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        if let Some(ref p) = payment {
            info!(payment_id = %p.payment_id, status = %p.status, "Payment status updated");
        }

        Ok(payment)
    }
}
