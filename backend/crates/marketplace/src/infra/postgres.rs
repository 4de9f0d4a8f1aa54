//! PostgreSQL Repository Implementations

use std::collections::HashMap;

use auth::UserRole;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use kernel::error::conversions::is_unique_violation;
use kernel::i18n::LocalizedText;
use kernel::id::{
    BookingId, CategoryId, MessageId, NotificationId, ReviewId, ServiceId, SubcategoryId, UserId,
};
use kernel::pagination::PageRequest;
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::entity::{
    booking::Booking,
    category::{Category, Subcategory},
    message::{Conversation, Message},
    notification::Notification,
    review::Review,
    service::Service,
    user_summary::UserSummary,
};
use crate::domain::repository::{
    BookingFilter, BookingRepository, CatalogRepository, MessageRepository,
    NotificationRepository, ReviewFilter, ReviewRepository, ServiceFilter, ServiceSort,
    UserDirectory,
};
use crate::domain::value_object::{
    booking_status::BookingStatus, notification_kind::NotificationKind, price_type::PriceType,
    rating::RatingSummary,
};
use crate::error::{MarketError, MarketResult};

/// PostgreSQL-backed marketplace repository
#[derive(Clone)]
pub struct PgMarketRepository {
    pool: PgPool,
}

impl PgMarketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const CATEGORY_COLUMNS: &str =
    "c.id, c.slug, c.name, c.icon, c.sort_order, c.is_active, c.created_at";

const SERVICE_COLUMNS: &str = r#"
    s.id,
    s.provider_id,
    s.category_id,
    s.subcategory_id,
    s.title,
    s.description,
    s.price,
    s.price_type,
    s.duration_minutes,
    s.service_area,
    s.images,
    s.is_active,
    s.is_available,
    s.average_rating,
    s.total_reviews,
    s.created_at,
    s.updated_at
"#;

const BOOKING_COLUMNS: &str = r#"
    b.id,
    b.customer_id,
    b.provider_id,
    b.service_id,
    b.scheduled_date,
    b.scheduled_time,
    b.duration_minutes,
    b.address,
    b.notes,
    b.total_price,
    b.status,
    b.provider_notes,
    b.cancellation_reason,
    b.cancelled_by,
    b.cancelled_at,
    b.completed_at,
    b.created_at,
    b.updated_at
"#;

const REVIEW_COLUMNS: &str = r#"
    r.id,
    r.booking_id,
    r.service_id,
    r.customer_id,
    r.provider_id,
    r.rating,
    r.comment,
    r.provider_response,
    r.responded_at,
    r.is_approved,
    r.created_at,
    r.updated_at
"#;

const MESSAGE_COLUMNS: &str =
    "m.id, m.sender_id, m.receiver_id, m.booking_id, m.content, m.is_read, m.read_at, m.created_at";

const NOTIFICATION_COLUMNS: &str =
    "n.id, n.user_id, n.kind, n.title, n.body, n.payload, n.is_read, n.created_at";

fn like_pattern(term: &Option<String>) -> Option<String> {
    term.as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| format!("%{}%", t.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")))
}

fn order_clause(sort: ServiceSort) -> &'static str {
    match sort {
        ServiceSort::Newest => "s.created_at DESC",
        ServiceSort::PriceAsc => "s.price ASC, s.created_at DESC",
        ServiceSort::PriceDesc => "s.price DESC, s.created_at DESC",
        ServiceSort::Rating => "s.average_rating DESC, s.total_reviews DESC, s.created_at DESC",
    }
}

fn map_slug_error(err: sqlx::Error) -> MarketError {
    if is_unique_violation(&err) {
        MarketError::SlugTaken
    } else {
        MarketError::Database(err)
    }
}

fn map_review_error(err: sqlx::Error) -> MarketError {
    if is_unique_violation(&err) {
        MarketError::AlreadyReviewed
    } else {
        MarketError::Database(err)
    }
}

fn uuids<T>(ids: &[kernel::id::Id<T>]) -> Vec<Uuid> {
    ids.iter().map(|id| *id.as_uuid()).collect()
}

fn count(total: i64) -> u64 {
    total.max(0) as u64
}

// ============================================================================
// Catalog Repository Implementation
// ============================================================================

impl PgMarketRepository {
    /// Load subcategories for the given category rows, keeping row order
    async fn with_subcategories(&self, rows: Vec<CategoryRow>) -> MarketResult<Vec<Category>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let subs = sqlx::query_as::<_, SubcategoryRow>(
            r#"
            SELECT id, category_id, slug, name, sort_order
            FROM subcategories
            WHERE category_id = ANY($1)
            ORDER BY sort_order, slug
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<Subcategory>> = HashMap::new();
        for sub in subs {
            grouped
                .entry(sub.category_id)
                .or_default()
                .push(sub.into_subcategory());
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let subs = grouped.remove(&row.id).unwrap_or_default();
                row.into_category(subs)
            })
            .collect())
    }
}

impl CatalogRepository for PgMarketRepository {
    async fn list_categories(&self, include_inactive: bool) -> MarketResult<Vec<Category>> {
        let sql = format!(
            r#"
                SELECT {CATEGORY_COLUMNS}
                FROM categories c
                WHERE ($1 OR c.is_active)
                ORDER BY c.sort_order, c.slug
            "#
        );
        let rows = sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(include_inactive)
            .fetch_all(&self.pool)
            .await?;

        self.with_subcategories(rows).await
    }

    async fn find_category(&self, id: &CategoryId) -> MarketResult<Option<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories c WHERE c.id = $1");
        let row = sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        Ok(self.with_subcategories(row.into_iter().collect()).await?.pop())
    }

    async fn find_category_by_slug(&self, slug: &str) -> MarketResult<Option<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories c WHERE c.slug = $1");
        let row = sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        Ok(self.with_subcategories(row.into_iter().collect()).await?.pop())
    }

    async fn insert_category(&self, category: &Category) -> MarketResult<()> {
        sqlx::query(
            r#"
            INSERT INTO categories (id, slug, name, icon, sort_order, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(category.id.as_uuid())
        .bind(&category.slug)
        .bind(Json(&category.name))
        .bind(&category.icon)
        .bind(category.sort_order)
        .bind(category.is_active)
        .bind(category.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_slug_error)?;

        Ok(())
    }

    async fn insert_subcategory(&self, subcategory: &Subcategory) -> MarketResult<()> {
        sqlx::query(
            r#"
            INSERT INTO subcategories (id, category_id, slug, name, sort_order)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(subcategory.id.as_uuid())
        .bind(subcategory.category_id.as_uuid())
        .bind(&subcategory.slug)
        .bind(Json(&subcategory.name))
        .bind(subcategory.sort_order)
        .execute(&self.pool)
        .await
        .map_err(map_slug_error)?;

        Ok(())
    }

    async fn insert_service(&self, service: &Service) -> MarketResult<()> {
        sqlx::query(
            r#"
            INSERT INTO services (
                id,
                provider_id,
                category_id,
                subcategory_id,
                title,
                description,
                price,
                price_type,
                duration_minutes,
                service_area,
                images,
                is_active,
                is_available,
                average_rating,
                total_reviews,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, 0, 0, $14, $15)
            "#,
        )
        .bind(service.id.as_uuid())
        .bind(service.provider_id.as_uuid())
        .bind(service.category_id.as_uuid())
        .bind(service.subcategory_id.map(Uuid::from))
        .bind(Json(&service.title))
        .bind(Json(&service.description))
        .bind(service.price)
        .bind(service.price_type.id())
        .bind(service.duration_minutes)
        .bind(&service.service_area)
        .bind(&service.images)
        .bind(service.is_active)
        .bind(service.is_available)
        .bind(service.created_at)
        .bind(service.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_service(&self, id: &ServiceId) -> MarketResult<Option<Service>> {
        let sql = format!("SELECT {SERVICE_COLUMNS} FROM services s WHERE s.id = $1");
        let row = sqlx::query_as::<_, ServiceRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(ServiceRow::into_service).transpose()
    }

    async fn find_services(&self, ids: &[ServiceId]) -> MarketResult<Vec<Service>> {
        let sql = format!("SELECT {SERVICE_COLUMNS} FROM services s WHERE s.id = ANY($1)");
        let rows = sqlx::query_as::<_, ServiceRow>(&sql)
            .bind(uuids(ids))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(ServiceRow::into_service).collect()
    }

    async fn update_service(&self, service: &Service) -> MarketResult<()> {
        sqlx::query(
            r#"
            UPDATE services SET
                category_id = $2,
                subcategory_id = $3,
                title = $4,
                description = $5,
                price = $6,
                price_type = $7,
                duration_minutes = $8,
                service_area = $9,
                images = $10,
                is_active = $11,
                is_available = $12,
                updated_at = $13
            WHERE id = $1
            "#,
        )
        .bind(service.id.as_uuid())
        .bind(service.category_id.as_uuid())
        .bind(service.subcategory_id.map(Uuid::from))
        .bind(Json(&service.title))
        .bind(Json(&service.description))
        .bind(service.price)
        .bind(service.price_type.id())
        .bind(service.duration_minutes)
        .bind(&service.service_area)
        .bind(&service.images)
        .bind(service.is_active)
        .bind(service.is_available)
        .bind(service.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_service(&self, id: &ServiceId) -> MarketResult<()> {
        // bookings and reviews go with it (ON DELETE CASCADE)
        sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_services(
        &self,
        filter: &ServiceFilter,
        page: PageRequest,
    ) -> MarketResult<(Vec<Service>, u64)> {
        let search = like_pattern(&filter.search);

        const WHERE: &str = r#"
            WHERE ($1 = FALSE OR s.is_active)
              AND ($2::UUID IS NULL OR s.category_id = $2)
              AND ($3::UUID IS NULL OR s.subcategory_id = $3)
              AND ($4::UUID IS NULL OR s.provider_id = $4)
              AND ($5::NUMERIC IS NULL OR s.price >= $5)
              AND ($6::NUMERIC IS NULL OR s.price <= $6)
              AND ($7::TEXT IS NULL
                   OR s.title->>'en' ILIKE $7
                   OR s.title->>'fr' ILIKE $7
                   OR s.title->>'ar' ILIKE $7
                   OR s.description->>'en' ILIKE $7
                   OR s.description->>'fr' ILIKE $7
                   OR s.description->>'ar' ILIKE $7)
              AND ($8::BOOLEAN IS NULL OR s.is_available = $8)
        "#;

        let total =
            sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM services s {WHERE}"))
                .bind(filter.active_only)
                .bind(filter.category_id.map(Uuid::from))
                .bind(filter.subcategory_id.map(Uuid::from))
                .bind(filter.provider_id.map(Uuid::from))
                .bind(filter.min_price)
                .bind(filter.max_price)
                .bind(&search)
                .bind(filter.available)
                .fetch_one(&self.pool)
                .await?;

        let sql = format!(
            "SELECT {SERVICE_COLUMNS} FROM services s {WHERE} ORDER BY {} LIMIT $9 OFFSET $10",
            order_clause(filter.sort)
        );
        let rows = sqlx::query_as::<_, ServiceRow>(&sql)
            .bind(filter.active_only)
            .bind(filter.category_id.map(Uuid::from))
            .bind(filter.subcategory_id.map(Uuid::from))
            .bind(filter.provider_id.map(Uuid::from))
            .bind(filter.min_price)
            .bind(filter.max_price)
            .bind(&search)
            .bind(filter.available)
            .bind(page.sql_limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let services = rows
            .into_iter()
            .map(ServiceRow::into_service)
            .collect::<MarketResult<Vec<_>>>()?;
        Ok((services, count(total)))
    }
}

// ============================================================================
// Booking Repository Implementation
// ============================================================================

impl BookingRepository for PgMarketRepository {
    async fn insert_booking(&self, booking: &Booking) -> MarketResult<()> {
        sqlx::query(
            r#"
            INSERT INTO bookings (
                id,
                customer_id,
                provider_id,
                service_id,
                scheduled_date,
                scheduled_time,
                duration_minutes,
                address,
                notes,
                total_price,
                status,
                provider_notes,
                cancellation_reason,
                cancelled_by,
                cancelled_at,
                completed_at,
                created_at,
                updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9,
                $10, $11, $12, $13, $14, $15, $16, $17, $18
            )
            "#,
        )
        .bind(booking.id.as_uuid())
        .bind(booking.customer_id.as_uuid())
        .bind(booking.provider_id.as_uuid())
        .bind(booking.service_id.as_uuid())
        .bind(booking.scheduled_date)
        .bind(booking.scheduled_time)
        .bind(booking.duration_minutes)
        .bind(&booking.address)
        .bind(&booking.notes)
        .bind(booking.total_price)
        .bind(booking.status.id())
        .bind(&booking.provider_notes)
        .bind(&booking.cancellation_reason)
        .bind(booking.cancelled_by.map(Uuid::from))
        .bind(booking.cancelled_at)
        .bind(booking.completed_at)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_booking(&self, id: &BookingId) -> MarketResult<Option<Booking>> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings b WHERE b.id = $1");
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(BookingRow::into_booking).transpose()
    }

    async fn update_booking(&self, booking: &Booking, expected: BookingStatus) -> MarketResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE bookings SET
                status = $2,
                provider_notes = $3,
                cancellation_reason = $4,
                cancelled_by = $5,
                cancelled_at = $6,
                completed_at = $7,
                updated_at = $8
            WHERE id = $1 AND status = $9
            "#,
        )
        .bind(booking.id.as_uuid())
        .bind(booking.status.id())
        .bind(&booking.provider_notes)
        .bind(&booking.cancellation_reason)
        .bind(booking.cancelled_by.map(Uuid::from))
        .bind(booking.cancelled_at)
        .bind(booking.completed_at)
        .bind(booking.updated_at)
        .bind(expected.id())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(MarketError::BookingStatusChanged);
        }
        Ok(())
    }

    async fn list_bookings(
        &self,
        filter: &BookingFilter,
        page: PageRequest,
    ) -> MarketResult<(Vec<Booking>, u64)> {
        const WHERE: &str = r#"
            WHERE ($1::UUID IS NULL OR b.customer_id = $1)
              AND ($2::UUID IS NULL OR b.provider_id = $2)
              AND ($3::SMALLINT IS NULL OR b.status = $3)
        "#;

        let customer = filter.customer_id.map(Uuid::from);
        let provider = filter.provider_id.map(Uuid::from);
        let status = filter.status.map(|s| s.id());

        let total =
            sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM bookings b {WHERE}"))
                .bind(customer)
                .bind(provider)
                .bind(status)
                .fetch_one(&self.pool)
                .await?;

        let sql = format!(
            r#"
                SELECT {BOOKING_COLUMNS}
                FROM bookings b
                {WHERE}
                ORDER BY b.created_at DESC LIMIT $4 OFFSET $5
            "#
        );
        let rows = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(customer)
            .bind(provider)
            .bind(status)
            .bind(page.sql_limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let bookings = rows
            .into_iter()
            .map(BookingRow::into_booking)
            .collect::<MarketResult<Vec<_>>>()?;
        Ok((bookings, count(total)))
    }

    async fn has_open_bookings(&self, service_id: &ServiceId) -> MarketResult<bool> {
        let open: Vec<i16> = BookingStatus::ALL
            .into_iter()
            .filter(BookingStatus::is_open)
            .map(|s| s.id())
            .collect();

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM bookings WHERE service_id = $1 AND status = ANY($2))",
        )
        .bind(service_id.as_uuid())
        .bind(&open)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}

// ============================================================================
// Review Repository Implementation
// ============================================================================

/// Row lock serializing rating writers of one service
async fn lock_service(
    tx: &mut Transaction<'_, Postgres>,
    service_id: &ServiceId,
) -> MarketResult<()> {
    sqlx::query_scalar::<_, Uuid>("SELECT id FROM services WHERE id = $1 FOR UPDATE")
        .bind(service_id.as_uuid())
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(MarketError::ServiceNotFound)?;

    Ok(())
}

/// Recompute the rating columns from approved reviews
async fn refresh_rating(
    tx: &mut Transaction<'_, Postgres>,
    service_id: &ServiceId,
) -> MarketResult<RatingSummary> {
    let (sum, count) = sqlx::query_as::<_, (i64, i64)>(
        r#"
        SELECT COALESCE(SUM(rating), 0)::BIGINT, COUNT(*)
        FROM reviews
        WHERE service_id = $1 AND is_approved
        "#,
    )
    .bind(service_id.as_uuid())
    .fetch_one(&mut **tx)
    .await?;

    let summary = RatingSummary::from_totals(sum, count);

    sqlx::query(
        "UPDATE services SET average_rating = $2, total_reviews = $3::INTEGER WHERE id = $1",
    )
    .bind(service_id.as_uuid())
    .bind(summary.average_rating)
    .bind(summary.total_reviews)
    .execute(&mut **tx)
    .await?;

    Ok(summary)
}

impl ReviewRepository for PgMarketRepository {
    async fn find_review(&self, id: &ReviewId) -> MarketResult<Option<Review>> {
        let sql = format!("SELECT {REVIEW_COLUMNS} FROM reviews r WHERE r.id = $1");
        let row = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(ReviewRow::into_review))
    }

    async fn find_review_for_booking(
        &self,
        customer_id: &UserId,
        booking_id: &BookingId,
    ) -> MarketResult<Option<Review>> {
        let sql = format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews r WHERE r.customer_id = $1 AND r.booking_id = $2"
        );
        let row = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(customer_id.as_uuid())
            .bind(booking_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(ReviewRow::into_review))
    }

    async fn list_reviews(
        &self,
        filter: &ReviewFilter,
        page: PageRequest,
    ) -> MarketResult<(Vec<Review>, u64)> {
        const WHERE: &str = r#"
            WHERE ($1::UUID IS NULL OR r.service_id = $1)
              AND ($2::UUID IS NULL OR r.customer_id = $2)
              AND ($3::UUID IS NULL OR r.provider_id = $3)
              AND ($4 = FALSE OR r.is_approved)
        "#;

        let service = filter.service_id.map(Uuid::from);
        let customer = filter.customer_id.map(Uuid::from);
        let provider = filter.provider_id.map(Uuid::from);

        let total =
            sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM reviews r {WHERE}"))
                .bind(service)
                .bind(customer)
                .bind(provider)
                .bind(filter.approved_only)
                .fetch_one(&self.pool)
                .await?;

        let sql = format!(
            r#"
                SELECT {REVIEW_COLUMNS}
                FROM reviews r
                {WHERE}
                ORDER BY r.created_at DESC LIMIT $5 OFFSET $6
            "#
        );
        let rows = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(service)
            .bind(customer)
            .bind(provider)
            .bind(filter.approved_only)
            .bind(page.sql_limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok((rows.into_iter().map(ReviewRow::into_review).collect(), count(total)))
    }

    async fn insert_review(&self, review: &Review) -> MarketResult<RatingSummary> {
        let mut tx = self.pool.begin().await?;
        lock_service(&mut tx, &review.service_id).await?;

        sqlx::query(
            r#"
            INSERT INTO reviews (
                id,
                booking_id,
                service_id,
                customer_id,
                provider_id,
                rating,
                comment,
                provider_response,
                responded_at,
                is_approved,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(review.id.as_uuid())
        .bind(review.booking_id.as_uuid())
        .bind(review.service_id.as_uuid())
        .bind(review.customer_id.as_uuid())
        .bind(review.provider_id.as_uuid())
        .bind(review.rating)
        .bind(&review.comment)
        .bind(&review.provider_response)
        .bind(review.responded_at)
        .bind(review.is_approved)
        .bind(review.created_at)
        .bind(review.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_review_error)?;

        let summary = refresh_rating(&mut tx, &review.service_id).await?;
        tx.commit().await?;
        Ok(summary)
    }

    async fn save_review(&self, review: &Review) -> MarketResult<RatingSummary> {
        let mut tx = self.pool.begin().await?;
        lock_service(&mut tx, &review.service_id).await?;

        sqlx::query(
            r#"
            UPDATE reviews SET
                rating = $2,
                comment = $3,
                provider_response = $4,
                responded_at = $5,
                is_approved = $6,
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(review.id.as_uuid())
        .bind(review.rating)
        .bind(&review.comment)
        .bind(&review.provider_response)
        .bind(review.responded_at)
        .bind(review.is_approved)
        .bind(review.updated_at)
        .execute(&mut *tx)
        .await?;

        let summary = refresh_rating(&mut tx, &review.service_id).await?;
        tx.commit().await?;
        Ok(summary)
    }

    async fn remove_review(&self, review: &Review) -> MarketResult<RatingSummary> {
        let mut tx = self.pool.begin().await?;
        lock_service(&mut tx, &review.service_id).await?;

        sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(review.id.as_uuid())
            .execute(&mut *tx)
            .await?;

        let summary = refresh_rating(&mut tx, &review.service_id).await?;
        tx.commit().await?;
        Ok(summary)
    }
}

// ============================================================================
// Message Repository Implementation
// ============================================================================

impl MessageRepository for PgMarketRepository {
    async fn insert_message(&self, message: &Message) -> MarketResult<()> {
        sqlx::query(
            r#"
            INSERT INTO messages (
                id, sender_id, receiver_id, booking_id, content, is_read, read_at, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(message.id.as_uuid())
        .bind(message.sender_id.as_uuid())
        .bind(message.receiver_id.as_uuid())
        .bind(message.booking_id.map(Uuid::from))
        .bind(&message.content)
        .bind(message.is_read)
        .bind(message.read_at)
        .bind(message.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_message(&self, id: &MessageId) -> MarketResult<Option<Message>> {
        let sql = format!("SELECT {MESSAGE_COLUMNS} FROM messages m WHERE m.id = $1");
        let row = sqlx::query_as::<_, MessageRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(MessageRow::into_message))
    }

    async fn save_message(&self, message: &Message) -> MarketResult<()> {
        sqlx::query("UPDATE messages SET is_read = $2, read_at = $3 WHERE id = $1")
            .bind(message.id.as_uuid())
            .bind(message.is_read)
            .bind(message.read_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_conversation(
        &self,
        user_id: &UserId,
        partner_id: &UserId,
        page: PageRequest,
    ) -> MarketResult<(Vec<Message>, u64)> {
        const WHERE: &str = r#"
            WHERE (m.sender_id = $1 AND m.receiver_id = $2)
               OR (m.sender_id = $2 AND m.receiver_id = $1)
        "#;

        let total =
            sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM messages m {WHERE}"))
                .bind(user_id.as_uuid())
                .bind(partner_id.as_uuid())
                .fetch_one(&self.pool)
                .await?;

        let sql = format!(
            r#"
                SELECT {MESSAGE_COLUMNS}
                FROM messages m
                {WHERE}
                ORDER BY m.created_at DESC LIMIT $3 OFFSET $4
            "#
        );
        let rows = sqlx::query_as::<_, MessageRow>(&sql)
            .bind(user_id.as_uuid())
            .bind(partner_id.as_uuid())
            .bind(page.sql_limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok((rows.into_iter().map(MessageRow::into_message).collect(), count(total)))
    }

    async fn mark_conversation_read(
        &self,
        receiver_id: &UserId,
        partner_id: &UserId,
    ) -> MarketResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE messages SET is_read = TRUE, read_at = NOW()
            WHERE receiver_id = $1 AND sender_id = $2 AND NOT is_read
            "#,
        )
        .bind(receiver_id.as_uuid())
        .bind(partner_id.as_uuid())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn list_booking_messages(&self, booking_id: &BookingId) -> MarketResult<Vec<Message>> {
        let sql = format!(
            r#"
                SELECT {MESSAGE_COLUMNS}
                FROM messages m
                WHERE m.booking_id = $1
                ORDER BY m.created_at ASC
            "#
        );
        let rows = sqlx::query_as::<_, MessageRow>(&sql)
            .bind(booking_id.as_uuid())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(MessageRow::into_message).collect())
    }

    async fn list_conversations(&self, user_id: &UserId) -> MarketResult<Vec<Conversation>> {
        let sql = format!(
            r#"
            WITH latest AS (
                SELECT DISTINCT ON (partner_id) *
                FROM (
                    SELECT {MESSAGE_COLUMNS},
                        CASE WHEN m.sender_id = $1 THEN m.receiver_id ELSE m.sender_id END
                            AS partner_id
                    FROM messages m
                    WHERE m.sender_id = $1 OR m.receiver_id = $1
                ) mine
                ORDER BY partner_id, created_at DESC
            )
            SELECT l.*,
                (SELECT COUNT(*) FROM messages u
                 WHERE u.sender_id = l.partner_id AND u.receiver_id = $1 AND NOT u.is_read)
                    AS unread_count
            FROM latest l
            ORDER BY l.created_at DESC
            "#
        );
        let rows = sqlx::query_as::<_, ConversationRow>(&sql)
            .bind(user_id.as_uuid())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| Conversation {
                partner_id: UserId::from_uuid(row.partner_id),
                last_message: row.message.into_message(),
                unread_count: count(row.unread_count),
            })
            .collect())
    }

    async fn count_unread_messages(&self, user_id: &UserId) -> MarketResult<u64> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM messages WHERE receiver_id = $1 AND NOT is_read",
        )
        .bind(user_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(count(total))
    }
}

// ============================================================================
// Notification Repository Implementation
// ============================================================================

impl NotificationRepository for PgMarketRepository {
    async fn insert_notification(&self, notification: &Notification) -> MarketResult<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, user_id, kind, title, body, payload, is_read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(notification.id.as_uuid())
        .bind(notification.user_id.as_uuid())
        .bind(notification.kind.id())
        .bind(&notification.title)
        .bind(&notification.body)
        .bind(Json(&notification.payload))
        .bind(notification.is_read)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_notifications(
        &self,
        user_id: &UserId,
        unread_only: bool,
        page: PageRequest,
    ) -> MarketResult<(Vec<Notification>, u64)> {
        const WHERE: &str = "WHERE n.user_id = $1 AND ($2 = FALSE OR NOT n.is_read)";

        let total =
            sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM notifications n {WHERE}"))
                .bind(user_id.as_uuid())
                .bind(unread_only)
                .fetch_one(&self.pool)
                .await?;

        let sql = format!(
            r#"
                SELECT {NOTIFICATION_COLUMNS}
                FROM notifications n
                {WHERE}
                ORDER BY n.created_at DESC LIMIT $3 OFFSET $4
            "#
        );
        let rows = sqlx::query_as::<_, NotificationRow>(&sql)
            .bind(user_id.as_uuid())
            .bind(unread_only)
            .bind(page.sql_limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let items = rows
            .into_iter()
            .map(NotificationRow::into_notification)
            .collect::<MarketResult<Vec<_>>>()?;
        Ok((items, count(total)))
    }

    async fn count_unread_notifications(&self, user_id: &UserId) -> MarketResult<u64> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(count(total))
    }

    async fn mark_notification_read(
        &self,
        user_id: &UserId,
        id: &NotificationId,
    ) -> MarketResult<bool> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2")
                .bind(id.as_uuid())
                .bind(user_id.as_uuid())
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_all_notifications_read(&self, user_id: &UserId) -> MarketResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_notification(
        &self,
        user_id: &UserId,
        id: &NotificationId,
    ) -> MarketResult<bool> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id.as_uuid())
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// User Directory Implementation
// ============================================================================

const USER_SUMMARY_SQL: &str = r#"
    SELECT
        u.id,
        u.first_name,
        u.last_name,
        u.email,
        u.phone,
        u.avatar,
        u.role,
        u.is_active,
        p.business_name,
        p.city
    FROM users u
    LEFT JOIN provider_profiles p ON p.user_id = u.id
"#;

impl UserDirectory for PgMarketRepository {
    async fn find_user_summary(&self, id: &UserId) -> MarketResult<Option<UserSummary>> {
        let sql = format!("{USER_SUMMARY_SQL} WHERE u.id = $1");
        let row = sqlx::query_as::<_, UserSummaryRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserSummaryRow::into_summary).transpose()
    }

    async fn find_user_summaries(&self, ids: &[UserId]) -> MarketResult<Vec<UserSummary>> {
        let sql = format!("{USER_SUMMARY_SQL} WHERE u.id = ANY($1)");
        let rows = sqlx::query_as::<_, UserSummaryRow>(&sql)
            .bind(uuids(ids))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(UserSummaryRow::into_summary).collect()
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: Uuid,
    slug: String,
    name: Json<LocalizedText>,
    icon: Option<String>,
    sort_order: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl CategoryRow {
    fn into_category(self, subcategories: Vec<Subcategory>) -> Category {
        Category {
            id: CategoryId::from_uuid(self.id),
            slug: self.slug,
            name: self.name.0,
            icon: self.icon,
            sort_order: self.sort_order,
            is_active: self.is_active,
            subcategories,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SubcategoryRow {
    id: Uuid,
    category_id: Uuid,
    slug: String,
    name: Json<LocalizedText>,
    sort_order: i32,
}

impl SubcategoryRow {
    fn into_subcategory(self) -> Subcategory {
        Subcategory {
            id: SubcategoryId::from_uuid(self.id),
            category_id: CategoryId::from_uuid(self.category_id),
            slug: self.slug,
            name: self.name.0,
            sort_order: self.sort_order,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ServiceRow {
    id: Uuid,
    provider_id: Uuid,
    category_id: Uuid,
    subcategory_id: Option<Uuid>,
    title: Json<LocalizedText>,
    description: Json<LocalizedText>,
    price: Decimal,
    price_type: i16,
    duration_minutes: Option<i32>,
    service_area: Option<String>,
    images: Vec<String>,
    is_active: bool,
    is_available: bool,
    average_rating: f64,
    total_reviews: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ServiceRow {
    fn into_service(self) -> MarketResult<Service> {
        let price_type = PriceType::from_id(self.price_type).ok_or_else(|| {
            MarketError::Internal(format!("Invalid price type id: {}", self.price_type))
        })?;

        Ok(Service {
            id: ServiceId::from_uuid(self.id),
            provider_id: UserId::from_uuid(self.provider_id),
            category_id: CategoryId::from_uuid(self.category_id),
            subcategory_id: self.subcategory_id.map(SubcategoryId::from_uuid),
            title: self.title.0,
            description: self.description.0,
            price: self.price,
            price_type,
            duration_minutes: self.duration_minutes,
            service_area: self.service_area,
            images: self.images,
            is_active: self.is_active,
            is_available: self.is_available,
            rating: RatingSummary {
                average_rating: self.average_rating,
                total_reviews: i64::from(self.total_reviews),
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    customer_id: Uuid,
    provider_id: Uuid,
    service_id: Uuid,
    scheduled_date: NaiveDate,
    scheduled_time: Option<NaiveTime>,
    duration_minutes: Option<i32>,
    address: Option<String>,
    notes: Option<String>,
    total_price: Decimal,
    status: i16,
    provider_notes: Option<String>,
    cancellation_reason: Option<String>,
    cancelled_by: Option<Uuid>,
    cancelled_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BookingRow {
    fn into_booking(self) -> MarketResult<Booking> {
        let status = BookingStatus::from_id(self.status).ok_or_else(|| {
            MarketError::Internal(format!("Invalid booking status id: {}", self.status))
        })?;

        Ok(Booking {
            id: BookingId::from_uuid(self.id),
            customer_id: UserId::from_uuid(self.customer_id),
            provider_id: UserId::from_uuid(self.provider_id),
            service_id: ServiceId::from_uuid(self.service_id),
            scheduled_date: self.scheduled_date,
            scheduled_time: self.scheduled_time,
            duration_minutes: self.duration_minutes,
            address: self.address,
            notes: self.notes,
            total_price: self.total_price,
            status,
            provider_notes: self.provider_notes,
            cancellation_reason: self.cancellation_reason,
            cancelled_by: self.cancelled_by.map(UserId::from_uuid),
            cancelled_at: self.cancelled_at,
            completed_at: self.completed_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: Uuid,
    booking_id: Uuid,
    service_id: Uuid,
    customer_id: Uuid,
    provider_id: Uuid,
    rating: i16,
    comment: Option<String>,
    provider_response: Option<String>,
    responded_at: Option<DateTime<Utc>>,
    is_approved: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ReviewRow {
    fn into_review(self) -> Review {
        Review {
            id: ReviewId::from_uuid(self.id),
            booking_id: BookingId::from_uuid(self.booking_id),
            service_id: ServiceId::from_uuid(self.service_id),
            customer_id: UserId::from_uuid(self.customer_id),
            provider_id: UserId::from_uuid(self.provider_id),
            rating: self.rating,
            comment: self.comment,
            provider_response: self.provider_response,
            responded_at: self.responded_at,
            is_approved: self.is_approved,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    sender_id: Uuid,
    receiver_id: Uuid,
    booking_id: Option<Uuid>,
    content: String,
    is_read: bool,
    read_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl MessageRow {
    fn into_message(self) -> Message {
        Message {
            id: MessageId::from_uuid(self.id),
            sender_id: UserId::from_uuid(self.sender_id),
            receiver_id: UserId::from_uuid(self.receiver_id),
            booking_id: self.booking_id.map(BookingId::from_uuid),
            content: self.content,
            is_read: self.is_read,
            read_at: self.read_at,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ConversationRow {
    #[sqlx(flatten)]
    message: MessageRow,
    partner_id: Uuid,
    unread_count: i64,
}

#[derive(sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    user_id: Uuid,
    kind: i16,
    title: String,
    body: String,
    payload: Json<Value>,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl NotificationRow {
    fn into_notification(self) -> MarketResult<Notification> {
        let kind = NotificationKind::from_id(self.kind).ok_or_else(|| {
            MarketError::Internal(format!("Invalid notification kind id: {}", self.kind))
        })?;

        Ok(Notification {
            id: NotificationId::from_uuid(self.id),
            user_id: UserId::from_uuid(self.user_id),
            kind,
            title: self.title,
            body: self.body,
            payload: self.payload.0,
            is_read: self.is_read,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct UserSummaryRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    phone: Option<String>,
    avatar: Option<String>,
    role: i16,
    is_active: bool,
    business_name: Option<String>,
    city: Option<String>,
}

impl UserSummaryRow {
    fn into_summary(self) -> MarketResult<UserSummary> {
        let role = UserRole::from_id(self.role)
            .ok_or_else(|| MarketError::Internal(format!("Invalid role id: {}", self.role)))?;

        Ok(UserSummary {
            id: UserId::from_uuid(self.id),
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            avatar: self.avatar,
            role,
            is_active: self.is_active,
            business_name: self.business_name,
            city: self.city,
        })
    }
}
