//! Use-case and router tests for the marketplace crate
//!
//! Everything runs against an in-memory store through the generic routers.
//! Callers are identified by an `x-test-user` header that a stub layer turns
//! into the `AuthContext` the real `authenticate` middleware would insert.

#[cfg(test)]
pub(crate) mod support {
    use std::sync::{Arc, Mutex};

    use auth::{AuthContext, AuthUser, UserRole};
    use axum::Router;
    use axum::body::Body;
    use axum::extract::{Request, State};
    use axum::http::{StatusCode, header};
    use axum::middleware::Next;
    use axum::response::Response;
    use chrono::{Duration, NaiveDate, Utc};
    use http_body_util::BodyExt;
    use kernel::i18n::LocalizedText;
    use kernel::id::{
        BookingId, CategoryId, MessageId, NotificationId, ReviewId, ServiceId, UserId,
    };
    use kernel::pagination::PageRequest;
    use rust_decimal::Decimal;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::application::MarketConfig;
    use crate::domain::entity::{
        booking::{Booking, NewBooking},
        category::{Category, Subcategory},
        message::{Conversation, Message},
        notification::Notification,
        review::Review,
        service::{NewService, Service},
        user_summary::UserSummary,
    };
    use crate::domain::repository::{
        BookingFilter, BookingRepository, CatalogRepository, MessageRepository,
        NotificationRepository, ReviewFilter, ReviewRepository, ServiceFilter, ServiceSort,
        UserDirectory,
    };
    use crate::domain::value_object::{
        booking_status::BookingStatus, price_type::PriceType, rating::RatingSummary,
    };
    use crate::error::{MarketError, MarketResult};
    use crate::presentation::router::marketplace_router_generic;

    pub const TEST_USER_HEADER: &str = "x-test-user";

    #[derive(Default)]
    struct Tables {
        users: Vec<UserSummary>,
        categories: Vec<Category>,
        services: Vec<Service>,
        bookings: Vec<Booking>,
        reviews: Vec<Review>,
        messages: Vec<Message>,
        notifications: Vec<Notification>,
        fail_notifications: bool,
    }

    /// In-memory marketplace store
    #[derive(Clone, Default)]
    pub struct MemoryMarketStore {
        inner: Arc<Mutex<Tables>>,
    }

    fn paginate<T: Clone>(items: &[T], page: PageRequest) -> Vec<T> {
        items
            .iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect()
    }

    fn refresh_rating(tables: &mut Tables, service_id: &ServiceId) -> MarketResult<RatingSummary> {
        let (sum, count) = tables
            .reviews
            .iter()
            .filter(|r| &r.service_id == service_id && r.is_approved)
            .fold((0i64, 0i64), |(sum, count), r| (sum + i64::from(r.rating), count + 1));
        let summary = RatingSummary::from_totals(sum, count);
        let service = tables
            .services
            .iter_mut()
            .find(|s| &s.id == service_id)
            .ok_or(MarketError::ServiceNotFound)?;
        service.rating = summary;
        Ok(summary)
    }

    // ------------------------------------------------------------------
    // Fixtures
    // ------------------------------------------------------------------

    impl MemoryMarketStore {
        pub fn add_user(&self, role: UserRole, first_name: &str) -> AuthUser {
            let id = UserId::new();
            let email = format!("{}-{}@example.com", first_name.to_lowercase(), id);
            self.inner.lock().unwrap().users.push(UserSummary {
                id,
                first_name: first_name.to_string(),
                last_name: "Test".to_string(),
                email: email.clone(),
                phone: None,
                avatar: None,
                role,
                is_active: true,
                business_name: None,
                city: None,
            });
            AuthUser { id, email, role }
        }

        pub fn deactivate_user(&self, id: &UserId) {
            let mut tables = self.inner.lock().unwrap();
            if let Some(user) = tables.users.iter_mut().find(|u| &u.id == id) {
                user.is_active = false;
            }
        }

        /// Category with a single `general` subcategory
        pub fn add_category(&self, slug: &str) -> Category {
            let mut category = Category::new(
                slug.to_string(),
                LocalizedText::english(slug),
                None,
                0,
            );
            category.subcategories.push(Subcategory::new(
                category.id,
                "general".into(),
                LocalizedText::english("General"),
                0,
            ));
            self.inner.lock().unwrap().categories.push(category.clone());
            category
        }

        pub fn add_service(&self, provider: &AuthUser, category: &Category, price: i64) -> Service {
            let service = Service::new(
                provider.id,
                NewService {
                    category_id: category.id,
                    subcategory_id: None,
                    title: LocalizedText::english("Leak repair"),
                    description: LocalizedText::english("Kitchen and bathroom"),
                    price: Decimal::new(price, 0),
                    price_type: PriceType::Fixed,
                    duration_minutes: Some(60),
                    service_area: Some("Casablanca".into()),
                    images: vec![],
                },
            );
            self.inner.lock().unwrap().services.push(service.clone());
            service
        }

        pub fn add_booking(
            &self,
            customer: &AuthUser,
            service: &Service,
            status: BookingStatus,
        ) -> Booking {
            let mut booking = Booking::new(
                customer.id,
                service,
                NewBooking {
                    scheduled_date: Utc::now().date_naive() + Duration::days(3),
                    scheduled_time: None,
                    duration_minutes: None,
                    address: None,
                    notes: None,
                },
            );
            booking.status = status;
            self.inner.lock().unwrap().bookings.push(booking.clone());
            booking
        }

        pub fn service(&self, id: &ServiceId) -> Option<Service> {
            let tables = self.inner.lock().unwrap();
            tables.services.iter().find(|s| &s.id == id).cloned()
        }

        pub fn set_service_flags(&self, id: &ServiceId, active: bool, available: bool) {
            let mut tables = self.inner.lock().unwrap();
            if let Some(s) = tables.services.iter_mut().find(|s| &s.id == id) {
                s.is_active = active;
                s.is_available = available;
            }
        }

        pub fn booking(&self, id: &BookingId) -> Option<Booking> {
            let tables = self.inner.lock().unwrap();
            tables.bookings.iter().find(|b| &b.id == id).cloned()
        }

        pub fn notifications_for(&self, user_id: &UserId) -> Vec<Notification> {
            let tables = self.inner.lock().unwrap();
            tables
                .notifications
                .iter()
                .filter(|n| &n.user_id == user_id)
                .cloned()
                .collect()
        }

        pub fn review_count(&self) -> usize {
            self.inner.lock().unwrap().reviews.len()
        }

        pub fn fail_notifications(&self) {
            self.inner.lock().unwrap().fail_notifications = true;
        }

        fn auth_user(&self, id: &UserId) -> Option<AuthUser> {
            let tables = self.inner.lock().unwrap();
            tables
                .users
                .iter()
                .find(|u| &u.id == id && u.is_active)
                .map(|u| AuthUser {
                    id: u.id,
                    email: u.email.clone(),
                    role: u.role,
                })
        }
    }

    // ------------------------------------------------------------------
    // Repository implementations
    // ------------------------------------------------------------------

    impl CatalogRepository for MemoryMarketStore {
        async fn list_categories(&self, include_inactive: bool) -> MarketResult<Vec<Category>> {
            let tables = self.inner.lock().unwrap();
            let mut categories: Vec<Category> = tables
                .categories
                .iter()
                .filter(|c| include_inactive || c.is_active)
                .cloned()
                .collect();
            categories.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.slug.cmp(&b.slug)));
            Ok(categories)
        }

        async fn find_category(&self, id: &CategoryId) -> MarketResult<Option<Category>> {
            let tables = self.inner.lock().unwrap();
            Ok(tables.categories.iter().find(|c| &c.id == id).cloned())
        }

        async fn find_category_by_slug(&self, slug: &str) -> MarketResult<Option<Category>> {
            let tables = self.inner.lock().unwrap();
            Ok(tables.categories.iter().find(|c| c.slug == slug).cloned())
        }

        async fn insert_category(&self, category: &Category) -> MarketResult<()> {
            let mut tables = self.inner.lock().unwrap();
            if tables.categories.iter().any(|c| c.slug == category.slug) {
                return Err(MarketError::SlugTaken);
            }
            tables.categories.push(category.clone());
            Ok(())
        }

        async fn insert_subcategory(&self, subcategory: &Subcategory) -> MarketResult<()> {
            let mut tables = self.inner.lock().unwrap();
            let category = tables
                .categories
                .iter_mut()
                .find(|c| c.id == subcategory.category_id)
                .ok_or(MarketError::CategoryNotFound)?;
            if category.subcategories.iter().any(|s| s.slug == subcategory.slug) {
                return Err(MarketError::SlugTaken);
            }
            category.subcategories.push(subcategory.clone());
            Ok(())
        }

        async fn insert_service(&self, service: &Service) -> MarketResult<()> {
            self.inner.lock().unwrap().services.push(service.clone());
            Ok(())
        }

        async fn find_service(&self, id: &ServiceId) -> MarketResult<Option<Service>> {
            Ok(self.service(id))
        }

        async fn find_services(&self, ids: &[ServiceId]) -> MarketResult<Vec<Service>> {
            let tables = self.inner.lock().unwrap();
            Ok(tables
                .services
                .iter()
                .filter(|s| ids.contains(&s.id))
                .cloned()
                .collect())
        }

        async fn update_service(&self, service: &Service) -> MarketResult<()> {
            let mut tables = self.inner.lock().unwrap();
            if let Some(existing) = tables.services.iter_mut().find(|s| s.id == service.id) {
                let rating = existing.rating;
                *existing = service.clone();
                existing.rating = rating;
            }
            Ok(())
        }

        async fn delete_service(&self, id: &ServiceId) -> MarketResult<()> {
            let mut tables = self.inner.lock().unwrap();
            tables.services.retain(|s| &s.id != id);
            tables.bookings.retain(|b| &b.service_id != id);
            tables.reviews.retain(|r| &r.service_id != id);
            Ok(())
        }

        async fn list_services(
            &self,
            filter: &ServiceFilter,
            page: PageRequest,
        ) -> MarketResult<(Vec<Service>, u64)> {
            let tables = self.inner.lock().unwrap();
            let mut matching: Vec<Service> = tables
                .services
                .iter()
                .rev()
                .filter(|s| !filter.active_only || s.is_active)
                .filter(|s| filter.category_id.is_none_or(|c| s.category_id == c))
                .filter(|s| filter.subcategory_id.is_none_or(|c| s.subcategory_id == Some(c)))
                .filter(|s| filter.provider_id.is_none_or(|p| s.provider_id == p))
                .filter(|s| filter.min_price.is_none_or(|p| s.price >= p))
                .filter(|s| filter.max_price.is_none_or(|p| s.price <= p))
                .filter(|s| filter.available.is_none_or(|a| s.is_available == a))
                .filter(|s| match filter.search.as_deref() {
                    Some(term) => {
                        s.title.contains_ignore_case(term)
                            || s.description.contains_ignore_case(term)
                    }
                    None => true,
                })
                .cloned()
                .collect();

            match filter.sort {
                ServiceSort::Newest => {}
                ServiceSort::PriceAsc => matching.sort_by(|a, b| a.price.cmp(&b.price)),
                ServiceSort::PriceDesc => matching.sort_by(|a, b| b.price.cmp(&a.price)),
                ServiceSort::Rating => matching.sort_by(|a, b| {
                    b.rating
                        .average_rating
                        .total_cmp(&a.rating.average_rating)
                        .then(b.rating.total_reviews.cmp(&a.rating.total_reviews))
                }),
            }

            Ok((paginate(&matching, page), matching.len() as u64))
        }
    }

    impl BookingRepository for MemoryMarketStore {
        async fn insert_booking(&self, booking: &Booking) -> MarketResult<()> {
            self.inner.lock().unwrap().bookings.push(booking.clone());
            Ok(())
        }

        async fn find_booking(&self, id: &BookingId) -> MarketResult<Option<Booking>> {
            Ok(self.booking(id))
        }

        async fn update_booking(
            &self,
            booking: &Booking,
            expected: BookingStatus,
        ) -> MarketResult<()> {
            let mut tables = self.inner.lock().unwrap();
            match tables
                .bookings
                .iter_mut()
                .find(|b| b.id == booking.id && b.status == expected)
            {
                Some(existing) => {
                    *existing = booking.clone();
                    Ok(())
                }
                None => Err(MarketError::BookingStatusChanged),
            }
        }

        async fn list_bookings(
            &self,
            filter: &BookingFilter,
            page: PageRequest,
        ) -> MarketResult<(Vec<Booking>, u64)> {
            let tables = self.inner.lock().unwrap();
            let matching: Vec<Booking> = tables
                .bookings
                .iter()
                .rev()
                .filter(|b| filter.customer_id.is_none_or(|c| b.customer_id == c))
                .filter(|b| filter.provider_id.is_none_or(|p| b.provider_id == p))
                .filter(|b| filter.status.is_none_or(|s| b.status == s))
                .cloned()
                .collect();
            Ok((paginate(&matching, page), matching.len() as u64))
        }

        async fn has_open_bookings(&self, service_id: &ServiceId) -> MarketResult<bool> {
            let tables = self.inner.lock().unwrap();
            Ok(tables
                .bookings
                .iter()
                .any(|b| &b.service_id == service_id && b.status.is_open()))
        }
    }

    impl ReviewRepository for MemoryMarketStore {
        async fn find_review(&self, id: &ReviewId) -> MarketResult<Option<Review>> {
            let tables = self.inner.lock().unwrap();
            Ok(tables.reviews.iter().find(|r| &r.id == id).cloned())
        }

        async fn find_review_for_booking(
            &self,
            customer_id: &UserId,
            booking_id: &BookingId,
        ) -> MarketResult<Option<Review>> {
            let tables = self.inner.lock().unwrap();
            Ok(tables
                .reviews
                .iter()
                .find(|r| &r.customer_id == customer_id && &r.booking_id == booking_id)
                .cloned())
        }

        async fn list_reviews(
            &self,
            filter: &ReviewFilter,
            page: PageRequest,
        ) -> MarketResult<(Vec<Review>, u64)> {
            let tables = self.inner.lock().unwrap();
            let matching: Vec<Review> = tables
                .reviews
                .iter()
                .rev()
                .filter(|r| filter.service_id.is_none_or(|s| r.service_id == s))
                .filter(|r| filter.customer_id.is_none_or(|c| r.customer_id == c))
                .filter(|r| filter.provider_id.is_none_or(|p| r.provider_id == p))
                .filter(|r| !filter.approved_only || r.is_approved)
                .cloned()
                .collect();
            Ok((paginate(&matching, page), matching.len() as u64))
        }

        async fn insert_review(&self, review: &Review) -> MarketResult<RatingSummary> {
            let mut tables = self.inner.lock().unwrap();
            if tables
                .reviews
                .iter()
                .any(|r| r.customer_id == review.customer_id && r.booking_id == review.booking_id)
            {
                return Err(MarketError::AlreadyReviewed);
            }
            tables.reviews.push(review.clone());
            refresh_rating(&mut tables, &review.service_id)
        }

        async fn save_review(&self, review: &Review) -> MarketResult<RatingSummary> {
            let mut tables = self.inner.lock().unwrap();
            if let Some(existing) = tables.reviews.iter_mut().find(|r| r.id == review.id) {
                *existing = review.clone();
            }
            refresh_rating(&mut tables, &review.service_id)
        }

        async fn remove_review(&self, review: &Review) -> MarketResult<RatingSummary> {
            let mut tables = self.inner.lock().unwrap();
            tables.reviews.retain(|r| r.id != review.id);
            refresh_rating(&mut tables, &review.service_id)
        }
    }

    impl MessageRepository for MemoryMarketStore {
        async fn insert_message(&self, message: &Message) -> MarketResult<()> {
            self.inner.lock().unwrap().messages.push(message.clone());
            Ok(())
        }

        async fn find_message(&self, id: &MessageId) -> MarketResult<Option<Message>> {
            let tables = self.inner.lock().unwrap();
            Ok(tables.messages.iter().find(|m| &m.id == id).cloned())
        }

        async fn save_message(&self, message: &Message) -> MarketResult<()> {
            let mut tables = self.inner.lock().unwrap();
            if let Some(existing) = tables.messages.iter_mut().find(|m| m.id == message.id) {
                *existing = message.clone();
            }
            Ok(())
        }

        async fn list_conversation(
            &self,
            user_id: &UserId,
            partner_id: &UserId,
            page: PageRequest,
        ) -> MarketResult<(Vec<Message>, u64)> {
            let tables = self.inner.lock().unwrap();
            let matching: Vec<Message> = tables
                .messages
                .iter()
                .rev()
                .filter(|m| {
                    (&m.sender_id == user_id && &m.receiver_id == partner_id)
                        || (&m.sender_id == partner_id && &m.receiver_id == user_id)
                })
                .cloned()
                .collect();
            Ok((paginate(&matching, page), matching.len() as u64))
        }

        async fn mark_conversation_read(
            &self,
            receiver_id: &UserId,
            partner_id: &UserId,
        ) -> MarketResult<u64> {
            let mut tables = self.inner.lock().unwrap();
            let mut marked = 0;
            for m in tables.messages.iter_mut().filter(|m| {
                &m.receiver_id == receiver_id && &m.sender_id == partner_id && !m.is_read
            }) {
                m.mark_read();
                marked += 1;
            }
            Ok(marked)
        }

        async fn list_booking_messages(
            &self,
            booking_id: &BookingId,
        ) -> MarketResult<Vec<Message>> {
            let tables = self.inner.lock().unwrap();
            Ok(tables
                .messages
                .iter()
                .filter(|m| m.booking_id.as_ref() == Some(booking_id))
                .cloned()
                .collect())
        }

        async fn list_conversations(&self, user_id: &UserId) -> MarketResult<Vec<Conversation>> {
            let tables = self.inner.lock().unwrap();
            let mut conversations: Vec<Conversation> = Vec::new();
            for m in tables
                .messages
                .iter()
                .rev()
                .filter(|m| &m.sender_id == user_id || &m.receiver_id == user_id)
            {
                let partner_id = m.partner_of(user_id);
                if conversations.iter().any(|c| c.partner_id == partner_id) {
                    continue;
                }
                let unread_count = tables
                    .messages
                    .iter()
                    .filter(|u| {
                        u.sender_id == partner_id && &u.receiver_id == user_id && !u.is_read
                    })
                    .count() as u64;
                conversations.push(Conversation {
                    partner_id,
                    last_message: m.clone(),
                    unread_count,
                });
            }
            Ok(conversations)
        }

        async fn count_unread_messages(&self, user_id: &UserId) -> MarketResult<u64> {
            let tables = self.inner.lock().unwrap();
            Ok(tables
                .messages
                .iter()
                .filter(|m| &m.receiver_id == user_id && !m.is_read)
                .count() as u64)
        }
    }

    impl NotificationRepository for MemoryMarketStore {
        async fn insert_notification(&self, notification: &Notification) -> MarketResult<()> {
            let mut tables = self.inner.lock().unwrap();
            if tables.fail_notifications {
                return Err(MarketError::Internal("notifications unavailable".into()));
            }
            tables.notifications.push(notification.clone());
            Ok(())
        }

        async fn list_notifications(
            &self,
            user_id: &UserId,
            unread_only: bool,
            page: PageRequest,
        ) -> MarketResult<(Vec<Notification>, u64)> {
            let tables = self.inner.lock().unwrap();
            let matching: Vec<Notification> = tables
                .notifications
                .iter()
                .rev()
                .filter(|n| &n.user_id == user_id && (!unread_only || !n.is_read))
                .cloned()
                .collect();
            Ok((paginate(&matching, page), matching.len() as u64))
        }

        async fn count_unread_notifications(&self, user_id: &UserId) -> MarketResult<u64> {
            let tables = self.inner.lock().unwrap();
            Ok(tables
                .notifications
                .iter()
                .filter(|n| &n.user_id == user_id && !n.is_read)
                .count() as u64)
        }

        async fn mark_notification_read(
            &self,
            user_id: &UserId,
            id: &NotificationId,
        ) -> MarketResult<bool> {
            let mut tables = self.inner.lock().unwrap();
            match tables
                .notifications
                .iter_mut()
                .find(|n| &n.id == id && &n.user_id == user_id)
            {
                Some(n) => {
                    n.is_read = true;
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn mark_all_notifications_read(&self, user_id: &UserId) -> MarketResult<u64> {
            let mut tables = self.inner.lock().unwrap();
            let mut updated = 0;
            for n in tables
                .notifications
                .iter_mut()
                .filter(|n| &n.user_id == user_id && !n.is_read)
            {
                n.is_read = true;
                updated += 1;
            }
            Ok(updated)
        }

        async fn delete_notification(
            &self,
            user_id: &UserId,
            id: &NotificationId,
        ) -> MarketResult<bool> {
            let mut tables = self.inner.lock().unwrap();
            let before = tables.notifications.len();
            tables
                .notifications
                .retain(|n| !(&n.id == id && &n.user_id == user_id));
            Ok(tables.notifications.len() < before)
        }
    }

    impl UserDirectory for MemoryMarketStore {
        async fn find_user_summary(&self, id: &UserId) -> MarketResult<Option<UserSummary>> {
            let tables = self.inner.lock().unwrap();
            Ok(tables.users.iter().find(|u| &u.id == id).cloned())
        }

        async fn find_user_summaries(&self, ids: &[UserId]) -> MarketResult<Vec<UserSummary>> {
            let tables = self.inner.lock().unwrap();
            Ok(tables
                .users
                .iter()
                .filter(|u| ids.contains(&u.id))
                .cloned()
                .collect())
        }
    }

    // ------------------------------------------------------------------
    // HTTP helpers
    // ------------------------------------------------------------------

    /// Stand-in for `auth::authenticate`
    async fn stub_authenticate(
        State(store): State<MemoryMarketStore>,
        mut req: Request,
        next: Next,
    ) -> Response {
        let caller = req
            .headers()
            .get(TEST_USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<UserId>().ok())
            .and_then(|id| store.auth_user(&id));

        let context = match caller {
            Some(user) => AuthContext::Authenticated(user),
            None => AuthContext::Anonymous,
        };
        req.extensions_mut().insert(context);
        next.run(req).await
    }

    pub fn app(store: &MemoryMarketStore) -> Router {
        Router::new()
            .nest(
                "/api",
                marketplace_router_generic(store.clone(), MarketConfig::default()),
            )
            .layer(axum::middleware::from_fn_with_state(
                store.clone(),
                stub_authenticate,
            ))
    }

    pub async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        caller: Option<&AuthUser>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = axum::http::Request::builder().method(method).uri(uri);
        if let Some(caller) = caller {
            builder = builder.header(TEST_USER_HEADER, caller.id.to_string());
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub fn future_date(days: i64) -> NaiveDate {
        Utc::now().date_naive() + Duration::days(days)
    }

    /// Provider, customer, one category and one bookable service
    pub struct World {
        pub store: MemoryMarketStore,
        pub app: Router,
        pub provider: AuthUser,
        pub customer: AuthUser,
        pub admin: AuthUser,
        pub category: Category,
        pub service: Service,
    }

    pub fn world() -> World {
        let store = MemoryMarketStore::default();
        let provider = store.add_user(UserRole::Provider, "Youssef");
        let customer = store.add_user(UserRole::Customer, "Amina");
        let admin = store.add_user(UserRole::Admin, "Root");
        let category = store.add_category("plumbing");
        let service = store.add_service(&provider, &category, 150);
        let app = app(&store);
        World {
            store,
            app,
            provider,
            customer,
            admin,
            category,
            service,
        }
    }
}

#[cfg(test)]
mod catalog_tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::support::*;

    #[tokio::test]
    async fn test_categories_are_public() {
        let w = world();
        let (status, body) = send(&w.app, "GET", "/api/services/categories", None, None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["slug"], "plumbing");
        assert_eq!(body["data"][0]["subcategories"][0]["slug"], "general");
    }

    #[tokio::test]
    async fn test_only_admin_creates_categories() {
        let w = world();
        let req = json!({ "slug": "gardening", "name": { "en": "Gardening" } });

        let (status, _) = send(
            &w.app,
            "POST",
            "/api/services/categories",
            Some(&w.provider),
            Some(req.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            &w.app,
            "POST",
            "/api/services/categories",
            Some(&w.admin),
            Some(req.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");

        let (status, body) = send(
            &w.app,
            "POST",
            "/api/services/categories",
            Some(&w.admin),
            Some(req),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Slug is already in use");
    }

    #[tokio::test]
    async fn test_invalid_slug_is_a_field_error() {
        let w = world();
        let (status, body) = send(
            &w.app,
            "POST",
            "/api/services/categories",
            Some(&w.admin),
            Some(json!({ "slug": "Home Repair", "name": { "en": "Home" } })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["field"], "slug");
    }
}

#[cfg(test)]
mod service_tests {
    use auth::UserRole;
    use axum::http::StatusCode;
    use serde_json::json;

    use super::support::*;
    use crate::domain::value_object::booking_status::BookingStatus;

    #[tokio::test]
    async fn test_provider_creates_service() {
        let w = world();
        let sub = &w.category.subcategories[0];

        let (status, body) = send(
            &w.app,
            "POST",
            "/api/services",
            Some(&w.provider),
            Some(json!({
                "categoryId": w.category.id,
                "subcategoryId": sub.id,
                "title": { "en": "  Boiler service ", "fr": "Entretien chaudière" },
                "description": { "en": "Annual check" },
                "price": 99.9,
                "priceType": "HOURLY"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED, "{body}");
        let data = &body["data"];
        assert_eq!(data["title"]["en"], "Boiler service");
        assert_eq!(data["price"], json!(99.9));
        assert_eq!(data["priceType"], "HOURLY");
        assert_eq!(data["averageRating"], json!(0.0));
        assert_eq!(data["totalReviews"], 0);
        assert_eq!(data["category"]["slug"], "plumbing");
        assert_eq!(data["provider"]["firstName"], "Youssef");
    }

    #[tokio::test]
    async fn test_customer_cannot_create_service() {
        let w = world();
        let (status, _) = send(
            &w.app,
            "POST",
            "/api/services",
            Some(&w.customer),
            Some(json!({
                "categoryId": w.category.id,
                "title": { "en": "x" },
                "description": { "en": "y" },
                "price": 1
            })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_category_and_subcategory_must_match() {
        let w = world();
        let other = w.store.add_category("cleaning");

        let (status, body) = send(
            &w.app,
            "POST",
            "/api/services",
            Some(&w.provider),
            Some(json!({
                "categoryId": w.category.id,
                "subcategoryId": other.subcategories[0].id,
                "title": { "en": "x" },
                "description": { "en": "y" },
                "price": 10
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Subcategory does not belong to the category");

        let (status, body) = send(
            &w.app,
            "POST",
            "/api/services",
            Some(&w.provider),
            Some(json!({
                "categoryId": kernel::id::CategoryId::new(),
                "title": { "en": "x" },
                "description": { "en": "y" },
                "price": 10
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid category");
    }

    #[tokio::test]
    async fn test_list_filters_and_pagination() {
        let w = world();
        w.store.add_service(&w.provider, &w.category, 40);
        let cleaning = w.store.add_category("cleaning");
        w.store.add_service(&w.provider, &cleaning, 500);

        let (status, body) = send(
            &w.app,
            "GET",
            "/api/services?category=plumbing&sort=price_asc&limit=1&minPrice=oops",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["price"], json!(40.0));
        assert_eq!(body["pagination"]["total"], 2);
        assert_eq!(body["pagination"]["pages"], 2);

        let (_, body) = send(&w.app, "GET", "/api/services?maxPrice=100", None, None).await;
        assert_eq!(body["pagination"]["total"], 1);

        let (_, body) = send(&w.app, "GET", "/api/services?search=KITCHEN", None, None).await;
        assert_eq!(body["pagination"]["total"], 3);
    }

    #[tokio::test]
    async fn test_unknown_category_slug_gives_empty_page() {
        let w = world();
        let (status, body) =
            send(&w.app, "GET", "/api/services?category=nope", None, None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!([]));
        assert_eq!(body["pagination"]["total"], 0);
        assert_eq!(body["pagination"]["pages"], 0);
    }

    #[tokio::test]
    async fn test_inactive_service_visible_only_to_owner() {
        let w = world();
        w.store.set_service_flags(&w.service.id, false, true);
        let uri = format!("/api/services/{}", w.service.id);

        let (status, _) = send(&w.app, "GET", &uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&w.app, "GET", &uri, Some(&w.customer), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&w.app, "GET", &uri, Some(&w.provider), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["isActive"], false);

        let (_, body) = send(&w.app, "GET", "/api/services", None, None).await;
        assert_eq!(body["pagination"]["total"], 0);

        let (_, body) = send(&w.app, "GET", "/api/services/my", Some(&w.provider), None).await;
        assert_eq!(body["pagination"]["total"], 1);
    }

    #[tokio::test]
    async fn test_bad_path_id_is_400() {
        let w = world();
        let (status, body) = send(&w.app, "GET", "/api/services/not-a-uuid", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_only_owner_updates() {
        let w = world();
        let other = w.store.add_user(UserRole::Provider, "Karim");
        let uri = format!("/api/services/{}", w.service.id);

        let (status, _) = send(
            &w.app,
            "PUT",
            &uri,
            Some(&other),
            Some(json!({ "price": 10 })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            &w.app,
            "PUT",
            &uri,
            Some(&w.provider),
            Some(json!({ "price": 175.5, "isAvailable": false })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["price"], json!(175.5));
        assert_eq!(body["data"]["isAvailable"], false);
    }

    #[tokio::test]
    async fn test_category_change_clears_subcategory() {
        let w = world();
        let cleaning = w.store.add_category("cleaning");
        let uri = format!("/api/services/{}", w.service.id);

        send(
            &w.app,
            "PUT",
            &uri,
            Some(&w.provider),
            Some(json!({ "subcategoryId": w.category.subcategories[0].id })),
        )
        .await;
        let (status, body) = send(
            &w.app,
            "PUT",
            &uri,
            Some(&w.provider),
            Some(json!({ "categoryId": cleaning.id })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["subcategoryId"], serde_json::Value::Null);
        assert_eq!(body["data"]["category"]["slug"], "cleaning");
    }

    #[tokio::test]
    async fn test_delete_with_open_booking_deactivates() {
        let w = world();
        w.store
            .add_booking(&w.customer, &w.service, BookingStatus::Confirmed);
        let uri = format!("/api/services/{}", w.service.id);

        let (status, body) = send(&w.app, "DELETE", &uri, Some(&w.provider), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["message"].as_str().unwrap().contains("deactivated"));
        assert!(!w.store.service(&w.service.id).unwrap().is_active);
    }

    #[tokio::test]
    async fn test_delete_without_open_bookings() {
        let w = world();
        w.store
            .add_booking(&w.customer, &w.service, BookingStatus::Completed);
        let uri = format!("/api/services/{}", w.service.id);

        let (status, _) = send(&w.app, "DELETE", &uri, Some(&w.customer), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(&w.app, "DELETE", &uri, Some(&w.admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Service deleted successfully");
        assert!(w.store.service(&w.service.id).is_none());
    }
}

#[cfg(test)]
mod booking_tests {
    use std::sync::Arc;

    use auth::UserRole;
    use axum::http::StatusCode;
    use serde_json::json;

    use super::support::*;
    use crate::application::BookingUseCase;
    use crate::domain::entity::booking::NewBooking;
    use crate::domain::value_object::booking_status::BookingStatus;
    use crate::domain::value_object::notification_kind::NotificationKind;
    use crate::error::MarketError;

    async fn book(w: &World) -> serde_json::Value {
        let (status, body) = send(
            &w.app,
            "POST",
            "/api/bookings",
            Some(&w.customer),
            Some(json!({
                "serviceId": w.service.id,
                "scheduledDate": future_date(2).to_string(),
                "scheduledTime": "10:30",
                "notes": "Second floor"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }

    #[tokio::test]
    async fn test_create_booking_copies_price_and_notifies_provider() {
        let w = world();
        let body = book(&w).await;

        assert_eq!(body["data"]["status"], "PENDING");
        assert_eq!(body["data"]["totalPrice"], json!(150.0));
        assert_eq!(body["data"]["provider"]["firstName"], "Youssef");
        assert_eq!(body["data"]["service"]["id"], json!(w.service.id));

        let notes = w.store.notifications_for(&w.provider.id);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NotificationKind::BookingCreated);
    }

    #[tokio::test]
    async fn test_past_date_is_rejected() {
        let w = world();
        let (status, body) = send(
            &w.app,
            "POST",
            "/api/bookings",
            Some(&w.customer),
            Some(json!({
                "serviceId": w.service.id,
                "scheduledDate": future_date(-1).to_string()
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["field"], "scheduledDate");
    }

    #[tokio::test]
    async fn test_unavailable_or_missing_service() {
        let w = world();
        w.store.set_service_flags(&w.service.id, true, false);

        let (status, body) = send(
            &w.app,
            "POST",
            "/api/bookings",
            Some(&w.customer),
            Some(json!({
                "serviceId": w.service.id,
                "scheduledDate": future_date(1).to_string()
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Service is not available for booking");

        let (status, _) = send(
            &w.app,
            "POST",
            "/api/bookings",
            Some(&w.customer),
            Some(json!({
                "serviceId": kernel::id::ServiceId::new(),
                "scheduledDate": future_date(1).to_string()
            })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_provider_cannot_book_own_service() {
        let w = world();
        let use_case = BookingUseCase::new(Arc::new(w.store.clone()));
        let mut owner = w.provider.clone();
        owner.role = UserRole::Customer;

        let err = use_case
            .create(
                &owner,
                &w.service.id,
                NewBooking {
                    scheduled_date: future_date(1),
                    scheduled_time: None,
                    duration_minutes: None,
                    address: None,
                    notes: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::SelfBooking));
    }

    #[tokio::test]
    async fn test_lists_are_scoped_by_role() {
        let w = world();
        book(&w).await;
        let stranger = w.store.add_user(UserRole::Customer, "Sara");

        for (caller, expected) in [
            (&w.customer, 1),
            (&w.provider, 1),
            (&w.admin, 1),
            (&stranger, 0),
        ] {
            let (status, body) = send(&w.app, "GET", "/api/bookings", Some(caller), None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["pagination"]["total"], expected);
        }

        let (_, body) = send(
            &w.app,
            "GET",
            "/api/bookings?status=COMPLETED",
            Some(&w.customer),
            None,
        )
        .await;
        assert_eq!(body["pagination"]["total"], 0);
        assert_eq!(body["pagination"]["pages"], 0);

        let (status, _) = send(&w.app, "GET", "/api/bookings", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_get_requires_participant() {
        let w = world();
        let booking = w
            .store
            .add_booking(&w.customer, &w.service, BookingStatus::Pending);
        let stranger = w.store.add_user(UserRole::Customer, "Sara");
        let uri = format!("/api/bookings/{}", booking.id);

        let (status, _) = send(&w.app, "GET", &uri, Some(&stranger), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(&w.app, "GET", &uri, Some(&w.admin), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_only_provider_changes_status() {
        let w = world();
        let booking = w
            .store
            .add_booking(&w.customer, &w.service, BookingStatus::Pending);
        let uri = format!("/api/bookings/{}/status", booking.id);

        let (status, _) = send(
            &w.app,
            "PATCH",
            &uri,
            Some(&w.customer),
            Some(json!({ "status": "CONFIRMED" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            &w.app,
            "PATCH",
            &uri,
            Some(&w.provider),
            Some(json!({ "status": "CONFIRMED", "providerNotes": "Bring ladder" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "CONFIRMED");
        assert_eq!(body["data"]["providerNotes"], "Bring ladder");

        let (status, body) = send(
            &w.app,
            "PATCH",
            &uri,
            Some(&w.provider),
            Some(json!({ "status": "CONFIRMED" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Booking is already confirmed");

        let (status, _) = send(
            &w.app,
            "PATCH",
            &uri,
            Some(&w.provider),
            Some(json!({ "status": "PENDING" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &w.app,
            "PATCH",
            &uri,
            Some(&w.provider),
            Some(json!({ "status": "COMPLETED" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"]["completedAt"].is_string());

        let kinds: Vec<NotificationKind> = w
            .store
            .notifications_for(&w.customer.id)
            .iter()
            .map(|n| n.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                NotificationKind::BookingStatusChanged,
                NotificationKind::BookingStatusChanged
            ]
        );
    }

    #[tokio::test]
    async fn test_only_customer_cancels_once() {
        let w = world();
        let booking = w
            .store
            .add_booking(&w.customer, &w.service, BookingStatus::Confirmed);
        let uri = format!("/api/bookings/{}/cancel", booking.id);

        let (status, _) = send(&w.app, "PATCH", &uri, Some(&w.provider), Some(json!({}))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            &w.app,
            "PATCH",
            &uri,
            Some(&w.customer),
            Some(json!({ "reason": "Moved out" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "CANCELLED");
        assert_eq!(body["data"]["cancellationReason"], "Moved out");
        assert_eq!(body["data"]["cancelledBy"], json!(w.customer.id));

        let (status, body) =
            send(&w.app, "PATCH", &uri, Some(&w.customer), Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Booking is already cancelled");

        let stored = w.store.booking(&booking.id).unwrap();
        assert_eq!(stored.status, BookingStatus::Cancelled);
        assert_eq!(
            w.store.notifications_for(&w.provider.id)[0].kind,
            NotificationKind::BookingCancelled
        );
    }

    #[tokio::test]
    async fn test_in_progress_is_not_cancellable() {
        let w = world();
        let booking = w
            .store
            .add_booking(&w.customer, &w.service, BookingStatus::InProgress);
        let uri = format!("/api/bookings/{}/cancel", booking.id);

        let (status, body) =
            send(&w.app, "PATCH", &uri, Some(&w.customer), Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["message"],
            "Only pending or confirmed bookings can be cancelled"
        );
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_fail_booking() {
        let w = world();
        w.store.fail_notifications();

        let body = book(&w).await;
        assert_eq!(body["data"]["status"], "PENDING");
        assert!(w.store.notifications_for(&w.provider.id).is_empty());
    }

    #[tokio::test]
    async fn test_stale_status_write_is_rejected() {
        use crate::domain::repository::BookingRepository;

        let w = world();
        let booking = w
            .store
            .add_booking(&w.customer, &w.service, BookingStatus::Confirmed);

        // provider and customer both loaded the confirmed booking
        let mut completing = w.store.booking(&booking.id).unwrap();
        let mut cancelling = completing.clone();

        let previous = cancelling.status;
        cancelling.cancel(w.customer.id, Some("Plans changed".into())).unwrap();
        w.store.update_booking(&cancelling, previous).await.unwrap();

        let previous = completing.change_status(BookingStatus::Completed, None).unwrap();
        let err = w
            .store
            .update_booking(&completing, previous)
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::BookingStatusChanged));
        assert_eq!(err.to_app_error().status_code(), 400);

        let stored = w.store.booking(&booking.id).unwrap();
        assert_eq!(stored.status, BookingStatus::Cancelled);
        assert!(stored.completed_at.is_none());

        // a fresh read sees the cancellation
        let uri = format!("/api/bookings/{}/status", booking.id);
        let (status, body) = send(
            &w.app,
            "PATCH",
            &uri,
            Some(&w.provider),
            Some(json!({ "status": "COMPLETED" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["message"],
            "Cannot change booking status from cancelled to completed"
        );
    }
}

#[cfg(test)]
mod review_tests {
    use auth::{AuthUser, UserRole};
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use super::support::*;
    use crate::domain::entity::booking::Booking;
    use crate::domain::value_object::booking_status::BookingStatus;
    use crate::domain::value_object::notification_kind::NotificationKind;

    async fn review(
        w: &World,
        customer: &AuthUser,
        booking: &Booking,
        rating: i64,
    ) -> (StatusCode, Value) {
        send(
            &w.app,
            "POST",
            "/api/reviews",
            Some(customer),
            Some(json!({ "bookingId": booking.id, "rating": rating, "comment": "Great" })),
        )
        .await
    }

    fn rating(w: &World) -> (f64, i64) {
        let s = w.store.service(&w.service.id).unwrap();
        (s.rating.average_rating, s.rating.total_reviews)
    }

    #[tokio::test]
    async fn test_review_requires_completed_owned_booking() {
        let w = world();
        let pending = w
            .store
            .add_booking(&w.customer, &w.service, BookingStatus::Pending);
        let (status, body) = review(&w, &w.customer, &pending, 5).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "You can only review completed bookings");

        let completed = w
            .store
            .add_booking(&w.customer, &w.service, BookingStatus::Completed);
        let stranger = w.store.add_user(UserRole::Customer, "Sara");
        let (status, _) = review(&w, &stranger, &completed, 5).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = review(&w, &w.provider, &completed, 5).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(w.store.review_count(), 0);
    }

    #[tokio::test]
    async fn test_one_review_per_booking() {
        let w = world();
        let booking = w
            .store
            .add_booking(&w.customer, &w.service, BookingStatus::Completed);

        let (status, body) = review(&w, &w.customer, &booking, 4).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(body["data"]["customer"]["firstName"], "Amina");

        let (status, body) = review(&w, &w.customer, &booking, 2).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "You have already reviewed this booking");
        assert_eq!(w.store.review_count(), 1);

        let notes = w.store.notifications_for(&w.provider.id);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NotificationKind::NewReview);
    }

    #[tokio::test]
    async fn test_rating_tracks_reviews() {
        let w = world();
        assert_eq!(rating(&w), (0.0, 0));

        let first = w
            .store
            .add_booking(&w.customer, &w.service, BookingStatus::Completed);
        let (_, body) = review(&w, &w.customer, &first, 5).await;
        let first_review = body["data"]["id"].as_str().unwrap().to_string();
        assert_eq!(rating(&w), (5.0, 1));

        let second_customer = w.store.add_user(UserRole::Customer, "Sara");
        let second = w
            .store
            .add_booking(&second_customer, &w.service, BookingStatus::Completed);
        review(&w, &second_customer, &second, 4).await;

        let third_customer = w.store.add_user(UserRole::Customer, "Nadia");
        let third = w
            .store
            .add_booking(&third_customer, &w.service, BookingStatus::Completed);
        let (_, body) = review(&w, &third_customer, &third, 4).await;
        let third_review = body["data"]["id"].as_str().unwrap().to_string();
        assert_eq!(rating(&w), (4.33, 3));

        let (status, _) = send(
            &w.app,
            "PUT",
            &format!("/api/reviews/{third_review}"),
            Some(&third_customer),
            Some(json!({ "rating": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(rating(&w), (3.33, 3));

        let (status, _) = send(
            &w.app,
            "PATCH",
            &format!("/api/reviews/{third_review}/approval"),
            Some(&w.admin),
            Some(json!({ "isApproved": false })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(rating(&w), (4.5, 2));

        let (_, body) = send(
            &w.app,
            "GET",
            &format!("/api/reviews/service/{}", w.service.id),
            None,
            None,
        )
        .await;
        assert_eq!(body["pagination"]["total"], 2);

        for (id, author) in [(&first_review, &w.customer), (&third_review, &third_customer)] {
            let (status, _) = send(
                &w.app,
                "DELETE",
                &format!("/api/reviews/{id}"),
                Some(author),
                None,
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }
        assert_eq!(rating(&w), (4.0, 1));

        let (_, body) = send(
            &w.app,
            "GET",
            &format!("/api/reviews/service/{}", w.service.id),
            None,
            None,
        )
        .await;
        let last = body["data"][0]["id"].as_str().unwrap().to_string();
        let (status, body) = send(
            &w.app,
            "DELETE",
            &format!("/api/reviews/{last}"),
            Some(&w.admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!({ "averageRating": 0.0, "totalReviews": 0 }));
        assert_eq!(rating(&w), (0.0, 0));
    }

    #[tokio::test]
    async fn test_only_author_edits() {
        let w = world();
        let booking = w
            .store
            .add_booking(&w.customer, &w.service, BookingStatus::Completed);
        let (_, body) = review(&w, &w.customer, &booking, 3).await;
        let uri = format!("/api/reviews/{}", body["data"]["id"].as_str().unwrap());

        let (status, _) = send(
            &w.app,
            "PUT",
            &uri,
            Some(&w.provider),
            Some(json!({ "rating": 5 })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(&w.app, "DELETE", &uri, Some(&w.provider), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_provider_response() {
        let w = world();
        let booking = w
            .store
            .add_booking(&w.customer, &w.service, BookingStatus::Completed);
        let (_, body) = review(&w, &w.customer, &booking, 2).await;
        let uri = format!(
            "/api/reviews/{}/response",
            body["data"]["id"].as_str().unwrap()
        );

        let other = w.store.add_user(UserRole::Provider, "Karim");
        let (status, _) = send(
            &w.app,
            "POST",
            &uri,
            Some(&other),
            Some(json!({ "response": "Sorry" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            &w.app,
            "POST",
            &uri,
            Some(&w.provider),
            Some(json!({ "response": "We will come back for free" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["providerResponse"], "We will come back for free");
        assert!(body["data"]["respondedAt"].is_string());
        assert_eq!(
            w.store.notifications_for(&w.customer.id)[0].kind,
            NotificationKind::ReviewResponse
        );
    }

    #[tokio::test]
    async fn test_my_reviews_by_role() {
        let w = world();
        let booking = w
            .store
            .add_booking(&w.customer, &w.service, BookingStatus::Completed);
        review(&w, &w.customer, &booking, 5).await;

        for caller in [&w.customer, &w.provider] {
            let (_, body) = send(&w.app, "GET", "/api/reviews/my", Some(caller), None).await;
            assert_eq!(body["pagination"]["total"], 1);
            assert_eq!(body["data"][0]["service"]["id"], json!(w.service.id));
        }
    }
}

#[cfg(test)]
mod message_tests {
    use auth::UserRole;
    use axum::http::StatusCode;
    use serde_json::json;

    use super::support::*;
    use crate::domain::value_object::booking_status::BookingStatus;
    use crate::domain::value_object::notification_kind::NotificationKind;

    #[tokio::test]
    async fn test_send_rules() {
        let w = world();

        let (status, body) = send(
            &w.app,
            "POST",
            "/api/messages",
            Some(&w.customer),
            Some(json!({ "receiverId": w.customer.id, "content": "hi" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "You cannot send a message to yourself");

        let gone = w.store.add_user(UserRole::Provider, "Gone");
        w.store.deactivate_user(&gone.id);
        let (status, _) = send(
            &w.app,
            "POST",
            "/api/messages",
            Some(&w.customer),
            Some(json!({ "receiverId": gone.id, "content": "hi" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(
            &w.app,
            "POST",
            "/api/messages",
            Some(&w.customer),
            Some(json!({ "receiverId": w.provider.id, "content": "x".repeat(2001) })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["field"], "content");
    }

    #[tokio::test]
    async fn test_booking_messages_need_participants() {
        let w = world();
        let booking = w
            .store
            .add_booking(&w.customer, &w.service, BookingStatus::Confirmed);
        let stranger = w.store.add_user(UserRole::Customer, "Sara");

        let (status, _) = send(
            &w.app,
            "POST",
            "/api/messages",
            Some(&stranger),
            Some(json!({ "receiverId": w.provider.id, "content": "hi", "bookingId": booking.id })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            &w.app,
            "POST",
            "/api/messages",
            Some(&w.customer),
            Some(json!({
                "receiverId": w.provider.id,
                "content": "Gate code 1234",
                "bookingId": booking.id
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(
            w.store.notifications_for(&w.provider.id)[0].kind,
            NotificationKind::NewMessage
        );

        let uri = format!("/api/messages/booking/{}", booking.id);
        let (status, body) = send(&w.app, "GET", &uri, Some(&w.provider), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["content"], "Gate code 1234");

        let (status, _) = send(&w.app, "GET", &uri, Some(&stranger), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_conversation_flow() {
        let w = world();
        for (from, to, text) in [
            (&w.customer, &w.provider, "Hello"),
            (&w.provider, &w.customer, "Hi, how can I help?"),
            (&w.customer, &w.provider, "Leaking tap"),
        ] {
            let (status, _) = send(
                &w.app,
                "POST",
                "/api/messages",
                Some(from),
                Some(json!({ "receiverId": to.id, "content": text })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (_, body) =
            send(&w.app, "GET", "/api/messages/unread-count", Some(&w.provider), None).await;
        assert_eq!(body["data"]["count"], 2);

        let (_, body) =
            send(&w.app, "GET", "/api/messages/conversations", Some(&w.provider), None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["unreadCount"], 2);
        assert_eq!(body["data"][0]["lastMessage"]["content"], "Leaking tap");
        assert_eq!(body["data"][0]["partner"]["firstName"], "Amina");

        let uri = format!("/api/messages/conversation/{}?limit=2", w.customer.id);
        let (status, body) = send(&w.app, "GET", &uri, Some(&w.provider), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["content"], "Hi, how can I help?");
        assert_eq!(body["data"][1]["content"], "Leaking tap");
        assert_eq!(body["pagination"]["total"], 3);
        assert_eq!(body["pagination"]["pages"], 2);

        let (_, body) =
            send(&w.app, "GET", "/api/messages/unread-count", Some(&w.provider), None).await;
        assert_eq!(body["data"]["count"], 0);
        let (_, body) =
            send(&w.app, "GET", "/api/messages/unread-count", Some(&w.customer), None).await;
        assert_eq!(body["data"]["count"], 1);
    }

    #[tokio::test]
    async fn test_mark_read_is_receiver_only_and_idempotent() {
        let w = world();
        let (_, body) = send(
            &w.app,
            "POST",
            "/api/messages",
            Some(&w.customer),
            Some(json!({ "receiverId": w.provider.id, "content": "ping" })),
        )
        .await;
        let uri = format!("/api/messages/{}/read", body["data"]["id"].as_str().unwrap());

        let (status, _) = send(&w.app, "PATCH", &uri, Some(&w.customer), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, first) = send(&w.app, "PATCH", &uri, Some(&w.provider), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["data"]["isRead"], true);

        let (status, second) = send(&w.app, "PATCH", &uri, Some(&w.provider), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["data"]["readAt"], second["data"]["readAt"]);
    }
}

#[cfg(test)]
mod notification_tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::support::*;

    async fn seed(w: &World, count: usize) {
        for i in 0..count {
            send(
                &w.app,
                "POST",
                "/api/messages",
                Some(&w.customer),
                Some(json!({ "receiverId": w.provider.id, "content": format!("msg {i}") })),
            )
            .await;
        }
    }

    #[tokio::test]
    async fn test_list_and_counts() {
        let w = world();
        seed(&w, 3).await;

        let (status, body) =
            send(&w.app, "GET", "/api/notifications?limit=2", Some(&w.provider), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 2);
        assert_eq!(body["data"][0]["type"], "NEW_MESSAGE");
        assert_eq!(body["data"][0]["body"], "msg 2");
        assert_eq!(body["pagination"]["pages"], 2);

        let (_, body) =
            send(&w.app, "GET", "/api/notifications/unread-count", Some(&w.provider), None).await;
        assert_eq!(body["data"]["count"], 3);

        let (_, body) = send(&w.app, "GET", "/api/notifications", Some(&w.customer), None).await;
        assert_eq!(body["pagination"]["total"], 0);
    }

    #[tokio::test]
    async fn test_read_and_delete_are_owner_only() {
        let w = world();
        seed(&w, 2).await;
        let id = w.store.notifications_for(&w.provider.id)[0].id;

        let read_uri = format!("/api/notifications/{id}/read");
        let (status, _) = send(&w.app, "PATCH", &read_uri, Some(&w.customer), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&w.app, "PATCH", &read_uri, Some(&w.provider), None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(
            &w.app,
            "GET",
            "/api/notifications?unreadOnly=true",
            Some(&w.provider),
            None,
        )
        .await;
        assert_eq!(body["pagination"]["total"], 1);

        let (_, body) =
            send(&w.app, "PATCH", "/api/notifications/read-all", Some(&w.provider), None).await;
        assert_eq!(body["data"]["updated"], 1);

        let delete_uri = format!("/api/notifications/{id}");
        let (status, _) = send(&w.app, "DELETE", &delete_uri, Some(&w.customer), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&w.app, "DELETE", &delete_uri, Some(&w.provider), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(w.store.notifications_for(&w.provider.id).len(), 1);
    }

    #[tokio::test]
    async fn test_requires_authentication() {
        let w = world();
        let (status, body) = send(&w.app, "GET", "/api/notifications", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
    }
}
