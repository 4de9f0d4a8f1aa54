//! HTTP Handlers

use auth::{AuthUser, UserRole};
use axum::extract::{Query, State};
use kernel::envelope::ApiResponse;
use kernel::id::{BookingId, CategoryId, MessageId, NotificationId, ReviewId, ServiceId, UserId};
use kernel::pagination::PageQuery;
use kernel::validation::{Valid, ValidPath};
use std::sync::Arc;

use crate::application::{
    BookingUseCase, CategoryUseCase, DeleteOutcome, MarketConfig, MessageUseCase,
    NotificationUseCase, ReviewUseCase, ServiceUseCase,
};
use crate::domain::repository::MarketStore;
use crate::domain::value_object::rating::RatingSummary;
use crate::error::MarketResult;
use crate::presentation::dto::{
    BookingListQuery, BookingResponse, CancelBookingRequest, CategoryResponse, ConversationResponse,
    CountResponse, CreateBookingRequest, CreateCategoryRequest, CreateReviewRequest,
    CreateServiceRequest, LangQuery, MessageResponse, NotificationListQuery, NotificationResponse,
    ReviewApprovalRequest, ReviewReplyRequest, ReviewResponse, SendMessageRequest,
    ServiceDetailResponse, ServiceListQuery, ServiceResponse, SubcategoryResponse,
    UpdateBookingStatusRequest, UpdateReviewRequest, UpdateServiceRequest, UpdatedResponse,
};

/// Shared state for marketplace handlers
#[derive(Clone)]
pub struct MarketAppState<R>
where
    R: MarketStore,
{
    pub repo: Arc<R>,
    pub config: Arc<MarketConfig>,
}

// ============================================================================
// Categories
// ============================================================================

/// GET /api/services/categories
pub async fn list_categories<R>(
    State(state): State<MarketAppState<R>>,
) -> MarketResult<ApiResponse<Vec<CategoryResponse>>>
where
    R: MarketStore,
{
    let categories = CategoryUseCase::new(state.repo.clone()).list().await?;
    Ok(ApiResponse::ok(categories.into_iter().map(Into::into).collect()))
}

/// POST /api/services/categories
pub async fn create_category<R>(
    State(state): State<MarketAppState<R>>,
    user: AuthUser,
    Valid(req): Valid<CreateCategoryRequest>,
) -> MarketResult<ApiResponse<CategoryResponse>>
where
    R: MarketStore,
{
    user.ensure_role(&[UserRole::Admin])?;

    let category = CategoryUseCase::new(state.repo.clone())
        .create(req.into())
        .await?;

    Ok(ApiResponse::created(category.into()).with_message("Category created successfully"))
}

/// POST /api/services/categories/{id}/subcategories
pub async fn create_subcategory<R>(
    State(state): State<MarketAppState<R>>,
    user: AuthUser,
    ValidPath(category_id): ValidPath<CategoryId>,
    Valid(req): Valid<CreateCategoryRequest>,
) -> MarketResult<ApiResponse<SubcategoryResponse>>
where
    R: MarketStore,
{
    user.ensure_role(&[UserRole::Admin])?;

    let subcategory = CategoryUseCase::new(state.repo.clone())
        .create_subcategory(&category_id, req.into())
        .await?;

    Ok(ApiResponse::created(subcategory.into()).with_message("Subcategory created successfully"))
}

// ============================================================================
// Services
// ============================================================================

fn services<R: MarketStore>(state: &MarketAppState<R>) -> ServiceUseCase<R> {
    ServiceUseCase::new(state.repo.clone(), state.config.clone())
}

/// GET /api/services
pub async fn list_services<R>(
    State(state): State<MarketAppState<R>>,
    Query(query): Query<ServiceListQuery>,
) -> MarketResult<ApiResponse<Vec<ServiceResponse>>>
where
    R: MarketStore,
{
    let lang = query.language();
    let page = services(&state)
        .list(query.category(), query.filter(), state.config.page(&query.page))
        .await?;

    Ok(ApiResponse::page(
        page.map(|view| ServiceResponse::from_view(view, lang)),
    ))
}

/// GET /api/services/my
pub async fn my_services<R>(
    State(state): State<MarketAppState<R>>,
    user: AuthUser,
    Query(query): Query<PageQuery>,
) -> MarketResult<ApiResponse<Vec<ServiceResponse>>>
where
    R: MarketStore,
{
    user.ensure_role(&[UserRole::Provider])?;

    let page = services(&state)
        .list_own(&user, state.config.page(&query))
        .await?;

    Ok(ApiResponse::page(
        page.map(|view| ServiceResponse::from_view(view, Default::default())),
    ))
}

/// GET /api/services/{id}
pub async fn get_service<R>(
    State(state): State<MarketAppState<R>>,
    user: Option<AuthUser>,
    ValidPath(id): ValidPath<ServiceId>,
    Query(query): Query<LangQuery>,
) -> MarketResult<ApiResponse<ServiceDetailResponse>>
where
    R: MarketStore,
{
    let detail = services(&state).get(&id, user.as_ref()).await?;
    Ok(ApiResponse::ok(ServiceDetailResponse::from_detail(
        detail,
        query.language(),
    )))
}

/// POST /api/services
pub async fn create_service<R>(
    State(state): State<MarketAppState<R>>,
    user: AuthUser,
    Valid(req): Valid<CreateServiceRequest>,
) -> MarketResult<ApiResponse<ServiceResponse>>
where
    R: MarketStore,
{
    user.ensure_role(&[UserRole::Provider])?;

    let view = services(&state)
        .create(&user, req.into_new_service()?)
        .await?;

    Ok(
        ApiResponse::created(ServiceResponse::from_view(view, Default::default()))
            .with_message("Service created successfully"),
    )
}

/// PUT /api/services/{id}
pub async fn update_service<R>(
    State(state): State<MarketAppState<R>>,
    user: AuthUser,
    ValidPath(id): ValidPath<ServiceId>,
    Valid(req): Valid<UpdateServiceRequest>,
) -> MarketResult<ApiResponse<ServiceResponse>>
where
    R: MarketStore,
{
    user.ensure_role(&[UserRole::Provider])?;

    let view = services(&state).update(&user, &id, req.into()).await?;

    Ok(
        ApiResponse::ok(ServiceResponse::from_view(view, Default::default()))
            .with_message("Service updated successfully"),
    )
}

/// DELETE /api/services/{id}
pub async fn delete_service<R>(
    State(state): State<MarketAppState<R>>,
    user: AuthUser,
    ValidPath(id): ValidPath<ServiceId>,
) -> MarketResult<ApiResponse<()>>
where
    R: MarketStore,
{
    user.ensure_role(&[UserRole::Provider, UserRole::Admin])?;

    let message = match services(&state).delete(&user, &id).await? {
        DeleteOutcome::Deleted => "Service deleted successfully",
        DeleteOutcome::Deactivated => {
            "Service has active bookings and was deactivated instead of deleted"
        }
    };

    Ok(ApiResponse::message(message))
}

// ============================================================================
// Bookings
// ============================================================================

/// POST /api/bookings
pub async fn create_booking<R>(
    State(state): State<MarketAppState<R>>,
    user: AuthUser,
    Valid(req): Valid<CreateBookingRequest>,
) -> MarketResult<ApiResponse<BookingResponse>>
where
    R: MarketStore,
{
    user.ensure_role(&[UserRole::Customer])?;

    let (service_id, input) = req.into_parts()?;
    let view = BookingUseCase::new(state.repo.clone())
        .create(&user, &service_id, input)
        .await?;

    Ok(ApiResponse::created(view.into()).with_message("Booking created successfully"))
}

/// GET /api/bookings
pub async fn list_bookings<R>(
    State(state): State<MarketAppState<R>>,
    user: AuthUser,
    Query(query): Query<BookingListQuery>,
) -> MarketResult<ApiResponse<Vec<BookingResponse>>>
where
    R: MarketStore,
{
    let status = query.status()?;
    let page = BookingUseCase::new(state.repo.clone())
        .list(&user, status, state.config.page(&query.page))
        .await?;

    Ok(ApiResponse::page(page.map(Into::into)))
}

/// GET /api/bookings/{id}
pub async fn get_booking<R>(
    State(state): State<MarketAppState<R>>,
    user: AuthUser,
    ValidPath(id): ValidPath<BookingId>,
) -> MarketResult<ApiResponse<BookingResponse>>
where
    R: MarketStore,
{
    let view = BookingUseCase::new(state.repo.clone()).get(&user, &id).await?;
    Ok(ApiResponse::ok(view.into()))
}

/// PATCH /api/bookings/{id}/status
pub async fn update_booking_status<R>(
    State(state): State<MarketAppState<R>>,
    user: AuthUser,
    ValidPath(id): ValidPath<BookingId>,
    Valid(req): Valid<UpdateBookingStatusRequest>,
) -> MarketResult<ApiResponse<BookingResponse>>
where
    R: MarketStore,
{
    let (status, notes) = req.into_parts()?;
    let view = BookingUseCase::new(state.repo.clone())
        .update_status(&user, &id, status, notes)
        .await?;

    Ok(ApiResponse::ok(view.into()).with_message("Booking status updated successfully"))
}

/// PATCH /api/bookings/{id}/cancel
pub async fn cancel_booking<R>(
    State(state): State<MarketAppState<R>>,
    user: AuthUser,
    ValidPath(id): ValidPath<BookingId>,
    Valid(req): Valid<CancelBookingRequest>,
) -> MarketResult<ApiResponse<BookingResponse>>
where
    R: MarketStore,
{
    let view = BookingUseCase::new(state.repo.clone())
        .cancel(&user, &id, req.reason)
        .await?;

    Ok(ApiResponse::ok(view.into()).with_message("Booking cancelled successfully"))
}

// ============================================================================
// Reviews
// ============================================================================

/// POST /api/reviews
pub async fn create_review<R>(
    State(state): State<MarketAppState<R>>,
    user: AuthUser,
    Valid(req): Valid<CreateReviewRequest>,
) -> MarketResult<ApiResponse<ReviewResponse>>
where
    R: MarketStore,
{
    user.ensure_role(&[UserRole::Customer])?;

    let (booking_id, rating, comment) = req.into_parts()?;
    let view = ReviewUseCase::new(state.repo.clone())
        .create(&user, &booking_id, rating, comment)
        .await?;

    Ok(ApiResponse::created(view.into()).with_message("Review created successfully"))
}

/// GET /api/reviews/service/{service_id}
pub async fn service_reviews<R>(
    State(state): State<MarketAppState<R>>,
    ValidPath(service_id): ValidPath<ServiceId>,
    Query(query): Query<PageQuery>,
) -> MarketResult<ApiResponse<Vec<ReviewResponse>>>
where
    R: MarketStore,
{
    let page = ReviewUseCase::new(state.repo.clone())
        .list_for_service(&service_id, state.config.page(&query))
        .await?;

    Ok(ApiResponse::page(page.map(Into::into)))
}

/// GET /api/reviews/my
pub async fn my_reviews<R>(
    State(state): State<MarketAppState<R>>,
    user: AuthUser,
    Query(query): Query<PageQuery>,
) -> MarketResult<ApiResponse<Vec<ReviewResponse>>>
where
    R: MarketStore,
{
    let page = ReviewUseCase::new(state.repo.clone())
        .list_own(&user, state.config.page(&query))
        .await?;

    Ok(ApiResponse::page(page.map(Into::into)))
}

/// PUT /api/reviews/{id}
pub async fn update_review<R>(
    State(state): State<MarketAppState<R>>,
    user: AuthUser,
    ValidPath(id): ValidPath<ReviewId>,
    Valid(req): Valid<UpdateReviewRequest>,
) -> MarketResult<ApiResponse<ReviewResponse>>
where
    R: MarketStore,
{
    let view = ReviewUseCase::new(state.repo.clone())
        .update(&user, &id, req.rating, req.comment)
        .await?;

    Ok(ApiResponse::ok(view.into()).with_message("Review updated successfully"))
}

/// DELETE /api/reviews/{id}
pub async fn delete_review<R>(
    State(state): State<MarketAppState<R>>,
    user: AuthUser,
    ValidPath(id): ValidPath<ReviewId>,
) -> MarketResult<ApiResponse<RatingSummary>>
where
    R: MarketStore,
{
    let summary = ReviewUseCase::new(state.repo.clone())
        .delete(&user, &id)
        .await?;

    Ok(ApiResponse::ok(summary).with_message("Review deleted successfully"))
}

/// POST /api/reviews/{id}/response
pub async fn respond_to_review<R>(
    State(state): State<MarketAppState<R>>,
    user: AuthUser,
    ValidPath(id): ValidPath<ReviewId>,
    Valid(req): Valid<ReviewReplyRequest>,
) -> MarketResult<ApiResponse<ReviewResponse>>
where
    R: MarketStore,
{
    let view = ReviewUseCase::new(state.repo.clone())
        .respond(&user, &id, req.response)
        .await?;

    Ok(ApiResponse::ok(view.into()).with_message("Response added successfully"))
}

/// PATCH /api/reviews/{id}/approval
pub async fn set_review_approval<R>(
    State(state): State<MarketAppState<R>>,
    user: AuthUser,
    ValidPath(id): ValidPath<ReviewId>,
    Valid(req): Valid<ReviewApprovalRequest>,
) -> MarketResult<ApiResponse<ReviewResponse>>
where
    R: MarketStore,
{
    user.ensure_role(&[UserRole::Admin])?;

    let approved = req.is_approved.unwrap_or(true);
    let view = ReviewUseCase::new(state.repo.clone())
        .set_approval(&id, approved)
        .await?;

    Ok(ApiResponse::ok(view.into()).with_message("Review approval updated"))
}

// ============================================================================
// Messages
// ============================================================================

/// POST /api/messages
pub async fn send_message<R>(
    State(state): State<MarketAppState<R>>,
    user: AuthUser,
    Valid(req): Valid<SendMessageRequest>,
) -> MarketResult<ApiResponse<MessageResponse>>
where
    R: MarketStore,
{
    let view = MessageUseCase::new(state.repo.clone())
        .send(&user, req.into_outgoing()?)
        .await?;

    Ok(ApiResponse::created(view.into()).with_message("Message sent successfully"))
}

/// GET /api/messages/conversations
pub async fn conversations<R>(
    State(state): State<MarketAppState<R>>,
    user: AuthUser,
) -> MarketResult<ApiResponse<Vec<ConversationResponse>>>
where
    R: MarketStore,
{
    let items = MessageUseCase::new(state.repo.clone())
        .conversations(&user)
        .await?;

    Ok(ApiResponse::ok(items.into_iter().map(Into::into).collect()))
}

/// GET /api/messages/conversation/{user_id}
pub async fn conversation<R>(
    State(state): State<MarketAppState<R>>,
    user: AuthUser,
    ValidPath(partner_id): ValidPath<UserId>,
    Query(query): Query<PageQuery>,
) -> MarketResult<ApiResponse<Vec<MessageResponse>>>
where
    R: MarketStore,
{
    let page = MessageUseCase::new(state.repo.clone())
        .conversation(&user, &partner_id, state.config.page(&query))
        .await?;

    Ok(ApiResponse::page(page.map(Into::into)))
}

/// GET /api/messages/booking/{booking_id}
pub async fn booking_messages<R>(
    State(state): State<MarketAppState<R>>,
    user: AuthUser,
    ValidPath(booking_id): ValidPath<BookingId>,
) -> MarketResult<ApiResponse<Vec<MessageResponse>>>
where
    R: MarketStore,
{
    let items = MessageUseCase::new(state.repo.clone())
        .booking_messages(&user, &booking_id)
        .await?;

    Ok(ApiResponse::ok(items.into_iter().map(Into::into).collect()))
}

/// PATCH /api/messages/{id}/read
pub async fn mark_message_read<R>(
    State(state): State<MarketAppState<R>>,
    user: AuthUser,
    ValidPath(id): ValidPath<MessageId>,
) -> MarketResult<ApiResponse<MessageResponse>>
where
    R: MarketStore,
{
    let message = MessageUseCase::new(state.repo.clone())
        .mark_read(&user, &id)
        .await?;

    Ok(ApiResponse::ok(message.into()).with_message("Message marked as read"))
}

/// GET /api/messages/unread-count
pub async fn unread_messages<R>(
    State(state): State<MarketAppState<R>>,
    user: AuthUser,
) -> MarketResult<ApiResponse<CountResponse>>
where
    R: MarketStore,
{
    let count = MessageUseCase::new(state.repo.clone())
        .unread_count(&user)
        .await?;

    Ok(ApiResponse::ok(CountResponse { count }))
}

// ============================================================================
// Notifications
// ============================================================================

/// GET /api/notifications
pub async fn list_notifications<R>(
    State(state): State<MarketAppState<R>>,
    user: AuthUser,
    Query(query): Query<NotificationListQuery>,
) -> MarketResult<ApiResponse<Vec<NotificationResponse>>>
where
    R: MarketStore,
{
    let page = NotificationUseCase::new(state.repo.clone())
        .list(&user, query.unread_only(), state.config.page(&query.page))
        .await?;

    Ok(ApiResponse::page(page.map(Into::into)))
}

/// GET /api/notifications/unread-count
pub async fn unread_notifications<R>(
    State(state): State<MarketAppState<R>>,
    user: AuthUser,
) -> MarketResult<ApiResponse<CountResponse>>
where
    R: MarketStore,
{
    let count = NotificationUseCase::new(state.repo.clone())
        .unread_count(&user)
        .await?;

    Ok(ApiResponse::ok(CountResponse { count }))
}

/// PATCH /api/notifications/{id}/read
pub async fn mark_notification_read<R>(
    State(state): State<MarketAppState<R>>,
    user: AuthUser,
    ValidPath(id): ValidPath<NotificationId>,
) -> MarketResult<ApiResponse<()>>
where
    R: MarketStore,
{
    NotificationUseCase::new(state.repo.clone())
        .mark_read(&user, &id)
        .await?;

    Ok(ApiResponse::message("Notification marked as read"))
}

/// PATCH /api/notifications/read-all
pub async fn mark_all_notifications_read<R>(
    State(state): State<MarketAppState<R>>,
    user: AuthUser,
) -> MarketResult<ApiResponse<UpdatedResponse>>
where
    R: MarketStore,
{
    let updated = NotificationUseCase::new(state.repo.clone())
        .mark_all_read(&user)
        .await?;

    Ok(ApiResponse::ok(UpdatedResponse { updated }))
}

/// DELETE /api/notifications/{id}
pub async fn delete_notification<R>(
    State(state): State<MarketAppState<R>>,
    user: AuthUser,
    ValidPath(id): ValidPath<NotificationId>,
) -> MarketResult<ApiResponse<()>>
where
    R: MarketStore,
{
    NotificationUseCase::new(state.repo.clone())
        .delete(&user, &id)
        .await?;

    Ok(ApiResponse::message("Notification deleted"))
}
