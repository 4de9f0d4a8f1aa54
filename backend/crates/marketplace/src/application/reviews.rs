//! Review Use Cases
//!
//! Every write goes through a repository call that recomputes the service
//! rating in the same transaction.

use std::sync::Arc;

use auth::{AuthUser, UserRole};
use kernel::i18n::Language;
use kernel::id::{BookingId, ReviewId, ServiceId};
use kernel::pagination::{Page, PageRequest};
use serde_json::json;

use crate::application::lookup::{services_by_id, users_by_id};
use crate::application::notifications::notify;
use crate::domain::entity::notification::Notification;
use crate::domain::entity::review::Review;
use crate::domain::entity::service::Service;
use crate::domain::entity::user_summary::UserSummary;
use crate::domain::repository::{
    BookingRepository, CatalogRepository, NotificationRepository, ReviewFilter, ReviewRepository,
    UserDirectory,
};
use crate::domain::value_object::booking_status::BookingStatus;
use crate::domain::value_object::notification_kind::NotificationKind;
use crate::domain::value_object::rating::RatingSummary;
use crate::error::{MarketError, MarketResult};

#[derive(Debug, Clone)]
pub struct ReviewView {
    pub review: Review,
    pub customer: Option<UserSummary>,
    /// Only filled for listings that span several services
    pub service: Option<Service>,
}

/// Attach customer (and optionally service) summaries
pub(crate) async fn review_views<R>(
    repo: &R,
    reviews: Vec<Review>,
    with_service: bool,
) -> MarketResult<Vec<ReviewView>>
where
    R: UserDirectory + CatalogRepository,
{
    let customers = users_by_id(repo, reviews.iter().map(|r| r.customer_id)).await?;
    let services = if with_service {
        services_by_id(repo, reviews.iter().map(|r| r.service_id)).await?
    } else {
        Default::default()
    };

    Ok(reviews
        .into_iter()
        .map(|review| ReviewView {
            customer: customers.get(&review.customer_id).cloned(),
            service: services.get(&review.service_id).cloned(),
            review,
        })
        .collect())
}

pub struct ReviewUseCase<R>
where
    R: ReviewRepository
        + BookingRepository
        + CatalogRepository
        + NotificationRepository
        + UserDirectory,
{
    repo: Arc<R>,
}

impl<R> ReviewUseCase<R>
where
    R: ReviewRepository
        + BookingRepository
        + CatalogRepository
        + NotificationRepository
        + UserDirectory,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Review a completed booking owned by the caller, once
    pub async fn create(
        &self,
        actor: &AuthUser,
        booking_id: &BookingId,
        rating: i16,
        comment: Option<String>,
    ) -> MarketResult<ReviewView> {
        let booking = self
            .repo
            .find_booking(booking_id)
            .await?
            .ok_or(MarketError::BookingNotFound)?;
        if booking.customer_id != actor.id {
            return Err(MarketError::NotBookingOwner);
        }
        if booking.status != BookingStatus::Completed {
            return Err(MarketError::BookingNotCompleted);
        }
        if self
            .repo
            .find_review_for_booking(&actor.id, &booking.id)
            .await?
            .is_some()
        {
            return Err(MarketError::AlreadyReviewed);
        }

        let review = Review::new(&booking, rating, clean(comment));
        let summary = self.repo.insert_review(&review).await?;
        log_rating("Review created", &review, summary);

        let service = self.repo.find_service(&review.service_id).await?;
        let title = service
            .as_ref()
            .map(|s| s.title.resolve(Language::En).to_string())
            .unwrap_or_default();
        notify(
            self.repo.as_ref(),
            Notification::new(
                review.provider_id,
                NotificationKind::NewReview,
                "New review",
                format!("Your service \"{title}\" received a {rating}-star review"),
                json!({ "reviewId": review.id, "serviceId": review.service_id }),
            ),
        )
        .await;

        self.view(review).await
    }

    /// Approved reviews of one service
    pub async fn list_for_service(
        &self,
        service_id: &ServiceId,
        page: PageRequest,
    ) -> MarketResult<Page<ReviewView>> {
        if self.repo.find_service(service_id).await?.is_none() {
            return Err(MarketError::ServiceNotFound);
        }
        let filter = ReviewFilter {
            service_id: Some(*service_id),
            approved_only: true,
            ..ReviewFilter::default()
        };
        let (reviews, total) = self.repo.list_reviews(&filter, page).await?;
        let views = review_views(self.repo.as_ref(), reviews, false).await?;
        Ok(Page::new(views, page, total))
    }

    /// Written by the caller, or about the caller's services for providers
    pub async fn list_own(
        &self,
        actor: &AuthUser,
        page: PageRequest,
    ) -> MarketResult<Page<ReviewView>> {
        let filter = match actor.role {
            UserRole::Provider => ReviewFilter {
                provider_id: Some(actor.id),
                ..ReviewFilter::default()
            },
            _ => ReviewFilter {
                customer_id: Some(actor.id),
                ..ReviewFilter::default()
            },
        };
        let (reviews, total) = self.repo.list_reviews(&filter, page).await?;
        let views = review_views(self.repo.as_ref(), reviews, true).await?;
        Ok(Page::new(views, page, total))
    }

    /// Author only
    pub async fn update(
        &self,
        actor: &AuthUser,
        id: &ReviewId,
        rating: Option<i16>,
        comment: Option<String>,
    ) -> MarketResult<ReviewView> {
        let mut review = self.find(id).await?;
        if review.customer_id != actor.id {
            return Err(MarketError::NotReviewAuthor);
        }

        review.edit(rating, comment);
        let summary = self.repo.save_review(&review).await?;
        log_rating("Review updated", &review, summary);

        self.view(review).await
    }

    /// Author or admin
    pub async fn delete(&self, actor: &AuthUser, id: &ReviewId) -> MarketResult<RatingSummary> {
        let review = self.find(id).await?;
        if review.customer_id != actor.id && !actor.is_admin() {
            return Err(MarketError::NotReviewAuthor);
        }

        let summary = self.repo.remove_review(&review).await?;
        log_rating("Review deleted", &review, summary);
        Ok(summary)
    }

    /// Reviewed provider only; replaces an earlier response
    pub async fn respond(
        &self,
        actor: &AuthUser,
        id: &ReviewId,
        response: String,
    ) -> MarketResult<ReviewView> {
        let mut review = self.find(id).await?;
        if review.provider_id != actor.id {
            return Err(MarketError::NotReviewedProvider);
        }

        review.respond(response.trim().to_string());
        self.repo.save_review(&review).await?;
        tracing::info!(review_id = %review.id, provider_id = %actor.id, "Review response added");

        notify(
            self.repo.as_ref(),
            Notification::new(
                review.customer_id,
                NotificationKind::ReviewResponse,
                "Provider responded",
                "The provider responded to your review",
                json!({ "reviewId": review.id, "serviceId": review.service_id }),
            ),
        )
        .await;

        self.view(review).await
    }

    pub async fn set_approval(&self, id: &ReviewId, approved: bool) -> MarketResult<ReviewView> {
        let mut review = self.find(id).await?;
        review.set_approved(approved);
        let summary = self.repo.save_review(&review).await?;
        log_rating("Review approval changed", &review, summary);

        self.view(review).await
    }

    async fn find(&self, id: &ReviewId) -> MarketResult<Review> {
        self.repo
            .find_review(id)
            .await?
            .ok_or(MarketError::ReviewNotFound)
    }

    async fn view(&self, review: Review) -> MarketResult<ReviewView> {
        let mut views = review_views(self.repo.as_ref(), vec![review], true).await?;
        views
            .pop()
            .ok_or_else(|| MarketError::Internal("empty review view".into()))
    }
}

fn clean(comment: Option<String>) -> Option<String> {
    comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

fn log_rating(event: &'static str, review: &Review, summary: RatingSummary) {
    tracing::info!(
        review_id = %review.id,
        service_id = %review.service_id,
        average_rating = summary.average_rating,
        total_reviews = summary.total_reviews,
        "{event}"
    );
}
