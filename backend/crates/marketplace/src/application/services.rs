//! Service Listing Use Cases

use std::sync::Arc;

use auth::AuthUser;
use chrono::Utc;
use kernel::i18n::LocalizedText;
use kernel::id::{CategoryId, ServiceId, SubcategoryId};
use kernel::pagination::{Page, PageRequest};
use rust_decimal::Decimal;

use crate::application::config::MarketConfig;
use crate::application::lookup::{categories_by_id, users_by_id};
use crate::application::reviews::{ReviewView, review_views};
use crate::domain::entity::category::{Category, CategoryRef};
use crate::domain::entity::service::{NewService, Service};
use crate::domain::entity::user_summary::UserSummary;
use crate::domain::repository::{
    BookingRepository, CatalogRepository, ReviewFilter, ReviewRepository, ServiceFilter,
    UserDirectory,
};
use crate::domain::value_object::price_type::PriceType;
use crate::error::{MarketError, MarketResult};

/// Service with the summaries shown next to it
#[derive(Debug, Clone)]
pub struct ServiceView {
    pub service: Service,
    pub provider: Option<UserSummary>,
    pub category: Option<Category>,
}

#[derive(Debug, Clone)]
pub struct ServiceDetail {
    pub view: ServiceView,
    /// Latest approved reviews
    pub reviews: Vec<ReviewView>,
}

/// Partial update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct ServiceChanges {
    pub category_id: Option<CategoryId>,
    pub subcategory_id: Option<SubcategoryId>,
    pub title: Option<LocalizedText>,
    pub description: Option<LocalizedText>,
    pub price: Option<Decimal>,
    pub price_type: Option<PriceType>,
    pub duration_minutes: Option<i32>,
    pub service_area: Option<String>,
    pub images: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub is_available: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// Open bookings exist; the listing was hidden instead
    Deactivated,
}

pub struct ServiceUseCase<R>
where
    R: CatalogRepository + BookingRepository + ReviewRepository + UserDirectory,
{
    repo: Arc<R>,
    config: Arc<MarketConfig>,
}

impl<R> ServiceUseCase<R>
where
    R: CatalogRepository + BookingRepository + ReviewRepository + UserDirectory,
{
    pub fn new(repo: Arc<R>, config: Arc<MarketConfig>) -> Self {
        Self { repo, config }
    }

    /// Public listing of active services
    pub async fn list(
        &self,
        category: Option<CategoryRef>,
        mut filter: ServiceFilter,
        page: PageRequest,
    ) -> MarketResult<Page<ServiceView>> {
        filter.active_only = true;
        match category {
            Some(CategoryRef::Id(id)) => filter.category_id = Some(id),
            Some(CategoryRef::Slug(slug)) => match self.repo.find_category_by_slug(&slug).await? {
                Some(c) => filter.category_id = Some(c.id),
                None => return Ok(Page::new(Vec::new(), page, 0)),
            },
            None => {}
        }

        let (services, total) = self.repo.list_services(&filter, page).await?;
        let views = self.views(services).await?;
        Ok(Page::new(views, page, total))
    }

    /// Caller's own services, inactive included
    pub async fn list_own(
        &self,
        actor: &AuthUser,
        page: PageRequest,
    ) -> MarketResult<Page<ServiceView>> {
        let filter = ServiceFilter {
            provider_id: Some(actor.id),
            active_only: false,
            ..ServiceFilter::default()
        };
        let (services, total) = self.repo.list_services(&filter, page).await?;
        let views = self.views(services).await?;
        Ok(Page::new(views, page, total))
    }

    /// Inactive services are only visible to their owner
    pub async fn get(
        &self,
        id: &ServiceId,
        viewer: Option<&AuthUser>,
    ) -> MarketResult<ServiceDetail> {
        let service = self
            .repo
            .find_service(id)
            .await?
            .filter(|s| s.is_active || viewer.is_some_and(|v| s.is_owned_by(&v.id)))
            .ok_or(MarketError::ServiceNotFound)?;

        let filter = ReviewFilter {
            service_id: Some(service.id),
            approved_only: true,
            ..ReviewFilter::default()
        };
        let excerpt = PageRequest::new(1, self.config.review_excerpt_count);
        let (reviews, _) = self.repo.list_reviews(&filter, excerpt).await?;
        let reviews = review_views(self.repo.as_ref(), reviews, false).await?;

        let mut views = self.views(vec![service]).await?;
        let view = views.pop().ok_or_else(|| MarketError::Internal("empty service view".into()))?;

        Ok(ServiceDetail { view, reviews })
    }

    pub async fn create(&self, actor: &AuthUser, input: NewService) -> MarketResult<ServiceView> {
        let category = self
            .repo
            .find_category(&input.category_id)
            .await?
            .filter(|c| c.is_active)
            .ok_or(MarketError::InvalidCategory)?;
        if let Some(sub) = &input.subcategory_id {
            category
                .subcategory(sub)
                .ok_or(MarketError::InvalidSubcategory)?;
        }

        let service = Service::new(actor.id, input);
        self.repo.insert_service(&service).await?;

        tracing::info!(
            service_id = %service.id,
            provider_id = %actor.id,
            category_id = %category.id,
            "Service created"
        );

        let provider = self.repo.find_user_summary(&actor.id).await?;
        Ok(ServiceView {
            service,
            provider,
            category: Some(category),
        })
    }

    /// Owner only
    pub async fn update(
        &self,
        actor: &AuthUser,
        id: &ServiceId,
        changes: ServiceChanges,
    ) -> MarketResult<ServiceView> {
        let mut service = self
            .repo
            .find_service(id)
            .await?
            .ok_or(MarketError::ServiceNotFound)?;
        if !service.is_owned_by(&actor.id) {
            return Err(MarketError::NotServiceOwner);
        }

        let category_changed = changes
            .category_id
            .is_some_and(|c| c != service.category_id);
        let category_id = changes.category_id.unwrap_or(service.category_id);
        let subcategory_id = match changes.subcategory_id {
            Some(sub) => Some(sub),
            None if category_changed => None,
            None => service.subcategory_id,
        };

        if category_changed || changes.subcategory_id.is_some() {
            let category = self
                .repo
                .find_category(&category_id)
                .await?
                .filter(|c| c.is_active)
                .ok_or(MarketError::InvalidCategory)?;
            if let Some(sub) = &subcategory_id {
                category
                    .subcategory(sub)
                    .ok_or(MarketError::InvalidSubcategory)?;
            }
        }

        service.category_id = category_id;
        service.subcategory_id = subcategory_id;
        if let Some(title) = changes.title {
            service.title = title.normalized();
        }
        if let Some(description) = changes.description {
            service.description = description.normalized();
        }
        if let Some(price) = changes.price {
            service.price = price.round_dp(2);
        }
        if let Some(price_type) = changes.price_type {
            service.price_type = price_type;
        }
        if changes.duration_minutes.is_some() {
            service.duration_minutes = changes.duration_minutes;
        }
        if let Some(area) = changes.service_area {
            let area = area.trim().to_string();
            service.service_area = (!area.is_empty()).then_some(area);
        }
        if let Some(images) = changes.images {
            service.images = images;
        }
        if let Some(is_active) = changes.is_active {
            service.is_active = is_active;
        }
        if let Some(is_available) = changes.is_available {
            service.is_available = is_available;
        }
        service.updated_at = Utc::now();

        self.repo.update_service(&service).await?;
        tracing::info!(service_id = %service.id, "Service updated");

        let mut views = self.views(vec![service]).await?;
        views
            .pop()
            .ok_or_else(|| MarketError::Internal("empty service view".into()))
    }

    /// Owner or admin. Services with open bookings are deactivated instead.
    pub async fn delete(&self, actor: &AuthUser, id: &ServiceId) -> MarketResult<DeleteOutcome> {
        let mut service = self
            .repo
            .find_service(id)
            .await?
            .ok_or(MarketError::ServiceNotFound)?;
        if !service.is_owned_by(&actor.id) && !actor.is_admin() {
            return Err(MarketError::NotServiceOwner);
        }

        if self.repo.has_open_bookings(&service.id).await? {
            service.deactivate();
            self.repo.update_service(&service).await?;
            tracing::info!(service_id = %service.id, "Service deactivated (open bookings)");
            return Ok(DeleteOutcome::Deactivated);
        }

        self.repo.delete_service(&service.id).await?;
        tracing::info!(service_id = %service.id, actor_id = %actor.id, "Service deleted");
        Ok(DeleteOutcome::Deleted)
    }

    async fn views(&self, services: Vec<Service>) -> MarketResult<Vec<ServiceView>> {
        let providers =
            users_by_id(self.repo.as_ref(), services.iter().map(|s| s.provider_id)).await?;
        let categories = categories_by_id(self.repo.as_ref()).await?;

        Ok(services
            .into_iter()
            .map(|service| ServiceView {
                provider: providers.get(&service.provider_id).cloned(),
                category: categories.get(&service.category_id).cloned(),
                service,
            })
            .collect())
    }
}
