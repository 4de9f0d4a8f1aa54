//! Category Use Cases

use std::sync::Arc;

use kernel::i18n::LocalizedText;
use kernel::id::CategoryId;

use crate::domain::entity::category::{Category, Subcategory};
use crate::domain::repository::CatalogRepository;
use crate::error::{MarketError, MarketResult};

#[derive(Debug, Clone)]
pub struct CategoryInput {
    pub slug: String,
    pub name: LocalizedText,
    pub icon: Option<String>,
    pub sort_order: i32,
}

pub struct CategoryUseCase<R>
where
    R: CatalogRepository,
{
    repo: Arc<R>,
}

impl<R> CategoryUseCase<R>
where
    R: CatalogRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Active categories with their subcategories
    pub async fn list(&self) -> MarketResult<Vec<Category>> {
        self.repo.list_categories(false).await
    }

    pub async fn create(&self, input: CategoryInput) -> MarketResult<Category> {
        let slug = input.slug.trim().to_ascii_lowercase();
        if self.repo.find_category_by_slug(&slug).await?.is_some() {
            return Err(MarketError::SlugTaken);
        }

        let category = Category::new(slug, input.name, input.icon, input.sort_order);
        self.repo.insert_category(&category).await?;

        tracing::info!(category_id = %category.id, slug = %category.slug, "Category created");
        Ok(category)
    }

    pub async fn create_subcategory(
        &self,
        category_id: &CategoryId,
        input: CategoryInput,
    ) -> MarketResult<Subcategory> {
        let category = self
            .repo
            .find_category(category_id)
            .await?
            .ok_or(MarketError::CategoryNotFound)?;

        let slug = input.slug.trim().to_ascii_lowercase();
        if category.subcategories.iter().any(|s| s.slug == slug) {
            return Err(MarketError::SlugTaken);
        }

        let subcategory = Subcategory::new(category.id, slug, input.name, input.sort_order);
        self.repo.insert_subcategory(&subcategory).await?;

        tracing::info!(
            category_id = %category.id,
            subcategory_id = %subcategory.id,
            "Subcategory created"
        );
        Ok(subcategory)
    }
}
