//! Service categories and their subcategories

use chrono::{DateTime, Utc};
use kernel::i18n::LocalizedText;
use kernel::id::{CategoryId, SubcategoryId};

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: CategoryId,
    /// Unique, `[a-z0-9-]`
    pub slug: String,
    pub name: LocalizedText,
    pub icon: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    /// Ordered by `sort_order`
    pub subcategories: Vec<Subcategory>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Subcategory {
    pub id: SubcategoryId,
    pub category_id: CategoryId,
    /// Unique within the category
    pub slug: String,
    pub name: LocalizedText,
    pub sort_order: i32,
}

impl Category {
    pub fn new(slug: String, name: LocalizedText, icon: Option<String>, sort_order: i32) -> Self {
        Self {
            id: CategoryId::new(),
            slug,
            name: name.normalized(),
            icon,
            sort_order,
            is_active: true,
            subcategories: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn subcategory(&self, id: &SubcategoryId) -> Option<&Subcategory> {
        self.subcategories.iter().find(|s| &s.id == id)
    }
}

impl Subcategory {
    pub fn new(
        category_id: CategoryId,
        slug: String,
        name: LocalizedText,
        sort_order: i32,
    ) -> Self {
        Self {
            id: SubcategoryId::new(),
            category_id,
            slug,
            name: name.normalized(),
            sort_order,
        }
    }
}

/// How a listing filter names a category
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryRef {
    Id(CategoryId),
    Slug(String),
}

impl CategoryRef {
    /// A UUID is an id, anything else a slug
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        Some(match raw.parse::<CategoryId>() {
            Ok(id) => CategoryRef::Id(id),
            Err(_) => CategoryRef::Slug(raw.to_ascii_lowercase()),
        })
    }
}

pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= 60
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
