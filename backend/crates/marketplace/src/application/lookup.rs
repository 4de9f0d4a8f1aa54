//! Batched lookups used to assemble views

use std::collections::HashMap;

use kernel::id::{CategoryId, ServiceId, UserId};

use crate::domain::entity::{category::Category, service::Service, user_summary::UserSummary};
use crate::domain::repository::{CatalogRepository, UserDirectory};
use crate::error::MarketResult;

fn unique<T: Ord>(ids: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut ids: Vec<T> = ids.into_iter().collect();
    ids.sort();
    ids.dedup();
    ids
}

pub(crate) async fn users_by_id<R>(
    repo: &R,
    ids: impl IntoIterator<Item = UserId>,
) -> MarketResult<HashMap<UserId, UserSummary>>
where
    R: UserDirectory,
{
    let ids = unique(ids);
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let users = repo.find_user_summaries(&ids).await?;
    Ok(users.into_iter().map(|u| (u.id, u)).collect())
}

pub(crate) async fn services_by_id<R>(
    repo: &R,
    ids: impl IntoIterator<Item = ServiceId>,
) -> MarketResult<HashMap<ServiceId, Service>>
where
    R: CatalogRepository,
{
    let ids = unique(ids);
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let services = repo.find_services(&ids).await?;
    Ok(services.into_iter().map(|s| (s.id, s)).collect())
}

pub(crate) async fn categories_by_id<R>(repo: &R) -> MarketResult<HashMap<CategoryId, Category>>
where
    R: CatalogRepository,
{
    let categories = repo.list_categories(true).await?;
    Ok(categories.into_iter().map(|c| (c.id, c)).collect())
}
