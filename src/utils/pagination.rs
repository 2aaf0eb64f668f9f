use futures_util::TryStreamExt;
use mongodb::{Collection, bson::Document};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::utils::error::CustomError;

pub const DEFAULT_PAGE_LIMIT: i64 = 10;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub tag: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub num_pages: u64,
    pub page: u64,
}

pub fn num_pages(count: u64, limit: i64) -> u64 {
    if limit <= 0 {
        return 1;
    }
    count.div_ceil(limit as u64)
}

pub fn skip_for(page: u64, limit: i64) -> u64 {
    page.saturating_sub(1).saturating_mul(limit.max(0) as u64)
}

/// Counts matching documents and applies skip/limit. The reported page
/// is always the requested one.
pub async fn paginate<T>(
    collection: &Collection<T>,
    filter: Document,
    sort: Document,
    page: u64,
    limit: i64,
) -> Result<Page<T>, CustomError>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    let page = page.max(1);
    let limit = if limit <= 0 { DEFAULT_PAGE_LIMIT } else { limit };

    let count = collection
        .count_documents(filter.clone())
        .await
        .map_err(|e| CustomError::InternalServerError(format!("Failed to count documents: {}", e)))?;

    let items = collection
        .find(filter)
        .sort(sort)
        .skip(skip_for(page, limit))
        .limit(limit)
        .await
        .map_err(|e| CustomError::InternalServerError(format!("Failed to query documents: {}", e)))?
        .try_collect()
        .await
        .map_err(|e| CustomError::InternalServerError(format!("Failed to read documents: {}", e)))?;

    Ok(Page {
        items,
        num_pages: num_pages(count, limit),
        page,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_is_ceiling_division() {
        assert_eq!(num_pages(0, 10), 0);
        assert_eq!(num_pages(1, 10), 1);
        assert_eq!(num_pages(10, 10), 1);
        assert_eq!(num_pages(11, 10), 2);
        assert_eq!(num_pages(99, 10), 10);
        assert_eq!(num_pages(100, 10), 10);
    }

    #[test]
    fn skip_starts_at_zero_for_first_page() {
        assert_eq!(skip_for(1, 10), 0);
        assert_eq!(skip_for(2, 10), 10);
        assert_eq!(skip_for(5, 25), 100);
        // page 0 is treated like page 1
        assert_eq!(skip_for(0, 10), 0);
    }

    #[test]
    fn skip_saturates_for_huge_pages() {
        assert_eq!(skip_for(u64::MAX, 10), u64::MAX);
        assert_eq!(skip_for(u64::MAX, i64::MAX), u64::MAX);
        assert_eq!(skip_for(u64::MAX, 0), 0);
    }
}
