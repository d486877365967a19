//! Marker-based pagination with an item cap.

use super::adapter::{Page, PageWindow, RdsApi};
use crate::error::RdsResult;
use crate::models::{Operation, Params};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Smallest page size RDS accepts for `MaxRecords`.
pub const MIN_PAGE_SIZE: i32 = 20;

/// Largest page size RDS accepts for `MaxRecords`.
pub const MAX_PAGE_SIZE: i32 = 100;

/// Items collected by a list walk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paginated {
    pub items: Vec<Value>,
    /// True only when the cap was hit and further items exist.
    pub truncated: bool,
}

/// Page-size hint for a given cap.
pub fn page_size_for(cap: usize) -> i32 {
    i32::try_from(cap)
        .unwrap_or(MAX_PAGE_SIZE)
        .clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE)
}

/// Walk a list operation until the provider runs out of items or `cap` is hit.
///
/// Items keep provider order. Hitting the cap exactly at the end of the data
/// set is not truncation: `truncated` is set only when the current page holds
/// surplus items or the provider hands back another marker.
pub async fn paginate(
    api: &dyn RdsApi,
    operation: Operation,
    params: &Params,
    cap: usize,
) -> RdsResult<Paginated> {
    let mut window = PageWindow {
        marker: None,
        returned: 0,
        page_size: page_size_for(cap),
    };
    let mut items = Vec::new();
    let mut seen_markers = HashSet::new();
    let mut pages = 0usize;

    loop {
        let Page {
            items: page_items,
            next_marker,
        } = api.fetch_page(operation, params, &window).await?;
        pages += 1;

        let room = cap.saturating_sub(items.len());
        if page_items.len() > room {
            items.extend(page_items.into_iter().take(room));
            debug!(operation = %operation, pages, count = items.len(), "List truncated within page");
            return Ok(Paginated {
                items,
                truncated: true,
            });
        }
        items.extend(page_items);

        let Some(marker) = next_marker else {
            break;
        };

        if !seen_markers.insert(marker.clone()) {
            warn!(operation = %operation, pages, "Provider repeated a pagination marker; stopping");
            break;
        }

        if items.len() >= cap {
            // The provider says more may follow. Confirm before reporting
            // truncation, since a final empty page is legal.
            window.marker = Some(marker);
            window.returned = items.len();
            let lookahead = api.fetch_page(operation, params, &window).await?;
            let truncated = !lookahead.items.is_empty();
            debug!(operation = %operation, pages = pages + 1, count = items.len(), truncated, "List reached cap");
            return Ok(Paginated { items, truncated });
        }

        window.marker = Some(marker);
        window.returned = items.len();
    }

    debug!(operation = %operation, pages, count = items.len(), "List complete");
    Ok(Paginated {
        items,
        truncated: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RdsError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves `total` items in pages of `page_size`, optionally returning a
    /// trailing marker with an empty last page.
    struct Pager {
        total: usize,
        page_size: usize,
        trailing_marker: bool,
        calls: AtomicUsize,
    }

    impl Pager {
        fn new(total: usize, page_size: usize) -> Self {
            Self {
                total,
                page_size,
                trailing_marker: false,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RdsApi for Pager {
        async fn execute(&self, _: Operation, _: &Params) -> RdsResult<Value> {
            Err(RdsError::internal("not a list"))
        }

        async fn fetch_page(&self, _: Operation, _: &Params, window: &PageWindow) -> RdsResult<Page> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let start: usize = window
                .marker
                .as_deref()
                .map(|m| m.parse().unwrap())
                .unwrap_or(0);
            let end = (start + self.page_size).min(self.total);
            let items = (start..end).map(|i| json!({ "n": i })).collect();
            let next_marker = if end < self.total || (self.trailing_marker && start < self.total) {
                Some(end.to_string())
            } else {
                None
            };
            Ok(Page { items, next_marker })
        }
    }

    const OP: Operation = Operation::DescribeDbInstances;

    #[test]
    fn test_page_size_clamped() {
        assert_eq!(page_size_for(5), MIN_PAGE_SIZE);
        assert_eq!(page_size_for(50), 50);
        assert_eq!(page_size_for(1000), MAX_PAGE_SIZE);
    }

    #[tokio::test]
    async fn test_truncates_when_more_items_exist() {
        let api = Pager::new(250, 20);
        let result = paginate(&api, OP, &Params::new(), 100).await.unwrap();
        assert_eq!(result.items.len(), 100);
        assert!(result.truncated);
        assert_eq!(result.items[0]["n"], 0);
        assert_eq!(result.items[99]["n"], 99);
    }

    #[tokio::test]
    async fn test_exact_cap_is_not_truncated() {
        let api = Pager::new(100, 20);
        let result = paginate(&api, OP, &Params::new(), 100).await.unwrap();
        assert_eq!(result.items.len(), 100);
        assert!(!result.truncated);
    }

    #[tokio::test]
    async fn test_exact_cap_with_trailing_empty_page() {
        let mut api = Pager::new(100, 20);
        api.trailing_marker = true;
        let result = paginate(&api, OP, &Params::new(), 100).await.unwrap();
        assert_eq!(result.items.len(), 100);
        assert!(!result.truncated);
    }

    #[tokio::test]
    async fn test_fewer_items_than_cap() {
        let api = Pager::new(45, 20);
        let result = paginate(&api, OP, &Params::new(), 100).await.unwrap();
        assert_eq!(result.items.len(), 45);
        assert!(!result.truncated);
        assert_eq!(api.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_truncates_mid_page() {
        let api = Pager::new(30, 20);
        let result = paginate(&api, OP, &Params::new(), 10).await.unwrap();
        assert_eq!(result.items.len(), 10);
        assert!(result.truncated);
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_result() {
        let api = Pager::new(0, 20);
        let result = paginate(&api, OP, &Params::new(), 100).await.unwrap();
        assert!(result.items.is_empty());
        assert!(!result.truncated);
    }

    struct Looping;

    #[async_trait]
    impl RdsApi for Looping {
        async fn execute(&self, _: Operation, _: &Params) -> RdsResult<Value> {
            Err(RdsError::internal("not a list"))
        }

        async fn fetch_page(&self, _: Operation, _: &Params, _: &PageWindow) -> RdsResult<Page> {
            Ok(Page {
                items: vec![json!({"n": 0})],
                next_marker: Some("same".to_string()),
            })
        }
    }

    #[tokio::test]
    async fn test_repeated_marker_stops_walk() {
        let result = paginate(&Looping, OP, &Params::new(), 100).await.unwrap();
        assert_eq!(result.items.len(), 2);
        assert!(!result.truncated);
    }
}
