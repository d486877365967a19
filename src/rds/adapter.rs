//! The seam between the dispatcher and the RDS control plane.
//!
//! The dispatcher only ever talks to `RdsApi`. Production wires in
//! `AwsRdsClient`; tests wire in an in-memory fixture.

use crate::error::RdsResult;
use crate::models::{Operation, Params};
use async_trait::async_trait;
use serde_json::Value;

/// Where a list walk currently stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageWindow {
    /// Continuation marker from the previous page, `None` for the first page.
    pub marker: Option<String>,
    /// Items accumulated so far in this walk.
    pub returned: usize,
    /// Page-size hint for the provider.
    pub page_size: i32,
}

/// One page of a list operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<Value>,
    /// Marker for the next page; `None` when the provider has no more items.
    pub next_marker: Option<String>,
}

/// RDS operations as seen by the dispatcher.
///
/// Parameters arrive validated, defaulted and normalized. Implementations apply
/// no defaults of their own and report failures as `RdsError` produced through
/// the provider error translation.
#[async_trait]
pub trait RdsApi: Send + Sync {
    /// Run a single-resource operation and return its resource document.
    async fn execute(&self, operation: Operation, params: &Params) -> RdsResult<Value>;

    /// Fetch one page of a list operation.
    async fn fetch_page(
        &self,
        operation: Operation,
        params: &Params,
        window: &PageWindow,
    ) -> RdsResult<Page>;
}
