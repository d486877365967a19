//! Tool dispatcher.
//!
//! One generic routine drives every tool from its descriptor:
//! validate, check readonly policy, check confirmation, execute (with throttle
//! retry), paginate list results, and translate failures into an envelope.

use crate::error::{ErrorEnvelope, ErrorKind, RdsError, RdsResult};
use crate::models::{
    CONFIRMATION_TOKEN_PARAM, MAX_ITEMS_PARAM, Operation, OperationDescriptor, ParamType, Params,
    ToolRequest, ToolResult,
};
use crate::rds::confirmation::{DEFAULT_CONFIRMATION_TTL_SECS, DEFAULT_TOKEN_BYTES};
use crate::rds::{ConfirmationGate, Page, PageWindow, RdsApi, RedeemError, paginate};
use crate::tools::guard::ReadonlyGate;
use crate::tools::identifier::validate_identifier;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

/// Default cap on items returned by a list operation.
pub const DEFAULT_MAX_ITEMS: usize = 100;

/// Default number of retries after a throttling failure.
pub const DEFAULT_THROTTLE_RETRIES: u32 = 3;

/// Default delay before the first throttle retry, in milliseconds.
pub const DEFAULT_THROTTLE_BACKOFF_MS: u64 = 200;

/// Exponential backoff for throttled provider calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (zero based). Doubles each time.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt.min(16)))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_THROTTLE_RETRIES,
            base_delay: Duration::from_millis(DEFAULT_THROTTLE_BACKOFF_MS),
        }
    }
}

/// Immutable settings injected at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSettings {
    pub readonly: bool,
    pub max_items: usize,
    pub confirmation_ttl: Duration,
    pub token_bytes: usize,
    pub retry: RetryPolicy,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            readonly: true,
            max_items: DEFAULT_MAX_ITEMS,
            confirmation_ttl: Duration::from_secs(DEFAULT_CONFIRMATION_TTL_SECS),
            token_bytes: DEFAULT_TOKEN_BYTES,
            retry: RetryPolicy::default(),
        }
    }
}

/// Run `call`, retrying while it fails with a throttling error.
async fn with_retry<T, F, Fut>(policy: RetryPolicy, operation: Operation, mut call: F) -> RdsResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = RdsResult<T>>,
{
    let mut attempt = 0u32;
    loop {
        match call().await {
            Err(err) if err.is_retryable() && attempt < policy.max_retries => {
                let delay = policy.delay_for(attempt);
                attempt += 1;
                warn!(
                    operation = %operation,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Provider throttled, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            other => return other,
        }
    }
}

/// Adapter wrapper applying the throttle retry policy to every call, so a
/// list walk retries individual pages rather than starting over.
struct Retrying<'a> {
    api: &'a dyn RdsApi,
    policy: RetryPolicy,
}

#[async_trait]
impl RdsApi for Retrying<'_> {
    async fn execute(&self, operation: Operation, params: &Params) -> RdsResult<Value> {
        with_retry(self.policy, operation, || self.api.execute(operation, params)).await
    }

    async fn fetch_page(
        &self,
        operation: Operation,
        params: &Params,
        window: &PageWindow,
    ) -> RdsResult<Page> {
        with_retry(self.policy, operation, || {
            self.api.fetch_page(operation, params, window)
        })
        .await
    }
}

/// Check, default and normalize a parameter set against a descriptor.
///
/// Stages run in order: null stripping, unknown parameter rejection, required
/// and type checks, defaults, identifier normalization and finally the
/// descriptor's cross-field check.
pub fn validate_params(descriptor: &OperationDescriptor, mut params: Params) -> RdsResult<Params> {
    params.strip_nulls();

    let mut unknown: Vec<&str> = params
        .names()
        .map(String::as_str)
        .filter(|name| {
            descriptor.param(name).is_none()
                && !(descriptor.requires_confirmation && *name == CONFIRMATION_TOKEN_PARAM)
        })
        .collect();
    if !unknown.is_empty() {
        unknown.sort_unstable();
        return Err(RdsError::invalid_parameter(format!(
            "Unknown parameter(s) for {}: {}",
            descriptor.name,
            unknown.join(", ")
        )));
    }

    if let Some(token) = params.get(CONFIRMATION_TOKEN_PARAM) {
        if !ParamType::String.accepts(token) {
            return Err(RdsError::invalid_parameter(format!(
                "Parameter '{}' must be a string",
                CONFIRMATION_TOKEN_PARAM
            )));
        }
    }

    for spec in descriptor.params {
        match params.get(spec.name) {
            None if spec.required => {
                return Err(RdsError::invalid_parameter(format!(
                    "Missing required parameter: {}",
                    spec.name
                )));
            }
            None => {
                if let Some(default) = spec.default {
                    params.insert(spec.name, default.to_value());
                }
            }
            Some(value) if !spec.ty.accepts(value) => {
                return Err(RdsError::invalid_parameter(format!(
                    "Parameter '{}' must be a {}",
                    spec.name,
                    spec.ty.name()
                )));
            }
            Some(_) => {}
        }
    }

    for spec in descriptor.params {
        let Some(kind) = spec.identifier else {
            continue;
        };
        if let Some(raw) = params.get_str(spec.name) {
            let normalized = validate_identifier(spec.name, raw, kind)?;
            params.insert(spec.name, normalized);
        }
    }

    if let Some(validate) = descriptor.validate {
        validate(&params)?;
    }

    Ok(params)
}

/// Routes tool requests through the safety gates to the RDS adapter.
pub struct Dispatcher {
    api: Arc<dyn RdsApi>,
    readonly: ReadonlyGate,
    confirmations: Arc<ConfirmationGate>,
    settings: DispatchSettings,
}

impl Dispatcher {
    pub fn new(api: Arc<dyn RdsApi>, settings: DispatchSettings) -> Self {
        Self {
            api,
            readonly: ReadonlyGate::new(settings.readonly),
            confirmations: Arc::new(ConfirmationGate::new(
                settings.confirmation_ttl,
                settings.token_bytes,
            )),
            settings,
        }
    }

    pub fn is_readonly(&self) -> bool {
        self.readonly.is_readonly()
    }

    /// The challenge store, shared with the background sweep.
    pub fn confirmations(&self) -> Arc<ConfirmationGate> {
        Arc::clone(&self.confirmations)
    }

    /// Handle one tool invocation.
    pub async fn dispatch(&self, request: ToolRequest) -> Result<ToolResult, ErrorEnvelope> {
        let descriptor = request.operation.descriptor();
        let span = info_span!(
            "tool_call",
            tool = descriptor.name,
            request_id = %Uuid::new_v4()
        );

        async move {
            match self.run(descriptor, request.params).await {
                Ok(result) => {
                    debug!("Tool call succeeded");
                    Ok(result)
                }
                Err(err) => {
                    match err.kind() {
                        ErrorKind::ConfirmationRequired => info!("Confirmation required"),
                        kind => warn!(kind = %kind, error = %err, "Tool call failed"),
                    }
                    Err(ErrorEnvelope::from(err))
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(&self, descriptor: &'static OperationDescriptor, params: Params) -> RdsResult<ToolResult> {
        let params = validate_params(descriptor, params)?;
        self.readonly.check(descriptor)?;
        let params = self.confirm(descriptor, params).await?;

        let api = Retrying {
            api: self.api.as_ref(),
            policy: self.settings.retry,
        };

        if descriptor.list {
            let cap = match params.get_i64(MAX_ITEMS_PARAM) {
                Some(requested) => usize::try_from(requested)
                    .unwrap_or(usize::MAX)
                    .min(self.settings.max_items),
                None => self.settings.max_items,
            };
            let page = paginate(&api, descriptor.operation, &params, cap).await?;
            let count = page.items.len();
            info!(count, truncated = page.truncated, "List operation complete");
            return Ok(ToolResult {
                success: true,
                operation: descriptor.name,
                message: Some(descriptor.render_success(&params)),
                data: json!({ "items": page.items, "count": count }),
                truncated: Some(page.truncated),
            });
        }

        let data = api.execute(descriptor.operation, &params).await?;
        if descriptor.mutates {
            info!("Mutating operation executed");
        }
        Ok(ToolResult {
            success: true,
            operation: descriptor.name,
            message: Some(descriptor.render_success(&params)),
            data,
            truncated: None,
        })
    }

    /// Enforce the confirmation protocol. Returns the parameters without the
    /// token once a challenge has been redeemed.
    async fn confirm(&self, descriptor: &OperationDescriptor, mut params: Params) -> RdsResult<Params> {
        if !descriptor.requires_confirmation {
            return Ok(params);
        }

        let resource_id = descriptor
            .primary_identifier
            .and_then(|name| params.get_string(name))
            .ok_or_else(|| {
                RdsError::internal(format!("{} has no resource identifier", descriptor.name))
            })?;
        let fingerprint = params.fingerprint(CONFIRMATION_TOKEN_PARAM);
        let token = params
            .remove(CONFIRMATION_TOKEN_PARAM)
            .and_then(|value| value.as_str().map(str::to_string));

        let Some(token) = token else {
            return Err(self
                .challenge(descriptor, &params, &resource_id, fingerprint)
                .await);
        };

        match self
            .confirmations
            .redeem(descriptor.operation, &resource_id, &token, &fingerprint)
            .await
        {
            Ok(()) => Ok(params),
            Err(RedeemError::Absent) => Err(self
                .challenge(descriptor, &params, &resource_id, fingerprint)
                .await),
            Err(RedeemError::Expired) => Err(RdsError::confirmation_expired(
                descriptor.name,
                resource_id,
            )),
            Err(RedeemError::TokenMismatch) => Err(RdsError::confirmation_mismatch(
                descriptor.name,
                resource_id,
                "the token does not match the outstanding challenge",
            )),
            Err(RedeemError::ParametersChanged) => Err(RdsError::confirmation_mismatch(
                descriptor.name,
                resource_id,
                "the parameters differ from those the token was issued for",
            )),
        }
    }

    async fn challenge(
        &self,
        descriptor: &OperationDescriptor,
        params: &Params,
        resource_id: &str,
        fingerprint: String,
    ) -> RdsError {
        let challenge = self
            .confirmations
            .request(
                descriptor.operation,
                resource_id,
                fingerprint,
                descriptor.action_label(params),
                descriptor.impact(params),
            )
            .await;
        RdsError::confirmation_required(challenge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Echoes parameters back and fails with scripted errors first.
    #[derive(Default)]
    struct Echo {
        calls: AtomicUsize,
        failures: Mutex<Vec<RdsError>>,
    }

    impl Echo {
        fn failing_with(errors: Vec<RdsError>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                failures: Mutex::new(errors),
            }
        }
    }

    #[async_trait]
    impl RdsApi for Echo {
        async fn execute(&self, _: Operation, params: &Params) -> RdsResult<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = self.failures.lock().unwrap().pop() {
                return Err(err);
            }
            Ok(serde_json::to_value(params).unwrap())
        }

        async fn fetch_page(&self, _: Operation, _: &Params, _: &PageWindow) -> RdsResult<Page> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = self.failures.lock().unwrap().pop() {
                return Err(err);
            }
            Ok(Page::default())
        }
    }

    fn throttled() -> RdsError {
        RdsError::from(ProviderError::service("Throttling", "Rate exceeded"))
    }

    fn fast_settings() -> DispatchSettings {
        DispatchSettings {
            retry: RetryPolicy {
                max_retries: 3,
                base_delay: Duration::from_millis(1),
            },
            ..Default::default()
        }
    }

    fn params(value: Value) -> Params {
        Params::from_value(value).unwrap()
    }

    #[test]
    fn test_retry_delay_doubles() {
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(200),
        };
        assert_eq!(policy.delay_for(0), Duration::from_millis(200));
        assert_eq!(policy.delay_for(1), Duration::from_millis(400));
        assert_eq!(policy.delay_for(2), Duration::from_millis(800));
    }

    #[test]
    fn test_validate_rejects_unknown_parameter() {
        let descriptor = Operation::GetDbCluster.descriptor();
        let err = validate_params(
            descriptor,
            params(json!({"db_cluster_identifier": "a", "colour": "red"})),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        assert!(err.to_string().contains("colour"));
    }

    #[test]
    fn test_validate_rejects_token_on_readonly_operation() {
        let descriptor = Operation::GetDbCluster.descriptor();
        let err = validate_params(
            descriptor,
            params(json!({"db_cluster_identifier": "a", "confirmation_token": "cfm_x"})),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn test_validate_missing_required() {
        let descriptor = Operation::DeleteDbCluster.descriptor();
        let err = validate_params(descriptor, Params::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        assert!(err.to_string().contains("db_cluster_identifier"));
    }

    #[test]
    fn test_validate_wrong_type() {
        let descriptor = Operation::DescribeDbInstances.descriptor();
        let err = validate_params(descriptor, params(json!({"max_items": "ten"}))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn test_validate_applies_defaults_and_normalizes() {
        let descriptor = Operation::DeleteDbCluster.descriptor();
        // Nulls are stripped before the unknown-parameter check.
        let validated = validate_params(
            descriptor,
            params(json!({
                "db_cluster_identifier": "  Prod-DB-1 ",
                "final_db_snapshot_identifier": "Prod-Final",
                "tags": null
            })),
        )
        .unwrap();
        assert_eq!(validated.get_str("db_cluster_identifier"), Some("prod-db-1"));
        assert_eq!(validated.get_str("final_db_snapshot_identifier"), Some("prod-final"));
        assert_eq!(validated.get_bool("skip_final_snapshot"), Some(false));
    }

    #[test]
    fn test_validate_identifier_runs_before_cross_field_check() {
        let descriptor = Operation::DeleteDbCluster.descriptor();
        let err = validate_params(
            descriptor,
            params(json!({
                "db_cluster_identifier": "1bad",
                "skip_final_snapshot": true,
                "final_db_snapshot_identifier": "final-1"
            })),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidIdentifier);
    }

    #[tokio::test]
    async fn test_throttle_retried_until_success() {
        let api = Arc::new(Echo::failing_with(vec![throttled(), throttled()]));
        let dispatcher = Dispatcher::new(api.clone(), fast_settings());
        let result = dispatcher
            .dispatch(ToolRequest::new(
                Operation::GetDbCluster,
                params(json!({"db_cluster_identifier": "prod"})),
            ))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(api.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_throttle_retries_exhausted() {
        let errors = (0..4).map(|_| throttled()).collect();
        let api = Arc::new(Echo::failing_with(errors));
        let dispatcher = Dispatcher::new(api.clone(), fast_settings());
        let envelope = dispatcher
            .dispatch(ToolRequest::new(
                Operation::DescribeDbClusters,
                Params::new(),
            ))
            .await
            .unwrap_err();
        assert_eq!(envelope.kind, ErrorKind::ProviderThrottled);
        assert!(envelope.retryable);
        assert_eq!(api.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_other_errors_not_retried() {
        let api = Arc::new(Echo::failing_with(vec![RdsError::from(
            ProviderError::service("DBClusterNotFoundFault", "not found"),
        )]));
        let dispatcher = Dispatcher::new(api.clone(), fast_settings());
        let envelope = dispatcher
            .dispatch(ToolRequest::new(
                Operation::GetDbCluster,
                params(json!({"db_cluster_identifier": "missing"})),
            ))
            .await
            .unwrap_err();
        assert_eq!(envelope.kind, ErrorKind::ResourceNotFound);
        assert_eq!(envelope.provider_code.as_deref(), Some("DBClusterNotFoundFault"));
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_confirmed_call_executes_without_token() {
        let api = Arc::new(Echo::default());
        let dispatcher = Dispatcher::new(
            api.clone(),
            DispatchSettings {
                readonly: false,
                ..fast_settings()
            },
        );
        let request = params(json!({
            "db_cluster_identifier": "prod-db-1",
            "skip_final_snapshot": true
        }));

        let envelope = dispatcher
            .dispatch(ToolRequest::new(Operation::DeleteDbCluster, request.clone()))
            .await
            .unwrap_err();
        let token = envelope.confirmation.unwrap().token;

        let result = dispatcher
            .dispatch(ToolRequest::new(
                Operation::DeleteDbCluster,
                request.with(CONFIRMATION_TOKEN_PARAM, token),
            ))
            .await
            .unwrap();
        assert!(result.data.get(CONFIRMATION_TOKEN_PARAM).is_none());
        assert_eq!(result.data["skip_final_snapshot"], true);
        assert_eq!(
            result.message.as_deref(),
            Some("DB cluster prod-db-1 deletion initiated")
        );
    }
}
