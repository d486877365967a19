//! Error types for the RDS MCP Server.
//!
//! This module defines the fixed error taxonomy surfaced to callers, the raw
//! provider failure type produced by the AWS adapter, and the single table that
//! translates provider error codes into the taxonomy. Each error variant carries
//! an actionable message so AI assistants can recover from error conditions.

use crate::rds::confirmation::IssuedChallenge;
use serde::Serialize;
use thiserror::Error;

/// Machine-readable error kinds returned to callers.
///
/// The set is closed: every failure reaching the dispatcher boundary is
/// reported as exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    InvalidIdentifier,
    InvalidParameter,
    ReadonlyViolation,
    ConfirmationRequired,
    ConfirmationExpired,
    ConfirmationMismatch,
    ResourceNotFound,
    ResourceAlreadyExists,
    /// Recoverable; retry with backoff.
    ProviderThrottled,
    /// The provider validated and refused the request.
    ProviderRejected,
    CredentialsUnavailable,
    Unknown,
}

impl ErrorKind {
    /// Stable string form of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier => "InvalidIdentifier",
            Self::InvalidParameter => "InvalidParameter",
            Self::ReadonlyViolation => "ReadonlyViolation",
            Self::ConfirmationRequired => "ConfirmationRequired",
            Self::ConfirmationExpired => "ConfirmationExpired",
            Self::ConfirmationMismatch => "ConfirmationMismatch",
            Self::ResourceNotFound => "ResourceNotFound",
            Self::ResourceAlreadyExists => "ResourceAlreadyExists",
            Self::ProviderThrottled => "ProviderThrottled",
            Self::ProviderRejected => "ProviderRejected",
            Self::CredentialsUnavailable => "CredentialsUnavailable",
            Self::Unknown => "Unknown",
        }
    }

    /// Only throttling is worth retrying without changing the input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ProviderThrottled)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum RdsError {
    #[error("Invalid identifier for '{param}': {reason}")]
    InvalidIdentifier { param: String, reason: String },

    #[error("Invalid parameters: {message}")]
    InvalidParameter { message: String },

    #[error(
        "Operation '{operation}' requires write access. The server is currently in read-only mode."
    )]
    ReadonlyViolation { operation: String },

    #[error(
        "{operation} on '{resource_id}' requires confirmation. Call the tool again with confirmation_token set to the issued token."
    )]
    ConfirmationRequired {
        operation: String,
        resource_id: String,
        challenge: Box<IssuedChallenge>,
    },

    #[error("Confirmation token for {operation} on '{resource_id}' has expired")]
    ConfirmationExpired {
        operation: String,
        resource_id: String,
    },

    #[error("Confirmation rejected for {operation} on '{resource_id}': {reason}")]
    ConfirmationMismatch {
        operation: String,
        resource_id: String,
        reason: String,
    },

    #[error("Resource not found: {message} ({code})")]
    ResourceNotFound { code: String, message: String },

    #[error("Resource already exists: {message} ({code})")]
    ResourceAlreadyExists { code: String, message: String },

    #[error("Request throttled by RDS: {message} ({code})")]
    ProviderThrottled { code: String, message: String },

    #[error("RDS rejected the request: {message} ({code})")]
    ProviderRejected { code: String, message: String },

    #[error("AWS credentials unavailable: {message}")]
    CredentialsUnavailable {
        /// e.g., "ExpiredToken" when the provider reported one
        code: Option<String>,
        message: String,
    },

    #[error("Unexpected error: {message} ({code})")]
    Unknown { code: String, message: String },
}

impl RdsError {
    /// Create an invalid identifier error.
    pub fn invalid_identifier(param: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            param: param.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid parameter error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    /// Create a readonly violation error.
    pub fn readonly_violation(operation: impl Into<String>) -> Self {
        Self::ReadonlyViolation {
            operation: operation.into(),
        }
    }

    /// Create a confirmation required error around an issued challenge.
    pub fn confirmation_required(challenge: IssuedChallenge) -> Self {
        Self::ConfirmationRequired {
            operation: challenge.operation.to_string(),
            resource_id: challenge.resource_id.clone(),
            challenge: Box::new(challenge),
        }
    }

    /// Create a confirmation expired error.
    pub fn confirmation_expired(
        operation: impl Into<String>,
        resource_id: impl Into<String>,
    ) -> Self {
        Self::ConfirmationExpired {
            operation: operation.into(),
            resource_id: resource_id.into(),
        }
    }

    /// Create a confirmation mismatch error.
    pub fn confirmation_mismatch(
        operation: impl Into<String>,
        resource_id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::ConfirmationMismatch {
            operation: operation.into(),
            resource_id: resource_id.into(),
            reason: reason.into(),
        }
    }

    /// Create a resource not found error that did not come from the provider.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::ResourceNotFound {
            code: "NotFound".to_string(),
            message: message.into(),
        }
    }

    /// Create a credentials unavailable error.
    pub fn credentials_unavailable(message: impl Into<String>) -> Self {
        Self::CredentialsUnavailable {
            code: None,
            message: message.into(),
        }
    }

    /// Create an internal error. Reported to callers as `Unknown`.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Unknown {
            code: "Internal".to_string(),
            message: message.into(),
        }
    }

    /// The taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidIdentifier { .. } => ErrorKind::InvalidIdentifier,
            Self::InvalidParameter { .. } => ErrorKind::InvalidParameter,
            Self::ReadonlyViolation { .. } => ErrorKind::ReadonlyViolation,
            Self::ConfirmationRequired { .. } => ErrorKind::ConfirmationRequired,
            Self::ConfirmationExpired { .. } => ErrorKind::ConfirmationExpired,
            Self::ConfirmationMismatch { .. } => ErrorKind::ConfirmationMismatch,
            Self::ResourceNotFound { .. } => ErrorKind::ResourceNotFound,
            Self::ResourceAlreadyExists { .. } => ErrorKind::ResourceAlreadyExists,
            Self::ProviderThrottled { .. } => ErrorKind::ProviderThrottled,
            Self::ProviderRejected { .. } => ErrorKind::ProviderRejected,
            Self::CredentialsUnavailable { .. } => ErrorKind::CredentialsUnavailable,
            Self::Unknown { .. } => ErrorKind::Unknown,
        }
    }

    /// The original provider error code, if any.
    pub fn provider_code(&self) -> Option<&str> {
        match self {
            Self::ResourceNotFound { code, .. }
            | Self::ResourceAlreadyExists { code, .. }
            | Self::ProviderThrottled { code, .. }
            | Self::ProviderRejected { code, .. }
            | Self::Unknown { code, .. } => Some(code),
            Self::CredentialsUnavailable { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::InvalidIdentifier { .. } => Some(
                "Identifiers must begin with a letter, contain only letters, digits and hyphens, \
                 must not contain two consecutive hyphens and must not end with a hyphen",
            ),
            Self::ReadonlyViolation { .. } => {
                Some("Restart the server with --readonly false to allow mutating operations")
            }
            Self::ConfirmationRequired { .. } => Some(
                "Review the warning, then call the tool again with the same parameters and confirmation_token",
            ),
            Self::ConfirmationExpired { .. } => {
                Some("Call the tool again without confirmation_token to obtain a new token")
            }
            Self::ConfirmationMismatch { .. } => Some(
                "Resubmit with the exact token and parameters from the most recent confirmation request",
            ),
            Self::ResourceNotFound { .. } => {
                Some("Verify the identifier with a Describe or List tool")
            }
            Self::ProviderThrottled { .. } => {
                Some("Retry after a short delay using exponential backoff")
            }
            Self::CredentialsUnavailable { .. } => {
                Some("Check the AWS credentials for the configured profile and region")
            }
            _ => None,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

/// Result type alias for RDS operations.
pub type RdsResult<T> = Result<T, RdsError>;

/// Where a raw provider failure originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderFailure {
    /// The service answered with an error code.
    Service,
    /// Credentials could not be resolved or were refused before dispatch.
    Credentials,
    /// The request never produced a service response (construction, dispatch, timeout).
    Transport,
}

/// A raw failure reported by the RDS provider, before translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub failure: ProviderFailure,
    pub code: Option<String>,
    pub message: String,
}

impl ProviderError {
    /// A service error with the provider's error code.
    pub fn service(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            failure: ProviderFailure::Service,
            code: Some(code.into()),
            message: message.into(),
        }
    }

    /// A credentials resolution failure.
    pub fn credentials(message: impl Into<String>) -> Self {
        Self {
            failure: ProviderFailure::Credentials,
            code: None,
            message: message.into(),
        }
    }

    /// A failure that produced no service response.
    pub fn transport(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            failure: ProviderFailure::Transport,
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

/// How a table entry matches a provider error code.
#[derive(Debug, Clone, Copy)]
enum CodePattern {
    Exact(&'static str),
    Suffix(&'static str),
    Prefix(&'static str),
}

impl CodePattern {
    fn matches(&self, code: &str) -> bool {
        match self {
            Self::Exact(exact) => code == *exact,
            Self::Suffix(suffix) => code.ends_with(suffix),
            Self::Prefix(prefix) => code.starts_with(prefix),
        }
    }
}

/// Provider error code to taxonomy mapping. First match wins, so exact
/// entries come before the broader suffix and prefix rules.
///
/// New provider codes are added here, never at call sites.
const PROVIDER_ERROR_CODES: &[(CodePattern, ErrorKind)] = &[
    // Credentials
    (CodePattern::Exact("ExpiredToken"), ErrorKind::CredentialsUnavailable),
    (CodePattern::Exact("ExpiredTokenException"), ErrorKind::CredentialsUnavailable),
    (CodePattern::Exact("InvalidClientTokenId"), ErrorKind::CredentialsUnavailable),
    (CodePattern::Exact("UnrecognizedClientException"), ErrorKind::CredentialsUnavailable),
    (CodePattern::Exact("SignatureDoesNotMatch"), ErrorKind::CredentialsUnavailable),
    (CodePattern::Exact("MissingAuthenticationToken"), ErrorKind::CredentialsUnavailable),
    (CodePattern::Exact("IncompleteSignature"), ErrorKind::CredentialsUnavailable),
    // Throttling
    (CodePattern::Exact("Throttling"), ErrorKind::ProviderThrottled),
    (CodePattern::Exact("ThrottlingException"), ErrorKind::ProviderThrottled),
    (CodePattern::Exact("ThrottledException"), ErrorKind::ProviderThrottled),
    (CodePattern::Exact("RequestThrottled"), ErrorKind::ProviderThrottled),
    (CodePattern::Exact("RequestThrottledException"), ErrorKind::ProviderThrottled),
    (CodePattern::Exact("RequestLimitExceeded"), ErrorKind::ProviderThrottled),
    (CodePattern::Exact("TooManyRequestsException"), ErrorKind::ProviderThrottled),
    (CodePattern::Exact("ProvisionedThroughputExceededException"), ErrorKind::ProviderThrottled),
    (CodePattern::Exact("SlowDown"), ErrorKind::ProviderThrottled),
    (CodePattern::Exact("PriorRequestNotComplete"), ErrorKind::ProviderThrottled),
    // Not found
    (CodePattern::Exact("DBClusterNotFoundFault"), ErrorKind::ResourceNotFound),
    (CodePattern::Exact("DBInstanceNotFound"), ErrorKind::ResourceNotFound),
    (CodePattern::Exact("DBClusterSnapshotNotFoundFault"), ErrorKind::ResourceNotFound),
    (CodePattern::Exact("DBSnapshotNotFound"), ErrorKind::ResourceNotFound),
    (CodePattern::Exact("DBParameterGroupNotFound"), ErrorKind::ResourceNotFound),
    (CodePattern::Exact("DBClusterParameterGroupNotFound"), ErrorKind::ResourceNotFound),
    (CodePattern::Exact("DBSubnetGroupNotFoundFault"), ErrorKind::ResourceNotFound),
    (CodePattern::Suffix("NotFoundFault"), ErrorKind::ResourceNotFound),
    (CodePattern::Suffix("NotFound"), ErrorKind::ResourceNotFound),
    // Already exists
    (CodePattern::Exact("DBClusterAlreadyExistsFault"), ErrorKind::ResourceAlreadyExists),
    (CodePattern::Exact("DBInstanceAlreadyExists"), ErrorKind::ResourceAlreadyExists),
    (CodePattern::Exact("DBClusterSnapshotAlreadyExistsFault"), ErrorKind::ResourceAlreadyExists),
    (CodePattern::Exact("DBSnapshotAlreadyExists"), ErrorKind::ResourceAlreadyExists),
    (CodePattern::Exact("DBParameterGroupAlreadyExists"), ErrorKind::ResourceAlreadyExists),
    (CodePattern::Suffix("AlreadyExistsFault"), ErrorKind::ResourceAlreadyExists),
    (CodePattern::Suffix("AlreadyExists"), ErrorKind::ResourceAlreadyExists),
    // Validated and refused
    (CodePattern::Exact("InvalidParameterValue"), ErrorKind::ProviderRejected),
    (CodePattern::Exact("InvalidParameterCombination"), ErrorKind::ProviderRejected),
    (CodePattern::Exact("MissingParameter"), ErrorKind::ProviderRejected),
    (CodePattern::Exact("ValidationError"), ErrorKind::ProviderRejected),
    (CodePattern::Exact("AccessDenied"), ErrorKind::ProviderRejected),
    (CodePattern::Exact("AccessDeniedException"), ErrorKind::ProviderRejected),
    (CodePattern::Exact("UnauthorizedOperation"), ErrorKind::ProviderRejected),
    (CodePattern::Exact("OptInRequired"), ErrorKind::ProviderRejected),
    (CodePattern::Prefix("Invalid"), ErrorKind::ProviderRejected),
    (CodePattern::Suffix("QuotaExceeded"), ErrorKind::ProviderRejected),
    (CodePattern::Suffix("QuotaExceededFault"), ErrorKind::ProviderRejected),
    (CodePattern::Suffix("NotSupportedFault"), ErrorKind::ProviderRejected),
    (CodePattern::Suffix("NotAvailableFault"), ErrorKind::ProviderRejected),
    (CodePattern::Suffix("NotEnabledFault"), ErrorKind::ProviderRejected),
];

/// Look up the taxonomy kind for a provider error code.
pub fn classify_provider_code(code: &str) -> ErrorKind {
    PROVIDER_ERROR_CODES
        .iter()
        .find(|(pattern, _)| pattern.matches(code))
        .map(|(_, kind)| *kind)
        .unwrap_or(ErrorKind::Unknown)
}

/// Translate raw provider failures into the fixed taxonomy.
impl From<ProviderError> for RdsError {
    fn from(err: ProviderError) -> Self {
        let ProviderError {
            failure,
            code,
            message,
        } = err;

        if failure == ProviderFailure::Credentials {
            return RdsError::CredentialsUnavailable { code, message };
        }

        let code = code.unwrap_or_else(|| "Unknown".to_string());
        let kind = match failure {
            ProviderFailure::Service => classify_provider_code(&code),
            _ => ErrorKind::Unknown,
        };

        match kind {
            ErrorKind::ResourceNotFound => RdsError::ResourceNotFound { code, message },
            ErrorKind::ResourceAlreadyExists => RdsError::ResourceAlreadyExists { code, message },
            ErrorKind::ProviderThrottled => RdsError::ProviderThrottled { code, message },
            ErrorKind::ProviderRejected => RdsError::ProviderRejected { code, message },
            ErrorKind::CredentialsUnavailable => RdsError::CredentialsUnavailable {
                code: Some(code),
                message,
            },
            _ => RdsError::Unknown { code, message },
        }
    }
}

/// The structured error returned to callers instead of raising past the
/// dispatcher boundary.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    /// Always false
    pub success: bool,
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_code: Option<String>,
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Present only for `ConfirmationRequired`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation: Option<IssuedChallenge>,
}

impl From<RdsError> for ErrorEnvelope {
    fn from(err: RdsError) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        let provider_code = err.provider_code().map(str::to_string);
        let suggestion = err.suggestion().map(str::to_string);
        let confirmation = match err {
            RdsError::ConfirmationRequired { challenge, .. } => Some(*challenge),
            _ => None,
        };

        Self {
            success: false,
            kind,
            message,
            provider_code,
            retryable: kind.is_retryable(),
            suggestion,
            confirmation,
        }
    }
}

/// Build error data as JSON value.
fn error_data(err: &RdsError) -> Option<serde_json::Value> {
    Some(serde_json::json!({
        "kind": err.kind(),
        "provider_code": err.provider_code(),
        "suggestion": err.suggestion(),
    }))
}

/// Convert RdsError to MCP ErrorData for protocol-level failures.
impl From<RdsError> for rmcp::ErrorData {
    fn from(err: RdsError) -> Self {
        let data = error_data(&err);
        match err.kind() {
            ErrorKind::InvalidIdentifier
            | ErrorKind::InvalidParameter
            | ErrorKind::ReadonlyViolation
            | ErrorKind::ConfirmationRequired
            | ErrorKind::ConfirmationExpired
            | ErrorKind::ConfirmationMismatch
            | ErrorKind::ProviderRejected => rmcp::ErrorData::invalid_params(err.to_string(), data),

            ErrorKind::ResourceNotFound => {
                rmcp::ErrorData::resource_not_found(err.to_string(), data)
            }

            ErrorKind::ResourceAlreadyExists
            | ErrorKind::ProviderThrottled
            | ErrorKind::CredentialsUnavailable
            | ErrorKind::Unknown => rmcp::ErrorData::internal_error(err.to_string(), data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RdsError::readonly_violation("DeleteDBCluster");
        assert!(err.to_string().contains("read-only mode"));
        assert!(err.to_string().contains("DeleteDBCluster"));
    }

    #[test]
    fn test_only_throttling_is_retryable() {
        let throttled: RdsError = ProviderError::service("Throttling", "slow down").into();
        assert!(throttled.is_retryable());

        let rejected: RdsError =
            ProviderError::service("InvalidParameterValue", "bad value").into();
        assert!(!rejected.is_retryable());
        assert!(!RdsError::readonly_violation("x").is_retryable());
    }

    #[test]
    fn test_not_found_codes() {
        assert_eq!(
            classify_provider_code("DBClusterNotFoundFault"),
            ErrorKind::ResourceNotFound
        );
        assert_eq!(
            classify_provider_code("DBInstanceNotFound"),
            ErrorKind::ResourceNotFound
        );
        assert_eq!(
            classify_provider_code("DBProxyTargetGroupNotFoundFault"),
            ErrorKind::ResourceNotFound
        );
    }

    #[test]
    fn test_already_exists_codes() {
        assert_eq!(
            classify_provider_code("DBClusterAlreadyExistsFault"),
            ErrorKind::ResourceAlreadyExists
        );
        assert_eq!(
            classify_provider_code("DBInstanceAlreadyExists"),
            ErrorKind::ResourceAlreadyExists
        );
    }

    #[test]
    fn test_rejected_codes() {
        assert_eq!(
            classify_provider_code("InvalidDBClusterStateFault"),
            ErrorKind::ProviderRejected
        );
        assert_eq!(
            classify_provider_code("StorageQuotaExceeded"),
            ErrorKind::ProviderRejected
        );
        assert_eq!(
            classify_provider_code("AccessDenied"),
            ErrorKind::ProviderRejected
        );
    }

    #[test]
    fn test_credential_codes_take_precedence_over_invalid_prefix() {
        assert_eq!(
            classify_provider_code("InvalidClientTokenId"),
            ErrorKind::CredentialsUnavailable
        );
    }

    #[test]
    fn test_unmapped_code_is_unknown_and_keeps_code() {
        let err: RdsError = ProviderError::service("SomethingNew", "surprise").into();
        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert_eq!(err.provider_code(), Some("SomethingNew"));
    }

    #[test]
    fn test_transport_failure_is_unknown() {
        let err: RdsError = ProviderError::transport("DispatchFailure", "connection reset").into();
        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert_eq!(err.provider_code(), Some("DispatchFailure"));
    }

    #[test]
    fn test_credentials_failure() {
        let err: RdsError = ProviderError::credentials("no providers in chain").into();
        assert_eq!(err.kind(), ErrorKind::CredentialsUnavailable);
        assert_eq!(err.provider_code(), None);
    }

    #[test]
    fn test_envelope_carries_provider_code() {
        let err: RdsError = ProviderError::service("DBClusterNotFoundFault", "missing").into();
        let envelope = ErrorEnvelope::from(err);
        assert!(!envelope.success);
        assert_eq!(envelope.kind, ErrorKind::ResourceNotFound);
        assert_eq!(
            envelope.provider_code.as_deref(),
            Some("DBClusterNotFoundFault")
        );
        assert!(envelope.suggestion.is_some());
        assert!(envelope.confirmation.is_none());
    }

    #[test]
    fn test_envelope_serializes_kind_name() {
        let envelope = ErrorEnvelope::from(RdsError::readonly_violation("DeleteDBCluster"));
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["kind"], "ReadonlyViolation");
        assert_eq!(json["success"], false);
        assert!(json.get("provider_code").is_none());
    }

    // Tests for From<RdsError> for rmcp::ErrorData

    #[test]
    fn test_invalid_identifier_maps_to_invalid_params() {
        let err = RdsError::invalid_identifier("db_cluster_identifier", "bad");
        let mcp_err: rmcp::ErrorData = err.into();
        // invalid_params uses -32602
        assert_eq!(mcp_err.code.0, -32602);
    }

    #[test]
    fn test_not_found_maps_to_resource_not_found() {
        let err = RdsError::not_found("cluster prod-db-1");
        let mcp_err: rmcp::ErrorData = err.into();
        // resource_not_found uses -32002 in rmcp
        assert_eq!(mcp_err.code.0, -32002);
    }

    #[test]
    fn test_internal_maps_to_internal_error() {
        let err = RdsError::internal("transport failed");
        let mcp_err: rmcp::ErrorData = err.into();
        // internal_error uses -32603
        assert_eq!(mcp_err.code.0, -32603);
        let data = mcp_err.data.unwrap();
        assert_eq!(data["kind"], "Unknown");
    }
}
