//! Confirmation gate for mutating operations.
//!
//! A mutating call without a token receives a single-use challenge bound to the
//! operation, the normalized resource identifier and a fingerprint of the
//! parameters. Resubmitting the identical call with the token executes it.
//! Challenges live in memory only and are swept periodically.

use crate::models::{Impact, Operation};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Prefix of every confirmation token.
pub const TOKEN_PREFIX: &str = "cfm_";

/// Default challenge lifetime in seconds.
pub const DEFAULT_CONFIRMATION_TTL_SECS: u64 = 300;

/// Default number of random bytes per token.
pub const DEFAULT_TOKEN_BYTES: usize = 16;

/// Accepted range for the number of random bytes per token.
pub const MIN_TOKEN_BYTES: usize = 16;
pub const MAX_TOKEN_BYTES: usize = 64;

/// Cleanup interval for expired challenges.
const CLEANUP_INTERVAL_SECS: u64 = 30;

/// The challenge handed back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedChallenge {
    pub token: String,
    pub operation: Operation,
    pub resource_id: String,
    pub action: String,
    pub warning: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact: Option<Impact>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub expires_in_secs: u64,
}

/// Why a redemption failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedeemError {
    /// No challenge for this key (never issued, consumed or swept).
    Absent,
    /// The challenge outlived its TTL; it has been removed.
    Expired,
    /// The token does not match the outstanding challenge.
    TokenMismatch,
    /// The parameters differ from those the challenge was issued for.
    ParametersChanged,
}

struct PendingChallenge {
    token: String,
    fingerprint: String,
    issued_at: Instant,
}

impl PendingChallenge {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.issued_at.elapsed() >= ttl
    }
}

type ChallengeKey = (Operation, String);

pub struct ConfirmationGate {
    challenges: RwLock<HashMap<ChallengeKey, PendingChallenge>>,
    ttl: Duration,
    token_bytes: usize,
}

impl ConfirmationGate {
    /// Create a gate. `token_bytes` is clamped to the accepted range.
    pub fn new(ttl: Duration, token_bytes: usize) -> Self {
        Self {
            challenges: RwLock::new(HashMap::new()),
            ttl,
            token_bytes: token_bytes.clamp(MIN_TOKEN_BYTES, MAX_TOKEN_BYTES),
        }
    }

    /// Issue a challenge, replacing any outstanding one for the same key.
    pub async fn request(
        &self,
        operation: Operation,
        resource_id: &str,
        fingerprint: String,
        action: String,
        impact: Option<Impact>,
    ) -> IssuedChallenge {
        let token = generate_token(self.token_bytes);
        let issued_at = Utc::now();
        let expires_at = issued_at
            + chrono::Duration::from_std(self.ttl).unwrap_or_else(|_| chrono::Duration::zero());

        let replaced = {
            let mut challenges = self.challenges.write().await;
            challenges
                .insert(
                    (operation, resource_id.to_string()),
                    PendingChallenge {
                        token: token.clone(),
                        fingerprint,
                        issued_at: Instant::now(),
                    },
                )
                .is_some()
        };

        info!(
            operation = %operation,
            resource_id = %resource_id,
            replaced,
            ttl_secs = self.ttl.as_secs(),
            "Confirmation challenge issued"
        );

        IssuedChallenge {
            warning: build_warning(&action, resource_id, impact.as_ref()),
            token,
            operation,
            resource_id: resource_id.to_string(),
            action,
            impact,
            issued_at,
            expires_at,
            expires_in_secs: self.ttl.as_secs(),
        }
    }

    /// Redeem a token. On success the challenge is consumed.
    ///
    /// Runs entirely under the write lock, so concurrent redemptions of the
    /// same token cannot both succeed.
    pub async fn redeem(
        &self,
        operation: Operation,
        resource_id: &str,
        token: &str,
        fingerprint: &str,
    ) -> Result<(), RedeemError> {
        let key = (operation, resource_id.to_string());
        let mut challenges = self.challenges.write().await;

        let Some(pending) = challenges.get(&key) else {
            debug!(operation = %operation, resource_id = %resource_id, "No outstanding challenge");
            return Err(RedeemError::Absent);
        };

        if pending.is_expired(self.ttl) {
            challenges.remove(&key);
            warn!(operation = %operation, resource_id = %resource_id, "Confirmation token expired");
            return Err(RedeemError::Expired);
        }

        if !bool::from(pending.token.as_bytes().ct_eq(token.as_bytes())) {
            warn!(operation = %operation, resource_id = %resource_id, "Confirmation token mismatch");
            return Err(RedeemError::TokenMismatch);
        }

        if pending.fingerprint != fingerprint {
            warn!(
                operation = %operation,
                resource_id = %resource_id,
                "Parameters changed since confirmation was requested"
            );
            return Err(RedeemError::ParametersChanged);
        }

        challenges.remove(&key);
        info!(operation = %operation, resource_id = %resource_id, "Confirmation redeemed");
        Ok(())
    }

    /// Start a background task to purge stale challenges.
    ///
    /// This should be called once when the server starts.
    pub fn start_cleanup_task(self: Arc<Self>) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(CLEANUP_INTERVAL_SECS));
            loop {
                interval.tick().await;
                self.purge_expired().await;
            }
        });
    }

    /// Remove challenges that expired more than one TTL ago. Recently expired
    /// challenges are kept so redemption can still report expiry.
    pub async fn purge_expired(&self) -> usize {
        let horizon = self.ttl.saturating_mul(2);
        let mut challenges = self.challenges.write().await;
        let before = challenges.len();
        challenges.retain(|_, pending| !pending.is_expired(horizon));
        let purged = before - challenges.len();
        if purged > 0 {
            debug!(purged, "Purged stale confirmation challenges");
        }
        purged
    }

    /// Get the number of outstanding challenges.
    pub async fn count(&self) -> usize {
        let challenges = self.challenges.read().await;
        challenges.len()
    }
}

impl Default for ConfirmationGate {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(DEFAULT_CONFIRMATION_TTL_SECS),
            DEFAULT_TOKEN_BYTES,
        )
    }
}

/// Generate a token from OS randomness.
fn generate_token(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    OsRng.fill_bytes(&mut buf);
    format!("{}{}", TOKEN_PREFIX, URL_SAFE_NO_PAD.encode(&buf))
}

fn build_warning(action: &str, resource_id: &str, impact: Option<&Impact>) -> String {
    let mut warning = format!("WARNING: You are about to {} '{}'.", action, resource_id);
    if let Some(impact) = impact {
        warning.push_str(&format!(
            " Risk: {}. Downtime: {}. Data loss: {}. Reversible: {}. Estimated time: {}.",
            impact.risk.as_str(),
            impact.downtime,
            impact.data_loss,
            if impact.reversible { "yes" } else { "no" },
            impact.estimated_time
        ));
    }
    warning.push_str(" Resubmit the same request with this confirmation_token to proceed.");
    warning
}
