//! Readonly policy gate.
//!
//! The server boots in readonly mode unless told otherwise. While active, every
//! operation whose descriptor is marked as mutating is refused before the
//! confirmation gate runs, so readonly mode never issues confirmation tokens.

use crate::error::{RdsError, RdsResult};
use crate::models::OperationDescriptor;

/// Boot-time readonly policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadonlyGate {
    readonly: bool,
}

impl ReadonlyGate {
    pub fn new(readonly: bool) -> Self {
        Self { readonly }
    }

    /// Whether mutating operations are currently refused.
    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    /// Check an operation against the policy.
    ///
    /// # Examples
    ///
    /// ```
    /// use rds_mcp_server::models::Operation;
    /// use rds_mcp_server::tools::guard::ReadonlyGate;
    ///
    /// let gate = ReadonlyGate::new(true);
    /// assert!(gate.check(Operation::DescribeDbClusters.descriptor()).is_ok());
    /// assert!(gate.check(Operation::DeleteDbCluster.descriptor()).is_err());
    /// ```
    pub fn check(&self, descriptor: &OperationDescriptor) -> RdsResult<()> {
        if self.readonly && descriptor.mutates {
            return Err(RdsError::readonly_violation(descriptor.name));
        }
        Ok(())
    }
}

impl Default for ReadonlyGate {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::Operation;

    #[test]
    fn test_default_is_readonly() {
        assert!(ReadonlyGate::default().is_readonly());
    }

    #[test]
    fn test_readonly_blocks_every_mutating_operation() {
        let gate = ReadonlyGate::new(true);
        for op in Operation::ALL {
            let descriptor = op.descriptor();
            let result = gate.check(descriptor);
            if descriptor.mutates {
                let err = result.unwrap_err();
                assert_eq!(err.kind(), ErrorKind::ReadonlyViolation);
                assert!(err.to_string().contains(descriptor.name));
            } else {
                assert!(result.is_ok(), "{} should be allowed", descriptor.name);
            }
        }
    }

    #[test]
    fn test_writable_allows_everything() {
        let gate = ReadonlyGate::new(false);
        for op in Operation::ALL {
            assert!(gate.check(op.descriptor()).is_ok());
        }
    }
}
