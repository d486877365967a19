//! Amazon RDS control-plane layer.
//!
//! This module provides:
//! - `RdsApi`: the adapter seam the dispatcher talks to
//! - `AwsRdsClient`: the AWS SDK implementation
//! - `ConfirmationGate`: single-use challenges for mutating operations
//! - `paginate`: capped, marker-based list walks

pub mod adapter;
pub mod client;
pub mod confirmation;
pub mod pagination;
pub mod shape;

pub use adapter::{Page, PageWindow, RdsApi};
pub use client::AwsRdsClient;
pub use confirmation::{ConfirmationGate, IssuedChallenge, RedeemError};
pub use pagination::{Paginated, paginate};
