//! Tool request handling.
//!
//! This module contains the request path shared by every tool:
//! - `identifier`: RDS identifier validation and normalization
//! - `guard`: readonly policy gate
//! - `dispatcher`: the generic validate/gate/execute/paginate routine
//! - `inputs`: typed tool inputs published as JSON schemas

pub mod dispatcher;
pub mod guard;
pub mod identifier;
pub mod inputs;

pub use dispatcher::{DispatchSettings, Dispatcher, RetryPolicy, validate_params};
pub use guard::ReadonlyGate;
pub use identifier::{ResourceKind, validate_identifier};
