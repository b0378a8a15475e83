//! HTTP handlers
//!
//! Thin bindings: parse and validate the request, call the wallet service or
//! the provisioning repository, wrap the result in `ApiResponse`.

mod health;
mod provisioning;
mod transfer;
mod wallet;

pub use health::*;
pub use provisioning::*;
pub use transfer::*;
pub use wallet::*;
