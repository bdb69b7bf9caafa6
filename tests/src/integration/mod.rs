//! # Integration Flows
//!
//! Each module drives public APIs only.

pub mod alert_flows;
pub mod bootstrap_flows;
pub mod client_flows;
pub mod identity_flows;
