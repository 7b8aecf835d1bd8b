//! API E2E test suite.
//!
//! Drives the full route table against an in-memory SQLite database and a
//! mock DingTalk provider running on an ephemeral port.
//!
//! Run with: cargo test --test api_e2e

mod mock_dingtalk;
mod test_helpers;

mod test_access_gate;
mod test_login;
mod test_management;
mod test_visibility;
