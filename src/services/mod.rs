//! Business logic services.

pub mod dingtalk;
pub mod identity;
pub mod session;
pub mod visibility;

pub use dingtalk::DingTalkClient;
