//! SeaORM entity definitions.
//!
//! Three join tables carry the many-to-many relations: `user_role_groups`
//! (membership), `group_visible_reports` (visibility) and `report_tags`.

pub mod group_visible_report;
pub mod report;
pub mod report_tag;
pub mod role_group;
pub mod session;
pub mod tag;
pub mod user;
pub mod user_role_group;
