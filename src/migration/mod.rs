//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_users;
mod m20250301_000002_create_role_groups;
mod m20250301_000003_create_reports;
mod m20250301_000004_create_tags;
mod m20250301_000005_create_user_role_groups;
mod m20250301_000006_create_group_visible_reports;
mod m20250301_000007_create_sessions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users::Migration),
            Box::new(m20250301_000002_create_role_groups::Migration),
            Box::new(m20250301_000003_create_reports::Migration),
            Box::new(m20250301_000004_create_tags::Migration),
            Box::new(m20250301_000005_create_user_role_groups::Migration),
            Box::new(m20250301_000006_create_group_visible_reports::Migration),
            Box::new(m20250301_000007_create_sessions::Migration),
        ]
    }
}
