//! Create user_role_groups membership table.
//!
//! Membership is a set: the (user_id, role_group_id) pair is unique.

use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_users::Users;
use super::m20250301_000002_create_role_groups::RoleGroups;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserRoleGroups::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserRoleGroups::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserRoleGroups::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(UserRoleGroups::RoleGroupId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserRoleGroups::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_role_groups_user")
                            .from(UserRoleGroups::Table, UserRoleGroups::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_role_groups_role_group")
                            .from(UserRoleGroups::Table, UserRoleGroups::RoleGroupId)
                            .to(RoleGroups::Table, RoleGroups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uix_user_role_group")
                    .table(UserRoleGroups::Table)
                    .col(UserRoleGroups::UserId)
                    .col(UserRoleGroups::RoleGroupId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserRoleGroups::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum UserRoleGroups {
    Table,
    Id,
    UserId,
    RoleGroupId,
    CreatedAt,
}
