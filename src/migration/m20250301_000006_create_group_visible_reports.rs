//! Create group_visible_reports visibility table.

use sea_orm_migration::prelude::*;

use super::m20250301_000002_create_role_groups::RoleGroups;
use super::m20250301_000003_create_reports::Reports;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GroupVisibleReports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GroupVisibleReports::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GroupVisibleReports::RoleGroupId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GroupVisibleReports::ReportId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GroupVisibleReports::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_group_visible_reports_role_group")
                            .from(GroupVisibleReports::Table, GroupVisibleReports::RoleGroupId)
                            .to(RoleGroups::Table, RoleGroups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_group_visible_reports_report")
                            .from(GroupVisibleReports::Table, GroupVisibleReports::ReportId)
                            .to(Reports::Table, Reports::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uix_group_visible_report")
                    .table(GroupVisibleReports::Table)
                    .col(GroupVisibleReports::RoleGroupId)
                    .col(GroupVisibleReports::ReportId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_group_visible_reports_report_id")
                    .table(GroupVisibleReports::Table)
                    .col(GroupVisibleReports::ReportId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GroupVisibleReports::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum GroupVisibleReports {
    Table,
    Id,
    RoleGroupId,
    ReportId,
    CreatedAt,
}
