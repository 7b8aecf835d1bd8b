//! Report entity for embedded Power BI reports.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "reports")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// Power BI report id; only revealed to editors, admins and gated detail reads.
    pub external_report_id: String,
    pub is_active: bool,
    pub is_hidden: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::group_visible_report::Entity")]
    GroupVisibleReports,
    #[sea_orm(has_many = "super::report_tag::Entity")]
    ReportTags,
}

impl Related<super::group_visible_report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GroupVisibleReports.def()
    }
}

impl Related<super::report_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReportTags.def()
    }
}

impl Related<super::role_group::Entity> for Entity {
    fn to() -> RelationDef {
        super::group_visible_report::Relation::RoleGroup.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::group_visible_report::Relation::Report.def().rev())
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::report_tag::Relation::Tag.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::report_tag::Relation::Report.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
