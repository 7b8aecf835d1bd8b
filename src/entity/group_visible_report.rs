//! Visibility join: members of a role group may see the linked report.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "group_visible_reports")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub role_group_id: i32,
    pub report_id: i32,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::role_group::Entity",
        from = "Column::RoleGroupId",
        to = "super::role_group::Column::Id",
        on_delete = "Cascade"
    )]
    RoleGroup,
    #[sea_orm(
        belongs_to = "super::report::Entity",
        from = "Column::ReportId",
        to = "super::report::Column::Id",
        on_delete = "Cascade"
    )]
    Report,
}

impl Related<super::role_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoleGroup.def()
    }
}

impl Related<super::report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Report.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
