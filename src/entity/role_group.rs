//! Role group entity: a named set of users sharing a set of visible reports.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "role_groups")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_role_group::Entity")]
    UserRoleGroups,
    #[sea_orm(has_many = "super::group_visible_report::Entity")]
    GroupVisibleReports,
}

impl Related<super::user_role_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserRoleGroups.def()
    }
}

impl Related<super::group_visible_report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GroupVisibleReports.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_role_group::Relation::User.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::user_role_group::Relation::RoleGroup.def().rev())
    }
}

impl Related<super::report::Entity> for Entity {
    fn to() -> RelationDef {
        super::group_visible_report::Relation::Report.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::group_visible_report::Relation::RoleGroup.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
