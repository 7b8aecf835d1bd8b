//! Membership join between users and role groups. One row per (user, group).

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_role_groups")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub role_group_id: i32,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::role_group::Entity",
        from = "Column::RoleGroupId",
        to = "super::role_group::Column::Id",
        on_delete = "Cascade"
    )]
    RoleGroup,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::role_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoleGroup.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
