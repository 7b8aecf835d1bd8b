//! User entity. A user logs in through DingTalk or is pre-registered by an administrator.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// DingTalk unionId once bound; the display name while still a placeholder.
    #[sea_orm(unique)]
    pub external_identity_id: Option<String>,
    pub display_name: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub last_login_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_role_group::Entity")]
    UserRoleGroups,
    #[sea_orm(has_many = "super::session::Entity")]
    Sessions,
}

impl Related<super::user_role_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserRoleGroups.def()
    }
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl Related<super::role_group::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_role_group::Relation::RoleGroup.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::user_role_group::Relation::User.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
