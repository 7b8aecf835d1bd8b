//! Tag entity for labelling reports.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tags")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::report_tag::Entity")]
    ReportTags,
}

impl Related<super::report_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReportTags.def()
    }
}

impl Related<super::report::Entity> for Entity {
    fn to() -> RelationDef {
        super::report_tag::Relation::Report.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::report_tag::Relation::Tag.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
