use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One language variant of a question group; `(gid, language)` is the key.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "groups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub gid: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub language: String,
    pub sid: i32,
    pub group_name: String,
    pub group_order: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub randomization_group: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub grelevance: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::surveys::Entity",
        from = "Column::Sid",
        to = "super::surveys::Column::Sid",
        on_delete = "Cascade"
    )]
    Surveys,
    #[sea_orm(has_many = "super::questions::Entity")]
    Questions,
}

impl Related<super::surveys::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Surveys.def()
    }
}

impl Related<super::questions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Questions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
