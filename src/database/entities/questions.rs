use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "questions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub qid: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub language: String,
    /// 0 for top-level questions, otherwise the owning question's qid
    pub parent_qid: i32,
    pub sid: i32,
    pub gid: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub question: String,
    pub question_order: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::question_groups::Entity",
        from = "(Column::Gid, Column::Language)",
        to = "(super::question_groups::Column::Gid, super::question_groups::Column::Language)"
    )]
    QuestionGroups,
}

impl Related<super::question_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QuestionGroups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
