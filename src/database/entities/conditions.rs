use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A display condition: question `qid` is shown depending on the answer to
/// the target question `cqid`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "conditions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub cid: i32,
    pub qid: i32,
    pub cqid: i32,
    pub cfieldname: String,
    pub method: String,
    pub value: String,
    pub scenario: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
