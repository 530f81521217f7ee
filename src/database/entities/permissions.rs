use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "permissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// `survey` or `global`
    pub entity: String,
    pub entity_id: i32,
    pub uid: i32,
    pub permission: String,
    pub create_p: bool,
    pub read_p: bool,
    pub update_p: bool,
    pub delete_p: bool,
    pub import_p: bool,
    pub export_p: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
