use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "surveys")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub sid: i32,
    pub owner_id: i32,
    /// Base language code, e.g. `en`
    pub language: String,
    /// Space separated list of translation language codes
    pub additional_languages: String,
    /// `Y` once the survey has been activated, `N` otherwise
    pub active: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::question_groups::Entity")]
    QuestionGroups,
}

impl Related<super::question_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QuestionGroups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Anything other than `N` counts as active, including states such as
    /// expired surveys that still hold response tables.
    pub fn is_active(&self) -> bool {
        self.active != "N"
    }

    pub fn additional_language_codes(&self) -> Vec<String> {
        self.additional_languages
            .split_whitespace()
            .filter(|code| *code != self.language)
            .map(str::to_string)
            .collect()
    }

    /// Base language first, then translations in their declared order.
    pub fn all_languages(&self) -> Vec<String> {
        let mut languages = vec![self.language.clone()];
        for code in self.additional_language_codes() {
            if !languages.contains(&code) {
                languages.push(code);
            }
        }
        languages
    }
}
