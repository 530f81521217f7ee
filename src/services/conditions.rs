use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect};
use serde::Serialize;
use std::collections::HashMap;

use crate::database::entities::{conditions, questions};
use crate::errors::GroupResult;

/// A condition in another group that targets a question of the group in question
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupDependency {
    pub cid: i32,
    /// Question carrying the condition
    pub dependent_qid: i32,
    /// Group of the question carrying the condition
    pub dependent_gid: i32,
    /// Question whose answer the condition reads
    pub target_qid: i32,
}

#[derive(Clone, Debug)]
pub struct ConditionService {
    db: DatabaseConnection,
}

impl ConditionService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Conditions on questions outside `gid` that read answers from questions
    /// inside `gid`. Deleting the group would leave these dangling.
    pub async fn group_dependencies(&self, sid: i32, gid: i32) -> GroupResult<Vec<GroupDependency>> {
        let target_qids: Vec<i32> = questions::Entity::find()
            .select_only()
            .column(questions::Column::Qid)
            .distinct()
            .filter(questions::Column::Sid.eq(sid))
            .filter(questions::Column::Gid.eq(gid))
            .into_tuple()
            .all(&self.db)
            .await?;

        if target_qids.is_empty() {
            return Ok(Vec::new());
        }

        let candidates = conditions::Entity::find()
            .filter(conditions::Column::Cqid.is_in(target_qids))
            .all(&self.db)
            .await?;

        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let dependent_qids: Vec<i32> = candidates.iter().map(|c| c.qid).collect();
        let question_groups: HashMap<i32, i32> = questions::Entity::find()
            .select_only()
            .column(questions::Column::Qid)
            .column(questions::Column::Gid)
            .distinct()
            .filter(questions::Column::Sid.eq(sid))
            .filter(questions::Column::Qid.is_in(dependent_qids))
            .into_tuple::<(i32, i32)>()
            .all(&self.db)
            .await?
            .into_iter()
            .collect();

        let dependencies = candidates
            .into_iter()
            .filter_map(|condition| {
                let dependent_gid = *question_groups.get(&condition.qid)?;
                (dependent_gid != gid).then_some(GroupDependency {
                    cid: condition.cid,
                    dependent_qid: condition.qid,
                    dependent_gid,
                    target_qid: condition.cqid,
                })
            })
            .collect();

        Ok(dependencies)
    }
}
