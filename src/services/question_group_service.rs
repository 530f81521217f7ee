use indexmap::IndexMap;
use sea_orm::sea_query::{Expr, LikeExpr};
use sea_orm::*;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::common::db_errors::DbErrorKind;
use crate::database::entities::{assessments, conditions, question_groups, questions, surveys};
use crate::errors::{FieldErrors, GroupError, GroupResult};
use crate::services::session::{AdminSession, FlashLevel};
use crate::services::validation::ValidationService;

pub const DEFAULT_PAGE_SIZE: u64 = 10;

const ACTIVE_SURVEY_INSERT_MESSAGE: &str = "You can not add a group if survey is active.";
const ACTIVE_SURVEY_DELETE_MESSAGE: &str = "Can't delete question group when the survey is active";
const POSITION_OVERFLOW_MESSAGE: &str = "Position leaves no room to number every group.";
const GID_EXHAUSTED_MESSAGE: &str = "No group id left to allocate.";

/// Attributes of one language variant of a group.
///
/// `gid` is left empty for a brand new group; setting it inserts the row
/// under that id (used to add the translations of an existing group).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewGroup {
    pub gid: Option<i32>,
    pub sid: i32,
    pub language: String,
    pub group_name: String,
    pub group_order: i32,
    pub description: Option<String>,
    pub randomization_group: String,
    pub grelevance: Option<String>,
}

impl NewGroup {
    pub fn new(sid: i32, language: impl Into<String>, group_name: impl Into<String>) -> Self {
        Self {
            gid: None,
            sid,
            language: language.into(),
            group_name: group_name.into(),
            group_order: 0,
            description: None,
            randomization_group: String::new(),
            grelevance: None,
        }
    }

    pub fn with_order(mut self, group_order: i32) -> Self {
        self.group_order = group_order;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Build from raw form fields (`gid`, `sid`, `language`, `group_name`,
    /// `group_order`, `description`, `randomization_group`, `grelevance`).
    pub fn from_fields(fields: &IndexMap<String, String>) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let mut group = NewGroup::new(0, "", "");
        let mut has_sid = false;

        for (key, value) in fields {
            match key.as_str() {
                "gid" => match parse_optional_int(value) {
                    Ok(gid) => group.gid = gid,
                    Err(()) => errors.add("gid", "Gid must be an integer."),
                },
                "sid" => match parse_optional_int(value) {
                    Ok(Some(sid)) => {
                        group.sid = sid;
                        has_sid = true;
                    }
                    Ok(None) => {}
                    Err(()) => errors.add("sid", "Sid must be an integer."),
                },
                "language" => group.language = value.trim().to_string(),
                "group_name" => group.group_name = value.clone(),
                "group_order" => match parse_optional_int(value) {
                    Ok(order) => group.group_order = order.unwrap_or(0),
                    Err(()) => errors.add("group_order", "Group order must be an integer."),
                },
                "description" => group.description = Some(value.clone()),
                "randomization_group" => group.randomization_group = value.clone(),
                "grelevance" => group.grelevance = Some(value.clone()),
                other => errors.add(other, format!("Unknown attribute \"{}\".", other)),
            }
        }

        if !has_sid && !errors.has("sid") {
            errors.add("sid", "Sid cannot be blank.");
        }

        errors.into_result().map(|_| group)
    }
}

fn parse_optional_int(value: &str) -> Result<Option<i32>, ()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed.parse::<i32>().map(Some).map_err(|_| ())
}

/// Edits applied to an existing language row; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupChanges {
    pub group_name: Option<String>,
    pub group_order: Option<i32>,
    pub description: Option<Option<String>>,
    pub randomization_group: Option<String>,
    pub grelevance: Option<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct GroupSummary {
    pub gid: i32,
    pub group_name: String,
}

/// Filter for the admin group list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSearch {
    pub sid: i32,
    pub language: String,
    /// Partial, case-insensitive match on the group name
    pub group_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortAttribute {
    GroupId,
    GroupOrder,
    GroupName,
}

impl SortAttribute {
    fn column(&self) -> question_groups::Column {
        match self {
            SortAttribute::GroupId => question_groups::Column::Gid,
            SortAttribute::GroupOrder => question_groups::Column::GroupOrder,
            SortAttribute::GroupName => question_groups::Column::GroupName,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortAttribute::GroupId => "group_id",
            SortAttribute::GroupOrder => "group_order",
            SortAttribute::GroupName => "group_name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupSort {
    pub attribute: SortAttribute,
    pub descending: bool,
}

impl Default for GroupSort {
    fn default() -> Self {
        Self {
            attribute: SortAttribute::GroupOrder,
            descending: false,
        }
    }
}

impl FromStr for GroupSort {
    type Err = String;

    /// Accepts `group_name` or `group_name.desc` style sort keys
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, descending) = match s.trim().strip_suffix(".desc") {
            Some(name) => (name, true),
            None => (s.trim(), false),
        };
        let attribute = match name {
            "group_id" => SortAttribute::GroupId,
            "group_order" => SortAttribute::GroupOrder,
            "group_name" => SortAttribute::GroupName,
            other => return Err(format!("Unknown sort attribute: {}", other)),
        };
        Ok(Self {
            attribute,
            descending,
        })
    }
}

impl fmt::Display for GroupSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            write!(f, "{}.desc", self.attribute.as_str())
        } else {
            f.write_str(self.attribute.as_str())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupPage {
    pub items: Vec<question_groups::Model>,
    pub total: u64,
    /// Zero-based page index
    pub page: u64,
    pub page_size: u64,
}

impl GroupPage {
    pub fn page_count(&self) -> u64 {
        self.total.div_ceil(self.page_size)
    }
}

/// Question group persistence: inserts across survey languages, ordering,
/// cascading deletes and the admin list query.
#[derive(Clone)]
pub struct QuestionGroupService {
    db: DatabaseConnection,
    default_page_size: u64,
}

impl QuestionGroupService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_default_page_size(mut self, page_size: u64) -> Self {
        self.default_page_size = page_size.max(1);
        self
    }

    /// Insert one language row, returning its gid or `None` when it could
    /// not be saved. Use [`Self::try_insert_record`] to see why.
    pub async fn insert_record(&self, data: NewGroup) -> Option<i32> {
        match self.try_insert_record(data).await {
            Ok(gid) => Some(gid),
            Err(err) => {
                warn!("Question group not saved: {}", err);
                None
            }
        }
    }

    pub async fn try_insert_record(&self, data: NewGroup) -> GroupResult<i32> {
        let group = insert_group(&self.db, data).await?;
        info!(
            "Created question group {} ({}) in survey {}",
            group.gid, group.language, group.sid
        );
        Ok(group.gid)
    }

    /// Insert a group in every language of its survey, keyed by language.
    ///
    /// The survey is taken from the first entry. The base language row
    /// allocates the gid and each translation reuses it. Rows are written
    /// atomically: if any language fails to save nothing is kept and the
    /// result is `Ok(None)`.
    pub async fn insert_new_group(
        &self,
        data: IndexMap<String, NewGroup>,
    ) -> GroupResult<Option<i32>> {
        let sid = data.values().next().ok_or(GroupError::EmptyInput)?.sid;
        let survey = find_survey(&self.db, sid).await?;
        let languages = survey.all_languages();

        if let Some(missing) = languages.iter().find(|lang| !data.contains_key(*lang)) {
            return Err(GroupError::MissingTranslation(missing.clone()));
        }

        let txn = self.db.begin().await?;
        let mut gid: Option<i32> = None;

        for language in &languages {
            let Some(row) = data.get(language) else {
                continue;
            };
            let mut row = row.clone();
            row.sid = sid;
            row.language = language.clone();
            if gid.is_some() {
                row.gid = gid;
            }

            match insert_group(&txn, row).await {
                Ok(group) => {
                    gid.get_or_insert(group.gid);
                }
                Err(err) => {
                    warn!(
                        "Question group for survey {} not saved in language {}: {}",
                        sid, language, err
                    );
                    txn.rollback().await?;
                    return Ok(None);
                }
            }
        }

        txn.commit().await?;
        info!(
            "Created question group {:?} in survey {} for {} language(s)",
            gid,
            sid,
            languages.len()
        );
        Ok(gid)
    }

    /// Edit an existing language row
    pub async fn update_record(
        &self,
        gid: i32,
        language: &str,
        changes: GroupChanges,
    ) -> GroupResult<question_groups::Model> {
        let group = question_groups::Entity::find_by_id((gid, language.to_string()))
            .one(&self.db)
            .await?
            .ok_or_else(|| GroupError::GroupNotFound {
                gid,
                language: language.to_string(),
            })?;

        let mut errors = FieldErrors::new();
        let mut active: question_groups::ActiveModel = group.into();

        if let Some(name) = changes.group_name {
            active.group_name = Set(ValidationService::validate_group_name(&name, &mut errors));
        }
        if let Some(order) = changes.group_order {
            active.group_order = Set(order);
        }
        if let Some(description) = changes.description {
            active.description = Set(description.map(|d| ValidationService::xss_filter(&d)));
        }
        if let Some(randomization_group) = changes.randomization_group {
            active.randomization_group = Set(randomization_group);
        }
        if let Some(grelevance) = changes.grelevance {
            active.grelevance = Set(grelevance);
        }
        errors.into_result()?;

        let updated = active.update(&self.db).await?;
        debug!("Updated question group {} ({})", gid, language);
        Ok(updated)
    }

    /// Rows matching `condition`, in the given order
    pub async fn get_all_records(
        &self,
        condition: Option<Condition>,
        order: &[(question_groups::Column, Order)],
    ) -> GroupResult<Vec<question_groups::Model>> {
        let mut query = question_groups::Entity::find();
        if let Some(condition) = condition {
            query = query.filter(condition);
        }
        for (column, direction) in order {
            query = query.order_by(*column, direction.clone());
        }
        Ok(query.all(&self.db).await?)
    }

    pub async fn get_all_groups(
        &self,
        condition: Condition,
        order: &[(question_groups::Column, Order)],
    ) -> GroupResult<Vec<question_groups::Model>> {
        self.get_all_records(Some(condition), order).await
    }

    /// Groups of a survey in its base language, by `group_order`
    pub async fn get_groups(&self, sid: i32) -> GroupResult<Vec<GroupSummary>> {
        let survey = find_survey(&self.db, sid).await?;

        let groups = question_groups::Entity::find()
            .select_only()
            .column(question_groups::Column::Gid)
            .column(question_groups::Column::GroupName)
            .filter(question_groups::Column::Sid.eq(sid))
            .filter(question_groups::Column::Language.eq(survey.language))
            .order_by_asc(question_groups::Column::GroupOrder)
            .into_model::<GroupSummary>()
            .all(&self.db)
            .await?;

        Ok(groups)
    }

    /// Renumber the groups of `sid` sequentially from `position`, following
    /// the current order in `language` (ties broken by name). Every language
    /// row of a group receives the same number. Returns the rows touched.
    pub async fn update_group_order(
        &self,
        sid: i32,
        language: &str,
        position: i32,
    ) -> GroupResult<u64> {
        let txn = self.db.begin().await?;

        let gids: Vec<i32> = question_groups::Entity::find()
            .select_only()
            .column(question_groups::Column::Gid)
            .filter(question_groups::Column::Sid.eq(sid))
            .filter(question_groups::Column::Language.eq(language))
            .order_by_asc(question_groups::Column::GroupOrder)
            .order_by_asc(question_groups::Column::GroupName)
            .into_tuple()
            .all(&txn)
            .await?;

        let mut touched = 0;
        for (offset, gid) in gids.into_iter().enumerate() {
            let order = i32::try_from(offset)
                .ok()
                .and_then(|offset| position.checked_add(offset))
                .ok_or_else(|| FieldErrors::single("position", POSITION_OVERFLOW_MESSAGE))?;

            let result = question_groups::Entity::update_many()
                .col_expr(question_groups::Column::GroupOrder, Expr::value(order))
                .filter(question_groups::Column::Sid.eq(sid))
                .filter(question_groups::Column::Gid.eq(gid))
                .exec(&txn)
                .await?;
            touched += result.rows_affected;
        }

        txn.commit().await?;
        debug!("Renumbered {} group row(s) in survey {}", touched, sid);
        Ok(touched)
    }

    /// Delete a group with its top-level questions (plus their subquestions
    /// and conditions) and its assessments.
    ///
    /// While the survey is active nothing is deleted: an error flash is
    /// queued on `session` and the result is `Ok(None)`. Otherwise returns
    /// the number of group rows removed.
    pub async fn delete_with_dependency(
        &self,
        gid: i32,
        sid: i32,
        session: &AdminSession,
    ) -> GroupResult<Option<u64>> {
        let survey = find_survey(&self.db, sid).await?;
        if survey.is_active() {
            session.set_flash(FlashLevel::Error, ACTIVE_SURVEY_DELETE_MESSAGE);
            return Ok(None);
        }

        let txn = self.db.begin().await?;

        let question_ids = question_ids_in_group(&txn, sid, gid).await?;
        delete_questions(&txn, sid, &question_ids).await?;

        assessments::Entity::delete_many()
            .filter(assessments::Column::Sid.eq(sid))
            .filter(assessments::Column::Gid.eq(gid))
            .exec(&txn)
            .await?;

        let deleted = question_groups::Entity::delete_many()
            .filter(question_groups::Column::Sid.eq(sid))
            .filter(question_groups::Column::Gid.eq(gid))
            .exec(&txn)
            .await?
            .rows_affected;

        txn.commit().await?;
        info!(
            "Deleted question group {} from survey {} ({} row(s), {} question(s))",
            gid,
            sid,
            deleted,
            question_ids.len()
        );
        Ok(Some(deleted))
    }

    pub async fn get_group_description(&self, gid: i32, language: &str) -> GroupResult<String> {
        let group = question_groups::Entity::find_by_id((gid, language.to_string()))
            .one(&self.db)
            .await?
            .ok_or_else(|| GroupError::GroupNotFound {
                gid,
                language: language.to_string(),
            })?;
        Ok(group.description.unwrap_or_default())
    }

    /// The survey's group with the highest gid, i.e. the most recently created
    pub async fn get_first_group(&self, sid: i32) -> GroupResult<Option<question_groups::Model>> {
        let group = question_groups::Entity::find()
            .filter(question_groups::Column::Sid.eq(sid))
            .order_by_desc(question_groups::Column::Gid)
            .one(&self.db)
            .await?;
        Ok(group)
    }

    pub async fn total_groups_without_questions(&self, sid: i32) -> GroupResult<u64> {
        self.count_groups(sid, false).await
    }

    pub async fn total_groups_with_questions(&self, sid: i32) -> GroupResult<u64> {
        self.count_groups(sid, true).await
    }

    /// Questions match on gid alone, so a group counts as having questions
    /// when any of its languages does.
    async fn count_groups(&self, sid: i32, with_questions: bool) -> GroupResult<u64> {
        let question_filter = if with_questions {
            questions::Column::Qid.is_not_null()
        } else {
            questions::Column::Qid.is_null()
        };

        let gids: Vec<i32> = question_groups::Entity::find()
            .select_only()
            .column(question_groups::Column::Gid)
            .distinct()
            .join(
                JoinType::LeftJoin,
                question_groups::Entity::belongs_to(questions::Entity)
                    .from(question_groups::Column::Gid)
                    .to(questions::Column::Gid)
                    .into(),
            )
            .filter(question_groups::Column::Sid.eq(sid))
            .filter(question_filter)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(gids.len() as u64)
    }

    pub async fn survey_of(&self, group: &question_groups::Model) -> GroupResult<surveys::Model> {
        find_survey(&self.db, group.sid).await
    }

    /// Top-level questions of the group in the group's language
    pub async fn questions_of(
        &self,
        group: &question_groups::Model,
    ) -> GroupResult<Vec<questions::Model>> {
        let questions = questions::Entity::find()
            .filter(questions::Column::Gid.eq(group.gid))
            .filter(questions::Column::Language.eq(group.language.as_str()))
            .filter(questions::Column::ParentQid.eq(0))
            .order_by_asc(questions::Column::QuestionOrder)
            .all(&self.db)
            .await?;
        Ok(questions)
    }

    /// One page of the admin group list. The page size comes from the
    /// session when the user picked one, otherwise from the service default.
    pub async fn search(
        &self,
        criteria: &GroupSearch,
        sort: GroupSort,
        page: u64,
        session: &AdminSession,
    ) -> GroupResult<GroupPage> {
        let page_size = session.page_size().unwrap_or(self.default_page_size);

        let mut query = question_groups::Entity::find()
            .filter(question_groups::Column::Sid.eq(criteria.sid))
            .filter(question_groups::Column::Language.eq(criteria.language.as_str()));

        if let Some(name) = criteria
            .group_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
        {
            query = query.filter(
                Expr::col((question_groups::Entity, question_groups::Column::GroupName))
                    .like(LikeExpr::new(format!("%{}%", escape_like(name))).escape('\\')),
            );
        }

        let direction = if sort.descending { Order::Desc } else { Order::Asc };
        query = query
            .order_by(sort.attribute.column(), direction)
            .order_by_asc(question_groups::Column::Gid);

        let paginator = query.paginate(&self.db, page_size);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page).await?;

        Ok(GroupPage {
            items,
            total,
            page,
            page_size,
        })
    }
}

async fn find_survey<C: ConnectionTrait>(conn: &C, sid: i32) -> GroupResult<surveys::Model> {
    surveys::Entity::find_by_id(sid)
        .one(conn)
        .await?
        .ok_or(GroupError::SurveyNotFound(sid))
}

/// Validate and insert one language row on `conn`
async fn insert_group<C: ConnectionTrait>(
    conn: &C,
    data: NewGroup,
) -> GroupResult<question_groups::Model> {
    let mut errors = FieldErrors::new();

    ValidationService::validate_language(&data.language, &mut errors);
    let group_name = ValidationService::validate_group_name(&data.group_name, &mut errors);
    let description = data
        .description
        .as_deref()
        .map(ValidationService::xss_filter);

    if let Some(gid) = data.gid {
        let taken = question_groups::Entity::find_by_id((gid, data.language.clone()))
            .one(conn)
            .await?
            .is_some();
        if taken {
            errors.add("gid", gid_in_use_message(gid));
        }
    }
    errors.into_result()?;

    let survey = find_survey(conn, data.sid).await?;
    if survey.is_active() {
        return Err(FieldErrors::single("gid", ACTIVE_SURVEY_INSERT_MESSAGE).into());
    }

    let gid = match data.gid {
        Some(gid) => gid,
        None => next_gid(conn).await?,
    };

    let group = question_groups::ActiveModel {
        gid: Set(gid),
        language: Set(data.language),
        sid: Set(data.sid),
        group_name: Set(group_name),
        group_order: Set(data.group_order),
        description: Set(description),
        randomization_group: Set(data.randomization_group),
        grelevance: Set(data.grelevance),
    };

    group.insert(conn).await.map_err(|err| {
        if DbErrorKind::from_db_err(&err) == DbErrorKind::UniqueViolation {
            FieldErrors::single("gid", gid_in_use_message(gid)).into()
        } else {
            GroupError::Database(err)
        }
    })
}

/// Make `%` and `_` in user input match literally
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn gid_in_use_message(gid: i32) -> String {
    format!("Gid \"{}\" is already in use.", gid)
}

async fn next_gid<C: ConnectionTrait>(conn: &C) -> GroupResult<i32> {
    let last = question_groups::Entity::find()
        .order_by_desc(question_groups::Column::Gid)
        .one(conn)
        .await?;
    match last {
        Some(group) => group
            .gid
            .checked_add(1)
            .ok_or_else(|| FieldErrors::single("gid", GID_EXHAUSTED_MESSAGE).into()),
        None => Ok(1),
    }
}

/// Top-level question ids of a group of survey `sid`, across languages
async fn question_ids_in_group<C: ConnectionTrait>(
    conn: &C,
    sid: i32,
    gid: i32,
) -> GroupResult<Vec<i32>> {
    let qids = questions::Entity::find()
        .select_only()
        .column(questions::Column::Qid)
        .distinct()
        .filter(questions::Column::Sid.eq(sid))
        .filter(questions::Column::Gid.eq(gid))
        .filter(questions::Column::ParentQid.eq(0))
        .into_tuple()
        .all(conn)
        .await?;
    Ok(qids)
}

/// Remove questions, their subquestions and every condition that refers to
/// any of them.
async fn delete_questions<C: ConnectionTrait>(
    conn: &C,
    sid: i32,
    question_ids: &[i32],
) -> GroupResult<()> {
    if question_ids.is_empty() {
        return Ok(());
    }

    let subquestion_ids: Vec<i32> = questions::Entity::find()
        .select_only()
        .column(questions::Column::Qid)
        .distinct()
        .filter(questions::Column::Sid.eq(sid))
        .filter(questions::Column::ParentQid.is_in(question_ids.to_vec()))
        .into_tuple()
        .all(conn)
        .await?;

    let all_ids: Vec<i32> = question_ids
        .iter()
        .copied()
        .chain(subquestion_ids)
        .collect();

    conditions::Entity::delete_many()
        .filter(
            Condition::any()
                .add(conditions::Column::Qid.is_in(all_ids.clone()))
                .add(conditions::Column::Cqid.is_in(all_ids.clone())),
        )
        .exec(conn)
        .await?;

    questions::Entity::delete_many()
        .filter(questions::Column::Sid.eq(sid))
        .filter(questions::Column::Qid.is_in(all_ids))
        .exec(conn)
        .await?;

    Ok(())
}
