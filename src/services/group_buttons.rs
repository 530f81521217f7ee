use anyhow::{Context, Result};
use handlebars::Handlebars;
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;
use tracing::debug;

use crate::common::handlebars::get_handlebars;
use crate::common::urls::UrlBuilder;
use crate::database::entities::{question_groups, surveys};
use crate::errors::GroupError;
use crate::services::authorization::{Crud, PermissionService};
use crate::services::conditions::ConditionService;
use crate::services::session::AdminSession;

pub const SURVEY_CONTENT_PERMISSION: &str = "surveycontent";

const TEMPLATE_NAME: &str = "group_buttons";

const ADD_QUESTION_TITLE: &str = "Add new question to group";
const EDIT_GROUP_TITLE: &str = "Edit group";
const GROUP_SUMMARY_TITLE: &str = "Group summary";
const DELETE_TITLE: &str = "Delete";
const DELETE_CONFIRM_MESSAGE: &str = "Deleting this group will also delete any questions and answers it contains. Are you sure you want to continue?";
const DELETE_BLOCKED_MESSAGE: &str = "Impossible to delete this group because there is at least one question having a condition on its content";

const BUTTONS_TEMPLATE: &str = concat!(
    "{{#if add}}",
    r#"<a class="btn btn-default list-btn{{#if add.disabled}} disabled{{/if}}" data-toggle="tooltip" data-placement="left" title="{{add.title}}" href="{{add.url}}" role="button"><span class="fa fa-plus-sign"></span></a>"#,
    "{{/if}}",
    "{{#if edit}}",
    r#"<a class="btn btn-default list-btn" href="{{edit.url}}" role="button" data-toggle="tooltip" title="{{edit.title}}"><span class="fa fa-pencil"></span></a>"#,
    "{{/if}}",
    "{{#if summary}}",
    r#"<a class="btn btn-default list-btn" href="{{summary.url}}" role="button" data-toggle="tooltip" title="{{summary.title}}"><span class="fa fa-list-alt"></span></a>"#,
    "{{/if}}",
    "{{#if delete}}",
    r##"<a class="btn btn-default" data-toggle="tooltip" title="{{delete.title}}" href="#" role="button" onclick=""##,
    "{{#if delete.url}}",
    "if (confirm('{{js_string delete.message}}')) { window.open('{{js_string delete.url}}','_top'); };",
    "{{else}}",
    "alert('{{js_string delete.message}}'); return false;",
    "{{/if}}",
    r#""><span class="text-danger fa fa-trash"></span></a>"#,
    "{{/if}}",
);

#[derive(Debug, Serialize)]
struct LinkButton {
    title: &'static str,
    url: String,
    disabled: bool,
}

#[derive(Debug, Serialize)]
struct DeleteButton {
    title: &'static str,
    message: &'static str,
    /// Absent when other groups' conditions depend on this group
    url: Option<String>,
}

/// Every key is always present; the registry runs in strict mode.
#[derive(Debug, Serialize)]
struct ButtonContext {
    add: Option<LinkButton>,
    edit: Option<LinkButton>,
    summary: Option<LinkButton>,
    delete: Option<DeleteButton>,
}

/// Renders the action buttons shown on each row of the admin group list
pub struct GroupButtonRenderer {
    db: DatabaseConnection,
    permissions: PermissionService,
    conditions: ConditionService,
    urls: UrlBuilder,
    handlebars: Handlebars<'static>,
}

impl GroupButtonRenderer {
    pub fn new(db: DatabaseConnection, urls: UrlBuilder) -> Result<Self> {
        let mut handlebars = get_handlebars();
        handlebars
            .register_template_string(TEMPLATE_NAME, BUTTONS_TEMPLATE)
            .context("Failed to register group button template")?;

        Ok(Self {
            permissions: PermissionService::new(db.clone()),
            conditions: ConditionService::new(db.clone()),
            db,
            urls,
            handlebars,
        })
    }

    /// HTML for the buttons the session's user may use on `group`
    pub async fn render(
        &self,
        group: &question_groups::Model,
        session: &AdminSession,
    ) -> Result<String> {
        let sid = group.sid;
        let gid = group.gid;
        let uid = session.user_id();

        let survey = surveys::Entity::find_by_id(sid)
            .one(&self.db)
            .await?
            .ok_or(GroupError::SurveyNotFound(sid))?;

        let can_update = self.allowed(sid, Crud::Update, uid).await?;
        let can_read = self.allowed(sid, Crud::Read, uid).await?;

        let add = can_update.then(|| LinkButton {
            title: ADD_QUESTION_TITLE,
            url: self.urls.group_action("questions", "newquestion", sid, gid),
            disabled: survey.is_active(),
        });
        let edit = can_update.then(|| LinkButton {
            title: EDIT_GROUP_TITLE,
            url: self.urls.group_action("questiongroups", "edit", sid, gid),
            disabled: false,
        });
        let summary = can_read.then(|| LinkButton {
            title: GROUP_SUMMARY_TITLE,
            url: self.urls.group_action("questiongroups", "view", sid, gid),
            disabled: false,
        });

        // Only a fully activated survey hides the delete button
        let delete = if survey.active != "Y" && self.allowed(sid, Crud::Delete, uid).await? {
            let dependencies = self.conditions.group_dependencies(sid, gid).await?;
            if dependencies.is_empty() {
                Some(DeleteButton {
                    title: DELETE_TITLE,
                    message: DELETE_CONFIRM_MESSAGE,
                    url: Some(self.urls.group_action("questiongroups", "delete", sid, gid)),
                })
            } else {
                debug!(
                    "Group {} has {} dependent condition(s), delete blocked",
                    gid,
                    dependencies.len()
                );
                Some(DeleteButton {
                    title: DELETE_TITLE,
                    message: DELETE_BLOCKED_MESSAGE,
                    url: None,
                })
            }
        } else {
            None
        };

        let context = ButtonContext {
            add,
            edit,
            summary,
            delete,
        };

        self.handlebars
            .render(TEMPLATE_NAME, &context)
            .context("Failed to render group buttons")
    }

    async fn allowed(&self, sid: i32, crud: Crud, uid: i32) -> Result<bool> {
        Ok(self
            .permissions
            .has_survey_permission(sid, SURVEY_CONTENT_PERMISSION, crud, uid)
            .await?)
    }
}
