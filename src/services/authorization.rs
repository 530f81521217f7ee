use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, TryIntoModel,
};
use std::fmt;
use tracing::debug;

use crate::database::entities::{permissions, surveys};
use crate::errors::{CoreError, CoreResult};

pub const SURVEY_ENTITY: &str = "survey";
pub const GLOBAL_ENTITY: &str = "global";
pub const SUPERADMIN_PERMISSION: &str = "superadmin";

/// The individual rights a permission row can grant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crud {
    Create,
    Read,
    Update,
    Delete,
    Import,
    Export,
}

impl Crud {
    pub fn from_str(s: &str) -> CoreResult<Self> {
        match s.to_lowercase().as_str() {
            "create" => Ok(Crud::Create),
            "read" => Ok(Crud::Read),
            "update" => Ok(Crud::Update),
            "delete" => Ok(Crud::Delete),
            "import" => Ok(Crud::Import),
            "export" => Ok(Crud::Export),
            _ => Err(CoreError::validation(format!("Invalid permission right: {}", s))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Crud::Create => "create",
            Crud::Read => "read",
            Crud::Update => "update",
            Crud::Delete => "delete",
            Crud::Import => "import",
            Crud::Export => "export",
        }
    }

    fn granted_by(&self, row: &permissions::Model) -> bool {
        match self {
            Crud::Create => row.create_p,
            Crud::Read => row.read_p,
            Crud::Update => row.update_p,
            Crud::Delete => row.delete_p,
            Crud::Import => row.import_p,
            Crud::Export => row.export_p,
        }
    }
}

impl fmt::Display for Crud {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Survey-level permission checks
#[derive(Clone, Debug)]
pub struct PermissionService {
    db: DatabaseConnection,
}

impl PermissionService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Whether `uid` holds `permission`/`crud` on survey `sid`.
    ///
    /// The survey owner and global superadmins pass every check; a missing
    /// survey grants nothing.
    pub async fn has_survey_permission(
        &self,
        sid: i32,
        permission: &str,
        crud: Crud,
        uid: i32,
    ) -> CoreResult<bool> {
        let survey = surveys::Entity::find_by_id(sid).one(&self.db).await?;
        let Some(survey) = survey else {
            debug!("Permission check on unknown survey {}", sid);
            return Ok(false);
        };

        if survey.owner_id == uid || self.is_superadmin(uid).await? {
            return Ok(true);
        }

        let row = self
            .find_permission(SURVEY_ENTITY, sid, uid, permission)
            .await?;

        let granted = row.map(|row| crud.granted_by(&row)).unwrap_or(false);
        debug!(
            "Permission {}/{} on survey {} for user {}: {}",
            permission, crud, sid, uid, granted
        );
        Ok(granted)
    }

    pub async fn is_superadmin(&self, uid: i32) -> CoreResult<bool> {
        let row = self
            .find_permission(GLOBAL_ENTITY, 0, uid, SUPERADMIN_PERMISSION)
            .await?;
        Ok(row.map(|row| row.read_p).unwrap_or(false))
    }

    /// Create or replace the rights `uid` holds for `permission` on survey `sid`.
    pub async fn set_survey_permission(
        &self,
        sid: i32,
        uid: i32,
        permission: &str,
        rights: &[Crud],
    ) -> CoreResult<permissions::Model> {
        self.set_permission(SURVEY_ENTITY, sid, uid, permission, rights)
            .await
    }

    pub async fn grant_superadmin(&self, uid: i32) -> CoreResult<permissions::Model> {
        self.set_permission(GLOBAL_ENTITY, 0, uid, SUPERADMIN_PERMISSION, &[Crud::Read])
            .await
    }

    async fn set_permission(
        &self,
        entity: &str,
        entity_id: i32,
        uid: i32,
        permission: &str,
        rights: &[Crud],
    ) -> CoreResult<permissions::Model> {
        if permission.trim().is_empty() {
            return Err(CoreError::validation("Permission name cannot be empty"));
        }

        let has = |crud: Crud| rights.contains(&crud);
        let existing = self
            .find_permission(entity, entity_id, uid, permission)
            .await?;

        let mut active: permissions::ActiveModel = match existing {
            Some(row) => row.into(),
            None => permissions::ActiveModel {
                entity: Set(entity.to_string()),
                entity_id: Set(entity_id),
                uid: Set(uid),
                permission: Set(permission.to_string()),
                ..Default::default()
            },
        };
        active.create_p = Set(has(Crud::Create));
        active.read_p = Set(has(Crud::Read));
        active.update_p = Set(has(Crud::Update));
        active.delete_p = Set(has(Crud::Delete));
        active.import_p = Set(has(Crud::Import));
        active.export_p = Set(has(Crud::Export));

        Ok(active.save(&self.db).await?.try_into_model()?)
    }

    async fn find_permission(
        &self,
        entity: &str,
        entity_id: i32,
        uid: i32,
        permission: &str,
    ) -> CoreResult<Option<permissions::Model>> {
        let row = permissions::Entity::find()
            .filter(permissions::Column::Entity.eq(entity))
            .filter(permissions::Column::EntityId.eq(entity_id))
            .filter(permissions::Column::Uid.eq(uid))
            .filter(permissions::Column::Permission.eq(permission))
            .one(&self.db)
            .await?;
        Ok(row)
    }
}
