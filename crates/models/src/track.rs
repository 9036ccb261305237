use sea_orm::{entity::prelude::*, Set, DatabaseConnection, ActiveModelTrait, EntityTrait};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{errors, like, user};

pub const TITLE_MAX_CHARS: usize = 70;
pub const URL_MAX_CHARS: usize = 200;
const URL_SCHEMES: [&str; 4] = ["http", "https", "ftp", "ftps"];

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "track")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub url: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub posted_by: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    PostedBy,
    Like,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::PostedBy => Entity::belongs_to(user::Entity)
                .from(Column::PostedBy)
                .to(user::Column::Id)
                .into(),
            Relation::Like => Entity::has_many(like::Entity).into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::PostedBy.def() }
}

impl Related<like::Entity> for Entity {
    fn to() -> RelationDef { Relation::Like.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_title(title: &str) -> Result<(), errors::ModelError> {
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(errors::ModelError::Validation(format!("title too long (<={TITLE_MAX_CHARS})")));
    }
    Ok(())
}

pub fn validate_url(raw: &str) -> Result<(), errors::ModelError> {
    if raw.trim().is_empty() {
        return Err(errors::ModelError::Validation("url required".into()));
    }
    if raw.chars().count() > URL_MAX_CHARS {
        return Err(errors::ModelError::Validation(format!("url too long (<={URL_MAX_CHARS})")));
    }
    let parsed = url::Url::parse(raw).map_err(|e| errors::ModelError::Validation(format!("invalid url: {e}")))?;
    if !URL_SCHEMES.contains(&parsed.scheme()) {
        return Err(errors::ModelError::Validation("url scheme must be http(s) or ftp(s)".into()));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(errors::ModelError::Validation("url must include a host".into()));
    }
    Ok(())
}

pub fn validate(title: &str, url: &str) -> Result<(), errors::ModelError> {
    validate_title(title)?;
    validate_url(url)
}

pub async fn create(
    db: &DatabaseConnection,
    title: &str,
    description: &str,
    url: &str,
    posted_by: Option<Uuid>,
) -> Result<Model, errors::ModelError> {
    validate(title, url)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        title: Set(title.to_string()),
        description: Set(description.to_string()),
        url: Set(url.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        posted_by: Set(posted_by),
        ..Default::default()
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Overwrite title, description and url; `created_at` and `posted_by` are left alone.
pub async fn update_content(
    db: &DatabaseConnection,
    id: i32,
    title: &str,
    description: &str,
    url: &str,
) -> Result<Model, errors::ModelError> {
    validate(title, url)?;
    let mut found: ActiveModel = Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| errors::ModelError::NotFound(format!("track {id}")))?
        .into();
    found.title = Set(title.to_string());
    found.description = Set(description.to_string());
    found.url = Set(url.to_string());
    found.updated_at = Set(Utc::now().into());
    found.update(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}
