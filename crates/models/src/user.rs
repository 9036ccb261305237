use sea_orm::{entity::prelude::*, sea_query::OnConflict, Set, DatabaseConnection};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{errors, like, track};

/// Local mirror of an identity owned by the external identity provider.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Last username seen in the caller's token; not unique locally.
    pub username: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Track,
    Like,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Track => Entity::has_many(track::Entity).into(),
            Relation::Like => Entity::has_many(like::Entity).into(),
        }
    }
}

impl Related<track::Entity> for Entity {
    fn to() -> RelationDef { Relation::Track.def() }
}

impl Related<like::Entity> for Entity {
    fn to() -> RelationDef { Relation::Like.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_username(username: &str) -> Result<(), errors::ModelError> {
    let trimmed = username.trim();
    if trimmed.is_empty() { return Err(errors::ModelError::Validation("username required".into())); }
    if trimmed.chars().count() > 150 { return Err(errors::ModelError::Validation("username too long (<=150)".into())); }
    Ok(())
}

pub async fn create(db: &DatabaseConnection, id: Uuid, username: &str) -> Result<Model, errors::ModelError> {
    validate_username(username)?;
    let am = ActiveModel {
        id: Set(id),
        username: Set(username.trim().to_string()),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Mirror the caller into the local table. The identity provider owns
/// usernames, so an existing row takes the name from the latest token.
pub async fn ensure(db: &DatabaseConnection, id: Uuid, username: &str) -> Result<Model, errors::ModelError> {
    validate_username(username)?;
    let name = username.trim();
    if let Some(found) = Entity::find_by_id(id).one(db).await? {
        if found.username == name {
            return Ok(found);
        }
    }
    // upsert: first sight inserts, a rename overwrites, concurrent first sights converge
    let am = ActiveModel {
        id: Set(id),
        username: Set(name.to_string()),
        created_at: Set(Utc::now().into()),
    };
    Entity::insert(am)
        .on_conflict(OnConflict::column(Column::Id).update_column(Column::Username).to_owned())
        .exec_without_returning(db)
        .await?;
    Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| errors::ModelError::NotFound(format!("user {id}")))
}
