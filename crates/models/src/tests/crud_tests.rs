use crate::db::connect;
use crate::{like, track, user};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use anyhow::Result;
use migration::MigratorTrait;
use uuid::Uuid;

/// Setup test database with migrations; `None` when no database is reachable.
async fn setup_test_db() -> Option<DatabaseConnection> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }
    let db = match connect().await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("skip: cannot connect to db: {}", e);
            return None;
        }
    };
    if let Err(e) = migration::Migrator::up(&db, None).await {
        eprintln!("skip: migrate up failed: {}", e);
        return None;
    }
    Some(db)
}

/// Test track create / update / delete
#[tokio::test]
async fn test_track_crud() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let owner = user::create(&db, Uuid::new_v4(), &format!("owner_{}", Uuid::new_v4().simple())).await?;
    let created = track::create(&db, "Song A", "first take", "http://x.test/a", Some(owner.id)).await?;
    assert_eq!(created.title, "Song A");
    assert_eq!(created.posted_by, Some(owner.id));
    assert_eq!(created.created_at, created.updated_at);

    let updated = track::update_content(&db, created.id, "Song A (remaster)", "", "https://x.test/a2").await?;
    assert_eq!(updated.title, "Song A (remaster)");
    assert_eq!(updated.description, "");
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);

    track::Entity::delete_by_id(created.id).exec(&db).await?;
    assert!(track::Entity::find_by_id(created.id).one(&db).await?.is_none());

    user::Entity::delete_by_id(owner.id).exec(&db).await?;
    Ok(())
}

/// Invalid input never reaches the database
#[tokio::test]
async fn test_track_validation_before_insert() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let err = track::create(&db, "t", "", "no-scheme", None).await;
    assert!(matches!(err, Err(crate::errors::ModelError::Validation(_))));

    let missing = track::update_content(&db, i32::MAX, "t", "", "http://x.test").await;
    assert!(matches!(missing, Err(crate::errors::ModelError::NotFound(_))));
    Ok(())
}

/// Deleting a track removes its likes via FK on_delete=CASCADE
#[tokio::test]
async fn test_like_cascade_on_track_delete() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let owner = user::create(&db, Uuid::new_v4(), &format!("owner_{}", Uuid::new_v4().simple())).await?;
    let fan = user::ensure(&db, Uuid::new_v4(), &format!("fan_{}", Uuid::new_v4().simple())).await?;
    let again = user::ensure(&db, fan.id, &fan.username).await?;
    assert_eq!(again, fan);

    let t = track::create(&db, "Cascade", "", "http://x.test/c", Some(owner.id)).await?;
    let l = like::create(&db, Some(fan.id), t.id).await?;

    // second like for the same pair violates uniq_like_user_track
    assert!(like::create(&db, Some(fan.id), t.id).await.is_err());

    track::Entity::delete_by_id(t.id).exec(&db).await?;
    assert!(like::Entity::find_by_id(l.id).one(&db).await?.is_none());
    let remaining = like::Entity::find().filter(like::Column::TrackId.eq(t.id)).all(&db).await?;
    assert!(remaining.is_empty());

    user::Entity::delete_by_id(owner.id).exec(&db).await?;
    user::Entity::delete_by_id(fan.id).exec(&db).await?;
    Ok(())
}

/// Usernames come from the identity provider: two ids may share one, and a
/// rename in a later token replaces the stored name.
#[tokio::test]
async fn test_user_mirror_follows_identity_provider() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let shared = format!("dj_{}", Uuid::new_v4().simple());
    let first = user::ensure(&db, Uuid::new_v4(), &shared).await?;
    let second = user::ensure(&db, Uuid::new_v4(), &shared).await?;
    assert_ne!(first.id, second.id);
    assert_eq!(second.username, shared);

    let t = track::create(&db, "Shared name", "", "http://x.test/s", Some(second.id)).await?;
    like::create(&db, Some(second.id), t.id).await?;

    let renamed = format!("{}_renamed", shared);
    let after = user::ensure(&db, second.id, &renamed).await?;
    assert_eq!(after.username, renamed);
    assert_eq!(after.created_at, second.created_at);
    let stored = user::Entity::find_by_id(second.id).one(&db).await?.expect("user row");
    assert_eq!(stored.username, renamed);
    // first user untouched
    assert_eq!(user::Entity::find_by_id(first.id).one(&db).await?.expect("user row").username, shared);

    track::Entity::delete_by_id(t.id).exec(&db).await?;
    user::Entity::delete_by_id(first.id).exec(&db).await?;
    user::Entity::delete_by_id(second.id).exec(&db).await?;
    Ok(())
}
