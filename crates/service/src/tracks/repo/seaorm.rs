use sea_orm::sea_query::{Expr, Func, IntoColumnRef, LikeExpr, SimpleExpr};
use sea_orm::{ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use models::{like, track, user};

use crate::errors::ServiceError;
use crate::identity::UserRef;
use crate::tracks::domain::{Like, LikeFilter, NewTrack, Track, TrackContent, TrackFilter};
use crate::tracks::repository::TrackRepository;

pub struct SeaOrmTrackRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmTrackRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn to_user(u: user::Model) -> UserRef {
    UserRef { id: u.id, username: u.username }
}

fn to_track(t: track::Model, owner: Option<user::Model>) -> Track {
    Track {
        id: t.id,
        title: t.title,
        description: t.description,
        url: t.url,
        created_at: t.created_at.with_timezone(&chrono::Utc),
        updated_at: t.updated_at.with_timezone(&chrono::Utc),
        posted_by: owner.map(to_user),
    }
}

fn to_like(l: like::Model, u: Option<user::Model>) -> Like {
    Like { id: l.id, user: u.map(to_user), track_id: l.track_id }
}

/// `%needle%` with LIKE metacharacters escaped, lowercased for `lower(col) LIKE`.
fn contains_pattern(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len() + 2);
    out.push('%');
    for ch in needle.to_lowercase().chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}

fn icontains<C: IntoColumnRef>(col: C, pattern: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(col))).like(LikeExpr::new(pattern).escape('\\'))
}

fn like_condition(filter: &LikeFilter) -> Condition {
    let mut cond = Condition::all();
    if let Some(uid) = filter.user_id {
        cond = cond.add(like::Column::UserId.eq(uid));
    }
    if let Some(tid) = filter.track_id {
        cond = cond.add(like::Column::TrackId.eq(tid));
    }
    cond
}

#[async_trait::async_trait]
impl TrackRepository for SeaOrmTrackRepository {
    async fn get_track(&self, id: i32) -> Result<Option<Track>, ServiceError> {
        let row = track::Entity::find_by_id(id)
            .find_also_related(user::Entity)
            .one(&self.db)
            .await?;
        Ok(row.map(|(t, u)| to_track(t, u)))
    }

    async fn filter_tracks(&self, filter: &TrackFilter) -> Result<Vec<Track>, ServiceError> {
        let mut query = track::Entity::find().find_also_related(user::Entity);
        if let TrackFilter::Search(needle) = filter {
            let pattern = contains_pattern(needle);
            query = query.filter(
                Condition::any()
                    .add(icontains((track::Entity, track::Column::Title), &pattern))
                    .add(icontains((track::Entity, track::Column::Description), &pattern))
                    .add(icontains((track::Entity, track::Column::Url), &pattern))
                    .add(icontains((user::Entity, user::Column::Username), &pattern)),
            );
        }
        let rows = query.order_by_asc(track::Column::Id).all(&self.db).await?;
        Ok(rows.into_iter().map(|(t, u)| to_track(t, u)).collect())
    }

    async fn insert_track(&self, new: NewTrack) -> Result<Track, ServiceError> {
        // The identity provider owns users; mirror the caller so the FK holds.
        let owner = match &new.posted_by {
            Some(u) => Some(user::ensure(&self.db, u.id, &u.username).await?.id),
            None => None,
        };
        let c = &new.content;
        let created = track::create(&self.db, &c.title, &c.description, &c.url, owner).await?;
        self.get_track(created.id).await?.ok_or_else(|| ServiceError::not_found("track"))
    }

    async fn update_track(&self, id: i32, content: TrackContent) -> Result<Track, ServiceError> {
        let updated = track::update_content(&self.db, id, &content.title, &content.description, &content.url).await?;
        self.get_track(updated.id).await?.ok_or_else(|| ServiceError::not_found("track"))
    }

    async fn delete_track(&self, id: i32) -> Result<bool, ServiceError> {
        // likes go with it through fk_like_track ON DELETE CASCADE
        let res = track::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }

    async fn filter_likes(&self, filter: &LikeFilter) -> Result<Vec<Like>, ServiceError> {
        let rows = like::Entity::find()
            .find_also_related(user::Entity)
            .filter(like_condition(filter))
            .order_by_asc(like::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(|(l, u)| to_like(l, u)).collect())
    }

    async fn insert_like(&self, who: &UserRef, track_id: i32) -> Result<Like, ServiceError> {
        user::ensure(&self.db, who.id, &who.username).await?;
        let created = like::create(&self.db, Some(who.id), track_id).await?;
        Ok(Like { id: created.id, user: Some(who.clone()), track_id: created.track_id })
    }

    async fn delete_likes(&self, filter: &LikeFilter) -> Result<u64, ServiceError> {
        if filter.is_unbounded() {
            return Err(ServiceError::Validation("refusing to delete every like".into()));
        }
        let res = like::Entity::delete_many().filter(like_condition(filter)).exec(&self.db).await?;
        Ok(res.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;
    use uuid::Uuid;

    #[test]
    fn pattern_escapes_like_metacharacters() {
        assert_eq!(contains_pattern("Jazz"), "%jazz%");
        assert_eq!(contains_pattern("100%_mix\\"), "%100\\%\\_mix\\\\%");
    }

    async fn db_or_skip() -> Option<DatabaseConnection> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return None; }
        match get_db().await {
            Ok(db) => Some(db),
            Err(e) => {
                eprintln!("skip: cannot connect to db: {}", e);
                None
            }
        }
    }

    fn content(title: &str, description: &str, url: &str) -> TrackContent {
        TrackContent { title: title.into(), description: description.into(), url: url.into() }
    }

    #[tokio::test]
    async fn seaorm_search_spans_owner_username() -> Result<(), anyhow::Error> {
        let Some(db) = db_or_skip().await else { return Ok(()) };
        let repo = SeaOrmTrackRepository::new(db.clone());

        let tag = Uuid::new_v4().simple().to_string();
        let owner = UserRef { id: Uuid::new_v4(), username: format!("DJ_{}", tag) };
        let by_owner = repo
            .insert_track(NewTrack { content: content("untitled", "", "http://x.test/1"), posted_by: Some(owner.clone()) })
            .await?;
        let by_title = repo
            .insert_track(NewTrack { content: content(&format!("Title {}", tag.to_uppercase()), "", "http://x.test/2"), posted_by: None })
            .await?;
        let unrelated = repo
            .insert_track(NewTrack { content: content("other", "", "http://x.test/3"), posted_by: None })
            .await?;

        let found = repo.filter_tracks(&TrackFilter::Search(tag.clone())).await?;
        let ids: Vec<i32> = found.iter().map(|t| t.id).collect();
        assert!(ids.contains(&by_owner.id));
        assert!(ids.contains(&by_title.id));
        assert!(!ids.contains(&unrelated.id));
        assert_eq!(found.iter().find(|t| t.id == by_owner.id).and_then(|t| t.posted_by.clone()), Some(owner.clone()));

        for id in [by_owner.id, by_title.id, unrelated.id] {
            repo.delete_track(id).await?;
        }
        user::Entity::delete_by_id(owner.id).exec(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn seaorm_owner_rename_and_shared_username() -> Result<(), anyhow::Error> {
        let Some(db) = db_or_skip().await else { return Ok(()) };
        let repo = SeaOrmTrackRepository::new(db.clone());

        let tag = Uuid::new_v4().simple().to_string();
        let first = UserRef { id: Uuid::new_v4(), username: format!("shared_{}", tag) };
        let second = UserRef { id: Uuid::new_v4(), username: first.username.clone() };

        let t1 = repo
            .insert_track(NewTrack { content: content("one", "", "http://x.test/1"), posted_by: Some(first.clone()) })
            .await?;
        // same username, different identity: both can post and like
        let t2 = repo
            .insert_track(NewTrack { content: content("two", "", "http://x.test/2"), posted_by: Some(second.clone()) })
            .await?;
        repo.insert_like(&second, t1.id).await?;

        let renamed = UserRef { id: second.id, username: format!("renamed_{}", tag) };
        repo.insert_like(&renamed, t2.id).await?;

        let hits = repo.filter_tracks(&TrackFilter::Search(renamed.username.clone())).await?;
        assert_eq!(hits.iter().map(|t| t.id).collect::<Vec<_>>(), vec![t2.id]);
        assert_eq!(hits[0].posted_by.as_ref(), Some(&renamed));

        let by_old = repo.filter_tracks(&TrackFilter::Search(first.username.clone())).await?;
        assert_eq!(by_old.iter().map(|t| t.id).collect::<Vec<_>>(), vec![t1.id]);

        for id in [t1.id, t2.id] {
            repo.delete_track(id).await?;
        }
        user::Entity::delete_by_id(first.id).exec(&db).await?;
        user::Entity::delete_by_id(second.id).exec(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn seaorm_like_lifecycle_and_cascade() -> Result<(), anyhow::Error> {
        let Some(db) = db_or_skip().await else { return Ok(()) };
        let repo = SeaOrmTrackRepository::new(db.clone());

        let owner = UserRef { id: Uuid::new_v4(), username: format!("owner_{}", Uuid::new_v4().simple()) };
        let fan = UserRef { id: Uuid::new_v4(), username: format!("fan_{}", Uuid::new_v4().simple()) };
        let t = repo
            .insert_track(NewTrack { content: content("Song A", "", "http://x.test/a"), posted_by: Some(owner.clone()) })
            .await?;

        repo.insert_like(&fan, t.id).await?;
        let pair = LikeFilter::pair(fan.id, t.id);
        assert_eq!(repo.filter_likes(&pair).await?.len(), 1);
        // unique index rejects the duplicate
        assert!(repo.insert_like(&fan, t.id).await.is_err());

        assert_eq!(repo.delete_likes(&pair).await?, 1);
        assert!(repo.filter_likes(&pair).await?.is_empty());

        repo.insert_like(&fan, t.id).await?;
        assert!(repo.delete_track(t.id).await?);
        assert!(repo.filter_likes(&LikeFilter::track(t.id)).await?.is_empty());
        assert!(!repo.delete_track(t.id).await?);

        user::Entity::delete_by_id(owner.id).exec(&db).await?;
        user::Entity::delete_by_id(fan.id).exec(&db).await?;
        Ok(())
    }
}
