//! Caller identity as handed over by the external identity provider.
//!
//! The value is built once per request at the transport edge and passed
//! explicitly into every service call.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tracks::domain::Track;

/// A known user (business view)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Caller {
    #[default]
    Anonymous,
    User(UserRef),
}

impl Caller {
    pub fn user(&self) -> Option<&UserRef> {
        match self {
            Caller::Anonymous => None,
            Caller::User(u) => Some(u),
        }
    }

    pub fn is_anonymous(&self) -> bool { matches!(self, Caller::Anonymous) }

    /// True only for an authenticated caller who is the track's `posted_by`.
    /// Ownerless tracks are owned by nobody.
    pub fn owns(&self, track: &Track) -> bool {
        match (self.user(), &track.posted_by) {
            (Some(me), Some(owner)) => me.id == owner.id,
            _ => false,
        }
    }
}

impl From<UserRef> for Caller {
    fn from(u: UserRef) -> Self { Caller::User(u) }
}
