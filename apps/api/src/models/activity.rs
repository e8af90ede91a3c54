use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One line of a user's dashboard feed. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Activity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub action: String,
    pub actor: String,
    pub created_at: DateTime<Utc>,
}

impl Activity {
    /// An entry performed by the feed owner themselves.
    pub fn own(user_id: Uuid, action: impl Into<String>) -> Self {
        Self::by(user_id, "You", action)
    }

    pub fn by(user_id: Uuid, actor: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            action: action.into(),
            actor: actor.into(),
            created_at: Utc::now(),
        }
    }
}
