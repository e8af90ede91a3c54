use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::activity::Activity;

pub const FEED_LIMIT: usize = 10;

#[derive(Debug, Serialize)]
pub struct FeedItem {
    pub id: Uuid,
    pub action: String,
    pub actor: String,
    pub time: String,
    pub created_at: DateTime<Utc>,
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}

/// Relative time as shown in the activity feed.
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    match elapsed.num_minutes() {
        m if m < 1 => "Just now".to_string(),
        m if m < 60 => plural(m, "minute"),
        _ if elapsed.num_hours() < 24 => plural(elapsed.num_hours(), "hour"),
        _ => plural(elapsed.num_days(), "day"),
    }
}

pub fn to_feed(activities: Vec<Activity>, now: DateTime<Utc>) -> Vec<FeedItem> {
    activities
        .into_iter()
        .map(|a| FeedItem {
            id: a.id,
            time: time_ago(a.created_at, now),
            action: a.action,
            actor: a.actor,
            created_at: a.created_at,
        })
        .collect()
}
