//! Builders shared by domain unit tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{Email, Post, PostId, User, UserDraft, UserId, Username};

pub(crate) fn at_minute(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, minute, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_clock(minute: u32) -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: at_minute(minute),
    })
}

pub(crate) fn user(name: &str) -> User {
    User::new(UserDraft {
        id: UserId::random(),
        username: Username::new(name).expect("fixture username"),
        email: Email::new(format!("{name}@example.com")).expect("fixture email"),
        bio: String::new(),
        created_at: at_minute(0),
        updated_at: at_minute(0),
    })
}

pub(crate) fn post(id: i64, author: &User, content: &str, minute: u32) -> Post {
    Post {
        id: PostId::new(id),
        author_id: author.id().clone(),
        content: content.to_owned(),
        parent_id: None,
        repost_id: None,
        created_at: at_minute(minute),
    }
}

pub(crate) fn repost(id: i64, author: &User, target: PostId, minute: u32) -> Post {
    Post {
        repost_id: Some(target),
        ..post(id, author, "", minute)
    }
}

pub(crate) fn reply(id: i64, author: &User, parent: PostId, content: &str, minute: u32) -> Post {
    Post {
        parent_id: Some(parent),
        ..post(id, author, content, minute)
    }
}
