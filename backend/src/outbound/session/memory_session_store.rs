//! Process-local `SessionStore` with clock-driven expiry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::ports::{SessionStore, SessionStoreError};
use crate::domain::{SessionToken, UserId};

struct Entry {
    user: UserId,
    expires_at: DateTime<Utc>,
}

/// Keeps sessions in a map; expired entries are dropped on read.
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<SessionToken, Entry>>,
    clock: Arc<dyn Clock>,
}

impl InMemorySessionStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<SessionToken, Entry>>, SessionStoreError> {
        self.sessions
            .lock()
            .map_err(|_| SessionStoreError::query("session map lock poisoned"))
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn put(
        &self,
        token: &SessionToken,
        user: &UserId,
        ttl: Duration,
    ) -> Result<(), SessionStoreError> {
        let ttl = TimeDelta::from_std(ttl)
            .map_err(|err| SessionStoreError::query(format!("session ttl out of range: {err}")))?;
        let now = self.clock.utc();
        let mut sessions = self.lock()?;
        sessions.retain(|_, entry| entry.expires_at > now);
        sessions.insert(
            token.clone(),
            Entry {
                user: user.clone(),
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    async fn get(&self, token: &SessionToken) -> Result<Option<UserId>, SessionStoreError> {
        let now = self.clock.utc();
        let mut sessions = self.lock()?;
        match sessions.get(token) {
            Some(entry) if entry.expires_at > now => Ok(Some(entry.user.clone())),
            Some(_) => {
                sessions.remove(token);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn remove(&self, token: &SessionToken) -> Result<(), SessionStoreError> {
        self.lock()?.remove(token);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Expiry behaviour against a controllable clock.
    use chrono::{Local, TimeZone};
    use rstest::{fixture, rstest};

    use super::*;

    struct MutableClock(Mutex<DateTime<Utc>>);

    impl MutableClock {
        fn advance(&self, delta: TimeDelta) {
            if let Ok(mut now) = self.0.lock() {
                *now += delta;
            }
        }
    }

    impl Clock for MutableClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            *self.0.lock().expect("clock lock")
        }
    }

    #[fixture]
    fn clock() -> Arc<MutableClock> {
        let start = Utc
            .with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp");
        Arc::new(MutableClock(Mutex::new(start)))
    }

    const DAY: Duration = Duration::from_secs(86_400);

    #[rstest]
    #[tokio::test]
    async fn session_resolves_until_ttl_elapses(clock: Arc<MutableClock>) {
        let store = InMemorySessionStore::new(clock.clone());
        let token = SessionToken::generate();
        let user = UserId::random();
        store.put(&token, &user, DAY).await.expect("put");

        clock.advance(TimeDelta::hours(23));
        assert_eq!(store.get(&token).await.expect("get"), Some(user));

        clock.advance(TimeDelta::hours(1));
        assert_eq!(store.get(&token).await.expect("get"), None);
    }

    #[rstest]
    #[tokio::test]
    async fn remove_is_idempotent(clock: Arc<MutableClock>) {
        let store = InMemorySessionStore::new(clock);
        let token = SessionToken::generate();
        store.put(&token, &UserId::random(), DAY).await.expect("put");

        store.remove(&token).await.expect("first remove");
        store.remove(&token).await.expect("second remove");
        assert_eq!(store.get(&token).await.expect("get"), None);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_token_is_absent(clock: Arc<MutableClock>) {
        let store = InMemorySessionStore::new(clock);
        assert_eq!(
            store.get(&SessionToken::generate()).await.expect("get"),
            None
        );
    }
}
