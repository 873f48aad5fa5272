//! Like and bookmark toggles.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::{EngagementCommand, EngagementRepository, PostRepository};
use crate::domain::store_errors::{map_engagement_error, map_post_error};
use crate::domain::{EngagementKind, Error, PostId, ToggleOutcome, UserId};

/// Implements [`EngagementCommand`] over the engagement ledger.
///
/// The ledger performs the flip atomically; this service only checks that
/// the post exists and supplies the timestamp for new edges.
pub struct EngagementService<P, E> {
    posts: Arc<P>,
    ledger: Arc<E>,
    clock: Arc<dyn Clock>,
}

impl<P, E> Clone for EngagementService<P, E> {
    fn clone(&self) -> Self {
        Self {
            posts: Arc::clone(&self.posts),
            ledger: Arc::clone(&self.ledger),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<P, E> EngagementService<P, E> {
    pub fn new(posts: Arc<P>, ledger: Arc<E>, clock: Arc<dyn Clock>) -> Self {
        Self {
            posts,
            ledger,
            clock,
        }
    }
}

#[async_trait]
impl<P, E> EngagementCommand for EngagementService<P, E>
where
    P: PostRepository,
    E: EngagementRepository,
{
    async fn toggle(
        &self,
        kind: EngagementKind,
        user: &UserId,
        post_id: PostId,
    ) -> Result<ToggleOutcome, Error> {
        self.posts
            .find_by_id(post_id)
            .await
            .map_err(map_post_error)?
            .ok_or_else(|| Error::not_found(format!("post {post_id} not found")))?;

        let outcome = self
            .ledger
            .toggle(kind, user, post_id, self.clock.utc())
            .await
            .map_err(map_engagement_error)?;
        debug!(
            kind = %kind,
            post_id = %post_id,
            user_id = %user,
            active = outcome.active,
            count = outcome.count,
            "engagement toggled"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    //! Toggle orchestration over mocked stores.
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{
        EngagementRepositoryError, MockEngagementRepository, MockPostRepository,
    };
    use crate::domain::test_fixtures::{at_minute, fixture_clock, post, user};

    fn service(
        posts: MockPostRepository,
        ledger: MockEngagementRepository,
    ) -> EngagementService<MockPostRepository, MockEngagementRepository> {
        EngagementService::new(Arc::new(posts), Arc::new(ledger), fixture_clock(12))
    }

    #[rstest]
    #[case(EngagementKind::Like)]
    #[case(EngagementKind::Bookmark)]
    #[tokio::test]
    async fn forwards_kind_and_clock_to_ledger(#[case] kind: EngagementKind) {
        let alice = user("alice");
        let target = post(1, &alice, "hi", 0);

        let mut posts = MockPostRepository::new();
        posts
            .expect_find_by_id()
            .returning(move |_| Ok(Some(target.clone())));
        let mut ledger = MockEngagementRepository::new();
        ledger
            .expect_toggle()
            .times(1)
            .withf(move |k, _, post, at| *k == kind && *post == PostId::new(1) && *at == at_minute(12))
            .returning(|_, _, _, _| Ok(ToggleOutcome::new(true, 1)));

        let outcome = service(posts, ledger)
            .toggle(kind, alice.id(), PostId::new(1))
            .await
            .expect("toggle succeeds");

        assert_eq!(outcome, ToggleOutcome::new(true, 1));
    }

    #[rstest]
    #[tokio::test]
    async fn missing_post_is_not_found() {
        let mut posts = MockPostRepository::new();
        posts.expect_find_by_id().returning(|_| Ok(None));
        let mut ledger = MockEngagementRepository::new();
        ledger.expect_toggle().never();

        let err = service(posts, ledger)
            .toggle(EngagementKind::Like, &UserId::random(), PostId::new(5))
            .await
            .expect_err("unknown post fails");

        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn post_deleted_mid_toggle_is_not_found() {
        let alice = user("alice");
        let target = post(1, &alice, "hi", 0);

        let mut posts = MockPostRepository::new();
        posts
            .expect_find_by_id()
            .returning(move |_| Ok(Some(target.clone())));
        let mut ledger = MockEngagementRepository::new();
        ledger
            .expect_toggle()
            .returning(|_, _, _, _| Err(EngagementRepositoryError::missing_post(1_i64)));

        let err = service(posts, ledger)
            .toggle(EngagementKind::Bookmark, alice.id(), PostId::new(1))
            .await
            .expect_err("race surfaces as not found");

        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
