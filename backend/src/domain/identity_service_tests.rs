//! Tests for registration, login, and session resolution.

use rstest::rstest;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{
    MockCredentialHasher, MockSessionStore, MockUserRepository, SessionStoreError,
    UserPersistenceError,
};
use crate::domain::test_fixtures::{at_minute, fixture_clock, user};

type Service = IdentityService<MockUserRepository, MockSessionStore, MockCredentialHasher>;

fn service(
    users: MockUserRepository,
    sessions: MockSessionStore,
    hasher: MockCredentialHasher,
) -> Service {
    IdentityService::new(
        Arc::new(users),
        Arc::new(sessions),
        Arc::new(hasher),
        fixture_clock(5),
    )
}

fn credentials(password: &str) -> LoginCredentials {
    LoginCredentials::try_from_parts("Ada@Example.com", password).expect("credentials shape")
}

#[rstest]
#[tokio::test]
async fn register_stores_hashed_password_with_clock_timestamps() {
    let mut hasher = MockCredentialHasher::new();
    hasher
        .expect_hash()
        .times(1)
        .withf(|password| password == "correct_horse")
        .returning(|_| Ok(PasswordDigest::new("$argon2id$fixture")));
    let mut users = MockUserRepository::new();
    users
        .expect_insert()
        .times(1)
        .withf(|user, digest| {
            user.username().as_ref() == "ada"
                && user.email().as_ref() == "ada@example.com"
                && digest.as_str() == "$argon2id$fixture"
        })
        .returning(|_, _| Ok(()));

    let registration =
        Registration::try_from_parts("ada", "Ada@Example.com", "correct_horse").expect("valid");

    let user = service(users, MockSessionStore::new(), hasher)
        .register(registration)
        .await
        .expect("registration succeeds");

    assert_eq!(user.created_at(), at_minute(5));
    assert_eq!(user.updated_at(), at_minute(5));
    assert!(user.bio().is_empty());
}

#[rstest]
#[tokio::test]
async fn duplicate_username_is_conflict() {
    let mut hasher = MockCredentialHasher::new();
    hasher
        .expect_hash()
        .returning(|_| Ok(PasswordDigest::new("digest")));
    let mut users = MockUserRepository::new();
    users
        .expect_insert()
        .returning(|_, _| Err(UserPersistenceError::duplicate_username("ada")));

    let registration =
        Registration::try_from_parts("ada", "ada@example.com", "password1").expect("valid");
    let err = service(users, MockSessionStore::new(), hasher)
        .register(registration)
        .await
        .expect_err("duplicate fails");

    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn login_opens_session_for_a_day() {
    let ada = user("ada");
    let mut users = MockUserRepository::new();
    let stored = ada.clone();
    users
        .expect_find_credentials()
        .times(1)
        .withf(|email| email == "ada@example.com")
        .returning(move |_| Ok(Some((stored.clone(), PasswordDigest::new("digest")))));
    let mut hasher = MockCredentialHasher::new();
    hasher.expect_verify().returning(|_, _| Ok(true));
    let mut sessions = MockSessionStore::new();
    let expected_user = ada.id().clone();
    sessions
        .expect_put()
        .times(1)
        .withf(move |_, user, ttl| *user == expected_user && *ttl == SESSION_TTL)
        .returning(|_, _, _| Ok(()));

    let outcome = service(users, sessions, hasher)
        .login(&credentials("password1"))
        .await
        .expect("login succeeds");

    assert_eq!(outcome.user.id(), ada.id());
    assert!(!outcome.token.as_str().is_empty());
    assert_eq!(SESSION_TTL.as_secs(), 86_400);
}

#[rstest]
#[tokio::test]
async fn unknown_email_still_runs_one_verification_per_attempt() {
    let mut users = MockUserRepository::new();
    users.expect_find_credentials().times(2).returning(|_| Ok(None));
    let mut hasher = MockCredentialHasher::new();
    hasher
        .expect_hash()
        .times(1)
        .returning(|_| Ok(PasswordDigest::new("decoy")));
    hasher
        .expect_verify()
        .times(2)
        .withf(|password, digest| password == "password1" && digest.as_str() == "decoy")
        .returning(|_, _| Ok(true));
    let mut sessions = MockSessionStore::new();
    sessions.expect_put().never();
    let service = service(users, sessions, hasher);

    for _ in 0..2 {
        let err = service
            .login(&credentials("password1"))
            .await
            .expect_err("unknown email fails even when the decoy matches");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }
}

#[rstest]
#[tokio::test]
async fn unknown_email_and_wrong_password_fail_identically() {
    let mut users = MockUserRepository::new();
    users.expect_find_credentials().returning(|_| Ok(None));
    let mut hasher = MockCredentialHasher::new();
    hasher
        .expect_hash()
        .returning(|_| Ok(PasswordDigest::new("decoy")));
    hasher.expect_verify().returning(|_, _| Ok(false));
    let unknown = service(users, MockSessionStore::new(), hasher)
        .login(&credentials("password1"))
        .await
        .expect_err("unknown email fails");

    let ada = user("ada");
    let mut users = MockUserRepository::new();
    users
        .expect_find_credentials()
        .returning(move |_| Ok(Some((ada.clone(), PasswordDigest::new("digest")))));
    let mut hasher = MockCredentialHasher::new();
    hasher.expect_verify().returning(|_, _| Ok(false));
    let mut sessions = MockSessionStore::new();
    sessions.expect_put().never();
    let wrong = service(users, sessions, hasher)
        .login(&credentials("nope-nope"))
        .await
        .expect_err("wrong password fails");

    assert_eq!(unknown.code(), ErrorCode::Unauthorized);
    assert_eq!(wrong.code(), ErrorCode::Unauthorized);
    assert_eq!(unknown.message(), wrong.message());
}

#[rstest]
#[tokio::test]
async fn authenticate_resolves_known_token() {
    let ada = user("ada");
    let mut sessions = MockSessionStore::new();
    let id = ada.id().clone();
    sessions
        .expect_get()
        .returning(move |_| Ok(Some(id.clone())));

    let resolved = service(MockUserRepository::new(), sessions, MockCredentialHasher::new())
        .authenticate(&SessionToken::generate())
        .await
        .expect("token resolves");

    assert_eq!(&resolved, ada.id());
}

#[rstest]
#[tokio::test]
async fn authenticate_rejects_unknown_token() {
    let mut sessions = MockSessionStore::new();
    sessions.expect_get().returning(|_| Ok(None));

    let err = service(MockUserRepository::new(), sessions, MockCredentialHasher::new())
        .authenticate(&SessionToken::generate())
        .await
        .expect_err("unknown token fails");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn session_store_outage_is_service_unavailable() {
    let mut sessions = MockSessionStore::new();
    sessions
        .expect_get()
        .returning(|_| Err(SessionStoreError::connection("redis refused")));

    let err = service(MockUserRepository::new(), sessions, MockCredentialHasher::new())
        .authenticate(&SessionToken::generate())
        .await
        .expect_err("outage surfaces");

    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn logout_removes_token() {
    let token = SessionToken::generate();
    let mut sessions = MockSessionStore::new();
    let expected = token.clone();
    sessions
        .expect_remove()
        .times(1)
        .withf(move |t| *t == expected)
        .returning(|_| Ok(()));

    service(MockUserRepository::new(), sessions, MockCredentialHasher::new())
        .logout(&token)
        .await
        .expect("logout succeeds");
}

#[rstest]
#[tokio::test]
async fn profile_lookup_for_unknown_username_is_not_found() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_username().returning(|_| Ok(None));

    let err = service(users, MockSessionStore::new(), MockCredentialHasher::new())
        .by_username(&Username::new("nobody").expect("valid username"))
        .await
        .expect_err("unknown user fails");

    assert_eq!(err.code(), ErrorCode::NotFound);
}
