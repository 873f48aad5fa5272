//! Translation of driven-port failures into domain errors.
//!
//! Connection failures surface as `service_unavailable`; everything else a
//! store reports unexpectedly becomes an opaque `internal` error. Neither is
//! retried.

use serde_json::json;
use tracing::warn;

use crate::domain::Error;
use crate::domain::ports::{
    CredentialHashError, EngagementRepositoryError, PostRepositoryError, SessionStoreError,
    UserPersistenceError,
};

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            warn!(%message, "user repository unavailable");
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            warn!(%message, "user repository query failed");
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateUsername { username } => {
            Error::conflict(format!("username {username} is already taken"))
                .with_details(json!({ "field": "username", "code": "duplicate_username" }))
        }
        UserPersistenceError::DuplicateEmail { .. } => {
            Error::conflict("email is already registered")
                .with_details(json!({ "field": "email", "code": "duplicate_email" }))
        }
    }
}

pub(crate) fn map_post_error(error: PostRepositoryError) -> Error {
    match error {
        PostRepositoryError::Connection { message } => {
            warn!(%message, "post repository unavailable");
            Error::service_unavailable(format!("post repository unavailable: {message}"))
        }
        PostRepositoryError::Query { message } => {
            warn!(%message, "post repository query failed");
            Error::internal(format!("post repository error: {message}"))
        }
        PostRepositoryError::MissingReference { message } => Error::not_found(message),
    }
}

pub(crate) fn map_engagement_error(error: EngagementRepositoryError) -> Error {
    match error {
        EngagementRepositoryError::Connection { message } => {
            warn!(%message, "engagement repository unavailable");
            Error::service_unavailable(format!("engagement repository unavailable: {message}"))
        }
        EngagementRepositoryError::Query { message } => {
            warn!(%message, "engagement repository query failed");
            Error::internal(format!("engagement repository error: {message}"))
        }
        EngagementRepositoryError::MissingPost { post_id } => {
            Error::not_found(format!("post {post_id} not found"))
        }
    }
}

pub(crate) fn map_session_error(error: SessionStoreError) -> Error {
    match error {
        SessionStoreError::Connection { message } => {
            warn!(%message, "session store unavailable");
            Error::service_unavailable(format!("session store unavailable: {message}"))
        }
        SessionStoreError::Query { message } => {
            warn!(%message, "session store command failed");
            Error::internal(format!("session store error: {message}"))
        }
    }
}

pub(crate) fn map_hash_error(error: CredentialHashError) -> Error {
    warn!(error = %error, "credential hashing failed");
    Error::internal("credential processing failed")
}
