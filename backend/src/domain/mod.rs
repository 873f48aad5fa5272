//! Domain primitives, services, and ports.
//!
//! Purpose: Define strongly typed domain entities and the services that
//! implement the driving ports. Keep types immutable and document invariants
//! in each type's Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure taxonomy.
//! - User, Post, and engagement value types.
//! - PostView / Timeline / Thread: enriched read models.
//! - Services: [`IdentityService`], [`PostService`], [`EngagementService`],
//!   [`FeedService`], plus the [`TimelineAssembler`] and [`ThreadResolver`]
//!   they share.

pub mod auth;
pub mod engagement;
pub mod error;
mod engagement_service;
mod feed_service;
mod identity_service;
pub mod ports;
pub mod post;
mod post_service;
mod store_errors;
#[cfg(test)]
pub(crate) mod test_fixtures;
mod thread_resolver;
pub mod timeline;
mod timeline_assembler;
pub mod trace_id;
pub mod user;

pub use self::auth::{
    LoginCredentials, LoginValidationError, PASSWORD_MIN, PasswordDigest, Registration,
    RegistrationValidationError, SessionToken,
};
pub use self::engagement::{EngagementKind, ToggleOutcome};
pub use self::engagement_service::EngagementService;
pub use self::error::{BlankErrorMessage, Error, ErrorCode, TRACE_ID_HEADER};
pub use self::feed_service::FeedService;
pub use self::identity_service::{IdentityService, SESSION_TTL};
pub use self::post::{POST_CONTENT_MAX, Post, PostDraft, PostId, PostValidationError};
pub use self::post_service::PostService;
pub use self::thread_resolver::ThreadResolver;
pub use self::timeline::{EmbeddedPost, PostStats, PostView, Thread, Timeline};
pub use self::timeline_assembler::TimelineAssembler;
pub use self::trace_id::TraceId;
pub use self::user::{Email, User, UserDraft, UserId, UserValidationError, Username};

/// Convenient domain result alias.
///
/// # Examples
/// ```
/// use chirp_backend::domain::{ApiResult, Error};
///
/// fn delete_someone_elses_post() -> ApiResult<()> {
///     Err(Error::forbidden("only the author may delete this post"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
