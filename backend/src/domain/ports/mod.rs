//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`SessionStore`], [`CredentialHasher`]) are
//! implemented by outbound adapters. Driving ports ([`IdentityGate`],
//! [`PostCommand`], [`EngagementCommand`], [`TimelineQuery`],
//! [`UserProfileQuery`]) are implemented by domain services and called by
//! inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod credential_hasher;
mod engagement_command;
mod engagement_repository;
mod identity_gate;
mod post_command;
mod post_repository;
mod session_store;
mod timeline_query;
mod user_profile_query;
mod user_repository;

#[cfg(test)]
pub use credential_hasher::MockCredentialHasher;
pub use credential_hasher::{CredentialHashError, CredentialHasher};
#[cfg(test)]
pub use engagement_command::MockEngagementCommand;
pub use engagement_command::EngagementCommand;
#[cfg(test)]
pub use engagement_repository::MockEngagementRepository;
pub use engagement_repository::{EngagementRepository, EngagementRepositoryError};
#[cfg(test)]
pub use identity_gate::MockIdentityGate;
pub use identity_gate::{IdentityGate, LoginOutcome};
#[cfg(test)]
pub use post_command::MockPostCommand;
pub use post_command::{CreatePostRequest, PostCommand};
#[cfg(test)]
pub use post_repository::MockPostRepository;
pub use post_repository::{PostRepository, PostRepositoryError, TimelineScope};
#[cfg(test)]
pub use session_store::MockSessionStore;
pub use session_store::{SessionStore, SessionStoreError};
#[cfg(test)]
pub use timeline_query::MockTimelineQuery;
pub use timeline_query::TimelineQuery;
#[cfg(test)]
pub use user_profile_query::MockUserProfileQuery;
pub use user_profile_query::UserProfileQuery;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
