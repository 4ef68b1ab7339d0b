pub mod identity;

pub use identity::{IdentityProvider, InvitationMetadata, InvitationRequest, UserRecord};
