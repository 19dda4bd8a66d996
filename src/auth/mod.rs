//! JWT bearer authentication with role-gated access.
//!
//! One decode-and-check algorithm shared by three extractor variants:
//! `Auth` (any live user), `AdminAuth` (admin claim required) and
//! `AuthIdentity` (any live user, handlers take the subject id from the
//! token instead of the request body). A request is admitted only when a
//! non-refresh token with a valid signature names a user that still
//! exists; deleting an account therefore revokes its outstanding tokens.

mod errors;
mod extractors;
mod state;

pub use errors::AuthError;
pub use extractors::{AdminAuth, Auth, AuthIdentity, Identity, bearer_token};
pub use state::HasAuthBackend;
