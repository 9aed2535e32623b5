/*!
 * Bearer-token authorization middleware
 *
 * Responsibility:
 * - extract a credential from the request (header/query/param/cookie, in
 *   configured order), verify it, re-check the subject against the live user
 *   store, and bind the verified identity into request extensions
 * - reject with 400 (nothing extractable) or a generic 401 (everything else)
 *
 * Public API:
 * - AuthConfig / AuthConfigError / SigningKeys
 * - access::apply (guard a Router)
 * - UserStore / StoredUser (store seam)
 * - RawToken / AuthFailure
 */
pub mod access;
pub mod config;
pub mod extract;
pub mod resolve;
pub mod verify;

pub use access::{AuthFailure, RawToken};
pub use config::{AuthConfig, AuthConfigError};
pub use resolve::{StoredUser, UserStore};
pub use verify::SigningKeys;
