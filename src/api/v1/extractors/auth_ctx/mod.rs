/*!
 * Authentication context extractor
 *
 * Responsibility:
 * - provide the authenticated request context (AuthCtx) to handlers
 * - axum specifics stay in core; the plain type lives in types
 *
 * Public API:
 * - AuthCtx
 * - AuthCtxExtractor
 */

mod core;
mod types;

pub use core::AuthCtxExtractor;
pub use types::AuthCtx;
