/*
 * Responsibility
 * - the verified, request-scoped identity type
 * - the extractor itself lives in core
 */
use crate::error::AppError;

/// Identity fields bound by the auth middleware for exactly one request.
///
/// `user_id` can be None: the middleware treats a verified token without a
/// `user._id` claim as authenticated-with-no-identity. Handlers that need a
/// bound subject call `require_user_id`.
#[derive(Debug, Clone, Default)]
pub struct AuthCtx {
    pub user_id: Option<String>,
    pub email: Option<String>,
}

impl AuthCtx {
    /// The bound subject, or `Unauthorized` when the token carried none.
    pub fn require_user_id(&self) -> Result<&str, AppError> {
        self.user_id.as_deref().ok_or(AppError::Unauthorized)
    }
}
