/*
 * Responsibility
 * - map verified claims to a live identity
 * - re-check the subject against the user store on every request
 *   (revocation-by-deletion: a deleted account invalidates its tokens)
 */
use async_trait::async_trait;
use thiserror::Error;

use super::verify::Claims;

pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Minimal record the resolver needs back from the store.
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub id: String,
    pub email: String,
}

/// Point-lookup seam to the live user store. `Ok(None)` is the
/// distinguishable not-found condition.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_by_id(&self, id: &str) -> Result<Option<StoredUser>, StoreError>;
}

/// Identity bound to a single request. Never persisted, never cached.
#[derive(Debug, Clone, Default)]
pub struct Identity {
    pub user_id: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("token subject not found in user store")]
    IdentityNotFound,
    #[error("user store lookup failed: {0}")]
    Store(#[source] StoreError),
}

/// Resolve claims to an identity.
///
/// A token without a `user._id` claim resolves to an empty identity with no
/// error: authenticated at the token level, no bound subject. Call sites that
/// need a subject check for one themselves.
///
/// For a resolved subject the claim email takes precedence; when the token
/// carries none, the stored email fills in. That fill-in is a deliberate
/// extra on top of copying the claim: tokens only have to carry `_id` and
/// handlers still see an email for the subject.
pub async fn resolve(claims: &Claims, store: &dyn UserStore) -> Result<Identity, ResolveError> {
    let Some(user) = &claims.user else {
        return Ok(Identity::default());
    };

    // email is convenience data only; _id is the sole trust anchor.
    let email = user.email.clone();

    let Some(id) = &user.id else {
        return Ok(Identity {
            user_id: None,
            email,
        });
    };

    match store.get_by_id(id).await {
        Ok(Some(stored)) => Ok(Identity {
            user_id: Some(stored.id),
            // Claim email wins; the stored one fills in when the token has none.
            email: email.or(Some(stored.email)),
        }),
        Ok(None) => Err(ResolveError::IdentityNotFound),
        Err(e) => Err(ResolveError::Store(e)),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::middleware::auth::verify::UserClaim;

    /// In-memory store fake shared with the pipeline tests.
    pub(crate) struct FakeUserStore {
        users: HashMap<String, StoredUser>,
        fail: bool,
    }

    impl FakeUserStore {
        pub(crate) fn with_users(ids: &[&str]) -> Self {
            let users = ids
                .iter()
                .map(|id| {
                    (
                        id.to_string(),
                        StoredUser {
                            id: id.to_string(),
                            email: format!("{id}@example.com"),
                        },
                    )
                })
                .collect();
            Self { users, fail: false }
        }

        pub(crate) fn failing() -> Self {
            Self {
                users: HashMap::new(),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl UserStore for FakeUserStore {
        async fn get_by_id(&self, id: &str) -> Result<Option<StoredUser>, StoreError> {
            if self.fail {
                return Err("store down".into());
            }
            Ok(self.users.get(id).cloned())
        }
    }

    fn claims(user: Option<UserClaim>) -> Claims {
        Claims {
            user,
            exp: u64::MAX,
            nbf: None,
            iat: None,
        }
    }

    #[tokio::test]
    async fn live_subject_resolves_with_email() {
        let store = FakeUserStore::with_users(&["u-1"]);
        let claims = claims(Some(UserClaim {
            id: Some("u-1".to_string()),
            email: Some("a@example.com".to_string()),
        }));

        let identity = resolve(&claims, &store).await.unwrap();
        assert_eq!(identity.user_id.as_deref(), Some("u-1"));
        assert_eq!(identity.email.as_deref(), Some("a@example.com"));
    }

    #[tokio::test]
    async fn stored_email_fills_in_when_claim_has_none() {
        let store = FakeUserStore::with_users(&["u-2"]);
        let claims = claims(Some(UserClaim {
            id: Some("u-2".to_string()),
            email: None,
        }));

        let identity = resolve(&claims, &store).await.unwrap();
        assert_eq!(identity.email.as_deref(), Some("u-2@example.com"));
    }

    #[tokio::test]
    async fn deleted_subject_is_rejected() {
        let store = FakeUserStore::with_users(&[]);
        let claims = claims(Some(UserClaim {
            id: Some("gone".to_string()),
            email: None,
        }));

        assert!(matches!(
            resolve(&claims, &store).await,
            Err(ResolveError::IdentityNotFound)
        ));
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_error() {
        let store = FakeUserStore::failing();
        let claims = claims(Some(UserClaim {
            id: Some("u-1".to_string()),
            email: None,
        }));

        assert!(matches!(
            resolve(&claims, &store).await,
            Err(ResolveError::Store(_))
        ));
    }

    // Documented permissive default: a token with no user claim (or no _id)
    // resolves to an empty identity rather than being rejected.
    #[tokio::test]
    async fn absent_user_claim_yields_empty_identity() {
        let store = FakeUserStore::with_users(&[]);

        let identity = resolve(&claims(None), &store).await.unwrap();
        assert!(identity.user_id.is_none());
        assert!(identity.email.is_none());
    }

    #[tokio::test]
    async fn user_claim_without_id_keeps_email_but_skips_lookup() {
        // Store would fail if queried; no _id means no lookup happens.
        let store = FakeUserStore::failing();
        let claims = claims(Some(UserClaim {
            id: None,
            email: Some("ghost@example.com".to_string()),
        }));

        let identity = resolve(&claims, &store).await.unwrap();
        assert!(identity.user_id.is_none());
        assert_eq!(identity.email.as_deref(), Some("ghost@example.com"));
    }
}
