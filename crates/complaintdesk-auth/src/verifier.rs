//! Raw token to identity resolution, shared by HTTP and realtime authentication.

use std::sync::Arc;

use tracing::debug;

use crate::error::{AuthError, VerifyError};
use crate::identity::{Identity, IdentityStore};
use crate::jwt::JwtDecoder;

/// Validates a presented token and resolves its subject to a live identity.
#[derive(Clone)]
pub struct TokenVerifier {
    decoder: JwtDecoder,
    store: Arc<dyn IdentityStore>,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("decoder", &self.decoder)
            .finish_non_exhaustive()
    }
}

impl TokenVerifier {
    /// Create a verifier over the given decoder and identity store.
    pub fn new(decoder: JwtDecoder, store: Arc<dyn IdentityStore>) -> Self {
        Self { decoder, store }
    }

    /// Verify `raw` and look up the user it names.
    ///
    /// A missing or blank token is [`AuthError::MissingToken`]. The identity
    /// store is consulted only after the token passes signature and expiry checks.
    pub async fn verify(&self, raw: Option<&str>) -> Result<Identity, VerifyError> {
        let token = raw
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let claims = self.decoder.decode(token)?;

        match self.store.find_identity(claims.sub).await {
            Ok(Some(identity)) => Ok(identity),
            Ok(None) => {
                debug!(user_id = %claims.sub, "Token subject no longer exists");
                Err(VerifyError::NotFound(claims.sub))
            }
            Err(e) => Err(VerifyError::Lookup(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use complaintdesk_core::config::AuthConfig;
    use complaintdesk_core::result::AppResult;
    use complaintdesk_entity::user::UserRole;

    use super::*;
    use crate::jwt::{Claims, JwtEncoder};

    struct MemoryStore(HashMap<Uuid, Identity>);

    #[async_trait]
    impl IdentityStore for MemoryStore {
        async fn find_identity(&self, user_id: Uuid) -> AppResult<Option<Identity>> {
            Ok(self.0.get(&user_id).cloned())
        }
    }

    fn setup() -> (TokenVerifier, JwtEncoder, Identity) {
        let config = AuthConfig {
            jwt_secret: "verifier-test".to_string(),
            ..AuthConfig::default()
        };
        let identity = Identity {
            user_id: Uuid::new_v4(),
            display_name: "Ravi".to_string(),
            role: UserRole::Admin,
        };
        let store = MemoryStore(HashMap::from([(identity.user_id, identity.clone())]));
        let verifier = TokenVerifier::new(JwtDecoder::new(&config), Arc::new(store));
        (verifier, JwtEncoder::new(&config), identity)
    }

    fn token_for(encoder: &JwtEncoder, sub: Uuid, exp_offset: Duration) -> String {
        let now = Utc::now();
        encoder
            .sign(&Claims {
                sub,
                name: "Ravi".to_string(),
                role: UserRole::User,
                iat: now.timestamp(),
                exp: (now + exp_offset).timestamp(),
            })
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_token_resolves_stored_identity() {
        let (verifier, encoder, identity) = setup();
        let token = token_for(&encoder, identity.user_id, Duration::hours(1));
        let resolved = verifier.verify(Some(&token)).await.unwrap();
        assert_eq!(resolved, identity);
        assert!(resolved.is_admin());
    }

    #[tokio::test]
    async fn test_missing_and_blank_tokens() {
        let (verifier, _, _) = setup();
        for raw in [None, Some(""), Some("   ")] {
            assert!(matches!(
                verifier.verify(raw).await,
                Err(VerifyError::Auth(AuthError::MissingToken))
            ));
        }
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let (verifier, encoder, identity) = setup();
        let token = token_for(&encoder, identity.user_id, Duration::hours(-1));
        assert!(matches!(
            verifier.verify(Some(&token)).await,
            Err(VerifyError::Auth(AuthError::Expired))
        ));
    }

    #[tokio::test]
    async fn test_unknown_subject_is_not_found() {
        let (verifier, encoder, _) = setup();
        let stranger = Uuid::new_v4();
        let token = token_for(&encoder, stranger, Duration::hours(1));
        match verifier.verify(Some(&token)).await {
            Err(VerifyError::NotFound(id)) => assert_eq!(id, stranger),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_foreign_key_is_rejected() {
        let (verifier, _, identity) = setup();
        let foreign = JwtEncoder::new(&AuthConfig {
            jwt_secret: "someone-else".to_string(),
            ..AuthConfig::default()
        });
        let token = token_for(&foreign, identity.user_id, Duration::hours(1));
        let err = verifier.verify(Some(&token)).await.unwrap_err();
        assert!(err.is_rejection());
        assert!(matches!(err, VerifyError::Auth(AuthError::InvalidSignature)));
    }
}
