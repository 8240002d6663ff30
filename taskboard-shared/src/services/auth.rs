/// Auth Service
///
/// Orchestrates the credential store, the password hasher and the token
/// issuer. [`AuthService::validate_credentials`] is the only place a login
/// decision is made; [`AuthService::login`] trusts the user it is given.
///
/// Values returned from this service are [`PublicUser`]s, so the password hash
/// never leaves it.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use taskboard_shared::auth::jwt::TokenIssuer;
/// use taskboard_shared::auth::password::{HashCost, PasswordHasher};
/// use taskboard_shared::clock::SystemClock;
/// use taskboard_shared::models::user::RegisterUser;
/// use taskboard_shared::services::auth::AuthService;
/// use taskboard_shared::store::memory::MemoryStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let service = AuthService::new(
///     Arc::new(MemoryStore::new()),
///     PasswordHasher::new(HashCost::minimal())?,
///     TokenIssuer::new("a-very-long-signing-secret-for-docs", TokenIssuer::default_lifetime(), Arc::new(SystemClock))?,
/// );
///
/// service
///     .register(RegisterUser {
///         name: "Ada".to_string(),
///         email: "ada@example.com".to_string(),
///         password: "correct horse".to_string(),
///     })
///     .await?;
///
/// let user = service
///     .validate_credentials("ada@example.com", "correct horse")
///     .await?
///     .expect("valid credentials");
/// let token = service.login(&user)?;
/// assert!(!token.access_token.is_empty());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::auth::jwt::{JwtError, TokenIssuer};
use crate::auth::password::{PasswordError, PasswordHasher};
use crate::models::user::{CreateUser, PublicUser, RegisterUser};
use crate::store::{StoreError, UserStore};
use crate::validation::{self, FieldError};

/// Auth Service failures
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    /// A live user already has this email
    #[error("Email is already registered")]
    DuplicateEmail,

    /// Input failed field validation
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] JwtError),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AuthServiceError {
    fn from(err: StoreError) -> Self {
        if err.is_duplicate_email() {
            AuthServiceError::DuplicateEmail
        } else {
            AuthServiceError::Store(err)
        }
    }
}

/// Login request body
#[derive(Clone, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Result of a successful login
#[derive(Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Password the decoy hash is derived from; never matches a real login
const DECOY_PASSWORD: &str = "taskboard-decoy-password";

/// Registration, credential checks and token issuance
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    tokens: TokenIssuer,

    /// Hash verified against when the email is unknown, built on first use
    decoy_hash: Arc<OnceCell<String>>,
}

impl fmt::Debug for AuthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthService")
            .field("hasher", &self.hasher)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, hasher: PasswordHasher, tokens: TokenIssuer) -> Self {
        Self {
            users,
            hasher,
            tokens,
            decoy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Token issuer/verifier used by this service
    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Creates a user account
    ///
    /// # Errors
    ///
    /// - `Validation` if name, email or password fail their rules
    /// - `DuplicateEmail` if a live user has this email, whether detected by
    ///   the lookup or by the store's uniqueness constraint on insert
    pub async fn register(&self, input: RegisterUser) -> Result<PublicUser, AuthServiceError> {
        validation::validate(&input).map_err(AuthServiceError::Validation)?;

        if self.users.find_by_email(&input.email).await?.is_some() {
            debug!(email = %input.email, "Registration rejected: email already registered");
            return Err(AuthServiceError::DuplicateEmail);
        }

        let RegisterUser {
            name,
            email,
            password,
        } = input;

        let hasher = self.hasher.clone();
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| PasswordError::HashError(e.to_string()))??;

        let user = self
            .users
            .insert(CreateUser {
                name,
                email,
                password_hash,
            })
            .await?;

        info!(user_id = %user.id, "User registered");
        Ok(PublicUser::from(user))
    }

    /// Checks an email/password pair
    ///
    /// Returns `None` for an unknown email and for a wrong password alike.
    /// An unknown email still costs one Argon2 verification, against a decoy
    /// hash at the configured cost. Empty inputs are treated as non-matching.
    pub async fn validate_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<PublicUser>, AuthServiceError> {
        if email.is_empty() || password.is_empty() {
            return Ok(None);
        }

        let Some(user) = self.users.find_by_email(email).await? else {
            let decoy = self.decoy_hash().await?;
            self.verify_password(password, decoy.to_owned()).await?;
            debug!("Credential check failed: unknown email");
            return Ok(None);
        };

        let matches = self
            .verify_password(password, user.password_hash.clone())
            .await
            .map_err(|e| {
                warn!(user_id = %user.id, error = %e, "Stored password hash is unusable");
                e
            })?;

        if !matches {
            debug!(user_id = %user.id, "Credential check failed: wrong password");
            return Ok(None);
        }

        Ok(Some(PublicUser::from(user)))
    }

    async fn verify_password(&self, password: &str, hash: String) -> Result<bool, PasswordError> {
        let hasher = self.hasher.clone();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| PasswordError::VerifyError(e.to_string()))?
    }

    async fn decoy_hash(&self) -> Result<&str, PasswordError> {
        let hash = self
            .decoy_hash
            .get_or_try_init(|| async {
                let hasher = self.hasher.clone();
                tokio::task::spawn_blocking(move || hasher.hash(DECOY_PASSWORD))
                    .await
                    .map_err(|e| PasswordError::HashError(e.to_string()))?
            })
            .await?;

        Ok(hash.as_str())
    }

    /// Issues an access token for an already validated user
    pub fn login(&self, user: &PublicUser) -> Result<AccessToken, AuthServiceError> {
        let access_token = self.tokens.issue(user.id, &user.email)?;
        info!(user_id = %user.id, "Access token issued");
        Ok(AccessToken { access_token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::HashCost;
    use crate::clock::ManualClock;
    use crate::store::memory::MemoryStore;
    use chrono::{Duration, Utc};

    const SECRET: &str = "auth-service-test-secret-0123456789abcdef";

    fn service() -> (AuthService, Arc<MemoryStore>, Arc<ManualClock>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let tokens = TokenIssuer::new(SECRET, Duration::hours(1), clock.clone()).unwrap();
        let hasher = PasswordHasher::new(HashCost::minimal()).unwrap();
        (AuthService::new(store.clone(), hasher, tokens), store, clock)
    }

    fn registration(email: &str) -> RegisterUser {
        RegisterUser {
            name: "Test User".to_string(),
            email: email.to_string(),
            password: "password123".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_stores_hash_not_password() {
        let (service, store, _) = service();
        let user = service.register(registration("a@example.com")).await.unwrap();
        assert_eq!(user.email, "a@example.com");

        let stored = store.find_by_email("a@example.com").await.unwrap().unwrap();
        assert_eq!(stored.id, user.id);
        assert_ne!(stored.password_hash, "password123");
        assert!(stored.password_hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let (service, _, _) = service();
        let first = service.register(registration("a@example.com")).await.unwrap();

        let err = service.register(registration("a@example.com")).await.unwrap_err();
        assert!(matches!(err, AuthServiceError::DuplicateEmail));

        // Different case is a different email
        let other = service.register(registration("A@example.com")).await.unwrap();
        assert_ne!(first.id, other.id);
    }

    #[tokio::test]
    async fn test_register_validation() {
        let (service, store, _) = service();
        let input = RegisterUser {
            name: String::new(),
            email: "nope".to_string(),
            password: "short".to_string(),
        };

        match service.register(input).await {
            Err(AuthServiceError::Validation(errors)) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["email", "name", "password"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(store.find_by_email("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_validate_credentials() {
        let (service, _, _) = service();
        let registered = service.register(registration("a@example.com")).await.unwrap();

        let user = service
            .validate_credentials("a@example.com", "password123")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user, registered);

        assert!(service
            .validate_credentials("a@example.com", "wrong-password")
            .await
            .unwrap()
            .is_none());
        assert!(service
            .validate_credentials("nobody@example.com", "password123")
            .await
            .unwrap()
            .is_none());
        assert!(service.validate_credentials("", "").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_email_still_verifies_a_hash() {
        let (service, _, _) = service();
        assert!(service.decoy_hash.get().is_none());

        assert!(service
            .validate_credentials("nobody@example.com", "password123")
            .await
            .unwrap()
            .is_none());

        let decoy = service.decoy_hash.get().cloned().unwrap();
        assert!(decoy.starts_with("$argon2id$"));

        // Built once and reused, even for the decoy password itself
        assert!(service
            .validate_credentials("nobody@example.com", DECOY_PASSWORD)
            .await
            .unwrap()
            .is_none());
        assert_eq!(service.decoy_hash.get(), Some(&decoy));
    }

    #[tokio::test]
    async fn test_known_email_skips_decoy() {
        let (service, _, _) = service();
        service.register(registration("a@example.com")).await.unwrap();

        service
            .validate_credentials("a@example.com", "wrong-password")
            .await
            .unwrap();
        assert!(service.decoy_hash.get().is_none());
    }

    #[tokio::test]
    async fn test_login_token_roundtrip_and_expiry() {
        let (service, _, clock) = service();
        let user = service.register(registration("a@example.com")).await.unwrap();

        let token = service.login(&user).unwrap();
        let claims = service.tokens().verify(&token.access_token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "a@example.com");

        clock.advance(Duration::hours(1));
        assert!(matches!(
            service.tokens().verify(&token.access_token),
            Err(JwtError::Expired)
        ));
    }

    #[test]
    fn test_secrets_redacted_in_debug() {
        let credentials = Credentials {
            email: "a@example.com".to_string(),
            password: "hunter22".to_string(),
        };
        assert!(!format!("{:?}", credentials).contains("hunter22"));

        let token = AccessToken {
            access_token: "eyJhbGciOi".to_string(),
        };
        assert!(!format!("{:?}", token).contains("eyJ"));
    }
}
