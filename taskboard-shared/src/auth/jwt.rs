/// JWT token generation and validation module
///
/// Access tokens are HS256-signed JWTs carrying the user's identity (`sub`,
/// `email`) and a fixed lifetime. The signing secret is supplied once when the
/// [`TokenIssuer`] is built; there is no per-request secret lookup.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Expiration**: 1 hour by default
/// - **Validation**: Signature and issuer via `jsonwebtoken`, expiry against
///   the issuer's [`Clock`]
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use taskboard_shared::auth::jwt::TokenIssuer;
/// use taskboard_shared::clock::SystemClock;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let issuer = TokenIssuer::new(
///     "your-secret-key-at-least-32-bytes",
///     TokenIssuer::default_lifetime(),
///     Arc::new(SystemClock),
/// )?;
///
/// let user_id = Uuid::new_v4();
/// let token = issuer.issue(user_id, "user@example.com")?;
///
/// let claims = issuer.verify(&token)?;
/// assert_eq!(claims.sub, user_id);
/// assert_eq!(claims.email, "user@example.com");
/// # Ok(())
/// # }
/// ```

use crate::clock::Clock;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Issuer claim embedded in every token
pub const ISSUER: &str = "taskboard";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// No signing secret was configured
    #[error("JWT signing secret is missing")]
    MissingSecret,

    /// Token lifetime is not positive or exceeds [`TokenIssuer::MAX_LIFETIME_SECONDS`]
    #[error("Invalid token lifetime: {0}")]
    InvalidLifetime(String),

    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature mismatch, malformed token or foreign issuer
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,
}

/// JWT claims structure
///
/// - `sub`: Subject (user ID)
/// - `email`: User email at issuance
/// - `iss`: Issuer (always "taskboard")
/// - `iat`: Issued at (Unix timestamp)
/// - `exp`: Expiration (Unix timestamp)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: Uuid,

    /// Email of the subject
    pub email: String,

    /// Issuer - Always "taskboard"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Builds claims issued at `issued_at` and valid for `lifetime`
    ///
    /// # Errors
    ///
    /// Returns `JwtError::CreateError` if the expiry is out of range.
    pub fn new(
        sub: Uuid,
        email: impl Into<String>,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Result<Self, JwtError> {
        let expires_at = issued_at
            .checked_add_signed(lifetime)
            .ok_or_else(|| JwtError::CreateError("Expiry out of range".to_string()))?;

        Ok(Self {
            sub,
            email: email.into(),
            iss: ISSUER.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        })
    }

    /// Checks if the claims have expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

/// Issues and verifies access tokens
///
/// Cloning is cheap; keys are shared and the clock is behind an `Arc`.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("lifetime", &self.lifetime)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Longest accepted token lifetime (365 days)
    pub const MAX_LIFETIME_SECONDS: i64 = 365 * 24 * 60 * 60;

    /// Default access token lifetime (1 hour)
    pub fn default_lifetime() -> Duration {
        Duration::hours(1)
    }

    /// Converts a configured number of seconds into a token lifetime
    ///
    /// # Errors
    ///
    /// Returns `JwtError::InvalidLifetime` unless
    /// `0 < seconds <= MAX_LIFETIME_SECONDS`.
    pub fn lifetime_from_seconds(seconds: i64) -> Result<Duration, JwtError> {
        if seconds <= 0 || seconds > Self::MAX_LIFETIME_SECONDS {
            return Err(JwtError::InvalidLifetime(format!(
                "{} seconds (expected 1..={})",
                seconds,
                Self::MAX_LIFETIME_SECONDS
            )));
        }

        Duration::try_seconds(seconds)
            .ok_or_else(|| JwtError::InvalidLifetime(format!("{} seconds", seconds)))
    }

    /// Creates an issuer signing with `secret`
    ///
    /// # Errors
    ///
    /// - `JwtError::MissingSecret` if `secret` is empty
    /// - `JwtError::InvalidLifetime` if `lifetime` is not positive or exceeds
    ///   [`Self::MAX_LIFETIME_SECONDS`]
    pub fn new(secret: &str, lifetime: Duration, clock: Arc<dyn Clock>) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::MissingSecret);
        }

        let max = Duration::seconds(Self::MAX_LIFETIME_SECONDS);
        if lifetime <= Duration::zero() || lifetime > max {
            return Err(JwtError::InvalidLifetime(format!("{} seconds", lifetime.num_seconds())));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            lifetime,
            clock,
        })
    }

    /// Issues a signed token for `subject`, expiring one lifetime from now
    pub fn issue(&self, subject: Uuid, email: &str) -> Result<String, JwtError> {
        let claims = Claims::new(subject, email, self.clock.now(), self.lifetime)?;
        self.sign(&claims)
    }

    /// Signs arbitrary claims with this issuer's key
    pub fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
    }

    /// Validates a token and extracts its claims
    ///
    /// The signature is checked first, so a tampered token is always
    /// `InvalidToken` even if it is also past its expiry.
    ///
    /// # Errors
    ///
    /// - `JwtError::InvalidToken` if the signature, format or issuer is wrong
    /// - `JwtError::Expired` if the issuer's clock is at or past `exp`
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        // exp is checked against `self.clock` below
        validation.validate_exp = false;
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidIssuer => JwtError::InvalidToken("Unexpected issuer".to_string()),
                ErrorKind::InvalidSignature => JwtError::InvalidToken("Signature mismatch".to_string()),
                _ => JwtError::InvalidToken(format!("Token validation failed: {}", e)),
            }
        })?;

        if token_data.claims.is_expired_at(self.clock.now()) {
            return Err(JwtError::Expired);
        }

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn issuer_with_clock() -> (TokenIssuer, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let issuer = TokenIssuer::new(SECRET, TokenIssuer::default_lifetime(), clock.clone()).unwrap();
        (issuer, clock)
    }

    #[test]
    fn test_default_lifetime_is_one_hour() {
        assert_eq!(TokenIssuer::default_lifetime(), Duration::hours(1));
    }

    #[test]
    fn test_claims_creation() {
        let now = Utc::now();
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "a@b.co", now, Duration::hours(1)).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, "taskboard");
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(!claims.is_expired_at(now));
        assert!(claims.is_expired_at(now + Duration::hours(1)));
    }

    #[test]
    fn test_claims_expiry_out_of_range_is_an_error() {
        let result = Claims::new(Uuid::new_v4(), "a@b.co", Utc::now(), Duration::MAX);
        assert!(matches!(result, Err(JwtError::CreateError(_))));
    }

    #[test]
    fn test_lifetime_bounds() {
        let clock: Arc<dyn Clock> = Arc::new(crate::clock::SystemClock);

        assert_eq!(TokenIssuer::lifetime_from_seconds(3600).unwrap(), Duration::hours(1));
        assert!(TokenIssuer::lifetime_from_seconds(TokenIssuer::MAX_LIFETIME_SECONDS).is_ok());
        for seconds in [0, -1, TokenIssuer::MAX_LIFETIME_SECONDS + 1, 1_000_000_000_000_000, i64::MAX] {
            assert!(matches!(
                TokenIssuer::lifetime_from_seconds(seconds),
                Err(JwtError::InvalidLifetime(_))
            ));
        }

        for lifetime in [Duration::zero(), Duration::days(366), Duration::MAX] {
            assert!(matches!(
                TokenIssuer::new(SECRET, lifetime, clock.clone()),
                Err(JwtError::InvalidLifetime(_))
            ));
        }
    }

    #[test]
    fn test_longest_lifetime_still_issues() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let lifetime = TokenIssuer::lifetime_from_seconds(TokenIssuer::MAX_LIFETIME_SECONDS).unwrap();
        let issuer = TokenIssuer::new(SECRET, lifetime, clock.clone()).unwrap();

        let token = issuer.issue(Uuid::new_v4(), "user@example.com").unwrap();
        clock.advance(Duration::days(364));
        assert!(issuer.verify(&token).is_ok());
        clock.advance(Duration::days(1));
        assert!(matches!(issuer.verify(&token), Err(JwtError::Expired)));
    }

    #[test]
    fn test_empty_secret_rejected() {
        let result = TokenIssuer::new("", Duration::hours(1), Arc::new(crate::clock::SystemClock));
        assert!(matches!(result, Err(JwtError::MissingSecret)));
    }

    #[test]
    fn test_issue_and_verify() {
        let (issuer, _clock) = issuer_with_clock();
        let user_id = Uuid::new_v4();

        let token = issuer.issue(user_id, "user@example.com").expect("Should create token");
        let claims = issuer.verify(&token).expect("Should validate token");

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "user@example.com");
        assert_eq!(claims.iss, "taskboard");
    }

    #[test]
    fn test_verify_with_wrong_secret() {
        let (issuer, clock) = issuer_with_clock();
        let other = TokenIssuer::new("another-secret-key-of-sufficient-size", Duration::hours(1), clock).unwrap();

        let token = issuer.issue(Uuid::new_v4(), "user@example.com").unwrap();
        assert!(matches!(other.verify(&token), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let (issuer, _clock) = issuer_with_clock();
        let token = issuer.issue(Uuid::new_v4(), "user@example.com").unwrap();

        let forged_claims = Claims::new(Uuid::new_v4(), "evil@example.com", Utc::now(), Duration::hours(1)).unwrap();
        let forged_payload = issuer.sign(&forged_claims).unwrap();

        let parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged_payload.split('.').collect();
        let spliced = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);

        assert!(matches!(issuer.verify(&spliced), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let (issuer, _clock) = issuer_with_clock();
        assert!(matches!(issuer.verify("not-a-jwt"), Err(JwtError::InvalidToken(_))));
        assert!(matches!(issuer.verify(""), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn test_foreign_issuer_rejected() {
        let (issuer, clock) = issuer_with_clock();
        let mut claims = Claims::new(Uuid::new_v4(), "a@b.co", clock.now(), Duration::hours(1)).unwrap();
        claims.iss = "someone-else".to_string();
        let token = issuer.sign(&claims).unwrap();

        assert!(matches!(issuer.verify(&token), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn test_token_expires_after_lifetime() {
        let (issuer, clock) = issuer_with_clock();
        let token = issuer.issue(Uuid::new_v4(), "user@example.com").unwrap();

        clock.advance(Duration::minutes(59));
        assert!(issuer.verify(&token).is_ok());

        clock.advance(Duration::minutes(1));
        assert!(matches!(issuer.verify(&token), Err(JwtError::Expired)));

        clock.advance(Duration::days(1));
        assert!(matches!(issuer.verify(&token), Err(JwtError::Expired)));
    }

    #[test]
    fn test_expired_and_tampered_reports_invalid() {
        let (issuer, clock) = issuer_with_clock();
        let other = TokenIssuer::new("another-secret-key-of-sufficient-size", Duration::hours(1), clock.clone()).unwrap();
        let token = other.issue(Uuid::new_v4(), "user@example.com").unwrap();

        clock.advance(Duration::hours(2));
        assert!(matches!(issuer.verify(&token), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn test_custom_lifetime() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let issuer = TokenIssuer::new(SECRET, Duration::seconds(30), clock.clone()).unwrap();
        let token = issuer.issue(Uuid::new_v4(), "user@example.com").unwrap();

        clock.advance(Duration::seconds(29));
        assert!(issuer.verify(&token).is_ok());

        clock.advance(Duration::seconds(1));
        assert!(matches!(issuer.verify(&token), Err(JwtError::Expired)));
    }
}
