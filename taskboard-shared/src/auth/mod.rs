/// Authentication primitives
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Access token issuing and verification
/// - [`middleware`]: Bearer header parsing and the per-request auth context
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use taskboard_shared::auth::jwt::TokenIssuer;
/// use taskboard_shared::auth::password::{HashCost, PasswordHasher};
/// use taskboard_shared::clock::SystemClock;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hasher = PasswordHasher::new(HashCost::minimal())?;
/// let hash = hasher.hash("user_password")?;
/// assert!(hasher.verify("user_password", &hash)?);
///
/// let issuer = TokenIssuer::new("secret-key", TokenIssuer::default_lifetime(), Arc::new(SystemClock))?;
/// let token = issuer.issue(Uuid::new_v4(), "user@example.com")?;
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
