pub mod jwt;
pub mod ledger;
pub mod password;
pub mod session;

pub use jwt::{Claims, VerifyError, issue_access_token, issue_refresh_token, verify_token};
pub use password::{hash_password, verify_password};
pub use session::{TokenPair, issue_token_pair, rotate_refresh_token};

/// Generate a cryptographically secure random token (hex-encoded).
///
/// Used for the email-verification and password-reset tokens stored on the
/// user row; these are plain random strings, not JWTs.
pub fn generate_secure_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}
