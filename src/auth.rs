use base64::engine::{general_purpose, Engine};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{debug, info, warn};

use crate::error::{ServiceError, ServiceResult};

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

const TOKEN_FIELD_SEPARATOR: char = '|';

// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// Issued to an administrator after a successful login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// An authenticated administrator, recovered from a bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSession {
    pub email: String,
    pub is_admin: bool,
    pub expires_at: DateTime<Utc>,
}

/// Credential check and stateless session tokens for the admin area.
///
/// Tokens have the shape `base64(email|expires_unix|nonce).hex(hmac)`; the
/// server keeps no session table, so restarting with a new secret signs
/// everyone out.
#[derive(Clone)]
pub struct AdminAuth {
    email: String,
    password: String,
    secret: Vec<u8>,
    session_ttl: Duration,
}

impl AdminAuth {
    pub fn new(email: &str, password: &str, secret: &[u8], session_ttl: Duration) -> Self {
        Self {
            email: email.trim().to_string(),
            password: password.to_string(),
            secret: secret.to_vec(),
            session_ttl,
        }
    }

    /// Generate a random nonce for session tokens
    pub fn generate_nonce() -> String {
        rand::thread_rng().gen_range(10000000..99999999).to_string()
    }

    /// Random secret for development runs without a configured one
    pub fn generate_secret() -> String {
        let bytes: [u8; 32] = rand::thread_rng().gen();
        hex::encode(bytes)
    }

    pub fn get_timestamp() -> i64 {
        Utc::now().timestamp()
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.secret).expect("HMAC can take key of any size")
    }

    /// Hex HMAC-SHA256 of `content` under the session secret
    pub fn sign(&self, content: &str) -> String {
        let mut mac = self.mac();
        mac.update(content.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    // Compares MACs of both passwords so the check takes the same time
    // whatever the input
    fn password_matches(&self, candidate: &str) -> bool {
        let mut expected = self.mac();
        expected.update(self.password.as_bytes());
        let expected = expected.finalize().into_bytes();

        let mut supplied = self.mac();
        supplied.update(candidate.as_bytes());
        supplied.verify_slice(&expected).is_ok()
    }

    pub fn login(&self, email: &str, password: &str) -> ServiceResult<AdminToken> {
        let email_matches = email.trim().eq_ignore_ascii_case(&self.email);
        let password_matches = self.password_matches(password);

        if !(email_matches && password_matches) {
            warn!("Rejected admin login for {}", email.trim());
            return Err(ServiceError::Unauthorized(
                "Invalid email or password".to_string(),
            ));
        }

        info!("Admin {} logged in", self.email);
        Ok(self.issue_token(Self::get_timestamp()))
    }

    /// Issue a token for the configured administrator valid from `now`
    pub fn issue_token(&self, now: i64) -> AdminToken {
        let expires = now + self.session_ttl.num_seconds();
        let payload = format!(
            "{}{sep}{}{sep}{}",
            self.email,
            expires,
            Self::generate_nonce(),
            sep = TOKEN_FIELD_SEPARATOR
        );
        let encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.as_bytes());
        let signature = self.sign(&encoded);

        AdminToken {
            token: format!("{}.{}", encoded, signature),
            expires_at: DateTime::from_timestamp(expires, 0).unwrap_or_else(Utc::now),
        }
    }

    /// Check a token's signature and expiry as of `now`
    pub fn verify_token(&self, token: &str, now: i64) -> ServiceResult<AdminSession> {
        let invalid = || ServiceError::Unauthorized("Invalid session token".to_string());

        let (encoded, signature) = token.trim().split_once('.').ok_or_else(invalid)?;
        let signature = hex::decode(signature).map_err(|_| invalid())?;

        let mut mac = self.mac();
        mac.update(encoded.as_bytes());
        mac.verify_slice(&signature).map_err(|_| {
            debug!("Session token signature mismatch");
            invalid()
        })?;

        let payload = general_purpose::URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|_| invalid())?;
        let payload = String::from_utf8(payload).map_err(|_| invalid())?;

        let mut fields = payload.rsplitn(3, TOKEN_FIELD_SEPARATOR);
        let _nonce = fields.next().ok_or_else(invalid)?;
        let expires: i64 = fields
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(invalid)?;
        let email = fields.next().ok_or_else(invalid)?;

        if expires <= now {
            return Err(ServiceError::Unauthorized("Session expired".to_string()));
        }

        // Only the configured administrator can hold a valid token
        Ok(AdminSession {
            email: email.to_string(),
            is_admin: true,
            expires_at: DateTime::from_timestamp(expires, 0).ok_or_else(invalid)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> AdminAuth {
        AdminAuth::new(
            "admin@example.com",
            "correct horse",
            b"test-secret",
            Duration::minutes(30),
        )
    }

    #[test]
    fn test_generate_nonce() {
        let nonce = AdminAuth::generate_nonce();
        assert!(nonce.len() == 8);
        assert!(nonce.parse::<u64>().is_ok());
    }

    #[test]
    fn test_generate_secret() {
        let a = AdminAuth::generate_secret();
        let b = AdminAuth::generate_secret();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
    }

    #[test]
    fn test_sign_is_stable_hex() {
        let auth = auth();
        let signature = auth.sign("payload");
        assert_eq!(signature.len(), 64);
        assert_eq!(signature, auth.sign("payload"));
        assert_ne!(signature, auth.sign("payload2"));
        assert!(hex::decode(&signature).is_ok());
    }

    #[test]
    fn test_login_and_verify() {
        let auth = auth();
        let token = auth.login(" Admin@Example.com ", "correct horse").unwrap();

        let session = auth
            .verify_token(&token.token, AdminAuth::get_timestamp())
            .unwrap();
        assert_eq!(session.email, "admin@example.com");
        assert!(session.is_admin);
        assert_eq!(session.expires_at, token.expires_at);
    }

    #[test]
    fn test_login_rejects_bad_credentials() {
        let auth = auth();
        assert!(matches!(
            auth.login("admin@example.com", "wrong"),
            Err(ServiceError::Unauthorized(_))
        ));
        assert!(matches!(
            auth.login("someone@example.com", "correct horse"),
            Err(ServiceError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_expired_token() {
        let auth = auth();
        let token = auth.issue_token(1_000_000);

        assert!(auth.verify_token(&token.token, 1_000_000 + 29 * 60).is_ok());
        assert!(matches!(
            auth.verify_token(&token.token, 1_000_000 + 30 * 60),
            Err(ServiceError::Unauthorized(message)) if message == "Session expired"
        ));
    }

    #[test]
    fn test_tampered_token() {
        let auth = auth();
        let token = auth.issue_token(AdminAuth::get_timestamp()).token;
        let (payload, signature) = token.split_once('.').unwrap();

        // Forged payload with the original signature
        let forged = general_purpose::URL_SAFE_NO_PAD.encode("admin@example.com|9999999999|1");
        assert!(auth
            .verify_token(&format!("{}.{}", forged, signature), 0)
            .is_err());

        // Signature from another secret
        let other = AdminAuth::new("admin@example.com", "x", b"other", Duration::minutes(30));
        let resigned = format!("{}.{}", payload, other.sign(payload));
        assert!(auth.verify_token(&resigned, 0).is_err());

        assert!(auth.verify_token("garbage", 0).is_err());
        assert!(auth.verify_token("abc.zz", 0).is_err());
    }
}
