use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Identity claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id
    pub sub: String,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

/// HS256 key pair derived once from the process-wide signing secret.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Sign identity claims for an account. The token expires after `hours`.
pub fn issue(keys: &TokenKeys, account_id: &str, username: &str, hours: u64) -> AppResult<String> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: account_id.to_string(),
        username: username.to_string(),
        iat: now,
        exp: now + (hours as i64) * 3600,
    };

    encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
        .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
}

/// Verify a token and return its claims. Fails closed: any decode or
/// signature error rejects the caller as unauthorized.
pub fn verify(keys: &TokenKeys, token: &str) -> AppResult<Claims> {
    decode::<Claims>(token, &keys.decoding, &Validation::new(Algorithm::HS256))
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_keys() -> TokenKeys {
        TokenKeys::new("test-secret")
    }

    #[test]
    fn issued_token_verifies_with_same_claims() {
        let keys = test_keys();
        let token = issue(&keys, "account-1", "alice", 1).unwrap();
        let claims = verify(&keys, &token).unwrap();
        assert_eq!(claims.sub, "account-1");
        assert_eq!(claims.username, "alice");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let keys = test_keys();
        let token = issue(&keys, "account-1", "alice", 1).unwrap();

        // Flip a byte in each segment: header, payload, signature
        for (i, _) in token.char_indices() {
            let mut tampered: Vec<u8> = token.clone().into_bytes();
            tampered[i] = if tampered[i] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(tampered).unwrap();
            if tampered == token {
                continue;
            }
            assert!(
                matches!(verify(&keys, &tampered), Err(AppError::Unauthorized)),
                "tampering at byte {} was accepted",
                i
            );
        }
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = issue(&TokenKeys::new("other-secret"), "account-1", "alice", 1).unwrap();
        assert!(matches!(
            verify(&test_keys(), &token),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn malformed_token_is_rejected() {
        let keys = test_keys();
        assert!(matches!(
            verify(&keys, "not-a-token"),
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(verify(&keys, ""), Err(AppError::Unauthorized)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = test_keys();
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: "account-1".to_string(),
            username: "alice".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding).unwrap();
        assert!(matches!(
            verify(&keys, &token),
            Err(AppError::Unauthorized)
        ));
    }
}
