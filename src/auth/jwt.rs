//! Access token issue and verification (HS256 JWT).

use crate::error::{AppError, AppResult};
use crate::models::Role;
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

/// Lifetime of every issued token, in seconds.
pub const TOKEN_TTL_SECS: i64 = 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,      // username
    pub username: String, // legacy claim name, same value as `sub`
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// What a valid token proves about its holder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub subject: String,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies tokens with the process-wide secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenIssuer {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    pub fn issue(&self, username: &str, role: Role) -> AppResult<String> {
        self.issue_at(username, role, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(&self, username: &str, role: Role, now: DateTime<Utc>) -> AppResult<String> {
        let claims = Claims {
            sub: username.to_string(),
            username: username.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(TOKEN_TTL_SECS)).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("encode token: {}", e)))
    }

    pub fn verify(&self, token: &str) -> AppResult<VerifiedToken> {
        self.verify_at(token, Utc::now())
    }

    /// Check signature and expiry against `now`. Expiry has no leeway.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> AppResult<VerifiedToken> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::TokenInvalid(e.to_string()),
            }
        })?;
        let claims = data.claims;

        if now.timestamp() >= claims.exp {
            return Err(AppError::TokenExpired);
        }
        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or_else(|| AppError::TokenInvalid("exp out of range".to_string()))?;

        Ok(VerifiedToken {
            subject: claims.sub,
            role: claims.role,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-jwt-secret-at-least-32-bytes!!";

    #[test]
    fn issued_token_verifies_with_subject_and_role() {
        let issuer = TokenIssuer::new(SECRET);
        let token = issuer.issue("alice", Role::User).unwrap();
        let verified = issuer.verify(&token).unwrap();
        assert_eq!(verified.subject, "alice");
        assert_eq!(verified.role, Role::User);
    }

    #[test]
    fn token_valid_for_one_hour() {
        let issuer = TokenIssuer::new(SECRET);
        let t = Utc::now();
        let token = issuer.issue_at("alice", Role::Admin, t).unwrap();

        let at_59 = issuer.verify_at(&token, t + Duration::minutes(59)).unwrap();
        assert_eq!(at_59.role, Role::Admin);
        assert_eq!(at_59.expires_at.timestamp(), t.timestamp() + TOKEN_TTL_SECS);

        let at_61 = issuer.verify_at(&token, t + Duration::minutes(61));
        assert!(matches!(at_61, Err(AppError::TokenExpired)));
    }

    #[test]
    fn rejects_token_from_other_secret() {
        let ours = TokenIssuer::new(SECRET);
        let theirs = TokenIssuer::new(b"another-secret-also-32-bytes-long!!");
        let token = theirs.issue("alice", Role::User).unwrap();
        assert!(matches!(ours.verify(&token), Err(AppError::TokenInvalid(_))));
    }

    #[test]
    fn rejects_altered_payload() {
        let issuer = TokenIssuer::new(SECRET);
        let token = issuer.issue("alice", Role::User).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);

        // Flip one character in the middle of the payload segment.
        let mut payload: Vec<char> = parts[1].chars().collect();
        let mid = payload.len() / 2;
        payload[mid] = if payload[mid] == 'A' { 'B' } else { 'A' };
        let payload: String = payload.into_iter().collect();
        let tampered = format!("{}.{}.{}", parts[0], payload, parts[2]);
        assert!(matches!(issuer.verify(&tampered), Err(AppError::TokenInvalid(_))));
    }

    #[test]
    fn rejects_escalated_role_with_original_signature() {
        let issuer = TokenIssuer::new(SECRET);
        let forger = TokenIssuer::new(b"forger-secret-that-is-32-bytes-long");
        let genuine = issuer.issue("alice", Role::User).unwrap();
        let forged = forger.issue("alice", Role::Admin).unwrap();

        let genuine: Vec<&str> = genuine.split('.').collect();
        let forged: Vec<&str> = forged.split('.').collect();
        let spliced = format!("{}.{}.{}", forged[0], forged[1], genuine[2]);
        assert!(matches!(issuer.verify(&spliced), Err(AppError::TokenInvalid(_))));
    }

    #[test]
    fn rejects_garbage() {
        let issuer = TokenIssuer::new(SECRET);
        assert!(matches!(
            issuer.verify("not.a.token"),
            Err(AppError::TokenInvalid(_))
        ));
    }
}
