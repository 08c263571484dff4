use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::Error as JwtError,
    get_current_timestamp,
};
use serde::{Deserialize, Serialize};

use crate::db::models::User;

/// Identity claims carried by a login token.
///
/// Tokens have no `exp`; they stay valid for as long as the signing secret
/// does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: String,
    pub username: String,
    pub email: String,
    pub iat: u64,
}

impl Claims {
    pub fn for_user(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            iat: get_current_timestamp(),
        }
    }
}

/// HS256 signing and verification keys derived from the shared secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn issue(&self, claims: &Claims) -> Result<String, JwtError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims() -> Claims {
        Claims {
            id: "0b6c2f8e-1111-4c4c-9a9a-2b2b2b2b2b2b".to_string(),
            username: "Ann".to_string(),
            email: "ann@x.com".to_string(),
            iat: 1_700_000_000,
        }
    }

    #[test]
    fn test_issued_token_verifies() {
        let keys = TokenKeys::from_secret(b"secret");
        let token = keys.issue(&claims()).unwrap();
        assert_eq!(keys.verify(&token).unwrap(), claims());
    }

    #[test]
    fn test_other_secret_is_rejected() {
        let token = TokenKeys::from_secret(b"secret").issue(&claims()).unwrap();
        assert!(TokenKeys::from_secret(b"another").verify(&token).is_err());
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let keys = TokenKeys::from_secret(b"secret");
        let token = keys.issue(&claims()).unwrap();

        let other = keys
            .issue(&Claims {
                id: "someone-else".to_string(),
                ..claims()
            })
            .unwrap();

        // Payload from one token, signature from the other.
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = other.split('.').nth(1).unwrap();
        let forged = parts.join(".");

        assert!(keys.verify(&forged).is_err());
        assert!(keys.verify("not.a.token").is_err());
        assert!(keys.verify("").is_err());
    }

    #[test]
    fn test_other_algorithm_is_rejected() {
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS512),
            &claims(),
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        assert!(TokenKeys::from_secret(b"secret").verify(&token).is_err());
    }

    #[test]
    fn test_claims_for_user_copy_identity() {
        let user = User {
            id: "id-1".to_string(),
            username: "Ann".to_string(),
            email: "ann@x.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
        };
        let claims = Claims::for_user(&user);
        assert_eq!(claims.id, "id-1");
        assert_eq!(claims.username, "Ann");
        assert_eq!(claims.email, "ann@x.com");
        assert!(claims.iat > 0);
    }
}
