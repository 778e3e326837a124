use std::{collections::HashSet, env};

use jsonwebtoken::{
    decode, encode, errors::Error, Algorithm, DecodingKey, EncodingKey, Header, TokenData,
    Validation,
};
use thiserror::Error;

use crate::routes::auth::claims::Claims;

/// Minimum acceptable size for the JWT secret in bytes.
pub const MIN_JWT_SECRET_LENGTH: usize = 32;
/// Minimum number of unique bytes expected for the JWT secret to avoid trivially guessable values.
const MIN_UNIQUE_JWT_BYTES: usize = 8;

#[derive(Debug, Error)]
pub enum JwtSecretError {
    #[error("JWT_SECRET must be set")]
    Missing,
    #[error("JWT_SECRET must be at least {required} bytes, but {actual} bytes were provided")]
    TooShort { actual: usize, required: usize },
    #[error(
        "JWT_SECRET must contain sufficient entropy (at least {required} unique bytes); only {actual} unique bytes found"
    )]
    LowEntropy { actual: usize, required: usize },
}

#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys").finish_non_exhaustive()
    }
}

impl JwtKeys {
    pub fn from_env() -> Result<Self, JwtSecretError> {
        let value = env::var("JWT_SECRET").map_err(|_| JwtSecretError::Missing)?;
        Self::from_secret(value)
    }

    pub fn from_secret(secret: impl AsRef<[u8]>) -> Result<Self, JwtSecretError> {
        let bytes = secret.as_ref();
        validate_secret(bytes)?;

        Ok(Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        })
    }

    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding
    }
}

fn validate_secret(secret: &[u8]) -> Result<(), JwtSecretError> {
    if secret.len() < MIN_JWT_SECRET_LENGTH {
        return Err(JwtSecretError::TooShort {
            actual: secret.len(),
            required: MIN_JWT_SECRET_LENGTH,
        });
    }

    let unique = secret.iter().copied().collect::<HashSet<_>>().len();
    if unique < MIN_UNIQUE_JWT_BYTES {
        return Err(JwtSecretError::LowEntropy {
            actual: unique,
            required: MIN_UNIQUE_JWT_BYTES,
        });
    }

    Ok(())
}

pub fn create_jwt(
    mut claims: Claims,
    keys: &JwtKeys,
    issuer: &str,
    audience: &str,
) -> Result<String, Error> {
    claims.iss = issuer.to_owned();
    claims.aud = audience.to_owned();
    encode(&Header::default(), &claims, keys.encoding_key())
}

pub fn decode_jwt(
    token: &str,
    keys: &JwtKeys,
    issuer: &str,
    audience: &str,
) -> Result<TokenData<Claims>, Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[audience]);
    validation.iss = Some(HashSet::from([issuer.to_owned()]));
    validation.validate_exp = true;
    validation.required_spec_claims.insert("exp".to_string());
    decode::<Claims>(token, keys.decoding_key(), &validation)
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;
    use crate::models::user::UserRole;

    fn valid_secret() -> &'static str {
        "0123456789abcdef0123456789abcdef"
    }

    fn claims_expiring_in(seconds: i64) -> Claims {
        Claims {
            id: "42".into(),
            email: "user@example.com".into(),
            name: Some("Jane Doe".into()),
            role: UserRole::User,
            exp: (SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_secs() as i64
                + seconds) as usize,
            iss: String::new(),
            aud: String::new(),
        }
    }

    #[test]
    fn rejects_short_secret() {
        let err = JwtKeys::from_secret("too-short").unwrap_err();
        assert!(matches!(err, JwtSecretError::TooShort { .. }));
    }

    #[test]
    fn rejects_low_entropy_secret() {
        let err = JwtKeys::from_secret("a".repeat(MIN_JWT_SECRET_LENGTH)).unwrap_err();
        assert!(matches!(err, JwtSecretError::LowEntropy { .. }));
    }

    #[test]
    fn accepts_valid_secret_and_round_trips() {
        let keys = JwtKeys::from_secret(valid_secret()).expect("secret should be accepted");
        let claims = claims_expiring_in(60);

        let token =
            create_jwt(claims.clone(), &keys, "issuer", "audience").expect("token should encode");
        let decoded = decode_jwt(&token, &keys, "issuer", "audience").expect("token should decode");
        assert_eq!(decoded.claims.email, claims.email);
        assert_eq!(decoded.claims.role, UserRole::User);
        assert_eq!(decoded.claims.iss, "issuer");
    }

    #[test]
    fn rejects_wrong_audience() {
        let keys = JwtKeys::from_secret(valid_secret()).unwrap();
        let token = create_jwt(claims_expiring_in(60), &keys, "issuer", "audience").unwrap();
        assert!(decode_jwt(&token, &keys, "issuer", "other-audience").is_err());
    }

    #[test]
    fn rejects_expired_token() {
        let keys = JwtKeys::from_secret(valid_secret()).unwrap();
        let token = create_jwt(claims_expiring_in(-120), &keys, "issuer", "audience").unwrap();
        assert!(decode_jwt(&token, &keys, "issuer", "audience").is_err());
    }
}
