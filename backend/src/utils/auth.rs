use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by the identity provider's access tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub exp: i64,    // expiration timestamp
    pub iat: i64,    // issued at timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

impl Claims {
    pub fn new(user_id: Uuid, expiration_hours: i64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiration_hours)).timestamp();

        Self {
            sub: user_id.to_string(),
            exp,
            iat: now.timestamp(),
            aud: None,
        }
    }
}

/// Sign a token the same way the identity provider does. Used by tooling and tests.
pub fn create_jwt(
    user_id: Uuid,
    secret: &str,
    expiration_hours: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims::new(user_id, expiration_hours);
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn decode_jwt(
    token: &str,
    secret: &str,
    audience: Option<&str>,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    match audience {
        Some(aud) => {
            validation.set_audience(&[aud]);
            validation.set_required_spec_claims(&["exp", "aud"]);
        }
        None => validation.validate_aud = false,
    }

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_roundtrip_keeps_subject() {
        let user_id = Uuid::new_v4();
        let token = create_jwt(user_id, "secret", 1).unwrap();
        let claims = decode_jwt(&token, "secret", None).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = create_jwt(Uuid::new_v4(), "secret", 1).unwrap();
        assert!(decode_jwt(&token, "other-secret", None).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let token = create_jwt(Uuid::new_v4(), "secret", -2).unwrap();
        assert!(decode_jwt(&token, "secret", None).is_err());
    }

    fn token_with_audience(aud: Option<&str>) -> String {
        let claims = Claims {
            aud: aud.map(str::to_string),
            ..Claims::new(Uuid::new_v4(), 1)
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap()
    }

    #[test]
    fn test_audience_is_enforced_when_configured() {
        let without_aud = create_jwt(Uuid::new_v4(), "secret", 1).unwrap();
        assert!(decode_jwt(&without_aud, "secret", Some("authenticated")).is_err());

        let wrong_aud = token_with_audience(Some("anon"));
        assert!(decode_jwt(&wrong_aud, "secret", Some("authenticated")).is_err());

        let right_aud = token_with_audience(Some("authenticated"));
        let claims = decode_jwt(&right_aud, "secret", Some("authenticated")).unwrap();
        assert_eq!(claims.aud.as_deref(), Some("authenticated"));
    }

    #[test]
    fn test_audience_is_ignored_when_not_configured() {
        let token = token_with_audience(Some("anything"));
        assert!(decode_jwt(&token, "secret", None).is_ok());
    }
}
