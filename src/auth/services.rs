pub(crate) use crate::auth::claims::{Claims, Role};
pub(crate) use crate::auth::dto::JwtKeys;
use crate::config::JwtConfig;
use crate::state::AppState;
use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use lazy_static::lazy_static;
use regex::Regex;
use std::time::Duration;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        JwtKeys::from_config(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        let JwtConfig {
            secret,
            issuer,
            audience,
            ttl_minutes,
        } = cfg.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
            ttl: Duration::from_secs((ttl_minutes.max(1) as u64) * 60),
        }
    }

    pub fn sign(&self, subject: Uuid, role: Role) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: subject,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            role,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(subject = %subject, role = ?role, "session token signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(subject = %data.claims.sub, role = ?data.claims.role, "session token verified");
        Ok(data.claims)
    }

    /// Verifies the token and requires it to carry `role`.
    pub fn verify_role(&self, token: &str, role: Role) -> anyhow::Result<Claims> {
        let claims = self.verify(token)?;
        if claims.role != role {
            anyhow::bail!("token is not a {:?} session", role);
        }
        Ok(claims)
    }
}


#[cfg(test)]
mod jwt_tests {
    use super::*;

    fn keys(secret: &str, issuer: &str, audience: &str) -> JwtKeys {
        JwtKeys::from_config(&JwtConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            ttl_minutes: 5,
        })
    }

    #[tokio::test]
    async fn from_state_uses_config() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        assert_eq!(keys.issuer, "test-issuer");
        assert_eq!(keys.audience, "test-aud");
    }

    #[test]
    fn sign_and_verify_customer_session() {
        let keys = keys("dev-secret", "test-issuer", "test-aud");
        let user_id = Uuid::new_v4();
        let token = keys.sign(user_id, Role::Customer).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
        assert_eq!(claims.role, Role::Customer);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn verify_role_rejects_other_role() {
        let keys = keys("dev-secret", "iss", "aud");
        let token = keys.sign(Uuid::new_v4(), Role::Customer).expect("sign");
        assert!(keys.verify_role(&token, Role::Customer).is_ok());
        let err = keys.verify_role(&token, Role::Admin).unwrap_err();
        assert!(err.to_string().contains("Admin"));
    }

    #[test]
    fn verify_rejects_wrong_issuer_audience_or_secret() {
        let good = keys("same-secret", "good-iss", "good-aud");
        let other_claims = keys("same-secret", "bad-iss", "bad-aud");
        let other_secret = keys("other-secret", "good-iss", "good-aud");
        let token = good.sign(Uuid::new_v4(), Role::Admin).expect("sign");
        assert!(other_claims.verify(&token).is_err());
        assert!(other_secret.verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_forged_json_blob() {
        let keys = keys("dev-secret", "iss", "aud");
        let forged = r#"{"id":"00000000-0000-0000-0000-000000000000","email":"x@y.z"}"#;
        assert!(keys.verify(forged).is_err());
    }
}
