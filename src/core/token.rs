//! Widget token issuance and verification.
//!
//! Tokens are HS256 JWTs carrying the authorized domain. Expiry is checked
//! against the injected clock rather than jsonwebtoken's system-time check,
//! so `now < exp` is exact with no leeway.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::domain::model::{IssuedToken, TokenVerdict, WidgetClaims};
use crate::domain::ports::Clock;
use crate::utils::error::{Result, WidgetError};

pub const TOKEN_TTL_HOURS: i64 = 24;
pub const MIN_SECRET_LEN: usize = 32;

const DEV_SECRET: &str = "dev-mode-widget-secret-not-for-production-use";

/// 簽章用的密鑰，Debug 輸出時不顯示內容
#[derive(Clone)]
pub struct SigningSecret(String);

impl SigningSecret {
    pub fn new(secret: impl Into<String>) -> Result<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(WidgetError::MissingConfigError {
                field: "widget.secret".to_string(),
            });
        }
        if secret.len() < MIN_SECRET_LEN {
            return Err(WidgetError::InvalidConfigValueError {
                field: "widget.secret".to_string(),
                value: "<redacted>".to_string(),
                reason: format!("Secret must be at least {} characters", MIN_SECRET_LEN),
            });
        }
        Ok(Self(secret))
    }

    /// 僅供本機開發使用
    pub fn insecure_dev() -> Self {
        Self(DEV_SECRET.to_string())
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

#[derive(Debug, Clone)]
pub struct TokenAuthority {
    secret: SigningSecret,
    clock: Arc<dyn Clock>,
}

impl TokenAuthority {
    pub fn new(secret: SigningSecret, clock: Arc<dyn Clock>) -> Self {
        Self { secret, clock }
    }

    pub fn ttl() -> Duration {
        Duration::hours(TOKEN_TTL_HOURS)
    }

    pub fn issue(&self, domain: &str) -> Result<IssuedToken> {
        self.issue_at(domain, self.clock.now())
    }

    pub fn issue_at(&self, domain: &str, now: DateTime<Utc>) -> Result<IssuedToken> {
        if domain.is_empty() {
            return Err(WidgetError::validation("missing domain"));
        }

        let iat = now.timestamp();
        let claims = WidgetClaims {
            domain: domain.to_string(),
            iat,
            exp: iat + Self::ttl().num_seconds(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;

        Ok(IssuedToken { token, claims })
    }

    pub fn verify(&self, token: &str) -> TokenVerdict {
        self.verify_at(token, self.clock.now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> TokenVerdict {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let claims = match decode::<WidgetClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        ) {
            Ok(data) => data.claims,
            Err(err) => {
                tracing::debug!("Widget token rejected: {:?}", err.kind());
                return TokenVerdict::Invalid;
            }
        };

        if now.timestamp() >= claims.exp {
            tracing::debug!("Widget token for {} expired", claims.domain);
            return TokenVerdict::Invalid;
        }

        TokenVerdict::Valid(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::FixedClock;
    use chrono::TimeZone;

    const TEST_SECRET: &str = "test-secret-that-is-at-least-32-characters-long";

    fn issued_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn authority() -> TokenAuthority {
        TokenAuthority::new(
            SigningSecret::new(TEST_SECRET).unwrap(),
            Arc::new(FixedClock::new(issued_at())),
        )
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let authority = authority();
        let issued = authority.issue("center.cruises").unwrap();

        assert_eq!(issued.claims.domain, "center.cruises");
        assert_eq!(issued.claims.issued_at(), issued_at());
        assert_eq!(issued.claims.expires_at(), issued_at() + Duration::hours(24));

        let claims = authority.verify(&issued.token).into_claims().unwrap();
        assert_eq!(claims.domain, "center.cruises");
    }

    #[test]
    fn test_empty_domain_is_rejected() {
        let err = authority().issue("").unwrap_err();
        assert!(matches!(err, WidgetError::ValidationError { .. }));
    }

    #[test]
    fn test_expiry_boundary() {
        let authority = authority();
        let issued = authority.issue_at("center.cruises", issued_at()).unwrap();
        let expiry = issued_at() + Duration::hours(24);

        assert!(authority
            .verify_at(&issued.token, expiry - Duration::seconds(1))
            .is_valid());
        assert_eq!(authority.verify_at(&issued.token, expiry), TokenVerdict::Invalid);
        assert_eq!(
            authority.verify_at(&issued.token, expiry + Duration::seconds(1)),
            TokenVerdict::Invalid
        );
    }

    #[test]
    fn test_wrong_secret() {
        let token = authority().issue("center.cruises").unwrap().token;

        let other = TokenAuthority::new(
            SigningSecret::new("different-secret-that-is-at-least-32-characters").unwrap(),
            Arc::new(FixedClock::new(issued_at())),
        );
        assert_eq!(other.verify(&token), TokenVerdict::Invalid);
    }

    #[test]
    fn test_spliced_payload_is_rejected() {
        let authority = authority();
        let genuine = authority.issue("center.cruises").unwrap().token;
        let other = authority.issue("evil.example").unwrap().token;

        let genuine_parts: Vec<&str> = genuine.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let forged = format!("{}.{}.{}", genuine_parts[0], other_parts[1], genuine_parts[2]);

        assert_eq!(authority.verify(&forged), TokenVerdict::Invalid);
    }

    #[test]
    fn test_malformed_tokens() {
        let authority = authority();
        assert_eq!(authority.verify(""), TokenVerdict::Invalid);
        assert_eq!(authority.verify("not-a-token"), TokenVerdict::Invalid);
        assert_eq!(authority.verify("a.b.c"), TokenVerdict::Invalid);
    }

    #[test]
    fn test_secret_validation() {
        assert!(SigningSecret::new("").is_err());
        assert!(SigningSecret::new("short").is_err());
        assert!(SigningSecret::new(TEST_SECRET).is_ok());
        assert_eq!(
            format!("{:?}", SigningSecret::new(TEST_SECRET).unwrap()),
            "SigningSecret(<redacted>)"
        );
    }

    #[test]
    fn test_dev_secret_signs_tokens() {
        let authority = TokenAuthority::new(
            SigningSecret::insecure_dev(),
            Arc::new(FixedClock::new(issued_at())),
        );
        let issued = authority.issue("localhost").unwrap();
        assert!(authority.verify(&issued.token).is_valid());
    }
}
