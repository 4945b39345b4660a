use std::collections::HashSet;

use crate::core::token::TokenAuthority;
use crate::domain::model::{IssuedToken, TokenVerdict, VerifiedDomain};
use crate::utils::error::{Rejection, Result, WidgetError};

/// 允許載入 widget 的網域，啟動後唯讀
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    domains: HashSet<String>,
}

impl AllowList {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            domains: domains.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.domains.contains(domain)
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

/// 去掉 Origin 的 scheme 前綴，其餘保持原樣（大小寫、連接埠都不處理）
pub fn normalize_origin(origin: &str) -> &str {
    origin
        .strip_prefix("https://")
        .or_else(|| origin.strip_prefix("http://"))
        .unwrap_or(origin)
}

#[derive(Debug, Clone)]
pub struct DomainGate {
    authority: TokenAuthority,
    allow_list: AllowList,
}

impl DomainGate {
    pub fn new(authority: TokenAuthority, allow_list: AllowList) -> Self {
        Self {
            authority,
            allow_list,
        }
    }

    pub fn authority(&self) -> &TokenAuthority {
        &self.authority
    }

    /// 發放 token 前先確認網域在允許清單內
    pub fn issue(&self, requested: Option<&str>) -> Result<IssuedToken> {
        let domain = match requested {
            Some(domain) if !domain.is_empty() => domain,
            _ => return Err(WidgetError::validation("missing domain")),
        };

        if !self.allow_list.contains(domain) {
            tracing::warn!("🚫 Token requested for unlisted domain: {}", domain);
            return Err(Rejection::DomainNotAllowed.into());
        }

        let issued = self.authority.issue(domain)?;
        tracing::info!(
            "🔑 Issued widget token for {} (expires {})",
            domain,
            issued.claims.expires_at()
        );
        Ok(issued)
    }

    /// 每個受保護請求都要通過：token 有效，且 token 網域等於請求的 Origin
    pub fn admit(&self, token: Option<&str>, origin: Option<&str>) -> Result<VerifiedDomain> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(Rejection::MissingToken)?;

        let claims = match self.authority.verify(token) {
            TokenVerdict::Valid(claims) => claims,
            TokenVerdict::Invalid => return Err(Rejection::InvalidToken.into()),
        };

        let origin = origin.map(normalize_origin);
        if origin != Some(claims.domain.as_str()) {
            tracing::warn!(
                "🚫 Origin {:?} does not match token domain {}",
                origin,
                claims.domain
            );
            return Err(Rejection::DomainNotAllowed.into());
        }

        if !self.allow_list.contains(&claims.domain) {
            tracing::warn!("🚫 Token domain {} is no longer allowed", claims.domain);
            return Err(Rejection::DomainNotAllowed.into());
        }

        Ok(VerifiedDomain(claims.domain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::FixedClock;
    use crate::core::token::SigningSecret;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    const TEST_SECRET: &str = "test-secret-that-is-at-least-32-characters-long";

    fn gate_with(domains: &[&str]) -> DomainGate {
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
        ));
        let authority = TokenAuthority::new(SigningSecret::new(TEST_SECRET).unwrap(), clock);
        DomainGate::new(authority, AllowList::new(domains.iter().copied()))
    }

    fn gate() -> DomainGate {
        gate_with(&["center.cruises", "localhost"])
    }

    fn rejection(result: Result<VerifiedDomain>) -> Rejection {
        match result {
            Err(WidgetError::AuthError(rejection)) => rejection,
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_normalize_origin() {
        assert_eq!(normalize_origin("https://center.cruises"), "center.cruises");
        assert_eq!(normalize_origin("http://localhost"), "localhost");
        assert_eq!(normalize_origin("http://localhost:3000"), "localhost:3000");
        assert_eq!(normalize_origin("center.cruises"), "center.cruises");
    }

    #[test]
    fn test_issue_for_listed_domain() {
        let gate = gate();
        let issued = gate.issue(Some("center.cruises")).unwrap();
        let claims = gate.authority().verify(&issued.token).into_claims().unwrap();
        assert_eq!(claims.domain, "center.cruises");
    }

    #[test]
    fn test_issue_rejects_unlisted_and_missing_domains() {
        let gate = gate();

        assert!(matches!(
            gate.issue(Some("evil.example")),
            Err(WidgetError::AuthError(Rejection::DomainNotAllowed))
        ));
        // 完全比對，子網域與大小寫差異都不算
        assert!(gate.issue(Some("www.center.cruises")).is_err());
        assert!(gate.issue(Some("Center.Cruises")).is_err());

        assert!(matches!(
            gate.issue(None),
            Err(WidgetError::ValidationError { .. })
        ));
        assert!(matches!(
            gate.issue(Some("")),
            Err(WidgetError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_admit_matching_origin() {
        let gate = gate();
        let token = gate.issue(Some("center.cruises")).unwrap().token;

        let verified = gate
            .admit(Some(&token), Some("https://center.cruises"))
            .unwrap();
        assert_eq!(verified.as_str(), "center.cruises");

        assert!(gate.admit(Some(&token), Some("http://center.cruises")).is_ok());
    }

    #[test]
    fn test_admit_rejections() {
        let gate = gate();
        let token = gate.issue(Some("center.cruises")).unwrap().token;

        assert_eq!(
            rejection(gate.admit(None, Some("https://center.cruises"))),
            Rejection::MissingToken
        );
        assert_eq!(
            rejection(gate.admit(Some(""), Some("https://center.cruises"))),
            Rejection::MissingToken
        );
        assert_eq!(
            rejection(gate.admit(Some("garbage"), Some("https://center.cruises"))),
            Rejection::InvalidToken
        );
        assert_eq!(
            rejection(gate.admit(Some(&token), None)),
            Rejection::DomainNotAllowed
        );
        assert_eq!(
            rejection(gate.admit(Some(&token), Some("https://Center.Cruises"))),
            Rejection::DomainNotAllowed
        );
        assert_eq!(
            rejection(gate.admit(Some(&token), Some("https://center.cruises:8443"))),
            Rejection::DomainNotAllowed
        );
    }

    #[test]
    fn test_admit_rechecks_allow_list() {
        let issuing = gate();
        let token = issuing.issue(Some("center.cruises")).unwrap().token;

        // 同一把密鑰，但允許清單已移除該網域
        let narrowed = gate_with(&["localhost"]);
        assert_eq!(
            rejection(narrowed.admit(Some(&token), Some("https://center.cruises"))),
            Rejection::DomainNotAllowed
        );
    }
}
