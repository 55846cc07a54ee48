//! Session credentials, access grants, and the health-unit access map.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};
use crate::models::{HealthUnit, HealthUnitId, ScopeId};

/// Name of the servlet session cookie.
pub const SESSION_COOKIE: &str = "JSESSIONID";

/// Name of the anti-forgery cookie, echoed back in `X-XSRF-TOKEN`.
pub const XSRF_COOKIE: &str = "XSRF-TOKEN";

static SESSION_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| token_pattern(SESSION_COOKIE));
static XSRF_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| token_pattern(XSRF_COOKIE));

fn token_pattern(name: &str) -> Regex {
    Regex::new(&format!(r"(?:^|;\s*){}=([^;\s]+)", regex::escape(name)))
        .expect("cookie name escapes into a valid pattern")
}

/// An authenticated session.
///
/// Values are immutable: login produces one, and every successful scope
/// switch produces a new one through [`Session::with_active_scope`].
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    cookie: String,
    xsrf_token: String,
    active_scope: Option<ScopeId>,
}

impl Session {
    /// Builds a session from raw token values.
    pub fn new(session_token: &str, xsrf_token: &str) -> Self {
        Self {
            cookie: format!("{SESSION_COOKIE}={session_token}; {XSRF_COOKIE}={xsrf_token}"),
            xsrf_token: xsrf_token.to_string(),
            active_scope: None,
        }
    }

    /// Builds a session from the `Set-Cookie` header values of a login response.
    ///
    /// The `Cookie` header replays the `name=value` part of every cookie set.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Authentication`] if either the session cookie or
    /// the anti-forgery cookie is missing or empty.
    pub fn from_set_cookie<'a, I>(headers: I) -> ClientResult<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let pairs: Vec<&str> = headers
            .into_iter()
            .filter_map(|header| header.split(';').next())
            .map(str::trim)
            .filter(|pair| !pair.is_empty())
            .collect();
        let cookie = pairs.join("; ");

        if SESSION_TOKEN_RE.captures(&cookie).is_none() {
            return Err(ClientError::Authentication(format!(
                "{SESSION_COOKIE} missing from login response"
            )));
        }
        let xsrf_token = XSRF_TOKEN_RE
            .captures(&cookie)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| {
                ClientError::Authentication(format!("{XSRF_COOKIE} missing from login response"))
            })?;

        Ok(Self {
            cookie,
            xsrf_token,
            active_scope: None,
        })
    }

    /// Value for the `Cookie` request header.
    #[must_use]
    pub fn cookie(&self) -> &str {
        &self.cookie
    }

    /// Value for the `X-XSRF-TOKEN` request header.
    #[must_use]
    pub fn xsrf_token(&self) -> &str {
        &self.xsrf_token
    }

    /// Scope selected by the last successful switch.
    #[must_use]
    pub fn active_scope(&self) -> Option<&ScopeId> {
        self.active_scope.as_ref()
    }

    /// A copy of this session acting under `scope`.
    #[must_use]
    pub fn with_active_scope(&self, scope: ScopeId) -> Self {
        Self {
            cookie: self.cookie.clone(),
            xsrf_token: self.xsrf_token.clone(),
            active_scope: Some(scope),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("cookie", &"<redacted>")
            .field("xsrf_token", &"<redacted>")
            .field("active_scope", &self.active_scope)
            .finish()
    }
}

/// One access returned by session introspection.
///
/// Only `Lotacao` accesses carry a health unit; other access kinds
/// (administrative roles) leave it empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGrant {
    #[serde(rename = "id")]
    pub scope_id: ScopeId,
    #[serde(rename = "unidadeSaude", default)]
    pub health_unit: Option<HealthUnit>,
}

/// Health unit → scope mapping for the authenticated identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessMap {
    scopes: HashMap<HealthUnitId, ScopeId>,
    unit_names: HashMap<HealthUnitId, String>,
}

impl AccessMap {
    /// Builds the map from grants in iteration order.
    ///
    /// Grants without a health unit are skipped. When two grants name the
    /// same unit, the later one wins.
    pub fn from_grants<'a, I>(grants: I) -> Self
    where
        I: IntoIterator<Item = &'a AccessGrant>,
    {
        let mut map = Self::default();
        for grant in grants {
            let Some(unit) = &grant.health_unit else {
                continue;
            };
            map.scopes.insert(unit.id.clone(), grant.scope_id.clone());
            map.unit_names.insert(unit.id.clone(), unit.name.clone());
        }
        map
    }

    /// Scope authorized for `unit`, if any.
    #[must_use]
    pub fn scope_for(&self, unit: &HealthUnitId) -> Option<&ScopeId> {
        self.scopes.get(unit)
    }

    /// Name of `unit` as reported during introspection.
    #[must_use]
    pub fn unit_name(&self, unit: &HealthUnitId) -> Option<&str> {
        self.unit_names.get(unit).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Entries sorted by health unit id.
    #[must_use]
    pub fn entries(&self) -> Vec<(&HealthUnitId, &ScopeId)> {
        let mut entries: Vec<_> = self.scopes.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}
