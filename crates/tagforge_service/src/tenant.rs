use tagforge_db::SettingsRepository;

use crate::error::Result;

pub const TENANT_SETTING_KEY: &str = "tenant";

/// Path segments that name a page rather than a tenant.
const RESERVED_SEGMENTS: [&str; 2] = ["index.html", "404.html"];

/// Tenant ids end up in namespace names and brand paths, so only plain
/// identifiers are accepted.
pub fn is_valid_tenant_id(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate.len() <= 64
        && candidate.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// First path segment after the app scope, e.g. `/tagforge/acme/` -> `acme`.
pub fn tenant_from_path(path: &str, app_scope: &str) -> Option<String> {
    let scope = app_scope.trim_matches('/');
    let path = path.trim_start_matches('/');

    let rest = if scope.is_empty() {
        path
    } else {
        let rest = path.strip_prefix(scope)?;
        // "/tagforge-old/..." is not inside "/tagforge/"
        if !(rest.is_empty() || rest.starts_with('/')) {
            return None;
        }
        rest.trim_start_matches('/')
    };

    let segment = rest.split(['/', '?', '#']).next()?;
    if RESERVED_SEGMENTS.contains(&segment) || !is_valid_tenant_id(segment) {
        return None;
    }
    Some(segment.to_string())
}

/// Picks the active tenant: explicit parameter, then URL path, then the
/// persisted selection, then the default. The winner is persisted.
pub struct TenantResolver {
    settings: SettingsRepository,
    app_scope: String,
    default_tenant: String,
}

impl TenantResolver {
    pub fn new(settings: SettingsRepository, app_scope: impl Into<String>, default_tenant: impl Into<String>) -> Self {
        Self { settings, app_scope: app_scope.into(), default_tenant: default_tenant.into() }
    }

    pub async fn resolve(&self, explicit: Option<&str>, path: Option<&str>) -> Result<String> {
        let tenant = match self.pick(explicit, path).await? {
            Some(tenant) => tenant,
            None => self.default_tenant.clone(),
        };

        self.settings.set(TENANT_SETTING_KEY, &tenant).await?;
        tracing::debug!("active tenant: {}", tenant);
        Ok(tenant)
    }

    async fn pick(&self, explicit: Option<&str>, path: Option<&str>) -> Result<Option<String>> {
        if let Some(tenant) = explicit.map(str::trim).filter(|t| is_valid_tenant_id(t)) {
            return Ok(Some(tenant.to_string()));
        }
        if let Some(tenant) = path.and_then(|p| tenant_from_path(p, &self.app_scope)) {
            return Ok(Some(tenant));
        }
        let stored = self.settings.get(TENANT_SETTING_KEY).await?;
        Ok(stored.filter(|t| is_valid_tenant_id(t)))
    }

    pub async fn current(&self) -> Result<Option<String>> {
        Ok(self.settings.get(TENANT_SETTING_KEY).await?)
    }
}
