use serde::{Deserialize, Serialize};
use std::path::Path;
use tagforge_core::Schema;

use crate::error::{Error, Result};

pub const DEFAULT_TENANT: &str = "default";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandColors {
    pub primary: String,
    pub secondary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegalLinks {
    pub imprint: String,
    pub privacy: String,
}

/// Per-tenant presentation settings plus the form schema the tenant uses.
/// Read from `{brand_dir}/{tenant}/brand.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandConfig {
    pub tenant_id: String,
    pub app_name: String,
    #[serde(rename = "short_name")]
    pub short_name: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub lock_theme: bool,
    pub brand_colors: BrandColors,
    #[serde(default)]
    pub legal: Option<LegalLinks>,
    #[serde(default)]
    pub schema: Option<Schema>,
}

fn default_theme() -> String {
    "dark".to_string()
}

impl Default for BrandConfig {
    fn default() -> Self {
        Self {
            tenant_id: DEFAULT_TENANT.to_string(),
            app_name: "TagForge NFC Tool".to_string(),
            short_name: "TagForge".to_string(),
            theme: default_theme(),
            lock_theme: false,
            brand_colors: BrandColors { primary: "#f04e37".to_string(), secondary: "#6c6b66".to_string() },
            legal: None,
            schema: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AppConfigFile {
    design: Option<String>,
}

impl BrandConfig {
    /// Loads the tenant's brand, falling back to the default brand (and its
    /// default schema) when the file is missing or malformed.
    pub async fn load(brand_dir: &Path, tenant: &str) -> Self {
        match Self::try_load(brand_dir, tenant).await {
            Ok(brand) => {
                tracing::info!("brand loaded for tenant {}", tenant);
                brand
            }
            Err(e) => {
                tracing::warn!("{}; using default brand", e);
                Self::default()
            }
        }
    }

    pub async fn try_load(brand_dir: &Path, tenant: &str) -> Result<Self> {
        if !crate::tenant::is_valid_tenant_id(tenant) {
            return Err(Error::Brand(format!("invalid tenant id '{}'", tenant)));
        }
        let path = brand_dir.join(tenant).join("brand.json");
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| Error::Brand(format!("cannot read {}: {}", path.display(), e)))?;
        serde_json::from_str(&raw).map_err(|e| Error::Brand(format!("{} is malformed: {}", path.display(), e)))
    }

    /// The tenant's form schema, or the built-in inspection schema.
    pub fn schema(&self) -> Schema {
        self.schema.clone().unwrap_or_else(Schema::default_inspection)
    }
}

/// The tenant named by `{brand_dir}/config.json` (`{"design": "..."}`), if any.
pub async fn configured_tenant(brand_dir: &Path) -> Option<String> {
    let raw = tokio::fs::read_to_string(brand_dir.join("config.json")).await.ok()?;
    match serde_json::from_str::<AppConfigFile>(&raw) {
        Ok(config) => config.design.filter(|d| crate::tenant::is_valid_tenant_id(d)),
        Err(e) => {
            tracing::warn!("config.json is malformed: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACME_BRAND: &str = r##"{
  "tenantId": "acme",
  "appName": "Acme Tags",
  "short_name": "Acme",
  "brandColors": { "primary": "#003366", "secondary": "#cccccc" },
  "schema": {
    "fields": [
      { "name": "Anlage", "shortKey": "A", "type": "text", "required": true }
    ]
  }
}"##;

    #[tokio::test]
    async fn test_load_tenant_brand() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::create_dir_all(dir.path().join("acme")).await.unwrap();
        tokio::fs::write(dir.path().join("acme/brand.json"), ACME_BRAND).await.unwrap();

        let brand = BrandConfig::load(dir.path(), "acme").await;
        assert_eq!(brand.app_name, "Acme Tags");
        assert_eq!(brand.theme, "dark");
        assert_eq!(brand.schema().fields.len(), 1);
        assert_eq!(brand.schema().fields[0].param_key(), "A");
    }

    #[tokio::test]
    async fn test_fallback_to_default_brand() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::create_dir_all(dir.path().join("broken")).await.unwrap();
        tokio::fs::write(dir.path().join("broken/brand.json"), "{ not json").await.unwrap();

        for tenant in ["missing", "broken", "../escape"] {
            let brand = BrandConfig::load(dir.path(), tenant).await;
            assert_eq!(brand, BrandConfig::default());
            assert_eq!(brand.schema(), Schema::default_inspection());
        }
    }

    #[tokio::test]
    async fn test_configured_tenant() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(configured_tenant(dir.path()).await, None);

        tokio::fs::write(dir.path().join("config.json"), r#"{"design": "acme"}"#).await.unwrap();
        assert_eq!(configured_tenant(dir.path()).await.as_deref(), Some("acme"));
    }
}
