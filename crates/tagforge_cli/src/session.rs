use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::sync::Arc;
use tagforge_core::SchemaContext;
use tagforge_db::{CacheRepository, PendingRepository, SettingsRepository};
use tagforge_service::brand::{configured_tenant, BrandConfig, DEFAULT_TENANT};
use tagforge_service::cache::{CacheConfig, CacheCoordinator, HttpFetcher};
use tagforge_service::{EventLog, TenantResolver, WriteConfig};

use crate::config::Config;

/// Everything a command needs once the store is open and the tenant is
/// known: the brand and the schema context built from it.
pub struct Session {
    pub config: Config,
    pub pool: SqlitePool,
    pub tenant: String,
    pub brand: BrandConfig,
    pub ctx: SchemaContext,
    pub log: EventLog,
}

impl Session {
    pub async fn open(config: Config, tenant: Option<&str>, path: Option<&str>) -> Result<Self> {
        let pool = tagforge_db::open(&config.database_url)
            .await
            .with_context(|| format!("Failed to open local store {}", config.database_url))?;

        let default_tenant = configured_tenant(&config.brand_dir)
            .await
            .unwrap_or_else(|| DEFAULT_TENANT.to_string());
        let resolver = TenantResolver::new(SettingsRepository::new(pool.clone()), config.app_scope(), default_tenant);
        let tenant = resolver
            .resolve(tenant.or(config.tenant.as_deref()), path)
            .await
            .context("Failed to resolve tenant")?;

        let brand = BrandConfig::load(&config.brand_dir, &tenant).await;
        let ctx = SchemaContext::load(brand.schema());
        tracing::debug!("session ready: tenant {}, {} fields", tenant, ctx.fields().len());

        Ok(Self { config, pool, tenant, brand, ctx, log: EventLog::new() })
    }

    pub fn write_config(&self) -> WriteConfig {
        WriteConfig {
            base_url: self.config.base_url.clone(),
            max_payload_bytes: self.config.max_payload,
            ..WriteConfig::default()
        }
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            version: self.config.cache_version,
            default_tenant: self.tenant.clone(),
            ..CacheConfig::default()
        }
    }

    pub fn cache(&self) -> Result<CacheCoordinator> {
        let fetcher = HttpFetcher::new(&self.config.app_origin).context("TAGFORGE_APP_ORIGIN is not a valid URL")?;
        Ok(CacheCoordinator::new(
            Arc::new(fetcher),
            CacheRepository::new(self.pool.clone()),
            PendingRepository::new(self.pool.clone()),
            self.cache_config(),
            self.log.clone(),
        ))
    }
}
