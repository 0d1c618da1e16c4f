// Site table: site identifier → ZVM appliance FQDN, loaded from YAML.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Environment variable consulted when `--servers` is not given.
pub const SERVERS_FILE_ENV: &str = "ZERTO_SERVERS_FILE";

/// Default site table path, relative to the working directory.
pub const DEFAULT_SERVERS_FILE: &str = "servers.yaml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Zerto site `{0}` does not exist in the site table")]
    UnknownSite(String),
}

/// Top-level YAML mapping, e.g.
///
/// ```yaml
/// east: zvm-east.corp.example.com
/// west: zvm-west.corp.example.com
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct SiteConfig {
    sites: BTreeMap<String, String>,
}

impl SiteConfig {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading site table {}: {}", path.display(), e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate the site table from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: SiteConfig = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.sites.is_empty(), "site table must list at least one site");
        for (site, fqdn) in &self.sites {
            anyhow::ensure!(!site.is_empty(), "site names must be non-empty");
            anyhow::ensure!(
                !fqdn.trim().is_empty(),
                "site `{}` must map to a non-empty fqdn",
                site
            );
        }
        Ok(())
    }

    /// FQDN of the ZVM appliance for `site`.
    pub fn resolve(&self, site: &str) -> Result<&str, ConfigError> {
        self.sites
            .get(site)
            .map(|fqdn| fqdn.trim())
            .ok_or_else(|| ConfigError::UnknownSite(site.to_string()))
    }

    pub fn sites(&self) -> impl Iterator<Item = &str> {
        self.sites.keys().map(String::as_str)
    }
}
