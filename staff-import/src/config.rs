//! Import configuration
//!
//! Settings are resolved once at startup, in this order of precedence:
//! command-line flags (and the `SUPABASE_*` environment variables, which may
//! come from a `.env` file), then the optional TOML file, then defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::cli::Cli;
use crate::import::{FailurePolicy, ImportContext, LinkagePolicy};

const DEFAULT_WORKBOOK: &str = "college.xlsx";

/// Settings file layout
///
/// ```toml
/// workbook = "college.xlsx"
/// sheet = "Sheet1"
/// supabase_url = "https://abc.supabase.co"
/// avatar_bucket = "avatars"
/// photo_dir = "photos"
/// fail_fast = false
///
/// [linkage]
/// max_attempts = 10
/// interval_ms = 500
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub workbook: Option<PathBuf>,
    pub sheet: Option<String>,
    pub supabase_url: Option<String>,
    pub avatar_bucket: Option<String>,
    pub photo_dir: Option<PathBuf>,
    pub fail_fast: Option<bool>,
    pub linkage: LinkageSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkageSection {
    pub max_attempts: Option<u32>,
    pub interval_ms: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Backend endpoint and credential
#[derive(Clone)]
pub struct BackendConfig {
    pub url: String,
    pub service_key: String,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url)
            .field("service_key", &"<redacted>")
            .finish()
    }
}

/// Fully resolved settings for one run
#[derive(Clone)]
pub struct ImportConfig {
    pub workbook: PathBuf,
    pub sheet: Option<String>,
    pub backend_url: Option<String>,
    service_key: Option<String>,
    pub context: ImportContext,
    pub dry_run: bool,
}

impl std::fmt::Debug for ImportConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportConfig")
            .field("workbook", &self.workbook)
            .field("sheet", &self.sheet)
            .field("backend_url", &self.backend_url)
            .field("service_key", &self.service_key.as_ref().map(|_| "<redacted>"))
            .field("context", &self.context)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl ImportConfig {
    /// Resolve settings from the command line and the optional config file
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::merge(cli, file)
    }

    fn merge(cli: &Cli, file: FileConfig) -> Result<Self> {
        let defaults = ImportContext::default();
        let default_linkage = LinkagePolicy::default();

        let max_attempts = cli
            .poll_attempts
            .or(file.linkage.max_attempts)
            .unwrap_or(default_linkage.max_attempts);
        if max_attempts == 0 {
            bail!("Poll attempts must be at least 1");
        }
        let interval = cli
            .poll_interval_ms
            .or(file.linkage.interval_ms)
            .map(Duration::from_millis)
            .unwrap_or(default_linkage.interval);

        let avatar_bucket = cli
            .bucket
            .clone()
            .or(file.avatar_bucket)
            .unwrap_or(defaults.avatar_bucket);
        if avatar_bucket.trim().is_empty() || avatar_bucket.contains('/') {
            bail!("Invalid storage bucket name: '{}'", avatar_bucket);
        }

        let failure_policy = if cli.fail_fast || file.fail_fast.unwrap_or(false) {
            FailurePolicy::FailFast
        } else {
            FailurePolicy::Continue
        };

        Ok(Self {
            workbook: cli
                .file
                .clone()
                .or(file.workbook)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKBOOK)),
            sheet: cli.sheet.clone().or(file.sheet),
            backend_url: non_empty(cli.supabase_url.clone().or(file.supabase_url)),
            service_key: non_empty(cli.service_role_key.clone()),
            context: ImportContext {
                avatar_bucket,
                photo_dir: cli
                    .photo_dir
                    .clone()
                    .or(file.photo_dir)
                    .unwrap_or(defaults.photo_dir),
                linkage: LinkagePolicy {
                    max_attempts,
                    interval,
                },
                failure_policy,
            },
            dry_run: cli.dry_run,
        })
    }

    /// Backend settings; both the URL and the service-role key are required
    pub fn backend(&self) -> Result<BackendConfig> {
        let url = self
            .backend_url
            .clone()
            .context("Supabase URL missing: set SUPABASE_URL or pass --supabase-url")?;
        let service_key = self.service_key.clone().context(
            "Service-role key missing: set SUPABASE_SERVICE_ROLE_KEY or pass --service-role-key",
        )?;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            bail!("Supabase URL must start with http:// or https://: {}", url);
        }
        Ok(BackendConfig { url, service_key })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
