//! Run configuration.
//!
//! Settings are layered: command-line flags win over the TOML config file,
//! which wins over built-in defaults. AWS profiles named on either layer are
//! resolved through the AWS SDK profile providers.

use std::fs;
use std::path::{Path, PathBuf};

use aws_config::meta::region::ProvideRegion;
use aws_config::profile::profile_file::{ProfileFileKind, ProfileFiles};
use aws_config::profile::{ProfileFileCredentialsProvider, ProfileFileRegionProvider};
use aws_credential_types::provider::ProvideCredentials;
use serde::Deserialize;
use tracing::debug;

use crate::cli::{Cli, ReportFormat};
use crate::compare::CompareOptions;
use crate::error::{BucketDiffError, Result};
use crate::hash::HashRegistry;
use crate::store::BucketLocation;

const CONFIG_DIR: &str = "bucketdiff";
const CONFIG_FILE: &str = "config.toml";

/// Contents of the optional config file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub hash_algorithm: Option<String>,
    pub chunk_size: Option<usize>,
    pub jobs: Option<usize>,
    pub exclude: Vec<String>,
    pub source: SideSettings,
    pub target: SideSettings,
}

/// `[source]` / `[target]` table of the config file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SideSettings {
    pub profile: Option<String>,
    pub region: Option<String>,
    pub endpoint: Option<String>,
    /// GCS service account file
    pub credential_path: Option<PathBuf>,
}

impl Settings {
    /// `<config dir>/bucketdiff/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load settings from `path`, or from the default location.
    ///
    /// An explicitly named file must exist; a missing default file yields
    /// empty settings.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match Self::default_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        if !required && !path.exists() {
            return Ok(Self::default());
        }

        let text = fs::read_to_string(&path).map_err(|e| BucketDiffError::ConfigError {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        debug!(path = %path.display(), "loaded config file");
        Self::from_toml(&path, &text)
    }

    pub fn from_toml(path: &Path, text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| BucketDiffError::ConfigError {
            path: path.to_path_buf(),
            reason: e.message().to_string(),
        })
    }
}

/// Credentials and region resolved from a named AWS profile.
///
/// Resolution goes through the AWS SDK profile provider, so static keys,
/// `role_arn`/`source_profile` chains, SSO and `credential_process` profiles
/// all work. A profile that yields no credentials is an error; the default
/// credential chain is never used in its place.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AwsProfile {
    pub name: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
    pub region: Option<String>,
}

impl AwsProfile {
    /// Resolve a profile from the standard AWS file locations
    /// (`AWS_CONFIG_FILE` / `AWS_SHARED_CREDENTIALS_FILE` or `~/.aws`)
    pub async fn load(name: &str) -> Result<Self> {
        Self::load_with(name, ProfileFiles::default()).await
    }

    /// Resolve a profile from explicit credentials and config files
    pub async fn load_from(name: &str, credentials_path: &Path, config_path: &Path) -> Result<Self> {
        let files = ProfileFiles::builder()
            .with_file(ProfileFileKind::Credentials, credentials_path)
            .with_file(ProfileFileKind::Config, config_path)
            .build();
        Self::load_with(name, files).await
    }

    async fn load_with(name: &str, files: ProfileFiles) -> Result<Self> {
        let credentials = ProfileFileCredentialsProvider::builder()
            .profile_files(files.clone())
            .profile_name(name)
            .build()
            .provide_credentials()
            .await
            .map_err(|e| BucketDiffError::ProfileCredentials {
                profile: name.to_string(),
                reason: error_chain(&e),
            })?;

        let region = ProfileFileRegionProvider::builder()
            .profile_files(files)
            .profile_name(name)
            .build()
            .region()
            .await
            .map(|region| region.as_ref().to_string());

        debug!(profile = name, region = ?region, "resolved AWS profile");

        Ok(Self {
            name: name.to_string(),
            access_key_id: credentials.access_key_id().to_string(),
            secret_access_key: credentials.secret_access_key().to_string(),
            session_token: credentials.session_token().map(str::to_string),
            region,
        })
    }
}

// Keys stay out of debug logs
impl std::fmt::Debug for AwsProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsProfile")
            .field("name", &self.name)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .field("region", &self.region)
            .finish()
    }
}

/// SDK credential errors keep the useful part in their source chain
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Everything needed to reach one bucket
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SideConfig {
    /// AWS profile name; resolved when the S3 store is opened
    pub profile: Option<String>,
    pub region: Option<String>,
    pub endpoint: Option<String>,
    pub credential_path: Option<PathBuf>,
}

impl SideConfig {
    /// Merge one side's flags over its config table
    fn resolve(
        profile: Option<&str>,
        region: Option<&str>,
        endpoint: Option<&str>,
        settings: SideSettings,
    ) -> Self {
        Self {
            profile: profile.map(str::to_string).or(settings.profile),
            region: region.map(str::to_string).or(settings.region),
            endpoint: endpoint.map(str::to_string).or(settings.endpoint),
            credential_path: settings.credential_path,
        }
    }
}

/// Fully resolved settings for one comparison run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub source: BucketLocation,
    pub target: BucketLocation,
    pub source_side: SideConfig,
    pub target_side: SideConfig,
    pub options: CompareOptions,
    pub prefix: String,
    pub excludes: Vec<String>,
    pub format: ReportFormat,
    pub verbose: bool,
    pub quiet: bool,
    pub show_progress: bool,
}

impl RunConfig {
    /// Merge command-line flags over file settings over defaults.
    ///
    /// Bad locations and unknown algorithms surface here, before any bucket
    /// is contacted. Profiles are resolved when their store is opened.
    pub fn resolve(cli: &Cli, settings: Settings) -> Result<Self> {
        let source = cli.source_bucket.parse::<BucketLocation>()?;
        let target = cli.target_bucket.parse::<BucketLocation>()?;

        let defaults = CompareOptions::default();
        let digest_algorithm = cli
            .hash_algorithm
            .clone()
            .or(settings.hash_algorithm)
            .unwrap_or(defaults.digest_algorithm);
        let digest_algorithm = HashRegistry::canonical_name(&digest_algorithm)?.to_string();

        let chunk_size = cli.chunk_size.or(settings.chunk_size).unwrap_or(defaults.chunk_size).max(1);
        let concurrency = match cli.jobs.or(settings.jobs).unwrap_or(defaults.concurrency) {
            0 => num_cpus::get(),
            jobs => jobs,
        };

        let mut excludes = settings.exclude;
        excludes.extend(cli.excludes.iter().cloned());

        let source_side = SideConfig::resolve(
            cli.source_profile.as_deref(),
            cli.source_region.as_deref(),
            cli.source_endpoint.as_deref(),
            settings.source,
        );
        let target_side = SideConfig::resolve(
            cli.target_profile.as_deref(),
            cli.target_region.as_deref(),
            cli.target_endpoint.as_deref(),
            settings.target,
        );

        Ok(Self {
            source,
            target,
            source_side,
            target_side,
            options: CompareOptions {
                ignore_integrity_tag: cli.ignore_etags,
                verify_content: cli.compare_hashes,
                digest_algorithm,
                chunk_size,
                concurrency,
            },
            prefix: cli.prefix.clone().unwrap_or_default(),
            excludes,
            format: cli.format,
            verbose: cli.verbose,
            quiet: cli.quiet,
            show_progress: !cli.no_progress && !cli.quiet,
        })
    }
}
