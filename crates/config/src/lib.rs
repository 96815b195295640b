//! Configuration for the mirroring service.
//!
//! A YAML document, by default `config.yml` in the platform's configuration
//! directory, layered with `EASYMIRROR_`-prefixed environment variables.
//! Nested keys in the environment are separated by `__` and keep their case:
//! `EASYMIRROR_taskQueue__maxWorkers=4`.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use easymirror_deposit::ChecksumAlgorithm;
use exn::{OptionExt, ResultExt};
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use regex::Regex;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use std::time::Duration;
use time::Date;
use time::macros::format_description;

pub const ENV_PREFIX: &str = "EASYMIRROR_";
pub const DEFAULT_MIGRATED_PATTERN: &str = r"^10\.17026/DANS.*$";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub mirroring: MirroringConfig,
    #[serde(default)]
    pub task_queue: TaskQueueConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MirroringConfig {
    pub inboxes: Vec<InboxConfig>,
    /// Milliseconds between two polls of the same inbox.
    #[serde(default = "defaults::polling_interval")]
    pub polling_interval: u64,
    pub work_dir: PathBuf,
    pub deposit_outbox: PathBuf,
    pub failed_box: PathBuf,
    pub mirror_store: PathBuf,
    #[serde(default = "defaults::migrated_dataset_pattern")]
    pub migrated_dataset_pattern: String,
    /// Replaces the builtin `dataset.xml` template.
    #[serde(default)]
    pub dataset_template: Option<PathBuf>,
    #[serde(default = "defaults::checksum_algorithms")]
    pub checksum_algorithms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxConfig {
    pub path: PathBuf,
    /// Updates to migrated datasets last modified before this date are backlog.
    #[serde(rename = "ignoreMigratedDatasetUpdatesPublishedBefore", deserialize_with = "date")]
    pub cutoff: Date,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskQueueConfig {
    #[serde(default = "defaults::max_workers")]
    pub max_workers: usize,
}
impl Default for TaskQueueConfig {
    fn default() -> Self {
        Self { max_workers: defaults::max_workers() }
    }
}

mod defaults {
    pub(super) fn polling_interval() -> u64 {
        500
    }
    pub(super) fn migrated_dataset_pattern() -> String {
        super::DEFAULT_MIGRATED_PATTERN.to_string()
    }
    pub(super) fn checksum_algorithms() -> Vec<String> {
        vec!["sha256".to_string()]
    }
    pub(super) fn max_workers() -> usize {
        2
    }
}

/// `yyyy-MM-dd`, quoted or not.
fn date<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Date, D::Error> {
    let value = String::deserialize(deserializer)?;
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]")).map_err(serde::de::Error::custom)
}

impl Config {
    /// Loads, then validates, the configuration at `path`, or at
    /// [`default_path`](Self::default_path) when none is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };
        if !path.is_file() {
            exn::bail!(ErrorKind::NotFound(path));
        }
        tracing::debug!(path = %path.display(), "Loading configuration");
        let config: Self = Self::figment(&path).extract().or_raise(|| ErrorKind::Parse(path.clone()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn default_path() -> Result<PathBuf> {
        ProjectDirs::from("nl", "DANS", "easymirror")
            .map(|dirs| dirs.config_dir().join("config.yml"))
            .ok_or_raise(|| ErrorKind::NoConfigDir)
    }

    fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Yaml::file_exact(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(false))
    }

    pub fn validate(&self) -> Result<()> {
        let mirroring = &self.mirroring;
        if mirroring.inboxes.is_empty() {
            exn::bail!(ErrorKind::invalid("mirroring.inboxes", "at least one inbox is required"));
        }
        if mirroring.polling_interval == 0 {
            exn::bail!(ErrorKind::invalid("mirroring.pollingInterval", "must be greater than zero"));
        }
        if self.task_queue.max_workers == 0 {
            exn::bail!(ErrorKind::invalid("taskQueue.maxWorkers", "must be at least 1"));
        }

        let inboxes = (mirroring.inboxes.iter().enumerate())
            .map(|(i, inbox)| (format!("mirroring.inboxes[{i}].path"), &inbox.path));
        let directories = [
            ("mirroring.workDir", &mirroring.work_dir),
            ("mirroring.depositOutbox", &mirroring.deposit_outbox),
            ("mirroring.failedBox", &mirroring.failed_box),
            ("mirroring.mirrorStore", &mirroring.mirror_store),
        ]
        .into_iter()
        .map(|(key, path)| (key.to_string(), path));
        for (key, path) in inboxes.chain(directories) {
            if !path.is_absolute() {
                exn::bail!(ErrorKind::invalid(key, format!("{} is not an absolute path", path.display())));
            }
        }

        self.migrated_pattern()?;
        self.checksum_algorithms()?;
        Ok(())
    }

    pub fn polling_interval(&self) -> Duration {
        Duration::from_millis(self.mirroring.polling_interval)
    }

    pub fn migrated_pattern(&self) -> Result<Regex> {
        let pattern = &self.mirroring.migrated_dataset_pattern;
        Regex::new(pattern).or_raise(|| ErrorKind::invalid("mirroring.migratedDatasetPattern", pattern.clone()))
    }

    pub fn checksum_algorithms(&self) -> Result<Vec<ChecksumAlgorithm>> {
        self.mirroring
            .checksum_algorithms
            .iter()
            .map(|name| {
                name.parse::<ChecksumAlgorithm>()
                    .or_raise(|| ErrorKind::invalid("mirroring.checksumAlgorithms", name.clone()))
            })
            .collect()
    }
}
