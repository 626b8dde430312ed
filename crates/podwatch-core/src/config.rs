//! podwatch.toml configuration parser.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::duration::parse_duration;
use crate::error::{ConfigError, ConfigResult};
use crate::types::Thresholds;

/// Default location of the config file.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/podwatch.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PodwatchConfig {
    pub kubectl: KubectlConfig,
    pub thresholds: Thresholds,
    pub check: CheckConfig,
    pub mounts: MountsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KubectlConfig {
    pub binary: String,
    pub kubeconfig: Option<PathBuf>,
    pub namespace: String,
    pub selector: String,
    pub timeout: String,
}

impl Default for KubectlConfig {
    fn default() -> Self {
        Self {
            binary: "kubectl".to_string(),
            kubeconfig: None,
            namespace: "irods-csi-driver".to_string(),
            selector: "app.kubernetes.io/instance=irods-csi-driver-node".to_string(),
            timeout: "30s".to_string(),
        }
    }
}

impl KubectlConfig {
    pub fn timeout(&self) -> ConfigResult<Duration> {
        parse_duration(&self.timeout).ok_or_else(|| ConfigError::InvalidDuration(self.timeout.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Name used for the checked workload in verdict messages.
    pub subject: String,
    /// Pod name prefix the restart check is limited to.
    pub name_prefix: String,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            subject: "iRODS CSI Driver".to_string(),
            name_prefix: "irods-csi-driver-node".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountsConfig {
    /// Mount table to read.
    pub table: PathBuf,
    /// Mount sources (first mount-table field) that belong to the driver.
    pub sources: Vec<String>,
}

impl Default for MountsConfig {
    fn default() -> Self {
        Self {
            table: PathBuf::from("/proc/mounts"),
            sources: vec!["irodsfs".to_string()],
        }
    }
}

impl PodwatchConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: PodwatchConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the config for a run.
    ///
    /// An explicitly named file must exist. Without one, the default path is
    /// used when present and built-in defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> ConfigResult<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.is_file() {
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.kubectl.timeout()?;
        if self.thresholds.warn > self.thresholds.crit {
            return Err(ConfigError::InvalidThresholds {
                warn: self.thresholds.warn,
                crit: self.thresholds.crit,
            });
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
