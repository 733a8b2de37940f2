//! Runner configuration
//!
//! Everything the runner needs to launch tasks and send callbacks is read
//! once from the environment at cold start and shared read-only by every
//! invocation handled by the process.

use std::time::Duration;

use taskbridge_client::CallbackTarget;

const DEFAULT_ADO_DOMAIN: &str = "dev.azure.com";
const DEFAULT_ADO_API_VERSION: &str = "7.1-preview.3";
const DEFAULT_ADO_AUTH_USERNAME: &str = "ado-callback";
const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;
const DEFAULT_CALLBACK_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DEADLINE_MARGIN_MS: u64 = 500;

/// ECS task launch settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskConfig {
    /// The cluster name
    pub cluster: String,

    /// The family and revision (`family:revision`) or full ARN of the task
    /// definition. Without a revision the latest ACTIVE one is used.
    pub task_definition: String,

    /// Subnet IDs for the awsvpc network configuration
    pub subnets: Vec<String>,

    /// Security group IDs for the awsvpc network configuration
    pub security_groups: Vec<String>,
}

/// Azure DevOps callback settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackConfig {
    /// The Azure DevOps domain (e.g., "dev.azure.com")
    pub domain: String,

    /// The Azure DevOps organization
    pub organization: String,

    /// REST API version sent as `api-version`
    pub api_version: String,

    /// Basic-auth username. The bearer callback does not use it.
    pub auth_username: String,
}

impl CallbackConfig {
    /// Builds the client target for this organization
    pub fn target(&self) -> CallbackTarget {
        CallbackTarget::new(
            &self.domain,
            &self.organization,
            self.api_version.clone(),
            self.auth_username.clone(),
        )
    }
}

/// Runner configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub task: TaskConfig,

    pub callback: CallbackConfig,

    /// Wait between two task status queries
    pub poll_interval: Duration,

    /// Request timeout for the callback HTTP client
    pub callback_timeout: Duration,

    /// How long before the invocation deadline in-flight work is cancelled
    pub deadline_margin: Duration,
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - ECS_CLUSTER (required)
    /// - ECS_TASK_DEFINITION (required)
    /// - SUBNET_IDS (required, comma-separated)
    /// - SECURITY_GROUP_IDS (required, comma-separated)
    /// - ADO_ORG (required)
    /// - ADO_DOMAIN (optional, default: dev.azure.com)
    /// - ADO_API_VERSION (optional, default: 7.1-preview.3)
    /// - ADO_AUTH_USERNAME (optional, default: ado-callback)
    /// - POLL_INTERVAL_MS (optional, default: 1000)
    /// - CALLBACK_TIMEOUT_SECS (optional, default: 30)
    /// - DEADLINE_MARGIN_MS (optional, default: 500)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Creates configuration from an arbitrary variable lookup
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());
        let required = |name: &str| {
            get(name).ok_or_else(|| {
                anyhow::anyhow!("missing required environment variable {}", name)
            })
        };
        let duration = |name: &str, default: u64, unit: fn(u64) -> Duration| {
            match get(name) {
                Some(v) => v.parse::<u64>().map(unit).map_err(|_| {
                    anyhow::anyhow!("{} must be a whole number, got '{}'", name, v)
                }),
                None => Ok(unit(default)),
            }
        };

        let task = TaskConfig {
            cluster: required("ECS_CLUSTER")?,
            task_definition: required("ECS_TASK_DEFINITION")?,
            subnets: split_list(&required("SUBNET_IDS")?),
            security_groups: split_list(&required("SECURITY_GROUP_IDS")?),
        };

        let callback = CallbackConfig {
            domain: get("ADO_DOMAIN").unwrap_or_else(|| DEFAULT_ADO_DOMAIN.to_string()),
            organization: required("ADO_ORG")?,
            api_version: get("ADO_API_VERSION")
                .unwrap_or_else(|| DEFAULT_ADO_API_VERSION.to_string()),
            auth_username: get("ADO_AUTH_USERNAME")
                .unwrap_or_else(|| DEFAULT_ADO_AUTH_USERNAME.to_string()),
        };

        let poll_interval = duration(
            "POLL_INTERVAL_MS",
            DEFAULT_POLL_INTERVAL_MS,
            Duration::from_millis,
        )?;
        let callback_timeout = duration(
            "CALLBACK_TIMEOUT_SECS",
            DEFAULT_CALLBACK_TIMEOUT_SECS,
            Duration::from_secs,
        )?;
        let deadline_margin = duration(
            "DEADLINE_MARGIN_MS",
            DEFAULT_DEADLINE_MARGIN_MS,
            Duration::from_millis,
        )?;

        Ok(Self {
            task,
            callback,
            poll_interval,
            callback_timeout,
            deadline_margin,
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.task.subnets.is_empty() {
            anyhow::bail!("SUBNET_IDS must contain at least one subnet ID");
        }

        if self.task.security_groups.is_empty() {
            anyhow::bail!("SECURITY_GROUP_IDS must contain at least one security group ID");
        }

        if self.callback.domain.contains("://") {
            anyhow::bail!("ADO_DOMAIN must be a bare host name, without a scheme");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.callback_timeout.is_zero() {
            anyhow::bail!("callback_timeout must be greater than 0");
        }

        Ok(())
    }
}

/// Splits a comma-separated list, trimming entries and dropping empty ones
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
