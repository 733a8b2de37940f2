//! Taskbridge HTTP Client
//!
//! A small, type-safe client for reporting task outcomes back to Azure DevOps
//! through the distributed task events API.
//!
//! # Example
//!
//! ```no_run
//! use taskbridge_client::{CallbackClient, CallbackTarget};
//! use taskbridge_core::domain::request::InboundRequest;
//! use taskbridge_core::domain::task::TaskOutcome;
//!
//! # async fn example(request: InboundRequest) -> taskbridge_client::Result<()> {
//! let target = CallbackTarget::new("dev.azure.com", "myorg", "7.1-preview.3", "ado-callback");
//! let client = CallbackClient::new(target);
//!
//! let body = client
//!     .report_task_completed(&request, TaskOutcome::Succeeded)
//!     .await?;
//! println!("Callback accepted: {}", body);
//! # Ok(())
//! # }
//! ```

pub mod error;
mod events;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use taskbridge_core::dto::callback::TaskCompletedEvent;

use reqwest::Client;
use taskbridge_core::domain::request::InboundRequest;

/// Where callbacks are sent
///
/// Holds the organization-level base URL plus the API version appended to
/// every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackTarget {
    /// Organization base URL (e.g., "https://dev.azure.com/myorg")
    base_url: String,
    /// API version query parameter
    api_version: String,
    /// Basic-auth username; the events API ignores it for bearer tokens
    auth_username: String,
}

impl CallbackTarget {
    /// Create a target for an Azure DevOps organization over HTTPS
    ///
    /// # Arguments
    /// * `domain` - The Azure DevOps domain (e.g., "dev.azure.com")
    /// * `organization` - The organization name
    /// * `api_version` - The REST API version (e.g., "7.1-preview.3")
    /// * `auth_username` - Username carried for basic-auth setups
    pub fn new(
        domain: impl AsRef<str>,
        organization: impl AsRef<str>,
        api_version: impl Into<String>,
        auth_username: impl Into<String>,
    ) -> Self {
        let base_url = format!(
            "https://{}/{}",
            domain.as_ref().trim_end_matches('/'),
            organization.as_ref().trim_matches('/')
        );
        Self::with_base_url(base_url, api_version, auth_username)
    }

    /// Create a target from an explicit organization base URL
    ///
    /// Useful for Azure DevOps Server installations or local test servers.
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_version: impl Into<String>,
        auth_username: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_version: api_version.into(),
            auth_username: auth_username.into(),
        }
    }

    /// Get the organization base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the API version
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Get the configured auth username
    pub fn auth_username(&self) -> &str {
        &self.auth_username
    }

    /// Build the plan events URL for a request
    ///
    /// See <https://learn.microsoft.com/en-us/rest/api/azure/devops/distributedtask/events/post-event>
    pub fn events_url(&self, request: &InboundRequest) -> String {
        format!(
            "{}/{}/_apis/distributedtask/hubs/{}/plans/{}/events?api-version={}",
            self.base_url, request.project_id, request.hub_name, request.plan_id, self.api_version
        )
    }
}

/// HTTP client for the Azure DevOps callback API
#[derive(Debug, Clone)]
pub struct CallbackClient {
    target: CallbackTarget,
    /// HTTP client instance
    client: Client,
}

impl CallbackClient {
    /// Create a new callback client
    pub fn new(target: CallbackTarget) -> Self {
        Self {
            target,
            client: Client::new(),
        }
    }

    /// Create a new callback client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use taskbridge_client::{CallbackClient, CallbackTarget};
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let target = CallbackTarget::new("dev.azure.com", "myorg", "7.1-preview.3", "ado-callback");
    /// let client = CallbackClient::with_client(target, http_client);
    /// ```
    pub fn with_client(target: CallbackTarget, client: Client) -> Self {
        Self { target, client }
    }

    /// Get the callback target
    pub fn target(&self) -> &CallbackTarget {
        &self.target
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and return its raw body
    ///
    /// Any status in 200..=399 counts as accepted.
    async fn handle_text_response(&self, response: reqwest::Response) -> Result<String> {
        let status = response.status();

        if !(status.is_success() || status.is_redirection()) {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response.text().await.map_err(ClientError::ResponseBody)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> InboundRequest {
        InboundRequest {
            plan_url: "https://dev.azure.com/myorg/".to_string(),
            plan_id: "PLAN1".to_string(),
            project_id: "P1".to_string(),
            hub_name: "build".to_string(),
            job_id: "JOB1".to_string(),
            timeline_id: "TL1".to_string(),
            task_instance_id: "TASK1".to_string(),
            auth_token: "abc123".to_string(),
        }
    }

    #[test]
    fn test_events_url() {
        let target = CallbackTarget::new("dev.azure.com", "myorg", "7.1-preview.3", "ado-callback");
        assert_eq!(
            target.events_url(&request()),
            "https://dev.azure.com/myorg/P1/_apis/distributedtask/hubs/build/plans/PLAN1/events?api-version=7.1-preview.3"
        );
    }

    #[test]
    fn test_target_trims_slashes() {
        let target = CallbackTarget::new("dev.azure.com/", "/myorg/", "7.1", "ado-callback");
        assert_eq!(target.base_url(), "https://dev.azure.com/myorg");

        let target = CallbackTarget::with_base_url("http://127.0.0.1:8080/myorg/", "7.1", "u");
        assert_eq!(target.base_url(), "http://127.0.0.1:8080/myorg");
    }

    #[test]
    fn test_client_with_custom_client() {
        let target = CallbackTarget::new("dev.azure.com", "myorg", "7.1-preview.3", "ado-callback");
        let client = CallbackClient::with_client(target.clone(), Client::new());
        assert_eq!(client.target(), &target);
        assert_eq!(client.target().auth_username(), "ado-callback");
    }
}
