//! Callbacks repository
//!
//! Reports task outcomes to Azure DevOps through the callback client.

use async_trait::async_trait;
use taskbridge_client::CallbackClient;
use taskbridge_core::domain::request::InboundRequest;
use taskbridge_core::domain::task::TaskOutcome;

/// Repository trait for outcome callbacks
#[async_trait]
pub trait CallbackRepository: Send + Sync {
    /// Reports the outcome of the task launched for `request`
    ///
    /// # Returns
    /// The raw response body of the upstream system
    async fn report(
        &self,
        request: &InboundRequest,
        outcome: TaskOutcome,
    ) -> taskbridge_client::Result<String>;
}

/// HTTP implementation of CallbackRepository
pub struct HttpCallbackRepository {
    client: CallbackClient,
}

impl HttpCallbackRepository {
    pub fn new(client: CallbackClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CallbackRepository for HttpCallbackRepository {
    async fn report(
        &self,
        request: &InboundRequest,
        outcome: TaskOutcome,
    ) -> taskbridge_client::Result<String> {
        self.client.report_task_completed(request, outcome).await
    }
}
