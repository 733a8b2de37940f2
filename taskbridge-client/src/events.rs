//! Distributed task event endpoints

use crate::CallbackClient;
use crate::error::Result;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use taskbridge_core::domain::request::InboundRequest;
use taskbridge_core::domain::task::TaskOutcome;
use taskbridge_core::dto::callback::TaskCompletedEvent;
use tracing::debug;

impl CallbackClient {
    // =============================================================================
    // Plan Events
    // =============================================================================

    /// Report a completed task to the plan that requested it
    ///
    /// Posts a `TaskCompleted` event authenticated with the job access token
    /// carried by the request.
    ///
    /// # Arguments
    /// * `request` - The inbound request that triggered the task
    /// * `outcome` - The task outcome to report
    ///
    /// # Returns
    /// The raw response body
    pub async fn report_task_completed(
        &self,
        request: &InboundRequest,
        outcome: TaskOutcome,
    ) -> Result<String> {
        let event = TaskCompletedEvent::new(request, outcome);
        let body = serde_json::to_vec(&event)?;

        let url = self.target.events_url(request);
        debug!(
            "Posting {} event for job {} to {}",
            event.name, event.job_id, url
        );

        let response = self
            .client
            .post(&url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", request.auth_token))
            .body(body)
            .send()
            .await?;

        self.handle_text_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use crate::{CallbackClient, CallbackTarget, ClientError};
    use axum::Router;
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode, Uri};
    use axum::routing::post;
    use std::sync::{Arc, Mutex};
    use taskbridge_core::domain::request::InboundRequest;
    use taskbridge_core::domain::task::TaskOutcome;

    #[derive(Debug, Clone)]
    struct Captured {
        path: String,
        query: Option<String>,
        accept: Option<String>,
        authorization: Option<String>,
        body: serde_json::Value,
    }

    #[derive(Clone)]
    struct ServerState {
        status: StatusCode,
        captured: Arc<Mutex<Option<Captured>>>,
    }

    async fn capture(
        State(state): State<ServerState>,
        uri: Uri,
        headers: HeaderMap,
        body: String,
    ) -> (StatusCode, String) {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        *state.captured.lock().unwrap() = Some(Captured {
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            accept: header("accept"),
            authorization: header("authorization"),
            body: serde_json::from_str(&body).unwrap_or(serde_json::Value::Null),
        });

        let reply = if state.status.is_success() {
            r#"{"ok":true}"#
        } else {
            "internal failure"
        };
        (state.status, reply.to_string())
    }

    /// Starts a server answering every POST with `status`; returns its base URL
    async fn spawn_server(status: StatusCode) -> (String, Arc<Mutex<Option<Captured>>>) {
        let captured = Arc::new(Mutex::new(None));
        let state = ServerState {
            status,
            captured: Arc::clone(&captured),
        };

        let app = Router::new()
            .route("/{*path}", post(capture))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), captured)
    }

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

    fn client_for(base_url: &str) -> CallbackClient {
        let target = CallbackTarget::with_base_url(
            format!("{}/myorg", base_url),
            "7.1-preview.3",
            "ado-callback",
        );
        CallbackClient::new(target)
    }

    #[tokio::test]
    async fn test_report_sends_event_with_bearer_token() {
        let (base_url, captured) = spawn_server(StatusCode::OK).await;
        let client = client_for(&base_url);

        let body = client
            .report_task_completed(&request(), TaskOutcome::Succeeded)
            .await
            .unwrap();
        assert_eq!(body, r#"{"ok":true}"#);

        let captured = captured.lock().unwrap().clone().unwrap();
        assert_eq!(
            captured.path,
            "/myorg/P1/_apis/distributedtask/hubs/build/plans/PLAN1/events"
        );
        assert_eq!(captured.query.as_deref(), Some("api-version=7.1-preview.3"));
        assert_eq!(captured.accept.as_deref(), Some("application/json"));
        assert_eq!(captured.authorization.as_deref(), Some("Bearer abc123"));
        assert_eq!(
            captured.body,
            serde_json::json!({
                "name": "TaskCompleted",
                "jobId": "JOB1",
                "taskId": "TASK1",
                "result": "succeeded"
            })
        );
    }

    #[tokio::test]
    async fn test_report_failed_outcome() {
        let (base_url, captured) = spawn_server(StatusCode::ACCEPTED).await;
        let client = client_for(&base_url);

        let body = client
            .report_task_completed(&request(), TaskOutcome::Failed)
            .await
            .unwrap();
        assert_eq!(body, r#"{"ok":true}"#);

        let captured = captured.lock().unwrap().clone().unwrap();
        assert_eq!(captured.body["result"], "failed");
    }

    #[tokio::test]
    async fn test_report_rejected_with_server_error() {
        let (base_url, _captured) = spawn_server(StatusCode::INTERNAL_SERVER_ERROR).await;
        let client = client_for(&base_url);

        let err = client
            .report_task_completed(&request(), TaskOutcome::Succeeded)
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert!(err.is_server_error());
        assert!(matches!(err, ClientError::ApiError { ref message, .. } if message == "internal failure"));
    }

    #[tokio::test]
    async fn test_report_rejected_with_client_error() {
        let (base_url, _captured) = spawn_server(StatusCode::UNAUTHORIZED).await;
        let client = client_for(&base_url);

        let err = client
            .report_task_completed(&request(), TaskOutcome::Succeeded)
            .await
            .unwrap_err();

        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_report_transport_failure() {
        // Bind then drop to get a port with nothing listening
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(&format!("http://{}", addr));
        let err = client
            .report_task_completed(&request(), TaskOutcome::Succeeded)
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::RequestFailed(_)));
        assert_eq!(err.status(), None);
    }
}
