//! HTTP implementation of the `RemoteService` port.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use runway_common::{ConfigurationVersion, Run, RunAction, RunCreate, Workspace};
use serde::de::DeserializeOwned;

use crate::application::ports::RemoteService;
use crate::domain::{ConfigSnapshot, RemoteError};
use crate::infra::config_loader::pack_snapshot;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Talks JSON to `https://<hostname>/api/v2` with a bearer token.
pub struct HttpRemote {
    client: Client,
    hostname: String,
    organization: String,
    token: Option<String>,
}

impl HttpRemote {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(hostname: &str, organization: &str, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("runway/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("cannot build HTTP client")?;
        Ok(Self {
            client,
            hostname: hostname.trim_end_matches('/').to_string(),
            organization: organization.to_string(),
            token,
        })
    }

    fn api(&self, path: &str) -> String {
        format!("{}{path}", api_base(&self.hostname))
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn action(
        &self,
        run_id: &str,
        action: &str,
        comment: Option<&str>,
    ) -> Result<(), RemoteError> {
        let body = RunAction {
            comment: comment.map(str::to_string),
        };
        let url = self.api(&format!("/runs/{run_id}/actions/{action}"));
        tracing::debug!(run = %run_id, action, "run action");
        send_empty(self.request(Method::POST, &url).json(&body)).await
    }
}

fn api_base(hostname: &str) -> String {
    if hostname.starts_with("http://") || hostname.starts_with("https://") {
        format!("{hostname}/api/v2")
    } else {
        format!("https://{hostname}/api/v2")
    }
}

/// Maps a non-success HTTP status onto the adapter error taxonomy.
fn status_error(status: StatusCode, body: &str) -> RemoteError {
    let detail = if body.is_empty() {
        status.to_string()
    } else {
        format!("{status}: {body}")
    };
    match status.as_u16() {
        401 | 403 => RemoteError::PermissionDenied(detail),
        404 => RemoteError::NotFound(detail),
        409 => RemoteError::Conflict(detail),
        s if s >= 500 => RemoteError::Unavailable(detail),
        _ => RemoteError::Rejected(detail),
    }
}

async fn send(builder: RequestBuilder) -> Result<reqwest::Response, RemoteError> {
    let response = builder
        .send()
        .await
        .map_err(|e| RemoteError::Unavailable(e.to_string()))?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, body.trim()))
}

async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, RemoteError> {
    send(builder)
        .await?
        .json::<T>()
        .await
        .map_err(|e| RemoteError::Rejected(format!("unexpected response body: {e}")))
}

async fn send_empty(builder: RequestBuilder) -> Result<(), RemoteError> {
    send(builder).await.map(|_| ())
}

impl RemoteService for HttpRemote {
    async fn read_workspace(&self, name: &str) -> Result<Workspace, RemoteError> {
        let url = self.api(&format!(
            "/organizations/{}/workspaces/{name}",
            self.organization
        ));
        send_json(self.request(Method::GET, &url)).await
    }

    async fn create_configuration_version(
        &self,
        workspace_id: &str,
    ) -> Result<ConfigurationVersion, RemoteError> {
        let url = self.api(&format!("/workspaces/{workspace_id}/configuration-versions"));
        send_json(
            self.request(Method::POST, &url)
                .json(&serde_json::json!({ "auto_queue_runs": false })),
        )
        .await
    }

    async fn upload_configuration(
        &self,
        version: &ConfigurationVersion,
        snapshot: &ConfigSnapshot,
    ) -> Result<(), RemoteError> {
        let owned = snapshot.clone();
        let archive = tokio::task::spawn_blocking(move || pack_snapshot(&owned))
            .await
            .map_err(|e| RemoteError::Rejected(format!("packaging task failed: {e}")))?
            .map_err(|e| RemoteError::Rejected(format!("cannot package configuration: {e:#}")))?;
        tracing::debug!(bytes = archive.len(), "uploading configuration archive");
        send_empty(
            self.client
                .put(&version.upload_url)
                .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
                .body(archive),
        )
        .await
    }

    async fn create_run(&self, run: &RunCreate) -> Result<Run, RemoteError> {
        send_json(self.request(Method::POST, &self.api("/runs")).json(run)).await
    }

    async fn read_run(&self, run_id: &str) -> Result<Run, RemoteError> {
        send_json(self.request(Method::GET, &self.api(&format!("/runs/{run_id}")))).await
    }

    async fn apply_run(&self, run_id: &str, comment: Option<&str>) -> Result<(), RemoteError> {
        self.action(run_id, "apply", comment).await
    }

    async fn discard_run(&self, run_id: &str, comment: Option<&str>) -> Result<(), RemoteError> {
        self.action(run_id, "discard", comment).await
    }

    async fn cancel_run(&self, run_id: &str, comment: Option<&str>) -> Result<(), RemoteError> {
        self.action(run_id, "cancel", comment).await
    }

    async fn override_policy(&self, run_id: &str) -> Result<(), RemoteError> {
        self.action(run_id, "override-policy", None).await
    }

    fn run_url(&self, workspace: &str, run_id: &str) -> String {
        let host = self
            .hostname
            .trim_start_matches("https://")
            .trim_start_matches("http://");
        format!(
            "https://{host}/app/{}/workspaces/{workspace}/runs/{run_id}",
            self.organization
        )
    }
}
