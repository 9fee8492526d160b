//! Compute Engine REST client implementing the compute ports.

use anyhow::{Context, Result};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::application::ports::{
    ImageSpec, ImageStore, InstanceInspector, InstanceLifecycle, InstanceSpec, OperationTracker,
    ServiceUsage,
};
use crate::domain::{Image, Instance, Operation, OperationHandle, OperationScope};

/// Public API root.
pub const DEFAULT_ENDPOINT: &str = "https://compute.googleapis.com/compute/v1";

/// Environment variable overriding the API root (used by tests and emulators).
pub const ENDPOINT_ENV: &str = "VMLC_COMPUTE_ENDPOINT";

/// Service Usage API root, used to check which APIs a project has enabled.
pub const DEFAULT_SERVICE_USAGE_ENDPOINT: &str = "https://serviceusage.googleapis.com/v1";

/// Environment variable overriding the Service Usage API root.
pub const SERVICE_USAGE_ENDPOINT_ENV: &str = "VMLC_SERVICE_USAGE_ENDPOINT";

/// Project-scoped Compute Engine client.
pub struct GceClient {
    http: reqwest::Client,
    endpoint: String,
    service_usage_endpoint: String,
    project: String,
    token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListPage<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServicesPage {
    #[serde(default = "Vec::new")]
    services: Vec<ServiceEntry>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct ServiceEntry {
    name: String,
    config: Option<ServiceConfig>,
}

#[derive(Deserialize)]
struct ServiceConfig {
    name: String,
}

impl ServiceEntry {
    /// `config.name` when present, else the last segment of
    /// `projects/<number>/services/<name>`.
    fn service_name(&self) -> &str {
        match &self.config {
            Some(config) if !config.name.is_empty() => config.name.as_str(),
            _ => self.name.rsplit('/').next().unwrap_or(&self.name),
        }
    }
}

impl GceClient {
    /// Build a client for `project`, reading the endpoint override from the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(project: &str, token: String) -> Result<Self> {
        let endpoint = std::env::var(ENDPOINT_ENV).unwrap_or_else(|_| DEFAULT_ENDPOINT.to_owned());
        let mut client = Self::with_endpoint(&endpoint, project, token)?;
        if let Ok(service_usage) = std::env::var(SERVICE_USAGE_ENDPOINT_ENV) {
            client.service_usage_endpoint = service_usage.trim_end_matches('/').to_owned();
        }
        Ok(client)
    }

    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_endpoint(endpoint: &str, project: &str, token: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("vmlc/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .context("cannot build HTTP client")?;
        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            service_usage_endpoint: DEFAULT_SERVICE_USAGE_ENDPOINT.to_owned(),
            project: project.to_owned(),
            token,
        })
    }

    fn project_url(&self, path: &str) -> String {
        format!("{}/projects/{}/{path}", self.endpoint, self.project)
    }

    /// Send a request; `Ok(None)` on 404.
    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Option<T>> {
        tracing::debug!(%method, url, "compute api request");
        let mut request = self
            .http
            .request(method.clone(), url)
            .bearer_auth(&self.token)
            .query(query);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request
            .send()
            .await
            .with_context(|| format!("{method} {url} failed"))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("{}", api_error_message(status, &text));
        }
        let parsed = response
            .json::<T>()
            .await
            .with_context(|| format!("cannot parse response of {method} {url}"))?;
        Ok(Some(parsed))
    }

    /// Like `send`, but a 404 is an error.
    async fn require<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<T> {
        self.send(method, url, &[], body)
            .await?
            .ok_or_else(|| anyhow::anyhow!("resource not found: {url}"))
    }

    async fn list_all<T: DeserializeOwned>(
        &self,
        url: &str,
        filter: Option<&str>,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut query: Vec<(&str, &str)> = Vec::new();
            if let Some(filter) = filter {
                query.push(("filter", filter));
            }
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }
            let Some(page) = self.send::<ListPage<T>>(Method::GET, url, &query, None).await?
            else {
                return Ok(items);
            };
            items.extend(page.items);
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => return Ok(items),
            }
        }
    }
}

/// Best message from an API error body.
///
/// Google APIs answer `{"error": {"code": .., "message": ..}}`; anything else
/// falls back to the raw body.
fn api_error_message(status: StatusCode, body: &str) -> String {
    let message = serde_json::from_str::<Value>(body).ok().and_then(|v| {
        v.get("error")
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
            .map(str::to_owned)
    });
    match message {
        Some(message) => format!("{message} (HTTP {})", status.as_u16()),
        None if body.trim().is_empty() => format!("HTTP {status}"),
        None => format!("HTTP {status}: {}", body.trim()),
    }
}

/// Request body for `instances.insert`.
fn instance_body(spec: &InstanceSpec<'_>) -> Value {
    let mut body = json!({
        "name": spec.name,
        "machineType": format!("zones/{}/machineTypes/{}", spec.zone, spec.machine_type),
        "disks": [{
            "boot": true,
            "autoDelete": true,
            "initializeParams": {
                "sourceImage": spec.source_image,
                "diskSizeGb": spec.disk_size_gb.to_string(),
                "diskType": format!("zones/{}/diskTypes/pd-balanced", spec.zone),
            }
        }],
        "networkInterfaces": [{
            "network": "global/networks/default",
            "accessConfigs": [{
                "name": "External NAT",
                "type": "ONE_TO_ONE_NAT",
                "networkTier": "STANDARD",
            }]
        }],
    });
    if let Some(script) = spec.startup_script {
        body["metadata"] = json!({
            "items": [{"key": "startup-script", "value": script}]
        });
    }
    body
}

fn image_body(spec: &ImageSpec<'_>) -> Value {
    let mut body = json!({
        "name": spec.name,
        "sourceDisk": spec.source_disk,
    });
    if let Some(family) = spec.family {
        body["family"] = json!(family);
    }
    body
}

fn operation_path(handle: &OperationHandle) -> String {
    match handle.scope() {
        OperationScope::Zone(zone) => format!("zones/{zone}/operations/{}", handle.name()),
        OperationScope::Global => format!("global/operations/{}", handle.name()),
    }
}

impl InstanceLifecycle for GceClient {
    async fn insert_instance(&self, spec: &InstanceSpec<'_>) -> Result<Operation> {
        let url = self.project_url(&format!("zones/{}/instances", spec.zone));
        self.require(Method::POST, &url, Some(&instance_body(spec)))
            .await
    }

    async fn start_instance(&self, name: &str, zone: &str) -> Result<Operation> {
        let url = self.project_url(&format!("zones/{zone}/instances/{name}/start"));
        self.require(Method::POST, &url, None).await
    }

    async fn stop_instance(&self, name: &str, zone: &str) -> Result<Operation> {
        let url = self.project_url(&format!("zones/{zone}/instances/{name}/stop"));
        self.require(Method::POST, &url, None).await
    }

    async fn delete_instance(&self, name: &str, zone: &str) -> Result<Operation> {
        let url = self.project_url(&format!("zones/{zone}/instances/{name}"));
        self.require(Method::DELETE, &url, None).await
    }
}

impl InstanceInspector for GceClient {
    async fn list_instances(&self, zone: &str) -> Result<Vec<Instance>> {
        let url = self.project_url(&format!("zones/{zone}/instances"));
        self.list_all(&url, None).await
    }

    async fn get_instance(&self, name: &str, zone: &str) -> Result<Option<Instance>> {
        let url = self.project_url(&format!("zones/{zone}/instances/{name}"));
        self.send(Method::GET, &url, &[], None).await
    }
}

impl ImageStore for GceClient {
    async fn create_image(&self, spec: &ImageSpec<'_>) -> Result<Operation> {
        let url = self.project_url("global/images");
        self.require(Method::POST, &url, Some(&image_body(spec)))
            .await
    }

    async fn delete_image(&self, name: &str) -> Result<Operation> {
        let url = self.project_url(&format!("global/images/{name}"));
        self.require(Method::DELETE, &url, None).await
    }

    async fn list_images(&self, family: Option<&str>) -> Result<Vec<Image>> {
        let url = self.project_url("global/images");
        let filter = family.map(|f| format!("family = \"{f}\""));
        self.list_all(&url, filter.as_deref()).await
    }

    async fn latest_image(&self, family: &str) -> Result<Option<Image>> {
        let url = self.project_url(&format!("global/images/family/{family}"));
        self.send(Method::GET, &url, &[], None).await
    }
}

impl ServiceUsage for GceClient {
    async fn enabled_services(&self) -> Result<Vec<String>> {
        let url = format!(
            "{}/projects/{}/services",
            self.service_usage_endpoint, self.project
        );
        let mut names = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut query = vec![("filter", "state:ENABLED"), ("pageSize", "200")];
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }
            let page = self
                .send::<ServicesPage>(Method::GET, &url, &query, None)
                .await?
                .ok_or_else(|| anyhow::anyhow!("project '{}' not found", self.project))?;
            names.extend(page.services.iter().map(|s| s.service_name().to_owned()));
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => return Ok(names),
            }
        }
    }
}

impl OperationTracker for GceClient {
    async fn get_operation(&self, handle: &OperationHandle) -> Result<Operation> {
        let url = self.project_url(&operation_path(handle));
        self.require(Method::GET, &url, None).await
    }
}
