//! Device API client.
//!
//! Object CRUD goes through the device's REST API and is addressed by
//! endpoint path plus container query parameters. Operational commands,
//! commits, and key generation go through the XML API at `/api/`.
//!
//! The [`DeviceClient`] trait is the seam the reconcile and commit cores
//! consume; [`HttpDeviceClient`] is the real implementation. Status codes
//! are surfaced as values: 404 means the object does not exist, 2xx means
//! success, anything else is an operation failure for the caller to tag.

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::DeviceConfig;
use crate::error::ApiError;
use crate::object::{Container, ObjectIdentity};
use crate::xml::{command_to_xml, ResponseDocument};
use crate::NOT_FOUND;

/// Request surface of the device API.
#[async_trait]
pub trait DeviceClient: Send + Sync {
    /// Fetch one object by identity. `(404, None)` means the object does
    /// not exist; that is a valid outcome, not an error.
    async fn get(
        &self,
        endpoint: &str,
        identity: &ObjectIdentity,
    ) -> Result<(u16, Option<Value>), ApiError>;

    /// Create an object. `payload` is the entry document.
    async fn create(
        &self,
        endpoint: &str,
        identity: &ObjectIdentity,
        payload: &Value,
    ) -> Result<u16, ApiError>;

    /// Replace an existing object with `payload`.
    async fn edit(
        &self,
        endpoint: &str,
        identity: &ObjectIdentity,
        payload: &Value,
    ) -> Result<u16, ApiError>;

    /// Delete an object.
    async fn delete(&self, endpoint: &str, identity: &ObjectIdentity) -> Result<u16, ApiError>;

    /// Fetch every object at `endpoint` within a container.
    async fn list(
        &self,
        endpoint: &str,
        container: &Container,
    ) -> Result<(u16, Option<Value>), ApiError>;

    /// Run an operational command. `cmd` is either a CLI-style string or,
    /// when `cmd_is_xml` is set, already in XML form.
    async fn op(&self, cmd: &str, cmd_is_xml: bool) -> Result<ResponseDocument, ApiError>;

    /// Submit a commit of the candidate configuration, optionally scoped to
    /// changes made by the given administrators (order preserved).
    async fn commit(&self, admins: Option<&[String]>) -> Result<ResponseDocument, ApiError>;
}

/// Device software and platform information.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub sw_version: String,
    pub model: String,
    pub serial: String,
    pub multi_vsys: bool,
}

impl DeviceInfo {
    /// Whether the connected device is a Panorama instance.
    pub fn is_panorama(&self) -> bool {
        self.model == "Panorama"
    }
}

/// HTTP implementation of [`DeviceClient`].
pub struct HttpDeviceClient {
    client: reqwest::Client,
    base_url: String,
    api_key: RwLock<Option<String>>,
}

impl HttpDeviceClient {
    /// Create a client from configuration.
    pub fn new(config: &DeviceConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: RwLock::new(config.api_key.clone()),
        })
    }

    /// The API key in use, if any.
    pub fn api_key(&self) -> Option<String> {
        self.api_key.read().ok().and_then(|key| key.clone())
    }

    /// Generate an API key for the given user and store it for further
    /// requests.
    pub async fn keygen(&self, username: &str, password: &str) -> Result<String, ApiError> {
        debug!(username, "generating api key");

        let doc = self
            .xml_api(&[
                ("type", "keygen"),
                ("user", username),
                ("password", password),
            ])
            .await?;

        let key = doc
            .text(&["response", "result", "key"])
            .ok_or_else(|| ApiError::Auth("no key in keygen response".to_string()))?
            .to_string();

        if let Ok(mut stored) = self.api_key.write() {
            *stored = Some(key.clone());
        }
        Ok(key)
    }

    /// Retrieve device software version, model, and serial number.
    pub async fn version(&self) -> Result<DeviceInfo, ApiError> {
        let doc = self.xml_api(&[("type", "version")]).await?;

        let field = |name: &str, missing: &'static str| {
            doc.text(&["response", "result", name])
                .map(str::to_string)
                .ok_or(ApiError::MissingField(missing))
        };

        Ok(DeviceInfo {
            sw_version: field("sw-version", "response/result/sw-version")?,
            model: field("model", "response/result/model")?,
            serial: field("serial", "response/result/serial")?,
            multi_vsys: doc.text(&["response", "result", "multi-vsys"]) == Some("on"),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn object_params<'a>(&self, identity: &'a ObjectIdentity) -> Vec<(&'static str, &'a str)> {
        let mut params = identity.container().query_params();
        params.push(("name", identity.name()));
        params
    }

    fn apply_key(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.api_key() {
            Some(key) => request.header("X-PAN-KEY", key),
            None => request,
        }
    }

    /// POST to the XML API and parse the response document.
    async fn xml_api(&self, params: &[(&str, &str)]) -> Result<ResponseDocument, ApiError> {
        let request = self.client.post(self.url("/api/")).form(params);
        let response = self.apply_key(request).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Connection(format!(
                "XML API returned {status}: {body}"
            )));
        }

        ResponseDocument::parse(body)
    }

    /// Issue a REST request and return `(status, parsed JSON body)`.
    async fn rest_request(
        &self,
        method: reqwest::Method,
        endpoint: &str,
        params: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<(u16, Option<Value>), ApiError> {
        debug!(method = %method, endpoint, "device REST request");

        let mut request = self
            .client
            .request(method, self.url(endpoint))
            .query(params);

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = self.apply_key(request).send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        let parsed = serde_json::from_str(&text).ok();

        debug!(status, endpoint, "device REST response");
        Ok((status, parsed))
    }
}

#[async_trait]
impl DeviceClient for HttpDeviceClient {
    async fn get(
        &self,
        endpoint: &str,
        identity: &ObjectIdentity,
    ) -> Result<(u16, Option<Value>), ApiError> {
        let params = self.object_params(identity);
        let (status, body) = self
            .rest_request(reqwest::Method::GET, endpoint, &params, None)
            .await?;

        if status == NOT_FOUND {
            return Ok((status, None));
        }
        Ok((status, body))
    }

    async fn create(
        &self,
        endpoint: &str,
        identity: &ObjectIdentity,
        payload: &Value,
    ) -> Result<u16, ApiError> {
        let params = self.object_params(identity);
        let body = json!({ "entry": payload });
        let (status, _) = self
            .rest_request(reqwest::Method::POST, endpoint, &params, Some(&body))
            .await?;
        Ok(status)
    }

    async fn edit(
        &self,
        endpoint: &str,
        identity: &ObjectIdentity,
        payload: &Value,
    ) -> Result<u16, ApiError> {
        let params = self.object_params(identity);
        let body = json!({ "entry": payload });
        let (status, _) = self
            .rest_request(reqwest::Method::PUT, endpoint, &params, Some(&body))
            .await?;
        Ok(status)
    }

    async fn delete(&self, endpoint: &str, identity: &ObjectIdentity) -> Result<u16, ApiError> {
        let params = self.object_params(identity);
        let (status, _) = self
            .rest_request(reqwest::Method::DELETE, endpoint, &params, None)
            .await?;
        Ok(status)
    }

    async fn list(
        &self,
        endpoint: &str,
        container: &Container,
    ) -> Result<(u16, Option<Value>), ApiError> {
        let params = container.query_params();
        self.rest_request(reqwest::Method::GET, endpoint, &params, None)
            .await
    }

    async fn op(&self, cmd: &str, cmd_is_xml: bool) -> Result<ResponseDocument, ApiError> {
        let xml_cmd = if cmd_is_xml {
            cmd.to_string()
        } else {
            command_to_xml(cmd)
        };

        debug!(cmd = %xml_cmd, "operational command");
        self.xml_api(&[("type", "op"), ("cmd", &xml_cmd)]).await
    }

    async fn commit(&self, admins: Option<&[String]>) -> Result<ResponseDocument, ApiError> {
        let cmd = commit_cmd(admins);
        debug!(cmd = %cmd, "submitting commit");
        self.xml_api(&[("type", "commit"), ("cmd", &cmd)]).await
    }
}

/// Build the commit command document, scoped to `admins` when given.
fn commit_cmd(admins: Option<&[String]>) -> String {
    match admins {
        Some(admins) if !admins.is_empty() => {
            let members: String = admins
                .iter()
                .map(|admin| format!("<member>{admin}</member>"))
                .collect();
            format!("<commit><partial><admin>{members}</admin></partial></commit>")
        }
        _ => "<commit/>".to_string(),
    }
}
