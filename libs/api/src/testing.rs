//! Scripted in-memory client for consumer tests.
//!
//! Tests script the device side as an ordered queue of canned responses and
//! assert on the requests the code under test issued, without a network.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::client::DeviceClient;
use crate::error::ApiError;
use crate::object::{Container, ObjectIdentity};
use crate::poller::JobPoller;
use crate::xml::ResponseDocument;
use crate::NOT_FOUND;

/// One canned device response.
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    /// REST-style `(status, body)` pair.
    Rest(u16, Option<Value>),

    /// XML API response text.
    Xml(String),

    /// Simulated transport failure.
    ConnectionFailure(String),
}

impl ScriptedResponse {
    /// REST not-found response.
    pub fn not_found() -> Self {
        ScriptedResponse::Rest(NOT_FOUND, None)
    }

    /// REST success with no body.
    pub fn ok() -> Self {
        ScriptedResponse::Rest(200, None)
    }
}

/// A request served by the scripted client.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedRequest {
    Get {
        endpoint: String,
        name: String,
    },
    Create {
        endpoint: String,
        name: String,
        payload: Value,
    },
    Edit {
        endpoint: String,
        name: String,
        payload: Value,
    },
    Delete {
        endpoint: String,
        name: String,
    },
    List {
        endpoint: String,
        container: Container,
    },
    Op {
        cmd: String,
        cmd_is_xml: bool,
    },
    Commit {
        admins: Option<Vec<String>>,
    },
}

/// [`DeviceClient`] that serves canned responses in order.
#[derive(Debug, Default)]
pub struct ScriptedClient {
    responses: Mutex<VecDeque<ScriptedResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedClient {
    /// Client that will serve `responses` in order.
    pub fn new(responses: Vec<ScriptedResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests served so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    fn record(&self, request: RecordedRequest) {
        self.requests.lock().expect("requests lock").push(request);
    }

    fn next(&self) -> Result<ScriptedResponse, ApiError> {
        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .ok_or_else(|| ApiError::Config("scripted client: response queue exhausted".to_string()))
    }

    fn next_rest(&self) -> Result<(u16, Option<Value>), ApiError> {
        match self.next()? {
            ScriptedResponse::Rest(status, body) => Ok((status, body)),
            ScriptedResponse::ConnectionFailure(msg) => Err(ApiError::Connection(msg)),
            ScriptedResponse::Xml(_) => Err(ApiError::Config(
                "scripted client: expected a REST response, got XML".to_string(),
            )),
        }
    }

    fn next_document(&self) -> Result<ResponseDocument, ApiError> {
        match self.next()? {
            ScriptedResponse::Xml(raw) => ResponseDocument::parse(raw),
            ScriptedResponse::ConnectionFailure(msg) => Err(ApiError::Connection(msg)),
            ScriptedResponse::Rest(..) => Err(ApiError::Config(
                "scripted client: expected an XML response, got REST".to_string(),
            )),
        }
    }
}

#[async_trait]
impl DeviceClient for ScriptedClient {
    async fn get(
        &self,
        endpoint: &str,
        identity: &ObjectIdentity,
    ) -> Result<(u16, Option<Value>), ApiError> {
        self.record(RecordedRequest::Get {
            endpoint: endpoint.to_string(),
            name: identity.name().to_string(),
        });
        self.next_rest()
    }

    async fn create(
        &self,
        endpoint: &str,
        identity: &ObjectIdentity,
        payload: &Value,
    ) -> Result<u16, ApiError> {
        self.record(RecordedRequest::Create {
            endpoint: endpoint.to_string(),
            name: identity.name().to_string(),
            payload: payload.clone(),
        });
        self.next_rest().map(|(status, _)| status)
    }

    async fn edit(
        &self,
        endpoint: &str,
        identity: &ObjectIdentity,
        payload: &Value,
    ) -> Result<u16, ApiError> {
        self.record(RecordedRequest::Edit {
            endpoint: endpoint.to_string(),
            name: identity.name().to_string(),
            payload: payload.clone(),
        });
        self.next_rest().map(|(status, _)| status)
    }

    async fn delete(&self, endpoint: &str, identity: &ObjectIdentity) -> Result<u16, ApiError> {
        self.record(RecordedRequest::Delete {
            endpoint: endpoint.to_string(),
            name: identity.name().to_string(),
        });
        self.next_rest().map(|(status, _)| status)
    }

    async fn list(
        &self,
        endpoint: &str,
        container: &Container,
    ) -> Result<(u16, Option<Value>), ApiError> {
        self.record(RecordedRequest::List {
            endpoint: endpoint.to_string(),
            container: container.clone(),
        });
        self.next_rest()
    }

    async fn op(&self, cmd: &str, cmd_is_xml: bool) -> Result<ResponseDocument, ApiError> {
        self.record(RecordedRequest::Op {
            cmd: cmd.to_string(),
            cmd_is_xml,
        });
        self.next_document()
    }

    async fn commit(&self, admins: Option<&[String]>) -> Result<ResponseDocument, ApiError> {
        self.record(RecordedRequest::Commit {
            admins: admins.map(<[String]>::to_vec),
        });
        self.next_document()
    }
}

/// [`JobPoller`] that serves canned job documents in order.
#[derive(Debug, Default)]
pub struct ScriptedPoller {
    responses: Mutex<VecDeque<ScriptedResponse>>,
    polled: Mutex<Vec<String>>,
}

impl ScriptedPoller {
    /// Poller that will serve `responses` in order.
    pub fn new(responses: Vec<ScriptedResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            polled: Mutex::new(Vec::new()),
        }
    }

    /// Job ids polled so far, in order.
    pub fn polled(&self) -> Vec<String> {
        self.polled.lock().expect("polled lock").clone()
    }
}

#[async_trait]
impl JobPoller for ScriptedPoller {
    async fn poll(&self, job_id: &str) -> Result<ResponseDocument, ApiError> {
        self.polled
            .lock()
            .expect("polled lock")
            .push(job_id.to_string());

        match self
            .responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .ok_or_else(|| ApiError::Config("scripted poller: response queue exhausted".to_string()))?
        {
            ScriptedResponse::Xml(raw) => ResponseDocument::parse(raw),
            ScriptedResponse::ConnectionFailure(msg) => Err(ApiError::Connection(msg)),
            ScriptedResponse::Rest(..) => Err(ApiError::Config(
                "scripted poller: expected an XML response, got REST".to_string(),
            )),
        }
    }
}
