use serde_json::Value;
use std::sync::Mutex;

use crate::api::{ApiRequest, Credential, Transport};
use crate::error::{Error, Result};

/// Records every request and replies with one canned response.
pub struct MockTransport {
    response: Mutex<Option<Result<Value>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn replying(response: Value) -> Self {
        Self {
            response: Mutex::new(Some(Ok(response))),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16, body: Value) -> Self {
        Self {
            response: Mutex::new(Some(Err(Error::RemoteApi { status, body }))),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    fn call(&self, request: &ApiRequest, _credential: &Credential) -> Result<Value> {
        self.requests.lock().unwrap().push(request.clone());
        self.response
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(Error::Decode("no canned response left".to_string())))
    }
}
