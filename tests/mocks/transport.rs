//! HTTP transport double answering from a script keyed by URL path
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use shipx::adapters::{HttpRequest, HttpResponse, HttpTransport};
use shipx::models::TransportError;

#[derive(Debug, Clone)]
enum Reply {
	Respond {
		status: u16,
		body: String,
		delay: Duration,
	},
	Fail(TransportError),
}

/// Records every request and replies with the response scripted for its path
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
	replies: Arc<Mutex<BTreeMap<String, Reply>>>,
	requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl ScriptedTransport {
	pub fn new() -> Self {
		Self::default()
	}

	/// Reply to requests whose URL ends with `path`
	pub fn respond(self, path: &str, status: u16, body: impl Into<String>) -> Self {
		self.respond_after(path, status, body, Duration::ZERO)
	}

	pub fn respond_after(
		self,
		path: &str,
		status: u16,
		body: impl Into<String>,
		delay: Duration,
	) -> Self {
		self.replies.lock().unwrap().insert(
			path.to_string(),
			Reply::Respond {
				status,
				body: body.into(),
				delay,
			},
		);
		self
	}

	pub fn fail(self, path: &str, error: TransportError) -> Self {
		self.replies
			.lock()
			.unwrap()
			.insert(path.to_string(), Reply::Fail(error));
		self
	}

	pub fn requests(&self) -> Vec<HttpRequest> {
		self.requests.lock().unwrap().clone()
	}

	pub fn request_count(&self) -> usize {
		self.requests.lock().unwrap().len()
	}
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
	async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
		self.requests.lock().unwrap().push(request.clone());
		let reply = self
			.replies
			.lock()
			.unwrap()
			.iter()
			.find(|(path, _)| request.url.ends_with(path.as_str()))
			.map(|(_, reply)| reply.clone());

		match reply {
			Some(Reply::Respond {
				status,
				body,
				delay,
			}) => {
				tokio::time::sleep(delay).await;
				Ok(HttpResponse::new(status, body))
			},
			Some(Reply::Fail(error)) => Err(error),
			None => Ok(HttpResponse::new(404, "")),
		}
	}
}
