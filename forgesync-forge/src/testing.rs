//! In-memory [`Transport`] for tests: queued responses per method + URL,
//! and a record of every request sent. Tests that need a real HTTP server use
//! `wiremock` instead.
//!
//! Compiled for this crate's own tests and, through the `test-support`
//! feature, for downstream crates' tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use crate::error::ForgeError;
use crate::transport::{HttpRequest, HttpResponse, Method, Transport};

type Scripted = Result<HttpResponse, String>;

#[derive(Default)]
struct Script {
    queues: HashMap<(Method, String), VecDeque<Scripted>>,
    requests: Vec<HttpRequest>,
}

/// Replies from a per-route queue. The last queued reply for a route repeats
/// once the queue is down to one entry; an unscripted route is a transport
/// error.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<Script>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queue a response for `method url`.
    pub fn respond(&self, method: Method, url: impl Into<String>, status: u16, body: &str) -> &Self {
        self.lock()
            .queues
            .entry((method, url.into()))
            .or_default()
            .push_back(Ok(HttpResponse::new(status, body)));
        self
    }

    /// Queue a transport failure (no status line) for `method url`.
    pub fn fail(&self, method: Method, url: impl Into<String>, message: &str) -> &Self {
        self.lock()
            .queues
            .entry((method, url.into()))
            .or_default()
            .push_back(Err(message.to_string()));
        self
    }

    /// Every request sent so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.lock().requests.clone()
    }

    /// Requests sent to exactly `method url`.
    pub fn requests_to(&self, method: Method, url: &str) -> Vec<HttpRequest> {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.method == method && r.url == url)
            .cloned()
            .collect()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ForgeError> {
        let mut script = self.lock();
        script.requests.push(request.clone());
        let key = (request.method, request.url.clone());
        let next = match script.queues.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        match next {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(ForgeError::Transport {
                url: request.url.clone(),
                message,
            }),
            None => Err(ForgeError::Transport {
                url: request.url.clone(),
                message: format!("no scripted response for {} {}", request.method, request.url),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_scripted_reply_repeats() {
        let t = ScriptedTransport::new();
        t.respond(Method::Get, "http://h/x", 404, "")
            .respond(Method::Get, "http://h/x", 200, "{}");
        let req = HttpRequest::get("http://h/x");
        assert_eq!(t.send(&req).unwrap().status, 404);
        assert_eq!(t.send(&req).unwrap().status, 200);
        assert_eq!(t.send(&req).unwrap().status, 200);
        assert_eq!(t.requests().len(), 3);
    }

    #[test]
    fn unscripted_route_is_a_transport_error() {
        let t = ScriptedTransport::new();
        let err = t.send(&HttpRequest::get("http://h/nope")).unwrap_err();
        assert!(matches!(err, ForgeError::Transport { .. }));
    }
}
