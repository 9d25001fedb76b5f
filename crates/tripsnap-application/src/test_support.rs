//! Scripted [`ApiTransport`] for store tests.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tripsnap_core::{ApiRequest, ApiResponse, ApiTransport, Method, Result, TripsnapError};

type Route = (Method, String);

#[derive(Clone)]
enum Scripted {
    Response(ApiResponse),
    NetworkError,
}

/// Answers requests from per-route queues.
///
/// The last scripted answer of a route repeats once its queue is down to one
/// entry; unscripted routes answer 404. A gated route makes its next call wait
/// until the returned [`Notify`] is signalled.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<Route, VecDeque<Scripted>>>,
    gates: Mutex<HashMap<Route, Arc<Notify>>>,
    calls: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, method: Method, path: &str, scripted: Scripted) {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(scripted);
    }

    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) {
        self.push(
            method,
            path,
            Scripted::Response(ApiResponse::new(status, Some(body))),
        );
    }

    pub fn respond_empty(&self, method: Method, path: &str, status: u16) {
        self.push(method, path, Scripted::Response(ApiResponse::new(status, None)));
    }

    pub fn fail(&self, method: Method, path: &str) {
        self.push(method, path, Scripted::NetworkError);
    }

    /// The next call to this route blocks until the returned handle is notified.
    pub fn gate(&self, method: Method, path: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert((method, path.to_string()), notify.clone());
        notify
    }

    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, method: Method, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.method == method && call.path == path)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn next(&self, route: &Route) -> Scripted {
        let mut routes = self.routes.lock().unwrap();
        match routes.get_mut(route) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => Scripted::Response(ApiResponse::new(
                404,
                Some(json!({"detail": "not scripted"})),
            )),
        }
    }
}

#[async_trait]
impl ApiTransport for MockTransport {
    async fn request(&self, request: ApiRequest) -> Result<ApiResponse> {
        let route = (request.method, request.path.clone());
        self.calls.lock().unwrap().push(request);

        let gate = self.gates.lock().unwrap().remove(&route);
        if let Some(gate) = gate {
            gate.notified().await;
        }

        match self.next(&route) {
            Scripted::Response(response) => Ok(response),
            Scripted::NetworkError => Err(TripsnapError::network("connection refused")),
        }
    }
}
