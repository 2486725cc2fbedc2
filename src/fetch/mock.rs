use std::{collections::HashMap, sync::Mutex, time::Duration};

use async_trait::async_trait;
use url::Url;

use super::{Response, Transport, TransportError};

/// What a [`ScriptedTransport`] does when a URI is requested.
#[derive(Debug, Clone)]
pub enum Route {
    Respond { response: Response, delay: Duration },
    Fail(String),
    /// Never completes; only a timeout or cancellation ends the request.
    Hang,
}

/// In-memory [`Transport`] with fixed per-URI behaviour, for tests and demos.
///
/// Requests for URIs without a route fail with a transport error.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    routes: HashMap<String, Route>,
    requests: Mutex<Vec<Url>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, uri: &str, route: Route) -> Self {
        self.routes.insert(normalize(uri), route);
        self
    }

    pub fn respond(self, uri: &str, body: impl Into<Vec<u8>>) -> Self {
        self.route(
            uri,
            Route::Respond {
                response: Response::ok(body),
                delay: Duration::ZERO,
            },
        )
    }

    pub fn fail(self, uri: &str, message: &str) -> Self {
        self.route(uri, Route::Fail(message.to_string()))
    }

    pub fn hang(self, uri: &str) -> Self {
        self.route(uri, Route::Hang)
    }

    /// Every URI requested so far, in request order.
    pub fn requests(&self) -> Vec<Url> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

fn normalize(uri: &str) -> String {
    Url::parse(uri)
        .map(String::from)
        .unwrap_or_else(|_| uri.to_string())
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, uri: &Url) -> Result<Response, TransportError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(uri.clone());
        }
        match self.routes.get(uri.as_str()).cloned() {
            Some(Route::Respond { response, delay }) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok(response)
            }
            Some(Route::Fail(message)) => Err(TransportError(message)),
            Some(Route::Hang) => std::future::pending().await,
            None => Err(TransportError(format!("no route for {uri}"))),
        }
    }
}
