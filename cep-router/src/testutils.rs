use crate::cep::{AddressRecord, Cep};
use crate::errors::UpstreamError;
use crate::upstream::UpstreamClient;
use async_trait::async_trait;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::{TokioExecutor, TokioIo};
use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::Instant;

/// Upstream stand-in that answers with a fixed result after a fixed delay.
///
/// It ignores the deadline, like a transport without cancellation support.
pub struct StubUpstream {
    name: &'static str,
    delay: Duration,
    result: Result<AddressRecord, UpstreamError>,
    calls: Arc<AtomicUsize>,
    completed: Arc<AtomicBool>,
    blocking: bool,
}

impl StubUpstream {
    pub fn succeeding(name: &'static str, delay: Duration, record: AddressRecord) -> Self {
        Self::new(name, delay, Ok(record))
    }

    pub fn failing(name: &'static str, delay: Duration) -> Self {
        Self::new(name, delay, Err(UpstreamError::Status(500)))
    }

    /// Holds the runtime thread for `delay` without yielding, so on a
    /// current-thread runtime nothing else is polled until it returns.
    pub fn blocking(name: &'static str, delay: Duration, record: AddressRecord) -> Self {
        Self {
            blocking: true,
            ..Self::new(name, delay, Ok(record))
        }
    }

    fn new(
        name: &'static str,
        delay: Duration,
        result: Result<AddressRecord, UpstreamError>,
    ) -> Self {
        Self {
            name,
            delay,
            result,
            calls: Arc::new(AtomicUsize::new(0)),
            completed: Arc::new(AtomicBool::new(false)),
            blocking: false,
        }
    }

    /// Shared call counter, readable after the stub moved into a resolver.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    /// Set once a lookup ran to completion.
    pub fn completed(&self) -> Arc<AtomicBool> {
        self.completed.clone()
    }
}

#[async_trait]
impl UpstreamClient for StubUpstream {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn lookup(&self, _cep: &Cep, _deadline: Instant) -> Result<AddressRecord, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.blocking {
            std::thread::sleep(self.delay);
        } else {
            tokio::time::sleep(self.delay).await;
        }
        self.completed.store(true, Ordering::SeqCst);
        self.result.clone()
    }
}

pub fn record(cep: &str, city: &str) -> AddressRecord {
    AddressRecord {
        cep: Some(cep.into()),
        localidade: Some(city.into()),
        ..Default::default()
    }
}

pub struct MockServer {
    pub port: u16,
    paths: Arc<Mutex<Vec<String>>>,
}

impl MockServer {
    /// Request paths received so far
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

/// Start a mock HTTP server answering every request with `status` and `body`
/// after `delay`.
pub async fn start_mock_server(
    status: StatusCode,
    body: &'static str,
    delay: Duration,
) -> MockServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let paths = Arc::new(Mutex::new(Vec::new()));
    let recorded = paths.clone();

    tokio::spawn(async move {
        loop {
            let (stream, _) = listener.accept().await.unwrap();
            let io = TokioIo::new(stream);
            let recorded = recorded.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: Request<hyper::body::Incoming>| {
                    recorded.lock().unwrap().push(req.uri().path().to_string());
                    async move {
                        tokio::time::sleep(delay).await;
                        let mut response = Response::new(Full::new(Bytes::from_static(body.as_bytes())));
                        *response.status_mut() = status;
                        Ok::<_, Infallible>(response)
                    }
                });

                let _ = hyper_util::server::conn::auto::Builder::new(TokioExecutor::new())
                    .serve_connection(io, service)
                    .await;
            });
        }
    });

    MockServer { port, paths }
}

/// A local port with nothing listening on it
pub async fn refused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}
