//! Blocking executors for `HttpRequest` values.
//!
//! `UreqTransport` is the long-lived session: one `ureq::Agent` configured
//! from `ClientConfig` and shared by every request. The agent is
//! `Send + Sync`, so a single transport serves all worker threads.
//!
//! At most `max_connections_per_host` requests are in flight per session;
//! further callers block until a permit is returned.

use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::CarError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes one request and returns the response as data.
///
/// Non-2xx statuses are responses, not errors; only failures to obtain a
/// response are reported as `Err`.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, CarError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, CarError> {
        (**self).execute(request)
    }
}

/// Counting gate: a bounded channel pre-filled with one token per permit.
#[derive(Clone)]
struct ConnectionGate {
    release: Sender<()>,
    acquire: Receiver<()>,
}

impl ConnectionGate {
    fn new(permits: usize) -> Self {
        let permits = permits.max(1);
        let (release, acquire) = bounded(permits);
        for _ in 0..permits {
            let _ = release.try_send(());
        }
        Self { release, acquire }
    }

    fn enter(&self) -> Result<Permit<'_>, CarError> {
        self.acquire
            .recv()
            .map_err(|e| CarError::Transport(format!("connection gate closed: {e}")))?;
        Ok(Permit {
            release: &self.release,
        })
    }
}

struct Permit<'a> {
    release: &'a Sender<()>,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        let _ = self.release.try_send(());
    }
}

#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    gate: ConnectionGate,
}

impl UreqTransport {
    pub fn new(config: &ClientConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(config.timeout()))
            .max_idle_connections_per_host(config.max_connections_per_host)
            .build()
            .new_agent();
        Self {
            agent,
            gate: ConnectionGate::new(config.max_connections_per_host),
        }
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (key, value) in headers {
        builder = builder.header(key.as_str(), value.as_str());
    }
    builder
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, CarError> {
        let HttpRequest {
            method,
            path,
            headers,
            body,
        } = request;
        let _permit = self.gate.enter()?;
        debug!(%method, %path, "Executing request");

        let result = match (method, body) {
            (HttpMethod::Get, _) => with_headers(self.agent.get(&path), &headers).call(),
            (HttpMethod::Delete, _) => with_headers(self.agent.delete(&path), &headers).call(),
            (HttpMethod::Post, Some(body)) => {
                with_headers(self.agent.post(&path), &headers).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => with_headers(self.agent.post(&path), &headers).send_empty(),
            (HttpMethod::Put, Some(body)) => {
                with_headers(self.agent.put(&path), &headers).send(body.as_bytes())
            }
            (HttpMethod::Put, None) => with_headers(self.agent.put(&path), &headers).send_empty(),
        };

        let mut response = result.map_err(|e| {
            warn!(%method, %path, error = %e, "Transport failure");
            CarError::Transport(e.to_string())
        })?;

        let status = response.status().as_u16();
        let bytes = response.body_mut().read_to_vec().map_err(|e| {
            warn!(%method, %path, status, error = %e, "Failed to read response body");
            CarError::NoResponse
        })?;
        let body = String::from_utf8(bytes).map_err(|e| {
            warn!(%method, %path, status, error = %e, "Response body is not UTF-8");
            CarError::InvalidJson(e.to_string())
        })?;
        debug!(%method, %path, status, bytes = body.len(), "Received response");

        Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::{SocketAddr, TcpListener};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    /// Raw HTTP/1.1 server answering every request with `body` after `hold`,
    /// recording the highest number of connections open at once.
    fn raw_server(body: &'static [u8], hold: Duration) -> (SocketAddr, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let open = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let peak_out = Arc::clone(&peak);

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let open = Arc::clone(&open);
                let peak = Arc::clone(&peak);
                thread::spawn(move || {
                    let now = open.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);

                    let mut request = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        match stream.read(&mut buf) {
                            Ok(0) | Err(_) => break,
                            Ok(n) => request.extend_from_slice(&buf[..n]),
                        }
                    }
                    thread::sleep(hold);
                    open.fetch_sub(1, Ordering::SeqCst);

                    let head = format!(
                        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        body.len()
                    );
                    let _ = stream.write_all(head.as_bytes());
                    let _ = stream.write_all(body);
                    let _ = stream.flush();
                });
            }
        });

        (addr, peak_out)
    }

    fn get(addr: SocketAddr) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("http://{addr}/cars"),
            headers: Vec::new(),
            body: None,
        }
    }

    #[test]
    fn concurrent_requests_never_exceed_the_connection_cap() {
        let (addr, peak) = raw_server(b"[]", Duration::from_millis(200));
        let config = ClientConfig {
            max_connections_per_host: 2,
            timeout_secs: 10,
            ..ClientConfig::default()
        };
        let transport = Arc::new(UreqTransport::new(&config));

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let transport = Arc::clone(&transport);
                thread::spawn(move || transport.execute(get(addr)))
            })
            .collect();
        for handle in handles {
            let response = handle.join().unwrap().unwrap();
            assert_eq!(response.status, 200);
        }

        let peak = peak.load(Ordering::SeqCst);
        assert!(peak >= 1);
        assert!(peak <= 2, "{peak} connections open at once");
    }

    #[test]
    fn non_utf8_body_is_invalid_json() {
        let (addr, _) = raw_server(b"[\xff\xfe]", Duration::ZERO);
        let transport = UreqTransport::new(&ClientConfig::default());
        let err = transport.execute(get(addr)).unwrap_err();
        assert!(matches!(err, CarError::InvalidJson(_)), "got {err:?}");
    }

    #[test]
    fn unreachable_host_is_a_transport_error() {
        let config = ClientConfig {
            timeout_secs: 2,
            ..ClientConfig::default()
        };
        let transport = UreqTransport::new(&config);
        let request = HttpRequest {
            method: HttpMethod::Get,
            // Port 9 (discard) on loopback is not expected to be listening.
            path: "http://127.0.0.1:9/cars".to_string(),
            headers: Vec::new(),
            body: None,
        };
        let err = transport.execute(request).unwrap_err();
        assert!(matches!(err, CarError::Transport(_)));
    }
}
