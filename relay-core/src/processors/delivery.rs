//! Delivery loop processor.
//!
//! The DeliveryLoop is the sole consumer of the event queue. Per event it:
//! - encodes the event into the sink's form payload,
//! - performs one best-effort POST to the collection endpoint,
//! - logs the outcome and moves on.
//!
//! There is no retry, no requeue and no dead-letter handling: every
//! failure is terminal for that single event and never for the loop.

use crate::client::ClientConfig;
use crate::encoding;
use crate::events::{Event, EventReceiver};
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use url::Url;

/// Default collection endpoint of the analytics sink.
pub const DEFAULT_COLLECT_URL: &str = "https://www.google-analytics.com/collect";

/// Total timeout for a single outbound delivery.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that can occur while delivering an event to the sink.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// HTTP transport error (connection failure, timeout).
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),
}

/// DeliveryLoop drains the event queue and posts each event to the sink.
pub struct DeliveryLoop {
    client: ClientConfig,
    collect_url: Url,
    events: EventReceiver,
    shutdown: watch::Receiver<bool>,
    http: reqwest::Client,
}

impl DeliveryLoop {
    /// Create a new DeliveryLoop.
    ///
    /// # Arguments
    ///
    /// * `client` - Identifiers stamped on every payload
    /// * `collect_url` - Collection endpoint to post payloads to
    /// * `events` - Receiving end of the event queue
    /// * `shutdown` - Receiver for the shutdown signal
    pub fn new(
        client: ClientConfig,
        collect_url: Url,
        events: EventReceiver,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            client,
            collect_url,
            events,
            shutdown,
            http: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    /// Run the DeliveryLoop.
    ///
    /// Returns when the shutdown signal flips to `true` or when the event
    /// channel is closed and drained. Events are delivered strictly in
    /// enqueue order.
    pub async fn run(mut self) {
        info!("Delivery loop started");

        loop {
            tokio::select! {
                biased;

                changed = self.shutdown.changed() => {
                    // A dropped sender counts as a shutdown signal.
                    if changed.is_err() || *self.shutdown.borrow() {
                        info!("Delivery loop received shutdown signal");
                        break;
                    }
                }

                event = self.events.recv() => {
                    let Some(event) = event else {
                        info!("Event channel closed");
                        break;
                    };
                    debug!(event = ?event, "Dequeued event");

                    let mut shutdown = self.shutdown.clone();
                    tokio::select! {
                        result = self.deliver(&event) => {
                            if let Err(e) = result {
                                warn!(error = %e, "Event delivery failed");
                            }
                        }

                        // Aborts an in-flight request on shutdown.
                        _ = shutdown.wait_for(|stop| *stop) => {
                            info!("Delivery loop received shutdown signal");
                            break;
                        }
                    }
                }
            }
        }

        info!("Delivery loop stopped");
    }

    /// Deliver a single event to the sink.
    ///
    /// A non-2xx response still counts as delivered; the status code is
    /// only logged.
    async fn deliver(&self, event: &Event) -> Result<(), DeliveryError> {
        let payload = encoding::encode(&self.client, event);

        let request = match self
            .http
            .post(self.collect_url.clone())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(payload)
            .build()
        {
            Ok(request) => request,
            // An event whose request cannot be constructed is dropped
            // without a trace.
            Err(_) => return Ok(()),
        };

        let response = self.http.execute(request).await?;
        info!(status = response.status().as_u16(), "Sink responded");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::events::event_channel;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::post;
    use std::net::SocketAddr;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(5);

    /// Local stand-in for the collection endpoint. Captures each request
    /// body and answers with the given status.
    async fn spawn_sink(status: StatusCode) -> (SocketAddr, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let app = Router::new().route(
            "/collect",
            post(move |body: String| {
                let tx = tx.clone();
                async move {
                    let _ = tx.send(body);
                    status
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (addr, rx)
    }

    fn collect_url(addr: SocketAddr) -> Url {
        format!("http://{addr}/collect").parse().unwrap()
    }

    fn client() -> ClientConfig {
        ClientConfig::new("cid-1", "UA-1", "relay", "1")
    }

    fn event(action: &str) -> Event {
        Event {
            action: action.to_string(),
            category: "button".to_string(),
            user: "u1".to_string(),
        }
    }

    #[tokio::test]
    async fn delivers_events_in_fifo_order() {
        let (addr, mut bodies) = spawn_sink(StatusCode::OK).await;
        let (event_tx, event_rx) = event_channel();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(
            DeliveryLoop::new(client(), collect_url(addr), event_rx, shutdown_rx).run(),
        );

        for action in ["first", "second", "third"] {
            event_tx.send(event(action)).await.unwrap();
        }

        for action in ["first", "second", "third"] {
            let body = timeout(WAIT, bodies.recv()).await.unwrap().unwrap();
            assert!(
                body.contains(&format!("ea={action}")),
                "expected {action} in {body}"
            );
            assert!(body.contains("ec=button"));
            assert!(body.contains("cd1=u1"));
            assert!(body.contains("v=1"));
            assert!(body.contains("t=event"));
            assert!(body.contains("aip=0"));
        }

        drop(event_tx);
        timeout(WAIT, handle).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn survives_sink_errors() {
        let (addr, mut bodies) = spawn_sink(StatusCode::INTERNAL_SERVER_ERROR).await;
        let (event_tx, event_rx) = event_channel();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(
            DeliveryLoop::new(client(), collect_url(addr), event_rx, shutdown_rx).run(),
        );

        event_tx.send(event("first")).await.unwrap();
        event_tx.send(event("second")).await.unwrap();

        // Both arrive: a non-2xx answer does not stop the loop.
        timeout(WAIT, bodies.recv()).await.unwrap().unwrap();
        timeout(WAIT, bodies.recv()).await.unwrap().unwrap();

        drop(event_tx);
        timeout(WAIT, handle).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn survives_unreachable_sink() {
        // Bind a port and close it again so connections are refused.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let (sink_addr, mut bodies) = spawn_sink(StatusCode::OK).await;
        let (event_tx, event_rx) = event_channel();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        // First loop points at the dead address: the event is dropped.
        let dead = tokio::spawn(
            DeliveryLoop::new(client(), collect_url(addr), event_rx, shutdown_rx).run(),
        );
        event_tx.send(event("lost")).await.unwrap();
        event_tx.send(event("also-lost")).await.unwrap();

        // The loop keeps draining after transport failures; once the
        // channel closes it exits cleanly.
        drop(event_tx);
        timeout(WAIT, dead).await.unwrap().unwrap();

        // A fresh loop against a live sink still works.
        let (event_tx, event_rx) = event_channel();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(
            DeliveryLoop::new(client(), collect_url(sink_addr), event_rx, shutdown_rx).run(),
        );
        event_tx.send(event("delivered")).await.unwrap();
        let body = timeout(WAIT, bodies.recv()).await.unwrap().unwrap();
        assert!(body.contains("ea=delivered"));

        drop(event_tx);
        timeout(WAIT, handle).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn stops_on_shutdown_signal() {
        let (addr, _bodies) = spawn_sink(StatusCode::OK).await;
        let (_event_tx, event_rx) = event_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(
            DeliveryLoop::new(client(), collect_url(addr), event_rx, shutdown_rx).run(),
        );

        shutdown_tx.send(true).unwrap();
        timeout(WAIT, handle).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn stops_when_channel_closes() {
        let (addr, _bodies) = spawn_sink(StatusCode::OK).await;
        let (event_tx, event_rx) = event_channel();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(
            DeliveryLoop::new(client(), collect_url(addr), event_rx, shutdown_rx).run(),
        );

        drop(event_tx);
        timeout(WAIT, handle).await.unwrap().unwrap();
    }
}
