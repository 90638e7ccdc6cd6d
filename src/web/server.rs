//! HTTP Server
//!
//! Accepts requests and dispatches them to worker threads.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel;
use tiny_http::{Header, Request, Response};

use crate::config::Config;
use crate::error::Result;
use crate::store::Store;

use super::handler::Handler;

/// How long the acceptor blocks before re-checking the shutdown flag
const ACCEPT_POLL: Duration = Duration::from_millis(100);

/// Pending requests allowed per worker before the acceptor blocks
const QUEUE_PER_WORKER: usize = 16;

/// HTTP server for the viewer
pub struct Server {
    /// Server configuration (listen address, workers, page size)
    config: Config,

    /// Request router shared by all workers
    handler: Arc<Handler>,

    /// Set to stop the accept loop
    shutdown: Arc<AtomicBool>,
}

impl Server {
    /// Create a new server with the given config and store
    pub fn new(config: Config, store: Arc<Store>) -> Self {
        let handler = Arc::new(Handler::new(store, config.page_size));
        Self {
            config,
            handler,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start the server (blocking until shutdown)
    pub fn run(&mut self) -> Result<()> {
        self.config.validate()?;

        let http = tiny_http::Server::http(&self.config.listen_addr)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

        tracing::info!(
            "Listening on {} with {} workers",
            self.config.listen_addr,
            self.config.workers
        );

        let (sender, receiver) = channel::bounded::<Request>(self.config.workers * QUEUE_PER_WORKER);

        let mut workers: Vec<JoinHandle<()>> = Vec::with_capacity(self.config.workers);
        for id in 0..self.config.workers {
            let receiver = receiver.clone();
            let handler = Arc::clone(&self.handler);

            let worker = thread::Builder::new()
                .name(format!("bucketkv-web-{}", id))
                .spawn(move || {
                    for request in receiver.iter() {
                        serve(&handler, request);
                    }
                })?;
            workers.push(worker);
        }
        drop(receiver);

        while !self.shutdown.load(Ordering::Relaxed) {
            match http.recv_timeout(ACCEPT_POLL) {
                Ok(Some(request)) => {
                    if sender.send(request).is_err() {
                        tracing::warn!("All workers exited, stopping accept loop");
                        break;
                    }
                }
                Ok(None) => continue,
                Err(e) => tracing::warn!("HTTP receive error: {}", e),
            }
        }

        // Closing the channel lets workers drain and exit
        drop(sender);
        for worker in workers {
            if worker.join().is_err() {
                tracing::warn!("Worker thread panicked");
            }
        }

        tracing::info!("Server stopped");
        Ok(())
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Flag that stops the server when set; usable from another thread
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }
}

/// Handle one request and send the reply
fn serve(handler: &Handler, request: Request) {
    let method = request.method().as_str().to_string();
    let url = request.url().to_string();

    let reply = handler.handle(&method, &url);
    tracing::debug!("{} {} -> {}", method, url, reply.status);

    let mut response = Response::from_string(reply.body).with_status_code(reply.status);
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], reply.content_type.as_bytes()) {
        response.add_header(header);
    }

    if let Err(e) = request.respond(response) {
        tracing::debug!("Client went away before the response was sent: {}", e);
    }
}
