//! Web Module
//!
//! Read-only HTML viewer for a store.
//!
//! ## Architecture
//! - Single acceptor thread
//! - Worker thread pool fed over a channel
//! - Requests routed through `Handler` onto one shared `Store`
//!
//! ## Routes
//! - `GET /get/`                      bucket list
//! - `GET /get/{bucket}/?after=KEY`   keys, one page at a time
//! - `GET /get/{bucket}/{key}/`       value
//! - `GET /find/{needle}/`            buckets containing needle
//! - `GET /find/{bucket}/{needle}/`   keys containing needle
//! - `GET /prefix/{bucket}/{prefix}/` keys starting with prefix
//! - `GET /health`                    liveness

mod handler;
mod render;
mod server;

pub use handler::{Handler, Reply};
pub use render::{escape_html, percent_decode, percent_encode};
pub use server::Server;
