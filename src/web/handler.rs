//! Request Handler
//!
//! Maps a request line onto store calls and renders the result. Knows
//! nothing about sockets, so routes can be exercised directly.

use std::sync::Arc;

use crate::error::StoreError;
use crate::store::Store;

use super::render;

/// A rendered response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// HTTP status code
    pub status: u16,

    /// Content-Type header value
    pub content_type: &'static str,

    /// Response body
    pub body: String,
}

impl Reply {
    const HTML: &'static str = "text/html; charset=utf-8";
    const TEXT: &'static str = "text/plain; charset=utf-8";

    /// Create a 200 HTML reply
    pub fn html(body: String) -> Self {
        Self {
            status: 200,
            content_type: Self::HTML,
            body,
        }
    }

    /// Create a plain text reply
    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: Self::TEXT,
            body: body.to_string(),
        }
    }

    /// Create an HTML error reply
    pub fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            content_type: Self::HTML,
            body: render::error_page(status, message),
        }
    }

    /// Map a store error onto a status code
    fn from_store_error(e: &StoreError) -> Self {
        match e {
            StoreError::BucketNotExist(_) => Self::error(404, &e.to_string()),
            StoreError::InvalidArgument(_) => Self::error(400, &e.to_string()),
            _ => {
                tracing::warn!("Request failed: {}", e);
                Self::error(500, &e.to_string())
            }
        }
    }
}

/// Routes viewer requests onto a shared store
pub struct Handler {
    /// Shared store handle
    store: Arc<Store>,

    /// Keys per page on bucket listings
    page_size: usize,
}

impl Handler {
    /// Create a handler serving `store`
    pub fn new(store: Arc<Store>, page_size: usize) -> Self {
        Self {
            store,
            page_size: page_size.max(1),
        }
    }

    /// Handle one request given its method and raw URL
    pub fn handle(&self, method: &str, url: &str) -> Reply {
        if method != "GET" {
            return Reply::text(405, "method not allowed\n");
        }

        let (path, query) = match url.split_once('?') {
            Some((path, query)) => (path, query),
            None => (url, ""),
        };

        if path == "/health" {
            return Reply::text(200, "OK\n");
        }

        let segments: Vec<String> = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(render::percent_decode)
            .collect();

        let result = match segments.split_first() {
            Some((route, args)) if route == "get" => self.get(args, query),
            Some((route, args)) if route == "find" => self.find(args),
            Some((route, args)) if route == "prefix" => self.prefix(args),
            _ => return Reply::error(404, "not found"),
        };

        result.unwrap_or_else(|e| Reply::from_store_error(&e))
    }

    // =========================================================================
    // Routes
    // =========================================================================

    /// `/get/`, `/get/{bucket}/`, `/get/{bucket}/{key}/`
    fn get(&self, args: &[String], query: &str) -> crate::Result<Reply> {
        match args {
            [] => {
                let buckets = self.store.all_buckets()?;
                Ok(Reply::html(render::bucket_list("Buckets", &buckets)))
            }
            [bucket] => {
                let after = query_param(query, "after").unwrap_or_default();
                let page = self.store.read_page(bucket, &after, self.page_size)?;
                let keys: Vec<String> = page.items.into_keys().collect();
                let next = (!page.next.is_empty()).then_some(page.next.as_str());
                Ok(Reply::html(render::key_list(bucket, "Keys", &keys, next)))
            }
            [bucket, key] => match self.store.read(bucket, key)? {
                Some(value) => Ok(Reply::html(render::value_page(bucket, key, &value))),
                None => Ok(Reply::error(404, &format!("key {} not found in {}", key, bucket))),
            },
            _ => Ok(Reply::error(404, "not found")),
        }
    }

    /// `/find/`, `/find/{needle}/`, `/find/{bucket}/{needle}/`
    fn find(&self, args: &[String]) -> crate::Result<Reply> {
        match args {
            [] => {
                let buckets = self.store.all_buckets()?;
                Ok(Reply::html(render::bucket_list("Buckets", &buckets)))
            }
            [needle] => {
                let buckets = self.store.find_buckets(needle)?;
                Ok(Reply::html(render::bucket_list("Buckets", &buckets)))
            }
            [bucket, needle] => {
                let keys = self.store.find_keys(bucket, needle)?;
                Ok(Reply::html(render::key_list(bucket, "Keys", &keys, None)))
            }
            _ => Ok(Reply::error(404, "not found")),
        }
    }

    /// `/prefix/{bucket}/{prefix}/`
    fn prefix(&self, args: &[String]) -> crate::Result<Reply> {
        match args {
            [bucket, prefix] => {
                let mut keys = Vec::new();
                self.store.walk_prefix(bucket, prefix, |key, _| keys.push(key.to_string()))?;
                Ok(Reply::html(render::key_list(bucket, "Keys", &keys, None)))
            }
            _ => Ok(Reply::error(404, "not found")),
        }
    }
}

/// Value of `name` in a query string, decoded
fn query_param(query: &str, name: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| render::percent_decode(&value.replace('+', " ")))
}
