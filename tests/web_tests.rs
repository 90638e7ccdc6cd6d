//! Tests for the HTML viewer
//!
//! These tests verify:
//! - Routing of /get, /find, /prefix and /health
//! - Status codes for missing buckets/keys, bad methods and unknown routes
//! - Escaping of bucket, key and value text
//! - Paginated key listings
//! - Server start/shutdown

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bucketkv::web::{Handler, Server};
use bucketkv::{Config, Store};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_handler(page_size: usize) -> (TempDir, Arc<Store>, Handler) {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(Store::open_path(temp_dir.path().join("web.redb")).unwrap());

    store.create_bucket("users").unwrap();
    store.create_bucket("orders").unwrap();
    store.write("users", "alice", b"admin").unwrap();
    store.write("users", "bob", b"<b>guest</b>").unwrap();
    store.write("users", "al ice", b"spaced").unwrap();

    let handler = Handler::new(Arc::clone(&store), page_size);
    (temp_dir, store, handler)
}

// =============================================================================
// Routing Tests
// =============================================================================

#[test]
fn test_health() {
    let (_temp, _store, handler) = setup_handler(100);

    let reply = handler.handle("GET", "/health");

    assert_eq!(reply.status, 200);
    assert_eq!(reply.body, "OK\n");
}

#[test]
fn test_get_lists_buckets() {
    let (_temp, _store, handler) = setup_handler(100);

    let reply = handler.handle("GET", "/get/");

    assert_eq!(reply.status, 200);
    assert!(reply.content_type.starts_with("text/html"));
    assert!(reply.body.contains("<a href=\"/get/orders/\">orders</a>"));
    assert!(reply.body.contains("<a href=\"/get/users/\">users</a>"));
}

#[test]
fn test_get_lists_keys() {
    let (_temp, _store, handler) = setup_handler(100);

    let reply = handler.handle("GET", "/get/users/");

    assert_eq!(reply.status, 200);
    assert!(reply.body.contains("<a href=\"/get/users/alice/\">alice</a>"));
    assert!(reply.body.contains("<a href=\"/get/users/al%20ice/\">al ice</a>"));
    assert!(!reply.body.contains("after="));
}

#[test]
fn test_get_value_is_escaped() {
    let (_temp, _store, handler) = setup_handler(100);

    let reply = handler.handle("GET", "/get/users/bob/");

    assert_eq!(reply.status, 200);
    assert!(reply.body.contains("<pre>&lt;b&gt;guest&lt;/b&gt;</pre>"));
}

#[test]
fn test_get_value_with_encoded_key() {
    let (_temp, _store, handler) = setup_handler(100);

    let reply = handler.handle("GET", "/get/users/al%20ice/");

    assert_eq!(reply.status, 200);
    assert!(reply.body.contains("<pre>spaced</pre>"));
}

#[test]
fn test_get_missing_bucket_is_404() {
    let (_temp, _store, handler) = setup_handler(100);

    assert_eq!(handler.handle("GET", "/get/nobucket/").status, 404);
    assert_eq!(handler.handle("GET", "/get/nobucket/key/").status, 404);
}

#[test]
fn test_get_missing_key_is_404() {
    let (_temp, _store, handler) = setup_handler(100);

    assert_eq!(handler.handle("GET", "/get/users/nobody/").status, 404);
}

#[test]
fn test_find_routes() {
    let (_temp, _store, handler) = setup_handler(100);

    let all = handler.handle("GET", "/find/");
    assert!(all.body.contains("orders") && all.body.contains("users"));

    let buckets = handler.handle("GET", "/find/ord/");
    assert!(buckets.body.contains("orders"));
    assert!(!buckets.body.contains("users"));

    let keys = handler.handle("GET", "/find/users/li/");
    assert!(keys.body.contains(">alice<"));
    assert!(!keys.body.contains(">bob<"));
}

#[test]
fn test_prefix_route() {
    let (_temp, _store, handler) = setup_handler(100);

    let reply = handler.handle("GET", "/prefix/users/al/");

    assert_eq!(reply.status, 200);
    assert!(reply.body.contains(">alice<"));
    assert!(reply.body.contains(">al ice<"));
    assert!(!reply.body.contains(">bob<"));
}

#[test]
fn test_unknown_route_and_method() {
    let (_temp, _store, handler) = setup_handler(100);

    assert_eq!(handler.handle("GET", "/nope/").status, 404);
    assert_eq!(handler.handle("GET", "/get/a/b/c/").status, 404);
    assert_eq!(handler.handle("POST", "/get/").status, 405);
}

#[test]
fn test_bucket_names_are_escaped() {
    let (_temp, store, handler) = setup_handler(100);
    store.create_bucket("<script>").unwrap();

    let reply = handler.handle("GET", "/get/");

    assert!(reply.body.contains("&lt;script&gt;"));
    assert!(!reply.body.contains("<script>"));
}

// =============================================================================
// Pagination Tests
// =============================================================================

#[test]
fn test_key_listing_paginates() {
    let (_temp, store, handler) = setup_handler(2);
    store.create_bucket("many").unwrap();
    for key in ["a", "b", "c", "d", "e"] {
        store.write("many", key, b"").unwrap();
    }

    let first = handler.handle("GET", "/get/many/");
    assert!(first.body.contains(">a<") && first.body.contains(">b<"));
    assert!(first.body.contains("/get/many/?after=b"));

    let second = handler.handle("GET", "/get/many/?after=b");
    assert!(second.body.contains(">c<") && second.body.contains(">d<"));
    assert!(!second.body.contains(">b<"));
    assert!(second.body.contains("/get/many/?after=d"));

    let last = handler.handle("GET", "/get/many/?after=d");
    assert!(last.body.contains(">e<"));
    assert!(!last.body.contains("after="));
}

// =============================================================================
// Server Tests
// =============================================================================

#[test]
fn test_server_shutdown() {
    let (_temp, store, _handler) = setup_handler(100);

    let config = Config::builder()
        .listen_addr("127.0.0.1:0")
        .workers(2)
        .build();

    let mut server = Server::new(config, store);
    let stop = server.shutdown_handle();

    let running = thread::spawn(move || server.run());

    thread::sleep(Duration::from_millis(200));
    stop.store(true, std::sync::atomic::Ordering::Relaxed);

    running.join().unwrap().unwrap();
}
