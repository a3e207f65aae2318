//! Cache-first and network-first strategy behavior

use crate::helpers::{installed_worker, test_config, BrokenWriteStore, MockFetcher};
use offline_worker::{
    CacheError, CacheStore, NetworkFetcher, OfflineWorker, Request, RequestKey, ResponseSnapshot,
};
use std::sync::Arc;

/// Worker over a store whose runtime-generation writes always fail
async fn worker_with_broken_runtime_writes() -> (Arc<MockFetcher>, OfflineWorker) {
    let config = test_config();
    let store = Arc::new(BrokenWriteStore::new(&config.cache.runtime));
    let fetcher = Arc::new(MockFetcher::new());
    fetcher.serve(&config.assets);

    let worker = OfflineWorker::new(
        &config,
        store as Arc<dyn CacheStore>,
        fetcher.clone() as Arc<dyn NetworkFetcher>,
    )
    .unwrap();
    worker.install().await.unwrap();
    worker.activate().await.unwrap();
    (fetcher, worker)
}

#[tokio::test]
async fn static_cache_hit_makes_no_network_call() {
    let (_store, fetcher, worker) = installed_worker().await;

    // Fetched once during install; a cache hit must not fetch again
    let response = worker
        .handle_fetch(&Request::get("./css/styles.css"))
        .await
        .unwrap();
    assert_eq!(response.text(), "asset:./css/styles.css");
    assert_eq!(fetcher.calls_for("./css/styles.css"), 1);
}

#[tokio::test]
async fn static_miss_fetches_and_fills_runtime_cache() {
    let (store, fetcher, worker) = installed_worker().await;
    fetcher.respond("./img/logo.svg", ResponseSnapshot::ok("<svg/>"));

    let response = worker
        .handle_fetch(&Request::get("./img/logo.svg"))
        .await
        .unwrap();
    assert_eq!(response.text(), "<svg/>");

    let cached = store
        .match_in("runtime-cache", &RequestKey::from_url("./img/logo.svg"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cached.body, response.body);
}

#[tokio::test]
async fn static_fetch_is_idempotent_with_one_network_call() {
    let (_store, fetcher, worker) = installed_worker().await;
    fetcher.respond("./js/extra.js", ResponseSnapshot::ok("console.log(1)"));

    let first = worker
        .handle_fetch(&Request::get("./js/extra.js"))
        .await
        .unwrap();
    let second = worker
        .handle_fetch(&Request::get("./js/extra.js"))
        .await
        .unwrap();

    assert_eq!(first.body, second.body);
    assert_eq!(fetcher.calls_for("./js/extra.js"), 1);
}

#[tokio::test]
async fn non_200_static_response_is_returned_but_not_cached() {
    let (store, fetcher, worker) = installed_worker().await;
    fetcher.respond("./missing.css", ResponseSnapshot::with_status(404, "nope"));

    let response = worker
        .handle_fetch(&Request::get("./missing.css"))
        .await
        .unwrap();
    assert_eq!(response.status, 404);

    let cached = store
        .match_in("runtime-cache", &RequestKey::from_url("./missing.css"))
        .await
        .unwrap();
    assert!(cached.is_none());

    // Not cached, so the next fetch consults the network again
    worker
        .handle_fetch(&Request::get("./missing.css"))
        .await
        .unwrap();
    assert_eq!(fetcher.calls_for("./missing.css"), 2);
}

#[tokio::test]
async fn opaque_response_is_never_cached() {
    let (store, fetcher, worker) = installed_worker().await;
    fetcher.respond(
        "https://cdn.example.com/font.woff2",
        ResponseSnapshot::ok("binary").into_opaque(),
    );

    worker
        .handle_fetch(&Request::get("https://cdn.example.com/font.woff2"))
        .await
        .unwrap();

    let cached = store
        .match_in(
            "runtime-cache",
            &RequestKey::from_url("https://cdn.example.com/font.woff2"),
        )
        .await
        .unwrap();
    assert!(cached.is_none());
}

#[tokio::test]
async fn offline_navigation_serves_fallback_page() {
    let (_store, fetcher, worker) = installed_worker().await;
    fetcher.set_offline(true);

    let response = worker
        .handle_fetch(&Request::navigate("./never-cached.html"))
        .await
        .unwrap();
    assert_eq!(response.text(), "asset:./offline.html");
}

#[tokio::test]
async fn offline_subresource_failure_propagates() {
    let (_store, fetcher, worker) = installed_worker().await;
    fetcher.set_offline(true);

    let err = worker
        .handle_fetch(&Request::get("./never-cached.png"))
        .await
        .unwrap_err();
    assert!(matches!(err, CacheError::NetworkUnavailable { .. }));
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn data_fetch_survives_runtime_cache_write_failure() {
    let (fetcher, worker) = worker_with_broken_runtime_writes().await;
    fetcher.respond(
        "./data/agents.json",
        ResponseSnapshot::ok(r#"{"agents":[]}"#),
    );

    // The opportunistic write fails, but the live response still wins
    let response = worker
        .handle_fetch(&Request::get("./data/agents.json"))
        .await
        .unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.text(), r#"{"agents":[]}"#);
}

#[tokio::test]
async fn static_miss_survives_runtime_cache_write_failure() {
    let (fetcher, worker) = worker_with_broken_runtime_writes().await;
    fetcher.respond("./img/logo.svg", ResponseSnapshot::ok("<svg/>"));

    let response = worker
        .handle_fetch(&Request::get("./img/logo.svg"))
        .await
        .unwrap();
    assert_eq!(response.text(), "<svg/>");

    // Nothing was cached, so the next fetch goes to the network again
    worker
        .handle_fetch(&Request::get("./img/logo.svg"))
        .await
        .unwrap();
    assert_eq!(fetcher.calls_for("./img/logo.svg"), 2);
}

#[tokio::test]
async fn network_first_round_trips_through_runtime_cache() {
    let (store, fetcher, worker) = installed_worker().await;
    fetcher.respond(
        "./data/agents.json",
        ResponseSnapshot::ok(r#"{"agents":[]}"#),
    );

    let response = worker
        .handle_fetch(&Request::get("./data/agents.json"))
        .await
        .unwrap();
    assert_eq!(response.text(), r#"{"agents":[]}"#);
    assert_eq!(fetcher.calls_for("./data/agents.json"), 1);

    // The runtime cache holds an identical snapshot
    let cached = store
        .match_in("runtime-cache", &RequestKey::from_url("./data/agents.json"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cached.body, response.body);
}

#[tokio::test]
async fn network_first_always_consults_network_when_up() {
    let (_store, fetcher, worker) = installed_worker().await;
    fetcher.respond("./api/status", ResponseSnapshot::ok("fresh-1"));

    worker
        .handle_fetch(&Request::get("./api/status"))
        .await
        .unwrap();

    // Freshness wins: a second request re-fetches even though cached
    fetcher.respond("./api/status", ResponseSnapshot::ok("fresh-2"));
    let response = worker
        .handle_fetch(&Request::get("./api/status"))
        .await
        .unwrap();
    assert_eq!(response.text(), "fresh-2");
    assert_eq!(fetcher.calls_for("./api/status"), 2);
}

#[tokio::test]
async fn offline_data_fetch_serves_stale_snapshot() {
    let (_store, fetcher, worker) = installed_worker().await;
    fetcher.respond(
        "./data/agents.json",
        ResponseSnapshot::ok(r#"{"agents":[1]}"#),
    );

    worker
        .handle_fetch(&Request::get("./data/agents.json"))
        .await
        .unwrap();
    fetcher.set_offline(true);

    let stale = worker
        .handle_fetch(&Request::get("./data/agents.json"))
        .await
        .unwrap();
    assert_eq!(stale.text(), r#"{"agents":[1]}"#);
}

#[tokio::test]
async fn offline_data_fetch_with_no_cache_propagates_error() {
    let (_store, fetcher, worker) = installed_worker().await;
    fetcher.set_offline(true);

    let err = worker
        .handle_fetch(&Request::get("./api/never-seen"))
        .await
        .unwrap_err();
    assert!(matches!(err, CacheError::NetworkUnavailable { .. }));
}

#[tokio::test]
async fn query_strings_key_distinct_data_entries() {
    let (store, fetcher, worker) = installed_worker().await;
    fetcher.respond("./data/log.json?page=1", ResponseSnapshot::ok("page-1"));
    fetcher.respond("./data/log.json?page=2", ResponseSnapshot::ok("page-2"));

    worker
        .handle_fetch(&Request::get("./data/log.json?page=1"))
        .await
        .unwrap();
    worker
        .handle_fetch(&Request::get("./data/log.json?page=2"))
        .await
        .unwrap();

    let one = store
        .match_in("runtime-cache", &RequestKey::from_url("./data/log.json?page=1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(one.text(), "page-1");
}
