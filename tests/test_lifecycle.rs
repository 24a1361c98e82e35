//! Lifecycle tests: install population, priming, activation eviction

use http::Method;
use offline_agent::{request_key, LifecycleState, OfflineAgent, OfflineConfig};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn agent_with(config: OfflineConfig) -> OfflineAgent {
    OfflineAgent::new(Arc::new(config))
}

async fn mount_ok(server: &MockServer, p: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(p))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_install_populates_static_generation() {
    let server = MockServer::start().await;
    mount_ok(&server, "/", "<html>home</html>").await;
    mount_ok(&server, "/app.js", "console.log(1)").await;

    let mut config = OfflineConfig::default();
    config.origin = server.uri();
    config.static_assets = vec!["/".to_string(), "/app.js".to_string()];
    let agent = agent_with(config);

    agent.install().await.expect("install should succeed");
    assert_eq!(agent.lifecycle_state(), LifecycleState::Activating);

    let generation = agent
        .store()
        .open_generation("storefront-static-v1")
        .await
        .unwrap();
    for asset in ["/", "/app.js"] {
        let cached = agent
            .store()
            .get(&generation, &request_key(&Method::GET, asset))
            .await
            .unwrap();
        assert!(cached.is_some(), "asset {} should be pre-cached", asset);
    }
}

#[tokio::test]
async fn test_install_all_or_nothing_on_failed_asset() {
    // Static list ["/", "/app.js"] where "/app.js" fails to fetch
    let server = MockServer::start().await;
    mount_ok(&server, "/", "<html>home</html>").await;
    // "/app.js" has no mock and answers 404

    let mut config = OfflineConfig::default();
    config.origin = server.uri();
    config.static_assets = vec!["/".to_string(), "/app.js".to_string()];
    let agent = agent_with(config);

    let result = agent.install().await;
    assert!(result.is_err(), "installation must report failure");

    // Neither asset is retained
    let generation = agent
        .store()
        .open_generation("storefront-static-v1")
        .await
        .unwrap();
    for asset in ["/", "/app.js"] {
        let cached = agent
            .store()
            .get(&generation, &request_key(&Method::GET, asset))
            .await
            .unwrap();
        assert!(cached.is_none(), "asset {} must not be retained", asset);
    }
}

#[tokio::test]
async fn test_install_primes_dynamic_with_leading_subsets() {
    let server = MockServer::start().await;
    mount_ok(&server, "/", "<html>home</html>").await;
    for p in [
        "/productos/a.jpg",
        "/productos/b.jpg",
        "/productos/c.jpg",
        "/sucursales/centro.jpg",
        "/sucursales/norte.jpg",
    ] {
        mount_ok(&server, p, "img").await;
    }

    let mut config = OfflineConfig::default();
    config.origin = server.uri();
    config.static_assets = vec!["/".to_string()];
    config.product_images = vec![
        "/productos/a.jpg".to_string(),
        "/productos/b.jpg".to_string(),
        "/productos/c.jpg".to_string(),
        "/productos/d.jpg".to_string(),
    ];
    config.branch_images = vec![
        "/sucursales/centro.jpg".to_string(),
        "/sucursales/norte.jpg".to_string(),
        "/sucursales/sur.jpg".to_string(),
    ];
    let agent = agent_with(config);

    agent.install().await.expect("install should succeed");

    let generation = agent
        .store()
        .open_generation("storefront-dynamic-v1")
        .await
        .unwrap();

    // First 3 product images and first 2 branch images are primed
    for primed in [
        "/productos/a.jpg",
        "/productos/b.jpg",
        "/productos/c.jpg",
        "/sucursales/centro.jpg",
        "/sucursales/norte.jpg",
    ] {
        let cached = agent
            .store()
            .get(&generation, &request_key(&Method::GET, primed))
            .await
            .unwrap();
        assert!(cached.is_some(), "{} should be primed", primed);
    }

    // Entries beyond the priming subsets are not
    for skipped in ["/productos/d.jpg", "/sucursales/sur.jpg"] {
        let cached = agent
            .store()
            .get(&generation, &request_key(&Method::GET, skipped))
            .await
            .unwrap();
        assert!(cached.is_none(), "{} should not be primed", skipped);
    }
}

#[tokio::test]
async fn test_priming_failure_does_not_fail_install() {
    let server = MockServer::start().await;
    mount_ok(&server, "/", "<html>home</html>").await;
    // Product image has no mock: priming fetch gets a 404 and is skipped

    let mut config = OfflineConfig::default();
    config.origin = server.uri();
    config.static_assets = vec!["/".to_string()];
    config.product_images = vec!["/productos/missing.jpg".to_string()];
    let agent = agent_with(config);

    agent
        .install()
        .await
        .expect("priming failures are non-fatal");

    let generation = agent
        .store()
        .open_generation("storefront-dynamic-v1")
        .await
        .unwrap();
    let cached = agent
        .store()
        .get(&generation, &request_key(&Method::GET, "/productos/missing.jpg"))
        .await
        .unwrap();
    assert!(cached.is_none());
}

#[tokio::test]
async fn test_activate_evicts_only_stale_generations() {
    // Existing {v1-static, v1-dynamic, v0-static} with current v1 stamps
    let server = MockServer::start().await;
    let mut config = OfflineConfig::default();
    config.origin = server.uri();
    let agent = agent_with(config);

    agent.store().open_generation("storefront-static-v1").await.unwrap();
    agent.store().open_generation("storefront-dynamic-v1").await.unwrap();
    agent.store().open_generation("storefront-static-v0").await.unwrap();

    agent.activate().await.expect("activate should succeed");
    assert_eq!(agent.lifecycle_state(), LifecycleState::Active);

    let mut names = agent.store().list_generation_names().await.unwrap();
    names.sort();
    assert_eq!(
        names,
        vec![
            "storefront-dynamic-v1".to_string(),
            "storefront-static-v1".to_string(),
        ]
    );

    // Idempotence: a second activation changes nothing
    agent.activate().await.expect("activate should succeed");
    let mut again = agent.store().list_generation_names().await.unwrap();
    again.sort();
    assert_eq!(names, again);
}

#[tokio::test]
async fn test_upgrade_migrates_to_new_stamps() {
    // An upgraded agent with v2 stamps evicts every v1 generation
    let server = MockServer::start().await;
    mount_ok(&server, "/", "<html>v2</html>").await;

    let mut config = OfflineConfig::default();
    config.origin = server.uri();
    config.static_cache_name = "storefront-static-v2".to_string();
    config.dynamic_cache_name = "storefront-dynamic-v2".to_string();
    config.static_assets = vec!["/".to_string()];
    let agent = agent_with(config);

    agent.store().open_generation("storefront-static-v1").await.unwrap();
    agent.store().open_generation("storefront-dynamic-v1").await.unwrap();

    agent.install().await.expect("install should succeed");
    agent.activate().await.expect("activate should succeed");

    let mut names = agent.store().list_generation_names().await.unwrap();
    names.sort();
    assert_eq!(
        names,
        vec![
            "storefront-dynamic-v2".to_string(),
            "storefront-static-v2".to_string(),
        ]
    );
}
