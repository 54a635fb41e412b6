//! The `/settings` surface without a persisted store.

mod common;

#[tokio::test]
async fn test_read_settings_returns_active_values() {
    let balancer = common::spawn_balancer(common::test_settings("3:1")).await;

    let body: serde_json::Value = reqwest::get(format!("{}/settings", balancer.base_url()))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["redirect_ratio"], "3:1");
    assert_eq!(body["cdn_host"], "http://cdn-domain/");
    balancer.shutdown.trigger();
}

#[tokio::test]
async fn test_update_without_store_is_server_error() {
    let balancer = common::spawn_balancer(common::test_settings("3:1")).await;

    let response = reqwest::Client::new()
        .put(format!("{}/settings", balancer.base_url()))
        .json(&serde_json::json!({
            "cdn_host": "http://cdn.example",
            "redirect_ratio": "5:2",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    balancer.shutdown.trigger();
}

#[tokio::test]
async fn test_update_with_invalid_ratio_is_client_error() {
    let balancer = common::spawn_balancer(common::test_settings("3:1")).await;

    for bad_ratio in ["abc", "-1:1", "1:-1", "0:1", "1:0"] {
        let response = reqwest::Client::new()
            .put(format!("{}/settings", balancer.base_url()))
            .json(&serde_json::json!({
                "cdn_host": "http://cdn.example",
                "redirect_ratio": bad_ratio,
            }))
            .send()
            .await
            .unwrap();

        // body validation runs before the store lookup would matter
        assert_eq!(response.status(), 400, "ratio {bad_ratio:?} should be rejected");
    }
    balancer.shutdown.trigger();
}
