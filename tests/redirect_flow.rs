//! End-to-end redirect behavior.

use cdn_balancer::config::schema::CounterMode;
use cdn_balancer::counter::RequestCounter;

mod common;

async fn request_location(
    client: &reqwest::Client,
    base_url: &str,
    video: &str,
) -> (u16, Option<String>) {
    let response = client
        .get(format!("{base_url}/"))
        .query(&[("video", video)])
        .send()
        .await
        .expect("balancer unreachable");
    let status = response.status().as_u16();
    let location = response
        .headers()
        .get("location")
        .map(|value| value.to_str().unwrap().to_string());
    (status, location)
}

#[tokio::test]
async fn test_three_to_one_ratio_over_100_requests() {
    let balancer = common::spawn_balancer(common::test_settings("3:1")).await;
    let client = common::no_redirect_client();

    let mut cdn_count = 0;
    let mut origin_count = 0;
    for i in 0..100 {
        let video = common::video_url(i);
        let (status, location) = request_location(&client, &balancer.base_url(), &video).await;
        assert_eq!(status, 301);
        let location = location.expect("301 must carry a location header");
        if location == video {
            origin_count += 1;
        } else {
            cdn_count += 1;
        }
    }

    assert_eq!(cdn_count, 75);
    assert_eq!(origin_count, 25);
    balancer.shutdown.trigger();
}

#[tokio::test]
async fn test_first_block_order_and_counter_value() {
    let balancer = common::spawn_balancer(common::test_settings("3:1")).await;
    let client = common::no_redirect_client();

    let mut decisions = Vec::new();
    for i in 0..4 {
        let video = common::video_url(i);
        let (status, location) = request_location(&client, &balancer.base_url(), &video).await;
        assert_eq!(status, 301);
        decisions.push(location.unwrap() != video);
    }

    assert_eq!(decisions, vec![true, true, true, false]);
    assert_eq!(balancer.counter.get().await.unwrap(), 4);
    balancer.shutdown.trigger();
}

#[tokio::test]
async fn test_atomic_counter_mode_same_sequence() {
    let mut settings = common::test_settings("3:1");
    settings.counter_mode = CounterMode::Atomic;
    let balancer = common::spawn_balancer(settings).await;
    let client = common::no_redirect_client();

    let mut decisions = Vec::new();
    for i in 0..4 {
        let video = common::video_url(i);
        let (_, location) = request_location(&client, &balancer.base_url(), &video).await;
        decisions.push(location.unwrap() != video);
    }

    assert_eq!(decisions, vec![true, true, true, false]);
    assert_eq!(balancer.counter.get().await.unwrap(), 4);
    balancer.shutdown.trigger();
}

#[tokio::test]
async fn test_cdn_redirect_preserves_file_server_subdomain() {
    // 3:1 sends the very first request to the CDN
    let balancer = common::spawn_balancer(common::test_settings("3:1")).await;
    let client = common::no_redirect_client();

    let (status, location) =
        request_location(&client, &balancer.base_url(), &common::video_url(7)).await;
    assert_eq!(status, 301);
    assert_eq!(
        location.unwrap(),
        "http://cdn-domain/s1/video/7/file.m3u8"
    );
    balancer.shutdown.trigger();
}

#[tokio::test]
async fn test_unlabeled_host_stays_on_origin_url() {
    let balancer = common::spawn_balancer(common::test_settings("3:1")).await;
    let client = common::no_redirect_client();

    let video = "http://origin-cluster/video/7/file.m3u8";
    let (status, location) = request_location(&client, &balancer.base_url(), video).await;
    assert_eq!(status, 301);
    assert_eq!(location.unwrap(), video);
    balancer.shutdown.trigger();
}

#[tokio::test]
async fn test_missing_video_parameter_is_client_error() {
    let balancer = common::spawn_balancer(common::test_settings("3:1")).await;
    let client = common::no_redirect_client();

    let response = client
        .get(format!("{}/", balancer.base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    // validation failures must not consume a request index
    assert_eq!(balancer.counter.get().await.unwrap(), 0);
    balancer.shutdown.trigger();
}

#[tokio::test]
async fn test_malformed_video_parameter_is_client_error() {
    let balancer = common::spawn_balancer(common::test_settings("3:1")).await;
    let client = common::no_redirect_client();

    for bad in ["123456789", "not a url", "/relative/path"] {
        let (status, location) = request_location(&client, &balancer.base_url(), bad).await;
        assert_eq!(status, 400, "video {bad:?} should be rejected");
        assert!(location.is_none());
    }
    balancer.shutdown.trigger();
}

#[tokio::test]
async fn test_health_endpoint() {
    let balancer = common::spawn_balancer(common::test_settings("1:1")).await;
    let response = reqwest::get(format!("{}/health", balancer.base_url()))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.bytes().await.unwrap().is_empty());
    balancer.shutdown.trigger();
}

#[tokio::test]
async fn test_one_to_one_alternates() {
    let balancer = common::spawn_balancer(common::test_settings("1:1")).await;
    let client = common::no_redirect_client();

    let mut decisions = Vec::new();
    for i in 0..6 {
        let video = common::video_url(i);
        let (_, location) = request_location(&client, &balancer.base_url(), &video).await;
        decisions.push(location.unwrap() != video);
    }
    assert_eq!(decisions, vec![true, false, true, false, true, false]);
    balancer.shutdown.trigger();
}
