//! HTTP probe behavior against a mock relay

use std::time::{Duration, Instant};

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use relay_scout::config::ProbeConfig;
use relay_scout::config::defaults::DEFAULT_USER_AGENT;
use relay_scout::errors::ProbeErrorKind;
use relay_scout::models::AliveReason;
use relay_scout::prober::{HttpStreamProber, Prober, TransportProber};

const STREAM_PATH: &str = "/udp/239.77.0.1:5146";

fn prober() -> HttpStreamProber {
    HttpStreamProber::from_config(&ProbeConfig {
        http_timeout: Duration::from_secs(2),
        ..ProbeConfig::default()
    })
    .unwrap()
}

fn stream_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), STREAM_PATH)
}

fn browser_user_agent(request: &Request) -> bool {
    request
        .headers
        .get("user-agent")
        .and_then(|value| value.to_str().ok())
        == Some(DEFAULT_USER_AGENT)
}

#[tokio::test]
async fn head_success_skips_streaming_get() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path(STREAM_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = prober().probe_http(&stream_url(&server)).await;
    assert_eq!(outcome, Ok(AliveReason::HeadOk));
}

#[tokio::test]
async fn media_content_type_is_alive_without_body() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(STREAM_PATH))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "video/mp2t"))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = prober().probe_http(&stream_url(&server)).await;
    assert_eq!(outcome, Ok(AliveReason::MediaContentType));
}

#[tokio::test]
async fn any_body_bytes_count_as_alive() {
    let server = MockServer::start().await;

    // No HEAD mock: the server answers 404 and the probe falls through
    Mock::given(method("GET"))
        .and(path(STREAM_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not a stream</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = prober().probe_http(&stream_url(&server)).await;
    assert_eq!(outcome, Ok(AliveReason::BodyData));
}

#[tokio::test]
async fn empty_body_is_no_data() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let failure = prober().probe_http(&stream_url(&server)).await.unwrap_err();
    assert_eq!(failure.kind, ProbeErrorKind::NoData);
}

#[tokio::test]
async fn unexpected_status_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("gone"))
        .mount(&server)
        .await;

    let failure = prober().probe_http(&stream_url(&server)).await.unwrap_err();
    assert_eq!(failure.kind, ProbeErrorKind::Status);
}

#[tokio::test]
async fn unfollowed_redirect_with_body_is_alive() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", "/elsewhere")
                .set_body_string("moved"),
        )
        .mount(&server)
        .await;

    let prober = HttpStreamProber::from_config(&ProbeConfig {
        follow_redirects: false,
        http_timeout: Duration::from_secs(2),
        ..ProbeConfig::default()
    })
    .unwrap();

    let outcome = prober.probe_http(&stream_url(&server)).await;
    assert_eq!(outcome, Ok(AliveReason::BodyData));
}

#[tokio::test]
async fn slow_relay_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let prober = HttpStreamProber::from_config(&ProbeConfig {
        http_timeout: Duration::from_millis(200),
        ..ProbeConfig::default()
    })
    .unwrap();

    let started = Instant::now();
    let failure = prober.probe_http(&stream_url(&server)).await.unwrap_err();
    assert_eq!(failure.kind, ProbeErrorKind::Timeout);
    // HEAD and GET share one deadline
    assert!(
        started.elapsed() < Duration::from_millis(450),
        "took {:?}",
        started.elapsed()
    );
}

#[tokio::test]
async fn transport_prober_routes_http_urls() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let prober = TransportProber::from_config(&ProbeConfig::default()).unwrap();
    let outcome = prober.probe(&stream_url(&server)).await;
    assert_eq!(outcome, Ok(AliveReason::HeadOk));
}

#[tokio::test]
async fn both_requests_carry_browser_user_agent() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path(STREAM_PATH))
        .and(browser_user_agent)
        .respond_with(ResponseTemplate::new(405))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(STREAM_PATH))
        .and(browser_user_agent)
        .respond_with(ResponseTemplate::new(200).set_body_string("ts"))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = prober().probe_http(&stream_url(&server)).await;
    assert_eq!(outcome, Ok(AliveReason::BodyData));
}

#[tokio::test]
async fn first_stream_item_is_enough_with_single_chunk_cap() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x47u8; 4096]))
        .mount(&server)
        .await;

    let prober = HttpStreamProber::from_config(&ProbeConfig {
        max_chunks: 1,
        http_timeout: Duration::from_secs(2),
        ..ProbeConfig::default()
    })
    .unwrap();

    let outcome = prober.probe_http(&stream_url(&server)).await;
    assert_eq!(outcome, Ok(AliveReason::BodyData));
}
