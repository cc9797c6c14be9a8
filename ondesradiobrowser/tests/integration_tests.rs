//! Integration tests for ondesradiobrowser

use ondesradiobrowser::{RadioBrowserClient, RadioBrowserSource, StationQuery};
use ondessource::{SourceAdapter, SourceError};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const UUID: &str = "9617a958-0601-11e8-ae97-52543be04c81";

fn stations_json() -> serde_json::Value {
    json!([
        {
            "stationuuid": UUID,
            "name": "FIP",
            "url": "http://direct.fipradio.fr/live/fip-midfi.mp3",
            "url_resolved": "https://icecast.radiofrance.fr/fip-midfi.mp3",
            "homepage": "https://www.radiofrance.fr/fip",
            "favicon": "https://www.radiofrance.fr/fip.png",
            "tags": "eclectic,jazz,world",
            "countrycode": "FR",
            "codec": "MP3",
            "bitrate": 128,
            "clickcount": 4521,
            "lastcheckok": 1
        },
        {
            "stationuuid": "00000000-0000-0000-0000-000000000000",
            "name": "Broken",
            "url": "",
            "url_resolved": "",
            "lastcheckok": 0
        }
    ])
}

fn dead_mirror() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

async fn client_for(mirrors: Vec<String>) -> RadioBrowserClient {
    RadioBrowserClient::builder()
        .mirrors(mirrors)
        .timeout(Duration::from_secs(2))
        .build()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_catalog_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/stations/search"))
        .and(query_param("limit", "20"))
        .and(query_param("order", "clickcount"))
        .and(query_param("reverse", "true"))
        .and(query_param("hidebroken", "true"))
        .and(query_param("countrycode", "FR"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stations_json()))
        .mount(&server)
        .await;

    let source = RadioBrowserSource::new(client_for(vec![server.uri()]).await)
        .with_catalog(StationQuery::top(20).countrycode(Some("fr".into())));
    let channels = source.fetch_channels().await.unwrap();

    // The station without any stream URL is dropped
    assert_eq!(channels.len(), 1);
    let fip = &channels[0];
    assert_eq!(fip.id, format!("radiobrowser:{}", UUID));
    assert_eq!(fip.stream_url, "https://icecast.radiofrance.fr/fip-midfi.mp3");
    assert_eq!(fip.genres, vec!["eclectic", "jazz", "world"]);
    assert_eq!(fip.listeners, Some(4521));
    assert_eq!(fip.codec.as_deref(), Some("mp3"));
    assert_eq!(fip.bitrate, Some(128));
}

#[tokio::test]
async fn test_search_by_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/stations/search"))
        .and(query_param("name", "fip"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stations_json()))
        .mount(&server)
        .await;

    let source = RadioBrowserSource::new(client_for(vec![server.uri()]).await);
    assert!(source.capabilities().supports_search);

    let results = source.search("fip").await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "FIP");

    assert!(source.search("   ").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_falls_through_dead_mirror() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/stations/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stations_json()))
        .mount(&server)
        .await;

    let client = client_for(vec![dead_mirror(), server.uri()]).await;
    let stations = client.search(&StationQuery::top(10)).await.unwrap();
    assert_eq!(stations.len(), 2);

    // The mirror that answered is tried first next time
    assert_eq!(client.current_mirror(), server.uri());
}

#[tokio::test]
async fn test_error_status_does_not_fall_through() {
    let failing = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&failing)
        .await;

    let healthy = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stations_json()))
        .expect(0)
        .mount(&healthy)
        .await;

    let client = client_for(vec![failing.uri(), healthy.uri()]).await;
    let result = client.search(&StationQuery::top(10)).await;
    assert!(matches!(result, Err(ondesradiobrowser::Error::Api(_))));
}

#[tokio::test]
async fn test_all_mirrors_dead() {
    let client = client_for(vec![dead_mirror(), dead_mirror()]).await;
    let source = RadioBrowserSource::new(client);
    assert!(matches!(
        source.fetch_channels().await,
        Err(SourceError::SourceUnavailable(_))
    ));
}

#[tokio::test]
async fn test_stream_url_reports_click() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/json/url/{}", UUID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "message": "retrieved station url",
            "stationuuid": UUID,
            "name": "FIP",
            "url": "https://icecast.radiofrance.fr/fip-hifi.aac"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let source = RadioBrowserSource::new(client_for(vec![server.uri()]).await);
    assert_eq!(
        source.stream_url(UUID).await.unwrap(),
        "https://icecast.radiofrance.fr/fip-hifi.aac"
    );
    assert!(source.now_playing(UUID).await.unwrap().is_none());
}

#[tokio::test]
async fn test_stream_url_unknown_station() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/json/url/{}", UUID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": false,
            "message": "did not find station with matching uuid"
        })))
        .mount(&server)
        .await;

    let source = RadioBrowserSource::new(client_for(vec![server.uri()]).await);
    assert!(matches!(
        source.stream_url(UUID).await,
        Err(SourceError::ChannelNotFound(_))
    ));
    assert!(matches!(
        source.stream_url("not a uuid").await,
        Err(SourceError::ChannelNotFound(_))
    ));
}
