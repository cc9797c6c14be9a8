//! Integration tests for ondesnts

use ondesnts::{NtsClient, NtsSource};
use ondessource::{SourceAdapter, SourceError};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn live_json() -> serde_json::Value {
    json!({
        "results": [
            {
                "channel_name": "1",
                "now": {
                    "broadcast_title": "Tim Sweeney",
                    "start_timestamp": "2024-05-01T18:00:00Z",
                    "end_timestamp": "2024-05-01T20:00:00Z",
                    "embeds": {"details": {
                        "name": "Beats In Space",
                        "description": "Weekly show from New York",
                        "genres": [{"id": "house", "value": "House"}, {"id": "disco", "value": "Disco"}],
                        "media": {"picture_large": "https://media.ntslive.co.uk/bis.jpg"},
                        "location_long": "New York"
                    }}
                }
            },
            {
                "channel_name": "2",
                "now": {
                    "broadcast_title": "Replay: Early Mornings",
                    "start_timestamp": "2024-05-01T18:00:00Z",
                    "end_timestamp": "2024-05-01T19:00:00Z"
                }
            }
        ]
    })
}

fn mixtapes_json() -> serde_json::Value {
    json!({
        "results": [
            {
                "mixtape_alias": "poolside",
                "title": "Poolside",
                "subtitle": "Balearic, boogie and yacht rock",
                "audio_stream_endpoint": "https://stream-mixtape-geo.ntslive.net/mixtape4",
                "media": {"picture_large": "https://media.ntslive.co.uk/poolside.jpg"}
            },
            {
                "mixtape_alias": "slow-focus",
                "title": "Slow Focus",
                "description": "Ambient and drone",
                "audio_stream_endpoint": "https://stream-mixtape-geo.ntslive.net/mixtape"
            }
        ]
    })
}

async fn mount(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn source_for(server: &MockServer) -> NtsSource {
    let client = NtsClient::builder()
        .base_url(server.uri())
        .build()
        .await
        .unwrap();
    NtsSource::new(client)
}

#[tokio::test]
async fn test_fetch_channels_live_and_mixtapes() {
    let server = MockServer::start().await;
    mount(&server, "/api/v2/live", ResponseTemplate::new(200).set_body_json(live_json())).await;
    mount(&server, "/api/v2/mixtapes", ResponseTemplate::new(200).set_body_json(mixtapes_json())).await;

    let source = source_for(&server).await;
    let channels = source.fetch_channels().await.unwrap();

    let ids: Vec<&str> = channels.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["nts:1", "nts:2", "nts:mixtape/poolside", "nts:mixtape/slow-focus"]);

    let one = &channels[0];
    assert_eq!(one.name, "NTS 1");
    assert_eq!(one.stream_url, "https://stream-relay-geo.ntslive.net/stream");
    assert_eq!(one.genres, vec!["house", "disco"]);
    let np = one.now_playing.as_ref().unwrap();
    assert_eq!(np.show.as_deref(), Some("Tim Sweeney (New York)"));

    assert_eq!(channels[1].stream_url, "https://stream-relay-geo.ntslive.net/stream2");
    assert_eq!(channels[2].description.as_deref(), Some("Balearic, boogie and yacht rock"));
    assert_eq!(channels[3].description.as_deref(), Some("Ambient and drone"));
}

#[tokio::test]
async fn test_mixtape_failure_keeps_live_channels() {
    let server = MockServer::start().await;
    mount(&server, "/api/v2/live", ResponseTemplate::new(200).set_body_json(live_json())).await;
    mount(&server, "/api/v2/mixtapes", ResponseTemplate::new(500)).await;

    let source = source_for(&server).await;
    let channels = source.fetch_channels().await.unwrap();
    assert_eq!(channels.len(), 2);
}

#[tokio::test]
async fn test_live_failure_fails_the_fetch() {
    let server = MockServer::start().await;
    mount(&server, "/api/v2/live", ResponseTemplate::new(503)).await;
    mount(&server, "/api/v2/mixtapes", ResponseTemplate::new(200).set_body_json(mixtapes_json())).await;

    let source = source_for(&server).await;
    assert!(source.fetch_channels().await.is_err());
}

#[tokio::test]
async fn test_now_playing_live_and_mixtape() {
    let server = MockServer::start().await;
    mount(&server, "/api/v2/live", ResponseTemplate::new(200).set_body_json(live_json())).await;

    let source = source_for(&server).await;

    let np = source.now_playing("2").await.unwrap().unwrap();
    assert_eq!(np.show.as_deref(), Some("Replay: Early Mornings"));
    assert_eq!(
        (np.ends_at.unwrap() - np.started_at.unwrap()).num_minutes(),
        60
    );

    assert!(source.now_playing("mixtape/poolside").await.unwrap().is_none());
    assert!(matches!(
        source.now_playing("3").await,
        Err(SourceError::ChannelNotFound(_))
    ));
}

#[tokio::test]
async fn test_mixtape_stream_url_loads_listing_on_demand() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/mixtapes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mixtapes_json()))
        .expect(1)
        .mount(&server)
        .await;

    let source = source_for(&server).await;
    assert_eq!(
        source.stream_url("mixtape/poolside").await.unwrap(),
        "https://stream-mixtape-geo.ntslive.net/mixtape4"
    );
    // Served from the remembered listing
    assert_eq!(
        source.stream_url("mixtape/slow-focus").await.unwrap(),
        "https://stream-mixtape-geo.ntslive.net/mixtape"
    );
    assert_eq!(
        source.stream_url("1").await.unwrap(),
        "https://stream-relay-geo.ntslive.net/stream"
    );
}

#[tokio::test]
async fn test_unknown_mixtape() {
    let server = MockServer::start().await;
    mount(&server, "/api/v2/mixtapes", ResponseTemplate::new(200).set_body_json(mixtapes_json())).await;

    let source = source_for(&server).await;
    assert!(matches!(
        source.stream_url("mixtape/nope").await,
        Err(SourceError::ChannelNotFound(_))
    ));
}
