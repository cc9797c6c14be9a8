//! Integration tests for ondeskexp

use ondeskexp::{KexpClient, KexpSource};
use ondessource::{SourceAdapter, SourceError};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn source_for(server: &MockServer) -> KexpSource {
    let client = KexpClient::builder()
        .api_base(server.uri())
        .build()
        .await
        .unwrap();
    KexpSource::new(client)
}

async fn mount_plays(server: &MockServer, play: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/v2/plays/"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "next": null,
            "results": [play]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_track_play_with_show() {
    let server = MockServer::start().await;
    mount_plays(
        &server,
        json!({
            "id": 3381234,
            "play_type": "trackplay",
            "airdate": "2024-05-01T08:15:00-07:00",
            "song": "Alright",
            "artist": "Kendrick Lamar",
            "album": "To Pimp a Butterfly",
            "thumbnail_uri": "https://ia800.us.archive.org/thumb.jpg",
            "image_uri": "",
            "show": 60210
        }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/v2/shows/60210/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 60210,
            "program_name": "The Morning Show",
            "host_names": ["John Richards"]
        })))
        .mount(&server)
        .await;

    let source = source_for(&server).await;
    let np = source.now_playing("kexp").await.unwrap().unwrap();

    assert_eq!(np.title.as_deref(), Some("Alright"));
    assert_eq!(np.artist.as_deref(), Some("Kendrick Lamar"));
    assert_eq!(np.album.as_deref(), Some("To Pimp a Butterfly"));
    assert_eq!(np.artwork.as_deref(), Some("https://ia800.us.archive.org/thumb.jpg"));
    assert_eq!(np.show.as_deref(), Some("The Morning Show with John Richards"));
    assert!(np.started_at.is_some());
}

#[tokio::test]
async fn test_airbreak_shows_only_the_show() {
    let server = MockServer::start().await;
    mount_plays(
        &server,
        json!({"id": 1, "play_type": "airbreak", "airdate": "2024-05-01T08:20:00-07:00", "show": 60210}),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/v2/shows/60210/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 60210,
            "program_name": "Midday Show",
            "host_names": []
        })))
        .mount(&server)
        .await;

    let source = source_for(&server).await;
    let np = source.now_playing("kexp").await.unwrap().unwrap();
    assert!(np.title.is_none());
    assert!(np.artist.is_none());
    assert_eq!(np.show.as_deref(), Some("Midday Show"));
    assert_eq!(np.display().as_deref(), Some("Midday Show"));
}

#[tokio::test]
async fn test_show_lookup_failure_is_not_fatal() {
    let server = MockServer::start().await;
    mount_plays(
        &server,
        json!({"id": 2, "play_type": "trackplay", "song": "Teardrop", "artist": "Massive Attack", "show": 99}),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/v2/shows/99/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let source = source_for(&server).await;
    let np = source.now_playing("kexp").await.unwrap().unwrap();
    assert_eq!(np.display().as_deref(), Some("Massive Attack - Teardrop"));
    assert!(np.show.is_none());
}

#[tokio::test]
async fn test_airbreak_without_show_is_none() {
    let server = MockServer::start().await;
    mount_plays(&server, json!({"id": 3, "play_type": "airbreak"})).await;

    let source = source_for(&server).await;
    assert!(source.now_playing("kexp").await.unwrap().is_none());
}

#[tokio::test]
async fn test_single_static_channel() {
    let server = MockServer::start().await;
    let source = source_for(&server).await;

    let channels = source.fetch_channels().await.unwrap();
    assert_eq!(channels.len(), 1);
    assert_eq!(channels[0].id, "kexp:kexp");
    assert_eq!(
        source.stream_url("kexp").await.unwrap(),
        "https://kexp-mp3-128.streamguys1.com/kexp128.mp3"
    );
    assert!(matches!(
        source.stream_url("kexp2").await,
        Err(SourceError::ChannelNotFound(_))
    ));
}

#[tokio::test]
async fn test_plays_error_maps_to_source_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/plays/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let source = source_for(&server).await;
    assert!(matches!(
        source.now_playing("kexp").await,
        Err(SourceError::SourceUnavailable(_))
    ));
}
