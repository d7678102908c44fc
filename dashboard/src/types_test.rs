use super::*;

fn game(years: &[Option<u16>]) -> GameOption {
    GameOption {
        id: 7,
        name: "Quake".to_string(),
        release_dates: Some(years.iter().map(|y| ReleaseDate { y: *y }).collect()),
        url: None,
    }
}

// =============================================================================
// GameOption
// =============================================================================

#[test]
fn first_release_year_is_the_minimum() {
    assert_eq!(
        game(&[Some(2005), Some(1996), Some(1999)]).first_release_year(),
        Some(1996)
    );
}

#[test]
fn first_release_year_skips_unknown_years() {
    assert_eq!(game(&[None, Some(1999), None]).first_release_year(), Some(1999));
    assert_eq!(game(&[None]).first_release_year(), None);
}

#[test]
fn first_release_year_without_dates_is_none() {
    let game = GameOption {
        id: 7,
        name: "Quake".to_string(),
        release_dates: None,
        url: None,
    };
    assert_eq!(game.first_release_year(), None);
}

#[test]
fn label_includes_year_when_known() {
    assert_eq!(game(&[Some(1996)]).label(), "Quake (1996)");
    assert_eq!(game(&[None]).label(), "Quake");
}

#[test]
fn game_option_decodes_catalog_shape() {
    let json = r#"{
        "id": 358,
        "name": "Quake",
        "release_dates": [{"y": 1996}, {"y": 1997}],
        "url": "https://www.igdb.com/games/quake"
    }"#;
    let parsed: GameOption = serde_json::from_str(json).unwrap();
    assert_eq!(parsed.id, 358);
    assert_eq!(parsed.first_release_year(), Some(1996));
}

#[test]
fn game_option_decodes_without_optional_fields() {
    let parsed: GameOption = serde_json::from_str(r#"{"id": 358, "name": "Quake"}"#).unwrap();
    assert_eq!(parsed.release_dates, None);
    assert_eq!(parsed.url, None);
}

#[test]
fn game_option_round_trips_through_json() {
    let original = game(&[Some(1996)]);
    let encoded = serde_json::to_string(&original).unwrap();
    let decoded: GameOption = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, original);
}

// =============================================================================
// Stream
// =============================================================================

fn stream() -> Stream {
    Stream {
        id: "1".to_string(),
        user_id: "2".to_string(),
        user_login: "quakelive".to_string(),
        user_name: "QuakeLive".to_string(),
        game_id: "3".to_string(),
        game_name: "Quake".to_string(),
        title: "duels".to_string(),
        viewer_count: 123,
        language: "en".to_string(),
        thumbnail_url: "https://cdn.example/preview-{width}x{height}.jpg".to_string(),
        tags: vec!["FPS".to_string()],
    }
}

#[test]
fn thumbnail_fills_in_the_size_template() {
    assert_eq!(
        stream().thumbnail(320, 180),
        "https://cdn.example/preview-320x180.jpg"
    );
}

#[test]
fn channel_url_uses_the_login_name() {
    assert_eq!(stream().channel_url(), "https://www.twitch.tv/quakelive");
}

#[test]
fn stream_decodes_helix_envelope() {
    let json = r#"{
        "data": [{
            "id": "40952121085",
            "user_id": "101051819",
            "user_login": "afro",
            "user_name": "Afro",
            "game_id": "32399",
            "game_name": "Counter-Strike",
            "title": "friday night",
            "viewer_count": 1490,
            "language": "en",
            "thumbnail_url": "https://cdn.example/live-{width}x{height}.jpg",
            "tags": ["English", "FPS"]
        }]
    }"#;
    let parsed: HelixResponse<Stream> = serde_json::from_str(json).unwrap();
    assert_eq!(parsed.data.len(), 1);
    assert_eq!(parsed.data[0].user_name, "Afro");
    assert_eq!(parsed.data[0].viewer_count, 1490);
}

#[test]
fn stream_tags_default_to_empty_when_absent() {
    let json = r#"{
        "id": "1", "user_id": "2", "user_login": "a", "user_name": "A",
        "game_id": "3", "game_name": "G", "title": "t", "viewer_count": 0,
        "language": "en", "thumbnail_url": "u"
    }"#;
    let parsed: Stream = serde_json::from_str(json).unwrap();
    assert!(parsed.tags.is_empty());
}
