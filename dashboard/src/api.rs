//! IGDB catalog and Twitch stream API client
//!
//! Thin wrappers over the third-party HTTP APIs: credentials are exchanged
//! for a bearer token, free-text catalog search returns candidate games,
//! and the stream listing resolves catalog ids to currently live streams
//! filtered by the user's blacklists. Every call either returns the
//! deserialized JSON payload or collapses the failure into `Err(String)`.

use crate::types::{GameOption, HelixGame, HelixResponse, Stream};
use serde::Deserialize;

const TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";
const IGDB_GAMES_URL: &str = "https://api.igdb.com/v4/games";
const HELIX_GAMES_URL: &str = "https://api.twitch.tv/helix/games";
const HELIX_STREAMS_URL: &str = "https://api.twitch.tv/helix/streams";

/// Languages requested from the stream listing endpoint
const STREAM_LANGUAGES: &[&str] = &["fi", "en"];

/// Credentials for the catalog/stream provider
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub client_id: String,
    pub client_secret: String,
}

impl ApiConfig {
    /// Read credentials from `TWITCH_CLIENT_ID` / `TWITCH_CLIENT_SECRET`
    pub fn from_env() -> Result<Self, String> {
        let client_id = std::env::var("TWITCH_CLIENT_ID")
            .map_err(|_| "TWITCH_CLIENT_ID is not set".to_string())?;
        let client_secret = std::env::var("TWITCH_CLIENT_SECRET")
            .map_err(|_| "TWITCH_CLIENT_SECRET is not set".to_string())?;

        Ok(Self {
            client_id,
            client_secret,
        })
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Exchange client credentials for a bearer token
pub async fn fetch_token(config: ApiConfig) -> Result<String, String> {
    let url = format!(
        "{}?client_id={}&client_secret={}&grant_type=client_credentials",
        TOKEN_URL, config.client_id, config.client_secret
    );

    let client = reqwest::Client::new();
    let response = client
        .post(&url)
        .send()
        .await
        .map_err(|e| format!("Failed to request token: {}", e))?;

    if !response.status().is_success() {
        return Err(format!("Token endpoint returned status: {}", response.status()));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| format!("Failed to parse token response: {}", e))?;

    Ok(token.access_token)
}

/// Free-text catalog search
pub async fn search_games(
    config: ApiConfig,
    token: String,
    term: String,
) -> Result<Vec<GameOption>, String> {
    let client = reqwest::Client::new();
    let response = client
        .post(IGDB_GAMES_URL)
        .header("Accept", "application/json")
        .header("Client-ID", &config.client_id)
        .bearer_auth(&token)
        .body(search_query(&term))
        .send()
        .await
        .map_err(|e| format!("Failed to search catalog: {}", e))?;

    if !response.status().is_success() {
        return Err(format!("Catalog returned status: {}", response.status()));
    }

    response
        .json()
        .await
        .map_err(|e| format!("Failed to parse search response: {}", e))
}

/// IGDB query for a search term: rated main releases only
fn search_query(term: &str) -> String {
    let term = term.replace('"', "");
    format!(
        "search \"{}\"; fields name, id, release_dates.y, url; limit 50; \
         where version_parent = null & game_type = (0, 3, 4, 8) & rating != null;",
        term
    )
}

/// Currently live streams for a set of catalog ids, filtered by the user's
/// blacklists
pub async fn live_streams(
    config: ApiConfig,
    token: String,
    igdb_ids: Vec<u64>,
    blacklisted_tags: Vec<String>,
    blacklisted_users: Vec<String>,
) -> Result<Vec<Stream>, String> {
    let client = reqwest::Client::new();

    // The stream provider keys streams by its own game ids, so the catalog
    // ids have to be resolved first.
    let url = format!("{}?{}", HELIX_GAMES_URL, igdb_id_query(&igdb_ids));
    let response = client
        .get(&url)
        .header("Accept", "application/json")
        .header("Client-ID", &config.client_id)
        .bearer_auth(&token)
        .send()
        .await
        .map_err(|e| format!("Failed to resolve game ids: {}", e))?;

    if !response.status().is_success() {
        return Err(format!("Game lookup returned status: {}", response.status()));
    }

    let games: HelixResponse<HelixGame> = response
        .json()
        .await
        .map_err(|e| format!("Failed to parse game lookup: {}", e))?;

    if games.data.is_empty() {
        return Ok(Vec::new());
    }

    let game_ids: Vec<String> = games.data.into_iter().map(|game| game.id).collect();
    let url = format!(
        "{}?{}{}&type=live&first=100",
        HELIX_STREAMS_URL,
        game_id_query(&game_ids),
        language_query()
    );
    let response = client
        .get(&url)
        .header("Accept", "application/json")
        .header("Client-ID", &config.client_id)
        .bearer_auth(&token)
        .send()
        .await
        .map_err(|e| format!("Failed to list streams: {}", e))?;

    if !response.status().is_success() {
        return Err(format!("Stream listing returned status: {}", response.status()));
    }

    let streams: HelixResponse<Stream> = response
        .json()
        .await
        .map_err(|e| format!("Failed to parse stream listing: {}", e))?;

    Ok(streams
        .data
        .into_iter()
        .filter(|stream| !is_blocked(stream, &blacklisted_tags, &blacklisted_users))
        .collect())
}

fn igdb_id_query(ids: &[u64]) -> String {
    let ids: Vec<String> = ids.iter().map(u64::to_string).collect();
    format!("igdb_id={}", ids.join("&igdb_id="))
}

fn game_id_query(ids: &[String]) -> String {
    format!("game_id={}", ids.join("&game_id="))
}

fn language_query() -> String {
    STREAM_LANGUAGES
        .iter()
        .map(|language| format!("&language={}", language))
        .collect()
}

/// Whether a stream is hidden by the user's blacklists: any blacklisted tag
/// on the stream, or a blacklisted broadcaster name. Both comparisons are
/// case-insensitive.
pub fn is_blocked(stream: &Stream, blacklisted_tags: &[String], blacklisted_users: &[String]) -> bool {
    let user = stream.user_name.to_uppercase();
    if blacklisted_users.iter().any(|blocked| blocked.to_uppercase() == user) {
        return true;
    }

    stream.tags.iter().any(|tag| {
        let tag = tag.to_uppercase();
        blacklisted_tags.iter().any(|blocked| blocked.to_uppercase() == tag)
    })
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
