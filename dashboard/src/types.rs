//! Catalog and stream data shapes

use serde::{Deserialize, Serialize};

/// One release date entry from the catalog; only the year is used
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseDate {
    pub y: Option<u16>,
}

/// A catalog entry as returned by search; also the shape persisted in the
/// followed-games preference
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameOption {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_dates: Option<Vec<ReleaseDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl GameOption {
    /// Earliest known release year
    pub fn first_release_year(&self) -> Option<u16> {
        self.release_dates.as_ref()?.iter().filter_map(|r| r.y).min()
    }

    /// Display label: name plus earliest release year when known
    pub fn label(&self) -> String {
        match self.first_release_year() {
            Some(year) => format!("{} ({})", self.name, year),
            None => self.name.clone(),
        }
    }
}

/// Envelope wrapping every helix response
#[derive(Clone, Debug, Deserialize)]
pub struct HelixResponse<T> {
    pub data: Vec<T>,
}

/// A game as known to the stream provider; only the id is needed to key
/// the stream listing
#[derive(Clone, Debug, Deserialize)]
pub struct HelixGame {
    pub id: String,
}

/// A live stream
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stream {
    pub id: String,
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
    pub game_id: String,
    pub game_name: String,
    pub title: String,
    pub viewer_count: u64,
    pub language: String,
    pub thumbnail_url: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Stream {
    /// Thumbnail URL with the provider's size template filled in
    pub fn thumbnail(&self, width: u32, height: u32) -> String {
        self.thumbnail_url
            .replace("{width}x{height}", &format!("{}x{}", width, height))
    }

    /// The broadcaster's channel page
    pub fn channel_url(&self) -> String {
        format!("https://www.twitch.tv/{}", self.user_login)
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
