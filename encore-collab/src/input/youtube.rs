use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use url::Url;

use super::{InputError, Metadata};

lazy_static! {
    /// Matches canonical, shortened, embed, `/v/`, and mobile video links,
    /// all carrying an 11 character video id in the first capture group.
    static ref VIDEO_LINK_REGEX: Regex = Regex::new(
        r"^(?:(?:https?:)?//)?(?:www\.)?(?:m\.)?(?:youtu(?:be)?\.com/(?:v/|embed/|watch(?:/|\?v=))|youtu\.be/)((?:\w|-){11})(?:\S+)?$"
    )
    .expect("video link regex compiles");
}

/// A submitted YouTube link, reduced to its canonical video id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoLink {
    pub id: String,
    pub url: String,
}

impl VideoLink {
    /// Returns true if the given url matches a supported video link form
    pub fn test(url: &str) -> bool {
        VIDEO_LINK_REGEX.is_match(url.trim())
    }

    /// Parses a submitted url, extracting the 11 character video id
    pub fn parse(url: &str) -> Result<Self, InputError> {
        let url = url.trim();

        let id = VIDEO_LINK_REGEX
            .captures(url)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or(InputError::UnsupportedUrl)?;

        Ok(Self {
            id,
            url: url.to_string(),
        })
    }
}

/// Resolves display metadata for a video id from the YouTube data API
pub struct YouTubeLookup {
    client: reqwest::Client,
    api_key: String,
}

const VIDEOS_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/videos";

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoResource>,
}

#[derive(Debug, Deserialize)]
struct VideoResource {
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: String,
    #[serde(default)]
    thumbnails: std::collections::HashMap<String, Thumbnail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    pub width: Option<u32>,
}

impl YouTubeLookup {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
        }
    }

    /// Fetches the title and thumbnail candidates of a video.
    /// A missing video or a malformed payload surfaces as an error, so a
    /// submission is never persisted with partial display data.
    pub async fn metadata(&self, video_id: &str) -> Result<Metadata, InputError> {
        let endpoint = Url::parse_with_params(
            VIDEOS_ENDPOINT,
            &[
                ("part", "snippet"),
                ("id", video_id),
                ("key", self.api_key.as_str()),
            ],
        )
        .map_err(|e| InputError::FetchError(e.to_string()))?;

        let response: VideoListResponse = self
            .client
            .get(endpoint)
            .send()
            .await
            .map_err(|e| InputError::FetchError(e.to_string()))?
            .error_for_status()
            .map_err(|e| InputError::FetchError(e.to_string()))?
            .json()
            .await
            .map_err(|e| InputError::ParseError(e.to_string()))?;

        let snippet = response
            .items
            .into_iter()
            .next()
            .map(|r| r.snippet)
            .ok_or(InputError::NotFound)?;

        let thumbnails: Vec<_> = snippet.thumbnails.into_values().collect();
        let (small_thumbnail, big_thumbnail) = select_thumbnails(thumbnails);

        Ok(Metadata {
            title: snippet.title,
            small_thumbnail,
            big_thumbnail,
        })
    }
}

/// Picks the second largest candidate as the small thumbnail and the largest
/// as the big one, falling back to the largest alone when fewer than two
/// candidates exist.
fn select_thumbnails(mut thumbnails: Vec<Thumbnail>) -> (Option<String>, Option<String>) {
    // Sort to get the largest at end
    thumbnails.sort_by(|a, b| a.width.cmp(&b.width));

    let big = thumbnails.pop().map(|t| t.url);
    let small = thumbnails.pop().map(|t| t.url).or_else(|| big.clone());

    (small, big)
}
