// Video id extraction from the URL forms users paste
//
// Recognised, in order:
// - https://youtu.be/<id>
// - https://www.youtube.com/watch?v=<id>
// - https://www.youtube.com/embed/<id>
// - <id> on its own

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use url::Url;

use super::errors::TranscriptError;
use super::models::VideoId;

lazy_static! {
    static ref BARE_ID_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap();
    static ref SHORT_LINK_RE: Regex =
        Regex::new(r"^https?://(?:www\.)?youtu\.be/([^?&#/]+)").unwrap();
}

const ID_TERMINATORS: &[char] = &['?', '&', '#', '/'];

/// Extract the canonical video id from a URL or bare id
pub fn extract(input: &str) -> Result<VideoId, TranscriptError> {
    let input = input.trim();

    let candidate = short_link_id(input)
        .or_else(|| youtube_url_id(input))
        .or_else(|| BARE_ID_RE.is_match(input).then(|| input.to_string()));

    match candidate {
        Some(id) => {
            debug!("[VideoId] {} -> {}", input, id);
            Ok(VideoId::new_unchecked(id))
        }
        None => Err(TranscriptError::InvalidReference(input.to_string())),
    }
}

/// Whether `candidate` has the shape of a video id
pub fn is_valid_id(candidate: &str) -> bool {
    BARE_ID_RE.is_match(candidate)
}

fn short_link_id(input: &str) -> Option<String> {
    let caps = SHORT_LINK_RE.captures(input)?;
    let id = caps.get(1)?.as_str();
    is_valid_id(id).then(|| id.to_string())
}

/// Canonical `watch?v=` and `/embed/` forms on any youtube.com host
fn youtube_url_id(input: &str) -> Option<String> {
    let url = Url::parse(input).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let host = url.host_str()?.to_lowercase();
    if !host.ends_with("youtube.com") {
        return None;
    }

    let id = if url.path() == "/watch" {
        url.query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())
            .filter(|v| !v.is_empty())?
    } else {
        let rest = url.path().strip_prefix("/embed/")?;
        rest.split(ID_TERMINATORS).next()?.to_string()
    };

    is_valid_id(&id).then_some(id)
}
