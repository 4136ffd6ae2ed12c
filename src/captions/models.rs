// Common data models for caption resolution

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical 11-character YouTube video identifier.
///
/// Only the identifier extractor builds these, so everything downstream
/// can trust the value without checking it again.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub(crate) fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One caption track as reported by the caption source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackDescriptor {
    /// Position in the list it came from (0-based). Only meaningful
    /// within that one list call.
    pub index: usize,
    /// Language code (e.g. "en", "pt-BR")
    pub code: String,
    /// Human-readable language name
    pub name: String,
    /// Whether YouTube generated this track automatically
    pub is_auto: bool,
    /// Target language when this descriptor was produced by `translate`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_to: Option<String>,
}

impl TrackDescriptor {
    pub const UNKNOWN_CODE: &'static str = "?";
    pub const UNKNOWN_NAME: &'static str = "Unknown";

    pub fn new(index: usize, code: impl Into<String>, name: impl Into<String>, is_auto: bool) -> Self {
        Self {
            index,
            code: code.into(),
            name: name.into(),
            is_auto,
            translated_to: None,
        }
    }

    /// Build a descriptor from loosely-typed collaborator output.
    ///
    /// Missing or mistyped attributes fall back to defaults instead of
    /// failing; this is the only place those defaults are applied.
    pub fn from_raw(index: usize, raw: &serde_json::Value) -> Self {
        Self {
            index,
            code: raw["language_code"]
                .as_str()
                .unwrap_or(Self::UNKNOWN_CODE)
                .to_string(),
            name: raw["language"]
                .as_str()
                .unwrap_or(Self::UNKNOWN_NAME)
                .to_string(),
            is_auto: raw["is_generated"].as_bool().unwrap_or(false),
            translated_to: None,
        }
    }

    pub fn matches_code(&self, code: &str) -> bool {
        self.code.eq_ignore_ascii_case(code)
    }
}

/// One timed unit of caption text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionSegment {
    pub text: String,
    /// Offset from the start of the video, in seconds
    pub start: f64,
    /// Seconds
    pub duration: f64,
}

impl CaptionSegment {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }

    /// Same default-filling rule as [`TrackDescriptor::from_raw`]
    pub fn from_raw(raw: &serde_json::Value) -> Self {
        Self {
            text: raw["text"].as_str().unwrap_or("").to_string(),
            start: raw["start"].as_f64().unwrap_or(0.0).max(0.0),
            duration: raw["duration"].as_f64().unwrap_or(0.0).max(0.0),
        }
    }
}

/// Which track the caller wants
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TrackChoice {
    /// First track in list order
    #[default]
    Default,
    /// Position in the list returned by the same request's `list` call
    Index(usize),
    /// First track whose code matches, ignoring ASCII case
    Language(String),
}

/// Output shape for a transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Raw `{text, start, duration}` records
    #[default]
    Segments,
    /// One flattened text blob
    Text,
}

/// Caller intent for one transcript request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionCriteria {
    pub choice: TrackChoice,
    pub translate_to: Option<String>,
    pub with_timestamps: bool,
    pub output: OutputMode,
}

impl SelectionCriteria {
    /// Build criteria from loose request options.
    ///
    /// An explicit index takes priority over a language code. Blank strings
    /// count as absent.
    pub fn from_options(
        index: Option<usize>,
        language: Option<String>,
        translate_to: Option<String>,
    ) -> Self {
        let language = language.filter(|l| !l.trim().is_empty());
        let choice = match (index, language) {
            (Some(i), _) => TrackChoice::Index(i),
            (None, Some(code)) => TrackChoice::Language(code.trim().to_string()),
            (None, None) => TrackChoice::Default,
        };

        Self {
            choice,
            translate_to: translate_to
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            ..Self::default()
        }
    }

    pub fn with_timestamps(mut self, enabled: bool) -> Self {
        self.with_timestamps = enabled;
        self
    }

    pub fn with_output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    /// Language code for the direct-fetch path, if that path applies
    pub fn direct_language(&self) -> Option<&str> {
        match (&self.choice, &self.translate_to) {
            (TrackChoice::Language(code), None) => Some(code),
            _ => None,
        }
    }
}

/// Rendered transcript body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptBody {
    Segments(Vec<CaptionSegment>),
    Text(String),
}

/// Successful `ListTracks` result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackListing {
    pub video_id: VideoId,
    pub tracks: Vec<TrackDescriptor>,
}

/// Successful `FetchTranscript` result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptPayload {
    pub video_id: VideoId,
    /// Track the transcript came from; absent on the direct language fetch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track: Option<TrackDescriptor>,
    #[serde(flatten)]
    pub body: TranscriptBody,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_track_from_raw_fills_defaults() {
        let track = TrackDescriptor::from_raw(3, &json!({ "language_code": "de" }));
        assert_eq!(track.index, 3);
        assert_eq!(track.code, "de");
        assert_eq!(track.name, "Unknown");
        assert!(!track.is_auto);

        let empty = TrackDescriptor::from_raw(0, &json!({}));
        assert_eq!(empty.code, "?");
    }

    #[test]
    fn test_segment_from_raw_fills_defaults() {
        let seg = CaptionSegment::from_raw(&json!({ "text": "hello", "start": 1.5 }));
        assert_eq!(seg, CaptionSegment::new("hello", 1.5, 0.0));
    }

    #[test]
    fn test_track_serializes_camel_case() {
        let value = serde_json::to_value(TrackDescriptor::new(0, "en", "English", true)).unwrap();
        assert_eq!(
            value,
            json!({ "index": 0, "code": "en", "name": "English", "isAuto": true })
        );
    }

    #[test]
    fn test_criteria_index_wins_over_language() {
        let criteria = SelectionCriteria::from_options(Some(1), Some("en".into()), None);
        assert_eq!(criteria.choice, TrackChoice::Index(1));
        assert_eq!(criteria.direct_language(), None);
    }

    #[test]
    fn test_criteria_blank_values_are_absent() {
        let criteria = SelectionCriteria::from_options(None, Some("  ".into()), Some("".into()));
        assert_eq!(criteria.choice, TrackChoice::Default);
        assert_eq!(criteria.translate_to, None);
    }

    #[test]
    fn test_direct_language_only_without_translation() {
        let direct = SelectionCriteria::from_options(None, Some("fr".into()), None);
        assert_eq!(direct.direct_language(), Some("fr"));

        let translated = SelectionCriteria::from_options(None, Some("fr".into()), Some("en".into()));
        assert_eq!(translated.direct_language(), None);
    }

    #[test]
    fn test_payload_flattens_body() {
        let payload = TranscriptPayload {
            video_id: VideoId::new_unchecked("dQw4w9WgXcQ"),
            track: None,
            body: TranscriptBody::Text("hi".into()),
        };
        assert_eq!(
            serde_json::to_value(payload).unwrap(),
            json!({ "videoId": "dQw4w9WgXcQ", "text": "hi" })
        );
    }
}
