// CaptionSource trait and common types

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

use crate::captions::errors::TranscriptError;
use crate::captions::models::{CaptionSegment, TrackDescriptor, VideoId};

/// Interface revision of the caption library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Revision {
    /// Instance API: `YouTubeTranscriptApi().list(id)` / `.fetch(id, languages)`
    Client,
    /// Static API: `YouTubeTranscriptApi.list_transcripts(id)` / `.get_transcript(id, languages)`
    Static,
}

impl Revision {
    /// Label reported as `apiMode` in status output
    pub fn api_mode(&self) -> &'static str {
        match self {
            Self::Client => "NEW",
            Self::Static => "OLD",
        }
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client => write!(f, "client"),
            Self::Static => write!(f, "static"),
        }
    }
}

/// What to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchTarget {
    /// A track from `list`, possibly passed through `translate`
    Track(TrackDescriptor),
    /// Straight fetch by language code; no listing, no translation
    Language(String),
}

impl FetchTarget {
    /// Languages to report if the source finds nothing
    pub fn requested_languages(&self) -> Vec<String> {
        match self {
            Self::Track(track) => vec![track.translated_to.clone().unwrap_or_else(|| track.code.clone())],
            Self::Language(code) => vec![code.clone()],
        }
    }
}

/// Uniform capability surface over both library revisions
#[async_trait]
pub trait CaptionSource: Send + Sync {
    /// Name of the source (for logging)
    fn name(&self) -> &'static str;

    fn revision(&self) -> Revision;

    /// Available tracks, in the order the library reports them
    async fn list(&self, video_id: &VideoId) -> Result<Vec<TrackDescriptor>, TranscriptError>;

    /// Raw segments for a track or a language code
    async fn fetch(
        &self,
        video_id: &VideoId,
        target: &FetchTarget,
    ) -> Result<Vec<CaptionSegment>, TranscriptError>;

    /// Mark a listed track for translation.
    ///
    /// The translation itself happens when the returned descriptor is fetched.
    fn translate(
        &self,
        track: &TrackDescriptor,
        target_language: &str,
    ) -> Result<TrackDescriptor, TranscriptError> {
        let target_language = target_language.trim();
        if target_language.is_empty() {
            return Err(TranscriptError::SelectionError(
                "Translation target language is empty".to_string(),
            ));
        }

        Ok(TrackDescriptor {
            translated_to: Some(target_language.to_string()),
            ..track.clone()
        })
    }
}

#[async_trait]
impl<T: CaptionSource + ?Sized> CaptionSource for std::sync::Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn revision(&self) -> Revision {
        (**self).revision()
    }

    async fn list(&self, video_id: &VideoId) -> Result<Vec<TrackDescriptor>, TranscriptError> {
        (**self).list(video_id).await
    }

    async fn fetch(
        &self,
        video_id: &VideoId,
        target: &FetchTarget,
    ) -> Result<Vec<CaptionSegment>, TranscriptError> {
        (**self).fetch(video_id, target).await
    }

    fn translate(
        &self,
        track: &TrackDescriptor,
        target_language: &str,
    ) -> Result<TrackDescriptor, TranscriptError> {
        (**self).translate(track, target_language)
    }
}
