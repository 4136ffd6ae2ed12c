// Instance-based revision of youtube_transcript_api
//
//   api = YouTubeTranscriptApi()
//   api.list(video_id)                  -> TranscriptList
//   api.fetch(video_id, languages=[..]) -> FetchedTranscript
//
// The client is built lazily inside the script so a failing constructor
// surfaces as a normal error result.

use async_trait::async_trait;
use log::info;

use super::python::{PythonBridge, ScriptedSource};
use super::traits::{CaptionSource, FetchTarget, Revision};
use crate::captions::errors::TranscriptError;
use crate::captions::models::{CaptionSegment, TrackDescriptor, VideoId};

const SURFACE: &str = r#"
_client = None


def client():
    global _client
    if _client is None:
        from youtube_transcript_api import YouTubeTranscriptApi
        _client = YouTubeTranscriptApi()
    return _client


def list_tracks(vid):
    return client().list(vid)


def fetch_language(vid, code):
    return client().fetch(vid, languages=[code])
"#;

pub struct ClientApiSource {
    inner: ScriptedSource,
}

impl ClientApiSource {
    pub fn new(bridge: PythonBridge) -> Self {
        Self {
            inner: ScriptedSource::new(bridge, SURFACE),
        }
    }
}

#[async_trait]
impl CaptionSource for ClientApiSource {
    fn name(&self) -> &'static str {
        "transcript-api-client"
    }

    fn revision(&self) -> Revision {
        Revision::Client
    }

    async fn list(&self, video_id: &VideoId) -> Result<Vec<TrackDescriptor>, TranscriptError> {
        let tracks = self.inner.list(video_id).await?;
        info!("[{}] {} track(s) for {}", self.name(), tracks.len(), video_id);
        Ok(tracks)
    }

    async fn fetch(
        &self,
        video_id: &VideoId,
        target: &FetchTarget,
    ) -> Result<Vec<CaptionSegment>, TranscriptError> {
        let segments = self.inner.fetch(video_id, target).await?;
        info!("[{}] Fetched {} segment(s) for {}", self.name(), segments.len(), video_id);
        Ok(segments)
    }
}
