// Static revision of youtube_transcript_api
//
//   YouTubeTranscriptApi.list_transcripts(video_id)
//   YouTubeTranscriptApi.get_transcript(video_id, languages=[..]) -> [dict]

use async_trait::async_trait;
use log::info;

use super::python::{PythonBridge, ScriptedSource};
use super::traits::{CaptionSource, FetchTarget, Revision};
use crate::captions::errors::TranscriptError;
use crate::captions::models::{CaptionSegment, TrackDescriptor, VideoId};

const SURFACE: &str = r#"
def list_tracks(vid):
    from youtube_transcript_api import YouTubeTranscriptApi
    return YouTubeTranscriptApi.list_transcripts(vid)


def fetch_language(vid, code):
    from youtube_transcript_api import YouTubeTranscriptApi
    return YouTubeTranscriptApi.get_transcript(vid, languages=[code])
"#;

pub struct StaticApiSource {
    inner: ScriptedSource,
}

impl StaticApiSource {
    pub fn new(bridge: PythonBridge) -> Self {
        Self {
            inner: ScriptedSource::new(bridge, SURFACE),
        }
    }
}

#[async_trait]
impl CaptionSource for StaticApiSource {
    fn name(&self) -> &'static str {
        "transcript-api-static"
    }

    fn revision(&self) -> Revision {
        Revision::Static
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
