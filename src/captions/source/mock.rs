// Scripted caption source for tests
//
// Serves a fixed track list and per-language segments, records every call,
// and can be told to fail list or fetch with a given error.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::traits::{CaptionSource, FetchTarget, Revision};
use crate::captions::errors::TranscriptError;
use crate::captions::models::{CaptionSegment, TrackDescriptor, VideoId};

/// Call recorded by [`MockCaptionSource`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    List(String),
    FetchTrack { video_id: String, index: usize, translated_to: Option<String> },
    FetchLanguage { video_id: String, code: String },
}

#[derive(Debug)]
pub struct MockCaptionSource {
    revision: Revision,
    tracks: Vec<TrackDescriptor>,
    /// Keyed by exact language code, or "<code>-><target>" for translations
    segments: HashMap<String, Vec<CaptionSegment>>,
    list_error: Option<TranscriptError>,
    fetch_error: Option<TranscriptError>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockCaptionSource {
    pub fn new(revision: Revision) -> Self {
        Self {
            revision,
            tracks: Vec::new(),
            segments: HashMap::new(),
            list_error: None,
            fetch_error: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Add a track; its index is its position
    pub fn with_track(mut self, code: &str, name: &str, is_auto: bool) -> Self {
        let index = self.tracks.len();
        self.tracks.push(TrackDescriptor::new(index, code, name, is_auto));
        self
    }

    pub fn with_segments(mut self, code: &str, segments: Vec<CaptionSegment>) -> Self {
        self.segments.insert(code.to_string(), segments);
        self
    }

    pub fn with_translation(mut self, from: &str, to: &str, segments: Vec<CaptionSegment>) -> Self {
        self.segments.insert(format!("{}->{}", from, to), segments);
        self
    }

    pub fn failing_list(mut self, error: TranscriptError) -> Self {
        self.list_error = Some(error);
        self
    }

    pub fn failing_fetch(mut self, error: TranscriptError) -> Self {
        self.fetch_error = Some(error);
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: MockCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn segments_for(
        &self,
        video_id: &VideoId,
        key: String,
        requested: String,
    ) -> Result<Vec<CaptionSegment>, TranscriptError> {
        self.segments
            .get(&key)
            .cloned()
            .ok_or_else(|| TranscriptError::NoTranscriptFound {
                video_id: video_id.clone(),
                languages: vec![requested],
            })
    }
}

#[async_trait]
impl CaptionSource for MockCaptionSource {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn revision(&self) -> Revision {
        self.revision
    }

    async fn list(&self, video_id: &VideoId) -> Result<Vec<TrackDescriptor>, TranscriptError> {
        self.record(MockCall::List(video_id.to_string()));
        match &self.list_error {
            Some(err) => Err(err.clone()),
            None => Ok(self.tracks.clone()),
        }
    }

    async fn fetch(
        &self,
        video_id: &VideoId,
        target: &FetchTarget,
    ) -> Result<Vec<CaptionSegment>, TranscriptError> {
        match target {
            FetchTarget::Track(track) => self.record(MockCall::FetchTrack {
                video_id: video_id.to_string(),
                index: track.index,
                translated_to: track.translated_to.clone(),
            }),
            FetchTarget::Language(code) => self.record(MockCall::FetchLanguage {
                video_id: video_id.to_string(),
                code: code.clone(),
            }),
        }

        if let Some(err) = &self.fetch_error {
            return Err(err.clone());
        }

        match target {
            FetchTarget::Track(track) => match &track.translated_to {
                Some(to) => {
                    self.segments_for(video_id, format!("{}->{}", track.code, to), to.clone())
                }
                None => self.segments_for(video_id, track.code.clone(), track.code.clone()),
            },
            // Exact lookup, as the library does for `languages=[code]`
            FetchTarget::Language(code) => self.segments_for(video_id, code.clone(), code.clone()),
        }
    }
}
