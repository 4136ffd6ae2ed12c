// CaptionResolver - reference in, tracks or transcript out
//
// extract id -> list -> select -> (translate) -> fetch -> render
//
// A language code with no translation request first tries the library's
// exact-code lookup. If that finds nothing, the request goes through the
// listing like any other, so codes still match case-insensitively.

use log::{debug, info, warn};

use super::errors::TranscriptError;
use super::models::{
    CaptionSegment, SelectionCriteria, TrackDescriptor, TrackListing, TranscriptPayload,
};
use super::render::render;
use super::selector::TrackSelector;
use super::source::{CaptionSource, FetchTarget};
use super::models::VideoId;
use super::video_id;

pub struct CaptionResolver {
    source: Box<dyn CaptionSource>,
}

impl CaptionResolver {
    pub fn new(source: Box<dyn CaptionSource>) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &dyn CaptionSource {
        self.source.as_ref()
    }

    /// `ListTracks(reference)`
    pub async fn list_tracks(&self, reference: &str) -> Result<TrackListing, TranscriptError> {
        let video_id = video_id::extract(reference)?;
        info!("[Resolver] Listing tracks for {} via {}", video_id, self.source.name());

        let tracks = self.source.list(&video_id).await.map_err(|e| {
            warn!("[Resolver] Listing failed for {}: {}", video_id, e);
            e
        })?;

        for track in &tracks {
            debug!("[Resolver] Found language: {} - {}", track.code, track.name);
        }

        Ok(TrackListing { video_id, tracks })
    }

    /// `FetchTranscript(reference, criteria)`
    pub async fn fetch_transcript(
        &self,
        reference: &str,
        criteria: &SelectionCriteria,
    ) -> Result<TranscriptPayload, TranscriptError> {
        let video_id = video_id::extract(reference)?;

        let (track, segments) = match criteria.direct_language() {
            Some(code) => {
                info!("[Resolver] Direct fetch {} [{}]", video_id, code);
                match self
                    .source
                    .fetch(&video_id, &FetchTarget::Language(code.to_string()))
                    .await
                {
                    Ok(segments) => (None, segments),
                    Err(TranscriptError::NoTranscriptFound { .. }) => {
                        debug!("[Resolver] No exact match for [{}], selecting from listing", code);
                        let (track, segments) = self.fetch_listed(&video_id, criteria).await?;
                        (Some(track), segments)
                    }
                    Err(e) => return Err(e),
                }
            }
            None => {
                let (track, segments) = self.fetch_listed(&video_id, criteria).await?;
                (Some(track), segments)
            }
        };

        info!("[Resolver] Got {} caption segment(s) for {}", segments.len(), video_id);

        Ok(TranscriptPayload {
            video_id,
            track,
            body: render(segments, criteria.output, criteria.with_timestamps),
        })
    }

    /// list -> select -> (translate) -> fetch
    async fn fetch_listed(
        &self,
        video_id: &VideoId,
        criteria: &SelectionCriteria,
    ) -> Result<(TrackDescriptor, Vec<CaptionSegment>), TranscriptError> {
        let tracks = self.source.list(video_id).await?;
        let mut track = TrackSelector::select(video_id, &tracks, &criteria.choice)?.clone();

        if let Some(target) = &criteria.translate_to {
            info!("[Resolver] Translating {} [{}] to {}", video_id, track.code, target);
            track = self.source.translate(&track, target)?;
        } else {
            info!("[Resolver] Fetching {} track #{} [{}]", video_id, track.index, track.code);
        }

        let segments = self
            .source
            .fetch(video_id, &FetchTarget::Track(track.clone()))
            .await?;
        Ok((track, segments))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::captions::models::{CaptionSegment, OutputMode, TrackChoice, TranscriptBody};
    use crate::captions::source::mock::{MockCall, MockCaptionSource};
    use crate::captions::source::Revision;

    const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=5";

    fn source() -> MockCaptionSource {
        MockCaptionSource::new(Revision::Client)
            .with_track("th", "Thai", false)
            .with_track("en", "English", true)
            .with_segments("th", vec![CaptionSegment::new("sawasdee", 0.0, 1.0)])
            .with_segments("en", vec![CaptionSegment::new("hello", 1.5, 2.0)])
            .with_translation("th", "en", vec![CaptionSegment::new("hello (translated)", 0.0, 1.0)])
    }

    #[tokio::test]
    async fn test_list_tracks() {
        let resolver = CaptionResolver::new(Box::new(source()));
        let listing = resolver.list_tracks("dQw4w9WgXcQ").await.unwrap();
        assert_eq!(listing.video_id.as_str(), "dQw4w9WgXcQ");
        assert_eq!(listing.tracks.len(), 2);
        assert_eq!(listing.tracks[1].code, "en");
    }

    #[tokio::test]
    async fn test_invalid_reference_never_reaches_source() {
        let resolver = CaptionResolver::new(Box::new(source()));
        let err = resolver.list_tracks("not a url").await.unwrap_err();
        assert_eq!(err.kind(), "invalid_reference");
    }

    #[tokio::test]
    async fn test_default_selection_fetches_first_track() {
        let resolver = CaptionResolver::new(Box::new(source()));
        let payload = resolver
            .fetch_transcript(URL, &SelectionCriteria::default())
            .await
            .unwrap();
        assert_eq!(payload.track.unwrap().code, "th");
        assert_eq!(
            payload.body,
            TranscriptBody::Segments(vec![CaptionSegment::new("sawasdee", 0.0, 1.0)])
        );
    }

    #[tokio::test]
    async fn test_language_only_uses_direct_fetch() {
        let mock = std::sync::Arc::new(source());
        let resolver = CaptionResolver::new(Box::new(mock.clone()));
        let criteria = SelectionCriteria::from_options(None, Some("en".into()), None);
        let payload = resolver.fetch_transcript(URL, &criteria).await.unwrap();
        assert!(payload.track.is_none());
        assert_eq!(
            payload.body,
            TranscriptBody::Segments(vec![CaptionSegment::new("hello", 1.5, 2.0)])
        );
        assert_eq!(
            mock.calls(),
            vec![MockCall::FetchLanguage {
                video_id: "dQw4w9WgXcQ".into(),
                code: "en".into(),
            }]
        );
    }

    #[tokio::test]
    async fn test_language_case_falls_back_to_listing() {
        let mock = std::sync::Arc::new(source());
        let resolver = CaptionResolver::new(Box::new(mock.clone()));
        let criteria = SelectionCriteria::from_options(None, Some("EN".into()), None);
        let payload = resolver.fetch_transcript(URL, &criteria).await.unwrap();

        assert_eq!(payload.track.unwrap().code, "en");
        assert_eq!(
            payload.body,
            TranscriptBody::Segments(vec![CaptionSegment::new("hello", 1.5, 2.0)])
        );
        assert_eq!(
            mock.calls(),
            vec![
                MockCall::FetchLanguage {
                    video_id: "dQw4w9WgXcQ".into(),
                    code: "EN".into(),
                },
                MockCall::List("dQw4w9WgXcQ".into()),
                MockCall::FetchTrack {
                    video_id: "dQw4w9WgXcQ".into(),
                    index: 1,
                    translated_to: None,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_direct_language_is_selection_error() {
        let resolver = CaptionResolver::new(Box::new(source()));
        let criteria = SelectionCriteria::from_options(None, Some("de".into()), None);
        let err = resolver.fetch_transcript(URL, &criteria).await.unwrap_err();
        assert_eq!(err.kind(), "selection_error");
        assert!(err.to_string().contains("available: th, en"));
    }

    #[tokio::test]
    async fn test_direct_fetch_other_errors_pass_through() {
        let source = source().failing_fetch(TranscriptError::RateLimited("429".into()));
        let mock = std::sync::Arc::new(source);
        let resolver = CaptionResolver::new(Box::new(mock.clone()));
        let criteria = SelectionCriteria::from_options(None, Some("en".into()), None);
        let err = resolver.fetch_transcript(URL, &criteria).await.unwrap_err();
        assert_eq!(err.kind(), "rate_limited");
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_translation_goes_through_listing() {
        let resolver = CaptionResolver::new(Box::new(source()));
        let criteria = SelectionCriteria::from_options(None, Some("TH".into()), Some("en".into()))
            .with_output(OutputMode::Text);
        let payload = resolver.fetch_transcript(URL, &criteria).await.unwrap();

        let track = payload.track.unwrap();
        assert_eq!(track.translated_to.as_deref(), Some("en"));
        assert_eq!(payload.body, TranscriptBody::Text("hello (translated)".into()));
    }

    #[tokio::test]
    async fn test_index_selection_with_timestamps() {
        let resolver = CaptionResolver::new(Box::new(source()));
        let criteria = SelectionCriteria {
            choice: TrackChoice::Index(1),
            with_timestamps: true,
            output: OutputMode::Text,
            ..SelectionCriteria::default()
        };
        let payload = resolver.fetch_transcript(URL, &criteria).await.unwrap();
        assert_eq!(payload.body, TranscriptBody::Text("00:00:01.500 - hello".into()));
    }

    #[tokio::test]
    async fn test_bad_index_is_selection_error() {
        let resolver = CaptionResolver::new(Box::new(source()));
        let criteria = SelectionCriteria::from_options(Some(5), None, None);
        let err = resolver.fetch_transcript(URL, &criteria).await.unwrap_err();
        assert_eq!(err.kind(), "selection_error");
    }

    #[tokio::test]
    async fn test_calls_recorded_in_order() {
        let mock = std::sync::Arc::new(source());
        let resolver = CaptionResolver::new(Box::new(mock.clone()));
        let criteria = SelectionCriteria::from_options(Some(0), None, Some("en".into()));
        resolver.fetch_transcript(URL, &criteria).await.unwrap();

        assert_eq!(
            mock.calls(),
            vec![
                MockCall::List("dQw4w9WgXcQ".into()),
                MockCall::FetchTrack {
                    video_id: "dQw4w9WgXcQ".into(),
                    index: 0,
                    translated_to: Some("en".into()),
                },
            ]
        );
    }
}
