// TrackSelector - picks one caption track out of a listing
//
// Priority:
// 1. Explicit index into the list from this request
// 2. Language code (case-insensitive, first match wins)
// 3. First track in list order

use super::errors::TranscriptError;
use super::models::{TrackChoice, TrackDescriptor, VideoId};

pub struct TrackSelector;

impl TrackSelector {
    /// Select exactly one track, or explain why none qualifies
    pub fn select<'a>(
        video_id: &VideoId,
        tracks: &'a [TrackDescriptor],
        choice: &TrackChoice,
    ) -> Result<&'a TrackDescriptor, TranscriptError> {
        match choice {
            TrackChoice::Index(index) => tracks.get(*index).ok_or_else(|| {
                TranscriptError::SelectionError(format!(
                    "Track index {} out of range: video {} has {} track(s)",
                    index,
                    video_id,
                    tracks.len()
                ))
            }),
            TrackChoice::Language(code) => tracks
                .iter()
                .find(|t| t.matches_code(code))
                .ok_or_else(|| {
                    TranscriptError::SelectionError(format!(
                        "Language {} not found for video {} (available: {})",
                        code,
                        video_id,
                        Self::available_codes(tracks)
                    ))
                }),
            TrackChoice::Default => tracks.first().ok_or_else(|| TranscriptError::NoTranscriptFound {
                video_id: video_id.clone(),
                languages: Vec::new(),
            }),
        }
    }

    fn available_codes(tracks: &[TrackDescriptor]) -> String {
        if tracks.is_empty() {
            return "none".to_string();
        }
        tracks
            .iter()
            .map(|t| t.code.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vid() -> VideoId {
        VideoId::new_unchecked("dQw4w9WgXcQ")
    }

    fn make_tracks() -> Vec<TrackDescriptor> {
        vec![
            TrackDescriptor::new(0, "th", "Thai", false),
            TrackDescriptor::new(1, "en", "English (auto-generated)", true),
            TrackDescriptor::new(2, "en", "English", false),
        ]
    }

    #[test]
    fn test_index_selection() {
        let tracks = make_tracks();
        let picked = TrackSelector::select(&vid(), &tracks, &TrackChoice::Index(2)).unwrap();
        assert_eq!(picked.index, 2);
        assert_eq!(picked.name, "English");
    }

    #[test]
    fn test_index_out_of_range() {
        let tracks = make_tracks();
        let err = TrackSelector::select(&vid(), &tracks, &TrackChoice::Index(5)).unwrap_err();
        assert!(matches!(err, TranscriptError::SelectionError(_)));
    }

    #[test]
    fn test_language_is_case_insensitive_first_match() {
        let tracks = make_tracks();
        let picked =
            TrackSelector::select(&vid(), &tracks, &TrackChoice::Language("EN".into())).unwrap();
        assert_eq!(picked.index, 1);
    }

    #[test]
    fn test_unknown_language() {
        let tracks = make_tracks();
        let err = TrackSelector::select(&vid(), &tracks, &TrackChoice::Language("de".into()))
            .unwrap_err();
        assert_eq!(err.kind(), "selection_error");
        assert!(err.to_string().contains("th, en, en"));
    }

    #[test]
    fn test_default_is_first() {
        let tracks = make_tracks();
        let picked = TrackSelector::select(&vid(), &tracks, &TrackChoice::Default).unwrap();
        assert_eq!(picked.code, "th");
    }

    #[test]
    fn test_default_on_empty_list() {
        let err = TrackSelector::select(&vid(), &[], &TrackChoice::Default).unwrap_err();
        assert_eq!(err.kind(), "no_transcript_found");
    }
}
