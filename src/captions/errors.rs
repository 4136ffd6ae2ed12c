// Error types for caption resolution

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use super::models::VideoId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscriptError {
    /// Input is neither a recognised YouTube URL nor a bare video id
    #[error("Invalid YouTube URL or video id: {0}")]
    InvalidReference(String),

    #[error("Transcripts are disabled for video: {0}")]
    TranscriptsDisabled(VideoId),

    #[error("Video unavailable or does not exist: {0}")]
    VideoUnavailable(VideoId),

    /// No track matched the requested languages
    #[error("{}", no_transcript_message(.video_id, .languages))]
    NoTranscriptFound {
        video_id: VideoId,
        languages: Vec<String>,
    },

    /// Explicit index out of range or language code with no matching track
    #[error("{0}")]
    SelectionError(String),

    /// YouTube throttled the request (HTTP 429)
    #[error("Rate limited by YouTube. Please try again later.")]
    RateLimited(String),

    /// Anything else the caption source reported, message kept verbatim
    #[error("{0}")]
    Unknown(String),
}

fn no_transcript_message(video_id: &VideoId, languages: &[String]) -> String {
    if languages.is_empty() {
        format!("No transcripts found for video: {}", video_id)
    } else {
        format!(
            "No transcript found for language '{}' in video: {}",
            languages.join(", "),
            video_id
        )
    }
}

/// How a caller should surface an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    BadRequest,
    NotFound,
    RetryLater,
    Failure,
}

impl ErrorClass {
    /// HTTP status an HTTP front end should answer with
    pub fn http_status(&self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::RetryLater => 429,
            Self::Failure => 400,
        }
    }
}

impl TranscriptError {
    /// Stable machine-readable tag
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidReference(_) => "invalid_reference",
            Self::TranscriptsDisabled(_) => "transcripts_disabled",
            Self::VideoUnavailable(_) => "video_unavailable",
            Self::NoTranscriptFound { .. } => "no_transcript_found",
            Self::SelectionError(_) => "selection_error",
            Self::RateLimited(_) => "rate_limited",
            Self::Unknown(_) => "unknown",
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidReference(_) => ErrorClass::BadRequest,
            Self::TranscriptsDisabled(_)
            | Self::VideoUnavailable(_)
            | Self::NoTranscriptFound { .. }
            | Self::SelectionError(_) => ErrorClass::NotFound,
            Self::RateLimited(_) => ErrorClass::RetryLater,
            Self::Unknown(_) => ErrorClass::Failure,
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        let class = self.class();
        ErrorBody {
            error: self.to_string(),
            kind: self.kind(),
            class,
            status: class.http_status(),
        }
    }
}

/// JSON shape of a failed resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: &'static str,
    pub class: ErrorClass,
    pub status: u16,
}

lazy_static! {
    // 429 only counts next to HTTP wording; library messages embed the video
    // URL, and ids may contain the digits 429.
    static ref RATE_LIMIT_RE: Regex = Regex::new(
        r"(?i)(http error 429\b|\b429 client error|status(?: code)?:? 429\b|too many requests)"
    )
    .unwrap();
}

/// Best-effort rate limit detection.
///
/// The caption library does not expose a structured throttling signal, so
/// this looks for an HTTP 429 status or a "Too Many Requests" marker in the
/// failure text. Message formats are not guaranteed upstream.
pub fn is_rate_limited(message: &str) -> bool {
    RATE_LIMIT_RE.is_match(message)
}

/// Map a failure raised by the caption library onto the error taxonomy.
///
/// `exception` is the collaborator's exception class name when known.
pub fn classify_source_failure(
    video_id: &VideoId,
    exception: Option<&str>,
    message: &str,
    languages: &[String],
) -> TranscriptError {
    match exception {
        Some("TranscriptsDisabled") => {
            return TranscriptError::TranscriptsDisabled(video_id.clone())
        }
        Some("VideoUnavailable") => return TranscriptError::VideoUnavailable(video_id.clone()),
        Some("TooManyRequests") => return TranscriptError::RateLimited(message.to_string()),
        Some("NoTranscriptFound") => {
            return TranscriptError::NoTranscriptFound {
                video_id: video_id.clone(),
                languages: languages.to_vec(),
            }
        }
        _ => {}
    }

    if is_rate_limited(message) {
        return TranscriptError::RateLimited(message.to_string());
    }

    TranscriptError::Unknown(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vid() -> VideoId {
        VideoId::new_unchecked("dQw4w9WgXcQ")
    }

    #[test]
    fn test_429_detection() {
        assert!(is_rate_limited("HTTP Error 429: Too Many Requests"));
        assert!(is_rate_limited("server said: too many requests"));
        assert!(!is_rate_limited("HTTP Error 403: Forbidden"));
        assert!(is_rate_limited("429 Client Error: Too Many Requests for url"));
        assert!(is_rate_limited("Request failed with status code 429"));
    }

    #[test]
    fn test_429_in_video_id_is_not_rate_limit() {
        for id in ["a429bcdefgh", "abc-429-xyz", "429abcdefgh"] {
            let message = format!(
                "Could not retrieve a transcript for the video https://www.youtube.com/watch?v={}! \
                 This is most likely caused by: The video is unplayable",
                id
            );
            assert!(!is_rate_limited(&message), "{}", id);

            let video_id = VideoId::new_unchecked(id);
            let err = classify_source_failure(&video_id, Some("VideoUnplayable"), &message, &[]);
            assert_eq!(err.kind(), "unknown");
        }
    }

    #[test]
    fn test_too_many_requests_exception() {
        let err = classify_source_failure(&vid(), Some("TooManyRequests"), "slow down", &[]);
        assert_eq!(err.class(), ErrorClass::RetryLater);
    }

    #[test]
    fn test_known_exceptions_map_directly() {
        assert_eq!(
            classify_source_failure(&vid(), Some("TranscriptsDisabled"), "whatever 429", &[]),
            TranscriptError::TranscriptsDisabled(vid())
        );
        assert_eq!(
            classify_source_failure(&vid(), Some("VideoUnavailable"), "", &[]),
            TranscriptError::VideoUnavailable(vid())
        );
        assert_eq!(
            classify_source_failure(&vid(), Some("NoTranscriptFound"), "", &["th".to_string()]),
            TranscriptError::NoTranscriptFound {
                video_id: vid(),
                languages: vec!["th".to_string()],
            }
        );
    }

    #[test]
    fn test_unknown_keeps_message_verbatim() {
        let err = classify_source_failure(
            &vid(),
            Some("CouldNotRetrieveTranscript"),
            "boom: details",
            &[],
        );
        assert_eq!(err, TranscriptError::Unknown("boom: details".to_string()));
        assert_eq!(err.to_string(), "boom: details");
    }

    #[test]
    fn test_rate_limit_from_unknown_exception() {
        let err = classify_source_failure(&vid(), Some("RequestBlocked"), "429 Client Error", &[]);
        assert_eq!(err.kind(), "rate_limited");
        assert_eq!(err.class(), ErrorClass::RetryLater);
    }

    #[test]
    fn test_error_classes() {
        assert_eq!(TranscriptError::InvalidReference("x".into()).class().http_status(), 400);
        assert_eq!(TranscriptError::VideoUnavailable(vid()).class().http_status(), 404);
        assert_eq!(TranscriptError::SelectionError("x".into()).class(), ErrorClass::NotFound);
        assert_eq!(TranscriptError::Unknown("x".into()).class(), ErrorClass::Failure);
    }

    #[test]
    fn test_no_transcript_message_names_language() {
        let err = TranscriptError::NoTranscriptFound {
            video_id: vid(),
            languages: vec!["th".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "No transcript found for language 'th' in video: dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_error_body() {
        let body = TranscriptError::RateLimited("429".into()).to_body();
        assert_eq!(body.kind, "rate_limited");
        assert_eq!(body.status, 429);
        assert_eq!(
            serde_json::to_value(&body).unwrap()["class"],
            serde_json::json!("retry_later")
        );
    }
}
