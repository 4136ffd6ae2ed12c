// Caption resolution - URL forms, library revisions and track selection
// behind one resolver

pub mod config;
pub mod errors;
pub mod models;
pub mod pipeline;
pub mod render;
pub mod selector;
pub mod source;
pub mod utils;
pub mod video_id;

pub use config::{RevisionPreference, SourceConfig};
pub use errors::{ErrorBody, ErrorClass, TranscriptError};
pub use models::{
    CaptionSegment, OutputMode, SelectionCriteria, TrackChoice, TrackDescriptor, TrackListing,
    TranscriptBody, TranscriptPayload, VideoId,
};
pub use pipeline::CaptionResolver;
pub use render::{format_timestamp, render_text};
pub use selector::TrackSelector;
pub use source::{CaptionSource, FetchTarget, Revision, SourceStatus};
