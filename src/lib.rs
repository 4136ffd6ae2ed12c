pub mod captions;

pub use captions::{
    CaptionResolver, CaptionSegment, ErrorBody, OutputMode, SelectionCriteria, SourceConfig,
    TrackDescriptor, TranscriptError, VideoId,
};

/// Build a resolver for `config`, probing the caption library when needed
pub async fn resolver(config: &SourceConfig) -> CaptionResolver {
    CaptionResolver::new(captions::source::connect(config).await)
}
