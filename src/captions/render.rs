// Transcript rendering: structured records or flattened text

use super::models::{CaptionSegment, OutputMode, TranscriptBody};

/// Render segments in the requested output mode
pub fn render(segments: Vec<CaptionSegment>, output: OutputMode, with_timestamps: bool) -> TranscriptBody {
    match output {
        OutputMode::Segments => TranscriptBody::Segments(segments),
        OutputMode::Text => TranscriptBody::Text(render_text(&segments, with_timestamps)),
    }
}

/// Flatten segments to one line per non-blank segment
pub fn render_text(segments: &[CaptionSegment], with_timestamps: bool) -> String {
    segments
        .iter()
        .filter_map(|seg| {
            let text = seg.text.trim();
            if text.is_empty() {
                return None;
            }
            Some(if with_timestamps {
                format!("{} - {}", format_timestamp(seg.start), text)
            } else {
                text.to_string()
            })
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// `HH:MM:SS.mmm`, hours unbounded.
///
/// Sub-millisecond residue is rounded to the nearest millisecond before
/// splitting, so a carry never produces `.1000`.
pub fn format_timestamp(seconds: f64) -> String {
    let total_ms = if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1000.0).round() as u64
    } else {
        0
    };

    let hours = total_ms / 3_600_000;
    let minutes = (total_ms / 60_000) % 60;
    let secs = (total_ms / 1000) % 60;
    let millis = total_ms % 1000;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
}
