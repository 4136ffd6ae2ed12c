// Python bridge to the youtube_transcript_api library
//
// Every call runs `python -c <script> <args...>`. Arguments go through argv,
// never through the script text. Scripts answer with exactly one JSON
// document on stdout:
//   {"ok": <payload>}
//   {"error": {"type": "<exception class>", "message": "..."}}
//
// Each call is a fresh process, so library objects never outlive one call.
// Fetching a listed track therefore lists the video again inside the script
// and re-resolves the track there: a track-based fetch costs one extra
// upstream listing on top of the caller's own `list`.

use log::{debug, warn};
use serde::Deserialize;

use crate::captions::config::SourceConfig;
use crate::captions::errors::{classify_source_failure, TranscriptError};
use crate::captions::models::{CaptionSegment, TrackDescriptor, VideoId};
use crate::captions::utils::{find_python, run_output_with_timeout};

use super::traits::FetchTarget;

/// Helpers shared by both revision scripts
const PRELUDE: &str = r#"
import json
import sys


class NoTranscriptFound(Exception):
    pass


def emit(doc):
    sys.stdout.write(json.dumps(doc))
    sys.stdout.flush()


def describe(t):
    return {
        "language_code": getattr(t, "language_code", None),
        "language": getattr(t, "language", None),
        "is_generated": getattr(t, "is_generated", None),
    }


def raw_segments(fetched):
    if hasattr(fetched, "to_raw_data"):
        return fetched.to_raw_data()
    out = []
    for s in fetched:
        if isinstance(s, dict):
            out.append(s)
        else:
            out.append({
                "text": getattr(s, "text", ""),
                "start": getattr(s, "start", 0.0),
                "duration": getattr(s, "duration", 0.0),
            })
    return out


UNKNOWN_CODE = "?"


def find_track(listing, index, code, is_generated):
    tracks = list(listing)

    def same(t):
        return str(getattr(t, "language_code", "")).lower() == code.lower()

    if code == UNKNOWN_CODE:
        if 0 <= index < len(tracks):
            return tracks[index]
        raise NoTranscriptFound("No transcript at position %d" % index)
    if 0 <= index < len(tracks):
        t = tracks[index]
        if same(t) and bool(getattr(t, "is_generated", False)) == is_generated:
            return t
    for t in tracks:
        if same(t) and bool(getattr(t, "is_generated", False)) == is_generated:
            return t
    for t in tracks:
        if same(t):
            return t
    raise NoTranscriptFound("No transcript found for language '%s'" % code)
"#;

/// Operation dispatch; expects `list_tracks` and `fetch_language` in scope
const DISPATCH: &str = r#"
def main():
    op, vid = sys.argv[1], sys.argv[2]
    if op == "list":
        return [describe(t) for t in list_tracks(vid)]
    if op == "fetch_language":
        return raw_segments(fetch_language(vid, sys.argv[3]))
    if op == "fetch_track":
        t = find_track(list_tracks(vid), int(sys.argv[3]), sys.argv[4], sys.argv[5] == "1")
        if sys.argv[6]:
            t = t.translate(sys.argv[6])
        return raw_segments(t.fetch())
    raise ValueError("unknown operation: " + op)


try:
    emit({"ok": main()})
except Exception as e:
    emit({"error": {"type": type(e).__name__, "message": str(e)}})
    sys.exit(1)
"#;

/// Capability report printed by the detection probe
pub(crate) const PROBE_SCRIPT: &str = r#"
import json

report = {
    "module": False,
    "version": None,
    "client_constructed": False,
    "client_list": False,
    "client_fetch": False,
    "static_list_transcripts": False,
    "static_get_transcript": False,
}
try:
    from youtube_transcript_api import YouTubeTranscriptApi as Api
    report["module"] = True
    try:
        from importlib.metadata import version
        report["version"] = version("youtube-transcript-api")
    except Exception:
        pass
    report["static_list_transcripts"] = callable(getattr(Api, "list_transcripts", None))
    report["static_get_transcript"] = callable(getattr(Api, "get_transcript", None))
    try:
        client = Api()
        report["client_constructed"] = True
        report["client_list"] = callable(getattr(client, "list", None))
        report["client_fetch"] = callable(getattr(client, "fetch", None))
    except Exception:
        pass
except Exception:
    pass
print(json.dumps(report))
"#;

/// Bare construction attempt used when the probe itself fails
pub(crate) const CONSTRUCT_SCRIPT: &str =
    "from youtube_transcript_api import YouTubeTranscriptApi\nYouTubeTranscriptApi()\n";

/// Assemble a full script from a revision-specific surface definition
pub(crate) fn build_script(surface: &str) -> String {
    format!("{}\n{}\n{}", PRELUDE, surface, DISPATCH)
}

/// Failure reported by a bridge call, before mapping to `TranscriptError`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeFailure {
    /// Python exception class name, when the script caught one
    pub exception: Option<String>,
    pub message: String,
}

impl BridgeFailure {
    fn plain(message: impl Into<String>) -> Self {
        Self {
            exception: None,
            message: message.into(),
        }
    }

    pub fn into_error(self, video_id: &VideoId, languages: &[String]) -> TranscriptError {
        classify_source_failure(video_id, self.exception.as_deref(), &self.message, languages)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorDoc {
    #[serde(rename = "type")]
    exception: Option<String>,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Envelope {
    Ok(serde_json::Value),
    Error(ErrorDoc),
}

/// Runs scripts against a Python interpreter
#[derive(Debug, Clone)]
pub struct PythonBridge {
    python_cmd: String,
    timeout_seconds: u64,
    envs: Vec<(String, String)>,
}

impl PythonBridge {
    pub fn new(config: &SourceConfig) -> Self {
        let envs = config
            .proxy
            .iter()
            .flat_map(|proxy| {
                ["HTTPS_PROXY", "HTTP_PROXY", "https_proxy", "http_proxy"]
                    .into_iter()
                    .map(move |key| (key.to_string(), proxy.clone()))
            })
            .collect();

        Self {
            python_cmd: find_python(config.python.as_deref()),
            timeout_seconds: config.timeout_seconds,
            envs,
        }
    }

    /// Extra environment variable for every interpreter run
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn python_cmd(&self) -> &str {
        &self.python_cmd
    }

    /// Whether the interpreter starts at all
    pub async fn is_python_available(&self) -> bool {
        self.exec("import sys", &[]).await.map(|o| o.status.success()).unwrap_or(false)
    }

    async fn exec(&self, script: &str, args: &[String]) -> Result<std::process::Output, String> {
        let mut argv = vec!["-c".to_string(), script.to_string()];
        argv.extend_from_slice(args);
        run_output_with_timeout(&self.python_cmd, &argv, &self.envs, self.timeout_seconds).await
    }

    /// Run a script that prints plain JSON (no envelope)
    pub async fn run_plain(&self, script: &str) -> Result<serde_json::Value, BridgeFailure> {
        let output = self.exec(script, &[]).await.map_err(BridgeFailure::plain)?;
        if !output.status.success() {
            return Err(BridgeFailure::plain(String::from_utf8_lossy(&output.stderr).trim()));
        }
        serde_json::from_slice(&output.stdout)
            .map_err(|e| BridgeFailure::plain(format!("Invalid JSON from probe: {}", e)))
    }

    /// Run a script for its exit status only
    pub async fn run_status(&self, script: &str) -> bool {
        matches!(self.exec(script, &[]).await, Ok(out) if out.status.success())
    }

    /// Run an enveloped script and unwrap its payload
    pub async fn call(&self, script: &str, args: Vec<String>) -> Result<serde_json::Value, BridgeFailure> {
        debug!("[PythonBridge] {} -c <script> {}", self.python_cmd, args.join(" "));

        let output = self.exec(script, &args).await.map_err(BridgeFailure::plain)?;
        parse_envelope(&output.stdout, &output.stderr, output.status.success())
    }
}

fn parse_envelope(stdout: &[u8], stderr: &[u8], success: bool) -> Result<serde_json::Value, BridgeFailure> {
    match serde_json::from_slice::<Envelope>(stdout) {
        Ok(Envelope::Ok(payload)) => Ok(payload),
        Ok(Envelope::Error(doc)) => Err(BridgeFailure {
            exception: doc.exception,
            message: doc.message,
        }),
        Err(e) if success => Err(BridgeFailure::plain(format!("Invalid JSON from caption library: {}", e))),
        Err(_) => {
            let stderr = String::from_utf8_lossy(stderr).trim().to_string();
            warn!("[PythonBridge] Script failed without a result: {}", stderr);
            Err(BridgeFailure::plain(if stderr.is_empty() {
                "Caption library exited with an error".to_string()
            } else {
                stderr
            }))
        }
    }
}

/// List/fetch plumbing shared by both revisions; only the script differs
#[derive(Debug, Clone)]
pub(crate) struct ScriptedSource {
    bridge: PythonBridge,
    script: String,
}

impl ScriptedSource {
    pub fn new(bridge: PythonBridge, surface: &str) -> Self {
        Self {
            bridge,
            script: build_script(surface),
        }
    }

    pub async fn list(&self, video_id: &VideoId) -> Result<Vec<TrackDescriptor>, TranscriptError> {
        let payload = self
            .bridge
            .call(&self.script, vec!["list".to_string(), video_id.to_string()])
            .await
            .map_err(|f| f.into_error(video_id, &[]))?;

        let items = payload
            .as_array()
            .ok_or_else(|| TranscriptError::Unknown("Caption library returned no track list".to_string()))?;

        Ok(items
            .iter()
            .enumerate()
            .map(|(i, raw)| TrackDescriptor::from_raw(i, raw))
            .collect())
    }

    pub async fn fetch(
        &self,
        video_id: &VideoId,
        target: &FetchTarget,
    ) -> Result<Vec<CaptionSegment>, TranscriptError> {
        let args = match target {
            FetchTarget::Language(code) => vec![
                "fetch_language".to_string(),
                video_id.to_string(),
                code.clone(),
            ],
            FetchTarget::Track(track) => vec![
                "fetch_track".to_string(),
                video_id.to_string(),
                track.index.to_string(),
                track.code.clone(),
                if track.is_auto { "1" } else { "0" }.to_string(),
                track.translated_to.clone().unwrap_or_default(),
            ],
        };

        let payload = self
            .bridge
            .call(&self.script, args)
            .await
            .map_err(|f| f.into_error(video_id, &target.requested_languages()))?;

        parse_segments(&payload)
    }
}

fn parse_segments(payload: &serde_json::Value) -> Result<Vec<CaptionSegment>, TranscriptError> {
    let items = payload
        .as_array()
        .ok_or_else(|| TranscriptError::Unknown("Caption library returned no segments".to_string()))?;
    Ok(items.iter().map(CaptionSegment::from_raw).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_ok() {
        let payload = parse_envelope(br#"{"ok": [1, 2]}"#, b"", true).unwrap();
        assert_eq!(payload, serde_json::json!([1, 2]));
    }

    #[test]
    fn test_envelope_error_keeps_exception() {
        let failure = parse_envelope(
            br#"{"error": {"type": "TranscriptsDisabled", "message": "off"}}"#,
            b"",
            false,
        )
        .unwrap_err();
        assert_eq!(failure.exception.as_deref(), Some("TranscriptsDisabled"));
        assert_eq!(failure.message, "off");
    }

    #[test]
    fn test_crash_without_envelope_uses_stderr() {
        let failure = parse_envelope(b"", b"Traceback ...\nHTTPError: 429 Too Many Requests\n", false)
            .unwrap_err();
        assert_eq!(failure.exception, None);
        let err = failure.into_error(&VideoId::new_unchecked("dQw4w9WgXcQ"), &[]);
        assert_eq!(err.kind(), "rate_limited");
    }

    #[test]
    fn test_garbage_on_success_is_unknown() {
        let failure = parse_envelope(b"hello", b"", true).unwrap_err();
        assert!(failure.message.starts_with("Invalid JSON"));
    }

    #[test]
    fn test_parse_segments_defaults() {
        let segments = parse_segments(&serde_json::json!([
            { "text": "a", "start": 0.5, "duration": 1.0 },
            { "text": "b" }
        ]))
        .unwrap();
        assert_eq!(segments[1], CaptionSegment::new("b", 0.0, 0.0));
        assert!(parse_segments(&serde_json::json!({})).is_err());
    }

    #[test]
    fn test_script_contains_surface() {
        let script = build_script("def list_tracks(vid):\n    return []\n");
        assert!(script.contains("def find_track"));
        assert!(script.contains("def list_tracks"));
        assert!(script.trim_end().ends_with("sys.exit(1)"));
    }

    #[test]
    fn test_unknown_code_marker_matches_descriptor() {
        let marker = format!("UNKNOWN_CODE = \"{}\"", TrackDescriptor::UNKNOWN_CODE);
        assert!(PRELUDE.contains(&marker));
    }

    #[test]
    fn test_proxy_exported_to_env() {
        let config = SourceConfig::default()
            .with_python(Some("python3".into()))
            .with_proxy(Some("http://127.0.0.1:8080".into()));
        let bridge = PythonBridge::new(&config);
        assert!(bridge
            .envs
            .iter()
            .any(|(k, v)| k == "HTTPS_PROXY" && v == "http://127.0.0.1:8080"));
    }
}
