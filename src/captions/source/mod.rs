// Caption source adapter
//
// Hides which revision of youtube_transcript_api is installed behind the
// `CaptionSource` trait. The revision is picked once, either forced by
// configuration or by probing the interpreter.

mod client_api;
mod detect;
pub mod mock;
mod python;
mod static_api;
mod traits;

pub use client_api::ClientApiSource;
pub use detect::{choose_revision, detect, CapabilityProbe, ProbeReport, PythonProbe};
pub use python::{BridgeFailure, PythonBridge};
pub use static_api::StaticApiSource;
pub use traits::{CaptionSource, FetchTarget, Revision};

use log::info;
use serde::Serialize;

use crate::captions::config::{RevisionPreference, SourceConfig};

/// Build the caption source for this configuration
pub async fn connect(config: &SourceConfig) -> Box<dyn CaptionSource> {
    let bridge = PythonBridge::new(config);

    let revision = match config.revision {
        RevisionPreference::Client => Revision::Client,
        RevisionPreference::Static => Revision::Static,
        RevisionPreference::Auto => detect(&PythonProbe::new(bridge.clone())).await,
    };

    info!(
        "[Source] {} via {} (preference: {})",
        revision,
        bridge.python_cmd(),
        config.revision
    );
    from_revision(revision, bridge)
}

pub fn from_revision(revision: Revision, bridge: PythonBridge) -> Box<dyn CaptionSource> {
    match revision {
        Revision::Client => Box::new(ClientApiSource::new(bridge)),
        Revision::Static => Box::new(StaticApiSource::new(bridge)),
    }
}

/// Health report for the caption source
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceStatus {
    pub status: String,
    pub version: &'static str,
    pub api_mode: &'static str,
    pub revision: Revision,
    pub python: String,
    pub python_available: bool,
    pub library_available: bool,
    pub library_version: Option<String>,
}

/// Probe the environment and report what `connect` would use
pub async fn status(config: &SourceConfig) -> SourceStatus {
    let bridge = PythonBridge::new(config);
    let probe = PythonProbe::new(bridge.clone());
    let python_available = bridge.is_python_available().await;
    let report = probe.probe().await.unwrap_or_default();

    let revision = match config.revision {
        RevisionPreference::Client => Revision::Client,
        RevisionPreference::Static => Revision::Static,
        RevisionPreference::Auto => detect(&probe).await,
    };

    let status = if report.module {
        "YouTube Caption API is running"
    } else {
        "youtube_transcript_api is not installed"
    };

    SourceStatus {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION"),
        api_mode: revision.api_mode(),
        revision,
        python: bridge.python_cmd().to_string(),
        python_available,
        library_available: report.module,
        library_version: report.version,
    }
}
