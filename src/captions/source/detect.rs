// Revision detection for the caption library
//
// 1. Instance API constructs and exposes both `list` and `fetch` -> Client
// 2. Static surface has `list_transcripts` or `get_transcript`   -> Static
// 3. Probe unusable: try constructing the client; success -> Client, else Static
//
// Detection never fails; it always lands on one of the two revisions.

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::python::{PythonBridge, CONSTRUCT_SCRIPT, PROBE_SCRIPT};
use super::traits::Revision;

/// What the probe found in the installed library
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeReport {
    /// `youtube_transcript_api` imported
    pub module: bool,
    pub version: Option<String>,
    pub client_constructed: bool,
    pub client_list: bool,
    pub client_fetch: bool,
    pub static_list_transcripts: bool,
    pub static_get_transcript: bool,
}

impl ProbeReport {
    pub fn has_client_surface(&self) -> bool {
        self.client_constructed && self.client_list && self.client_fetch
    }

    pub fn has_static_surface(&self) -> bool {
        self.static_list_transcripts || self.static_get_transcript
    }
}

/// Capability probe seam, so detection can be exercised without Python
#[async_trait]
pub trait CapabilityProbe: Send + Sync {
    /// Inspect the library surface
    async fn probe(&self) -> Result<ProbeReport, String>;

    /// Bare attempt to construct the instance client
    async fn construct_client(&self) -> bool;
}

/// Pick a revision from a clean probe, or `None` if neither surface showed up
pub fn choose_revision(report: &ProbeReport) -> Option<Revision> {
    if report.has_client_surface() {
        Some(Revision::Client)
    } else if report.has_static_surface() {
        Some(Revision::Static)
    } else {
        None
    }
}

/// Resolve the revision to drive
pub async fn detect(probe: &dyn CapabilityProbe) -> Revision {
    match probe.probe().await {
        Ok(report) => {
            debug!("[Detect] Probe report: {:?}", report);
            if let Some(revision) = choose_revision(&report) {
                info!("[Detect] Using {} revision ({})", revision, revision.api_mode());
                return revision;
            }
            warn!("[Detect] Neither library surface found, falling back");
        }
        Err(e) => warn!("[Detect] Probe failed: {}", e),
    }

    let revision = if probe.construct_client().await {
        Revision::Client
    } else {
        Revision::Static
    };
    info!("[Detect] Fallback chose {} revision", revision);
    revision
}

/// Probe backed by the Python interpreter
pub struct PythonProbe {
    bridge: PythonBridge,
}

impl PythonProbe {
    pub fn new(bridge: PythonBridge) -> Self {
        Self { bridge }
    }
}

#[async_trait]
impl CapabilityProbe for PythonProbe {
    async fn probe(&self) -> Result<ProbeReport, String> {
        let value = self.bridge.run_plain(PROBE_SCRIPT).await.map_err(|f| f.message)?;
        serde_json::from_value(value).map_err(|e| format!("Unexpected probe output: {}", e))
    }

    async fn construct_client(&self) -> bool {
        self.bridge.run_status(CONSTRUCT_SCRIPT).await
    }
}
