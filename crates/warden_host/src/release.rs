//! Background release check. The network call never touches the tick task:
//! it runs on the blocking pool and the result comes back through a
//! oneshot channel that the tick loop polls.

use std::time::Duration;

use tokio::sync::oneshot::{self, error::TryRecvError};
use warden_core::capability::{is_newer, parse_dotted};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseStatus {
    UpToDate,
    Available(String),
    Unknown,
}

impl ReleaseStatus {
    /// Message for privileged entities, if there is anything to say.
    pub fn notice(&self, current: &str) -> Option<String> {
        match self {
            ReleaseStatus::Available(latest) => Some(format!(
                "A new version of Warden is available: {latest} (running {current})."
            )),
            ReleaseStatus::UpToDate | ReleaseStatus::Unknown => None,
        }
    }
}

/// Compare the trimmed response body against the running version.
pub fn classify(current: &str, body: &str) -> ReleaseStatus {
    let latest = body.trim();
    if parse_dotted(latest).is_empty() {
        return ReleaseStatus::Unknown;
    }
    if is_newer(latest, current) {
        ReleaseStatus::Available(latest.to_string())
    } else {
        ReleaseStatus::UpToDate
    }
}

/// Receiving end of a release check. Yields its status at most once.
#[derive(Debug)]
pub struct ReleaseSlot {
    rx: Option<oneshot::Receiver<ReleaseStatus>>,
}

impl ReleaseSlot {
    pub fn new(rx: oneshot::Receiver<ReleaseStatus>) -> Self {
        Self { rx: Some(rx) }
    }

    /// Non-blocking. A sender dropped without an answer counts as `Unknown`.
    pub fn poll(&mut self) -> Option<ReleaseStatus> {
        let rx = self.rx.as_mut()?;
        let status = match rx.try_recv() {
            Ok(status) => status,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Closed) => ReleaseStatus::Unknown,
        };
        self.rx = None;
        Some(status)
    }
}

/// Start the check on the blocking pool. Every network or parse failure
/// ends as `ReleaseStatus::Unknown`.
pub fn spawn_release_check(url: String, current: String) -> ReleaseSlot {
    let (tx, rx) = oneshot::channel();
    tokio::task::spawn_blocking(move || {
        let status = match fetch_latest(&url) {
            Ok(body) => classify(&current, &body),
            Err(error) => {
                tracing::debug!(%url, %error, "release check failed");
                ReleaseStatus::Unknown
            }
        };
        tracing::info!(?status, "release check finished");
        let _ = tx.send(status);
    });
    ReleaseSlot::new(rx)
}

fn fetch_latest(url: &str) -> reqwest::Result<String> {
    let client = reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("warden/", env!("CARGO_PKG_VERSION")))
        .build()?;
    client.get(url).send()?.error_for_status()?.text()
}
