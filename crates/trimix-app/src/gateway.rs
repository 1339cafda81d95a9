//! Desktop browser gateway for the share handoff.

use std::process::{Command, Stdio};

use tracing::warn;
use trimix_pipeline::{PlatformGateway, PlatformWindow};

#[cfg(target_os = "macos")]
const OPENER: &str = "open";
#[cfg(not(target_os = "macos"))]
const OPENER: &str = "xdg-open";

/// Opens platform URLs with the system browser opener.
pub struct BrowserGateway;

impl PlatformGateway for BrowserGateway {
    fn open(&self, url: &str) -> PlatformWindow {
        let spawned = Command::new(OPENER)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            Ok(_) => PlatformWindow::Opened,
            Err(e) => {
                warn!(%url, "Failed to launch browser opener: {}", e);
                PlatformWindow::Blocked
            }
        }
    }
}
