//! Startup checks for the external tools on the search path

use std::path::PathBuf;

use tracing::{info, warn};

use crate::runner::DOWNLOADER;

/// Name of the external media-processing tool the downloader shells out to
/// for conversion and muxing.
pub const CONVERTER: &str = "ffmpeg";

/// Where (if anywhere) the external tools were found.
pub struct ToolReport {
    pub downloader: Option<PathBuf>,
    pub converter: Option<PathBuf>,
}

/// Resolves both external tools. The downloader is mandatory; the converter
/// is advisory and only degrades conversion and high-resolution muxing.
pub fn probe_tools() -> ToolReport {
    ToolReport {
        downloader: resolve_tool(DOWNLOADER),
        converter: resolve_tool(CONVERTER),
    }
}

fn resolve_tool(name: &str) -> Option<PathBuf> {
    match which::which(name) {
        Ok(path) => {
            info!(tool = name, path = %path.display(), "found external tool");
            Some(path)
        }
        Err(_) => {
            warn!(tool = name, "external tool not found on PATH");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::resolve_tool;

    #[cfg(unix)]
    #[test]
    fn resolves_a_known_binary() {
        assert!(resolve_tool("sh").is_some());
    }

    #[test]
    fn reports_absence_for_unknown_binary() {
        assert!(resolve_tool("streamgrab-no-such-tool").is_none());
    }
}
