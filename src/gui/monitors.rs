//! Monitor enumeration via xcap.

use tracing::{debug, warn};
use xcap::Monitor;

use crate::session::{DisplayEnumerator, DisplayInfo, SessionError};

/// Enumerates the attached monitors.
///
/// The OS primary monitor is moved to the front so it receives the primary
/// overlay window.
#[derive(Debug, Default, Clone, Copy)]
pub struct XcapDisplays;

impl DisplayEnumerator for XcapDisplays {
    fn displays(&self) -> Result<Vec<DisplayInfo>, SessionError> {
        let monitors =
            Monitor::all().map_err(|e| SessionError::DisplayEnumeration(e.to_string()))?;

        let mut displays = Vec::with_capacity(monitors.len());
        for monitor in &monitors {
            match to_display(monitor) {
                Ok(display) => displays.push(display),
                Err(e) => warn!("Skipping monitor: {}", e),
            }
        }
        displays.sort_by_key(|display| !display.is_primary);

        debug!("Found {} monitor(s)", displays.len());
        Ok(displays)
    }
}

fn to_display(monitor: &Monitor) -> Result<DisplayInfo, xcap::XCapError> {
    Ok(DisplayInfo {
        width: monitor.width()?,
        height: monitor.height()?,
        x: monitor.x()?,
        y: monitor.y()?,
        is_primary: monitor.is_primary().unwrap_or(false),
        name: monitor.name().unwrap_or_default(),
    })
}
