//! Coarse device classification from the User-Agent header.

use crate::storage::models::DeviceClass;

/// Classify a visit's origin device.
///
/// Any user-agent containing "mobile" (case-insensitive) is mobile;
/// everything else, including a missing header, is desktop.
pub fn classify_device(user_agent: Option<&str>) -> DeviceClass {
    match user_agent {
        Some(ua) if ua.to_lowercase().contains("mobile") => DeviceClass::Mobile,
        _ => DeviceClass::Desktop,
    }
}
