//! Operating system family detection.

use serde::Serialize;

/// The operating system family the collector is running on.
///
/// Detected once at startup and immutable for the process lifetime; every
/// strategy lookup keys off this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    Windows,
    MacOs,
    Linux,
    /// Anything the engine has no sources for. Collection still completes,
    /// every field degrades to `Unknown`.
    Other,
}

impl PlatformKind {
    /// Detect the platform family of the running process.
    pub fn detect() -> Self {
        match std::env::consts::OS {
            "windows" => Self::Windows,
            "macos" => Self::MacOs,
            "linux" => Self::Linux,
            _ => Self::Other,
        }
    }
}

impl std::fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformKind::Windows => write!(f, "windows"),
            PlatformKind::MacOs => write!(f, "macos"),
            PlatformKind::Linux => write!(f, "linux"),
            PlatformKind::Other => write!(f, "other"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_matches_compile_target() {
        let detected = PlatformKind::detect();
        #[cfg(target_os = "linux")]
        assert_eq!(detected, PlatformKind::Linux);
        #[cfg(target_os = "macos")]
        assert_eq!(detected, PlatformKind::MacOs);
        #[cfg(target_os = "windows")]
        assert_eq!(detected, PlatformKind::Windows);
    }

    #[test]
    fn test_display() {
        assert_eq!(PlatformKind::MacOs.to_string(), "macos");
        assert_eq!(PlatformKind::Other.to_string(), "other");
    }
}
