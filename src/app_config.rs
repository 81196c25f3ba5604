use serde::Deserialize;
use std::path::Path;

/// Capture settings for the online tool, parsed from a TOML file.
#[derive(Clone, Debug)]
pub struct CaptureConfig {
    pub interface: Option<String>,
    pub duration_secs: u64,
    pub snaplen: i32,
    pub promiscuous: bool,
}

impl CaptureConfig {
    /// Load configuration from a TOML string.
    pub fn from_toml(s: &str) -> Result<Self, Box<dyn std::error::Error>> {
        #[derive(Deserialize, Default)]
        struct Root {
            capture: Option<Section>,
        }

        #[derive(Deserialize, Default)]
        struct Section {
            interface: Option<String>,
            duration_secs: Option<u64>,
            snaplen: Option<i32>,
            promiscuous: Option<bool>,
        }

        let raw: Root = toml::from_str(s)?;
        let section = raw.capture.unwrap_or_default();
        Ok(Self {
            interface: section.interface,
            duration_secs: section.duration_secs.unwrap_or(60),
            snaplen: section.snaplen.unwrap_or(65535),
            promiscuous: section.promiscuous.unwrap_or(true),
        })
    }

    /// Load configuration from a file path.
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.duration_secs == 0 {
            return Err("capture duration must be positive".into());
        }
        if self.snaplen <= 0 {
            return Err("snaplen must be positive".into());
        }
        Ok(())
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            interface: None,
            duration_secs: 60,
            snaplen: 65535,
            promiscuous: true,
        }
    }
}
