use crate::error::{VolidError, VolidResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Where to probe and which probes to run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeOptions {
    /// Start of the extent within the device or image, in bytes.
    pub offset: u64,
    /// Length of the extent; reads past it are refused when set.
    pub size: Option<u64>,
    /// Restrict probing to these probe names.
    pub only: Option<Vec<String>>,
}

impl ProbeOptions {
    pub fn from_json_str(json: &str) -> VolidResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| VolidError::Configuration(format!("Invalid probe options: {}", e)))
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> VolidResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            VolidError::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    pub fn allows(&self, name: &str) -> bool {
        match &self.only {
            Some(names) => names.iter().any(|n| n.eq_ignore_ascii_case(name)),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let options = ProbeOptions::from_json_str("{}").unwrap();
        assert_eq!(options, ProbeOptions::default());
        assert!(options.allows("ntfs"));
    }

    #[test]
    fn test_parse_options() {
        let options =
            ProbeOptions::from_json_str(r#"{"offset": 1048576, "size": 4096, "only": ["NTFS"]}"#)
                .unwrap();
        assert_eq!(options.offset, 1_048_576);
        assert_eq!(options.size, Some(4096));
        assert!(options.allows("ntfs"));
        assert!(!options.allows("vfat"));
    }

    #[test]
    fn test_unknown_field_is_configuration_error() {
        assert!(matches!(
            ProbeOptions::from_json_str(r#"{"ofset": 1}"#),
            Err(VolidError::Configuration(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"offset": 512}}"#).unwrap();
        file.flush().unwrap();

        let options = ProbeOptions::from_json_file(file.path()).unwrap();
        assert_eq!(options.offset, 512);
        assert!(ProbeOptions::from_json_file("/nonexistent/volid.json").is_err());
    }
}
