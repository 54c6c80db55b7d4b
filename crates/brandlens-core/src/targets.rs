use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::content::Platform;
use crate::ConfigError;

/// A brand plus any manually supplied profile references.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetsFile {
    pub brand: String,
    #[serde(default)]
    pub sources: BTreeMap<Platform, String>,
}

/// Load and validate a targets file from YAML.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_targets(path: &Path) -> Result<TargetsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::TargetsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let targets: TargetsFile = serde_yaml::from_str(&content)?;

    validate_targets(&targets)?;

    Ok(targets)
}

fn validate_targets(targets: &TargetsFile) -> Result<(), ConfigError> {
    if targets.brand.trim().is_empty() {
        return Err(ConfigError::Validation(
            "brand name must be non-empty".to_string(),
        ));
    }

    for (platform, url) in &targets.sources {
        if url.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "profile reference for {platform} must be non-empty"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_yaml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn validate_rejects_empty_brand() {
        let targets = TargetsFile {
            brand: "  ".to_string(),
            sources: BTreeMap::new(),
        };
        let err = validate_targets(&targets).unwrap_err();
        assert!(err.to_string().contains("non-empty"));
    }

    #[test]
    fn validate_rejects_empty_reference() {
        let mut sources = BTreeMap::new();
        sources.insert(Platform::Tiktok, String::new());
        let targets = TargetsFile {
            brand: "Acme".to_string(),
            sources,
        };
        let err = validate_targets(&targets).unwrap_err();
        assert!(err.to_string().contains("tiktok"));
    }

    #[test]
    fn load_targets_without_sources() {
        let file = write_yaml("brand: Acme\n");
        let targets = load_targets(file.path()).unwrap();
        assert_eq!(targets.brand, "Acme");
        assert!(targets.sources.is_empty());
    }

    #[test]
    fn load_targets_rejects_unknown_platform() {
        let file = write_yaml("brand: Acme\nsources:\n  myspace: https://myspace.com/acme\n");
        let result = load_targets(file.path());
        assert!(
            matches!(result, Err(ConfigError::TargetsFileParse(_))),
            "expected parse error, got: {result:?}"
        );
    }

    #[test]
    fn load_targets_missing_file() {
        let result = load_targets(Path::new("/definitely/not/here/targets.yaml"));
        assert!(matches!(result, Err(ConfigError::TargetsFileIo { .. })));
    }

    #[test]
    fn load_targets_from_example_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("config")
            .join("targets.example.yaml");
        assert!(
            path.exists(),
            "targets.example.yaml missing at {path:?}; required for this test"
        );
        let targets = load_targets(&path).unwrap();
        assert_eq!(targets.brand, "Moca Interactive");
        assert_eq!(
            targets.sources.get(&Platform::Tiktok).map(String::as_str),
            Some("https://www.tiktok.com/@mocainteractive")
        );
        assert!(!targets.sources.contains_key(&Platform::Youtube));
    }
}
