use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::ModelConfig;

/// Resolved description of the summarization model, persisted between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Model identifier on the inference API
    pub model_id: String,

    /// Inference API base URL
    pub endpoint: String,

    /// When the artifact was first built
    pub created_at: DateTime<Utc>,
}

impl ModelArtifact {
    pub fn new(endpoint: &str, model_id: &str) -> Self {
        Self {
            model_id: model_id.to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            created_at: Utc::now(),
        }
    }

    /// Full URL of the model's inference route
    pub fn api_url(&self) -> String {
        format!("{}/{}", self.endpoint.trim_end_matches('/'), self.model_id)
    }

    fn matches(&self, config: &ModelConfig) -> bool {
        self.model_id == config.model_id
            && self.endpoint == config.endpoint.trim_end_matches('/')
    }
}

/// Read the cached artifact, or build and persist a fresh one.
///
/// A missing, unreadable or stale file is replaced. Write failures are logged and the
/// fresh artifact is still returned.
pub fn load_or_create(path: &Path, config: &ModelConfig) -> ModelArtifact {
    match read_artifact(path) {
        Some(artifact) if artifact.matches(config) => {
            tracing::debug!("Loaded cached model artifact from {}", path.display());
            return artifact;
        }
        Some(_) => tracing::info!("Cached model artifact is for another model, rebuilding"),
        None => tracing::info!("No usable model artifact at {}, building one", path.display()),
    }

    let artifact = ModelArtifact::new(&config.endpoint, &config.model_id);
    if let Err(e) = write_artifact(path, &artifact) {
        tracing::warn!("Failed to cache model artifact at {}: {:#}", path.display(), e);
    }
    artifact
}

fn read_artifact(path: &Path) -> Option<ModelArtifact> {
    let content = fs_err::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(artifact) => Some(artifact),
        Err(e) => {
            tracing::warn!("Ignoring corrupt model artifact {}: {}", path.display(), e);
            None
        }
    }
}

fn write_artifact(path: &Path, artifact: &ModelArtifact) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs_err::create_dir_all(parent)?;
        }
    }

    fs_err::write(path, serde_json::to_vec_pretty(artifact)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_config(model_id: &str) -> ModelConfig {
        ModelConfig {
            model_id: model_id.to_string(),
            ..ModelConfig::default()
        }
    }

    #[test]
    fn test_missing_artifact_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache").join("model.json");

        let artifact = load_or_create(&path, &model_config("facebook/bart-large-cnn"));

        assert_eq!(artifact.model_id, "facebook/bart-large-cnn");
        assert!(path.exists());
    }

    #[test]
    fn test_existing_artifact_is_reused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let config = model_config("facebook/bart-large-cnn");

        let first = load_or_create(&path, &config);
        let second = load_or_create(&path, &config);

        assert_eq!(first, second);
    }

    #[test]
    fn test_stale_artifact_is_rebuilt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        load_or_create(&path, &model_config("old/model"));
        let artifact = load_or_create(&path, &model_config("new/model"));

        assert_eq!(artifact.model_id, "new/model");
        let on_disk: ModelArtifact =
            serde_json::from_str(&fs_err::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.model_id, "new/model");
    }

    #[test]
    fn test_corrupt_artifact_is_rebuilt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        fs_err::write(&path, "").unwrap();

        let artifact = load_or_create(&path, &model_config("facebook/bart-large-cnn"));

        assert_eq!(artifact.model_id, "facebook/bart-large-cnn");
        assert!(!fs_err::read_to_string(&path).unwrap().is_empty());
    }
}
