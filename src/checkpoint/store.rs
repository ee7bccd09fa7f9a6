use std::fs;
use std::path::{Path, PathBuf};

use burn::tensor::backend::AutodiffBackend;
use log::warn;

use crate::ai::value_function::ValueFunction;
use crate::checkpoint::metadata::CheckpointMetadata;
use crate::error::PersistenceError;

/// Persists value-function parameters at a fixed, opaque path.
///
/// The weight file format and its extension belong to the value function.
/// The store adds a JSON metadata sidecar next to it.
#[derive(Debug, Clone)]
pub struct ModelStore {
    model_path: PathBuf,
}

impl ModelStore {
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        ModelStore {
            model_path: model_path.into(),
        }
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.model_path.with_extension("meta.json")
    }

    /// Save the weights, then the sidecar. The sidecar is written to a temp
    /// file and renamed into place.
    pub fn save<B: AutodiffBackend>(
        &self,
        value_fn: &dyn ValueFunction<B>,
        metadata: &CheckpointMetadata,
    ) -> Result<(), PersistenceError> {
        if let Some(parent) = self.model_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        value_fn.save(&self.model_path)?;

        let meta_path = self.metadata_path();
        let tmp_path = meta_path.with_extension("json.tmp");
        fs::write(&tmp_path, serde_json::to_string_pretty(metadata)?)?;
        fs::rename(&tmp_path, &meta_path)?;
        Ok(())
    }

    /// Restore the weights. Returns the sidecar if one exists alongside them.
    ///
    /// Only a weight failure is an error. Once the weights are in, an
    /// unreadable sidecar is logged and reported as absent.
    pub fn load<B: AutodiffBackend>(
        &self,
        value_fn: &mut dyn ValueFunction<B>,
    ) -> Result<Option<CheckpointMetadata>, PersistenceError> {
        value_fn.load(&self.model_path)?;

        if !self.metadata_path().exists() {
            return Ok(None);
        }
        match self.read_metadata() {
            Ok(meta) => Ok(Some(meta)),
            Err(e) => {
                warn!("ignoring checkpoint metadata: {e}");
                Ok(None)
            }
        }
    }

    pub fn read_metadata(&self) -> Result<CheckpointMetadata, PersistenceError> {
        let path = self.metadata_path();
        let json = fs::read_to_string(&path).map_err(|e| PersistenceError::MetadataRead {
            path: path.clone(),
            source: e,
        })?;
        serde_json::from_str(&json).map_err(|e| PersistenceError::MetadataParse { path, source: e })
    }
}
