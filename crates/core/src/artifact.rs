//! Forecast artifact hand-off between the train stage and the dashboard.
//!
//! The train stage writes one JSON artifact per run, keyed by its training
//! cutoff date, then points a manifest file at it. Consumers resolve the
//! current artifact through the manifest, never by globbing the directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use uuid::Uuid;

pub const MANIFEST_FILE_NAME: &str = "manifest.json";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to access artifact directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize artifact: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("manifest points at missing artifact: {0}")]
    Dangling(String),
}

/// One predicted hour with its uncertainty bounds
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ForecastPoint {
    /// Naive local timestamp, `YYYY-MM-DD HH:MM:SS`
    pub ds: String,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

/// Trained forecast output, materialized for the dashboard
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ForecastArtifact {
    pub id: Uuid,
    /// Last observation timestamp the model was trained on
    pub cutoff: String,
    /// RFC3339 UTC timestamp of the training run
    pub generated_at: String,
    pub horizon: usize,
    pub confidence_level: f64,
    pub points: Vec<ForecastPoint>,
}

impl ForecastArtifact {
    pub fn new(
        cutoff: String,
        horizon: usize,
        confidence_level: f64,
        points: Vec<ForecastPoint>,
    ) -> Self {
        let generated_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();
        Self {
            id: Uuid::now_v7(),
            cutoff,
            generated_at,
            horizon,
            confidence_level,
            points,
        }
    }

    /// File name this artifact is stored under, derived from the cutoff date
    pub fn file_name(&self) -> String {
        let date = self.cutoff.split_whitespace().next().unwrap_or("unknown");
        format!("forecast_{}.json", date)
    }
}

/// Points at the artifact the dashboard should serve
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Manifest {
    pub current: String,
    pub updated_at: String,
}

/// Directory-backed artifact storage with a manifest as the single entry point
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the artifact and repoint the manifest at it.
    ///
    /// The manifest is written to a temp file and renamed into place so a
    /// crashed run can never leave a half-written pointer behind.
    pub fn save(&self, artifact: &ForecastArtifact) -> Result<String, Error> {
        crate::fs::create_dir_all(&self.dir)?;

        let file_name = artifact.file_name();
        let artifact_path = self.dir.join(&file_name);
        fs::write(&artifact_path, serde_json::to_vec_pretty(artifact)?)?;

        let manifest = Manifest {
            current: file_name.clone(),
            updated_at: artifact.generated_at.clone(),
        };
        let tmp_path = self.dir.join(format!("{}.tmp", MANIFEST_FILE_NAME));
        fs::write(&tmp_path, serde_json::to_vec_pretty(&manifest)?)?;
        fs::rename(&tmp_path, self.dir.join(MANIFEST_FILE_NAME))?;

        Ok(file_name)
    }

    /// Resolve the current artifact through the manifest.
    ///
    /// Returns `Ok(None)` when no manifest exists yet (nothing trained).
    pub fn load_current(&self) -> Result<Option<ForecastArtifact>, Error> {
        let manifest_path = self.dir.join(MANIFEST_FILE_NAME);
        if !manifest_path.exists() {
            return Ok(None);
        }

        let manifest: Manifest = serde_json::from_slice(&fs::read(&manifest_path)?)?;
        let artifact_path = self.dir.join(&manifest.current);
        if !artifact_path.exists() {
            return Err(Error::Dangling(manifest.current));
        }

        let artifact: ForecastArtifact = serde_json::from_slice(&fs::read(&artifact_path)?)?;
        Ok(Some(artifact))
    }
}
