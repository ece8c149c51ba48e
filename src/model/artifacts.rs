use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::constants::{
    DEPARTMENT_ENCODER_FILENAME, JOB_ENCODER_FILENAME, MODEL_CONFIG_FILENAME, MODEL_FILENAME,
};
use crate::hashing::{fingerprint_artifacts, short_fingerprint};

use super::error::ModelError;
use super::RiskClassifier;
use super::forest::ForestClassifier;
use super::vocabulary::{CategoryKind, Vocabulary};

/// Label-encoder export: the classes in code order.
#[derive(Debug, Clone, Deserialize)]
struct EncoderFile {
    classes: Vec<String>,
}

/// Training metadata recorded next to the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Hold-out accuracy in `[0, 1]`.
    pub accuracy: f64,

    #[serde(default)]
    pub feature_names: Option<Vec<String>>,

    #[serde(default)]
    pub trained_on: Option<String>,

    #[serde(default)]
    pub total_samples: Option<u64>,

    #[serde(default)]
    pub departments: Option<Vec<String>>,

    #[serde(default)]
    pub job_titles: Option<Vec<String>>,
}

impl ModelMetadata {
    pub fn with_accuracy(accuracy: f64) -> Self {
        Self {
            accuracy,
            feature_names: None,
            trained_on: None,
            total_samples: None,
            departments: None,
            job_titles: None,
        }
    }

    fn validate(&self) -> Result<(), ModelError> {
        if !(0.0..=1.0).contains(&self.accuracy) {
            return Err(ModelError::InvalidMetadata {
                reason: format!("accuracy must be between 0 and 1, got {}", self.accuracy),
            });
        }
        Ok(())
    }
}

/// Everything loaded from the artifact directory at startup.
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    pub classifier: ForestClassifier,
    pub vocabulary: Vocabulary,
    pub metadata: ModelMetadata,
    /// BLAKE3 fingerprint over all four artifacts.
    pub fingerprint: String,
}

impl ModelArtifacts {
    /// Loads and cross-checks the classifier, both encoders and the model config.
    ///
    /// Any missing or inconsistent artifact fails the whole load.
    pub fn load(dir: &Path) -> Result<Self, ModelError> {
        let model_path = dir.join(MODEL_FILENAME);
        let department_path = dir.join(DEPARTMENT_ENCODER_FILENAME);
        let job_path = dir.join(JOB_ENCODER_FILENAME);
        let config_path = dir.join(MODEL_CONFIG_FILENAME);

        let model_bytes = read_artifact(&model_path)?;
        let department_bytes = read_artifact(&department_path)?;
        let job_bytes = read_artifact(&job_path)?;
        let config_bytes = read_artifact(&config_path)?;

        let departments: EncoderFile = parse_artifact(&department_path, &department_bytes)?;
        let job_titles: EncoderFile = parse_artifact(&job_path, &job_bytes)?;
        let metadata: ModelMetadata = parse_artifact(&config_path, &config_bytes)?;
        metadata.validate()?;

        let vocabulary = Vocabulary::new(departments.classes, job_titles.classes)?;
        check_listed_classes(&metadata.departments, &vocabulary, CategoryKind::Department)?;
        check_listed_classes(&metadata.job_titles, &vocabulary, CategoryKind::JobTitle)?;

        let mut classifier = ForestClassifier::from_json_slice(&model_bytes)?;
        if classifier.feature_names().is_none()
            && let Some(names) = metadata.feature_names.clone()
        {
            debug!("Forest artifact has no feature names, using model config");
            classifier = classifier.with_feature_names(names)?;
        }

        let fingerprint = fingerprint_artifacts([
            (MODEL_FILENAME, model_bytes.as_slice()),
            (DEPARTMENT_ENCODER_FILENAME, department_bytes.as_slice()),
            (JOB_ENCODER_FILENAME, job_bytes.as_slice()),
            (MODEL_CONFIG_FILENAME, config_bytes.as_slice()),
        ]);

        info!(
            dir = %dir.display(),
            trees = classifier.n_trees(),
            departments = vocabulary.departments.len(),
            job_titles = vocabulary.job_titles.len(),
            accuracy = metadata.accuracy,
            fingerprint = short_fingerprint(&fingerprint),
            "Model artifacts loaded"
        );

        Ok(Self {
            classifier,
            vocabulary,
            metadata,
            fingerprint,
        })
    }
}

fn read_artifact(path: &Path) -> Result<Vec<u8>, ModelError> {
    if !path.exists() {
        return Err(ModelError::ArtifactMissing {
            path: path.to_path_buf(),
        });
    }
    std::fs::read(path).map_err(|source| ModelError::ArtifactUnreadable {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_artifact<T: DeserializeOwned>(path: &Path, bytes: &[u8]) -> Result<T, ModelError> {
    serde_json::from_slice(bytes).map_err(|source| ModelError::ArtifactParse {
        path: path.to_path_buf(),
        source,
    })
}

fn check_listed_classes(
    listed: &Option<Vec<String>>,
    vocabulary: &Vocabulary,
    kind: CategoryKind,
) -> Result<(), ModelError> {
    match listed {
        Some(classes) if classes.as_slice() != vocabulary.get(kind).classes() => {
            Err(ModelError::VocabularyMismatch { kind })
        }
        _ => Ok(()),
    }
}
