//! Sample artifact bundle for tests.
//!
//! The forest is tiny but real: two trees over `[salary, performanceRating,
//! department_encoded, jobTitle_encoded]` whose leaf probabilities are easy to reason
//! about.
//!
//! | salary    | rating | department          | probability | category |
//! |-----------|--------|---------------------|-------------|----------|
//! | <= 30000  | any    | Sales               | 0.775       | High     |
//! | <= 30000  | any    | HR / R&D            | 0.525       | Medium   |
//! | > 30000   | <= 2   | Sales               | 0.625       | Medium   |
//! | > 30000   | >= 3   | Sales               | 0.425       | Medium   |
//! | > 30000   | <= 2   | HR / R&D            | 0.375       | Medium   |
//! | > 30000   | >= 3   | HR / R&D            | 0.175       | Low      |

use std::path::Path;

use serde_json::{Value, json};

use crate::constants::{
    DEPARTMENT_ENCODER_FILENAME, JOB_ENCODER_FILENAME, MODEL_CONFIG_FILENAME, MODEL_FILENAME,
};
use crate::model::{ForestClassifier, Vocabulary};

pub const SAMPLE_ACCURACY: f64 = 0.8503;

pub const SAMPLE_DEPARTMENTS: [&str; 3] = ["Human Resources", "Research & Development", "Sales"];

pub const SAMPLE_JOB_TITLES: [&str; 9] = [
    "Healthcare Representative",
    "Human Resources",
    "Laboratory Technician",
    "Manager",
    "Manufacturing Director",
    "Research Director",
    "Research Scientist",
    "Sales Executive",
    "Sales Representative",
];

pub const SAMPLE_FEATURE_NAMES: [&str; 4] = [
    "salary",
    "performanceRating",
    "department_encoded",
    "jobTitle_encoded",
];

pub fn sample_forest_json() -> Value {
    json!({
        "model_type": "Random Forest (4 Fields)",
        "n_features": 4,
        "feature_names": SAMPLE_FEATURE_NAMES,
        "feature_importances": [0.45, 0.2, 0.25, 0.1],
        "trees": [
            {
                "children_left": [1, -1, 3, -1, -1],
                "children_right": [2, -1, 4, -1, -1],
                "feature": [0, -2, 1, -2, -2],
                "threshold": [30000.0, -2.0, 2.5, -2.0, -2.0],
                "value": [[18.0, 22.0], [2.0, 8.0], [14.0, 6.0], [5.0, 5.0], [9.0, 1.0]]
            },
            {
                "children_left": [1, -1, -1],
                "children_right": [2, -1, -1],
                "feature": [2, -2, -2],
                "threshold": [1.5, -2.0, -2.0],
                "value": [[4.0, 4.0], [3.0, 1.0], [1.0, 3.0]]
            }
        ]
    })
}

pub fn sample_model_config_json() -> Value {
    json!({
        "feature_names": SAMPLE_FEATURE_NAMES,
        "departments": SAMPLE_DEPARTMENTS,
        "job_titles": SAMPLE_JOB_TITLES,
        "accuracy": SAMPLE_ACCURACY,
        "trained_on": "2025-01-15 10:30:00",
        "total_samples": 1470,
        "fields": 4
    })
}

/// Writes the four sample artifacts into `dir`.
pub fn write_sample_artifacts(dir: &Path) -> std::io::Result<()> {
    write_json(&dir.join(MODEL_FILENAME), &sample_forest_json())?;
    write_json(
        &dir.join(DEPARTMENT_ENCODER_FILENAME),
        &json!({ "classes": SAMPLE_DEPARTMENTS }),
    )?;
    write_json(
        &dir.join(JOB_ENCODER_FILENAME),
        &json!({ "classes": SAMPLE_JOB_TITLES }),
    )?;
    write_json(&dir.join(MODEL_CONFIG_FILENAME), &sample_model_config_json())
}

pub fn write_json(path: &Path, value: &Value) -> std::io::Result<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    std::fs::write(path, bytes)
}

pub fn sample_departments() -> Vec<String> {
    SAMPLE_DEPARTMENTS.iter().map(|s| s.to_string()).collect()
}

pub fn sample_job_titles() -> Vec<String> {
    SAMPLE_JOB_TITLES.iter().map(|s| s.to_string()).collect()
}

pub fn sample_vocabulary() -> Vocabulary {
    Vocabulary::new(sample_departments(), sample_job_titles())
        .expect("sample vocabulary is sorted")
}

pub fn sample_forest() -> ForestClassifier {
    let bytes = serde_json::to_vec(&sample_forest_json()).expect("sample forest serializes");
    ForestClassifier::from_json_slice(&bytes).expect("sample forest is valid")
}
