use serde_json::json;
use tempfile::TempDir;

use super::*;
use crate::constants::MODEL_CONFIG_FILENAME;
use crate::model::MockClassifier;
use crate::pipeline::{ReconciliationPolicy, RiskCategory};
use crate::testing::{
    SAMPLE_DEPARTMENTS, SAMPLE_FEATURE_NAMES, SAMPLE_JOB_TITLES, sample_vocabulary,
    write_json, write_sample_artifacts,
};

fn artifact_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_sample_artifacts(dir.path()).unwrap();
    dir
}

fn sales_request() -> PredictionRequest {
    PredictionRequest::new(25_000, 2, "Sales", "Sales Executive").with_employee("E001", "Asha")
}

#[test]
fn test_load_sample_artifacts() {
    let dir = artifact_dir();
    let service = AttritionService::load(dir.path(), &PipelineConfig::default());

    assert!(service.is_loaded());
    assert!(service.pipeline().is_some());

    let health = service.health_check();
    assert_eq!(health.status, "ok");
    assert!(health.model_loaded);
    assert_eq!(health.accuracy, "85.03%");
    assert_eq!(
        health.fields,
        ["salary", "performanceRating", "department", "jobTitle"]
    );
    assert_eq!(health.artifact_fingerprint.as_deref().map(str::len), Some(64));
}

#[test]
fn test_predict_single_through_service() {
    let dir = artifact_dir();
    let service = AttritionService::load(dir.path(), &PipelineConfig::default());

    let result = service.predict_single(&sales_request()).unwrap();
    assert_eq!(result.risk_score, 0.775);
    assert_eq!(result.risk_percentage, 77.5);
    assert_eq!(result.risk_category, RiskCategory::High);
    assert_eq!(result.employee_id, "E001");
    assert_eq!(result.employee_name, "Asha");
}

#[test]
fn test_lenient_service_sends_lowercased_title_to_fallback() {
    let dir = artifact_dir();
    let request = PredictionRequest::new(25_000, 2, "Sales", "sales executive");

    let service = AttritionService::load(dir.path(), &PipelineConfig::default());
    let result = service.predict_single(&request).unwrap();
    assert_eq!(result.prediction_details.job_title, "Research Scientist");

    let config = PipelineConfig::default().with_case_insensitive_match(true);
    let service = AttritionService::load(dir.path(), &config);
    let result = service.predict_single(&request).unwrap();
    assert_eq!(result.prediction_details.job_title, "Sales Executive");
}

#[test]
fn test_missing_artifacts_degrade_service() {
    let dir = TempDir::new().unwrap();
    let service = AttritionService::load(dir.path(), &PipelineConfig::default());

    assert!(!service.is_loaded());
    assert!(service.pipeline().is_none());

    let health = service.health_check();
    assert_eq!(health.status, "ok");
    assert!(!health.model_loaded);
    assert_eq!(health.accuracy, "N/A");
    assert!(health.artifact_fingerprint.is_none());
    assert!(health.message.contains("attrition_model.json"));
}

#[test]
fn test_degraded_service_rejects_every_call() {
    let service = AttritionService::<MockClassifier>::not_loaded("artifact not found");

    let single = service.predict_single(&sales_request()).unwrap_err();
    assert_eq!(
        single,
        PredictionError::ModelNotLoaded {
            reason: "artifact not found".to_string()
        }
    );
    assert_eq!(single.to_string(), "Model not loaded: artifact not found");

    assert!(matches!(
        service.predict_batch(&[sales_request()]),
        Err(PredictionError::ModelNotLoaded { .. })
    ));
    assert!(matches!(
        service.evaluate(&[LabeledRequest::new(sales_request(), "Yes")]),
        Err(PredictionError::ModelNotLoaded { .. })
    ));
    assert!(matches!(
        service.get_config(),
        Err(PredictionError::ModelNotLoaded { .. })
    ));
}

#[test]
fn test_try_load_reports_reason() {
    let dir = TempDir::new().unwrap();
    let err = AttritionService::try_load(dir.path(), &PipelineConfig::default()).unwrap_err();
    assert!(matches!(err, LoadError::Artifacts(_)));
}

#[test]
fn test_unknown_fallback_fails_load() {
    let dir = artifact_dir();
    let config = PipelineConfig {
        fallback_department: "Engineering".to_string(),
        ..PipelineConfig::default()
    };

    let err = AttritionService::try_load(dir.path(), &config).unwrap_err();
    assert!(matches!(err, LoadError::Pipeline(_)));
    assert!(err.to_string().contains("Engineering"));

    let service = AttritionService::load(dir.path(), &config);
    assert!(!service.is_loaded());
}

#[test]
fn test_inconsistent_metadata_fails_load() {
    let dir = artifact_dir();
    write_json(
        &dir.path().join(MODEL_CONFIG_FILENAME),
        &json!({ "accuracy": 0.85, "departments": ["Sales"] }),
    )
    .unwrap();

    let service = AttritionService::load(dir.path(), &PipelineConfig::default());
    assert!(!service.is_loaded());
}

#[test]
fn test_get_config_describes_loaded_model() {
    let dir = artifact_dir();
    let config = PipelineConfig::default().with_policy(ReconciliationPolicy::Strict);
    let service = AttritionService::load(dir.path(), &config);

    let info = service.get_config().unwrap();
    assert_eq!(info.model_type, "Random Forest (4 Fields)");
    assert_eq!(info.accuracy, "85.03%");
    assert_eq!(
        info.required_fields,
        vec!["salary", "performanceRating", "department", "jobTitle"]
    );
    assert_eq!(info.supported_departments, SAMPLE_DEPARTMENTS.to_vec());
    assert_eq!(info.supported_job_titles, SAMPLE_JOB_TITLES.to_vec());
    assert_eq!(info.performance_scale, "1-4");
    assert_eq!(info.reconciliation_policy, ReconciliationPolicy::Strict);
    assert_eq!(info.risk_thresholds.medium, 0.33);
    assert_eq!(info.risk_thresholds.high, 0.66);
    assert_eq!(info.feature_order, SAMPLE_FEATURE_NAMES.to_vec());
    assert_eq!(info.feature_importances, Some(vec![0.45, 0.2, 0.25, 0.1]));
    assert!(info.artifact_fingerprint.is_some());
}

#[test]
fn test_model_info_serialization() {
    let dir = artifact_dir();
    let service = AttritionService::load(dir.path(), &PipelineConfig::default());

    let value = serde_json::to_value(service.get_config().unwrap()).unwrap();
    assert_eq!(value["reconciliation_policy"], "lenient");
    assert_eq!(value["risk_thresholds"], json!({ "medium": 0.33, "high": 0.66 }));
    assert_eq!(value["performance_scale"], "1-4");
    assert_eq!(value["supported_departments"][2], "Sales");
}

#[test]
fn test_from_parts_with_mock() {
    let service = AttritionService::from_parts(
        MockClassifier::fixed(0.4),
        sample_vocabulary(),
        ModelMetadata::with_accuracy(0.9),
        &PipelineConfig::default(),
    )
    .unwrap();

    let info = service.get_config().unwrap();
    assert_eq!(info.model_type, "Mock Classifier");
    assert_eq!(info.accuracy, "90.00%");
    assert!(info.feature_importances.is_none());
    assert!(info.artifact_fingerprint.is_none());

    let value = serde_json::to_value(&info).unwrap();
    assert!(value.get("artifact_fingerprint").is_none());
    assert!(value.get("feature_importances").is_none());

    let result = service.predict_single(&sales_request()).unwrap();
    assert_eq!(result.risk_category, RiskCategory::Medium);
    assert_eq!(service.pipeline().unwrap().classifier().call_count(), 1);
}

#[test]
fn test_format_accuracy() {
    assert_eq!(format_accuracy(0.8503), "85.03%");
    assert_eq!(format_accuracy(1.0), "100.00%");
    assert_eq!(format_accuracy(0.0), "0.00%");
}
