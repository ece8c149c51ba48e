use serde_json::json;

use super::*;
use crate::model::MockClassifier;
use crate::testing::{sample_forest, sample_vocabulary};

fn mock_pipeline(classifier: MockClassifier) -> RiskPipeline<MockClassifier> {
    RiskPipeline::new(classifier, sample_vocabulary(), &PipelineConfig::default()).unwrap()
}

fn employee(id: &str, salary: i64) -> PredictionRequest {
    PredictionRequest::new(salary, 3, "Sales", "Sales Executive")
        .with_employee(id, format!("Employee {}", id))
}

fn requests_from(values: serde_json::Value) -> Vec<PredictionRequest> {
    match values {
        serde_json::Value::Array(items) => {
            items.into_iter().map(PredictionRequest::from_value).collect()
        }
        _ => panic!("expected an array"),
    }
}

#[test]
fn test_batch_partial_failure() {
    let pipeline = mock_pipeline(MockClassifier::sequence(vec![0.9, 0.5, 0.1, 0.7]));
    let requests = requests_from(json!([
        {
            "employee_id": "E1", "employee_name": "A", "salary": 20000,
            "performanceRating": 2, "department": "Sales", "jobTitle": "Sales Executive"
        },
        {
            "employee_id": "E2", "employee_name": "B", "salary": 40000,
            "performanceRating": 3, "department": "Sales", "jobTitle": "Manager"
        },
        {
            "employee_id": "E3", "employee_name": "C",
            "performanceRating": 3, "department": "Sales", "jobTitle": "Manager"
        },
        {
            "employee_id": "E4", "employee_name": "D", "salary": 90000,
            "performanceRating": 4, "department": "Research & Development",
            "jobTitle": "Research Scientist"
        },
        {
            "employee_id": "E5", "employee_name": "E", "salary": 30000,
            "performanceRating": 1, "department": "Human Resources",
            "jobTitle": "Human Resources"
        }
    ]));

    let outcome = pipeline.predict_batch(&requests);

    assert_eq!(outcome.results.len(), 4);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.processed(), requests.len());

    let error = &outcome.errors[0];
    assert_eq!(error.employee_id, "E3");
    assert_eq!(error.index, 2);
    assert_eq!(error.error, "Missing fields: salary");

    let ids: Vec<&str> = outcome.results.iter().map(|r| r.employee_id.as_str()).collect();
    assert_eq!(ids, vec!["E1", "E2", "E4", "E5"]);

    let summary = &outcome.summary;
    assert_eq!(summary.total(), 4);
    assert_eq!(summary.high_risk.count, 2);
    assert_eq!(summary.medium_risk.count, 1);
    assert_eq!(summary.low_risk.count, 1);
    assert_eq!(summary.high_risk.percentage, 50.0);
    assert_eq!(summary.medium_risk.percentage, 25.0);
    assert_eq!(summary.low_risk.percentage, 25.0);
    assert_eq!(summary.average_risk_score, 0.55);

    let examples: Vec<&str> = summary
        .high_risk
        .employees
        .iter()
        .map(|e| e.id.as_str())
        .collect();
    assert_eq!(examples, vec!["E1", "E5"]);
    assert_eq!(summary.high_risk.employees[0].name, "A");
    assert_eq!(summary.high_risk.employees[1].risk, 70.0);
}

#[test]
fn test_batch_results_plus_errors_equals_input() {
    let pipeline = mock_pipeline(MockClassifier::fixed(0.4));
    let requests = requests_from(json!([
        {"salary": 1, "performanceRating": 1, "department": "Sales", "jobTitle": "Manager"},
        "not an object",
        42,
        {"salary": "abc", "performanceRating": 1, "department": "Sales", "jobTitle": "Manager"},
        {},
        {"salary": 5, "performanceRating": 1, "department": "Nowhere", "jobTitle": "Nobody"}
    ]));

    let outcome = pipeline.predict_batch(&requests);

    assert_eq!(outcome.results.len() + outcome.errors.len(), requests.len());
    assert_eq!(outcome.results.len(), 2);

    let indices: Vec<usize> = outcome.errors.iter().map(|e| e.index).collect();
    assert_eq!(indices, vec![1, 2, 3, 4]);
    assert!(outcome.errors.iter().all(|e| e.employee_id == "Unknown"));
    assert_eq!(
        outcome.errors[1].error,
        "Missing fields: salary, performanceRating, department, jobTitle"
    );
}

#[test]
fn test_batch_strict_policy_collects_unknown_categories() {
    let config = PipelineConfig::default().with_policy(ReconciliationPolicy::Strict);
    let pipeline =
        RiskPipeline::new(MockClassifier::fixed(0.4), sample_vocabulary(), &config).unwrap();
    let requests = vec![
        employee("E1", 40_000),
        PredictionRequest::new(40_000, 3, "Engineering", "Manager").with_employee("E2", "B"),
    ];

    let outcome = pipeline.predict_batch(&requests);

    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.errors[0].employee_id, "E2");
    assert!(outcome.errors[0].error.contains("Valid options:"));
}

#[test]
fn test_empty_batch_has_zero_summary() {
    let pipeline = mock_pipeline(MockClassifier::fixed(0.9));

    let outcome = pipeline.predict_batch(&[]);

    assert!(outcome.results.is_empty());
    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.summary, BatchSummary::default());
    assert_eq!(outcome.summary.average_risk_score, 0.0);
    assert_eq!(outcome.summary.high_risk.percentage, 0.0);
}

#[test]
fn test_all_failed_batch_has_zero_summary() {
    let pipeline = mock_pipeline(MockClassifier::failing("offline"));
    let requests = vec![employee("E1", 10_000), employee("E2", 20_000)];

    let outcome = pipeline.predict_batch(&requests);

    assert_eq!(outcome.errors.len(), 2);
    assert_eq!(outcome.summary.total(), 0);
    assert_eq!(outcome.summary.low_risk.percentage, 0.0);
    assert_eq!(outcome.summary.average_risk_score, 0.0);
}

#[test]
fn test_percentages_sum_to_hundred() {
    let pipeline = mock_pipeline(MockClassifier::sequence(vec![0.1, 0.5, 0.9]));
    let requests: Vec<_> = (0..7).map(|i| employee(&format!("E{}", i), 40_000)).collect();

    let summary = pipeline.predict_batch(&requests).summary;

    let sum = summary.high_risk.percentage
        + summary.medium_risk.percentage
        + summary.low_risk.percentage;
    assert!((sum - 100.0).abs() <= 0.2, "sum was {}", sum);
    assert_eq!(summary.low_risk.count, 3);
    assert_eq!(summary.low_risk.percentage, 42.9);
    assert_eq!(summary.medium_risk.percentage, 28.6);
}

#[test]
fn test_high_risk_examples_capped_in_input_order() {
    let pipeline = mock_pipeline(MockClassifier::fixed(0.95));
    let requests: Vec<_> = (0..13).map(|i| employee(&format!("E{}", i), 10_000)).collect();

    let summary = pipeline.predict_batch(&requests).summary;

    assert_eq!(summary.high_risk.count, 13);
    assert_eq!(summary.high_risk.employees.len(), 10);
    let expected: Vec<String> = (0..10).map(|i| format!("E{}", i)).collect();
    let actual: Vec<String> = summary
        .high_risk
        .employees
        .iter()
        .map(|e| e.id.clone())
        .collect();
    assert_eq!(actual, expected);
}

#[test]
fn test_high_risk_example_cap_is_configurable() {
    let mut config = PipelineConfig::default();
    config.max_high_risk_examples = 2;
    let pipeline =
        RiskPipeline::new(MockClassifier::fixed(0.95), sample_vocabulary(), &config).unwrap();
    let requests: Vec<_> = (0..5).map(|i| employee(&format!("E{}", i), 10_000)).collect();

    let summary = pipeline.predict_batch(&requests).summary;

    assert_eq!(summary.high_risk.employees.len(), 2);
}

#[test]
fn test_average_uses_rounded_scores() {
    let pipeline = mock_pipeline(MockClassifier::sequence(vec![0.0006, 0.0006, 0.0001]));
    let requests = vec![employee("A", 40_000), employee("B", 40_000), employee("C", 40_000)];

    let summary = pipeline.predict_batch(&requests).summary;

    // 0.001, 0.001 and 0.0 after rounding; the raw mean would round to 0.0.
    assert_eq!(summary.average_risk_score, 0.001);
}

#[test]
fn test_batch_with_forest_classifier() {
    let pipeline =
        RiskPipeline::new(sample_forest(), sample_vocabulary(), &PipelineConfig::default())
            .unwrap();
    let requests = vec![
        employee("low-paid", 2500),
        PredictionRequest::new(80_000, 4, "Research & Development", "Research Director")
            .with_employee("senior", "S"),
    ];

    let outcome = pipeline.predict_batch(&requests);

    assert_eq!(outcome.summary.high_risk.count, 1);
    assert_eq!(outcome.summary.low_risk.count, 1);
    assert_eq!(outcome.summary.average_risk_score, 0.475);
    assert_eq!(outcome.summary.high_risk.employees[0].risk, 77.5);
}

#[test]
fn test_summary_serializes_to_wire_shape() {
    let pipeline = mock_pipeline(MockClassifier::fixed(0.8));
    let outcome = pipeline.predict_batch(&[employee("E1", 10_000)]);

    let value = serde_json::to_value(&outcome.summary).unwrap();

    assert_eq!(
        value,
        json!({
            "high_risk": {
                "count": 1,
                "percentage": 100.0,
                "employees": [{"id": "E1", "name": "Employee E1", "risk": 80.0}]
            },
            "medium_risk": {"count": 0, "percentage": 0.0},
            "low_risk": {"count": 0, "percentage": 0.0},
            "average_risk_score": 0.8
        })
    );
}

#[test]
fn test_parse_label() {
    assert_eq!(parse_label(&json!("Yes")), Some(true));
    assert_eq!(parse_label(&json!(" no ")), Some(false));
    assert_eq!(parse_label(&json!(true)), Some(true));
    assert_eq!(parse_label(&json!(0)), Some(false));
    assert_eq!(parse_label(&json!(1.0)), Some(true));
    assert_eq!(parse_label(&json!("1")), Some(true));
    assert_eq!(parse_label(&json!("maybe")), None);
    assert_eq!(parse_label(&json!(2)), None);
    assert_eq!(parse_label(&json!(null)), None);
}

#[test]
fn test_evaluate_confusion_matrix() {
    fn by_salary(features: &[f64]) -> f64 {
        if features[0] < 30_000.0 { 0.8 } else { 0.2 }
    }
    let pipeline = mock_pipeline(MockClassifier::from_fn(by_salary));

    let items = vec![
        LabeledRequest::new(employee("tp", 10_000), "Yes"),
        LabeledRequest::new(employee("fp", 10_000), "No"),
        LabeledRequest::new(employee("tn", 50_000), false),
        LabeledRequest::new(employee("fn", 50_000), 1),
        LabeledRequest::new(employee("tp2", 20_000), true),
        LabeledRequest::from_value(json!({
            "employee_id": "unlabeled",
            "salary": 10000,
            "performanceRating": 3,
            "department": "Sales",
            "jobTitle": "Manager"
        })),
        LabeledRequest::new(PredictionRequest::default(), "Yes"),
    ];

    let report = pipeline.evaluate(&items);

    assert_eq!(
        report.confusion_matrix,
        ConfusionMatrix {
            true_negative: 1,
            false_positive: 1,
            false_negative: 1,
            true_positive: 2,
        }
    );
    assert_eq!(report.evaluated, 5);
    assert_eq!(report.skipped, 2);
    assert_eq!(report.accuracy, 0.6);
    assert!((report.precision - 2.0 / 3.0).abs() < 1e-12);
    assert!((report.recall - 2.0 / 3.0).abs() < 1e-12);

    assert_eq!(report.errors[0].employee_id, "unlabeled");
    assert_eq!(report.errors[0].index, 5);
    assert!(report.errors[0].error.contains("attrition label"));
    assert_eq!(report.errors[1].index, 6);
}

#[test]
fn test_evaluate_handles_no_positives() {
    let pipeline = mock_pipeline(MockClassifier::fixed(0.1));
    let items = vec![LabeledRequest::new(employee("a", 40_000), "No")];

    let report = pipeline.evaluate(&items);

    assert_eq!(report.accuracy, 1.0);
    assert_eq!(report.precision, 0.0);
    assert_eq!(report.recall, 0.0);
}

#[test]
fn test_labeled_request_from_value_splits_label() {
    let item = LabeledRequest::from_value(json!({
        "employeeId": "E9",
        "salary": 1,
        "performanceRating": 1,
        "department": "Sales",
        "jobTitle": "Manager",
        "attrition": "Yes"
    }));

    assert_eq!(item.label, Some(json!("Yes")));
    assert_eq!(item.request.employee_id(), Some("E9".to_string()));
    assert_eq!(item.request.salary, Some(json!(1)));
}
