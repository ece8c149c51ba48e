use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::RiskClassifier;
use super::error::ClassifierError;

#[derive(Debug, Clone)]
enum MockBehavior {
    Fixed(f64),
    Sequence(Vec<f64>),
    Function(fn(&[f64]) -> f64),
    Failing(String),
}

/// Scriptable classifier for tests.
#[derive(Debug)]
pub struct MockClassifier {
    behavior: MockBehavior,
    n_features: Option<usize>,
    feature_names: Option<Vec<String>>,
    feature_importances: Option<Vec<f64>>,
    calls: AtomicUsize,
    last_features: Mutex<Option<Vec<f64>>>,
}

impl MockClassifier {
    fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            n_features: None,
            feature_names: None,
            feature_importances: None,
            calls: AtomicUsize::new(0),
            last_features: Mutex::new(None),
        }
    }

    /// Always returns `probability` (which may be outside [0, 1] on purpose).
    pub fn fixed(probability: f64) -> Self {
        Self::with_behavior(MockBehavior::Fixed(probability))
    }

    /// Returns the given probabilities in turn, cycling when exhausted.
    pub fn sequence(probabilities: Vec<f64>) -> Self {
        assert!(!probabilities.is_empty(), "sequence must not be empty");
        Self::with_behavior(MockBehavior::Sequence(probabilities))
    }

    /// Computes the probability from the feature row.
    pub fn from_fn(f: fn(&[f64]) -> f64) -> Self {
        Self::with_behavior(MockBehavior::Function(f))
    }

    /// Fails every call with [`ClassifierError::InferenceFailed`].
    pub fn failing(reason: impl Into<String>) -> Self {
        Self::with_behavior(MockBehavior::Failing(reason.into()))
    }

    pub fn with_n_features(mut self, n_features: usize) -> Self {
        self.n_features = Some(n_features);
        self
    }

    pub fn with_feature_names(mut self, names: &[&str]) -> Self {
        self.feature_names = Some(names.iter().map(|n| n.to_string()).collect());
        self
    }

    pub fn with_feature_importances(mut self, importances: Vec<f64>) -> Self {
        self.feature_importances = Some(importances);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_features(&self) -> Option<Vec<f64>> {
        self.last_features.lock().ok().and_then(|guard| guard.clone())
    }
}

impl RiskClassifier for MockClassifier {
    fn predict_probability(&self, features: &[f64]) -> Result<f64, ClassifierError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_features.lock() {
            *last = Some(features.to_vec());
        }

        match &self.behavior {
            MockBehavior::Fixed(p) => Ok(*p),
            MockBehavior::Sequence(values) => Ok(values[call % values.len()]),
            MockBehavior::Function(f) => Ok(f(features)),
            MockBehavior::Failing(reason) => Err(ClassifierError::InferenceFailed {
                reason: reason.clone(),
            }),
        }
    }

    fn n_features(&self) -> Option<usize> {
        self.n_features
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn feature_importances(&self) -> Option<&[f64]> {
        self.feature_importances.as_deref()
    }

    fn model_type(&self) -> &str {
        "Mock Classifier"
    }
}
