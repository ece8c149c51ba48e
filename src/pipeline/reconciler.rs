//! Maps free-form department and job-title strings onto the trained vocabulary.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::warn;

use super::error::PredictionError;
use crate::config::ConfigError;
use crate::model::{CategoryKind, CategoryVocabulary, Vocabulary};

/// What to do with a category that is not an exact vocabulary member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconciliationPolicy {
    /// Reject with the list of valid options.
    Strict,
    /// Synonym table, then the configured default.
    #[default]
    Lenient,
}

impl ReconciliationPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconciliationPolicy::Strict => "strict",
            ReconciliationPolicy::Lenient => "lenient",
        }
    }
}

impl fmt::Display for ReconciliationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReconciliationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(ReconciliationPolicy::Strict),
            "lenient" => Ok(ReconciliationPolicy::Lenient),
            _ => Err("expected 'strict' or 'lenient'".to_string()),
        }
    }
}

/// How a reconciled value was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Synonym,
    CaseInsensitive,
    Fallback,
}

/// A vocabulary member chosen for a candidate string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub value: String,
    pub matched: MatchKind,
}

impl Reconciled {
    fn new(value: impl Into<String>, matched: MatchKind) -> Self {
        Self {
            value: value.into(),
            matched,
        }
    }

    pub fn was_remapped(&self) -> bool {
        self.matched != MatchKind::Exact
    }
}

const DEPARTMENT_SYNONYMS: &[(&str, &str)] = &[
    ("developer", "Research & Development"),
    ("development", "Research & Development"),
    ("it", "Research & Development"),
    ("tech", "Research & Development"),
    ("engineering", "Research & Development"),
    ("sales", "Sales"),
    ("marketing", "Sales"),
    ("hr", "Human Resources"),
    ("human resources", "Human Resources"),
    ("admin", "Human Resources"),
];

const JOB_TITLE_SYNONYMS: &[(&str, &str)] = &[
    ("developer", "Research Scientist"),
    ("senior developer", "Research Scientist"),
    ("junior developer", "Research Scientist"),
    ("software engineer", "Research Scientist"),
    ("engineer", "Research Scientist"),
    ("tech lead", "Manager"),
    ("team lead", "Manager"),
    ("hr manager", "Manager"),
    ("sales manager", "Manager"),
    ("hr executive", "Human Resources"),
    ("sales rep", "Sales Representative"),
];

/// Lower-cased alias to vocabulary member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynonymTable {
    entries: HashMap<String, String>,
}

impl SynonymTable {
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(alias, target)| (normalize(alias.as_ref()), target.into()))
            .collect();
        Self { entries }
    }

    pub fn default_for(kind: CategoryKind) -> Self {
        match kind {
            CategoryKind::Department => Self::from_pairs(DEPARTMENT_SYNONYMS.iter().copied()),
            CategoryKind::JobTitle => Self::from_pairs(JOB_TITLE_SYNONYMS.iter().copied()),
        }
    }

    pub fn lookup(&self, candidate: &str) -> Option<&str> {
        self.entries.get(&normalize(candidate)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops entries whose target is not in `vocabulary`, returning the dropped aliases.
    pub fn retain_known(&mut self, vocabulary: &CategoryVocabulary) -> Vec<String> {
        let mut dropped: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, target)| !vocabulary.contains(target))
            .map(|(alias, _)| alias.clone())
            .collect();
        dropped.sort();

        for alias in &dropped {
            self.entries.remove(alias);
        }
        dropped
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

#[derive(Debug, Clone)]
struct CategoryRules {
    synonyms: SynonymTable,
    fallback: String,
}

impl CategoryRules {
    fn build(
        policy: ReconciliationPolicy,
        vocabulary: &CategoryVocabulary,
        mut synonyms: SynonymTable,
        fallback: &str,
    ) -> Result<Self, ConfigError> {
        let kind = vocabulary.kind();

        if policy == ReconciliationPolicy::Lenient && !vocabulary.contains(fallback) {
            return Err(ConfigError::UnknownDefaultCategory {
                kind: kind.as_str(),
                value: fallback.to_string(),
            });
        }

        let dropped = synonyms.retain_known(vocabulary);
        if !dropped.is_empty() {
            warn!(
                category = %kind,
                dropped = ?dropped,
                "Synonyms point outside the loaded vocabulary and were dropped"
            );
        }

        Ok(Self {
            synonyms,
            fallback: fallback.to_string(),
        })
    }
}

/// Categorical reconciler bound to one vocabulary at build time.
#[derive(Debug, Clone)]
pub struct Reconciler {
    policy: ReconciliationPolicy,
    case_insensitive: bool,
    department: CategoryRules,
    job_title: CategoryRules,
}

impl Reconciler {
    /// Builds a reconciler with the built-in synonym tables.
    pub fn new(
        policy: ReconciliationPolicy,
        vocabulary: &Vocabulary,
        fallback_department: &str,
        fallback_job_title: &str,
    ) -> Result<Self, ConfigError> {
        Self::with_synonyms(
            policy,
            vocabulary,
            SynonymTable::default_for(CategoryKind::Department),
            SynonymTable::default_for(CategoryKind::JobTitle),
            fallback_department,
            fallback_job_title,
        )
    }

    pub fn with_synonyms(
        policy: ReconciliationPolicy,
        vocabulary: &Vocabulary,
        department_synonyms: SynonymTable,
        job_title_synonyms: SynonymTable,
        fallback_department: &str,
        fallback_job_title: &str,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            policy,
            case_insensitive: false,
            department: CategoryRules::build(
                policy,
                &vocabulary.departments,
                department_synonyms,
                fallback_department,
            )?,
            job_title: CategoryRules::build(
                policy,
                &vocabulary.job_titles,
                job_title_synonyms,
                fallback_job_title,
            )?,
        })
    }

    /// Lets lenient lookups try a case-insensitive vocabulary match after the synonym
    /// table and before the fallback. Off by default.
    pub fn with_case_insensitive_match(mut self, enabled: bool) -> Self {
        self.case_insensitive = enabled;
        self
    }

    pub fn policy(&self) -> ReconciliationPolicy {
        self.policy
    }

    fn rules(&self, kind: CategoryKind) -> &CategoryRules {
        match kind {
            CategoryKind::Department => &self.department,
            CategoryKind::JobTitle => &self.job_title,
        }
    }

    /// Picks the vocabulary member for `candidate`.
    ///
    /// Exact members always come back unchanged. Under the lenient policy the result is
    /// always a member of `vocabulary`; under the strict policy anything else fails.
    pub fn reconcile(
        &self,
        vocabulary: &CategoryVocabulary,
        candidate: &str,
    ) -> Result<Reconciled, PredictionError> {
        if vocabulary.contains(candidate) {
            return Ok(Reconciled::new(candidate, MatchKind::Exact));
        }

        let kind = vocabulary.kind();
        if self.policy == ReconciliationPolicy::Strict {
            return Err(PredictionError::UnknownCategory {
                kind,
                value: candidate.to_string(),
                valid: vocabulary.classes().to_vec(),
            });
        }

        let rules = self.rules(kind);
        let case_match = || {
            self.case_insensitive
                .then(|| vocabulary.find_case_insensitive(candidate.trim()))
                .flatten()
        };
        let reconciled = if let Some(target) = rules.synonyms.lookup(candidate) {
            Reconciled::new(target, MatchKind::Synonym)
        } else if let Some(member) = case_match() {
            Reconciled::new(member, MatchKind::CaseInsensitive)
        } else {
            Reconciled::new(rules.fallback.as_str(), MatchKind::Fallback)
        };

        warn!(
            category = %kind,
            original = candidate,
            mapped = %reconciled.value,
            matched = ?reconciled.matched,
            "Remapped unknown category"
        );

        Ok(reconciled)
    }
}
