use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use super::error::ModelError;

/// Which categorical input a vocabulary covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Department,
    JobTitle,
}

impl CategoryKind {
    /// Request field carrying this category.
    pub fn field_name(&self) -> &'static str {
        match self {
            CategoryKind::Department => "department",
            CategoryKind::JobTitle => "jobTitle",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Department => "department",
            CategoryKind::JobTitle => "job title",
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Training-time classes of one categorical feature.
///
/// A class's code is its position in the list. Classes must be strictly ascending, which
/// is how label encoders assign codes, so the mapping is a bijection between the known
/// strings and `0..len`.
#[derive(Debug, Clone)]
pub struct CategoryVocabulary {
    kind: CategoryKind,
    classes: Vec<String>,
    index: HashMap<String, usize>,
    folded: HashMap<String, usize>,
}

impl CategoryVocabulary {
    pub fn new(kind: CategoryKind, classes: Vec<String>) -> Result<Self, ModelError> {
        if classes.is_empty() {
            return Err(ModelError::EmptyVocabulary { kind });
        }

        if let Some(pair) = classes.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(ModelError::UnsortedVocabulary {
                kind,
                previous: pair[0].clone(),
                next: pair[1].clone(),
            });
        }

        let index = classes
            .iter()
            .enumerate()
            .map(|(code, class)| (class.clone(), code))
            .collect();

        let mut folded = HashMap::new();
        for (code, class) in classes.iter().enumerate() {
            folded.entry(class.to_lowercase()).or_insert(code);
        }

        Ok(Self {
            kind,
            classes,
            index,
            folded,
        })
    }

    pub fn kind(&self) -> CategoryKind {
        self.kind
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Exact, case-sensitive membership.
    pub fn contains(&self, value: &str) -> bool {
        self.index.contains_key(value)
    }

    pub fn encode(&self, value: &str) -> Option<usize> {
        self.index.get(value).copied()
    }

    pub fn decode(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }

    /// Finds the class equal to `value` ignoring case.
    pub fn find_case_insensitive(&self, value: &str) -> Option<&str> {
        self.folded
            .get(&value.to_lowercase())
            .and_then(|code| self.decode(*code))
    }
}

/// Department and job-title vocabularies, versioned together with the classifier.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    pub departments: CategoryVocabulary,
    pub job_titles: CategoryVocabulary,
}

impl Vocabulary {
    pub fn new(departments: Vec<String>, job_titles: Vec<String>) -> Result<Self, ModelError> {
        Ok(Self {
            departments: CategoryVocabulary::new(CategoryKind::Department, departments)?,
            job_titles: CategoryVocabulary::new(CategoryKind::JobTitle, job_titles)?,
        })
    }

    pub fn get(&self, kind: CategoryKind) -> &CategoryVocabulary {
        match kind {
            CategoryKind::Department => &self.departments,
            CategoryKind::JobTitle => &self.job_titles,
        }
    }
}
