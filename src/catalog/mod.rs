//! Disease catalog and class index
//!
//! Two structures are kept side by side:
//! - [`ClassIndex`]: the ordered labels, position *i* is output unit *i* of the classifier
//! - [`DiseaseCatalog`]: description and treatment text keyed by label
//!
//! They are validated against each other once at startup, so a label produced by
//! the classifier always resolves to a record.

mod builtin;

use std::collections::HashMap;
use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::utils::error::{DiagnosisError, Result};
use builtin::BUILTIN_DISEASES;

/// Number of disease classes the bundled classifier distinguishes
pub const NUM_CLASSES: usize = BUILTIN_DISEASES.len();

/// Static description and treatment for one disease
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseaseRecord {
    pub name: String,
    pub description: String,
    pub treatment: String,
}

/// Ordered class labels matching the classifier's output layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ClassIndex {
    labels: Vec<String>,
}

impl ClassIndex {
    /// Build an index, rejecting empty and duplicate labels
    pub fn new(labels: Vec<String>) -> Result<Self> {
        if labels.is_empty() {
            return Err(DiagnosisError::Catalog(
                "class index must contain at least one label".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for label in &labels {
            if label.trim().is_empty() {
                return Err(DiagnosisError::Catalog(
                    "class index contains an empty label".to_string(),
                ));
            }
            if !seen.insert(label.as_str()) {
                return Err(DiagnosisError::Catalog(format!(
                    "duplicate label in class index: {}",
                    label
                )));
            }
        }

        Ok(Self { labels })
    }

    /// The class order the bundled model was trained with
    pub fn builtin() -> Self {
        Self {
            labels: BUILTIN_DISEASES
                .iter()
                .map(|(name, _, _)| name.to_string())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label for a classifier output index
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn position(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

/// Lookup table from label to [`DiseaseRecord`]
#[derive(Debug, Clone)]
pub struct DiseaseCatalog {
    records: HashMap<String, DiseaseRecord>,
}

impl TryFrom<Vec<String>> for ClassIndex {
    type Error = DiagnosisError;

    fn try_from(labels: Vec<String>) -> Result<Self> {
        Self::new(labels)
    }
}

impl From<ClassIndex> for Vec<String> {
    fn from(index: ClassIndex) -> Self {
        index.labels
    }
}

/// On-disk catalog document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    pub labels: Vec<String>,
    pub diseases: Vec<DiseaseRecord>,
}

impl DiseaseCatalog {
    /// Build a catalog, rejecting duplicate names
    pub fn new(records: Vec<DiseaseRecord>) -> Result<Self> {
        let mut map = HashMap::with_capacity(records.len());
        for record in records {
            if map.contains_key(&record.name) {
                return Err(DiagnosisError::Catalog(format!(
                    "duplicate catalog entry: {}",
                    record.name
                )));
            }
            map.insert(record.name.clone(), record);
        }
        Ok(Self { records: map })
    }

    /// The 15 bundled disease descriptions
    pub fn builtin() -> Self {
        let records = BUILTIN_DISEASES
            .iter()
            .map(|(name, description, treatment)| {
                (
                    name.to_string(),
                    DiseaseRecord {
                        name: name.to_string(),
                        description: description.to_string(),
                        treatment: treatment.to_string(),
                    },
                )
            })
            .collect();
        Self { records }
    }

    /// Load a catalog and its class index from a JSON document
    ///
    /// The pair is validated before it is returned.
    pub fn from_json_file(path: &Path) -> Result<(Self, ClassIndex)> {
        let json = std::fs::read_to_string(path)?;
        let file: CatalogFile = serde_json::from_str(&json)?;

        let index = ClassIndex::new(file.labels)?;
        let catalog = Self::new(file.diseases)?;
        catalog.validate(&index)?;

        Ok((catalog, index))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a label
    ///
    /// A miss means the catalog and the class index are out of sync.
    pub fn lookup(&self, name: &str) -> Result<&DiseaseRecord> {
        self.records
            .get(name)
            .ok_or_else(|| DiagnosisError::UnknownLabel(name.to_string()))
    }

    /// Check that every index label has a complete record and nothing is left over
    pub fn validate(&self, index: &ClassIndex) -> Result<()> {
        for label in index.iter() {
            let record = self.lookup(label)?;
            if record.description.trim().is_empty() {
                return Err(DiagnosisError::Catalog(format!(
                    "empty description for {}",
                    label
                )));
            }
            if record.treatment.trim().is_empty() {
                return Err(DiagnosisError::Catalog(format!(
                    "empty treatment for {}",
                    label
                )));
            }
        }

        if let Some(orphan) = self
            .records
            .keys()
            .find(|name| index.position(name).is_none())
        {
            return Err(DiagnosisError::Catalog(format!(
                "catalog entry {} has no class index position",
                orphan
            )));
        }

        Ok(())
    }

    /// Records in class-index order
    pub fn ordered<'a>(&'a self, index: &'a ClassIndex) -> Vec<(usize, &'a DiseaseRecord)> {
        index
            .iter()
            .enumerate()
            .filter_map(|(i, label)| self.records.get(label).map(|r| (i, r)))
            .collect()
    }
}
