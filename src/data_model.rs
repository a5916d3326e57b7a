//! Shared vocabulary of the BioSimulations object model.
//!
//! These are plain value types that the models, simulations and visualizations
//! build upon. They carry no behaviour beyond equality, ordering keys for
//! order-insensitive comparisons, and JSON (de)serialization.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use derive_builder::Builder;
use itertools::Itertools;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A file format, such as SBML or SED-ML.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
pub struct Format {
    /// Short identifier of the format (e.g. `SBML`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Full name of the format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Version of the format (e.g. `L1V3`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// EDAM identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edam_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// URL of the specification of the format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec_url: Option<String>,

    /// Media type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// Conventional file extension, without the dot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,

    /// SED-ML language URN (e.g. `urn:sedml:language:sbml`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sed_urn: Option<String>,
}

impl Format {
    /// Returns a copy of the format pinned to a specific version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// A term of an ontology such as KiSAO.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
pub struct OntologyTerm {
    /// Ontology the term belongs to (e.g. `KISAO`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ontology: Option<String>,

    /// Identifier of the term within its ontology (e.g. `0000019`).
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iri: Option<String>,
}

impl OntologyTerm {
    /// Creates a term from its ontology and identifier.
    ///
    /// # Arguments
    ///
    /// * `ontology` - Name of the ontology (e.g. `KISAO`)
    /// * `id` - Identifier of the term within the ontology
    pub fn new(ontology: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            ontology: Some(ontology.into()),
            id: id.into(),
            ..Default::default()
        }
    }

    pub(crate) fn sort_key(&self) -> (Option<String>, String) {
        (self.ontology.clone(), self.id.clone())
    }
}

/// A person, typically an author of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
pub struct Person {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl Person {
    /// Creates a person from a first and last name.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: Some(first_name.into()),
            middle_name: None,
            last_name: Some(last_name.into()),
        }
    }

    pub(crate) fn sort_key(&self) -> (Option<String>, Option<String>, Option<String>) {
        (
            self.last_name.clone(),
            self.first_name.clone(),
            self.middle_name.clone(),
        )
    }
}

/// A reference to an article in a journal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
pub struct JournalReference {
    /// Author list, formatted as free text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,

    /// Volume, which is usually but not always numeric.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
}

impl JournalReference {
    pub(crate) fn sort_key(&self) -> impl Ord {
        (
            self.authors.clone(),
            self.title.clone(),
            self.journal.clone(),
            self.volume.clone(),
            self.issue,
            self.pages.clone(),
            self.year,
            self.doi.clone(),
        )
    }
}

/// A reference to a file, such as the source of a model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
pub struct RemoteFile {
    /// Name or path of the file.
    pub name: String,

    /// Media type of the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// Size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// An identifier of a resource in an external namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
pub struct Identifier {
    /// Namespace (e.g. `biomodels.db`).
    pub namespace: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// License under which a resource is distributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub enum License {
    #[serde(rename = "CC0")]
    Cc0,
    #[serde(rename = "CC BY")]
    CcBy,
    #[serde(rename = "CC BY-SA")]
    CcBySa,
    #[serde(rename = "CC BY-NC")]
    CcByNc,
    #[serde(rename = "CC BY-NC-SA")]
    CcByNcSa,
    #[serde(rename = "MIT")]
    Mit,
    #[serde(rename = "Other")]
    Other,
}

impl License {
    /// Returns the canonical string value of the license.
    pub fn as_str(&self) -> &'static str {
        match self {
            License::Cc0 => "CC0",
            License::CcBy => "CC BY",
            License::CcBySa => "CC BY-SA",
            License::CcByNc => "CC BY-NC",
            License::CcByNcSa => "CC BY-NC-SA",
            License::Mit => "MIT",
            License::Other => "Other",
        }
    }
}

impl fmt::Display for License {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for License {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            License::Cc0,
            License::CcBy,
            License::CcBySa,
            License::CcByNc,
            License::CcByNcSa,
            License::Mit,
            License::Other,
        ]
        .into_iter()
        .find(|license| license.as_str().eq_ignore_ascii_case(s.trim()))
        .ok_or_else(|| format!("Invalid license: {s}"))
    }
}

/// Type of the value of a parameter or variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Boolean,
    Integer,
    Float,
    String,
}

/// Descriptive metadata about a top-level resource such as a simulation.
///
/// Equality ignores the order of tags, authors and references.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder, Default)]
pub struct ResourceMetadata {
    /// Human readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub name: Option<String>,

    /// Free text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default, setter(into, each(name = "to_tags", into)))]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default, setter(into, each(name = "to_authors")))]
    pub authors: Vec<Person>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default, setter(into, each(name = "to_references")))]
    pub references: Vec<JournalReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub license: Option<License>,

    /// Revision of the resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub version: Option<u32>,

    /// Date the resource was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub created: Option<DateTime<Utc>>,

    /// Date the resource was last updated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub updated: Option<DateTime<Utc>>,
}

impl PartialEq for ResourceMetadata {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.description == other.description
            && self.tags.iter().sorted().eq(other.tags.iter().sorted())
            && self
                .authors
                .iter()
                .sorted_by_key(|author| author.sort_key())
                .eq(other.authors.iter().sorted_by_key(|author| author.sort_key()))
            && self
                .references
                .iter()
                .sorted_by_key(|reference| reference.sort_key())
                .eq(other
                    .references
                    .iter()
                    .sorted_by_key(|reference| reference.sort_key()))
            && self.license == other.license
            && self.version == other.version
            && self.created == other.created
            && self.updated == other.updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_license_from_str() {
        assert_eq!("CC BY-SA".parse::<License>().unwrap(), License::CcBySa);
        assert_eq!("mit".parse::<License>().unwrap(), License::Mit);
        assert!("GPL".parse::<License>().is_err());
    }

    #[test]
    fn test_license_serializes_to_value() {
        let json = serde_json::to_string(&License::CcByNc).unwrap();
        assert_eq!(json, "\"CC BY-NC\"");
    }

    #[test]
    fn test_metadata_equality_ignores_order() {
        let first = ResourceMetadataBuilder::default()
            .name("Model")
            .tags(vec!["a".to_string(), "b".to_string()])
            .authors(vec![Person::new("Jane", "Doe"), Person::new("John", "Roe")])
            .build()
            .unwrap();

        let second = ResourceMetadataBuilder::default()
            .name("Model")
            .tags(vec!["b".to_string(), "a".to_string()])
            .authors(vec![Person::new("John", "Roe"), Person::new("Jane", "Doe")])
            .build()
            .unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_metadata_equality_detects_differences() {
        let first = ResourceMetadataBuilder::default()
            .description("first")
            .build()
            .unwrap();
        let second = ResourceMetadataBuilder::default()
            .description("second")
            .build()
            .unwrap();

        assert_ne!(first, second);
    }
}
