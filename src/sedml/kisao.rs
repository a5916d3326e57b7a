//! KiSAO term identifiers.
//!
//! SED-ML identifies algorithms and algorithm parameters by KiSAO ids. Documents in
//! the wild spell them `KISAO:0000019`, `KISAO_0000019` or just `0000019`; all three
//! are accepted on read and the term is stored as ontology `KISAO` with the bare
//! seven digit id. Ids are always written as `KISAO:NNNNNNN`.

use lazy_static::lazy_static;
use regex::Regex;

use crate::data_model::OntologyTerm;
use crate::simulation::error::SimulationIoError;

/// Name of the KiSAO ontology.
pub const KISAO: &str = "KISAO";

lazy_static! {
    static ref KISAO_ID: Regex = Regex::new(r"^(?:KISAO[:_])?(\d{7})$").expect("valid regex");
}

/// Parses a KiSAO id in any of the accepted spellings.
///
/// # Arguments
///
/// * `id` - The id as found in a document
///
/// # Returns
///
/// The KiSAO term with its bare numeric id.
///
/// # Errors
///
/// Returns `SimulationIoError::InvalidKisaoId` if the id is not a seven digit KiSAO id.
pub fn parse_kisao_id(id: &str) -> Result<OntologyTerm, SimulationIoError> {
    let captures = KISAO_ID
        .captures(id.trim())
        .ok_or_else(|| SimulationIoError::InvalidKisaoId(id.to_string()))?;
    Ok(OntologyTerm::new(KISAO, &captures[1]))
}

/// Formats a term as a SED-ML `kisaoID` attribute value.
///
/// # Errors
///
/// Returns `SimulationIoError::NonKisaoTerm` if the term belongs to another ontology
/// and `SimulationIoError::InvalidKisaoId` if its id is malformed.
pub fn format_kisao_id(term: &OntologyTerm) -> Result<String, SimulationIoError> {
    if let Some(ontology) = &term.ontology {
        if !ontology.eq_ignore_ascii_case(KISAO) {
            return Err(SimulationIoError::NonKisaoTerm(ontology.clone()));
        }
    }
    let term = parse_kisao_id(&term.id)?;
    Ok(format!("{KISAO}:{}", term.id))
}
