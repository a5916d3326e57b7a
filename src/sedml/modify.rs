//! Applying model parameter changes to XML model files.
//!
//! SED-ML changes address model attributes by XPath. Before a model is handed to a
//! simulator, the changes of a simulation can be baked into a copy of the model
//! file with [`modify_xml_model_for_simulation`].

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use quick_xml::escape::escape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::{Reader, Writer};
use thiserror::Error;

use crate::simulation::data_model::Simulation;
use crate::xml::dom;
use crate::xml::error::{XPathError, XmlError};
use crate::xml::xpath::XPath;

/// Errors raised while applying changes to a model file
#[derive(Debug, Error)]
pub enum ModelChangeError {
    /// The target does not end in an attribute step
    #[error("Target {0} must select an attribute")]
    NotAnAttribute(String),

    /// The target matches no element or more than one element
    #[error("Target {target} must match exactly one element, but matched {count}")]
    AmbiguousTarget { target: String, count: usize },

    /// The target is not a supported XPath expression
    #[error(transparent)]
    XPath(#[from] XPathError),

    /// The model file is not well-formed XML
    #[error(transparent)]
    Xml(#[from] XmlError),

    /// The model file cannot be read or written
    #[error("Failed to access model file: {0}")]
    Io(#[from] io::Error),
}

/// Applies the model parameter changes of a simulation to an XML model file.
///
/// # Arguments
///
/// * `simulation` - The simulation whose model parameter changes are applied
/// * `in_path` - The model file to modify
/// * `out_path` - Where to save the modified model. May equal `in_path`.
///
/// # Errors
///
/// Returns a `ModelChangeError` if a target is not an XPath to an attribute of
/// exactly one element, or the file cannot be read, parsed or written. Nothing is
/// written in that case.
pub fn modify_xml_model_for_simulation(
    simulation: &Simulation,
    in_path: impl AsRef<Path>,
    out_path: impl AsRef<Path>,
) -> Result<(), ModelChangeError> {
    let xml = fs::read_to_string(in_path)?;
    let modified = modify_xml_model(simulation, &xml)?;
    fs::write(out_path, modified)?;
    Ok(())
}

/// Applies the model parameter changes of a simulation to an XML model.
///
/// The document is copied event by event. Only the changed attributes differ from
/// the input; comments, processing instructions and whitespace are kept.
///
/// # Returns
///
/// The modified model document.
pub fn modify_xml_model(simulation: &Simulation, xml: &str) -> Result<String, ModelChangeError> {
    let root = dom::parse(xml)?;
    let mut edits: HashMap<Vec<usize>, Vec<(String, String)>> = HashMap::new();

    for change in &simulation.model_parameter_changes {
        let target = &change.parameter.target;
        let path: XPath = target.parse()?;
        let attribute = path
            .attribute()
            .ok_or_else(|| ModelChangeError::NotAnAttribute(target.clone()))?
            .to_string();

        let mut located = path.locate(&root);
        if located.len() != 1 {
            return Err(ModelChangeError::AmbiguousTarget {
                target: target.clone(),
                count: located.len(),
            });
        }

        let value = change.value.to_string();
        log::debug!("Set {target} to {value}");
        edits
            .entry(located.remove(0))
            .or_default()
            .push((attribute, value));
    }

    Ok(rewrite_attributes(xml, &edits)?)
}

/// Copies a document, setting attributes on the elements at the given child-index paths.
fn rewrite_attributes(
    xml: &str,
    edits: &HashMap<Vec<usize>, Vec<(String, String)>>,
) -> Result<String, XmlError> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());
    // path of the innermost open element and the child elements seen per open element
    let mut path: Vec<usize> = Vec::new();
    let mut seen: Vec<usize> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let element_path = next_path(&path, &mut seen);
                let start = match edits.get(&element_path) {
                    Some(attributes) => set_attributes(&start, attributes)?,
                    None => start,
                };
                writer.write_event(Event::Start(start))?;
                path = element_path;
                seen.push(0);
            }
            Event::Empty(start) => {
                let element_path = next_path(&path, &mut seen);
                let start = match edits.get(&element_path) {
                    Some(attributes) => set_attributes(&start, attributes)?,
                    None => start,
                };
                writer.write_event(Event::Empty(start))?;
            }
            Event::End(end) => {
                path.pop();
                seen.pop();
                writer.write_event(Event::End(end))?;
            }
            Event::Eof => break,
            event => writer.write_event(event)?,
        }
    }

    Ok(String::from_utf8(writer.into_inner())?)
}

fn next_path(parent: &[usize], seen: &mut [usize]) -> Vec<usize> {
    match seen.last_mut() {
        Some(count) => {
            let mut path = parent.to_vec();
            path.push(*count);
            *count += 1;
            path
        }
        None => Vec::new(),
    }
}

fn set_attributes(
    start: &BytesStart,
    edits: &[(String, String)],
) -> Result<BytesStart<'static>, XmlError> {
    let mut attributes: Vec<(Vec<u8>, Vec<u8>)> = start
        .attributes()
        .map(|attribute| {
            attribute.map(|attribute| (attribute.key.as_ref().to_vec(), attribute.value.into_owned()))
        })
        .collect::<Result<_, _>>()?;

    for (name, value) in edits {
        let value = escape(value.as_str()).into_owned().into_bytes();
        match attributes
            .iter_mut()
            .find(|(key, _)| key.as_slice() == name.as_bytes())
        {
            Some((_, existing)) => *existing = value,
            None => attributes.push((name.as_bytes().to_vec(), value)),
        }
    }

    let mut rewritten = BytesStart::new(std::str::from_utf8(start.name().as_ref())?.to_string());
    for (key, value) in &attributes {
        rewritten.push_attribute(Attribute {
            key: QName(key),
            value: Cow::Borrowed(value.as_slice()),
        });
    }
    Ok(rewritten)
}
