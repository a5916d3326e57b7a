//! Restricted XPath evaluation over the element tree.
//!
//! Model targets in SED-ML are XPath expressions such as
//!
//! ```text
//! /sbml:sbml/sbml:model/sbml:listOfParameters/sbml:parameter[@id='k1']/@value
//! ```
//!
//! Only absolute location paths along the child axis are supported. A step is an
//! element name (optionally prefixed, or `*`) followed by any number of
//! `[@attr='value']` or positional `[n]` predicates. The last step may select an
//! attribute (`@value`).
//!
//! Prefixes are matched literally against element prefixes. An unprefixed element
//! (one in the default namespace) matches a step of any prefix, so `sbml:model`
//! finds `<model>` in a document that declares the SBML namespace as its default.

use std::fmt;
use std::str::FromStr;

use super::dom::{local_part, Element};
use super::error::XPathError;

#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    Attribute { name: String, value: String },
    Position(usize),
}

#[derive(Debug, Clone, PartialEq)]
struct Step {
    name: String,
    predicates: Vec<Predicate>,
}

impl Step {
    fn matches_name(&self, element: &Element) -> bool {
        if self.name == "*" {
            return true;
        }
        if local_part(&self.name) != element.local_name() {
            return false;
        }
        match (self.name.split_once(':'), element.prefix()) {
            (Some((prefix, _)), Some(element_prefix)) => prefix == element_prefix,
            (None, Some(_)) => false,
            _ => true,
        }
    }

    fn matches_attributes(&self, element: &Element) -> bool {
        self.predicates.iter().all(|predicate| match predicate {
            Predicate::Attribute { name, value } => {
                element.attribute(name) == Some(value.as_str())
            }
            Predicate::Position(_) => true,
        })
    }

    fn position(&self) -> Option<usize> {
        self.predicates.iter().find_map(|predicate| match predicate {
            Predicate::Position(position) => Some(*position),
            Predicate::Attribute { .. } => None,
        })
    }

    /// Indices of the children of `parent` selected by this step.
    fn select(&self, parent: &Element) -> Vec<usize> {
        let matching: Vec<usize> = parent
            .elements()
            .enumerate()
            .filter(|(_, child)| self.matches_name(child) && self.matches_attributes(child))
            .map(|(index, _)| index)
            .collect();

        match self.position() {
            Some(position) => matching.get(position - 1).copied().into_iter().collect(),
            None => matching,
        }
    }
}

/// A parsed XPath expression.
#[derive(Debug, Clone, PartialEq)]
pub struct XPath {
    source: String,
    steps: Vec<Step>,
    attribute: Option<String>,
}

impl XPath {
    /// The attribute selected by the final step, if any.
    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_deref()
    }

    /// Elements selected by the path, ignoring a final attribute step.
    pub fn select<'a>(&self, root: &'a Element) -> Vec<&'a Element> {
        self.locate(root)
            .into_iter()
            .filter_map(|path| element_at(root, &path))
            .collect()
    }

    /// Child-index paths from the root to every selected element.
    ///
    /// Indices count child elements only; text and comments are not positions.
    pub fn locate(&self, root: &Element) -> Vec<Vec<usize>> {
        let Some((first, rest)) = self.steps.split_first() else {
            return Vec::new();
        };
        if !(first.matches_name(root) && first.matches_attributes(root)) {
            return Vec::new();
        }
        if first.position().is_some_and(|position| position != 1) {
            return Vec::new();
        }

        let mut current: Vec<Vec<usize>> = vec![Vec::new()];
        for step in rest {
            current = current
                .into_iter()
                .flat_map(|path| {
                    let children = element_at(root, &path)
                        .map(|parent| step.select(parent))
                        .unwrap_or_default();
                    children.into_iter().map(move |index| {
                        let mut child_path = path.clone();
                        child_path.push(index);
                        child_path
                    })
                })
                .collect();
        }
        current
    }
}

fn element_at<'a>(root: &'a Element, path: &[usize]) -> Option<&'a Element> {
    path.iter()
        .try_fold(root, |element, index| element.elements().nth(*index))
}

impl FromStr for XPath {
    type Err = XPathError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        let body = source
            .trim()
            .strip_prefix('/')
            .ok_or_else(|| XPathError::NotAbsolute(source.to_string()))?;

        let mut steps = Vec::new();
        let mut attribute = None;

        for raw_step in split_steps(body, source)? {
            if attribute.is_some() {
                return Err(XPathError::AttributeNotLast(source.to_string()));
            }
            if raw_step.is_empty() {
                return Err(XPathError::EmptyStep(source.to_string()));
            }
            if let Some(name) = raw_step.strip_prefix('@') {
                attribute = Some(name.to_string());
                continue;
            }
            steps.push(parse_step(raw_step, source)?);
        }

        if steps.is_empty() {
            return Err(XPathError::EmptyStep(source.to_string()));
        }

        Ok(XPath {
            source: source.to_string(),
            steps,
            attribute,
        })
    }
}

impl fmt::Display for XPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

/// Splits a path body on `/`, ignoring separators inside predicates.
fn split_steps<'a>(body: &'a str, source: &str) -> Result<Vec<&'a str>, XPathError> {
    let mut steps = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (index, c) in body.char_indices() {
        match (quote, c) {
            (Some(open), c) if c == open => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| XPathError::Unterminated(source.to_string()))?
            }
            (None, '/') if depth == 0 => {
                steps.push(&body[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }

    if depth != 0 || quote.is_some() {
        return Err(XPathError::Unterminated(source.to_string()));
    }
    steps.push(&body[start..]);
    Ok(steps)
}

fn parse_step(raw: &str, source: &str) -> Result<Step, XPathError> {
    let (name, mut rest) = match raw.find('[') {
        Some(index) => (&raw[..index], &raw[index..]),
        None => (raw, ""),
    };
    if name.is_empty() {
        return Err(XPathError::EmptyStep(source.to_string()));
    }

    let mut predicates = Vec::new();
    while !rest.is_empty() {
        let end = closing_bracket(rest).ok_or_else(|| XPathError::Unterminated(source.to_string()))?;
        predicates.push(parse_predicate(&rest[1..end], source)?);
        rest = &rest[end + 1..];
    }

    Ok(Step {
        name: name.trim().to_string(),
        predicates,
    })
}

fn closing_bracket(predicate: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (index, c) in predicate.char_indices().skip(1) {
        match (quote, c) {
            (Some(open), c) if c == open => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, ']') => return Some(index),
            _ => {}
        }
    }
    None
}

fn parse_predicate(predicate: &str, source: &str) -> Result<Predicate, XPathError> {
    let invalid = || XPathError::InvalidPredicate {
        path: source.to_string(),
        predicate: predicate.to_string(),
    };
    let predicate = predicate.trim();

    if let Ok(position) = predicate.parse::<usize>() {
        return if position == 0 { Err(invalid()) } else { Ok(Predicate::Position(position)) };
    }

    let (name, value) = predicate
        .strip_prefix('@')
        .and_then(|rest| rest.split_once('='))
        .ok_or_else(invalid)?;
    let value = value.trim();
    let unquoted = value
        .strip_prefix('\'')
        .and_then(|value| value.strip_suffix('\''))
        .or_else(|| value.strip_prefix('"').and_then(|value| value.strip_suffix('"')))
        .ok_or_else(invalid)?;

    Ok(Predicate::Attribute {
        name: name.trim().to_string(),
        value: unquoted.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::dom::parse;

    const SBML: &str = r#"<sbml xmlns="http://www.sbml.org/sbml/level3/version1/core">
        <model id="m">
            <listOfParameters>
                <parameter id="k1" value="1"/>
                <parameter id="k2" value="2"/>
            </listOfParameters>
        </model>
    </sbml>"#;

    #[test]
    fn test_parse_attribute_target() {
        let path: XPath = "/sbml:sbml/sbml:model/sbml:listOfParameters/sbml:parameter[@id='k1']/@value"
            .parse()
            .unwrap();
        assert_eq!(path.attribute(), Some("value"));
    }

    #[test]
    fn test_select_with_default_namespace() {
        let root = parse(SBML).unwrap();
        let path: XPath = "/sbml:sbml/sbml:model/sbml:listOfParameters/sbml:parameter[@id='k2']"
            .parse()
            .unwrap();

        let selected = path.select(&root);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].attribute("value"), Some("2"));
    }

    #[test]
    fn test_select_by_position_and_wildcard() {
        let root = parse(SBML).unwrap();
        let path: XPath = "/sbml/model/listOfParameters/*[2]".parse().unwrap();

        let selected = path.select(&root);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].attribute("id"), Some("k2"));
    }

    #[test]
    fn test_locate_returns_child_index_paths() {
        let root = parse(SBML).unwrap();
        let path: XPath = "/sbml:sbml/sbml:model/sbml:listOfParameters/sbml:parameter".parse().unwrap();

        assert_eq!(path.locate(&root), vec![vec![0, 0, 0], vec![0, 0, 1]]);
        assert!("/sbml/other".parse::<XPath>().unwrap().locate(&root).is_empty());
    }

    #[test]
    fn test_predicate_values_may_contain_slashes() {
        let path: XPath = "/a/b[@href='x/y']".parse().unwrap();
        let root = parse(r#"<a><b href="x/y"/><b href="z"/></a>"#).unwrap();
        assert_eq!(path.select(&root).len(), 1);
    }

    #[test]
    fn test_rejects_unsupported_paths() {
        assert!(matches!("a/b".parse::<XPath>(), Err(XPathError::NotAbsolute(_))));
        assert!(matches!("/a//b".parse::<XPath>(), Err(XPathError::EmptyStep(_))));
        assert!(matches!("/a/b[@id='x'".parse::<XPath>(), Err(XPathError::Unterminated(_))));
        assert!(matches!("/a/@id/b".parse::<XPath>(), Err(XPathError::AttributeNotLast(_))));
        assert!(matches!(
            "/a/b[text()='x']".parse::<XPath>(),
            Err(XPathError::InvalidPredicate { .. })
        ));
    }
}
