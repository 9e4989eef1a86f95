//! XML statement reader for ISO 20022 `camt.05x` exports.
//!
//! Every element whose local name is the configured entry tag is one
//! transfer. Field paths are relative to that element: `/` steps into child
//! elements by local name, a trailing `@attr` reads an attribute, and `|`
//! separates alternatives tried in order. Namespace prefixes and URIs are
//! ignored, so the same paths serve every camt version a bank emits.

use roxmltree::{Document, Node};

use super::statement::Transfer;
use crate::config::XmlMap;
use crate::error::ImportError;

/// Parse `text` into transfers, in document order.
pub fn parse_xml(
    text: &str,
    fields: &XmlMap,
    default_currency: &str,
) -> Result<Vec<Transfer>, ImportError> {
    let doc = Document::parse(text).map_err(|e| ImportError::Malformed {
        line: e.pos().row as usize,
        message: e.to_string(),
    })?;

    Ok(doc
        .descendants()
        .filter(|node| is_element_named(node, &fields.entry))
        .map(|entry| {
            let value = |path: &str| first_value(entry, path).unwrap_or_default();
            let book_date = value(&fields.book_date);
            Transfer {
                val_date: fields
                    .val_date
                    .as_deref()
                    .and_then(|path| first_value(entry, path))
                    .unwrap_or_else(|| book_date.clone()),
                book_date,
                debitor: value(&fields.debitor),
                creditor: value(&fields.creditor),
                amount: value(&fields.amount),
                currency: fields
                    .currency
                    .as_deref()
                    .and_then(|path| first_value(entry, path))
                    .unwrap_or_else(|| default_currency.to_string()),
                subject: fields
                    .subject
                    .iter()
                    .flat_map(|path| all_values(entry, path))
                    .collect(),
            }
        })
        .collect())
}

fn is_element_named(node: &Node<'_, '_>, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

/// First non-empty value of the first alternative that yields one.
fn first_value(entry: Node<'_, '_>, path: &str) -> Option<String> {
    path.split('|')
        .find_map(|alt| all_values(entry, alt.trim()).into_iter().next())
}

/// Every non-empty value `path` reaches from `entry`.
fn all_values(entry: Node<'_, '_>, path: &str) -> Vec<String> {
    let (elements, attribute) = match path.rsplit_once('@') {
        Some((elements, attribute)) => (elements, Some(attribute)),
        None => (path, None),
    };
    let mut nodes = vec![entry];
    for step in elements.split('/').filter(|s| !s.is_empty()) {
        nodes = nodes
            .iter()
            .flat_map(|node| node.children().filter(|c| is_element_named(c, step)))
            .collect();
    }
    nodes
        .iter()
        .filter_map(|node| match attribute {
            Some(name) => node
                .attributes()
                .find(|a| a.name() == name)
                .map(|a| a.value().trim().to_string()),
            None => Some(element_text(node)),
        })
        .filter(|value| !value.is_empty())
        .collect()
}

/// Concatenated text content, whitespace-trimmed.
fn element_text(node: &Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect::<String>()
        .trim()
        .to_string()
}
