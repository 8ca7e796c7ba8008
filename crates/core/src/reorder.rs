//! Validation of drag-and-drop reorder requests.
//!
//! A request targets exactly one sibling collection and carries a list of
//! `{id, ordem}` pairs:
//!
//! ```text
//! { "sections": { "itens": [ { "id": "<uuid>", "ordem": 0 }, ... ] } }
//! { "lessons":  { "itens": [ ... ] } }
//! ```
//!
//! The Portuguese keys `secoes` and `aulas` are accepted as aliases. Every
//! entry is checked before anything is written; one malformed entry rejects
//! the whole request.

use serde_json::Value;

use crate::error::CoreError;
use crate::types::DbId;

const SECTION_KEYS: [&str; 2] = ["sections", "secoes"];
const LESSON_KEYS: [&str; 2] = ["lessons", "aulas"];

/// Which sibling collection a reorder batch applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderCollection {
    Sections,
    Lessons,
}

impl ReorderCollection {
    /// Entity name used in logs and not-found errors.
    pub fn entity_name(self) -> &'static str {
        match self {
            ReorderCollection::Sections => "Section",
            ReorderCollection::Lessons => "Lesson",
        }
    }
}

/// One position update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReorderItem {
    pub id: DbId,
    pub ordem: i32,
}

/// A validated batch of position updates for a single collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderBatch {
    pub collection: ReorderCollection,
    pub items: Vec<ReorderItem>,
}

/// Validate a raw JSON reorder request into a [`ReorderBatch`].
pub fn parse_reorder_request(body: &Value) -> Result<ReorderBatch, CoreError> {
    let obj = body
        .as_object()
        .ok_or_else(|| invalid("request body must be a JSON object"))?;

    let sections = find_key(obj, &SECTION_KEYS);
    let lessons = find_key(obj, &LESSON_KEYS);

    let (collection, group) = match (sections, lessons) {
        (Some(group), None) => (ReorderCollection::Sections, group),
        (None, Some(group)) => (ReorderCollection::Lessons, group),
        (Some(_), Some(_)) => {
            return Err(invalid(
                "sections and lessons cannot be reordered in the same request",
            ))
        }
        (None, None) => return Err(invalid("request must contain either sections or lessons")),
    };

    let entries = group
        .get("itens")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid("itens must be an array"))?;

    let items = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| parse_item(index, entry))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ReorderBatch { collection, items })
}

fn find_key<'a>(obj: &'a serde_json::Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| obj.get(*k))
}

fn parse_item(index: usize, entry: &Value) -> Result<ReorderItem, CoreError> {
    let id = entry
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid(&format!("itens[{index}].id must be a string")))?;
    let id = id
        .parse::<DbId>()
        .map_err(|_| invalid(&format!("itens[{index}].id is not a valid id")))?;

    let ordem = entry
        .get("ordem")
        .and_then(Value::as_i64)
        .ok_or_else(|| invalid(&format!("itens[{index}].ordem must be an integer")))?;
    let ordem = i32::try_from(ordem)
        .map_err(|_| invalid(&format!("itens[{index}].ordem is out of range")))?;

    Ok(ReorderItem { id, ordem })
}

fn invalid(msg: &str) -> CoreError {
    CoreError::Validation(msg.to_string())
}
