//! Column reordering from drag-drop intents.

use std::collections::HashSet;

use serde::Deserialize;
use serde::Serialize;

use crate::column::Columns;
use crate::error::ValidationError;

/// A completed drag gesture, as reported by the input collaborator.
///
/// Either id may be absent (the drop landed outside any column).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderIntent {
    /// Column that was dragged.
    pub active_column_id: Option<String>,
    /// Column it was dropped on.
    pub over_column_id: Option<String>,
}

impl ReorderIntent {
    /// Creates an intent moving `active` onto `over`.
    pub fn new(active: impl Into<String>, over: impl Into<String>) -> Self {
        Self {
            active_column_id: Some(active.into()),
            over_column_id: Some(over.into()),
        }
    }
}

/// Computes column orders from reorder intents.
///
/// A move takes the source column out and reinserts it at the target's
/// current index. Columns that are not reorderable can neither be moved nor
/// pushed aside: a move that would change the index of any of them is
/// rejected as a whole.
#[derive(Debug, Clone)]
pub struct ReorderEngine {
    fixed: HashSet<String>,
}

impl ReorderEngine {
    /// Creates an engine for the given columns.
    pub fn new(columns: &Columns) -> Self {
        Self {
            fixed: columns
                .iter()
                .filter(|c| !c.reorderable)
                .map(|c| c.id.clone())
                .collect(),
        }
    }

    /// Returns `true` if the column may be dragged.
    pub fn is_reorderable(&self, id: &str) -> bool {
        !self.fixed.contains(id)
    }

    /// Computes the order after applying `intent` to `current`.
    ///
    /// Every error means "leave the order alone".
    pub fn reorder(&self, intent: &ReorderIntent, current: &[String]) -> Result<Vec<String>, ValidationError> {
        let (Some(source), Some(target)) = (&intent.active_column_id, &intent.over_column_id) else {
            return Err(ValidationError::MissingColumnId);
        };
        if source == target {
            return Err(ValidationError::SameColumn(source.clone()));
        }

        let from = position(current, source)?;
        let to = position(current, target)?;
        if !self.is_reorderable(source) {
            return Err(ValidationError::NotReorderable(source.clone()));
        }

        let mut next = current.to_vec();
        let moved = next.remove(from);
        next.insert(to, moved);

        if let Some(displaced) = current
            .iter()
            .zip(&next)
            .find(|(before, after)| before != after && self.fixed.contains(before.as_str()))
        {
            return Err(ValidationError::WouldDisplaceFixedColumn(displaced.0.clone()));
        }

        Ok(next)
    }
}

fn position(order: &[String], id: &str) -> Result<usize, ValidationError> {
    order
        .iter()
        .position(|c| c == id)
        .ok_or_else(|| ValidationError::UnknownColumn(id.to_string()))
}
