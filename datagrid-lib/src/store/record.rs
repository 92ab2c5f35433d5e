//! Persisted record layout.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::query::ColumnFilter;
use crate::query::Sort;
use crate::state::Pagination;

/// The durable subset of one table's view state.
///
/// Every field is optional: records written by an older version, or by a grid
/// persisting in [`crate::config::PersistMode::Basic`], simply lack fields.
/// The same type doubles as a patch for [`super::ViewStateStore::set`], where
/// `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedViewState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_order: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_visibility: Option<BTreeMap<String, bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_selection: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_state: Option<TableState>,
}

/// Catch-all table state blob.
///
/// Sorting and filters live here; keys this crate does not know about are kept
/// verbatim so other writers of the same record do not lose data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sorting: Option<Vec<Sort>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_filters: Option<Vec<ColumnFilter>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PersistedViewState {
    /// Returns `true` if the patch carries no field.
    pub fn is_empty(&self) -> bool {
        self.column_order.is_none()
            && self.column_visibility.is_none()
            && self.pagination.is_none()
            && self.row_selection.is_none()
            && self.table_state.is_none()
    }

    /// Applies a patch field by field.
    pub fn merge(&mut self, patch: PersistedViewState) {
        if patch.column_order.is_some() {
            self.column_order = patch.column_order;
        }
        if patch.column_visibility.is_some() {
            self.column_visibility = patch.column_visibility;
        }
        if patch.pagination.is_some() {
            self.pagination = patch.pagination;
        }
        if patch.row_selection.is_some() {
            self.row_selection = patch.row_selection;
        }
        if let Some(patch) = patch.table_state {
            self.table_state.get_or_insert_with(TableState::default).merge(patch);
        }
    }
}

impl TableState {
    /// Applies a patch field by field; extra keys are upserted.
    pub fn merge(&mut self, patch: TableState) {
        if patch.sorting.is_some() {
            self.sorting = patch.sorting;
        }
        if patch.column_filters.is_some() {
            self.column_filters = patch.column_filters;
        }
        self.extra.extend(patch.extra);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_keeps_untouched_fields() {
        let mut record = PersistedViewState {
            column_order: Some(vec!["a".into(), "b".into()]),
            pagination: Some(Pagination::new(3, 10)),
            ..Default::default()
        };
        record.merge(PersistedViewState {
            column_visibility: Some(BTreeMap::from([("b".to_string(), false)])),
            ..Default::default()
        });

        assert_eq!(record.column_order, Some(vec!["a".into(), "b".into()]));
        assert_eq!(record.pagination, Some(Pagination::new(3, 10)));
        assert!(record.column_visibility.is_some());
    }

    #[test]
    fn test_table_state_merge_preserves_unknown_keys() {
        let mut record: PersistedViewState = serde_json::from_value(json!({
            "tableState": { "density": "compact", "sorting": [{ "id": "name", "direction": "asc" }] }
        }))
        .unwrap();

        record.merge(PersistedViewState {
            table_state: Some(TableState {
                column_filters: Some(vec![ColumnFilter::new("status", "alive")]),
                ..Default::default()
            }),
            ..Default::default()
        });

        let table_state = record.table_state.unwrap();
        assert_eq!(table_state.sorting, Some(vec![Sort::asc("name")]));
        assert_eq!(table_state.extra.get("density"), Some(&json!("compact")));
        assert_eq!(table_state.column_filters.map(|f| f.len()), Some(1));
    }

    #[test]
    fn test_partial_record_decodes() {
        let record: PersistedViewState =
            serde_json::from_value(json!({ "columnVisibility": { "id": false } })).unwrap();
        assert!(record.column_order.is_none());
        assert_eq!(record.column_visibility.unwrap().get("id"), Some(&false));
    }

    #[test]
    fn test_empty_patch_serializes_to_empty_object() {
        let record = PersistedViewState::default();
        assert!(record.is_empty());
        assert_eq!(serde_json::to_value(&record).unwrap(), json!({}));
    }
}
