//! Per-column filtering and sorting for a fetched document page.
//!
//! Both operate only on the page already in memory; they never rerun the
//! remote query or page backward into earlier results.

#![warn(clippy::all, rust_2018_idioms)]

use std::cmp::Ordering;

use serde_json::Value;

use super::types::Document;

/// Predicate applied to one column's rendered cell text.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnPredicate {
    /// Case-insensitive substring match
    Contains(String),
    /// Case-insensitive exact match (filter text prefixed with `=`)
    Equals(String),
}

impl ColumnPredicate {
    /// Parse raw filter-row input. Empty or whitespace-only input means the
    /// column is unconstrained.
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }
        if let Some(rest) = trimmed.strip_prefix('=') {
            Some(ColumnPredicate::Equals(rest.trim().to_lowercase()))
        } else {
            Some(ColumnPredicate::Contains(trimmed.to_lowercase()))
        }
    }

    pub fn matches(&self, cell: &str) -> bool {
        let cell = cell.to_lowercase();
        match self {
            ColumnPredicate::Contains(needle) => cell.contains(needle),
            ColumnPredicate::Equals(expected) => cell.trim() == expected,
        }
    }
}

/// The set of column predicates currently applied to a page.
///
/// A row survives only if every predicate matches (logical AND); columns
/// without a predicate are unconstrained.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    predicates: Vec<(String, ColumnPredicate)>,
}

impl FilterSet {
    /// Build a filter set from (column, raw input) pairs, skipping inputs
    /// that parse to no predicate.
    pub fn from_inputs<'a>(inputs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let predicates = inputs
            .into_iter()
            .filter_map(|(column, input)| {
                ColumnPredicate::parse(input).map(|p| (column.to_string(), p))
            })
            .collect();
        Self { predicates }
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn matches(&self, document: &Document) -> bool {
        self.predicates
            .iter()
            .all(|(column, predicate)| predicate.matches(&display_value(document, column)))
    }
}

/// Sort direction for one column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Render a document cell for display and filtering.
///
/// Null and missing values render empty; strings render as-is; everything
/// else renders as compact JSON.
pub fn display_value(document: &Document, column: &str) -> String {
    match document.get(column) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Indices of the rows that survive the filter set, in page order.
pub fn filter_rows(documents: &[Document], filters: &FilterSet) -> Vec<usize> {
    documents
        .iter()
        .enumerate()
        .filter(|(_, document)| filters.matches(document))
        .map(|(index, _)| index)
        .collect()
}

enum SortKey {
    Number(f64),
    Text(String),
    Null,
}

/// Sort row indices by one column.
///
/// The comparison is numeric when the column's first non-null occurrence in
/// the visible rows is a JSON number, case-insensitive string comparison
/// otherwise. The sort is stable, so rows with equal keys keep their page
/// order. Rows with null or missing keys order last in either direction.
pub fn sort_rows(
    documents: &[Document],
    rows: &mut [usize],
    column: &str,
    direction: SortDirection,
) {
    let numeric = rows
        .iter()
        .filter_map(|&row| documents[row].get(column))
        .find(|value| !value.is_null())
        .map(|value| value.is_number())
        .unwrap_or(false);

    let keys: Vec<SortKey> = documents
        .iter()
        .map(|document| match document.get(column) {
            None | Some(Value::Null) => SortKey::Null,
            Some(value) if numeric => value
                .as_f64()
                .map(SortKey::Number)
                .unwrap_or_else(|| SortKey::Text(display_value_raw(value).to_lowercase())),
            Some(value) => SortKey::Text(display_value_raw(value).to_lowercase()),
        })
        .collect();

    rows.sort_by(|&a, &b| {
        let ordering = match (&keys[a], &keys[b]) {
            (SortKey::Null, SortKey::Null) => Ordering::Equal,
            // Nulls always order last, regardless of direction
            (SortKey::Null, _) => return Ordering::Greater,
            (_, SortKey::Null) => return Ordering::Less,
            (SortKey::Number(x), SortKey::Number(y)) => {
                x.partial_cmp(y).unwrap_or(Ordering::Equal)
            }
            (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
            (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
            (SortKey::Text(x), SortKey::Text(y)) => x.cmp(y),
        };
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

fn display_value_raw(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn docs(values: Vec<Value>) -> Vec<Document> {
        values
            .into_iter()
            .map(|value| match value {
                Value::Object(map) => map,
                _ => panic!("test document must be a JSON object"),
            })
            .collect()
    }

    fn status_page() -> Vec<Document> {
        docs(vec![
            json!({"id": "a", "status": "active",   "count": 3}),
            json!({"id": "b", "status": "idle",     "count": 1}),
            json!({"id": "c", "status": "active",   "count": 2}),
            json!({"id": "d", "status": "retired",  "count": 10}),
            json!({"id": "e", "status": "active",   "count": 2}),
        ])
    }

    #[test]
    fn test_predicate_parse() {
        assert_eq!(ColumnPredicate::parse("   "), None);
        assert_eq!(
            ColumnPredicate::parse("Act"),
            Some(ColumnPredicate::Contains("act".to_string()))
        );
        assert_eq!(
            ColumnPredicate::parse("= Active "),
            Some(ColumnPredicate::Equals("active".to_string()))
        );
    }

    #[test]
    fn test_substring_filter_preserves_order() {
        let documents = status_page();
        let filters = FilterSet::from_inputs(vec![("status", "active")]);

        let rows = filter_rows(&documents, &filters);
        assert_eq!(rows, vec![0, 2, 4]);
    }

    #[test]
    fn test_filters_and_across_columns() {
        let documents = status_page();
        let filters = FilterSet::from_inputs(vec![("status", "active"), ("count", "2")]);

        let rows = filter_rows(&documents, &filters);
        assert_eq!(rows, vec![2, 4]);
    }

    #[test]
    fn test_equality_filter_is_exact() {
        let documents = status_page();
        // "active" is a substring of nothing else, but "=act" must match nothing
        let filters = FilterSet::from_inputs(vec![("status", "=act")]);
        assert!(filter_rows(&documents, &filters).is_empty());

        let filters = FilterSet::from_inputs(vec![("status", "=ACTIVE")]);
        assert_eq!(filter_rows(&documents, &filters), vec![0, 2, 4]);
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let documents = status_page();
        let filters = FilterSet::from_inputs(vec![("status", "active")]);

        let once = filter_rows(&documents, &filters);
        let survivors: Vec<Document> = once.iter().map(|&i| documents[i].clone()).collect();
        let twice = filter_rows(&survivors, &filters);

        assert_eq!(twice.len(), once.len());
        assert_eq!(twice, vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let documents = status_page();
        let filters = FilterSet::from_inputs(vec![("status", ""), ("id", "  ")]);

        assert!(filters.is_empty());
        assert_eq!(filter_rows(&documents, &filters).len(), documents.len());
    }

    #[test]
    fn test_numeric_sort_uses_number_order() {
        let documents = status_page();
        let mut rows: Vec<usize> = (0..documents.len()).collect();

        sort_rows(&documents, &mut rows, "count", SortDirection::Ascending);
        // 1, 2, 2, 3, 10; lexicographic order would put 10 before 2
        assert_eq!(rows, vec![1, 2, 4, 0, 3]);
    }

    #[test]
    fn test_sort_is_stable_on_equal_keys() {
        let documents = status_page();
        let mut rows: Vec<usize> = (0..documents.len()).collect();

        sort_rows(&documents, &mut rows, "status", SortDirection::Ascending);
        // The three "active" rows keep their page order
        assert_eq!(rows, vec![0, 2, 4, 1, 3]);
    }

    #[test]
    fn test_opposite_directions_reverse_distinct_values() {
        let documents = docs(vec![
            json!({"n": 5}),
            json!({"n": 1}),
            json!({"n": 9}),
            json!({"n": 3}),
        ]);

        let mut ascending: Vec<usize> = (0..documents.len()).collect();
        sort_rows(&documents, &mut ascending, "n", SortDirection::Ascending);

        let mut descending: Vec<usize> = (0..documents.len()).collect();
        sort_rows(&documents, &mut descending, "n", SortDirection::Descending);

        let mut reversed = ascending.clone();
        reversed.reverse();
        assert_eq!(descending, reversed);
    }

    #[test]
    fn test_nulls_sort_last_in_both_directions() {
        let documents = docs(vec![
            json!({"n": 2}),
            json!({"n": null}),
            json!({"other": true}),
            json!({"n": 1}),
        ]);

        let mut rows: Vec<usize> = (0..documents.len()).collect();
        sort_rows(&documents, &mut rows, "n", SortDirection::Ascending);
        assert_eq!(rows, vec![3, 0, 1, 2]);

        let mut rows: Vec<usize> = (0..documents.len()).collect();
        sort_rows(&documents, &mut rows, "n", SortDirection::Descending);
        assert_eq!(rows, vec![0, 3, 1, 2]);
    }

    #[test]
    fn test_display_value_rendering() {
        let documents = docs(vec![json!({
            "name": "widget",
            "count": 7,
            "live": true,
            "gone": null,
            "tags": ["a", "b"],
        })]);

        assert_eq!(display_value(&documents[0], "name"), "widget");
        assert_eq!(display_value(&documents[0], "count"), "7");
        assert_eq!(display_value(&documents[0], "live"), "true");
        assert_eq!(display_value(&documents[0], "gone"), "");
        assert_eq!(display_value(&documents[0], "missing"), "");
        assert_eq!(display_value(&documents[0], "tags"), r#"["a","b"]"#);
    }
}
