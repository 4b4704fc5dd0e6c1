#[cfg(test)]
mod tests {
    use canopus::app::data_plane::documents::page_filter::{
        display_value, filter_rows, sort_rows, FilterSet, SortDirection,
    };
    use canopus::app::data_plane::documents::{column_names, Document, DocumentPage, PageOptions};
    use serde_json::{json, Value};

    fn docs(values: Vec<Value>) -> Vec<Document> {
        values
            .into_iter()
            .map(|value| match value {
                Value::Object(map) => map,
                _ => panic!("test document must be a JSON object"),
            })
            .collect()
    }

    /// Ten rows, three with status "active".
    fn ten_row_page() -> Vec<Document> {
        docs(vec![
            json!({"id": "00", "status": "active",  "priority": 4}),
            json!({"id": "01", "status": "idle",    "priority": 2}),
            json!({"id": "02", "status": "stopped", "priority": 9}),
            json!({"id": "03", "status": "active",  "priority": 1}),
            json!({"id": "04", "status": "stopped", "priority": 5}),
            json!({"id": "05", "status": "idle",    "priority": 7}),
            json!({"id": "06", "status": "idle",    "priority": 3}),
            json!({"id": "07", "status": "active",  "priority": 8}),
            json!({"id": "08", "status": "stopped", "priority": 6}),
            json!({"id": "09", "status": "pending", "priority": 0}),
        ])
    }

    #[test]
    fn test_status_filter_returns_exact_matches_in_order() {
        let documents = ten_row_page();
        let filters = FilterSet::from_inputs(vec![("status", "=active")]);

        let rows = filter_rows(&documents, &filters);
        assert_eq!(rows, vec![0, 3, 7]);

        let ids: Vec<String> = rows
            .iter()
            .map(|&i| display_value(&documents[i], "id"))
            .collect();
        assert_eq!(ids, vec!["00", "03", "07"]);
    }

    #[test]
    fn test_filter_then_sort_composes() {
        let documents = ten_row_page();
        let filters = FilterSet::from_inputs(vec![("status", "idle")]);

        let mut rows = filter_rows(&documents, &filters);
        sort_rows(&documents, &mut rows, "priority", SortDirection::Ascending);

        let priorities: Vec<String> = rows
            .iter()
            .map(|&i| display_value(&documents[i], "priority"))
            .collect();
        assert_eq!(priorities, vec!["2", "3", "7"]);
    }

    #[test]
    fn test_sort_does_not_drop_or_duplicate_rows() {
        let documents = ten_row_page();
        let mut rows: Vec<usize> = (0..documents.len()).collect();

        sort_rows(&documents, &mut rows, "status", SortDirection::Descending);

        let mut seen = rows.clone();
        seen.sort_unstable();
        let expected: Vec<usize> = (0..documents.len()).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_mixed_shape_documents_filter_on_missing_column() {
        let documents = docs(vec![
            json!({"id": "a", "region": "westus"}),
            json!({"id": "b"}),
            json!({"id": "c", "region": "eastus"}),
        ]);

        // A missing value renders empty, so only exact-empty matches it
        let filters = FilterSet::from_inputs(vec![("region", "=")]);
        assert_eq!(filter_rows(&documents, &filters), vec![1]);

        let filters = FilterSet::from_inputs(vec![("region", "us")]);
        assert_eq!(filter_rows(&documents, &filters), vec![0, 2]);
    }

    #[test]
    fn test_columns_cover_all_shapes() {
        let documents = docs(vec![
            json!({"id": "a", "region": "westus"}),
            json!({"id": "b", "owner": "ops"}),
        ]);
        assert_eq!(column_names(&documents), vec!["id", "region", "owner"]);
    }

    #[test]
    fn test_page_scenario_fifty_of_one_twenty() {
        // First page of a 120-document container, page size 50
        let first_batch = docs((0..50).map(|i| json!({"id": i})).collect());
        let page = DocumentPage::new(first_batch, Some("range-50".to_string()));

        assert!(page.document_count <= 50);
        assert!(page.has_more());

        // The continuation token feeds the next request
        let options = PageOptions::new()
            .with_max_item_count(50)
            .with_continuation(page.continuation.clone().unwrap());
        assert_eq!(options.continuation.as_deref(), Some("range-50"));

        // Last batch comes back without a token: pagination exhausted
        let last_batch = docs((100..120).map(|i| json!({"id": i})).collect());
        let last_page = DocumentPage::new(last_batch, None);
        assert_eq!(last_page.document_count, 20);
        assert!(!last_page.has_more());
    }
}
