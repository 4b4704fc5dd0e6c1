#[cfg(test)]
mod tests {
    use canopus::app::connection_profiles::{
        ConnectionProfile, ProfileStore, SaveMode, StoreError, DEFAULT_GRANT_TYPE,
        DEFAULT_RESOURCE,
    };
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn open_store() -> (TempDir, ProfileStore) {
        let dir = TempDir::new().expect("failed to create temp dir");
        let store =
            ProfileStore::open(&dir.path().join("connections.db")).expect("failed to open store");
        (dir, store)
    }

    fn profile(name: &str) -> ConnectionProfile {
        ConnectionProfile {
            name: name.to_string(),
            cosmos_endpoint: "https://dev.documents.azure.com:443/".to_string(),
            service_url: "https://login.microsoftonline.com/tenant-id".to_string(),
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            resource: DEFAULT_RESOURCE.to_string(),
            grant_type: DEFAULT_GRANT_TYPE.to_string(),
        }
    }

    #[test]
    fn test_save_then_get_roundtrip() {
        let (_dir, store) = open_store();
        let dev = profile("Dev");

        store.save(&dev, SaveMode::Insert).unwrap();
        let loaded = store.get("Dev").unwrap();

        assert_eq!(loaded, Some(dev));
    }

    #[test]
    fn test_get_absent_returns_none() {
        let (_dir, store) = open_store();
        assert_eq!(store.get("Nope").unwrap(), None);
    }

    #[test]
    fn test_save_then_delete_then_get() {
        let (_dir, store) = open_store();
        store.save(&profile("Dev"), SaveMode::Insert).unwrap();

        store.delete("Dev").unwrap();
        assert_eq!(store.get("Dev").unwrap(), None);
    }

    #[test]
    fn test_delete_absent_is_noop() {
        let (_dir, store) = open_store();
        store.delete("Dev").expect("deleting an absent profile must succeed");
    }

    #[test]
    fn test_list_contains_exactly_one_dev() {
        let (_dir, store) = open_store();
        store.save(&profile("Dev"), SaveMode::Insert).unwrap();

        let profiles = store.list().unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].name, "Dev");
    }

    #[test]
    fn test_insert_only_rejects_duplicate_name() {
        let (_dir, store) = open_store();
        store.save(&profile("Dev"), SaveMode::Insert).unwrap();

        let mut changed = profile("Dev");
        changed.client_id = "other-client".to_string();

        match store.save(&changed, SaveMode::Insert) {
            Err(StoreError::DuplicateName(name)) => assert_eq!(name, "Dev"),
            other => panic!("expected DuplicateName, got {:?}", other),
        }

        // The original row is untouched
        let loaded = store.get("Dev").unwrap().unwrap();
        assert_eq!(loaded.client_id, "client-id");
    }

    #[test]
    fn test_upsert_replaces_existing() {
        let (_dir, store) = open_store();
        store.save(&profile("Dev"), SaveMode::Insert).unwrap();

        let mut changed = profile("Dev");
        changed.cosmos_endpoint = "https://other.documents.azure.com:443/".to_string();
        store.save(&changed, SaveMode::Upsert).unwrap();

        let loaded = store.get("Dev").unwrap().unwrap();
        assert_eq!(
            loaded.cosmos_endpoint,
            "https://other.documents.azure.com:443/"
        );
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_upsert_inserts_when_absent() {
        let (_dir, store) = open_store();
        store.save(&profile("Dev"), SaveMode::Upsert).unwrap();
        assert!(store.get("Dev").unwrap().is_some());
    }

    #[test]
    fn test_list_is_ordered_by_name() {
        let (_dir, store) = open_store();
        for name in ["Staging", "Dev", "Prod"] {
            store.save(&profile(name), SaveMode::Insert).unwrap();
        }

        let names: Vec<String> = store.list().unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Dev", "Prod", "Staging"]);
    }

    #[test]
    fn test_profiles_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("connections.db");

        {
            let store = ProfileStore::open(&path).unwrap();
            store.save(&profile("Dev"), SaveMode::Insert).unwrap();
        }

        let store = ProfileStore::open(&path).unwrap();
        assert_eq!(store.get("Dev").unwrap(), Some(profile("Dev")));
    }

    #[test]
    fn test_save_rejects_invalid_profile() {
        let (_dir, store) = open_store();

        let mut bad = profile("Dev");
        bad.cosmos_endpoint = String::new();

        match store.save(&bad, SaveMode::Upsert) {
            Err(StoreError::Validation(_)) => {}
            other => panic!("expected Validation error, got {:?}", other),
        }
        assert_eq!(store.get("Dev").unwrap(), None);
    }
}
