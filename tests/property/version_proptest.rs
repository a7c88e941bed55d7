//! Version counter properties
//!
//! For any sequence of accepted writes, versions are stamped 1, 2, 3, ...
//! with no gaps and no repeats, and a read always returns the last
//! accepted body with its stamp.

use proptest::prelude::*;

use choresync::backend::{DocumentStore, MemoryStore};
use choresync::shared::Document;

fn document_strategy() -> impl Strategy<Value = Document> {
    proptest::collection::btree_map("[a-z]{1,8}", any::<i64>(), 0..6).prop_map(|entries| {
        let mut fields = serde_json::Map::new();
        for (key, value) in entries {
            fields.insert(key, serde_json::json!(value));
        }
        Document::with_fields(fields)
    })
}

proptest! {
    #[test]
    fn versions_increase_by_exactly_one(
        documents in proptest::collection::vec(document_strategy(), 1..20)
    ) {
        let store = MemoryStore::new();
        let mut expected = 0u64;
        let mut last_stamped = None;

        for document in documents {
            let stamped = store.write(document.clone()).unwrap();
            expected += 1;
            prop_assert_eq!(stamped.version, expected);
            prop_assert!(stamped.body_eq(&document));
            last_stamped = Some(stamped);
        }

        // A read observes exactly the last accepted write
        let read = store.read().unwrap();
        prop_assert_eq!(Some(read), last_stamped);
    }

    #[test]
    fn candidate_versions_never_leak_into_stamps(
        bogus_version in any::<u64>(),
        document in document_strategy(),
    ) {
        let store = MemoryStore::new();
        let stamped = store.write(document.stamped(bogus_version)).unwrap();
        prop_assert_eq!(stamped.version, 1);
    }
}
