//! Deduplicating merge of canonical documents
//!
//! Local records always win: an incoming record is appended only when its id
//! is not already present locally. Records without an id never collide, so
//! they are always kept.

use crate::model::{Document, Identified};
use std::collections::HashSet;

/// Append the items of `incoming` whose id is not in `local`
///
/// Local order is preserved, followed by the surviving incoming items in
/// their original order. Only ids from `local` are checked.
pub fn merge_by_id<T: Identified>(local: Vec<T>, incoming: Vec<T>) -> Vec<T> {
    let existing: HashSet<String> = local
        .iter()
        .filter_map(|item| item.identity().map(str::to_string))
        .collect();

    let mut merged = local;
    merged.extend(incoming.into_iter().filter(|item| match item.identity() {
        Some(id) => !existing.contains(id),
        None => true,
    }));
    merged
}

/// Merge `incoming` into `local`, collection by collection
///
/// Top-level fields other than the three collections come from `local`.
pub fn merge_documents(local: Document, incoming: Document) -> Document {
    Document {
        version: local.version,
        history: merge_by_id(local.history, incoming.history),
        folders: merge_by_id(local.folders, incoming.folders),
        prompts: merge_by_id(local.prompts, incoming.prompts),
        extra: local.extra,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Conversation, Folder, FolderKind, Prompt};
    use serde_json::json;
    use std::collections::BTreeSet;

    fn conversations(ids: &[&str]) -> Vec<Conversation> {
        ids.iter().map(|id| Conversation::with_id(*id)).collect()
    }

    fn doc(history: &[&str], folders: &[&str], prompts: &[&str]) -> Document {
        Document::new(
            conversations(history),
            folders
                .iter()
                .map(|id| Folder::new(*id, format!("folder {}", id), FolderKind::Chat))
                .collect(),
            prompts.iter().map(|id| Prompt::with_id(*id)).collect(),
        )
    }

    fn ids<T: Identified>(items: &[T]) -> Vec<String> {
        items
            .iter()
            .filter_map(|item| item.identity().map(str::to_string))
            .collect()
    }

    fn id_set<T: Identified>(items: &[T]) -> BTreeSet<String> {
        ids(items).into_iter().collect()
    }

    fn assert_unique<T: Identified>(items: &[T]) {
        let all = ids(items);
        let unique: BTreeSet<_> = all.iter().collect();
        assert_eq!(all.len(), unique.len(), "duplicate ids in {:?}", all);
    }

    fn samples() -> Vec<Document> {
        vec![
            Document::empty(),
            doc(&["a"], &[], &[]),
            doc(&["a", "b"], &["f1"], &["p1"]),
            doc(&["c", "b"], &["f2", "f1"], &["p2"]),
            doc(&["x", "y", "z"], &[], &["p1", "p3"]),
        ]
    }

    #[test]
    fn test_incoming_duplicate_dropped() {
        let local = doc(&["a"], &[], &[]);
        let incoming = doc(&["a", "b"], &[], &[]);

        let merged = merge_documents(local, incoming);
        assert_eq!(ids(&merged.history), vec!["a", "b"]);
    }

    #[test]
    fn test_local_copy_wins() {
        let mut local = conversations(&["a"]);
        local[0].0.insert("name".to_string(), json!("local"));
        let mut incoming = conversations(&["a"]);
        incoming[0].0.insert("name".to_string(), json!("incoming"));

        let merged = merge_by_id(local, incoming);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name(), Some("local"));
    }

    #[test]
    fn test_order_local_first() {
        let merged = merge_by_id(conversations(&["b", "a"]), conversations(&["d", "a", "c"]));
        assert_eq!(ids(&merged), vec!["b", "a", "d", "c"]);
    }

    #[test]
    fn test_id_less_records_are_kept() {
        let local = vec![Prompt::default()];
        let incoming = vec![Prompt::default(), Prompt::with_id("p1")];

        let merged = merge_by_id(local, incoming);
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_extra_fields_from_local() {
        let mut local = Document::empty();
        local.extra.insert("theme".to_string(), json!("dark"));
        let mut incoming = Document::empty();
        incoming.extra.insert("theme".to_string(), json!("light"));
        incoming.extra.insert("other".to_string(), json!(1));

        let merged = merge_documents(local, incoming);
        assert_eq!(merged.extra.get("theme"), Some(&json!("dark")));
        assert!(merged.extra.get("other").is_none());
        assert_eq!(merged.version, 4);
    }

    #[test]
    fn test_membership_commutative() {
        for a in samples() {
            for b in samples() {
                let ab = merge_documents(a.clone(), b.clone());
                let ba = merge_documents(b.clone(), a.clone());
                assert_eq!(id_set(&ab.history), id_set(&ba.history));
                assert_eq!(id_set(&ab.folders), id_set(&ba.folders));
                assert_eq!(id_set(&ab.prompts), id_set(&ba.prompts));
            }
        }
    }

    #[test]
    fn test_merge_with_self_is_identity() {
        for a in samples() {
            let merged = merge_documents(a.clone(), a.clone());
            assert_eq!(merged, a);
        }
    }

    #[test]
    fn test_repeats_within_incoming_are_kept() {
        // only local ids are deduplicated against
        let merged = merge_by_id(Vec::new(), conversations(&["a", "a"]));
        assert_eq!(ids(&merged), vec!["a", "a"]);

        let merged = merge_by_id(conversations(&["a"]), conversations(&["b", "a", "b"]));
        assert_eq!(ids(&merged), vec!["a", "b", "b"]);
    }

    /// Holds for inputs whose collections are each free of repeated ids
    #[test]
    fn test_no_duplicates_and_nothing_lost() {
        for a in samples() {
            for b in samples() {
                let merged = merge_documents(a.clone(), b.clone());
                assert_unique(&merged.history);
                assert_unique(&merged.folders);
                assert_unique(&merged.prompts);

                let expected: BTreeSet<String> =
                    id_set(&a.history).union(&id_set(&b.history)).cloned().collect();
                assert_eq!(id_set(&merged.history), expected);
            }
        }
    }
}
