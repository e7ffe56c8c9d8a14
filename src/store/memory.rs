use crate::error::Result;
use crate::store::{Document, DocumentId, DocumentStore, Fields, Filter};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// In-memory document store backed by DashMap
///
/// Documents are tagged with an insertion sequence number so listings come
/// back in insertion order.
#[derive(Clone, Default)]
pub struct MemoryStore {
    documents: Arc<DashMap<DocumentId, (u64, Fields)>>,
    sequence: Arc<AtomicU64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn sorted(&self) -> Vec<(u64, Document)> {
        let mut docs: Vec<(u64, Document)> = self
            .documents
            .iter()
            .map(|entry| {
                let (seq, fields) = entry.value();
                (
                    *seq,
                    Document {
                        id: *entry.key(),
                        fields: fields.clone(),
                    },
                )
            })
            .collect();
        docs.sort_by_key(|(seq, _)| *seq);
        docs
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_all(&self) -> Result<Vec<Document>> {
        Ok(self.sorted().into_iter().map(|(_, doc)| doc).collect())
    }

    async fn find_by_id(&self, id: &DocumentId) -> Result<Option<Document>> {
        Ok(self.documents.get(id).map(|entry| Document {
            id: *id,
            fields: entry.value().1.clone(),
        }))
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<Document>> {
        Ok(self
            .sorted()
            .into_iter()
            .map(|(_, doc)| doc)
            .find(|doc| filter.matches(&doc.id, &doc.fields)))
    }

    async fn insert_one(&self, fields: Fields) -> Result<DocumentId> {
        let id = DocumentId::generate();
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        self.documents.insert(id, (seq, fields));
        Ok(id)
    }

    async fn replace_by_id(&self, id: &DocumentId, fields: Fields) -> Result<bool> {
        match self.documents.get_mut(id) {
            Some(mut entry) => {
                entry.value_mut().1 = fields;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_by_id(&self, id: &DocumentId) -> Result<bool> {
        Ok(self.documents.remove(id).is_some())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FieldValue;

    fn fields(pairs: &[(&str, &str)]) -> Fields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), FieldValue::from(*v)))
            .collect()
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = MemoryStore::new();
        let id = store.insert_one(fields(&[("name", "Ann")])).await.unwrap();

        let doc = store.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(doc.id, id);
        assert_eq!(doc.fields["name"], FieldValue::from("Ann"));
        assert!(store
            .find_by_id(&DocumentId::generate())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_find_all_keeps_insertion_order() {
        let store = MemoryStore::new();
        let mut ids = Vec::new();
        for name in ["a", "b", "c", "d"] {
            ids.push(store.insert_one(fields(&[("name", name)])).await.unwrap());
        }
        store.delete_by_id(&ids[1]).await.unwrap();

        let listed: Vec<DocumentId> = store
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(listed, vec![ids[0], ids[2], ids[3]]);
    }

    #[tokio::test]
    async fn test_replace_reports_missing() {
        let store = MemoryStore::new();
        let id = store
            .insert_one(fields(&[("name", "Ann"), ("city", "Oslo")]))
            .await
            .unwrap();

        assert!(store.replace_by_id(&id, fields(&[("name", "Bo")])).await.unwrap());
        let doc = store.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(doc.fields, fields(&[("name", "Bo")]));

        assert!(!store
            .replace_by_id(&DocumentId::generate(), Fields::new())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_find_one_with_exclusion() {
        let store = MemoryStore::new();
        let id = store
            .insert_one(fields(&[("email", "a@x.com")]))
            .await
            .unwrap();

        let found = store
            .find_one(&Filter::eq("email", "a@x.com"))
            .await
            .unwrap();
        assert_eq!(found.map(|d| d.id), Some(id));

        let excluded = store
            .find_one(&Filter::eq("email", "a@x.com").excluding(id))
            .await
            .unwrap();
        assert!(excluded.is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::new();
        let id = store.insert_one(Fields::new()).await.unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.delete_by_id(&id).await.unwrap());
        assert!(!store.delete_by_id(&id).await.unwrap());
        assert!(store.is_empty());
    }
}
