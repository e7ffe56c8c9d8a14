use crate::error::{Error, Result};
use crate::store::{Document, DocumentId, DocumentStore, Fields, Filter};
use async_trait::async_trait;
use deadpool_redis::{Config, Pool, PoolConfig, Runtime};
use redis::{AsyncCommands, RedisResult, Script};
use std::future::Future;
use std::time::Duration;

// HSET only when the field already exists, in one round trip
const REPLACE_IF_EXISTS: &str = r#"
if redis.call('HEXISTS', KEYS[1], ARGV[1]) == 1 then
    redis.call('HSET', KEYS[1], ARGV[1], ARGV[2])
    return 1
end
return 0
"#;

/// Redis-backed document store with connection pooling
///
/// All documents live in a single hash, `<prefix>documents`, keyed by
/// document id. Values are JSON objects holding the document fields.
#[derive(Clone)]
pub struct RedisStore {
    pool: Pool,
    hash_key: String,
    command_timeout: Duration,
    replace_script: Script,
}

impl RedisStore {
    pub async fn from_url(
        redis_url: &str,
        prefix: &str,
        pool_size: usize,
        command_timeout: Duration,
    ) -> Result<Self> {
        let mut cfg = Config::from_url(redis_url);
        cfg.pool = Some(PoolConfig {
            max_size: pool_size,
            ..Default::default()
        });

        let pool = cfg.create_pool(Some(Runtime::Tokio1))?;

        let store = Self {
            pool,
            hash_key: format!("{}documents", prefix),
            command_timeout,
            replace_script: Script::new(REPLACE_IF_EXISTS),
        };

        // Fail fast when the server is unreachable
        let mut conn = store.pool.get().await?;
        store
            .run("PING", redis::cmd("PING").query_async::<String>(&mut conn))
            .await?;

        Ok(store)
    }

    async fn run<T, F>(&self, op: &str, fut: F) -> Result<T>
    where
        F: Future<Output = RedisResult<T>>,
    {
        tokio::time::timeout(self.command_timeout, fut)
            .await
            .map_err(|_| Error::store(format!("Redis {} operation timed out", op)))?
            .map_err(|e| Error::store(format!("Redis {} failed: {}", op, e)))
    }

    fn decode(id: &str, raw: String) -> Result<Document> {
        let id = id
            .parse::<DocumentId>()
            .map_err(|e| Error::store(format!("Corrupt document id '{}': {}", id, e)))?;

        let mut bytes = raw.into_bytes();
        let fields: Fields = simd_json::from_slice(&mut bytes)
            .map_err(|e| Error::store(format!("Corrupt document {}: {}", id, e)))?;

        Ok(Document { id, fields })
    }

    fn encode(fields: &Fields) -> Result<String> {
        serde_json::to_string(fields)
            .map_err(|e| Error::store(format!("Failed to serialize document: {}", e)))
    }
}

#[async_trait]
impl DocumentStore for RedisStore {
    async fn find_all(&self) -> Result<Vec<Document>> {
        let mut conn = self.pool.get().await?;
        let entries: Vec<(String, String)> = self
            .run("HGETALL", conn.hgetall(&self.hash_key))
            .await?;

        entries
            .into_iter()
            .map(|(id, raw)| Self::decode(&id, raw))
            .collect()
    }

    async fn find_by_id(&self, id: &DocumentId) -> Result<Option<Document>> {
        let mut conn = self.pool.get().await?;
        let key = id.to_string();
        let raw: Option<String> = self.run("HGET", conn.hget(&self.hash_key, &key)).await?;

        raw.map(|raw| Self::decode(&key, raw)).transpose()
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<Document>> {
        // No secondary indexes: scan the collection
        Ok(self
            .find_all()
            .await?
            .into_iter()
            .find(|doc| filter.matches(&doc.id, &doc.fields)))
    }

    async fn insert_one(&self, fields: Fields) -> Result<DocumentId> {
        let mut conn = self.pool.get().await?;
        let id = DocumentId::generate();
        let json = Self::encode(&fields)?;

        let created: bool = self
            .run(
                "HSETNX",
                conn.hset_nx(&self.hash_key, id.to_string(), json),
            )
            .await?;

        if !created {
            return Err(Error::store(format!("Document id {} already in use", id)));
        }
        Ok(id)
    }

    async fn replace_by_id(&self, id: &DocumentId, fields: Fields) -> Result<bool> {
        let mut conn = self.pool.get().await?;
        let json = Self::encode(&fields)?;

        let replaced: i64 = self
            .run(
                "EVALSHA",
                self.replace_script
                    .key(&self.hash_key)
                    .arg(id.to_string())
                    .arg(json)
                    .invoke_async(&mut conn),
            )
            .await?;

        Ok(replaced == 1)
    }

    async fn delete_by_id(&self, id: &DocumentId) -> Result<bool> {
        let mut conn = self.pool.get().await?;
        let removed: i64 = self
            .run("HDEL", conn.hdel(&self.hash_key, id.to_string()))
            .await?;

        Ok(removed > 0)
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FieldValue;

    #[test]
    fn test_decode_document() {
        let id = DocumentId::generate();
        let doc = RedisStore::decode(
            &id.to_string(),
            r#"{"name":"Ann","age":31,"active":true,"note":null}"#.to_string(),
        )
        .unwrap();

        assert_eq!(doc.id, id);
        assert_eq!(doc.fields["name"], FieldValue::from("Ann"));
        assert_eq!(doc.fields["age"], FieldValue::from(31));
        assert_eq!(doc.fields["active"], FieldValue::Bool(true));
        assert_eq!(doc.fields["note"], FieldValue::Null);
    }

    #[test]
    fn test_decode_rejects_corrupt_entries() {
        let err = RedisStore::decode("not-a-uuid", "{}".to_string()).unwrap_err();
        assert!(matches!(err, Error::Store(_)));

        let id = DocumentId::generate().to_string();
        let err = RedisStore::decode(&id, "{truncated".to_string()).unwrap_err();
        assert!(err.to_string().starts_with("Corrupt document"));
    }

    #[test]
    fn test_encode_keeps_field_order() {
        let mut fields = Fields::new();
        fields.insert("name".into(), "Ann".into());
        fields.insert("email".into(), "a@x.com".into());
        assert_eq!(
            RedisStore::encode(&fields).unwrap(),
            r#"{"name":"Ann","email":"a@x.com"}"#
        );
    }

    // The tests below need a live server: REDIS_URL=redis://127.0.0.1:6379/
    // Without it they return early.
    async fn live_store() -> Option<RedisStore> {
        let url = std::env::var("REDIS_URL").ok()?;
        let prefix = format!("userboard-test:{}:", DocumentId::generate());
        Some(
            RedisStore::from_url(&url, &prefix, 2, Duration::from_secs(3))
                .await
                .unwrap(),
        )
    }

    async fn drop_collection(store: &RedisStore) {
        let mut conn = store.pool.get().await.unwrap();
        let _: i64 = conn.del(&store.hash_key).await.unwrap();
    }

    fn user(name: &str, email: &str) -> Fields {
        let mut fields = Fields::new();
        fields.insert("name".into(), name.into());
        fields.insert("email".into(), email.into());
        fields
    }

    #[tokio::test]
    async fn test_live_insert_and_find() {
        let Some(store) = live_store().await else {
            return;
        };

        let first = store.insert_one(user("Ann", "ann@x.com")).await.unwrap();
        let second = store.insert_one(user("Ben", "ben@x.com")).await.unwrap();
        assert_ne!(first, second);

        let doc = store.find_by_id(&first).await.unwrap().unwrap();
        assert_eq!(doc.fields, user("Ann", "ann@x.com"));
        assert_eq!(store.find_all().await.unwrap().len(), 2);

        let found = store
            .find_one(&Filter::eq("email", "ben@x.com"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, second);
        assert!(store
            .find_one(&Filter::eq("email", "ben@x.com").excluding(second))
            .await
            .unwrap()
            .is_none());

        drop_collection(&store).await;
    }

    #[tokio::test]
    async fn test_live_replace_hit_and_miss() {
        let Some(store) = live_store().await else {
            return;
        };

        let id = store.insert_one(user("Cat", "cat@x.com")).await.unwrap();
        assert!(store
            .replace_by_id(&id, user("Cath", "cath@x.com"))
            .await
            .unwrap());
        let doc = store.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(doc.fields["name"], FieldValue::from("Cath"));

        // A miss must not create the document
        let unknown = DocumentId::generate();
        assert!(!store
            .replace_by_id(&unknown, user("Ghost", "g@x.com"))
            .await
            .unwrap());
        assert!(store.find_by_id(&unknown).await.unwrap().is_none());

        drop_collection(&store).await;
    }

    #[tokio::test]
    async fn test_live_delete() {
        let Some(store) = live_store().await else {
            return;
        };

        let id = store.insert_one(user("Dan", "dan@x.com")).await.unwrap();
        assert!(store.delete_by_id(&id).await.unwrap());
        assert!(!store.delete_by_id(&id).await.unwrap());
        assert!(store.find_by_id(&id).await.unwrap().is_none());

        drop_collection(&store).await;
    }
}
