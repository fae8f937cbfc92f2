//! Namespaced byte-level key-value storage.
//!
//! [`KvStore`] is the lowest storage tier. Every key lives in a namespace
//! (`gate:identities`, `gate:audit:records`, ...), and the gate record store
//! builds its collections and secondary indexes out of namespaces.
//!
//! - [`MemoryKvStore`]: always available, used by tests and ephemeral gates
//! - [`SurrealKvStore`] (behind the `kv` feature): persistent, ACID, embedded
//!
//! [`ScopedKvStore`] pre-binds a namespace and adds JSON helpers.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::error::{StorageError, StorageResult};

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Namespaces are non-empty and free of `\0` (the namespace/key separator).
pub(crate) fn validate_namespace(namespace: &str) -> StorageResult<()> {
    if namespace.is_empty() {
        return Err(StorageError::InvalidKey(
            "namespace must not be empty".into(),
        ));
    }
    if namespace.contains('\0') {
        return Err(StorageError::InvalidKey(
            "namespace must not contain null bytes".into(),
        ));
    }
    Ok(())
}

/// Keys are non-empty and free of `\0`.
pub(crate) fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("key must not be empty".into()));
    }
    if key.contains('\0') {
        return Err(StorageError::InvalidKey(
            "key must not contain null bytes".into(),
        ));
    }
    Ok(())
}

/// `"{namespace}\0{key}"`.
fn composite_key(namespace: &str, key: &str) -> String {
    format!("{namespace}\0{key}")
}

/// `"{namespace}\0"`, the prefix shared by every key in the namespace.
fn namespace_prefix(namespace: &str) -> String {
    format!("{namespace}\0")
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Namespaced byte store.
///
/// Implementations must be safe to share across concurrent scans.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Get a value. `None` if the key does not exist.
    async fn get(&self, namespace: &str, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Set a value, overwriting any existing one.
    async fn set(&self, namespace: &str, key: &str, value: Vec<u8>) -> StorageResult<()>;

    /// Set a value only if the key is absent.
    ///
    /// Returns `true` if the value was written, `false` if the key already existed.
    /// The check and the write are a single atomic step.
    async fn insert_new(&self, namespace: &str, key: &str, value: Vec<u8>)
    -> StorageResult<bool>;

    /// Delete a key. Returns `true` if it existed.
    async fn delete(&self, namespace: &str, key: &str) -> StorageResult<bool>;

    /// List all keys in a namespace, in no particular order.
    async fn list_keys(&self, namespace: &str) -> StorageResult<Vec<String>>;

    /// List up to `limit` keys `k` of a namespace with `start <= k < end`,
    /// highest first. Empty when `start >= end`.
    async fn list_keys_desc(
        &self,
        namespace: &str,
        start: &str,
        end: &str,
        limit: usize,
    ) -> StorageResult<Vec<String>>;
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

/// In-memory key-value store.
///
/// Keys are stored as `"{namespace}\0{key}"` in a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    data: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryKvStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries across all namespaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.read().map(|d| d.len()).unwrap_or(0)
    }

    /// Whether the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(e: &std::sync::PoisonError<T>) -> StorageError {
    StorageError::Internal(e.to_string())
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, namespace: &str, key: &str) -> StorageResult<Option<Vec<u8>>> {
        validate_namespace(namespace)?;
        validate_key(key)?;
        let data = self.data.read().map_err(|ref e| poisoned(e))?;
        Ok(data.get(&composite_key(namespace, key)).cloned())
    }

    async fn set(&self, namespace: &str, key: &str, value: Vec<u8>) -> StorageResult<()> {
        validate_namespace(namespace)?;
        validate_key(key)?;
        let mut data = self.data.write().map_err(|ref e| poisoned(e))?;
        data.insert(composite_key(namespace, key), value);
        Ok(())
    }

    async fn insert_new(
        &self,
        namespace: &str,
        key: &str,
        value: Vec<u8>,
    ) -> StorageResult<bool> {
        validate_namespace(namespace)?;
        validate_key(key)?;
        let mut data = self.data.write().map_err(|ref e| poisoned(e))?;
        match data.entry(composite_key(namespace, key)) {
            std::collections::hash_map::Entry::Occupied(_) => Ok(false),
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(value);
                Ok(true)
            },
        }
    }

    async fn delete(&self, namespace: &str, key: &str) -> StorageResult<bool> {
        validate_namespace(namespace)?;
        validate_key(key)?;
        let mut data = self.data.write().map_err(|ref e| poisoned(e))?;
        Ok(data.remove(&composite_key(namespace, key)).is_some())
    }

    async fn list_keys(&self, namespace: &str) -> StorageResult<Vec<String>> {
        validate_namespace(namespace)?;
        let data = self.data.read().map_err(|ref e| poisoned(e))?;
        let prefix = namespace_prefix(namespace);
        Ok(data
            .keys()
            .filter_map(|k| k.strip_prefix(&prefix).map(String::from))
            .collect())
    }

    async fn list_keys_desc(
        &self,
        namespace: &str,
        start: &str,
        end: &str,
        limit: usize,
    ) -> StorageResult<Vec<String>> {
        validate_namespace(namespace)?;
        if start >= end || limit == 0 {
            return Ok(Vec::new());
        }
        let data = self.data.read().map_err(|ref e| poisoned(e))?;
        let prefix = namespace_prefix(namespace);
        let mut keys: Vec<String> = data
            .keys()
            .filter_map(|k| k.strip_prefix(&prefix))
            .filter(|k| start <= *k && *k < end)
            .map(String::from)
            .collect();
        keys.sort_unstable_by(|a, b| b.cmp(a));
        keys.truncate(limit);
        Ok(keys)
    }
}

// ---------------------------------------------------------------------------
// SurrealKV implementation (behind `kv` feature)
// ---------------------------------------------------------------------------

/// Persistent key-value store backed by `SurrealKV`.
///
/// Every operation runs in its own transaction.
///
/// ```rust,ignore
/// use gatehouse_storage::SurrealKvStore;
///
/// let store = SurrealKvStore::open("/var/lib/gatehouse/kv")?;
/// ```
#[cfg(feature = "kv")]
pub struct SurrealKvStore {
    tree: surrealkv::Tree,
}

#[cfg(feature = "kv")]
impl fmt::Debug for SurrealKvStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurrealKvStore").finish_non_exhaustive()
    }
}

#[cfg(feature = "kv")]
impl SurrealKvStore {
    /// Open (or create) a store in the given directory.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connection`] if the store cannot be opened.
    pub fn open(path: impl AsRef<std::path::Path>) -> StorageResult<Self> {
        let tree = surrealkv::TreeBuilder::new()
            .with_path(path.as_ref().to_path_buf())
            .build()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(Self { tree })
    }

    /// Flush pending writes and close the store.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the flush fails.
    pub async fn close(&self) -> StorageResult<()> {
        self.tree
            .close()
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))
    }
}

#[cfg(feature = "kv")]
fn map_kv_err(e: &surrealkv::Error) -> StorageError {
    StorageError::Internal(e.to_string())
}

#[cfg(feature = "kv")]
#[async_trait]
impl KvStore for SurrealKvStore {
    async fn get(&self, namespace: &str, key: &str) -> StorageResult<Option<Vec<u8>>> {
        validate_namespace(namespace)?;
        validate_key(key)?;
        let ck = composite_key(namespace, key).into_bytes();
        let tx = self
            .tree
            .begin_with_mode(surrealkv::Mode::ReadOnly)
            .map_err(|ref e| map_kv_err(e))?;
        tx.get(&ck).map_err(|ref e| map_kv_err(e))
    }

    async fn set(&self, namespace: &str, key: &str, value: Vec<u8>) -> StorageResult<()> {
        validate_namespace(namespace)?;
        validate_key(key)?;
        let ck = composite_key(namespace, key).into_bytes();
        let mut tx = self.tree.begin().map_err(|ref e| map_kv_err(e))?;
        tx.set(&ck, &value)
            .map_err(|ref e| map_kv_err(e))?;
        tx.commit().await.map_err(|ref e| map_kv_err(e))
    }

    async fn insert_new(
        &self,
        namespace: &str,
        key: &str,
        value: Vec<u8>,
    ) -> StorageResult<bool> {
        validate_namespace(namespace)?;
        validate_key(key)?;
        let ck = composite_key(namespace, key).into_bytes();
        let mut tx = self.tree.begin().map_err(|ref e| map_kv_err(e))?;
        if tx
            .get(&ck)
            .map_err(|ref e| map_kv_err(e))?
            .is_some()
        {
            return Ok(false);
        }
        tx.set(&ck, &value)
            .map_err(|ref e| map_kv_err(e))?;
        // Optimistic concurrency: a racing writer makes this commit fail.
        tx.commit().await.map_err(|ref e| map_kv_err(e))?;
        Ok(true)
    }

    async fn delete(&self, namespace: &str, key: &str) -> StorageResult<bool> {
        validate_namespace(namespace)?;
        validate_key(key)?;
        let ck = composite_key(namespace, key).into_bytes();
        let mut tx = self.tree.begin().map_err(|ref e| map_kv_err(e))?;
        let existed = tx
            .get(&ck)
            .map_err(|ref e| map_kv_err(e))?
            .is_some();
        if existed {
            tx.delete(&ck).map_err(|ref e| map_kv_err(e))?;
            tx.commit().await.map_err(|ref e| map_kv_err(e))?;
        }
        Ok(existed)
    }

    async fn list_keys(&self, namespace: &str) -> StorageResult<Vec<String>> {
        validate_namespace(namespace)?;
        let start = namespace_prefix(namespace).into_bytes();
        // `\x01` sorts right after the `\0` separator, so this range covers
        // exactly the keys of this namespace.
        let mut end = namespace.as_bytes().to_vec();
        end.push(1);
        let prefix_len = start.len();

        let tx = self
            .tree
            .begin_with_mode(surrealkv::Mode::ReadOnly)
            .map_err(|ref e| map_kv_err(e))?;
        let mut iter = tx.range(&start, &end).map_err(|ref e| map_kv_err(e))?;
        iter.seek_first().map_err(|ref e| map_kv_err(e))?;

        let mut keys = Vec::new();
        while iter.valid() {
            if let Some(key) = strip_prefix(&iter.key(), prefix_len) {
                keys.push(key);
            }
            iter.next().map_err(|ref e| map_kv_err(e))?;
        }
        Ok(keys)
    }

    async fn list_keys_desc(
        &self,
        namespace: &str,
        start: &str,
        end: &str,
        limit: usize,
    ) -> StorageResult<Vec<String>> {
        validate_namespace(namespace)?;
        if start >= end || limit == 0 {
            return Ok(Vec::new());
        }
        let prefix_len = namespace_prefix(namespace).len();
        let from = composite_key(namespace, start).into_bytes();
        let to = composite_key(namespace, end).into_bytes();

        let tx = self
            .tree
            .begin_with_mode(surrealkv::Mode::ReadOnly)
            .map_err(|ref e| map_kv_err(e))?;
        let mut iter = tx.range(&from, &to).map_err(|ref e| map_kv_err(e))?;
        iter.seek_last().map_err(|ref e| map_kv_err(e))?;

        let mut keys = Vec::new();
        while iter.valid() && keys.len() < limit {
            if let Some(key) = strip_prefix(&iter.key(), prefix_len) {
                keys.push(key);
            }
            iter.prev().map_err(|ref e| map_kv_err(e))?;
        }
        Ok(keys)
    }
}

/// The namespace-relative part of a raw composite key.
#[cfg(feature = "kv")]
fn strip_prefix(raw_key: &[u8], prefix_len: usize) -> Option<String> {
    let key = raw_key.get(prefix_len..).filter(|k| !k.is_empty())?;
    std::str::from_utf8(key).ok().map(String::from)
}

// ---------------------------------------------------------------------------
// Scoped store
// ---------------------------------------------------------------------------

/// A [`KvStore`] view with a pre-bound namespace.
///
/// The gate record store holds one of these per collection.
#[derive(Clone)]
pub struct ScopedKvStore {
    inner: Arc<dyn KvStore>,
    namespace: String,
}

impl fmt::Debug for ScopedKvStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedKvStore")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl ScopedKvStore {
    /// Bind `namespace` on `store`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidKey`] if the namespace is empty or contains null bytes.
    pub fn new(store: Arc<dyn KvStore>, namespace: impl Into<String>) -> StorageResult<Self> {
        let namespace = namespace.into();
        validate_namespace(&namespace)?;
        Ok(Self {
            inner: store,
            namespace,
        })
    }

    /// The bound namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Get raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidKey`] for an invalid key, or a backend error.
    pub async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        self.inner.get(&self.namespace, key).await
    }

    /// Set raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidKey`] for an invalid key, or a backend error.
    pub async fn set(&self, key: &str, value: Vec<u8>) -> StorageResult<()> {
        self.inner.set(&self.namespace, key, value).await
    }

    /// Set raw bytes only if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidKey`] for an invalid key, or a backend error.
    pub async fn insert_new(&self, key: &str, value: Vec<u8>) -> StorageResult<bool> {
        self.inner.insert_new(&self.namespace, key, value).await
    }

    /// Delete a key. Returns `true` if it existed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidKey`] for an invalid key, or a backend error.
    pub async fn delete(&self, key: &str) -> StorageResult<bool> {
        self.inner.delete(&self.namespace, key).await
    }

    /// List all keys in the namespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    pub async fn list_keys(&self) -> StorageResult<Vec<String>> {
        self.inner.list_keys(&self.namespace).await
    }

    /// List up to `limit` keys in `[start, end)`, highest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    pub async fn list_keys_desc(
        &self,
        start: &str,
        end: &str,
        limit: usize,
    ) -> StorageResult<Vec<String>> {
        self.inner
            .list_keys_desc(&self.namespace, start, end, limit)
            .await
    }

    /// Deserialize a JSON value. `None` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Serialization`] if the stored bytes are not the expected JSON.
    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        key: &str,
    ) -> StorageResult<Option<T>> {
        self.get(key)
            .await?
            .map(|b| {
                serde_json::from_slice(&b).map_err(|e| StorageError::Serialization(e.to_string()))
            })
            .transpose()
    }

    /// Serialize a value as JSON and store it.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Serialization`] if serialization fails.
    pub async fn set_json<T: serde::Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> StorageResult<()> {
        self.set(key, to_json(value)?).await
    }

    /// Serialize a value as JSON and store it only if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Serialization`] if serialization fails.
    pub async fn insert_json<T: serde::Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> StorageResult<bool> {
        self.insert_new(key, to_json(value)?).await
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> StorageResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| StorageError::Serialization(e.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_set_get_overwrite() {
        let store = MemoryKvStore::new();
        assert!(store.get("gate:identities", "1").await.unwrap().is_none());
        store
            .set("gate:identities", "1", b"v1".to_vec())
            .await
            .unwrap();
        store
            .set("gate:identities", "1", b"v2".to_vec())
            .await
            .unwrap();
        assert_eq!(
            store.get("gate:identities", "1").await.unwrap(),
            Some(b"v2".to_vec())
        );
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_memory_insert_new_only_once() {
        let store = MemoryKvStore::new();
        assert!(
            store
                .insert_new("gate:credentials", "card", b"1".to_vec())
                .await
                .unwrap()
        );
        assert!(
            !store
                .insert_new("gate:credentials", "card", b"2".to_vec())
                .await
                .unwrap()
        );
        assert_eq!(
            store.get("gate:credentials", "card").await.unwrap(),
            Some(b"1".to_vec())
        );
    }

    #[tokio::test]
    async fn test_memory_delete() {
        let store = MemoryKvStore::new();
        store.set("ns", "k", b"v".to_vec()).await.unwrap();
        assert!(store.delete("ns", "k").await.unwrap());
        assert!(!store.delete("ns", "k").await.unwrap());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_memory_namespaces_do_not_overlap() {
        let store = MemoryKvStore::new();
        store.set("gate:audit", "a", b"1".to_vec()).await.unwrap();
        store.set("gate:audit:tenant:1", "b", b"2".to_vec()).await.unwrap();
        assert_eq!(store.list_keys("gate:audit").await.unwrap(), vec!["a"]);
        assert_eq!(
            store.list_keys("gate:audit:tenant:1").await.unwrap(),
            vec!["b"]
        );
    }

    #[tokio::test]
    async fn test_memory_rejects_invalid_keys() {
        let store = MemoryKvStore::new();
        assert!(matches!(
            store.get("ns", "").await,
            Err(StorageError::InvalidKey(_))
        ));
        assert!(store.set("ns", "a\0b", vec![]).await.is_err());
        assert!(store.list_keys("").await.is_err());
    }

    #[test]
    fn test_validation() {
        assert!(validate_namespace("").is_err());
        assert!(validate_namespace("ns\0bad").is_err());
        assert!(validate_key("").is_err());
        assert!(validate_key("k\0bad").is_err());
        assert!(validate_key("STU:0001").is_ok());
    }

    #[tokio::test]
    async fn test_scoped_json() {
        #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
        struct Entry {
            name: String,
            active: bool,
        }

        let store: Arc<dyn KvStore> = Arc::new(MemoryKvStore::new());
        let scoped = ScopedKvStore::new(Arc::clone(&store), "gate:test").unwrap();
        let entry = Entry {
            name: "Ada".into(),
            active: true,
        };
        scoped.set_json("1", &entry).await.unwrap();
        assert_eq!(scoped.get_json::<Entry>("1").await.unwrap(), Some(entry));
        assert!(scoped.get_json::<Entry>("2").await.unwrap().is_none());
        assert!(!scoped.insert_json("1", &"dup").await.unwrap());

        scoped.set("bad", b"not json".to_vec()).await.unwrap();
        assert!(matches!(
            scoped.get_json::<Entry>("bad").await,
            Err(StorageError::Serialization(_))
        ));
    }

    /// Keys `00`..`09` in `gate:audit:tenant:1`, plus one key in a sibling namespace.
    async fn seed_range(store: &dyn KvStore) {
        for i in 0..10 {
            store
                .set("gate:audit:tenant:1", &format!("{i:02}"), b"x".to_vec())
                .await
                .unwrap();
        }
        store
            .set("gate:audit:tenant:10", "05", b"x".to_vec())
            .await
            .unwrap();
    }

    async fn check_range(store: &dyn KvStore) {
        let ns = "gate:audit:tenant:1";
        assert_eq!(
            store.list_keys_desc(ns, "03", "07", 100).await.unwrap(),
            vec!["06", "05", "04", "03"]
        );
        assert_eq!(
            store.list_keys_desc(ns, "03", "07", 2).await.unwrap(),
            vec!["06", "05"]
        );
        assert_eq!(
            store.list_keys_desc(ns, "", "\u{7f}", usize::MAX).await.unwrap().len(),
            10
        );
        assert!(store.list_keys_desc(ns, "07", "03", 5).await.unwrap().is_empty());
        assert!(store.list_keys_desc(ns, "03", "07", 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_memory_list_keys_desc() {
        let store = MemoryKvStore::new();
        seed_range(&store).await;
        check_range(&store).await;
    }

    #[test]
    fn test_scoped_rejects_empty_namespace() {
        let store = Arc::new(MemoryKvStore::new());
        assert!(ScopedKvStore::new(store, "").is_err());
    }

    #[cfg(feature = "kv")]
    mod surreal_kv_tests {
        use super::*;

        fn make_store() -> (SurrealKvStore, tempfile::TempDir) {
            let dir = tempfile::tempdir().unwrap();
            let store = SurrealKvStore::open(dir.path()).unwrap();
            (store, dir)
        }

        #[tokio::test]
        async fn test_surreal_set_get_delete() {
            let (store, _dir) = make_store();
            store.set("ns", "k", b"v".to_vec()).await.unwrap();
            assert_eq!(store.get("ns", "k").await.unwrap(), Some(b"v".to_vec()));
            assert!(store.delete("ns", "k").await.unwrap());
            assert!(store.get("ns", "k").await.unwrap().is_none());
        }

        #[tokio::test]
        async fn test_surreal_insert_new() {
            let (store, _dir) = make_store();
            assert!(store.insert_new("ns", "k", b"1".to_vec()).await.unwrap());
            assert!(!store.insert_new("ns", "k", b"2".to_vec()).await.unwrap());
            assert_eq!(store.get("ns", "k").await.unwrap(), Some(b"1".to_vec()));
        }

        #[tokio::test]
        async fn test_surreal_list_keys_by_namespace() {
            let (store, _dir) = make_store();
            store.set("gate:audit", "a", b"1".to_vec()).await.unwrap();
            store.set("gate:audit", "b", b"2".to_vec()).await.unwrap();
            store
                .set("gate:audit:tenant:1", "c", b"3".to_vec())
                .await
                .unwrap();
            let mut keys = store.list_keys("gate:audit").await.unwrap();
            keys.sort();
            assert_eq!(keys, vec!["a", "b"]);
        }

        #[tokio::test]
        async fn test_surreal_list_keys_desc() {
            let (store, _dir) = make_store();
            seed_range(&store).await;
            check_range(&store).await;
        }
    }
}
