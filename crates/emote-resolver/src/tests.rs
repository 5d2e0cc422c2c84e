use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use emote_store::{CacheStore, MemoryStore, StoreError};
use twitch_client::{Emote, EmoteImages, EmoteUpstream, TokenSource, TwitchError};

use super::*;

#[derive(Default)]
struct StubTokens {
    calls: AtomicUsize,
    fail: bool,
}

#[async_trait]
impl TokenSource for StubTokens {
    async fn access_token(&self) -> Result<String, TwitchError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail {
            return Err(TwitchError::AuthFailed {
                status: 401,
                message: "Unauthorized".into(),
            });
        }
        Ok(format!("token-{n}"))
    }
}

#[derive(Default)]
struct StubUpstream {
    ids: HashMap<String, String>,
    emotes: HashMap<String, Vec<Emote>>,
    list_status: Option<u16>,
    token: Mutex<String>,
    resolve_calls: AtomicUsize,
    list_calls: AtomicUsize,
}

impl StubUpstream {
    fn with_user(mut self, login: &str, id: &str) -> Self {
        self.ids.insert(login.into(), id.into());
        self
    }

    fn with_emotes(mut self, id: &str, emotes: Vec<Emote>) -> Self {
        self.emotes.insert(id.into(), emotes);
        self
    }

    fn resolve_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }

    fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn token(&self) -> String {
        self.token.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmoteUpstream for StubUpstream {
    fn update_access_token(&self, token: &str) {
        *self.token.lock().unwrap() = token.to_string();
    }

    async fn resolve_broadcaster_id(&self, login: &str) -> Result<String, TwitchError> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        self.ids
            .get(login)
            .cloned()
            .ok_or_else(|| TwitchError::NotFound(format!("User not found: {login}")))
    }

    async fn list_emotes(&self, broadcaster_id: &str) -> Result<Vec<Emote>, TwitchError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.list_status {
            return Err(TwitchError::ApiError {
                status,
                message: "Internal Server Error".into(),
            });
        }
        Ok(self.emotes.get(broadcaster_id).cloned().unwrap_or_default())
    }
}

fn emote(id: &str, name: &str, urls: [&str; 3]) -> Emote {
    Emote {
        id: id.into(),
        name: name.into(),
        images: EmoteImages {
            url_1x: urls[0].into(),
            url_2x: urls[1].into(),
            url_4x: urls[2].into(),
        },
    }
}

fn pogchamp() -> Emote {
    emote("1", "PogChamp", ["a", "b", "c"])
}

fn sizes(urls: [&str; 3]) -> std::collections::BTreeMap<String, String> {
    [("url_1x", urls[0]), ("url_2x", urls[1]), ("url_4x", urls[2])]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

struct Harness {
    store: Arc<MemoryStore>,
    tokens: Arc<StubTokens>,
    upstream: Arc<StubUpstream>,
    resolver: EmoteResolver,
}

fn harness(upstream: StubUpstream) -> Harness {
    harness_with_tokens(upstream, StubTokens::default())
}

fn harness_with_tokens(upstream: StubUpstream, tokens: StubTokens) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let tokens = Arc::new(tokens);
    let upstream = Arc::new(upstream);
    let resolver = EmoteResolver::new(store.clone(), tokens.clone(), upstream.clone());
    Harness {
        store,
        tokens,
        upstream,
        resolver,
    }
}

#[tokio::test(start_paused = true)]
async fn test_cached_user_fetches_emotes_and_caches_with_ttl() {
    let h = harness(StubUpstream::default().with_emotes("123", vec![pogchamp()]));
    h.store.set("user:shroud", "123").await.unwrap();

    let emotes = h.resolver.resolve("shroud").await.unwrap();

    let mut expected = EmoteMap::new();
    expected.insert(
        "PogChamp".into(),
        EmoteEntry {
            id: "1".into(),
            sizes: sizes(["a", "b", "c"]),
        },
    );
    assert_eq!(emotes, expected);
    assert_eq!(h.upstream.resolve_calls(), 0);
    assert_eq!(h.upstream.list_calls(), 1);
    assert_eq!(h.store.ttl("emotes:123"), Some(Duration::from_secs(3600)));

    let stored = h.store.get("emotes:123").await.unwrap().unwrap();
    let decoded: EmoteMap = serde_json::from_str(&stored).unwrap();
    assert_eq!(decoded, expected);
}

#[tokio::test]
async fn test_username_is_case_insensitive() {
    let h = harness(
        StubUpstream::default()
            .with_user("shroud", "123")
            .with_emotes("123", vec![pogchamp()]),
    );

    let mixed = h.resolver.resolve("ShRoUd").await.unwrap();
    let lower = h.resolver.resolve("shroud").await.unwrap();

    assert_eq!(mixed, lower);
    assert_eq!(
        h.store.get("user:shroud").await.unwrap().as_deref(),
        Some("123")
    );
    assert!(!h.store.contains("user:ShRoUd"));
    assert_eq!(h.upstream.resolve_calls(), 1);
}

#[tokio::test]
async fn test_broadcaster_id_is_cached_without_expiry() {
    let h = harness(
        StubUpstream::default()
            .with_user("shroud", "123")
            .with_emotes("123", vec![pogchamp()]),
    );

    h.resolver.resolve("shroud").await.unwrap();

    assert!(h.store.contains("user:shroud"));
    assert_eq!(h.store.ttl("user:shroud"), None);
}

#[tokio::test]
async fn test_cached_emote_set_skips_upstream_and_token() {
    let h = harness(StubUpstream::default());
    let map = fold_emotes(&[pogchamp()]);
    h.store.set("user:shroud", "123").await.unwrap();
    h.store
        .set_ex(
            "emotes:123",
            &serde_json::to_string(&map).unwrap(),
            DEFAULT_EMOTE_TTL,
        )
        .await
        .unwrap();

    let emotes = h.resolver.resolve("shroud").await.unwrap();

    assert_eq!(emotes, map);
    assert_eq!(h.upstream.resolve_calls(), 0);
    assert_eq!(h.upstream.list_calls(), 0);
    assert_eq!(h.tokens.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_second_resolve_reads_back_identical_set() {
    let h = harness(StubUpstream::default().with_user("shroud", "123").with_emotes(
        "123",
        vec![
            pogchamp(),
            emote("2", "Kappa", ["d", "e", "f"]),
            emote("3", "LUL", ["g", "h", "i"]),
        ],
    ));

    let first = h.resolver.resolve("shroud").await.unwrap();
    let second = h.resolver.resolve("shroud").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
    assert_eq!(h.upstream.list_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_expired_emote_set_triggers_one_refetch() {
    let h = harness(
        StubUpstream::default()
            .with_user("shroud", "123")
            .with_emotes("123", vec![pogchamp()]),
    );

    h.resolver.resolve("shroud").await.unwrap();
    tokio::time::advance(Duration::from_secs(1800)).await;
    h.resolver.resolve("shroud").await.unwrap();
    assert_eq!(h.upstream.list_calls(), 1);

    tokio::time::advance(Duration::from_secs(1800)).await;
    h.resolver.resolve("shroud").await.unwrap();
    h.resolver.resolve("shroud").await.unwrap();

    assert_eq!(h.upstream.list_calls(), 2);
    assert_eq!(h.upstream.resolve_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_custom_emote_ttl_is_applied() {
    let store = Arc::new(MemoryStore::new());
    let upstream = Arc::new(
        StubUpstream::default()
            .with_user("shroud", "123")
            .with_emotes("123", vec![pogchamp()]),
    );
    let resolver = EmoteResolver::new(
        store.clone(),
        Arc::new(StubTokens::default()),
        upstream.clone(),
    )
    .with_emote_ttl(Duration::from_secs(60));

    resolver.resolve("shroud").await.unwrap();
    assert_eq!(store.ttl("emotes:123"), Some(Duration::from_secs(60)));
}

#[tokio::test]
async fn test_unknown_user_is_not_found_and_not_cached() {
    let h = harness(StubUpstream::default());

    let err = h.resolver.resolve("ghost").await.unwrap_err();

    assert!(matches!(err, ResolveError::BroadcasterId { ref login, .. } if login == "ghost"));
    assert!(err.is_not_found());
    assert!(h.store.is_empty());
    assert_eq!(h.upstream.list_calls(), 0);
}

#[tokio::test]
async fn test_list_failure_caches_no_emote_set() {
    let upstream = StubUpstream {
        list_status: Some(500),
        ..StubUpstream::default()
    }
    .with_user("shroud", "123");
    let h = harness(upstream);

    let err = h.resolver.resolve("shroud").await.unwrap_err();

    match &err {
        ResolveError::EmoteSet {
            broadcaster_id,
            source: TwitchError::ApiError { status, .. },
        } => {
            assert_eq!(broadcaster_id, "123");
            assert_eq!(*status, 500);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!err.is_not_found());
    assert!(!h.store.contains("emotes:123"));
}

#[tokio::test]
async fn test_token_failure_is_wrapped_and_skips_upstream() {
    let tokens = StubTokens {
        fail: true,
        ..StubTokens::default()
    };
    let h = harness_with_tokens(StubUpstream::default().with_user("shroud", "123"), tokens);

    let err = h.resolver.resolve("shroud").await.unwrap_err();

    assert!(matches!(
        err.upstream(),
        Some(TwitchError::AuthFailed { status: 401, .. })
    ));
    assert_eq!(h.upstream.resolve_calls(), 0);
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn test_upstream_receives_current_token() {
    let h = harness(
        StubUpstream::default()
            .with_user("shroud", "123")
            .with_emotes("123", vec![pogchamp()]),
    );

    h.resolver.resolve("shroud").await.unwrap();

    // One token request per upstream call.
    assert_eq!(h.tokens.calls.load(Ordering::SeqCst), 2);
    assert_eq!(h.upstream.token(), "token-2");
}

#[tokio::test]
async fn test_corrupt_cached_set_is_an_error() {
    let h = harness(StubUpstream::default());
    h.store.set("user:shroud", "123").await.unwrap();
    h.store.set("emotes:123", "not json").await.unwrap();

    let err = h.resolver.resolve("shroud").await.unwrap_err();

    assert!(matches!(err, ResolveError::CorruptEntry { .. }));
    assert_eq!(h.upstream.list_calls(), 0);
}

#[test]
fn test_fold_keeps_last_emote_on_name_collision() {
    let map = fold_emotes(&[
        emote("1", "Dupe", ["a", "b", "c"]),
        emote("2", "Dupe", ["d", "e", "f"]),
    ]);

    assert_eq!(map.len(), 1);
    assert_eq!(map["Dupe"].id, "2");
    assert_eq!(map["Dupe"].sizes, sizes(["d", "e", "f"]));
}

#[test]
fn test_emote_map_serializes_as_name_keyed_object() {
    let map = fold_emotes(&[pogchamp()]);
    let value = serde_json::to_value(&map).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "PogChamp": {
                "id": "1",
                "sizes": { "url_1x": "a", "url_2x": "b", "url_4x": "c" }
            }
        })
    );
}

#[tokio::test]
async fn test_get_emote_by_name_ignores_case() {
    let h = harness(
        StubUpstream::default()
            .with_user("shroud", "123")
            .with_emotes("123", vec![pogchamp(), emote("2", "Kappa", ["d", "e", "f"])]),
    );

    let found = h.resolver.get_emote_by_name("SHROUD", "pogchamp").await.unwrap();

    assert_eq!(
        found,
        NamedEmote {
            name: "PogChamp".into(),
            id: "1".into(),
            sizes: sizes(["a", "b", "c"]),
        }
    );
}

#[tokio::test]
async fn test_get_emote_by_name_missing_is_not_found() {
    let h = harness(
        StubUpstream::default()
            .with_user("shroud", "123")
            .with_emotes("123", vec![pogchamp()]),
    );

    let err = h
        .resolver
        .get_emote_by_name("shroud", "Kappa")
        .await
        .unwrap_err();

    assert!(matches!(err, ResolveError::EmoteNotFound(ref name) if name == "Kappa"));
    assert!(err.is_not_found());
}

#[test]
fn test_cache_keys() {
    assert_eq!(user_key("shroud"), "user:shroud");
    assert_eq!(emotes_key("123"), "emotes:123");
}

/// Store backed by memory that fails the selected operations.
#[derive(Default)]
struct FailingStore {
    inner: MemoryStore,
    fail_get: bool,
    fail_set: bool,
    fail_set_ex: bool,
}

fn store_down() -> StoreError {
    StoreError::UnsupportedUrl("down://".into())
}

#[async_trait]
impl CacheStore for FailingStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.fail_get {
            return Err(store_down());
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail_set {
            return Err(store_down());
        }
        self.inner.set(key, value).await
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        if self.fail_set_ex {
            return Err(store_down());
        }
        self.inner.set_ex(key, value, ttl).await
    }
}

fn resolver_over(store: Arc<FailingStore>, upstream: Arc<StubUpstream>) -> EmoteResolver {
    EmoteResolver::new(store, Arc::new(StubTokens::default()), upstream)
}

fn shroud_upstream() -> Arc<StubUpstream> {
    Arc::new(
        StubUpstream::default()
            .with_user("shroud", "123")
            .with_emotes("123", vec![pogchamp()]),
    )
}

#[tokio::test]
async fn test_store_read_failure_aborts_before_upstream() {
    let store = Arc::new(FailingStore {
        fail_get: true,
        ..FailingStore::default()
    });
    let upstream = shroud_upstream();
    let resolver = resolver_over(store, upstream.clone());

    let err = resolver.resolve("shroud").await.unwrap_err();

    assert!(matches!(err, ResolveError::Store(StoreError::UnsupportedUrl(_))));
    assert!(!err.is_not_found());
    assert_eq!(upstream.resolve_calls(), 0);
    assert_eq!(upstream.list_calls(), 0);
}

#[tokio::test]
async fn test_user_write_failure_stops_before_listing_emotes() {
    let store = Arc::new(FailingStore {
        fail_set: true,
        ..FailingStore::default()
    });
    let upstream = shroud_upstream();
    let resolver = resolver_over(store.clone(), upstream.clone());

    let err = resolver.resolve("shroud").await.unwrap_err();

    assert!(matches!(err, ResolveError::Store(_)));
    assert_eq!(upstream.resolve_calls(), 1);
    assert_eq!(upstream.list_calls(), 0);
    assert!(store.inner.is_empty());
}

#[tokio::test]
async fn test_emote_set_write_failure_returns_no_partial_result() {
    let store = Arc::new(FailingStore {
        fail_set_ex: true,
        ..FailingStore::default()
    });
    let upstream = shroud_upstream();
    let resolver = resolver_over(store.clone(), upstream.clone());

    let err = resolver.resolve("shroud").await.unwrap_err();

    assert!(matches!(err, ResolveError::Store(_)));
    assert_eq!(upstream.list_calls(), 1);
    assert!(!store.inner.contains("emotes:123"));
}
