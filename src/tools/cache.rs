use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    tool_name: String,
    arguments: String,
}

impl CacheKey {
    fn new(tool_name: &str, arguments: &Value) -> Self {
        Self {
            tool_name: tool_name.to_string(),
            arguments: arguments.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct ToolCache {
    cache: Arc<RwLock<HashMap<CacheKey, Value>>>,
}

impl ToolCache {
    pub fn new() -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn get(&self, tool_name: &str, arguments: &Value) -> Option<Value> {
        let key = CacheKey::new(tool_name, arguments);
        self.cache.read().ok()?.get(&key).cloned()
    }

    pub fn insert(&self, tool_name: &str, arguments: &Value, result: Value) {
        let key = CacheKey::new(tool_name, arguments);
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(key, result);
        }
    }

    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ToolCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cache_basic_operations() {
        let cache = ToolCache::new();

        assert!(cache.is_empty());
        assert_eq!(cache.len(), 0);

        let args = json!({"text": "refund"});
        cache.insert("exact_search", &args, json!([{"intent": "track_refund"}]));

        assert!(!cache.is_empty());
        assert_eq!(cache.len(), 1);

        let result = cache.get("exact_search", &args);
        assert_eq!(result, Some(json!([{"intent": "track_refund"}])));
    }

    #[test]
    fn test_cache_miss() {
        let cache = ToolCache::new();

        let args1 = json!({"text": "refund"});
        let args2 = json!({"text": "invoice"});

        cache.insert("exact_search", &args1, json!([]));

        assert_eq!(cache.get("exact_search", &args1), Some(json!([])));
        assert_eq!(cache.get("exact_search", &args2), None);
        assert_eq!(cache.get("semantic_search", &args1), None);
    }

    #[test]
    fn test_cache_clear() {
        let cache = ToolCache::new();

        cache.insert("dataset_info", &json!({}), json!({"dataset": {}}));
        cache.insert(
            "calculator",
            &json!({"expression": "2 + 2"}),
            json!({"result": 4.0}),
        );

        assert_eq!(cache.len(), 2);

        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_cache_different_arguments() {
        let cache = ToolCache::new();

        cache.insert("exact_search", &json!({"text": "order"}), json!("result1"));
        cache.insert(
            "exact_search",
            &json!({"text": "order", "k": 3}),
            json!("result2"),
        );

        assert_eq!(cache.len(), 2);

        assert_eq!(
            cache.get("exact_search", &json!({"text": "order"})),
            Some(json!("result1"))
        );
        assert_eq!(
            cache.get("exact_search", &json!({"text": "order", "k": 3})),
            Some(json!("result2"))
        );
    }

    #[test]
    fn test_cache_thread_safety() {
        use std::thread;

        let cache = ToolCache::new();
        let cache_clone = cache.clone();

        let handle = thread::spawn(move || {
            cache_clone.insert("dataset_info", &json!({}), json!("result"));
        });

        handle.join().unwrap();

        assert_eq!(cache.get("dataset_info", &json!({})), Some(json!("result")));
    }
}
