//! 持久化存储
//!
//! 自选列表与刷新间隔以字符串键值整体读写，
//! 存储作为注入依赖，调度器逻辑不感知具体后端

use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

/// 键值存储接口
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// JSON 文件实现
///
/// 所有键放在同一个 JSON 对象里，每次写入整体覆盖落盘
pub struct JsonFileStore {
    path: PathBuf,
    cache: Mutex<HashMap<String, String>>,
}

impl JsonFileStore {
    /// 打开数据文件，不存在或解析失败都从空数据开始
    pub fn open<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        let cache = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                log::warn!("数据文件 {} 解析失败，使用空数据: {}", path.display(), e);
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };
        Self {
            path,
            cache: Mutex::new(cache),
        }
    }
}

impl KvStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.cache.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut cache = self.cache.lock().unwrap();
        cache.insert(key.to_string(), value.to_string());
        let content = serde_json::to_string_pretty(&*cache)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

/// 内存实现，测试用
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.data.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.data
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_file_store_round_trip() {
        let dir = std::env::temp_dir().join("fundwatch-store-test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("data.json");
        let _ = fs::remove_file(&path);

        let store = JsonFileStore::open(&path);
        assert_eq!(store.get("funds"), None);
        store.set("funds", "[]").unwrap();
        store.set("refreshMs", "30000").unwrap();

        // 重新打开应读到落盘内容
        let reopened = JsonFileStore::open(&path);
        assert_eq!(reopened.get("funds").as_deref(), Some("[]"));
        assert_eq!(reopened.get("refreshMs").as_deref(), Some("30000"));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn corrupt_data_file_starts_empty() {
        let dir = std::env::temp_dir().join("fundwatch-store-test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("corrupt.json");
        fs::write(&path, "not json at all").unwrap();

        let store = JsonFileStore::open(&path);
        assert_eq!(store.get("funds"), None);

        let _ = fs::remove_file(&path);
    }
}
