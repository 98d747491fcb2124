//! 本地存储封装模块
//!
//! 会话层只依赖 [`Storage`] trait；浏览器下由 `gloo-storage` 的 LocalStorage 实现，
//! 测试和 localStorage 不可用时使用 [`MemoryStorage`]。

use std::cell::RefCell;
use std::collections::HashMap;

/// 键值存储接口
pub trait Storage {
    /// 获取存储的字符串值，键不存在或发生错误时返回 `None`
    fn get(&self, key: &str) -> Option<String>;

    /// 设置存储值，返回操作是否成功
    fn set(&self, key: &str, value: &str) -> bool;

    /// 删除存储的键值对，返回操作是否成功
    fn delete(&self, key: &str) -> bool;
}

/// 进程内存储
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        true
    }

    fn delete(&self, key: &str) -> bool {
        self.entries.borrow_mut().remove(key);
        true
    }
}

/// 浏览器 LocalStorage
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage(());

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    /// 隐私模式等环境下 localStorage 可能不可用
    pub fn open() -> Option<Self> {
        web_sys::window()?.local_storage().ok()??;
        Some(Self(()))
    }
}

#[cfg(target_arch = "wasm32")]
impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        <gloo_storage::LocalStorage as gloo_storage::Storage>::get::<String>(key).ok()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        <gloo_storage::LocalStorage as gloo_storage::Storage>::set(key, value).is_ok()
    }

    fn delete(&self, key: &str) -> bool {
        <gloo_storage::LocalStorage as gloo_storage::Storage>::delete(key);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::default();
        assert_eq!(storage.get("k"), None);
        assert!(storage.set("k", "v"));
        assert_eq!(storage.get("k").as_deref(), Some("v"));
        assert!(storage.delete("k"));
        assert_eq!(storage.get("k"), None);
    }
}
