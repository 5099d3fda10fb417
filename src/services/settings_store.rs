//! # 设置存储服务
//!
//! 管理 `settings.json` 的读取与 merge-patch 写入。
//!
//! ## 读取策略（fail-open）
//! 文件缺失、损坏或不是对象时返回默认设置，永远不会向调用方报错。
//!
//! ## 写入策略
//! 读取当前记录 → 叠加补丁 → 写回整个文件。整个读-改-写过程持有
//! store 自己的异步锁，同一进程内并发写入不会互相覆盖丢失更新。
//! 不缓存：每次读取都重新读盘。

use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use crate::models::settings::{AppSettings, SettingsPatch, migrate_settings};
use crate::services::storage;

/// 设置存储
///
/// 通过 Tauri 的 `manage()` 注册为应用状态。
pub struct SettingsStore {
    path: PathBuf,
    /// 单写者锁：串行化同一 store 上的所有读写
    lock: Mutex<()>,
}

impl SettingsStore {
    /// 以指定文件路径创建 store（文件可以尚不存在）
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// 记录文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取设置，任何失败都回退为默认设置
    pub async fn read(&self) -> AppSettings {
        let _guard = self.lock.lock().await;
        self.read_unlocked().await
    }

    /// 合并补丁并持久化
    ///
    /// # 返回值
    /// 合并后的完整设置
    ///
    /// # 错误
    /// 目录创建或文件写入失败时返回错误
    pub async fn write(&self, patch: SettingsPatch) -> Result<AppSettings, String> {
        let _guard = self.lock.lock().await;
        let current = self.read_unlocked().await;
        let next = patch.apply(current);
        storage::write_json(&self.path, &next).await?;
        log::debug!("设置已写入 {}", self.path.display());
        Ok(next)
    }

    async fn read_unlocked(&self) -> AppSettings {
        storage::read_json(&self.path)
            .await
            .map(migrate_settings)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::services::locale::Locale;

    #[tokio::test]
    async fn read_of_missing_or_corrupt_store_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));
        assert_eq!(store.read().await, AppSettings::default());

        tokio::fs::write(store.path(), "\u{0}garbage").await.unwrap();
        assert_eq!(store.read().await, AppSettings::default());
    }

    #[tokio::test]
    async fn write_merges_over_existing_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg").join("settings.json");
        tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        tokio::fs::write(&path, r#"{"locale":"zh-CN","customKey":[1,2]}"#)
            .await
            .unwrap();

        let store = SettingsStore::new(&path);
        let merged = store
            .write(SettingsPatch {
                open_at_login: Some(true),
                ..SettingsPatch::default()
            })
            .await
            .unwrap();

        assert_eq!(merged.locale, Some(Locale::ZhCn));
        assert!(merged.open_at_login);
        assert_eq!(merged.extra.get("customKey"), Some(&serde_json::json!([1, 2])));
        assert_eq!(store.read().await, merged);
    }

    #[tokio::test]
    async fn concurrent_writes_do_not_lose_updates() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(SettingsStore::new(dir.path().join("settings.json")));

        let a = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .write(SettingsPatch {
                        open_at_login: Some(true),
                        ..SettingsPatch::default()
                    })
                    .await
            })
        };
        let b = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .write(SettingsPatch {
                        install_guide_seen: Some(true),
                        ..SettingsPatch::default()
                    })
                    .await
            })
        };
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        let settings = store.read().await;
        assert!(settings.open_at_login);
        assert!(settings.install_guide_seen);
    }
}
