//! # 最近文件存储服务
//!
//! 维护一个有上限、去重、最近使用优先（MRU）的文档路径列表，
//! 持久化在 `recent-files.json`。
//!
//! `track` 是唯一的修改入口；它返回更新后的列表，由调用方（command 层）
//! 据此重建原生菜单，本模块不直接接触菜单。

use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use crate::models::settings::{RecentDocumentsRecord, migrate_recent};
use crate::services::storage;

/// 最近文件列表的最大长度
pub const RECENT_FILES_LIMIT: usize = 10;

/// 最近文件存储
pub struct RecentDocumentsStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl RecentDocumentsStore {
    /// 创建存储
    ///
    /// # 参数
    /// - `path` - 最近文件记录的 JSON 路径（通常是 `utils::path::recent_files_path()`）
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// 读取最近文件列表（最近的在前）
    ///
    /// 文件缺失或损坏时返回空列表。
    pub async fn list(&self) -> Vec<PathBuf> {
        let _guard = self.lock.lock().await;
        self.list_unlocked().await
    }

    /// 记录一次打开/保存，将路径移到列表最前
    ///
    /// # 返回值
    /// 更新后的完整列表
    ///
    /// # 错误
    /// 写入失败时返回错误
    pub async fn track(&self, path: &Path) -> Result<Vec<PathBuf>, String> {
        let _guard = self.lock.lock().await;
        let current = self.list_unlocked().await;
        let next = promote(current, path);
        storage::write_json(&self.path, &RecentDocumentsRecord::new(next.clone())).await?;
        Ok(next)
    }

    async fn list_unlocked(&self) -> Vec<PathBuf> {
        let files = storage::read_json(&self.path)
            .await
            .map(migrate_recent)
            .unwrap_or_default();
        // 手工编辑过的文件也要满足去重和上限约束
        normalize(files)
    }
}

/// 移除已有的同一路径，插到最前并截断到上限
///
/// 路径按精确字符串比较，不做大小写折叠。
fn promote(current: Vec<PathBuf>, path: &Path) -> Vec<PathBuf> {
    let mut next = Vec::with_capacity(RECENT_FILES_LIMIT);
    next.push(path.to_path_buf());
    next.extend(current.into_iter().filter(|item| item != path));
    next.truncate(RECENT_FILES_LIMIT);
    next
}

fn normalize(files: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen: Vec<PathBuf> = Vec::with_capacity(files.len().min(RECENT_FILES_LIMIT));
    for file in files {
        if !seen.contains(&file) {
            seen.push(file);
        }
        if seen.len() == RECENT_FILES_LIMIT {
            break;
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(items: &[&str]) -> Vec<PathBuf> {
        items.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn promote_moves_existing_entry_to_front() {
        let next = promote(paths(&["/a.md", "/b.md", "/c.md"]), Path::new("/b.md"));
        assert_eq!(next, paths(&["/b.md", "/a.md", "/c.md"]));
    }

    #[test]
    fn any_track_sequence_keeps_invariants() {
        // 伪随机序列：路径池大于上限，反复追踪
        let pool: Vec<String> = (0..14).map(|i| format!("/docs/{i}.md")).collect();
        let mut list = Vec::new();
        let mut history: Vec<&str> = Vec::new();
        let mut seed = 7usize;
        for _ in 0..200 {
            seed = (seed * 31 + 11) % 97;
            let pick = &pool[seed % pool.len()];
            list = promote(list, Path::new(pick));
            history.push(pick.as_str());

            assert!(list.len() <= RECENT_FILES_LIMIT);
            let mut unique = list.clone();
            unique.sort();
            unique.dedup();
            assert_eq!(unique.len(), list.len());

            // 顺序应当等于按最后一次追踪时间倒序
            let mut expected: Vec<PathBuf> = Vec::new();
            for item in history.iter().rev() {
                let p = PathBuf::from(item);
                if !expected.contains(&p) {
                    expected.push(p);
                }
            }
            expected.truncate(RECENT_FILES_LIMIT);
            assert_eq!(list, expected);
        }
    }

    #[tokio::test]
    async fn track_persists_and_list_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecentDocumentsStore::new(dir.path().join("recent-files.json"));
        assert!(store.list().await.is_empty());

        store.track(Path::new("/one.md")).await.unwrap();
        let after = store.track(Path::new("/two.md")).await.unwrap();
        assert_eq!(after, paths(&["/two.md", "/one.md"]));
        assert_eq!(store.list().await, after);

        let raw = tokio::fs::read_to_string(dir.path().join("recent-files.json"))
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], serde_json::json!(1));
    }

    #[tokio::test]
    async fn corrupt_or_oversized_files_are_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recent-files.json");
        let store = RecentDocumentsStore::new(&path);

        tokio::fs::write(&path, r#"{"files": {"not": "an array"}}"#).await.unwrap();
        assert!(store.list().await.is_empty());

        let many: Vec<String> = (0..15).map(|i| format!("/f{}.md", i % 12)).collect();
        let body = serde_json::json!({ "files": many }).to_string();
        tokio::fs::write(&path, body).await.unwrap();
        let listed = store.list().await;
        assert_eq!(listed.len(), RECENT_FILES_LIMIT);
        assert_eq!(listed[0], PathBuf::from("/f0.md"));
    }

    #[test]
    fn dedup_is_case_sensitive() {
        let next = promote(paths(&["/Notes.md"]), Path::new("/notes.md"));
        assert_eq!(next.len(), 2);
    }
}
