//! # JSON 记录文件读写
//!
//! 设置与最近文件两个记录共用的底层读写：
//! - 读取：文件缺失、无法读取或 JSON 损坏一律视为“没有记录”（返回 `None`），不向上抛错
//! - 写入：自动创建父目录，2 空格缩进美化输出
//!
//! 并发控制（单写者）由各个 store 自己持有的锁负责，本模块不做同步。

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

/// 读取 JSON 记录文件
///
/// # 返回值
/// - `Some(value)` - 文件存在且解析成功
/// - `None` - 文件不存在、读取失败或内容不是合法 JSON
pub async fn read_json(path: &Path) -> Option<Value> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            log::warn!("读取记录文件 {} 失败，按空记录处理: {}", path.display(), e);
            return None;
        }
    };

    match serde_json::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("记录文件 {} 已损坏，按空记录处理: {}", path.display(), e);
            None
        }
    }
}

/// 序列化并写入 JSON 记录文件
///
/// 写入前递归创建父目录。非原子写入：进程在写入中途崩溃可能留下损坏文件，
/// 由读取端的容错策略兜底。
///
/// # 错误
/// 目录创建、序列化或写入失败时返回错误
pub async fn write_json<T: Serialize>(path: &Path, record: &T) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| format!("创建配置目录失败: {}", e))?;
    }

    let content =
        serde_json::to_string_pretty(record).map_err(|e| format!("序列化记录失败: {}", e))?;

    tokio::fs::write(path, content)
        .await
        .map_err(|e| format!("写入记录文件失败: {}", e))
}
