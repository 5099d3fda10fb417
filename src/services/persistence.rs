//! # 文档读写流程
//!
//! 打开 / 打开最近 / 保存 / 另存为 四个流程：
//! - 需要目标路径时弹出原生对话框，用户取消返回 `None`，不写盘也不更新最近文件
//! - 内容按原始文本写入，不做任何转换
//! - 每次成功读写都会调用 `RecentDocumentsStore::track`，
//!   更新后的列表随结果返回，调用方据此重建菜单

use std::path::{Path, PathBuf};

use crate::services::dialogs::{DialogHost, FileFilter, SaveDialogRequest};
use crate::services::locale::{Locale, t};
use crate::services::recent::RecentDocumentsStore;

/// 一次成功读写的结果
#[derive(Debug, Clone, PartialEq)]
pub struct Persisted<T> {
    pub value: T,
    /// 追踪之后的最近文件列表
    pub recent: Vec<PathBuf>,
}

/// 已打开的文档
#[derive(Debug, Clone, PartialEq)]
pub struct OpenedDocument {
    pub path: PathBuf,
    pub content: String,
}

fn markdown_save_filter(locale: Locale) -> FileFilter {
    FileFilter::new(t(locale, "filterMarkdown"), &["md"])
}

fn markdown_open_filter(locale: Locale) -> FileFilter {
    FileFilter::new(t(locale, "filterMarkdown"), &["md", "markdown"])
}

/// 弹出打开对话框并读取所选文档
///
/// # 返回值
/// 用户取消时返回 `None`
///
/// # 错误
/// 文件读取失败（含非 UTF-8 内容）或最近文件写入失败时返回错误
pub async fn open<D: DialogHost>(
    dialogs: &D,
    recent: &RecentDocumentsStore,
    locale: Locale,
) -> Result<Option<Persisted<OpenedDocument>>, String> {
    let Some(path) = dialogs.pick_open_path(markdown_open_filter(locale)).await else {
        return Ok(None);
    };
    open_recent(recent, &path).await.map(Some)
}

/// 直接读取指定路径的文档（最近文件菜单 / 前端列表）
pub async fn open_recent(
    recent: &RecentDocumentsStore,
    path: &Path,
) -> Result<Persisted<OpenedDocument>, String> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| format!("读取文档失败: {}", e))?;
    let list = recent.track(path).await?;
    log::info!("已打开文档 {}", path.display());

    Ok(Persisted {
        value: OpenedDocument {
            path: path.to_path_buf(),
            content,
        },
        recent: list,
    })
}

/// 保存文档
///
/// 已有路径时直接写入；无路径（未命名文档）时弹出保存对话框，
/// 预填默认文件名并只允许 `.md`。
///
/// # 返回值
/// 写入的路径；用户取消时返回 `None`
///
/// # 错误
/// 写入失败时返回错误
pub async fn save<D: DialogHost>(
    dialogs: &D,
    recent: &RecentDocumentsStore,
    locale: Locale,
    path: Option<PathBuf>,
    content: &str,
) -> Result<Option<Persisted<PathBuf>>, String> {
    let target = match path {
        Some(path) => path,
        None => {
            let request = SaveDialogRequest {
                default_path: PathBuf::from(t(locale, "saveDefaultName")),
                filter: markdown_save_filter(locale),
            };
            match dialogs.pick_save_path(request).await {
                Some(path) => path,
                None => return Ok(None),
            }
        }
    };

    write_and_track(recent, target, content).await.map(Some)
}

/// 另存为：总是弹出保存对话框，以当前路径（或默认文件名）预填
pub async fn save_as<D: DialogHost>(
    dialogs: &D,
    recent: &RecentDocumentsStore,
    locale: Locale,
    current_path: Option<PathBuf>,
    content: &str,
) -> Result<Option<Persisted<PathBuf>>, String> {
    let request = SaveDialogRequest {
        default_path: current_path.unwrap_or_else(|| PathBuf::from(t(locale, "saveDefaultName"))),
        filter: markdown_save_filter(locale),
    };
    let Some(target) = dialogs.pick_save_path(request).await else {
        return Ok(None);
    };

    write_and_track(recent, target, content).await.map(Some)
}

async fn write_and_track(
    recent: &RecentDocumentsStore,
    target: PathBuf,
    content: &str,
) -> Result<Persisted<PathBuf>, String> {
    tokio::fs::write(&target, content)
        .await
        .map_err(|e| format!("保存文档失败: {}", e))?;
    let list = recent.track(&target).await?;
    log::info!("已保存文档 {}", target.display());

    Ok(Persisted {
        value: target,
        recent: list,
    })
}
