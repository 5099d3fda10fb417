//! # 文档读写 Tauri Commands
//!
//! - `open_markdown` - 弹出打开对话框读取文档
//! - `open_recent_markdown` - 直接读取最近文件
//! - `get_recent_files` - 获取最近文件列表
//! - `save_markdown` / `save_markdown_as` - 保存与另存为
//!
//! 任何读写成功后都会按新的最近文件列表重建应用菜单。

use std::path::PathBuf;

use tauri::{AppHandle, State, WebviewWindow};

use crate::desktop::dialogs::TauriDialogs;
use crate::desktop::menu;
use crate::models::document::{OpenResult, PathResult};
use crate::services::persistence::{self, OpenedDocument, Persisted};
use crate::services::recent::RecentDocumentsStore;
use crate::services::session::AppSession;

fn open_result(app: &AppHandle, session: &AppSession, opened: Persisted<OpenedDocument>) -> OpenResult {
    menu::refresh(app, session.locale(), &opened.recent);
    OpenResult {
        path: opened.value.path.to_string_lossy().to_string(),
        content: opened.value.content,
    }
}

fn path_result(app: &AppHandle, session: &AppSession, saved: Persisted<PathBuf>) -> PathResult {
    menu::refresh(app, session.locale(), &saved.recent);
    PathResult::new(&saved.value)
}

/// 弹出打开对话框并读取所选 Markdown 文档
///
/// # 返回值
/// `{ path, content }`；用户取消时返回 `null`
///
/// # 错误
/// 文件读取失败或最近文件写入失败时返回错误
#[tauri::command]
pub async fn open_markdown(
    app: AppHandle,
    window: WebviewWindow,
    session: State<'_, AppSession>,
    recent: State<'_, RecentDocumentsStore>,
) -> Result<Option<OpenResult>, String> {
    let dialogs = TauriDialogs::for_window(&window);
    let opened = persistence::open(&dialogs, &recent, session.locale()).await?;
    Ok(opened.map(|opened| open_result(&app, &session, opened)))
}

/// 读取指定路径的文档（最近文件）
///
/// # 参数
/// - `path` - 文档绝对路径
///
/// # 错误
/// 文件不存在或读取失败时返回错误
#[tauri::command]
pub async fn open_recent_markdown(
    app: AppHandle,
    session: State<'_, AppSession>,
    recent: State<'_, RecentDocumentsStore>,
    path: String,
) -> Result<OpenResult, String> {
    let opened = persistence::open_recent(&recent, &PathBuf::from(path)).await?;
    Ok(open_result(&app, &session, opened))
}

/// 获取最近文件列表（最近使用的在前）
#[tauri::command]
pub async fn get_recent_files(recent: State<'_, RecentDocumentsStore>) -> Result<Vec<String>, String> {
    Ok(recent
        .list()
        .await
        .iter()
        .map(|path| path.to_string_lossy().to_string())
        .collect())
}

/// 保存文档
///
/// # 参数
/// - `path` - 当前文档路径；未命名文档为 `null`，此时弹出保存对话框
/// - `content` - 文档内容，原样写入
///
/// # 返回值
/// `{ path }`；用户在保存对话框中取消时返回 `null`
///
/// # 错误
/// 写入失败时返回错误
#[tauri::command]
pub async fn save_markdown(
    app: AppHandle,
    window: WebviewWindow,
    session: State<'_, AppSession>,
    recent: State<'_, RecentDocumentsStore>,
    path: Option<String>,
    content: String,
) -> Result<Option<PathResult>, String> {
    let dialogs = TauriDialogs::for_window(&window);
    let target = path.filter(|path| !path.is_empty()).map(PathBuf::from);
    let saved = persistence::save(&dialogs, &recent, session.locale(), target, &content).await?;
    Ok(saved.map(|saved| path_result(&app, &session, saved)))
}

/// 另存为
///
/// # 参数
/// - `current_path` - 当前文档路径，用于预填保存对话框；可为 `null`
/// - `content` - 文档内容
#[tauri::command]
pub async fn save_markdown_as(
    app: AppHandle,
    window: WebviewWindow,
    session: State<'_, AppSession>,
    recent: State<'_, RecentDocumentsStore>,
    current_path: Option<String>,
    content: String,
) -> Result<Option<PathResult>, String> {
    let dialogs = TauriDialogs::for_window(&window);
    let current = current_path.filter(|path| !path.is_empty()).map(PathBuf::from);
    let saved = persistence::save_as(&dialogs, &recent, session.locale(), current, &content).await?;
    Ok(saved.map(|saved| path_result(&app, &session, saved)))
}
