//! # 导出 Tauri Commands
//!
//! - `export_html` - 导出为独立 HTML 文件
//! - `export_pdf` - 经无头浏览器分页后导出为 PDF

use tauri::{State, WebviewWindow};

use crate::desktop::dialogs::TauriDialogs;
use crate::models::document::{ExportRequest, PathResult};
use crate::services::export;
use crate::services::pdf::HeadlessBrowser;
use crate::services::session::AppSession;

fn request(
    default_name: Option<String>,
    content_html: Option<String>,
    document_title: Option<String>,
) -> ExportRequest {
    ExportRequest {
        default_name,
        content_html: content_html.unwrap_or_default(),
        document_title,
    }
}

/// 导出 HTML
///
/// # 参数
/// - `default_name` - 建议文件名，缺省 `export.html`
/// - `content_html` - 编辑器渲染出的 HTML 片段
/// - `document_title` - 文档标题，缺省使用本地化的默认标题
///
/// # 返回值
/// `{ path }`；用户取消时返回 `null`
#[tauri::command]
pub async fn export_html(
    window: WebviewWindow,
    session: State<'_, AppSession>,
    default_name: Option<String>,
    content_html: Option<String>,
    document_title: Option<String>,
) -> Result<Option<PathResult>, String> {
    let dialogs = TauriDialogs::for_window(&window);
    let request = request(default_name, content_html, document_title);
    let written = export::export_html(&dialogs, session.locale(), &request).await?;
    Ok(written.as_deref().map(PathResult::new))
}

/// 导出 PDF
///
/// 参数与 `export_html` 相同，建议文件名缺省 `export.pdf`。
///
/// # 错误
/// 找不到可用浏览器、渲染超时或写入失败时返回错误
#[tauri::command]
pub async fn export_pdf(
    window: WebviewWindow,
    session: State<'_, AppSession>,
    default_name: Option<String>,
    content_html: Option<String>,
    document_title: Option<String>,
) -> Result<Option<PathResult>, String> {
    let dialogs = TauriDialogs::for_window(&window);
    let request = request(default_name, content_html, document_title);
    let written =
        export::export_pdf(&dialogs, &HeadlessBrowser::new(), session.locale(), &request).await?;
    Ok(written.as_deref().map(PathResult::new))
}
