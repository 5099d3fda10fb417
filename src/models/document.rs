//! # 文档、导出与资源导入的 IPC 数据结构
//!
//! 与前端 `window.ainold` API 的 TypeScript 类型一一对应。

use std::path::Path;

use serde::Serialize;

/// 打开文档的结果
///
/// ```typescript
/// interface OpenResult { path: string; content: string; }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenResult {
    pub path: String,
    pub content: String,
}

/// 保存 / 导出的结果：只包含目标路径
///
/// ```typescript
/// interface SaveResult { path: string; }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathResult {
    pub path: String,
}

impl PathResult {
    /// 路径按平台原样转成字符串（非 UTF-8 部分有损替换）
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_string_lossy().to_string(),
        }
    }
}

/// 导出目标格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Html,
    Pdf,
}

/// 导出请求
///
/// 由 `export_html` / `export_pdf` command 的参数
/// `{ defaultName, contentHtml, documentTitle? }` 组装而成。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExportRequest {
    /// 建议的输出文件名
    pub default_name: Option<String>,
    /// 编辑器渲染出的 HTML 片段
    pub content_html: String,
    /// 文档标题；缺省时使用本地化的默认导出标题
    pub document_title: Option<String>,
}

/// 资源导入的校验失败类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetError {
    /// 文档尚未保存，无法确定 assets 目录
    UnsavedDocument,
    /// 粘贴的数据不是合法的 base64 图片 data URL
    InvalidImageData,
}

/// 图片导入结果
///
/// 成功时序列化为 `{ markdownPath, absolutePath }`，
/// 校验失败时序列化为 `{ error: "UNSAVED_DOCUMENT" }` 这类带标签的结果。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ImageImportResult {
    #[serde(rename_all = "camelCase")]
    Saved {
        /// 文档相对路径（正斜杠），可直接写入 markdown
        markdown_path: String,
        /// 磁盘上的绝对路径
        absolute_path: String,
    },
    Rejected { error: AssetError },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn import_result_wire_shapes() {
        let saved = ImageImportResult::Saved {
            markdown_path: "assets/a-1.png".into(),
            absolute_path: "/docs/assets/a-1.png".into(),
        };
        assert_eq!(
            serde_json::to_value(&saved).unwrap(),
            json!({ "markdownPath": "assets/a-1.png", "absolutePath": "/docs/assets/a-1.png" })
        );

        let rejected = ImageImportResult::Rejected {
            error: AssetError::UnsavedDocument,
        };
        assert_eq!(
            serde_json::to_value(&rejected).unwrap(),
            json!({ "error": "UNSAVED_DOCUMENT" })
        );
    }
}
