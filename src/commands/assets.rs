//! # 图片资源 Tauri Commands
//!
//! - `import_image_file` - 复制拖入的图片到文档旁的 `assets/`
//! - `save_pasted_image` - 把粘贴的图片 data URL 写入 `assets/`
//!
//! 文档未保存或数据非法时返回 `{ error }`，不视为 command 失败。

use std::path::PathBuf;

use crate::models::document::ImageImportResult;
use crate::services::assets;

fn document(document_path: Option<String>) -> Option<PathBuf> {
    document_path.filter(|path| !path.is_empty()).map(PathBuf::from)
}

/// 导入本地图片文件
///
/// # 参数
/// - `document_path` - 当前文档路径；未保存时为 `null`
/// - `source_path` - 源图片路径
#[tauri::command]
pub async fn import_image_file(
    document_path: Option<String>,
    source_path: String,
) -> Result<ImageImportResult, String> {
    let document = document(document_path);
    assets::import_file(document.as_deref(), &PathBuf::from(source_path)).await
}

/// 保存粘贴的图片
///
/// # 参数
/// - `document_path` - 当前文档路径；未保存时为 `null`
/// - `data_url` - `data:image/...;base64,...`
/// - `file_name` - 可选的基础文件名
#[tauri::command]
pub async fn save_pasted_image(
    document_path: Option<String>,
    data_url: String,
    file_name: Option<String>,
) -> Result<ImageImportResult, String> {
    let document = document(document_path);
    assets::import_pasted_image(document.as_deref(), &data_url, file_name.as_deref()).await
}
