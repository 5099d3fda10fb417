//! # 对话框抽象
//!
//! 业务流程（保存、导出、关闭确认）通过 `DialogHost` 与原生对话框交互，
//! 这样服务层不依赖 Tauri，测试里可以用假实现替换。
//! 生产实现见 `desktop::dialogs::TauriDialogs`。

use std::future::Future;
use std::path::PathBuf;

/// 文件类型过滤器
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFilter {
    /// 显示名称（如 "Markdown"）
    pub name: String,
    /// 不带点的扩展名列表
    pub extensions: Vec<&'static str>,
}

impl FileFilter {
    /// # 参数
    /// - `name` - 过滤器显示名（已本地化）
    /// - `extensions` - 不带点的扩展名
    pub fn new(name: impl Into<String>, extensions: &[&'static str]) -> Self {
        Self {
            name: name.into(),
            extensions: extensions.to_vec(),
        }
    }
}

/// 保存对话框请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveDialogRequest {
    /// 预填路径：可以是单纯的文件名，也可以是完整路径
    pub default_path: PathBuf,
    pub filter: FileFilter,
}

/// 三按钮确认框
///
/// 按钮顺序固定为 `[主操作, 次操作, 取消]`，默认按钮为第一个，
/// 关闭对话框（Esc / 关闭按钮）等同于取消。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoicePrompt {
    pub message: String,
    pub detail: String,
    pub buttons: [String; 3],
}

/// 用户在三按钮确认框中的选择
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Primary,
    Secondary,
    Cancel,
}

/// 原生对话框宿主
pub trait DialogHost: Send + Sync {
    /// 弹出保存对话框；用户取消时返回 `None`
    fn pick_save_path(
        &self,
        request: SaveDialogRequest,
    ) -> impl Future<Output = Option<PathBuf>> + Send;

    /// 弹出打开文件对话框；用户取消时返回 `None`
    fn pick_open_path(&self, filter: FileFilter) -> impl Future<Output = Option<PathBuf>> + Send;

    /// 弹出三按钮确认框
    fn choose(&self, prompt: ChoicePrompt) -> impl Future<Output = Choice> + Send;
}
