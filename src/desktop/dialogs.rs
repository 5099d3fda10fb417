//! # 原生对话框
//!
//! `DialogHost` 的 Tauri 实现，基于 `tauri-plugin-dialog`。
//! 插件的对话框 API 以回调返回结果，这里用 oneshot 通道转成 async。

use std::path::PathBuf;

use tauri::{AppHandle, Manager, WebviewWindow};
use tauri_plugin_dialog::{
    DialogExt, FileDialogBuilder, FilePath, MessageDialogButtons, MessageDialogKind,
    MessageDialogResult,
};
use tokio::sync::oneshot;

use crate::services::dialogs::{Choice, ChoicePrompt, DialogHost, FileFilter, SaveDialogRequest};

/// 对话框标题
const DIALOG_TITLE: &str = "AinoldMarkdown";

/// 绑定到某个窗口（可选）的对话框宿主
#[derive(Clone)]
pub struct TauriDialogs {
    app: AppHandle,
    parent: Option<WebviewWindow>,
}

impl TauriDialogs {
    /// 以指定窗口为父窗口，对话框模态于该窗口
    pub fn for_window(window: &WebviewWindow) -> Self {
        Self {
            app: window.app_handle().clone(),
            parent: Some(window.clone()),
        }
    }

    fn file_dialog(&self, filter: &FileFilter) -> FileDialogBuilder<tauri::Wry> {
        let builder = self
            .app
            .dialog()
            .file()
            .add_filter(filter.name.clone(), &filter.extensions);
        match &self.parent {
            Some(window) => builder.set_parent(window),
            None => builder,
        }
    }

    fn show_save(&self, request: SaveDialogRequest, tx: oneshot::Sender<Option<FilePath>>) {
        let mut builder = self.file_dialog(&request.filter);

        // 预填路径既可能是单纯的文件名，也可能是完整路径
        if let Some(name) = request.default_path.file_name() {
            builder = builder.set_file_name(name.to_string_lossy());
        }
        if let Some(dir) = request
            .default_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
        {
            builder = builder.set_directory(dir);
        }

        builder.save_file(move |path| {
            let _ = tx.send(path);
        });
    }

    fn show_open(&self, filter: FileFilter, tx: oneshot::Sender<Option<FilePath>>) {
        self.file_dialog(&filter).pick_file(move |path| {
            let _ = tx.send(path);
        });
    }

    fn show_choice(&self, prompt: &ChoicePrompt, tx: oneshot::Sender<MessageDialogResult>) {
        let [primary, secondary, cancel] = prompt.buttons.clone();
        let builder = self
            .app
            .dialog()
            .message(format!("{}\n\n{}", prompt.message, prompt.detail))
            .title(DIALOG_TITLE)
            .kind(MessageDialogKind::Warning)
            .buttons(MessageDialogButtons::YesNoCancelCustom(primary, secondary, cancel));
        let builder = match &self.parent {
            Some(window) => builder.parent(window),
            None => builder,
        };

        builder.show_with_result(move |result| {
            let _ = tx.send(result);
        });
    }
}

/// 将文件对话框结果转换为本地路径；非本地路径（如移动端 URI）视为取消
fn into_local_path(path: Option<FilePath>) -> Option<PathBuf> {
    match path?.into_path() {
        Ok(path) => Some(path),
        Err(e) => {
            log::warn!("对话框返回的不是本地路径: {}", e);
            None
        }
    }
}

/// 将三按钮对话框的结果映射为选择
///
/// 不同平台对自定义按钮的返回值不同：有的返回 `Yes`/`No`/`Cancel`，
/// 有的返回按钮文本 `Custom(label)`。关闭对话框一律视为取消。
pub fn interpret_choice(result: &MessageDialogResult, buttons: &[String; 3]) -> Choice {
    match result {
        MessageDialogResult::Yes | MessageDialogResult::Ok => Choice::Primary,
        MessageDialogResult::No => Choice::Secondary,
        MessageDialogResult::Custom(label) if *label == buttons[0] => Choice::Primary,
        MessageDialogResult::Custom(label) if *label == buttons[1] => Choice::Secondary,
        _ => Choice::Cancel,
    }
}

impl DialogHost for TauriDialogs {
    async fn pick_save_path(&self, request: SaveDialogRequest) -> Option<PathBuf> {
        let (tx, rx) = oneshot::channel();
        self.show_save(request, tx);
        into_local_path(rx.await.ok().flatten())
    }

    async fn pick_open_path(&self, filter: FileFilter) -> Option<PathBuf> {
        let (tx, rx) = oneshot::channel();
        self.show_open(filter, tx);
        into_local_path(rx.await.ok().flatten())
    }

    async fn choose(&self, prompt: ChoicePrompt) -> Choice {
        let (tx, rx) = oneshot::channel();
        self.show_choice(&prompt, tx);
        match rx.await {
            Ok(result) => interpret_choice(&result, &prompt.buttons),
            Err(_) => Choice::Cancel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buttons() -> [String; 3] {
        ["Save".to_string(), "Don't Save".to_string(), "Cancel".to_string()]
    }

    #[test]
    fn platform_results_map_to_choices() {
        let b = buttons();
        assert_eq!(interpret_choice(&MessageDialogResult::Yes, &b), Choice::Primary);
        assert_eq!(interpret_choice(&MessageDialogResult::No, &b), Choice::Secondary);
        assert_eq!(interpret_choice(&MessageDialogResult::Cancel, &b), Choice::Cancel);
        assert_eq!(
            interpret_choice(&MessageDialogResult::Custom("Don't Save".into()), &b),
            Choice::Secondary
        );
        assert_eq!(
            interpret_choice(&MessageDialogResult::Custom("Cancel".into()), &b),
            Choice::Cancel
        );
    }
}
