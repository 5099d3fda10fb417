//! # 窗口生命周期
//!
//! 拦截窗口关闭请求并驱动 `CloseGuard` 确认流程：
//! - `CloseRequested`：闩锁未设置时阻止关闭，在后台任务中执行确认流程，
//!   结果为 `Close` 时再次调用 `close()`（此时闩锁已设置，直接放行）
//! - `Destroyed`：清理该窗口的守卫记录

use std::time::Duration;

use tauri::{AppHandle, Emitter, EventTarget, Manager, Window, WindowEvent};

use crate::desktop::dialogs::TauriDialogs;
use crate::services::close_guard::{
    CloseChoice, CloseGuard, CloseHost, CloseOutcome, CloseRequest, close_prompt,
};
use crate::services::dialogs::DialogHost;
use crate::services::locale::Locale;
use crate::services::session::AppSession;
use crate::services::ui_bridge::{
    DIRTY_QUERY_TIMEOUT, QUERY_EVENT, QueryEvent, QueryKind, SAVE_QUERY_TIMEOUT, UiBridge,
};

/// 向指定窗口的前端提问并等待回答；发送失败、超时都视为 `false`
pub async fn ask_ui(
    app: &AppHandle,
    bridge: &UiBridge,
    label: &str,
    kind: QueryKind,
    timeout: Duration,
) -> bool {
    let (id, rx) = bridge.register();
    let event = QueryEvent { id, kind };
    if let Err(e) = app.emit_to(EventTarget::webview_window(label), QUERY_EVENT, &event) {
        log::warn!("向窗口 {} 发送 {:?} 询问失败: {}", label, kind, e);
        bridge.cancel(id);
        return false;
    }
    bridge.wait(id, rx, timeout).await
}

/// 单个窗口关闭流程所需的宿主能力
struct WindowCloseHost<'a> {
    app: &'a AppHandle,
    bridge: &'a UiBridge,
    label: &'a str,
    dialogs: TauriDialogs,
    locale: Locale,
}

impl CloseHost for WindowCloseHost<'_> {
    async fn is_dirty(&self) -> bool {
        ask_ui(self.app, self.bridge, self.label, QueryKind::IsDirty, DIRTY_QUERY_TIMEOUT).await
    }

    async fn confirm_close(&self) -> CloseChoice {
        self.dialogs.choose(close_prompt(self.locale)).await.into()
    }

    async fn save_before_exit(&self) -> bool {
        ask_ui(
            self.app,
            self.bridge,
            self.label,
            QueryKind::SaveBeforeExit,
            SAVE_QUERY_TIMEOUT,
        )
        .await
    }
}

async fn run_close_workflow(app: AppHandle, label: String) {
    let guard = app.state::<CloseGuard>();
    let Some(window) = app.get_webview_window(&label) else {
        guard.forget(&label);
        return;
    };

    let bridge = app.state::<UiBridge>();
    let host = WindowCloseHost {
        app: &app,
        bridge: &bridge,
        label: &label,
        dialogs: TauriDialogs::for_window(&window),
        locale: app.state::<AppSession>().locale(),
    };

    if guard.run(&label, &host).await == CloseOutcome::Close {
        if let Err(e) = window.close() {
            log::error!("关闭窗口 {} 失败: {}", label, e);
        }
    }
}

/// `Builder::on_window_event` 的处理函数
pub fn handle_window_event(window: &Window, event: &WindowEvent) {
    match event {
        WindowEvent::CloseRequested { api, .. } => {
            let label = window.label().to_string();
            match window.state::<CloseGuard>().request_close(&label) {
                CloseRequest::Allow => {}
                CloseRequest::Suppress => api.prevent_close(),
                CloseRequest::Start => {
                    api.prevent_close();
                    let app = window.app_handle().clone();
                    tauri::async_runtime::spawn(run_close_workflow(app, label));
                }
            }
        }
        WindowEvent::Destroyed => {
            window.state::<CloseGuard>().forget(window.label());
        }
        _ => {}
    }
}
