//! # 窗口关闭守卫
//!
//! 每个窗口一个小状态机，防止带着未保存的更改静默关闭窗口：
//!
//! ```text
//! Idle → CheckingDirty ─┬─ 干净 ──────────────────────────→ Closing
//!                       └─ 有更改 → AwaitingUserChoice ─┬─ 保存并关闭 → Saving ─┬─ 成功 → Closing
//!                                                       │                      └─ 失败 → Idle
//!                                                       ├─ 不保存并关闭 ─────────→ Closing
//!                                                       └─ 取消 ────────────────→ Idle
//! ```
//!
//! 进入 `Closing` 时设置“允许关闭”闩锁（latch）。闩锁一旦设置，
//! 之后的关闭请求（例如流程结束后程序调用 `close()` 再次触发的事件）直接放行。
//!
//! 查询前端是否有未保存更改、请求前端保存，都是尽力而为的调用：
//! 任何失败、超时或前端未注册钩子，都视为“没有更改”/“保存失败”。

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use crate::services::dialogs::{Choice, ChoicePrompt};
use crate::services::locale::{Locale, t};

/// 单个窗口的关闭流程状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CloseState {
    #[default]
    Idle,
    CheckingDirty,
    AwaitingUserChoice,
    Saving,
    Closing,
}

/// 用户对“未保存更改”确认框的选择
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseChoice {
    SaveAndClose,
    DiscardAndClose,
    Cancel,
}

impl From<Choice> for CloseChoice {
    fn from(choice: Choice) -> Self {
        match choice {
            Choice::Primary => CloseChoice::SaveAndClose,
            Choice::Secondary => CloseChoice::DiscardAndClose,
            Choice::Cancel => CloseChoice::Cancel,
        }
    }
}

/// 关闭请求的处理决定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseRequest {
    /// 闩锁已设置，放行本次关闭
    Allow,
    /// 阻止关闭，并启动确认流程
    Start,
    /// 阻止关闭；该窗口的确认流程已在进行中
    Suppress,
}

/// 确认流程的最终结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    Close,
    StayOpen,
}

/// 关闭流程需要的宿主能力
pub trait CloseHost: Send + Sync {
    /// 前端是否有未保存的更改（失败视为 `false`）
    fn is_dirty(&self) -> impl Future<Output = bool> + Send;

    /// 弹出三选一确认框
    fn confirm_close(&self) -> impl Future<Output = CloseChoice> + Send;

    /// 请求前端在退出前保存（失败视为 `false`）
    fn save_before_exit(&self) -> impl Future<Output = bool> + Send;
}

/// 关闭确认框的文案：保存并关闭（默认）/ 不保存并关闭 / 取消
pub fn close_prompt(locale: Locale) -> ChoicePrompt {
    ChoicePrompt {
        message: t(locale, "confirmUnsavedTitle"),
        detail: t(locale, "confirmCloseDetail"),
        buttons: [
            t(locale, "buttonSaveAndClose"),
            t(locale, "buttonCloseWithoutSaving"),
            t(locale, "buttonCancel"),
        ],
    }
}

#[derive(Debug, Default)]
struct WindowEntry {
    state: CloseState,
    permitted: bool,
}

/// 所有窗口的关闭守卫
///
/// 通过 Tauri 的 `manage()` 注册为应用状态，以窗口 label 为 key。
#[derive(Debug, Default)]
pub struct CloseGuard {
    windows: Mutex<HashMap<String, WindowEntry>>,
}

impl CloseGuard {
    /// 创建守卫；窗口在第一次关闭请求时登记
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entry<T>(&self, label: &str, f: impl FnOnce(&mut WindowEntry) -> T) -> T {
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        f(windows.entry(label.to_string()).or_default())
    }

    /// 处理一次关闭请求
    pub fn request_close(&self, label: &str) -> CloseRequest {
        self.with_entry(label, |entry| {
            if entry.permitted {
                CloseRequest::Allow
            } else if entry.state != CloseState::Idle {
                CloseRequest::Suppress
            } else {
                entry.state = CloseState::CheckingDirty;
                CloseRequest::Start
            }
        })
    }

    /// 当前状态；没有记录的窗口视为 `Idle`
    pub fn state(&self, label: &str) -> CloseState {
        let windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        windows.get(label).map(|entry| entry.state).unwrap_or_default()
    }

    /// 闩锁是否已设置
    pub fn is_permitted(&self, label: &str) -> bool {
        let windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        windows.get(label).is_some_and(|entry| entry.permitted)
    }

    /// 窗口销毁后移除记录
    pub fn forget(&self, label: &str) {
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        windows.remove(label);
    }

    /// 推进状态；窗口已被 `forget` 时不重建记录，同名的新窗口仍受守卫保护
    fn transition(&self, label: &str, state: CloseState) {
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        let Some(entry) = windows.get_mut(label) else {
            log::debug!("窗口 {} 已销毁，忽略关闭流程状态 {:?}", label, state);
            return;
        };
        log::debug!("窗口 {} 关闭流程: {:?}", label, state);
        entry.state = state;
        if state == CloseState::Closing {
            entry.permitted = true;
        }
    }

    /// 执行确认流程（须在 `request_close` 返回 `Start` 之后调用）
    ///
    /// # 返回值
    /// - `Close` - 闩锁已设置，调用方应再次关闭窗口
    /// - `StayOpen` - 窗口保持打开，状态回到 `Idle`
    pub async fn run<H: CloseHost>(&self, label: &str, host: &H) -> CloseOutcome {
        self.transition(label, CloseState::CheckingDirty);
        if !host.is_dirty().await {
            self.transition(label, CloseState::Closing);
            return CloseOutcome::Close;
        }

        self.transition(label, CloseState::AwaitingUserChoice);
        match host.confirm_close().await {
            CloseChoice::Cancel => {
                self.transition(label, CloseState::Idle);
                CloseOutcome::StayOpen
            }
            CloseChoice::DiscardAndClose => {
                self.transition(label, CloseState::Closing);
                CloseOutcome::Close
            }
            CloseChoice::SaveAndClose => {
                self.transition(label, CloseState::Saving);
                if host.save_before_exit().await {
                    self.transition(label, CloseState::Closing);
                    CloseOutcome::Close
                } else {
                    log::warn!("窗口 {} 退出前保存失败，取消关闭", label);
                    self.transition(label, CloseState::Idle);
                    CloseOutcome::StayOpen
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct FakeHost {
        dirty: bool,
        choice: CloseChoice,
        save_ok: bool,
        confirms: AtomicUsize,
        saves: AtomicUsize,
    }

    impl FakeHost {
        fn new(dirty: bool, choice: CloseChoice, save_ok: bool) -> Self {
            Self {
                dirty,
                choice,
                save_ok,
                confirms: AtomicUsize::new(0),
                saves: AtomicUsize::new(0),
            }
        }
    }

    impl CloseHost for FakeHost {
        async fn is_dirty(&self) -> bool {
            self.dirty
        }

        async fn confirm_close(&self) -> CloseChoice {
            self.confirms.fetch_add(1, Ordering::SeqCst);
            self.choice
        }

        async fn save_before_exit(&self) -> bool {
            self.saves.fetch_add(1, Ordering::SeqCst);
            self.save_ok
        }
    }

    async fn attempt(guard: &CloseGuard, host: &FakeHost) -> CloseOutcome {
        assert_eq!(guard.request_close("main"), CloseRequest::Start);
        guard.run("main", host).await
    }

    #[tokio::test]
    async fn clean_window_closes_without_prompt() {
        let guard = CloseGuard::new();
        let host = FakeHost::new(false, CloseChoice::Cancel, false);
        assert_eq!(attempt(&guard, &host).await, CloseOutcome::Close);
        assert!(guard.is_permitted("main"));
        assert_eq!(host.confirms.load(Ordering::SeqCst), 0);
        // 程序再次关闭时直接放行
        assert_eq!(guard.request_close("main"), CloseRequest::Allow);
    }

    #[tokio::test]
    async fn cancel_keeps_window_open_without_side_effects() {
        let guard = CloseGuard::new();
        let host = FakeHost::new(true, CloseChoice::Cancel, true);
        assert_eq!(attempt(&guard, &host).await, CloseOutcome::StayOpen);
        assert!(!guard.is_permitted("main"));
        assert_eq!(guard.state("main"), CloseState::Idle);
        assert_eq!(host.saves.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn discard_sets_latch() {
        let guard = CloseGuard::new();
        let host = FakeHost::new(true, CloseChoice::DiscardAndClose, false);
        assert_eq!(attempt(&guard, &host).await, CloseOutcome::Close);
        assert!(guard.is_permitted("main"));
        assert_eq!(host.saves.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_save_keeps_window_open() {
        let guard = CloseGuard::new();
        let host = FakeHost::new(true, CloseChoice::SaveAndClose, false);
        assert_eq!(attempt(&guard, &host).await, CloseOutcome::StayOpen);
        assert!(!guard.is_permitted("main"));
        assert_eq!(host.saves.load(Ordering::SeqCst), 1);
        // 可以重新发起关闭
        assert_eq!(guard.request_close("main"), CloseRequest::Start);
    }

    #[tokio::test]
    async fn successful_save_closes() {
        let guard = CloseGuard::new();
        let host = FakeHost::new(true, CloseChoice::SaveAndClose, true);
        assert_eq!(attempt(&guard, &host).await, CloseOutcome::Close);
        assert!(guard.is_permitted("main"));
    }

    #[test]
    fn second_request_during_workflow_is_suppressed() {
        let guard = CloseGuard::new();
        assert_eq!(guard.request_close("a"), CloseRequest::Start);
        assert_eq!(guard.request_close("a"), CloseRequest::Suppress);
        // 其他窗口互不影响
        assert_eq!(guard.request_close("b"), CloseRequest::Start);
        guard.forget("a");
        assert_eq!(guard.request_close("a"), CloseRequest::Start);
    }

    #[tokio::test]
    async fn workflow_finishing_after_destroy_does_not_latch_new_window() {
        let guard = CloseGuard::new();
        let host = FakeHost::new(false, CloseChoice::Cancel, false);
        assert_eq!(guard.request_close("main"), CloseRequest::Start);
        guard.forget("main");

        assert_eq!(guard.run("main", &host).await, CloseOutcome::Close);
        assert!(!guard.is_permitted("main"));
        assert_eq!(guard.state("main"), CloseState::Idle);
        assert_eq!(guard.request_close("main"), CloseRequest::Start);
    }

    #[test]
    fn prompt_defaults_to_save() {
        let prompt = close_prompt(Locale::EnUs);
        assert_eq!(prompt.buttons[0], "Save and Close");
        assert_eq!(prompt.buttons[2], "Cancel");
        assert_eq!(CloseChoice::from(Choice::Primary), CloseChoice::SaveAndClose);
        assert_eq!(CloseChoice::from(Choice::Cancel), CloseChoice::Cancel);
    }
}
