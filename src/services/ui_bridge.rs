//! # 宿主 → 前端 问答通道
//!
//! Tauri 的 `eval` 拿不到返回值，宿主需要向前端“提问”时采用事件 + 回复：
//! 1. 登记一个请求 ID 与对应的 oneshot 发送端
//! 2. 向目标窗口发送 `host:query` 事件 `{ id, kind }`
//! 3. 前端处理后调用 `ui_reply` command 回传 `{ id, value }`
//! 4. 等待端在超时内拿到回答；超时、发送端丢弃、事件发送失败都按 `false` 处理
//!
//! 前端没有注册对应钩子时不会回复，等待端超时后得到 `false`，不会无限挂起。

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::oneshot;

/// 事件名：宿主向前端提问
pub const QUERY_EVENT: &str = "host:query";

/// 查询前端是否有未保存更改的超时
pub const DIRTY_QUERY_TIMEOUT: Duration = Duration::from_secs(3);

/// 等待前端退出前保存的超时（保存可能会弹出另存为对话框）
pub const SAVE_QUERY_TIMEOUT: Duration = Duration::from_secs(120);

/// 提问类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum QueryKind {
    /// 是否有未保存的更改
    IsDirty,
    /// 退出前保存，回答是否保存成功
    SaveBeforeExit,
}

/// `host:query` 事件内容
#[derive(Debug, Clone, Serialize)]
pub struct QueryEvent {
    pub id: u64,
    pub kind: QueryKind,
}

/// 待回复的问题表
///
/// 通过 Tauri 的 `manage()` 注册为应用状态。
#[derive(Debug, Default)]
pub struct UiBridge {
    next_id: AtomicU64,
    pending: Mutex<HashMap<u64, oneshot::Sender<bool>>>,
}

impl UiBridge {
    /// 创建没有待答问题的问答桥
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记一个新问题，返回问题 ID 与接收端
    pub fn register(&self) -> (u64, oneshot::Receiver<bool>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, tx);
        (id, rx)
    }

    /// 前端回复；未知或已过期的 ID 返回 `false`
    pub fn resolve(&self, id: u64, value: bool) -> bool {
        let sender = self
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&id);
        match sender {
            Some(tx) => tx.send(value).is_ok(),
            None => {
                log::debug!("忽略过期的前端回复 #{}", id);
                false
            }
        }
    }

    /// 放弃一个问题（事件发送失败或超时）
    pub fn cancel(&self, id: u64) {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&id);
    }

    /// 在超时内等待回答，任何失败都视为 `false`
    pub async fn wait(&self, id: u64, rx: oneshot::Receiver<bool>, timeout: Duration) -> bool {
        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(value)) => value,
            Ok(Err(_)) => false,
            Err(_) => {
                log::warn!("前端未在 {:?} 内回复问题 #{}", timeout, id);
                self.cancel(id);
                false
            }
        }
    }

    /// 当前未回复的问题数量
    pub fn pending_count(&self) -> usize {
        self.pending.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn reply_is_delivered() {
        let bridge = Arc::new(UiBridge::new());
        let (id, rx) = bridge.register();

        let replier = Arc::clone(&bridge);
        tokio::spawn(async move {
            assert!(replier.resolve(id, true));
        });

        assert!(bridge.wait(id, rx, Duration::from_secs(5)).await);
        assert_eq!(bridge.pending_count(), 0);
    }

    #[tokio::test]
    async fn silence_times_out_as_false() {
        let bridge = UiBridge::new();
        let (id, rx) = bridge.register();
        assert!(!bridge.wait(id, rx, Duration::from_millis(20)).await);
        assert_eq!(bridge.pending_count(), 0);
        // 超时后迟到的回复被忽略
        assert!(!bridge.resolve(id, true));
    }

    #[tokio::test]
    async fn cancelled_question_resolves_false() {
        let bridge = UiBridge::new();
        let (id, rx) = bridge.register();
        bridge.cancel(id);
        assert!(!bridge.wait(id, rx, Duration::from_secs(5)).await);
    }

    #[test]
    fn ids_are_unique() {
        let bridge = UiBridge::new();
        let (a, _ra) = bridge.register();
        let (b, _rb) = bridge.register();
        assert_ne!(a, b);
        assert_eq!(bridge.pending_count(), 2);
    }

    #[test]
    fn query_event_shape() {
        let event = QueryEvent {
            id: 7,
            kind: QueryKind::SaveBeforeExit,
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            serde_json::json!({ "id": 7, "kind": "saveBeforeExit" })
        );
    }
}
