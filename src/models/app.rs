//! # 应用级 IPC 数据结构
//!
//! 语言、安装选项与未保存确认等 command 的返回值。

use serde::Serialize;

use crate::services::locale::Locale;

/// `{ locale: "zh-CN" | "en-US" }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LocaleResult {
    pub locale: Locale,
}

/// 安装选项
///
/// ```typescript
/// interface InstallOptions { openAtLogin: boolean; installGuideSeen: boolean; }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallOptions {
    pub open_at_login: bool,
    pub install_guide_seen: bool,
}

/// `{ openAtLogin: boolean }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenAtLoginResult {
    pub open_at_login: bool,
}

/// `{ ok: boolean }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OkResult {
    pub ok: bool,
}

/// 前端在切换文档等操作前询问未保存更改时，用户的选择
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnsavedDecision {
    Save,
    Discard,
    Cancel,
}
