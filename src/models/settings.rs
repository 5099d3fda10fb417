//! # 持久化记录数据模型
//!
//! 定义应用设置（`AppSettings`）、设置补丁（`SettingsPatch`）
//! 以及最近文件记录（`RecentDocumentsRecord`）的 Rust 结构体。
//!
//! 两个记录都带有 `version` 字段。早期版本写出的文件没有版本号，
//! 读取时通过 `migrate_*` 逐字段宽松迁移：能识别的字段保留，无法识别的丢弃，
//! 未知 key 原样保留在 `extra` 中，避免读后写时丢字段。

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::services::locale::{Locale, normalize_locale};

/// 设置记录的当前版本号
pub const SETTINGS_VERSION: u32 = 1;

/// 最近文件记录的当前版本号
pub const RECENT_VERSION: u32 = 1;

/// 应用设置
///
/// 对应用户配置目录下的 `settings.json`。
///
/// 对应前端 TypeScript 接口（部分字段）：
/// ```typescript
/// interface InstallOptions {
///   openAtLogin: boolean;
///   installGuideSeen: boolean;
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// 记录格式版本
    pub version: u32,

    /// 用户选择的界面语言；`None` 表示跟随系统
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<Locale>,

    /// 是否登录系统时自动启动
    #[serde(default)]
    pub open_at_login: bool,

    /// 是否已看过安装引导
    #[serde(default)]
    pub install_guide_seen: bool,

    /// 未知字段：原样保留
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            locale: None,
            open_at_login: false,
            install_guide_seen: false,
            extra: Map::new(),
        }
    }
}

/// 设置补丁（merge-patch）
///
/// 只有 `Some` 的字段会覆盖现有设置，其余字段保持不变。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsPatch {
    pub locale: Option<Locale>,
    pub open_at_login: Option<bool>,
    pub install_guide_seen: Option<bool>,
}

impl SettingsPatch {
    /// 将补丁浅合并到现有设置上，补丁字段优先
    pub fn apply(&self, mut settings: AppSettings) -> AppSettings {
        if let Some(locale) = self.locale {
            settings.locale = Some(locale);
        }
        if let Some(enabled) = self.open_at_login {
            settings.open_at_login = enabled;
        }
        if let Some(seen) = self.install_guide_seen {
            settings.install_guide_seen = seen;
        }
        settings.version = SETTINGS_VERSION;
        settings
    }
}

/// 将磁盘上的任意 JSON 值迁移为 `AppSettings`
///
/// - 非对象 → 默认设置
/// - 逐字段宽松解析：`locale` 重新归一化，布尔字段按 JS 真值语义转换
/// - 其余 key 进入 `extra`
pub fn migrate_settings(raw: Value) -> AppSettings {
    let Value::Object(mut map) = raw else {
        return AppSettings::default();
    };

    map.remove("version");
    let locale = map
        .remove("locale")
        .and_then(|v| v.as_str().map(|tag| normalize_locale(Some(tag))));
    let open_at_login = map.remove("openAtLogin").is_some_and(|v| truthy(&v));
    let install_guide_seen = map.remove("installGuideSeen").is_some_and(|v| truthy(&v));

    AppSettings {
        version: SETTINGS_VERSION,
        locale,
        open_at_login,
        install_guide_seen,
        extra: map,
    }
}

/// JS 风格的真值判断：旧版前端写入的值可能是 `1`、`"yes"` 等
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// 最近文件记录
///
/// 对应用户配置目录下的 `recent-files.json`：
/// ```json
/// { "version": 1, "files": ["/path/a.md", "/path/b.md"] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentDocumentsRecord {
    pub version: u32,
    pub files: Vec<PathBuf>,
}

impl RecentDocumentsRecord {
    /// 以当前格式版本包装文件列表
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self {
            version: RECENT_VERSION,
            files,
        }
    }
}

/// 将磁盘上的任意 JSON 值迁移为最近文件列表
///
/// 兼容无版本号的旧格式 `{ "files": [...] }`；`files` 不是数组时返回空列表，
/// 数组中的非字符串、空字符串条目静默丢弃。
pub fn migrate_recent(raw: Value) -> Vec<PathBuf> {
    let Some(Value::Array(files)) = raw.get("files") else {
        return Vec::new();
    };

    files
        .iter()
        .filter_map(Value::as_str)
        .filter(|path| !path.trim().is_empty())
        .map(PathBuf::from)
        .collect()
}
