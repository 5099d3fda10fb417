//! # 应用会话
//!
//! 保存进程级的当前界面语言。通过 Tauri 的 `manage()` 注册为应用状态，
//! command 与窗口事件处理从这里取出 `Locale` 再显式传给各个服务。

use std::sync::RwLock;

use crate::models::settings::AppSettings;
use crate::services::locale::{Locale, system_locale};

/// 进程级会话状态
#[derive(Debug, Default)]
pub struct AppSession {
    locale: RwLock<Locale>,
}

impl AppSession {
    /// 以启动时确定的语言创建会话
    ///
    /// # 参数
    /// - `locale` - 初始界面语言，见 `initial_locale`
    pub fn new(locale: Locale) -> Self {
        Self {
            locale: RwLock::new(locale),
        }
    }

    /// 当前界面语言
    pub fn locale(&self) -> Locale {
        *self.locale.read().unwrap_or_else(|e| e.into_inner())
    }

    /// 切换界面语言；只影响内存中的会话，持久化由调用方负责
    pub fn set_locale(&self, locale: Locale) {
        *self.locale.write().unwrap_or_else(|e| e.into_inner()) = locale;
    }
}

/// 启动时的界面语言：设置中保存的语言优先，否则跟随系统
pub fn initial_locale(settings: &AppSettings) -> Locale {
    settings.locale.unwrap_or_else(system_locale)
}
