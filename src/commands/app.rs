//! # 应用级 Tauri Commands
//!
//! - `get_locale` / `set_locale` - 界面语言
//! - `confirm_unsaved_action` - 切换文档等操作前的未保存确认
//! - `get_install_options` / `set_open_at_login` / `mark_install_guide_seen` - 安装引导
//! - `open_default_apps_settings` / `get_md_association_status` - 文件关联
//! - `ui_reply` - 前端回答宿主的 `host:query` 询问

use tauri::{AppHandle, State, WebviewWindow};
use tauri_plugin_opener::OpenerExt;

use crate::desktop::dialogs::TauriDialogs;
use crate::desktop::menu;
use crate::models::app::{InstallOptions, LocaleResult, OkResult, OpenAtLoginResult, UnsavedDecision};
use crate::models::settings::SettingsPatch;
use crate::services::dialogs::{Choice, ChoicePrompt, DialogHost};
use crate::services::locale::{Locale, normalize_locale, t, t_with};
use crate::services::login_item::LoginItem;
use crate::services::platform::{AssociationProbe, AssociationStatus, SystemProbe};
use crate::services::recent::RecentDocumentsStore;
use crate::services::session::AppSession;
use crate::services::settings_store::SettingsStore;
use crate::services::ui_bridge::UiBridge;

// ============ 语言 Commands ============

/// 获取当前界面语言
#[tauri::command]
pub async fn get_locale(session: State<'_, AppSession>) -> Result<LocaleResult, String> {
    Ok(LocaleResult {
        locale: session.locale(),
    })
}

/// 切换界面语言
///
/// 语言标签先归一化（无法识别的回退到 en-US），然后持久化并重建菜单。
///
/// # 参数
/// - `locale` - 任意语言标签，如 `"zh-TW"`、`"en_GB"`
///
/// # 错误
/// 设置写入失败时返回错误（此时当前会话的语言已经切换）
#[tauri::command]
pub async fn set_locale(
    app: AppHandle,
    session: State<'_, AppSession>,
    settings: State<'_, SettingsStore>,
    recent: State<'_, RecentDocumentsStore>,
    locale: Option<String>,
) -> Result<LocaleResult, String> {
    let next = normalize_locale(locale.as_deref());
    session.set_locale(next);
    log::info!("界面语言切换为 {}", next);

    menu::refresh(&app, next, &recent.list().await);
    settings
        .write(SettingsPatch {
            locale: Some(next),
            ..SettingsPatch::default()
        })
        .await?;

    Ok(LocaleResult { locale: next })
}

// ============ 未保存确认 Commands ============

/// 操作前的未保存确认框：保存（默认）/ 不保存 / 取消
pub fn unsaved_action_prompt(locale: Locale, action: Option<&str>) -> ChoicePrompt {
    let action = action
        .filter(|action| !action.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| t(locale, "actionContinue"));
    ChoicePrompt {
        message: t(locale, "confirmUnsavedTitle"),
        detail: t_with(locale, "confirmActionDetail", &[("action", &action)]),
        buttons: [
            t(locale, "buttonSave"),
            t(locale, "buttonDontSave"),
            t(locale, "buttonCancel"),
        ],
    }
}

/// 询问用户如何处理未保存的更改
///
/// # 参数
/// - `action` - 即将执行的操作描述，嵌入提示文案；缺省为“继续操作”
///
/// # 返回值
/// `"save"` / `"discard"` / `"cancel"`
#[tauri::command]
pub async fn confirm_unsaved_action(
    window: WebviewWindow,
    session: State<'_, AppSession>,
    action: Option<String>,
) -> Result<UnsavedDecision, String> {
    let prompt = unsaved_action_prompt(session.locale(), action.as_deref());
    let decision = match TauriDialogs::for_window(&window).choose(prompt).await {
        Choice::Primary => UnsavedDecision::Save,
        Choice::Secondary => UnsavedDecision::Discard,
        Choice::Cancel => UnsavedDecision::Cancel,
    };
    Ok(decision)
}

// ============ 安装引导 Commands ============

/// 获取安装选项
///
/// 开机启动状态以系统中的条目为准，无法查询时使用设置中保存的值。
#[tauri::command]
pub async fn get_install_options(settings: State<'_, SettingsStore>) -> Result<InstallOptions, String> {
    let saved = settings.read().await;
    let registered = match LoginItem::current() {
        Ok(item) => item.is_enabled().await,
        Err(e) => {
            log::debug!("{}", e);
            None
        }
    };

    Ok(InstallOptions {
        open_at_login: registered.unwrap_or(saved.open_at_login),
        install_guide_seen: saved.install_guide_seen,
    })
}

/// 请求中的开机启动开关；未提供视为关闭
fn requested_open_at_login(enabled: Option<bool>) -> bool {
    enabled.unwrap_or(false)
}

/// 设置开机启动
///
/// # 参数
/// - `enabled` - 是否开机启动；缺省视为关闭
///
/// # 错误
/// 系统条目注册失败或设置写入失败时返回错误
#[tauri::command]
pub async fn set_open_at_login(
    settings: State<'_, SettingsStore>,
    enabled: Option<bool>,
) -> Result<OpenAtLoginResult, String> {
    let enabled = requested_open_at_login(enabled);
    LoginItem::current()?.set_enabled(enabled).await?;
    settings
        .write(SettingsPatch {
            open_at_login: Some(enabled),
            ..SettingsPatch::default()
        })
        .await?;

    Ok(OpenAtLoginResult {
        open_at_login: enabled,
    })
}

/// 记录用户已看过安装引导
#[tauri::command]
pub async fn mark_install_guide_seen(settings: State<'_, SettingsStore>) -> Result<OkResult, String> {
    settings
        .write(SettingsPatch {
            install_guide_seen: Some(true),
            ..SettingsPatch::default()
        })
        .await?;
    Ok(OkResult { ok: true })
}

// ============ 文件关联 Commands ============

/// 打开系统的默认应用设置页（仅 Windows）
///
/// # 返回值
/// Windows 上成功打开返回 `{ ok: true }`，其他平台返回 `{ ok: false }`
#[tauri::command]
pub async fn open_default_apps_settings(app: AppHandle) -> Result<OkResult, String> {
    if !cfg!(target_os = "windows") {
        return Ok(OkResult { ok: false });
    }

    app.opener()
        .open_url("ms-settings:defaultapps", None::<&str>)
        .map_err(|e| format!("打开默认应用设置失败: {}", e))?;
    Ok(OkResult { ok: true })
}

/// 查询 `.md` 文件的默认打开程序是否为本应用
#[tauri::command]
pub async fn get_md_association_status() -> Result<AssociationStatus, String> {
    Ok(SystemProbe.probe().await)
}

// ============ 宿主问答 Commands ============

/// 前端回答 `host:query` 询问
///
/// # 参数
/// - `id` - 询问事件中的 ID
/// - `value` - 回答
#[tauri::command]
pub fn ui_reply(bridge: State<'_, UiBridge>, id: u64, value: bool) {
    bridge.resolve(id, value);
}
