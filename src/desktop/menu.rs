//! # 原生应用菜单
//!
//! 把 `services::menu::build` 生成的菜单描述转换为 Tauri 原生菜单并整体替换，
//! 同时维护“菜单项 ID → 动作”表，菜单点击时据此向聚焦窗口派发 `menu:action` 事件。

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use tauri::menu::{Menu, MenuItem, PredefinedMenuItem, Submenu};
use tauri::{AppHandle, Emitter, EventTarget, Manager, WebviewWindow, Wry};

use crate::models::menu::{MenuAction, MenuDescription, MenuNode, StandardRole};
use crate::services::locale::Locale;
use crate::services::menu;

/// 事件名：菜单动作
pub const MENU_EVENT: &str = "menu:action";

/// 全屏切换菜单项的原生 ID（由宿主直接处理）
pub const FULLSCREEN_ITEM_ID: &str = "view.toggleFullscreen";

#[cfg(target_os = "macos")]
const FULLSCREEN_ACCELERATOR: &str = "Ctrl+Cmd+F";
#[cfg(not(target_os = "macos"))]
const FULLSCREEN_ACCELERATOR: &str = "F11";

/// 当前菜单的动作表
///
/// 通过 Tauri 的 `manage()` 注册为应用状态，每次重建菜单时整体替换。
#[derive(Debug, Default)]
pub struct MenuActions {
    actions: Mutex<HashMap<String, MenuAction>>,
}

impl MenuActions {
    /// 创建空的动作表，菜单安装时再填充
    pub fn new() -> Self {
        Self::default()
    }

    /// 用新的菜单描述替换动作表
    pub fn replace(&self, description: &MenuDescription) {
        let table = description
            .items()
            .into_iter()
            .filter_map(|item| item.action.clone().map(|action| (item.id.clone(), action)))
            .collect();
        *self.actions.lock().unwrap_or_else(|e| e.into_inner()) = table;
    }

    /// 按菜单项 ID 查找动作
    ///
    /// # 参数
    /// - `id` - 原生菜单事件携带的菜单项 ID
    ///
    /// # 返回值
    /// 对应的前端动作；分隔线、系统角色或未知 ID 返回 `None`
    pub fn lookup(&self, id: &str) -> Option<MenuAction> {
        self.actions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
    }
}

fn build_submenu(app: &AppHandle, label: &str, children: &[MenuNode]) -> tauri::Result<Submenu<Wry>> {
    let submenu = Submenu::new(app, label, true)?;
    for child in children {
        match child {
            MenuNode::Item(spec) => {
                let item = MenuItem::with_id(app, &spec.id, &spec.label, spec.enabled, spec.accelerator)?;
                submenu.append(&item)?;
            }
            MenuNode::Separator => submenu.append(&PredefinedMenuItem::separator(app)?)?,
            MenuNode::Role { role, label } => {
                let text = Some(label.as_str());
                match role {
                    StandardRole::Cut => submenu.append(&PredefinedMenuItem::cut(app, text)?)?,
                    StandardRole::Copy => submenu.append(&PredefinedMenuItem::copy(app, text)?)?,
                    StandardRole::Paste => submenu.append(&PredefinedMenuItem::paste(app, text)?)?,
                    StandardRole::SelectAll => {
                        submenu.append(&PredefinedMenuItem::select_all(app, text)?)?
                    }
                    StandardRole::ToggleFullscreen => {
                        let item = MenuItem::with_id(
                            app,
                            FULLSCREEN_ITEM_ID,
                            label,
                            true,
                            Some(FULLSCREEN_ACCELERATOR),
                        )?;
                        submenu.append(&item)?;
                    }
                }
            }
            MenuNode::Submenu { label, children } => {
                submenu.append(&build_submenu(app, label, children)?)?;
            }
        }
    }
    Ok(submenu)
}

/// 安装菜单描述：构建原生菜单、设为应用菜单并替换动作表
pub fn install(app: &AppHandle, description: &MenuDescription) -> tauri::Result<()> {
    let native = Menu::new(app)?;
    for node in &description.menus {
        if let MenuNode::Submenu { label, children } = node {
            native.append(&build_submenu(app, label, children)?)?;
        }
    }
    app.set_menu(native)?;
    app.state::<MenuActions>().replace(description);
    Ok(())
}

/// 按当前语言与最近文件列表重建菜单
///
/// 菜单重建失败只记录日志，不影响触发重建的操作本身。
pub fn refresh(app: &AppHandle, locale: Locale, recent: &[PathBuf]) {
    if let Err(e) = install(app, &menu::build(locale, recent)) {
        log::warn!("重建应用菜单失败: {}", e);
    }
}

/// 派发目标窗口：聚焦窗口优先，否则任取一个
pub fn target_window(app: &AppHandle) -> Option<WebviewWindow> {
    let windows = app.webview_windows();
    windows
        .values()
        .find(|window| window.is_focused().unwrap_or(false))
        .or_else(|| windows.values().next())
        .cloned()
}

/// 处理原生菜单点击
pub fn handle_menu_event(app: &AppHandle, id: &str) {
    if id == FULLSCREEN_ITEM_ID {
        if let Some(window) = target_window(app) {
            let next = !window.is_fullscreen().unwrap_or(false);
            if let Err(e) = window.set_fullscreen(next) {
                log::warn!("切换全屏失败: {}", e);
            }
        }
        return;
    }

    // 系统角色菜单项不在动作表中，由系统自行处理
    let Some(action) = app.state::<MenuActions>().lookup(id) else {
        return;
    };
    let Some(window) = target_window(app) else {
        log::debug!("没有可接收菜单动作 {} 的窗口", action.id);
        return;
    };

    log::debug!("派发菜单动作 {} → {}", action.id, window.label());
    if let Err(e) = app.emit_to(
        EventTarget::webview_window(window.label()),
        MENU_EVENT,
        &action,
    ) {
        log::warn!("派发菜单动作失败: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_table_follows_latest_menu() {
        let actions = MenuActions::new();
        let recent = vec![PathBuf::from("/docs/a.md")];
        actions.replace(&menu::build(Locale::EnUs, &recent));

        assert_eq!(actions.lookup("file.save").map(|a| a.id), Some("file.save".into()));
        let open_recent = actions.lookup("file.openRecent.0").unwrap();
        assert_eq!(open_recent.id, "file.openRecent");
        assert!(actions.lookup("file.openRecent.empty").is_none());

        actions.replace(&menu::build(Locale::EnUs, &[]));
        assert!(actions.lookup("file.openRecent.0").is_none());
    }
}
