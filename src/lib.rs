//! # AinoldMarkdown - Tauri 宿主核心初始化模块
//!
//! 编辑器界面运行在 webview 中，本 crate 是它背后的宿主进程，负责：
//! - 文档的打开、保存与最近文件列表
//! - HTML / PDF 导出与图片资源导入
//! - 本地化的原生应用菜单，菜单点击以 `menu:action` 事件派发给前端
//! - 拦截窗口关闭，避免丢失未保存的更改
//! - 安装引导相关的系统集成（开机启动、`.md` 文件关联）
//!
//! ## 模块结构
//! - `commands/` - Tauri command 处理函数（IPC 接口层）
//! - `models/` - 数据模型（对应前端 TypeScript 类型）
//! - `services/` - 核心业务逻辑，不依赖 Tauri
//! - `desktop/` - 对话框、菜单、窗口事件的 Tauri 适配
//! - `utils/` - 通用工具函数

mod commands;
mod desktop;
mod models;
mod services;
mod utils;

use tauri::Manager;

use desktop::menu::MenuActions;
use services::close_guard::CloseGuard;
use services::recent::RecentDocumentsStore;
use services::session::{AppSession, initial_locale};
use services::settings_store::SettingsStore;
use services::ui_bridge::UiBridge;

/// 启动时初始化应用状态：读取设置、确定界面语言、安装菜单
fn setup_state(app: &tauri::App) -> Result<(), String> {
    let settings = SettingsStore::new(utils::path::settings_path()?);
    let recent = RecentDocumentsStore::new(utils::path::recent_files_path()?);

    let (locale, recent_files) = tauri::async_runtime::block_on(async {
        let saved = settings.read().await;
        (initial_locale(&saved), recent.list().await)
    });
    log::info!("界面语言: {}，最近文件 {} 个", locale, recent_files.len());

    app.manage(AppSession::new(locale));
    app.manage(settings);
    app.manage(recent);

    desktop::menu::install(app.handle(), &services::menu::build(locale, &recent_files))
        .map_err(|e| format!("安装应用菜单失败: {}", e))
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
/// Tauri 应用启动函数
///
/// # Panics
/// Tauri 应用启动失败（例如配置文件缺失或窗口创建失败）时 panic。
pub fn run() {
    tauri::Builder::default()
        // === 官方插件注册 ===
        .plugin(tauri_plugin_dialog::init())
        // Opener 插件：打开系统的默认应用设置页
        .plugin(tauri_plugin_opener::init())
        // === 不依赖磁盘的应用状态 ===
        .manage(CloseGuard::new())
        .manage(UiBridge::new())
        .manage(MenuActions::new())
        .invoke_handler(tauri::generate_handler![
            // 文档 commands
            commands::document::open_markdown,
            commands::document::open_recent_markdown,
            commands::document::get_recent_files,
            commands::document::save_markdown,
            commands::document::save_markdown_as,
            // 导出 commands
            commands::export::export_html,
            commands::export::export_pdf,
            // 图片资源 commands
            commands::assets::import_image_file,
            commands::assets::save_pasted_image,
            // 应用 commands
            commands::app::get_locale,
            commands::app::set_locale,
            commands::app::confirm_unsaved_action,
            commands::app::get_install_options,
            commands::app::set_open_at_login,
            commands::app::mark_install_guide_seen,
            commands::app::open_default_apps_settings,
            commands::app::get_md_association_status,
            commands::app::ui_reply,
        ])
        .on_menu_event(|app, event| desktop::menu::handle_menu_event(app, &event.id().0))
        .on_window_event(desktop::window::handle_window_event)
        .setup(|app| {
            let level = if cfg!(debug_assertions) {
                log::LevelFilter::Debug
            } else {
                log::LevelFilter::Info
            };
            app.handle()
                .plugin(tauri_plugin_log::Builder::default().level(level).build())?;

            setup_state(app)?;
            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
