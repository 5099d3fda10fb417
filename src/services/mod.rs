//! # 业务逻辑服务模块
//!
//! 包含核心业务逻辑的实现，与 Tauri command 层解耦：
//! - `locale` - 语言归一化与界面文案
//! - `session` - 进程级的当前语言
//! - `storage` - JSON 记录文件的读写
//! - `settings_store` / `recent` - 设置与最近文件的持久化
//! - `menu` - 菜单合成器（纯函数）
//! - `dialogs` - 原生对话框抽象
//! - `persistence` - 打开 / 保存 / 另存为流程
//! - `export` / `pdf` - HTML 与 PDF 导出、离屏渲染面
//! - `assets` - 图片资源导入
//! - `close_guard` / `ui_bridge` - 窗口关闭确认与宿主 → 前端问答
//! - `platform` / `login_item` - 文件关联探测与开机启动

pub mod assets;
pub mod close_guard;
pub mod dialogs;
pub mod export;
pub mod locale;
pub mod login_item;
pub mod menu;
pub mod pdf;
pub mod persistence;
pub mod platform;
pub mod recent;
pub mod session;
pub mod settings_store;
pub mod storage;
pub mod ui_bridge;
