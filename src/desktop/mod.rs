//! # 桌面宿主适配层
//!
//! 把服务层的抽象接到 Tauri 上：
//! - `dialogs` - `DialogHost` 的原生对话框实现
//! - `menu` - 原生菜单安装与菜单动作派发
//! - `window` - 窗口关闭拦截与宿主 → 前端问答

pub mod dialogs;
pub mod menu;
pub mod window;
