//! # Tauri Command 处理模块
//!
//! 本模块包含所有注册到 Tauri 的 command 处理函数。
//! 每个子模块对应一个功能域：
//! - `document` - 打开、保存、最近文件
//! - `export` - HTML / PDF 导出
//! - `assets` - 图片资源导入
//! - `app` - 语言、安装引导、文件关联、宿主问答

pub mod app;
pub mod assets;
pub mod document;
pub mod export;
