//! # 数据模型模块
//!
//! 定义了与前端 TypeScript 类型一一对应的 Rust 数据结构，用于 Tauri IPC 传输和 JSON 文件读写。
//! - `settings` - 设置记录与最近文件记录（含旧格式迁移）
//! - `document` - 打开 / 保存 / 导出 / 图片导入的结果
//! - `menu` - 菜单描述树与菜单动作
//! - `app` - 语言、安装选项等应用级返回值

pub mod app;
pub mod document;
pub mod menu;
pub mod settings;
