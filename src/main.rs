//! # AinoldMarkdown - 桌面宿主原生入口点
//!
//! `main.rs` 只负责启动应用，核心逻辑位于 `lib.rs`（`app_lib::run()`）。

// Prevents additional console window on Windows in release, DO NOT REMOVE!!
// Release 构建下将 Windows 子系统设为 GUI，避免弹出控制台窗口
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

fn main() {
    app_lib::run();
}
