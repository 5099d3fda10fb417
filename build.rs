//! # AinoldMarkdown - Tauri Cargo 构建脚本
//!
//! 在编译主项目之前由 Cargo 自动执行。Tauri 借此完成：
//! - 读取 `tauri.conf.json` 并生成运行时所需的资源绑定代码
//! - 处理应用图标与 `capabilities/` 下的权限清单
//! - 在 Windows 平台上生成应用程序清单（manifest）和资源文件（.rc）

/// 构建脚本入口函数
fn main() {
  tauri_build::build()
}
