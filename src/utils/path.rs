//! # 路径工具函数
//!
//! 提供与应用数据位置相关的工具函数，包括：
//! - 获取 AinoldMarkdown 配置目录（`<config>/AinoldMarkdown/`）
//! - 设置文件与最近文件列表的路径
//! - 开机启动条目所在的系统目录

use std::path::PathBuf;

/// 应用目录名
pub const APP_DIR_NAME: &str = "AinoldMarkdown";

/// 获取 AinoldMarkdown 配置目录的绝对路径
///
/// 使用 `dirs` crate 获取跨平台的用户配置目录。
///
/// # 返回值
/// - Windows: `C:\Users\username\AppData\Roaming\AinoldMarkdown`
/// - macOS: `/Users/username/Library/Application Support/AinoldMarkdown`
/// - Linux: `/home/username/.config/AinoldMarkdown`
///
/// # 错误
/// 无法确定用户配置目录时返回错误信息。
pub fn get_app_config_path() -> Result<PathBuf, String> {
    let config = dirs::config_dir().ok_or_else(|| "无法获取用户配置目录".to_string())?;
    Ok(config.join(APP_DIR_NAME))
}

/// 设置文件路径：`<配置目录>/settings.json`
pub fn settings_path() -> Result<PathBuf, String> {
    Ok(get_app_config_path()?.join("settings.json"))
}

/// 最近文件列表路径：`<配置目录>/recent-files.json`
pub fn recent_files_path() -> Result<PathBuf, String> {
    Ok(get_app_config_path()?.join("recent-files.json"))
}

/// XDG 开机自启目录：`~/.config/autostart`
pub fn autostart_dir() -> Result<PathBuf, String> {
    let config = dirs::config_dir().ok_or_else(|| "无法获取用户配置目录".to_string())?;
    Ok(config.join("autostart"))
}

/// macOS 用户级 LaunchAgents 目录：`~/Library/LaunchAgents`
pub fn launch_agents_dir() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or_else(|| "无法获取用户主目录".to_string())?;
    Ok(home.join("Library").join("LaunchAgents"))
}
