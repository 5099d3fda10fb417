//! # 开机启动
//!
//! 把当前可执行文件注册为用户登录后自动启动的程序：
//! - Windows：`HKCU\Software\Microsoft\Windows\CurrentVersion\Run` 下的字符串值
//! - macOS：`~/Library/LaunchAgents/com.ainold.markdown.plist`
//! - Linux：`~/.config/autostart/com.ainold.markdown.desktop`
//!
//! 是否启用以系统中的条目为准；查询失败时由调用方回落到设置中保存的标志。

use std::path::{Path, PathBuf};

use crate::services::export::escape_html;

/// Run 键下的值名称
pub const RUN_VALUE_NAME: &str = "AinoldMarkdown";

/// LaunchAgent label / 桌面条目 ID
pub const ENTRY_ID: &str = "com.ainold.markdown";

#[cfg(target_os = "windows")]
const RUN_KEY: &str = r"HKCU\Software\Microsoft\Windows\CurrentVersion\Run";

/// 生成 macOS LaunchAgent plist
pub fn launch_agent_plist(exe: &Path) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
  <key>Label</key>
  <string>{}</string>
  <key>ProgramArguments</key>
  <array>
    <string>{}</string>
  </array>
  <key>RunAtLoad</key>
  <true/>
</dict>
</plist>
"#,
        ENTRY_ID,
        escape_html(&exe.to_string_lossy())
    )
}

/// 按 Desktop Entry 规范给 `Exec` 参数加引号
///
/// 双引号内的 `"`、`` ` ``、`$`、`\` 需要反斜杠转义。
pub fn desktop_exec_quote(path: &Path) -> String {
    let mut out = String::from("\"");
    for ch in path.to_string_lossy().chars() {
        if matches!(ch, '"' | '`' | '$' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

/// 生成 XDG autostart 桌面条目
pub fn autostart_entry(exe: &Path) -> String {
    format!(
        "[Desktop Entry]\n\
         Type=Application\n\
         Name=AinoldMarkdown\n\
         Exec={}\n\
         Terminal=false\n\
         X-GNOME-Autostart-enabled=true\n",
        desktop_exec_quote(exe)
    )
}

/// 以单个文件表示的登录启动条目（LaunchAgent / autostart）
#[derive(Debug, Clone)]
pub struct EntryFile {
    path: PathBuf,
}

impl EntryFile {
    /// # 参数
    /// - `dir` - 条目所在目录（`LaunchAgents` 或 `autostart`）
    /// - `file_name` - 条目文件名
    pub fn new(dir: &Path, file_name: &str) -> Self {
        Self {
            path: dir.join(file_name),
        }
    }

    /// 写入条目，目录不存在时一并创建
    ///
    /// # 错误
    /// 目录创建或文件写入失败时返回错误
    pub async fn enable(&self, content: &str) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| format!("创建开机启动目录失败: {}", e))?;
        }
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| format!("写入开机启动条目失败: {}", e))
    }

    /// 删除条目；条目本来就不存在时视为成功
    pub async fn disable(&self) -> Result<(), String> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(format!("删除开机启动条目失败: {}", e)),
        }
    }

    /// 条目是否存在；无法判断时返回 `None`
    pub async fn exists(&self) -> Option<bool> {
        tokio::fs::try_exists(&self.path).await.ok()
    }
}

/// 当前可执行文件的登录启动项
#[derive(Debug, Clone)]
pub struct LoginItem {
    exe: PathBuf,
}

impl LoginItem {
    /// # 参数
    /// - `exe` - 登录时要启动的可执行文件
    pub fn new(exe: impl Into<PathBuf>) -> Self {
        Self { exe: exe.into() }
    }

    /// 以当前进程的可执行文件创建
    pub fn current() -> Result<Self, String> {
        let exe = std::env::current_exe().map_err(|e| format!("无法获取可执行文件路径: {}", e))?;
        Ok(Self::new(exe))
    }

    #[cfg(target_os = "macos")]
    fn entry_file() -> Result<EntryFile, String> {
        let dir = crate::utils::path::launch_agents_dir()?;
        Ok(EntryFile::new(&dir, &format!("{}.plist", ENTRY_ID)))
    }

    #[cfg(target_os = "linux")]
    fn entry_file() -> Result<EntryFile, String> {
        let dir = crate::utils::path::autostart_dir()?;
        Ok(EntryFile::new(&dir, &format!("{}.desktop", ENTRY_ID)))
    }

    /// 注册或取消开机启动
    ///
    /// # 错误
    /// 系统条目写入 / 删除失败，或平台不支持时返回错误
    pub async fn set_enabled(&self, enabled: bool) -> Result<(), String> {
        log::info!("设置开机启动: {}", enabled);

        #[cfg(target_os = "windows")]
        {
            use crate::services::platform::run_quiet;

            if enabled {
                let value = format!("\"{}\"", self.exe.display());
                run_quiet(
                    "reg",
                    &["add", RUN_KEY, "/v", RUN_VALUE_NAME, "/t", "REG_SZ", "/d", &value, "/f"],
                )
                .await?;
            } else if self.is_enabled().await != Some(false) {
                run_quiet("reg", &["delete", RUN_KEY, "/v", RUN_VALUE_NAME, "/f"]).await?;
            }
            Ok(())
        }

        #[cfg(target_os = "macos")]
        {
            let entry = Self::entry_file()?;
            if enabled {
                entry.enable(&launch_agent_plist(&self.exe)).await
            } else {
                entry.disable().await
            }
        }

        #[cfg(target_os = "linux")]
        {
            let entry = Self::entry_file()?;
            if enabled {
                entry.enable(&autostart_entry(&self.exe)).await
            } else {
                entry.disable().await
            }
        }

        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            let _ = &self.exe;
            Err("当前平台不支持开机启动".to_string())
        }
    }

    /// 查询系统中是否已注册开机启动；无法确定时返回 `None`
    pub async fn is_enabled(&self) -> Option<bool> {
        #[cfg(target_os = "windows")]
        {
            use crate::services::platform::run_quiet;

            // 值不存在时 reg 以非零退出码结束
            Some(
                run_quiet("reg", &["query", RUN_KEY, "/v", RUN_VALUE_NAME])
                    .await
                    .is_ok(),
            )
        }

        #[cfg(any(target_os = "macos", target_os = "linux"))]
        {
            Self::entry_file().ok()?.exists().await
        }

        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }
}
