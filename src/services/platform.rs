//! # 平台探测
//!
//! 查询 `.md` 文件的默认打开程序是否为 AinoldMarkdown。
//! 各平台的查询方式：
//! - Windows：先查 `HKCU\…\FileExts\.md\UserChoice` 的 `ProgId`，失败再查 `HKCR\.md` 默认值
//! - Linux：`xdg-mime query default text/markdown`
//! - 其他平台：直接返回 `unknown`
//!
//! 任何查询失败（命令不存在、超时、输出无法解析）都回落为 `unknown`，不会返回错误。

use std::future::Future;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Serialize;

/// 外部查询命令的超时
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// 用于识别本应用 ProgId / 桌面条目的关键字（小写比较）
const APP_MARKERS: [&str; 2] = ["ainold", "com.ainold.markdown"];

/// `reg query … /v ProgId` 输出中的值
static PROG_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)ProgId\s+REG_SZ\s+([^\r\n]+)").unwrap());

/// `reg query … /ve` 输出中的默认值
static DEFAULT_VALUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)REG_SZ\s+([^\r\n]+)").unwrap());

/// 关联状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationState {
    Associated,
    NotAssociated,
    Unknown,
}

/// `.md` 关联查询结果
///
/// ```typescript
/// { status: "associated" | "not_associated" | "unknown"; detail: string }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssociationStatus {
    pub status: AssociationState,
    pub detail: String,
}

impl AssociationStatus {
    fn new(status: AssociationState, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    /// 无法判断关联状态时的结果
    pub fn unknown(detail: impl Into<String>) -> Self {
        Self::new(AssociationState::Unknown, detail)
    }
}

/// 文件关联探测器
pub trait AssociationProbe: Send + Sync {
    fn probe(&self) -> impl Future<Output = AssociationStatus> + Send;
}

/// 从 `reg query … /v ProgId` 的输出中提取 ProgId
pub fn parse_reg_prog_id(stdout: &str) -> Option<String> {
    PROG_ID_RE
        .captures(stdout)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|value| !value.is_empty())
}

/// 从 `reg query … /ve` 的输出中提取默认值
pub fn parse_reg_default_value(stdout: &str) -> Option<String> {
    DEFAULT_VALUE_RE
        .captures(stdout)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|value| !value.is_empty())
}

/// ProgId / 桌面条目是否属于本应用
pub fn is_ainold_handler(id: &str) -> bool {
    let lower = id.to_lowercase();
    APP_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// 根据 Windows 两级注册表查询结果判定关联状态
///
/// # 参数
/// - `user_choice` - `UserChoice` 查询的标准输出（查询失败为 `None`）
/// - `class_root` - `HKCR\.md` 查询的标准输出（查询失败或未执行为 `None`）
pub fn classify_windows(user_choice: Option<&str>, class_root: Option<&str>) -> AssociationStatus {
    if let Some(prog_id) = user_choice.and_then(parse_reg_prog_id) {
        return if is_ainold_handler(&prog_id) {
            AssociationStatus::new(AssociationState::Associated, format!("ProgId: {}", prog_id))
        } else {
            AssociationStatus::new(
                AssociationState::NotAssociated,
                format!("Current ProgId: {}", prog_id),
            )
        };
    }

    if let Some(prog_id) = class_root.and_then(parse_reg_default_value) {
        let state = if is_ainold_handler(&prog_id) {
            AssociationState::Associated
        } else {
            AssociationState::NotAssociated
        };
        return AssociationStatus::new(state, format!("HKCR ProgId: {}", prog_id));
    }

    AssociationStatus::unknown("Cannot determine .md association from registry.")
}

/// 根据 `xdg-mime query default` 的输出判定关联状态
pub fn classify_xdg(stdout: Option<&str>) -> AssociationStatus {
    match stdout.map(str::trim).filter(|entry| !entry.is_empty()) {
        Some(entry) if is_ainold_handler(entry) => {
            AssociationStatus::new(AssociationState::Associated, format!("Desktop entry: {}", entry))
        }
        Some(entry) => AssociationStatus::new(
            AssociationState::NotAssociated,
            format!("Current desktop entry: {}", entry),
        ),
        None => AssociationStatus::unknown("Cannot determine .md association from xdg-mime."),
    }
}

/// 静默运行一个外部命令，成功时返回标准输出
///
/// 命令不存在、超时或退出码非零时返回错误。子进程设置了 `kill_on_drop`，
/// 超时后会被回收；Windows 上不弹出控制台窗口。
pub(crate) async fn run_quiet(program: &str, args: &[&str]) -> Result<String, String> {
    let mut command = tokio::process::Command::new(program);
    command.args(args).kill_on_drop(true);

    #[cfg(target_os = "windows")]
    {
        // CREATE_NO_WINDOW: 不为子进程创建控制台窗口
        const CREATE_NO_WINDOW: u32 = 0x08000000;
        command.creation_flags(CREATE_NO_WINDOW);
    }

    let output = tokio::time::timeout(PROBE_TIMEOUT, command.output())
        .await
        .map_err(|_| format!("{} 执行超时", program))?
        .map_err(|e| format!("执行 {} 失败: {}", program, e))?;

    if !output.status.success() {
        return Err(format!(
            "{} 退出码 {:?}: {}",
            program,
            output.status.code(),
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// 基于系统命令的探测器
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProbe;

impl AssociationProbe for SystemProbe {
    async fn probe(&self) -> AssociationStatus {
        let status = probe_host().await;
        if status.status == AssociationState::Unknown {
            log::debug!(".md 关联状态未知: {}", status.detail);
        }
        status
    }
}

#[cfg(target_os = "windows")]
async fn probe_host() -> AssociationStatus {
    let user_choice = run_quiet(
        "reg",
        &[
            "query",
            r"HKCU\Software\Microsoft\Windows\CurrentVersion\Explorer\FileExts\.md\UserChoice",
            "/v",
            "ProgId",
        ],
    )
    .await
    .map_err(|e| log::debug!("UserChoice 查询失败: {}", e))
    .ok();

    let decided = classify_windows(user_choice.as_deref(), None);
    if decided.status != AssociationState::Unknown {
        return decided;
    }

    let class_root = run_quiet("reg", &["query", r"HKCR\.md", "/ve"])
        .await
        .map_err(|e| log::debug!("HKCR 查询失败: {}", e))
        .ok();
    classify_windows(None, class_root.as_deref())
}

#[cfg(target_os = "linux")]
async fn probe_host() -> AssociationStatus {
    let stdout = run_quiet("xdg-mime", &["query", "default", "text/markdown"])
        .await
        .map_err(|e| log::debug!("xdg-mime 查询失败: {}", e))
        .ok();
    classify_xdg(stdout.as_deref())
}

#[cfg(not(any(target_os = "windows", target_os = "linux")))]
async fn probe_host() -> AssociationStatus {
    AssociationStatus::unknown("File association check is not available on this platform.")
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER_CHOICE: &str = "\r\nHKEY_CURRENT_USER\\Software\\Microsoft\\Windows\\CurrentVersion\\Explorer\\FileExts\\.md\\UserChoice\r\n    ProgId    REG_SZ    AinoldMarkdown.md\r\n\r\n";
    const CLASS_ROOT: &str = "\r\nHKEY_CLASSES_ROOT\\.md\r\n    (Default)    REG_SZ    VSCode.md\r\n\r\n";

    #[test]
    fn parses_registry_output() {
        assert_eq!(parse_reg_prog_id(USER_CHOICE).as_deref(), Some("AinoldMarkdown.md"));
        assert_eq!(parse_reg_default_value(CLASS_ROOT).as_deref(), Some("VSCode.md"));
        assert_eq!(parse_reg_prog_id("ERROR: not found"), None);
    }

    #[test]
    fn user_choice_wins_over_class_root() {
        let status = classify_windows(Some(USER_CHOICE), Some(CLASS_ROOT));
        assert_eq!(status.status, AssociationState::Associated);
        assert_eq!(status.detail, "ProgId: AinoldMarkdown.md");
    }

    #[test]
    fn class_root_is_the_fallback() {
        let status = classify_windows(None, Some(CLASS_ROOT));
        assert_eq!(status.status, AssociationState::NotAssociated);
        assert_eq!(status.detail, "HKCR ProgId: VSCode.md");

        assert_eq!(classify_windows(None, None).status, AssociationState::Unknown);
        assert_eq!(classify_windows(Some("garbage"), Some("")).status, AssociationState::Unknown);
    }

    #[test]
    fn xdg_output() {
        assert_eq!(
            classify_xdg(Some("com.ainold.markdown.desktop\n")).status,
            AssociationState::Associated
        );
        assert_eq!(
            classify_xdg(Some("org.gnome.TextEditor.desktop\n")).status,
            AssociationState::NotAssociated
        );
        assert_eq!(classify_xdg(Some("  \n")).status, AssociationState::Unknown);
        assert_eq!(classify_xdg(None).status, AssociationState::Unknown);
    }

    #[test]
    fn status_wire_shape() {
        let status = classify_xdg(Some("gedit.desktop"));
        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            serde_json::json!({ "status": "not_associated", "detail": "Current desktop entry: gedit.desktop" })
        );
    }

    #[tokio::test]
    async fn missing_program_is_an_error() {
        assert!(run_quiet("ainold-definitely-missing-binary", &[]).await.is_err());
    }

    #[tokio::test]
    async fn system_probe_never_panics() {
        let status = SystemProbe.probe().await;
        assert!(!status.detail.is_empty());
    }
}
