//! # 离屏渲染面（PDF 分页）
//!
//! PDF 导出需要一个不可见的 HTML 渲染面，把文档排版分页成 PDF 字节。
//! 服务层只依赖 `SurfaceFactory` / `RenderSurface` 两个 trait；
//! 生产实现 `HeadlessBrowser` 在私有临时目录中驱动无头 Chromium 内核浏览器
//! （Edge / Chrome / Chromium）：
//!
//! 1. `create`：创建私有临时目录（同时作为浏览器的独立 profile，避免复用已运行的浏览器实例）
//! 2. `load_html`：记录待渲染文档
//! 3. `print_to_pdf`：写入注入了页眉页脚样式的 HTML，运行 `--headless --print-to-pdf`，读回 PDF
//! 4. `destroy`：删除临时目录（子进程设置了 `kill_on_drop`，不会残留）
//!
//! 临时目录由 `tempfile::TempDir` 持有，导出中途被取消、渲染面被直接 drop 时同样会被删除。
//!
//! 页眉页脚通过 CSS 分页边距盒（`@top-center` / `@bottom-center`）实现，
//! 页眉显示转义后的标题，页脚显示 `页码 / 总页数`。

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;

/// 指定浏览器可执行文件的环境变量
pub const BROWSER_ENV: &str = "AINOLD_PDF_BROWSER";

/// 单次渲染的超时
const RENDER_TIMEOUT: Duration = Duration::from_secs(60);

/// 纸张尺寸
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSize {
    A4,
}

impl PageSize {
    fn css(self) -> &'static str {
        match self {
            PageSize::A4 => "A4",
        }
    }
}

/// 页边距（英寸）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

/// 分页参数
#[derive(Debug, Clone, PartialEq)]
pub struct PrintOptions {
    pub page_size: PageSize,
    /// 是否打印背景色与背景图
    pub print_background: bool,
    /// 页眉文本（原始标题，渲染时转义）；`None` 表示不显示页眉
    pub header_title: Option<String>,
    /// 页脚是否显示 “页码 / 总页数”
    pub page_counter: bool,
    pub margins: Margins,
}

impl PrintOptions {
    /// 导出 PDF 使用的固定参数：A4、打印背景、标题页眉、页码页脚
    pub fn for_export(title: &str) -> Self {
        Self {
            page_size: PageSize::A4,
            print_background: true,
            header_title: Some(title.to_string()),
            page_counter: true,
            margins: Margins {
                top: 0.65,
                bottom: 0.7,
                left: 0.55,
                right: 0.55,
            },
        }
    }
}

/// 一次性的离屏渲染面
pub trait RenderSurface: Send {
    /// 载入待渲染的完整 HTML 文档
    fn load_html(&mut self, html: &str) -> impl Future<Output = Result<(), String>> + Send;

    /// 分页并输出 PDF 字节
    fn print_to_pdf(
        &mut self,
        options: &PrintOptions,
    ) -> impl Future<Output = Result<Vec<u8>, String>> + Send;

    /// 销毁渲染面，释放全部资源；无论前面的步骤成功与否都必须调用
    fn destroy(self) -> impl Future<Output = ()> + Send;
}

/// 渲染面工厂：每次导出创建一个独立的渲染面，互不共享
pub trait SurfaceFactory: Send + Sync {
    type Surface: RenderSurface;

    fn create(&self) -> impl Future<Output = Result<Self::Surface, String>> + Send;
}

/// 生成页眉页脚与打印参数对应的 CSS
///
/// 注入在文档 `<head>` 末尾，后出现的 `@page` 规则覆盖文档自带的页边距。
pub fn print_chrome_css(options: &PrintOptions) -> String {
    let m = options.margins;
    let mut css = format!(
        "@page {{ size: {}; margin: {}in {}in {}in {}in; }}\n",
        options.page_size.css(),
        m.top,
        m.right,
        m.bottom,
        m.left
    );

    if options.print_background {
        css.push_str(
            "html, body { -webkit-print-color-adjust: exact; print-color-adjust: exact; }\n",
        );
    }

    let band = "font-size: 9px; color: #6b7280; font-family: sans-serif;";
    if let Some(title) = &options.header_title {
        css.push_str(&format!(
            "@page {{ @top-center {{ content: {}; {} }} }}\n",
            css_string(title),
            band
        ));
    }
    if options.page_counter {
        css.push_str(&format!(
            "@page {{ @bottom-center {{ content: counter(page) \" / \" counter(pages); {} }} }}\n",
            band
        ));
    }
    css
}

/// 将任意文本转义为 CSS 字符串字面量
///
/// 除引号与反斜杠外，`<`、`>`、`&` 与控制字符也写成十六进制转义，
/// 标题无法借此闭合 `<style>` 标签。
pub fn css_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' | '\\' | '<' | '>' | '&' => out.push_str(&format!("\\{:x} ", ch as u32)),
            c if c.is_control() => out.push_str(&format!("\\{:x} ", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// 在 `</head>` 前插入一段样式；文档没有 `</head>` 时放在最前面
fn inject_style(html: &str, css: &str) -> String {
    let style = format!("<style>\n{}</style>\n", css);
    match html.find("</head>") {
        Some(index) => format!("{}{}{}", &html[..index], style, &html[index..]),
        None => format!("{}{}", style, html),
    }
}

/// 无头浏览器渲染面工厂
#[derive(Debug, Default)]
pub struct HeadlessBrowser {
    /// 显式指定的浏览器；`None` 时按平台候选列表查找
    browser: Option<PathBuf>,
}

impl HeadlessBrowser {
    /// 创建工厂；设置了环境变量 `AINOLD_PDF_BROWSER` 时使用其指定的浏览器
    pub fn new() -> Self {
        Self {
            browser: std::env::var_os(BROWSER_ENV).map(PathBuf::from),
        }
    }

    fn locate(&self) -> Result<PathBuf, String> {
        if let Some(browser) = &self.browser {
            return Ok(browser.clone());
        }
        browser_candidates()
            .into_iter()
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| {
                format!(
                    "未找到可用于 PDF 导出的浏览器（Edge / Chrome / Chromium），可通过环境变量 {} 指定",
                    BROWSER_ENV
                )
            })
    }
}

/// 各平台的浏览器候选路径
fn browser_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    #[cfg(target_os = "windows")]
    {
        for base in ["ProgramFiles(x86)", "ProgramFiles", "LOCALAPPDATA"] {
            if let Some(root) = std::env::var_os(base).map(PathBuf::from) {
                candidates.push(root.join(r"Microsoft\Edge\Application\msedge.exe"));
                candidates.push(root.join(r"Google\Chrome\Application\chrome.exe"));
            }
        }
    }

    #[cfg(target_os = "macos")]
    {
        for app in [
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
        ] {
            candidates.push(PathBuf::from(app));
        }
    }

    #[cfg(target_os = "linux")]
    {
        for dir in ["/usr/bin", "/usr/local/bin", "/snap/bin"] {
            for name in [
                "chromium",
                "chromium-browser",
                "google-chrome",
                "google-chrome-stable",
                "microsoft-edge",
                "microsoft-edge-stable",
            ] {
                candidates.push(Path::new(dir).join(name));
            }
        }
    }

    candidates
}

impl SurfaceFactory for HeadlessBrowser {
    type Surface = BrowserSurface;

    async fn create(&self) -> Result<BrowserSurface, String> {
        let browser = self.locate()?;
        let workdir = tempfile::Builder::new()
            .prefix("ainold-print-")
            .tempdir()
            .map_err(|e| format!("创建 PDF 渲染临时目录失败: {}", e))?;
        log::debug!("PDF 渲染使用浏览器 {}", browser.display());

        Ok(BrowserSurface {
            browser,
            workdir,
            html: None,
        })
    }
}

/// 基于无头浏览器的渲染面
pub struct BrowserSurface {
    browser: PathBuf,
    /// drop 时连同文档与浏览器 profile 一起删除
    workdir: TempDir,
    html: Option<String>,
}

impl RenderSurface for BrowserSurface {
    async fn load_html(&mut self, html: &str) -> Result<(), String> {
        self.html = Some(html.to_string());
        Ok(())
    }

    async fn print_to_pdf(&mut self, options: &PrintOptions) -> Result<Vec<u8>, String> {
        let html = self
            .html
            .as_deref()
            .ok_or_else(|| "渲染面尚未载入文档".to_string())?;

        let page = self.workdir.path().join("document.html");
        let output = self.workdir.path().join("output.pdf");
        let profile = self.workdir.path().join("profile");

        tokio::fs::write(&page, inject_style(html, &print_chrome_css(options)))
            .await
            .map_err(|e| format!("写入待渲染文档失败: {}", e))?;

        let mut command = tokio::process::Command::new(&self.browser);
        command
            .arg("--headless")
            .arg("--disable-gpu")
            .arg("--disable-extensions")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--no-pdf-header-footer")
            .arg("--print-to-pdf-no-header")
            .arg(format!("--user-data-dir={}", profile.display()))
            .arg(format!("--print-to-pdf={}", output.display()))
            .arg(&page)
            .kill_on_drop(true);

        let result = tokio::time::timeout(RENDER_TIMEOUT, command.output())
            .await
            .map_err(|_| format!("PDF 渲染超时（{} 秒）", RENDER_TIMEOUT.as_secs()))?
            .map_err(|e| format!("启动 PDF 渲染浏览器失败: {}", e))?;

        match tokio::fs::read(&output).await {
            Ok(bytes) if !bytes.is_empty() => Ok(bytes),
            _ => Err(format!(
                "PDF 渲染失败（退出码 {:?}）: {}",
                result.status.code(),
                String::from_utf8_lossy(&result.stderr).trim()
            )),
        }
    }

    async fn destroy(self) {
        let workdir = self.workdir.path().to_path_buf();
        if let Err(e) = self.workdir.close() {
            log::warn!("清理 PDF 渲染临时目录 {} 失败: {}", workdir.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chrome_css_has_fixed_page_and_bands() {
        let css = print_chrome_css(&PrintOptions::for_export("Notes"));
        assert!(css.contains("size: A4"));
        assert!(css.contains("margin: 0.65in 0.55in 0.7in 0.55in"));
        assert!(css.contains("print-color-adjust: exact"));
        assert!(css.contains("@top-center { content: \"Notes\""));
        assert!(css.contains("counter(page) \" / \" counter(pages)"));
    }

    #[test]
    fn css_string_cannot_break_out_of_style() {
        let escaped = css_string("a\"b</style><script>x</script>\n");
        assert!(!escaped.contains("</style>"));
        assert!(!escaped.contains('<'));
        assert!(escaped.starts_with("\"a\\22 b"));
        assert!(escaped.ends_with("\\a \""));
    }

    #[test]
    fn style_is_injected_before_head_close() {
        let html = "<html><head><title>x</title></head><body></body></html>";
        let out = inject_style(html, "p{}");
        assert!(out.contains("<title>x</title><style>\np{}</style>\n</head>"));
        assert_eq!(inject_style("<p>bare</p>", "p{}"), "<style>\np{}</style>\n<p>bare</p>");
    }

    #[tokio::test]
    async fn explicit_browser_is_used_and_surface_cleans_up() {
        let factory = HeadlessBrowser {
            browser: Some(PathBuf::from("/definitely/not/a/browser")),
        };
        let mut surface = factory.create().await.unwrap();
        let workdir = surface.workdir.path().to_path_buf();
        assert!(workdir.is_dir());

        surface.load_html("<html><head></head><body>x</body></html>").await.unwrap();
        let err = surface
            .print_to_pdf(&PrintOptions::for_export("t"))
            .await
            .unwrap_err();
        assert!(err.contains("启动 PDF 渲染浏览器失败"));

        surface.destroy().await;
        assert!(!workdir.exists());
    }

    #[tokio::test]
    async fn printing_before_load_fails() {
        let factory = HeadlessBrowser {
            browser: Some(PathBuf::from("/bin/true")),
        };
        let mut surface = factory.create().await.unwrap();
        assert!(surface.print_to_pdf(&PrintOptions::for_export("t")).await.is_err());
        surface.destroy().await;
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn cancelled_render_still_removes_workdir() {
        use std::os::unix::fs::PermissionsExt;

        let bin = tempfile::tempdir().unwrap();
        let script = bin.path().join("slow-browser");
        std::fs::write(&script, "#!/bin/sh\nsleep 30\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let factory = HeadlessBrowser {
            browser: Some(script),
        };
        let mut surface = factory.create().await.unwrap();
        let workdir = surface.workdir.path().to_path_buf();

        let render = async move {
            surface.load_html("<html><head></head><body>x</body></html>").await?;
            surface.print_to_pdf(&PrintOptions::for_export("t")).await
        };
        let outcome = tokio::time::timeout(Duration::from_millis(300), render).await;
        assert!(outcome.is_err());
        assert!(!workdir.exists());
    }

    #[tokio::test]
    async fn dropped_surface_removes_workdir() {
        let factory = HeadlessBrowser {
            browser: Some(PathBuf::from("/bin/true")),
        };
        let surface = factory.create().await.unwrap();
        let workdir = surface.workdir.path().to_path_buf();
        assert!(workdir.is_dir());
        drop(surface);
        assert!(!workdir.exists());
    }
}
