//! # 导出服务
//!
//! 把编辑器渲染出的 HTML 片段包装成独立的 HTML 文档，
//! 写为 `.html`，或经离屏渲染面分页后写为 `.pdf`。
//!
//! ## 导出流程
//! 1. 弹出保存对话框（预填 `defaultName`，缺省 `export.html` / `export.pdf`）
//! 2. 用户取消返回 `None`，不写任何文件
//! 3. 标题缺省使用本地化的 `exportTitle`
//! 4. HTML：直接写入完整文档；PDF：创建渲染面 → 载入 → 分页 → 写入 → 销毁
//!
//! 导出不会更新最近文件列表。

use std::path::PathBuf;

use crate::models::document::{ExportFormat, ExportRequest};
use crate::services::dialogs::{DialogHost, FileFilter, SaveDialogRequest};
use crate::services::locale::{Locale, t};
use crate::services::pdf::{PrintOptions, RenderSurface, SurfaceFactory};

/// 导出文档的内置样式（屏幕与打印共用）
const EXPORT_STYLE: &str = r#"
      body {
        margin: 24px auto;
        max-width: 860px;
        font-family: "Segoe UI", "PingFang SC", "Microsoft YaHei", sans-serif;
        color: #2f3338;
        line-height: 1.72;
      }
      img { max-width: 100%; }
      pre {
        background: #222831;
        color: #f0f3f6;
        padding: 12px 14px;
        border-radius: 8px;
        overflow: auto;
      }
      code {
        background: #eceff2;
        border-radius: 4px;
        padding: 2px 6px;
      }
      pre code {
        background: transparent;
        padding: 0;
      }
      table {
        width: 100%;
        border-collapse: collapse;
        table-layout: fixed;
      }
      th, td {
        border: 1px solid #d2d5d9;
        padding: 8px 10px;
      }
      th { background: #eceff2; }

      @media print {
        @page {
          size: A4;
          margin: 16mm 14mm;
        }

        h1, h2, h3, h4 {
          page-break-after: avoid;
          break-after: avoid-page;
        }

        pre, blockquote, table, img {
          page-break-inside: avoid;
          break-inside: avoid;
        }

        p, li {
          orphans: 3;
          widows: 3;
        }
      }
"#;

/// 转义 HTML 特殊字符：`& < > " '`
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// 将 HTML 片段包装为完整文档
///
/// 标题经过转义，片段原样嵌入 `<body>`（片段本身由编辑器生成，视为可信内容）。
pub fn build_document(fragment: &str, title: &str) -> String {
    format!(
        "<!doctype html>\n<html>\n  <head>\n    <meta charset=\"UTF-8\" />\n    \
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\" />\n    \
         <title>{}</title>\n    <style>{}    </style>\n  </head>\n  <body>\n    {}\n  </body>\n</html>",
        escape_html(title),
        EXPORT_STYLE,
        fragment
    )
}

fn destination(format: ExportFormat, request: &ExportRequest, locale: Locale) -> SaveDialogRequest {
    let (fallback, filter) = match format {
        ExportFormat::Html => ("export.html", FileFilter::new(t(locale, "filterHtml"), &["html"])),
        ExportFormat::Pdf => ("export.pdf", FileFilter::new(t(locale, "filterPdf"), &["pdf"])),
    };
    let name = request
        .default_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .unwrap_or(fallback);

    SaveDialogRequest {
        default_path: PathBuf::from(name),
        filter,
    }
}

fn document_title(request: &ExportRequest, locale: Locale) -> String {
    request
        .document_title
        .clone()
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| t(locale, "exportTitle"))
}

/// 导出为独立 HTML 文件
///
/// # 返回值
/// 写入的路径；用户取消时返回 `None`
///
/// # 错误
/// 写入失败时返回错误
pub async fn export_html<D: DialogHost>(
    dialogs: &D,
    locale: Locale,
    request: &ExportRequest,
) -> Result<Option<PathBuf>, String> {
    let Some(target) = dialogs
        .pick_save_path(destination(ExportFormat::Html, request, locale))
        .await
    else {
        return Ok(None);
    };

    let html = build_document(&request.content_html, &document_title(request, locale));
    tokio::fs::write(&target, html)
        .await
        .map_err(|e| format!("写入 HTML 导出文件失败: {}", e))?;
    log::info!("已导出 HTML {}", target.display());
    Ok(Some(target))
}

/// 导出为 PDF 文件
///
/// 每次导出创建独立的渲染面，成功或失败都会销毁。
///
/// # 返回值
/// 写入的路径；用户取消时返回 `None`（不会创建渲染面）
///
/// # 错误
/// 渲染面创建、载入、分页或写入失败时返回错误
pub async fn export_pdf<D: DialogHost, F: SurfaceFactory>(
    dialogs: &D,
    surfaces: &F,
    locale: Locale,
    request: &ExportRequest,
) -> Result<Option<PathBuf>, String> {
    let Some(target) = dialogs
        .pick_save_path(destination(ExportFormat::Pdf, request, locale))
        .await
    else {
        return Ok(None);
    };

    let title = document_title(request, locale);
    let html = build_document(&request.content_html, &title);

    let mut surface = surfaces.create().await?;
    let rendered = render(&mut surface, &html, &PrintOptions::for_export(&title)).await;
    surface.destroy().await;

    tokio::fs::write(&target, rendered?)
        .await
        .map_err(|e| format!("写入 PDF 导出文件失败: {}", e))?;
    log::info!("已导出 PDF {}", target.display());
    Ok(Some(target))
}

async fn render<S: RenderSurface>(
    surface: &mut S,
    html: &str,
    options: &PrintOptions,
) -> Result<Vec<u8>, String> {
    surface.load_html(html).await?;
    surface.print_to_pdf(options).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::services::dialogs::testing::ScriptedDialogs;

    #[derive(Default)]
    struct Probe {
        created: AtomicUsize,
        destroyed: AtomicUsize,
        loaded: Mutex<Vec<String>>,
        options: Mutex<Vec<PrintOptions>>,
    }

    struct FakeFactory {
        probe: Arc<Probe>,
        fail_print: bool,
    }

    struct FakeSurface {
        probe: Arc<Probe>,
        fail_print: bool,
    }

    impl SurfaceFactory for FakeFactory {
        type Surface = FakeSurface;

        async fn create(&self) -> Result<FakeSurface, String> {
            self.probe.created.fetch_add(1, Ordering::SeqCst);
            Ok(FakeSurface {
                probe: Arc::clone(&self.probe),
                fail_print: self.fail_print,
            })
        }
    }

    impl RenderSurface for FakeSurface {
        async fn load_html(&mut self, html: &str) -> Result<(), String> {
            self.probe.loaded.lock().unwrap().push(html.to_string());
            Ok(())
        }

        async fn print_to_pdf(&mut self, options: &PrintOptions) -> Result<Vec<u8>, String> {
            self.probe.options.lock().unwrap().push(options.clone());
            if self.fail_print {
                Err("渲染失败".into())
            } else {
                Ok(b"%PDF-1.7 fake".to_vec())
            }
        }

        async fn destroy(self) {
            self.probe.destroyed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn factory(fail_print: bool) -> (FakeFactory, Arc<Probe>) {
        let probe = Arc::new(Probe::default());
        (
            FakeFactory {
                probe: Arc::clone(&probe),
                fail_print,
            },
            probe,
        )
    }

    #[test]
    fn escapes_all_five_characters() {
        assert_eq!(escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;");
    }

    #[test]
    fn empty_fragment_still_produces_document() {
        let html = build_document("", "A <b> & C");
        assert!(html.starts_with("<!doctype html>"));
        assert!(html.contains("<title>A &lt;b&gt; &amp; C</title>"));
        assert!(html.contains("<body>"));
        assert!(html.contains("break-inside: avoid"));
    }

    #[tokio::test]
    async fn html_export_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.html");
        let dialogs = ScriptedDialogs::saving_to(Some(target.clone()));
        let request = ExportRequest {
            content_html: "<p>hi</p>".into(),
            ..Default::default()
        };

        let written = export_html(&dialogs, Locale::EnUs, &request).await.unwrap();
        assert_eq!(written, Some(target.clone()));

        let html = tokio::fs::read_to_string(&target).await.unwrap();
        assert!(html.contains("<p>hi</p>"));
        assert!(html.contains("<title>AinoldMarkdown Export</title>"));

        let requests = dialogs.save_requests.lock().unwrap();
        assert_eq!(requests[0].default_path, PathBuf::from("export.html"));
        assert_eq!(requests[0].filter.extensions, vec!["html"]);
    }

    #[tokio::test]
    async fn cancelled_pdf_export_never_creates_surface() {
        let dialogs = ScriptedDialogs::saving_to(None);
        let (surfaces, probe) = factory(false);
        let request = ExportRequest {
            default_name: Some("notes.pdf".into()),
            ..Default::default()
        };

        let written = export_pdf(&dialogs, &surfaces, Locale::EnUs, &request).await.unwrap();
        assert!(written.is_none());
        assert_eq!(probe.created.load(Ordering::SeqCst), 0);
        assert_eq!(
            dialogs.save_requests.lock().unwrap()[0].default_path,
            PathBuf::from("notes.pdf")
        );
    }

    #[tokio::test]
    async fn pdf_export_writes_bytes_and_destroys_surface() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.pdf");
        let dialogs = ScriptedDialogs::saving_to(Some(target.clone()));
        let (surfaces, probe) = factory(false);
        let request = ExportRequest {
            content_html: "<h1>Title</h1>".into(),
            document_title: Some("Report".into()),
            ..Default::default()
        };

        export_pdf(&dialogs, &surfaces, Locale::EnUs, &request).await.unwrap();
        assert_eq!(tokio::fs::read(&target).await.unwrap(), b"%PDF-1.7 fake");
        assert_eq!(probe.destroyed.load(Ordering::SeqCst), 1);
        assert!(probe.loaded.lock().unwrap()[0].contains("<h1>Title</h1>"));

        let options = probe.options.lock().unwrap();
        assert_eq!(options[0].header_title.as_deref(), Some("Report"));
        assert!(options[0].print_background);
    }

    #[tokio::test]
    async fn failed_render_still_destroys_surface() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.pdf");
        let dialogs = ScriptedDialogs::saving_to(Some(target.clone()));
        let (surfaces, probe) = factory(true);

        let result = export_pdf(&dialogs, &surfaces, Locale::ZhCn, &ExportRequest::default()).await;
        assert!(result.is_err());
        assert_eq!(probe.destroyed.load(Ordering::SeqCst), 1);
        assert!(!target.exists());
        assert_eq!(
            probe.options.lock().unwrap()[0].header_title.as_deref(),
            Some("AinoldMarkdown 导出")
        );
    }
}
