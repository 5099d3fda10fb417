//! # 图片资源导入
//!
//! 把拖入的图片文件或粘贴的图片数据存到文档旁边的 `assets/` 目录，
//! 返回可直接写进 markdown 的相对路径。
//!
//! ## 校验顺序
//! 所有校验（文档是否已保存、源文件是否可读、data URL 与 base64 是否合法）
//! 都在创建目录或写入文件之前完成，校验失败不会留下任何文件系统改动。
//!
//! ## 命名规则
//! `pasted image!.PNG` → `pasted-image-1718000000000.png`：
//! 小写化，非 `[a-z0-9_-]` 字符换成 `-`，合并连续的 `-`，去掉首尾 `-`，
//! 为空时使用 `image`，最后追加毫秒时间戳与小写扩展名（缺省 `.png`）。

use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, PAD};
use base64::engine::DecodePaddingMode;
use regex::Regex;
use tokio::io::AsyncWriteExt;

use crate::models::document::{AssetError, ImageImportResult};

/// 资源目录名（相对文档所在目录）
pub const ASSETS_DIR: &str = "assets";

/// 粘贴图片的默认基础文件名
const PASTED_BASE_NAME: &str = "pasted-image";

/// slug 部分的最大长度，保证最终文件名不超过 255 字节
const MAX_SLUG_LEN: usize = 120;

/// 扩展名的最大字符数
const MAX_EXT_CHARS: usize = 16;

/// 标准字母表，解码时末尾的 `=` 可有可无
const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    PAD.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// `data:image/<subtype>;base64,<payload>`
static DATA_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:(image/[a-zA-Z0-9.+-]+);base64,(.+)$").unwrap()
});

static UNSAFE_CHARS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9_-]").unwrap());

static DASH_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").unwrap());

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

/// 将文件名规范化为 `<slug>-<token>.<ext>`
///
/// # 参数
/// - `file_name` - 原始文件名（只取最后一段，可以带扩展名）
/// - `token` - 追加在名字后面的唯一标记（通常是毫秒时间戳）
pub fn slugify_file_name(file_name: &str, token: u128) -> String {
    let path = Path::new(file_name);
    let ext = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .map(|ext| ext.chars().take(MAX_EXT_CHARS).collect::<String>())
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| "png".to_string());
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let replaced = UNSAFE_CHARS_RE.replace_all(&stem, "-");
    let collapsed = DASH_RUN_RE.replace_all(&replaced, "-");
    // slug 只剩 ASCII，按字节截断是安全的
    let slug = collapsed.trim_matches('-');
    let slug = slug[..slug.len().min(MAX_SLUG_LEN)].trim_end_matches('-');
    let slug = if slug.is_empty() { "image" } else { slug };

    format!("{}-{}.{}", slug, token, ext)
}

/// 图片 MIME 类型对应的扩展名；未知的图片类型按 png 处理
pub fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "png",
    }
}

/// 解析图片 data URL，返回 `(MIME, 解码后的字节)`
pub fn decode_data_url(data_url: &str) -> Option<(String, Vec<u8>)> {
    let captures = DATA_URL_RE.captures(data_url)?;
    let mime = captures.get(1)?.as_str().to_string();
    let payload: String = captures
        .get(2)?
        .as_str()
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    match BASE64.decode(payload.as_bytes()) {
        Ok(bytes) if !bytes.is_empty() => Some((mime, bytes)),
        Ok(_) => None,
        Err(e) => {
            log::debug!("粘贴的图片数据不是合法的 base64: {}", e);
            None
        }
    }
}

/// 文档旁边的资源目录
fn assets_dir(document: &Path) -> PathBuf {
    document
        .parent()
        .map(|dir| dir.join(ASSETS_DIR))
        .unwrap_or_else(|| PathBuf::from(ASSETS_DIR))
}

/// 在资源目录中独占创建一个新的目标文件
///
/// 用 `create_new` 原子地占用文件名，同名文件已存在时递增标记重试，
/// 并发导入也不会覆盖彼此的文件。
///
/// # 返回值
/// `(文件名, 绝对路径, 已打开的文件句柄)`
///
/// # 错误
/// 除“文件已存在”以外的 I/O 错误（权限不足、目录不存在等）直接返回
async fn claim_target(
    dir: &Path,
    file_name: &str,
    mut token: u128,
) -> Result<(String, PathBuf, tokio::fs::File), String> {
    loop {
        let name = slugify_file_name(file_name, token);
        let candidate = dir.join(&name);
        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
            .await
        {
            Ok(file) => return Ok((name, candidate, file)),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => token += 1,
            Err(e) => return Err(format!("创建图片文件失败 {}: {}", candidate.display(), e)),
        }
    }
}

/// 写入已占用的目标文件；失败时删除残留的半成品
async fn fill_target(mut file: tokio::fs::File, target: &Path, bytes: &[u8]) -> Result<(), String> {
    let written = async {
        file.write_all(bytes).await?;
        file.flush().await
    }
    .await;

    if let Err(e) = written {
        drop(file);
        if let Err(remove_err) = tokio::fs::remove_file(target).await {
            log::warn!("清理未写完的图片失败 {}: {}", target.display(), remove_err);
        }
        return Err(format!("写入图片失败: {}", e));
    }
    Ok(())
}

fn saved(name: &str, absolute: &Path) -> ImageImportResult {
    ImageImportResult::Saved {
        markdown_path: format!("{}/{}", ASSETS_DIR, name),
        absolute_path: absolute.to_string_lossy().to_string(),
    }
}

/// 把本地图片文件复制到文档的资源目录
///
/// # 参数
/// - `document` - 当前文档路径；`None` 表示文档尚未保存
/// - `source` - 源图片路径
///
/// # 返回值
/// 成功返回 `Saved`；文档未保存返回 `Rejected(UNSAVED_DOCUMENT)`
///
/// # 错误
/// 源文件不可读、目录创建或复制失败时返回错误
pub async fn import_file(
    document: Option<&Path>,
    source: &Path,
) -> Result<ImageImportResult, String> {
    let Some(document) = document else {
        return Ok(ImageImportResult::Rejected {
            error: AssetError::UnsavedDocument,
        });
    };

    let metadata = tokio::fs::metadata(source)
        .await
        .map_err(|e| format!("读取图片文件失败: {}", e))?;
    if !metadata.is_file() {
        return Err(format!("不是文件: {}", source.display()));
    }
    let bytes = tokio::fs::read(source)
        .await
        .map_err(|e| format!("读取图片文件失败: {}", e))?;

    let source_name = source
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();

    let dir = assets_dir(document);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| format!("创建资源目录失败: {}", e))?;

    let (name, target, file) = claim_target(&dir, &source_name, unix_millis()).await?;
    fill_target(file, &target, &bytes).await?;

    log::info!("已导入图片 {} → {}", source.display(), target.display());
    Ok(saved(&name, &target))
}

/// 把粘贴的图片 data URL 写入文档的资源目录
///
/// # 参数
/// - `document` - 当前文档路径；`None` 表示文档尚未保存
/// - `data_url` - `data:image/...;base64,...`
/// - `file_name` - 可选的基础文件名（不含扩展名），缺省 `pasted-image`
///
/// # 返回值
/// 成功返回 `Saved`；文档未保存或数据非法时返回 `Rejected`
///
/// # 错误
/// 目录创建或写入失败时返回错误
pub async fn import_pasted_image(
    document: Option<&Path>,
    data_url: &str,
    file_name: Option<&str>,
) -> Result<ImageImportResult, String> {
    let Some(document) = document else {
        return Ok(ImageImportResult::Rejected {
            error: AssetError::UnsavedDocument,
        });
    };

    let Some((mime, bytes)) = decode_data_url(data_url) else {
        return Ok(ImageImportResult::Rejected {
            error: AssetError::InvalidImageData,
        });
    };

    let base = file_name
        .filter(|name| !name.is_empty())
        .unwrap_or(PASTED_BASE_NAME);
    let candidate = format!("{}.{}", base, extension_for_mime(&mime));

    let dir = assets_dir(document);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| format!("创建资源目录失败: {}", e))?;

    let (name, target, file) = claim_target(&dir, &candidate, unix_millis()).await?;
    fill_target(file, &target, &bytes).await?;

    log::info!("已保存粘贴图片 {}（{} 字节）", target.display(), bytes.len());
    Ok(saved(&name, &target))
}
