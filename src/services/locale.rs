//! # 语言解析与消息模板服务
//!
//! 负责两件事：
//! - 将任意语言标签（如 `zh-TW`、`en_GB.UTF-8`）归一化到受支持的两种语言之一
//! - 按 key 查找界面文案模板，并替换其中的 `{name}` 占位符
//!
//! ## 查找回退顺序
//! 当前语言 → 默认语言（en-US）→ key 本身原样返回
//!
//! 本模块不持有“当前语言”这类全局可变状态，调用方需显式传入 `Locale`
//! （见 `AppSession`）。所有函数均为纯函数，不会 panic。

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

/// 受支持的界面语言
///
/// 序列化形式与前端约定一致：`"zh-CN"` / `"en-US"`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Locale {
    /// 简体中文
    #[serde(rename = "zh-CN")]
    ZhCn,
    /// 英语（默认语言）
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
}

impl Locale {
    /// 语言标签字符串
    pub fn as_tag(self) -> &'static str {
        match self {
            Locale::ZhCn => "zh-CN",
            Locale::EnUs => "en-US",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// 将任意语言标签归一化为受支持的 `Locale`
///
/// 规则：转小写后按前缀匹配，`zh*` → 中文，`en*` → 英语，
/// 其余（包括 `None`、空串、无法识别的标签）一律回退到默认语言。
pub fn normalize_locale(tag: Option<&str>) -> Locale {
    let Some(tag) = tag else {
        return Locale::default();
    };
    let lower = tag.trim().to_lowercase();
    if lower.starts_with("zh") {
        Locale::ZhCn
    } else if lower.starts_with("en") {
        Locale::EnUs
    } else {
        Locale::default()
    }
}

/// 从环境变量推断系统语言
///
/// 依次读取 `LC_ALL`、`LC_MESSAGES`、`LANG`，取第一个非空值归一化。
/// 都不存在时（例如 Windows 默认环境）返回默认语言。
pub fn system_locale() -> Locale {
    let tag = ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty() && value != "C" && value != "POSIX");
    normalize_locale(tag.as_deref())
}

/// 占位符匹配正则：`{identifier}`
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w+)\}").unwrap());

const ZH_CN_MESSAGES: &[(&str, &str)] = &[
    ("menuFile", "文件"),
    ("menuEdit", "编辑"),
    ("menuParagraph", "段落"),
    ("menuFormat", "格式"),
    ("menuView", "视图"),
    ("menuHelp", "帮助"),
    ("menuNoRecentFiles", "暂无最近文件"),
    ("menuNew", "新建"),
    ("menuOpen", "打开..."),
    ("menuSave", "保存"),
    ("menuSaveAs", "另存为..."),
    ("menuExportHtml", "导出 HTML"),
    ("menuExportPdf", "导出 PDF"),
    ("menuOpenRecent", "打开最近"),
    ("menuUndo", "撤销"),
    ("menuRedo", "重做"),
    ("menuCut", "剪切"),
    ("menuCopy", "复制"),
    ("menuPaste", "粘贴"),
    ("menuSelectAll", "全选"),
    ("menuFind", "查找"),
    ("menuHeading1", "标题 1"),
    ("menuHeading2", "标题 2"),
    ("menuParagraphText", "正文"),
    ("menuBlockquote", "引用"),
    ("menuBold", "加粗"),
    ("menuItalic", "斜体"),
    ("menuInlineCode", "行内代码"),
    ("menuInsertTable", "插入表格"),
    ("menuToggleOutline", "切换大纲"),
    ("menuToggleFullscreen", "切换全屏"),
    ("menuAbout", "关于 AinoldMarkdown"),
    ("confirmUnsavedTitle", "你有未保存的更改。"),
    ("confirmCloseDetail", "关闭窗口前是否保存？"),
    ("confirmActionDetail", "在{action}前是否保存？"),
    ("buttonSaveAndClose", "保存并关闭"),
    ("buttonCloseWithoutSaving", "不保存并关闭"),
    ("buttonSave", "保存"),
    ("buttonDontSave", "不保存"),
    ("buttonCancel", "取消"),
    ("saveDefaultName", "未命名.md"),
    ("filterMarkdown", "Markdown"),
    ("filterHtml", "HTML"),
    ("filterPdf", "PDF"),
    ("exportTitle", "AinoldMarkdown 导出"),
    ("actionContinue", "继续操作"),
];

const EN_US_MESSAGES: &[(&str, &str)] = &[
    ("menuFile", "File"),
    ("menuEdit", "Edit"),
    ("menuParagraph", "Paragraph"),
    ("menuFormat", "Format"),
    ("menuView", "View"),
    ("menuHelp", "Help"),
    ("menuNoRecentFiles", "No Recent Files"),
    ("menuNew", "New"),
    ("menuOpen", "Open..."),
    ("menuSave", "Save"),
    ("menuSaveAs", "Save As..."),
    ("menuExportHtml", "Export HTML"),
    ("menuExportPdf", "Export PDF"),
    ("menuOpenRecent", "Open Recent"),
    ("menuUndo", "Undo"),
    ("menuRedo", "Redo"),
    ("menuCut", "Cut"),
    ("menuCopy", "Copy"),
    ("menuPaste", "Paste"),
    ("menuSelectAll", "Select All"),
    ("menuFind", "Find"),
    ("menuHeading1", "Heading 1"),
    ("menuHeading2", "Heading 2"),
    ("menuParagraphText", "Paragraph"),
    ("menuBlockquote", "Blockquote"),
    ("menuBold", "Bold"),
    ("menuItalic", "Italic"),
    ("menuInlineCode", "Inline Code"),
    ("menuInsertTable", "Insert Table"),
    ("menuToggleOutline", "Toggle Outline"),
    ("menuToggleFullscreen", "Toggle Full Screen"),
    ("menuAbout", "About AinoldMarkdown"),
    ("confirmUnsavedTitle", "You have unsaved changes."),
    ("confirmCloseDetail", "Save before closing this window?"),
    ("confirmActionDetail", "Save before {action}?"),
    ("buttonSaveAndClose", "Save and Close"),
    ("buttonCloseWithoutSaving", "Close Without Saving"),
    ("buttonSave", "Save"),
    ("buttonDontSave", "Don't Save"),
    ("buttonCancel", "Cancel"),
    ("saveDefaultName", "untitled.md"),
    ("filterMarkdown", "Markdown"),
    ("filterHtml", "HTML"),
    ("filterPdf", "PDF"),
    ("exportTitle", "AinoldMarkdown Export"),
    ("actionContinue", "continue"),
];

/// 内置文案表，进程内只构建一次
static BUILTIN: LazyLock<Catalog> = LazyLock::new(|| {
    let mut catalog = Catalog::new();
    catalog.extend(Locale::ZhCn, ZH_CN_MESSAGES);
    catalog.extend(Locale::EnUs, EN_US_MESSAGES);
    catalog
});

/// 按语言分组的消息模板表
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: HashMap<Locale, HashMap<String, String>>,
}

impl Catalog {
    /// 创建空表
    pub fn new() -> Self {
        Self::default()
    }

    /// 内置的中英文文案表
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    /// 向指定语言追加（或覆盖）模板
    pub fn extend(&mut self, locale: Locale, entries: &[(&str, &str)]) {
        let table = self.tables.entry(locale).or_default();
        for (key, template) in entries {
            table.insert((*key).to_string(), (*template).to_string());
        }
    }

    /// 按回退顺序查找模板，找不到时返回 `None`
    fn template(&self, locale: Locale, key: &str) -> Option<&str> {
        self.tables
            .get(&locale)
            .and_then(|table| table.get(key))
            .or_else(|| {
                self.tables
                    .get(&Locale::default())
                    .and_then(|table| table.get(key))
            })
            .map(String::as_str)
    }

    /// 查找模板并替换占位符
    ///
    /// # 参数
    /// - `locale` - 当前界面语言
    /// - `key` - 模板 key
    /// - `vars` - 占位符变量；未提供的变量替换为空串
    ///
    /// # 返回值
    /// 替换后的文案；模板不存在时原样返回 `key`
    pub fn translate(&self, locale: Locale, key: &str, vars: &[(&str, &str)]) -> String {
        let Some(template) = self.template(locale, key) else {
            return key.to_string();
        };

        PLACEHOLDER_RE
            .replace_all(template, |caps: &Captures<'_>| {
                let name = &caps[1];
                vars.iter()
                    .find(|(var, _)| *var == name)
                    .map(|(_, value)| (*value).to_string())
                    .unwrap_or_default()
            })
            .into_owned()
    }
}

/// 使用内置文案表翻译（无占位符变量）
pub fn t(locale: Locale, key: &str) -> String {
    Catalog::builtin().translate(locale, key, &[])
}

/// 使用内置文案表翻译（带占位符变量）
pub fn t_with(locale: Locale, key: &str, vars: &[(&str, &str)]) -> String {
    Catalog::builtin().translate(locale, key, vars)
}
