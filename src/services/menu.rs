//! # 菜单合成器
//!
//! `build(locale, recent)` 是一个纯函数：相同输入永远得到相同的菜单树，
//! 没有任何副作用。语言切换或最近文件变化后，由调用方重新调用并整体替换原生菜单。

use std::path::{Path, PathBuf};

use serde_json::json;

use crate::models::menu::{MenuAction, MenuDescription, MenuItemSpec, MenuNode, StandardRole};
use crate::services::locale::{Locale, t};

/// “打开最近”子菜单最多展示的条目数
pub const RECENT_MENU_LIMIT: usize = 6;

/// 最近文件菜单项的动作 ID
pub const OPEN_RECENT_ACTION: &str = "file.openRecent";

/// 构建完整的应用菜单描述
pub fn build(locale: Locale, recent: &[PathBuf]) -> MenuDescription {
    let file = submenu(
        locale,
        "menuFile",
        vec![
            action(locale, "file.new", "menuNew", Some("CmdOrCtrl+N")),
            action(locale, "file.open", "menuOpen", Some("CmdOrCtrl+O")),
            action(locale, "file.save", "menuSave", Some("CmdOrCtrl+S")),
            action(locale, "file.saveAs", "menuSaveAs", Some("CmdOrCtrl+Shift+S")),
            MenuNode::Separator,
            action(locale, "file.exportHtml", "menuExportHtml", None),
            action(locale, "file.exportPdf", "menuExportPdf", None),
            MenuNode::Separator,
            submenu(locale, "menuOpenRecent", recent_entries(locale, recent)),
        ],
    );

    let edit = submenu(
        locale,
        "menuEdit",
        vec![
            action(locale, "edit.undo", "menuUndo", Some("CmdOrCtrl+Z")),
            action(locale, "edit.redo", "menuRedo", Some("CmdOrCtrl+Shift+Z")),
            MenuNode::Separator,
            role(locale, StandardRole::Cut, "menuCut"),
            role(locale, StandardRole::Copy, "menuCopy"),
            role(locale, StandardRole::Paste, "menuPaste"),
            role(locale, StandardRole::SelectAll, "menuSelectAll"),
            MenuNode::Separator,
            action(locale, "edit.find", "menuFind", Some("CmdOrCtrl+F")),
        ],
    );

    let paragraph = submenu(
        locale,
        "menuParagraph",
        vec![
            action(locale, "paragraph.h1", "menuHeading1", None),
            action(locale, "paragraph.h2", "menuHeading2", None),
            action(locale, "paragraph.p", "menuParagraphText", None),
            action(locale, "paragraph.quote", "menuBlockquote", None),
        ],
    );

    let format = submenu(
        locale,
        "menuFormat",
        vec![
            action(locale, "format.bold", "menuBold", Some("CmdOrCtrl+B")),
            action(locale, "format.italic", "menuItalic", Some("CmdOrCtrl+I")),
            action(locale, "format.code", "menuInlineCode", None),
            MenuNode::Separator,
            action(locale, "format.table", "menuInsertTable", None),
        ],
    );

    let view = submenu(
        locale,
        "menuView",
        vec![
            action(locale, "view.toggleOutline", "menuToggleOutline", None),
            MenuNode::Separator,
            role(locale, StandardRole::ToggleFullscreen, "menuToggleFullscreen"),
        ],
    );

    let help = submenu(
        locale,
        "menuHelp",
        vec![action(locale, "help.about", "menuAbout", None)],
    );

    MenuDescription {
        menus: vec![file, edit, paragraph, format, view, help],
    }
}

fn submenu(locale: Locale, label_key: &str, children: Vec<MenuNode>) -> MenuNode {
    MenuNode::Submenu {
        label: t(locale, label_key),
        children,
    }
}

fn action(locale: Locale, id: &str, label_key: &str, accelerator: Option<&'static str>) -> MenuNode {
    MenuNode::Item(MenuItemSpec {
        id: id.to_string(),
        label: t(locale, label_key),
        accelerator,
        enabled: true,
        action: Some(MenuAction::new(id)),
    })
}

fn role(locale: Locale, role: StandardRole, label_key: &str) -> MenuNode {
    MenuNode::Role {
        role,
        label: t(locale, label_key),
    }
}

/// 最近文件子菜单：最多 6 项，以文件名为标签；为空时给出禁用的占位项
fn recent_entries(locale: Locale, recent: &[PathBuf]) -> Vec<MenuNode> {
    if recent.is_empty() {
        return vec![MenuNode::Item(MenuItemSpec {
            id: format!("{OPEN_RECENT_ACTION}.empty"),
            label: t(locale, "menuNoRecentFiles"),
            accelerator: None,
            enabled: false,
            action: None,
        })];
    }

    recent
        .iter()
        .take(RECENT_MENU_LIMIT)
        .enumerate()
        .map(|(index, path)| {
            MenuNode::Item(MenuItemSpec {
                id: format!("{OPEN_RECENT_ACTION}.{index}"),
                label: display_name(path),
                accelerator: None,
                enabled: true,
                action: Some(MenuAction::with_payload(
                    OPEN_RECENT_ACTION,
                    json!({ "path": path.to_string_lossy() }),
                )),
            })
        })
        .collect()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn top_labels(menu: &MenuDescription) -> Vec<String> {
        menu.menus
            .iter()
            .filter_map(|node| match node {
                MenuNode::Submenu { label, .. } => Some(label.clone()),
                _ => None,
            })
            .collect()
    }

    fn recent_submenu(menu: &MenuDescription) -> &[MenuNode] {
        let MenuNode::Submenu { children, .. } = &menu.menus[0] else {
            panic!("file menu missing");
        };
        match children.last() {
            Some(MenuNode::Submenu { children, .. }) => children,
            other => panic!("unexpected node: {other:?}"),
        }
    }

    #[test]
    fn top_level_structure_is_fixed_and_localized() {
        assert_eq!(
            top_labels(&build(Locale::EnUs, &[])),
            ["File", "Edit", "Paragraph", "Format", "View", "Help"]
        );
        assert_eq!(
            top_labels(&build(Locale::ZhCn, &[])),
            ["文件", "编辑", "段落", "格式", "视图", "帮助"]
        );
    }

    #[test]
    fn empty_recent_list_shows_disabled_placeholder() {
        let menu = build(Locale::EnUs, &[]);
        let entries = recent_submenu(&menu);
        assert_eq!(entries.len(), 1);
        let MenuNode::Item(item) = &entries[0] else {
            panic!("placeholder should be an item");
        };
        assert!(!item.enabled);
        assert!(item.action.is_none());
        assert_eq!(item.label, "No Recent Files");
    }

    #[test]
    fn recent_submenu_is_capped_and_carries_paths() {
        let recent: Vec<PathBuf> = (0..9).map(|i| PathBuf::from(format!("/notes/{i}.md"))).collect();
        let menu = build(Locale::EnUs, &recent);
        let entries = recent_submenu(&menu);
        assert_eq!(entries.len(), RECENT_MENU_LIMIT);

        let MenuNode::Item(first) = &entries[0] else {
            panic!("expected item");
        };
        assert_eq!(first.label, "0.md");
        let action = first.action.as_ref().unwrap();
        assert_eq!(action.id, OPEN_RECENT_ACTION);
        assert_eq!(action.payload, Some(json!({ "path": "/notes/0.md" })));
    }

    #[test]
    fn item_ids_are_unique_and_build_is_idempotent() {
        let recent = vec![PathBuf::from("/a.md"), PathBuf::from("/b.md")];
        let menu = build(Locale::ZhCn, &recent);
        let ids: HashSet<&str> = menu.items().iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids.len(), menu.items().len());
        assert_eq!(menu, build(Locale::ZhCn, &recent));
    }

    #[test]
    fn save_has_accelerator() {
        let menu = build(Locale::EnUs, &[]);
        let save = menu.items().into_iter().find(|item| item.id == "file.save").unwrap();
        assert_eq!(save.accelerator, Some("CmdOrCtrl+S"));
    }
}
