//! # 菜单描述数据模型
//!
//! 菜单合成器输出的纯数据树。它不引用任何 Tauri 类型，
//! 由 `desktop::menu` 负责转换为原生菜单。

use serde::Serialize;
use serde_json::Value;

/// 菜单动作：用户点击菜单项后派发给前端的事件内容
///
/// 事件名 `menu:action`，对应前端 TypeScript 接口：
/// ```typescript
/// interface MenuActionPayload {
///   id: string;
///   payload?: unknown;
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuAction {
    /// 稳定的动作标识（如 "file.save"）
    pub id: String,

    /// 附加数据（如最近文件的 `{ path }`）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl MenuAction {
    /// 不带附加数据的动作
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            payload: None,
        }
    }

    /// 带附加数据的动作
    ///
    /// # 参数
    /// - `id` - 动作标识
    /// - `payload` - 随 `menu:action` 事件发给前端的数据
    pub fn with_payload(id: &str, payload: Value) -> Self {
        Self {
            id: id.to_string(),
            payload: Some(payload),
        }
    }
}

/// 由系统提供行为的标准菜单项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardRole {
    Cut,
    Copy,
    Paste,
    SelectAll,
    /// 全屏切换：宿主直接作用于当前窗口，不派发给前端
    ToggleFullscreen,
}

/// 普通菜单项
#[derive(Debug, Clone, PartialEq)]
pub struct MenuItemSpec {
    /// 原生菜单项 ID，在整棵树内唯一
    pub id: String,
    pub label: String,
    /// 快捷键（Tauri 加速键语法，如 "CmdOrCtrl+S"）
    pub accelerator: Option<&'static str>,
    pub enabled: bool,
    /// 点击后派发的动作；禁用的占位项为 `None`
    pub action: Option<MenuAction>,
}

/// 菜单树节点
#[derive(Debug, Clone, PartialEq)]
pub enum MenuNode {
    Item(MenuItemSpec),
    Role { role: StandardRole, label: String },
    Separator,
    Submenu { label: String, children: Vec<MenuNode> },
}

/// 完整的应用菜单描述：顶层为若干子菜单
#[derive(Debug, Clone, PartialEq)]
pub struct MenuDescription {
    pub menus: Vec<MenuNode>,
}

impl MenuDescription {
    /// 深度优先遍历所有普通菜单项
    pub fn items(&self) -> Vec<&MenuItemSpec> {
        fn walk<'a>(nodes: &'a [MenuNode], out: &mut Vec<&'a MenuItemSpec>) {
            for node in nodes {
                match node {
                    MenuNode::Item(item) => out.push(item),
                    MenuNode::Submenu { children, .. } => walk(children, out),
                    MenuNode::Role { .. } | MenuNode::Separator => {}
                }
            }
        }

        let mut out = Vec::new();
        walk(&self.menus, &mut out);
        out
    }
}
