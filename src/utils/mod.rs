//! # 通用工具模块
//!
//! - `path` - 应用数据目录与系统目录的路径解析

pub mod path;
