// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 插件配置
///
/// 流水线中一个命名的插件条目。`before`/`after`/`replace` 锚点仅在场景合并
/// 阶段生效，合并结果中不保留锚点。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginOpts {
    /// 插件注册名
    pub name: String,
    /// 是否需要在远程渲染器中读取DOM
    pub dom_read: bool,
    /// 是否需要在远程渲染器中写入DOM
    pub dom_write: bool,
    /// 合并锚点：插入到指定插件之前
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    /// 合并锚点：插入到指定插件之后
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    /// 合并锚点：原位替换指定插件
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replace: Option<String>,
    /// 插件自由格式选项（如 max_depth、selectors 等）
    #[serde(skip_serializing_if = "Value::is_null")]
    pub opts: Value,
}

impl PluginOpts {
    /// 创建仅包含名称的插件配置
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// 是否携带任一合并锚点
    pub fn has_anchor(&self) -> bool {
        self.before.is_some() || self.after.is_some() || self.replace.is_some()
    }

    /// 是否需要路由到远程渲染器执行
    pub fn needs_dom(&self) -> bool {
        self.dom_read || self.dom_write
    }

    /// 读取一个选项字段
    pub fn opt(&self, key: &str) -> Option<&Value> {
        self.opts.get(key)
    }

    /// 读取一个u64选项，不存在时返回默认值
    pub fn opt_u64(&self, key: &str, default: u64) -> u64 {
        self.opt(key).and_then(Value::as_u64).unwrap_or(default)
    }
}
