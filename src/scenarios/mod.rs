// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::plugin_opts::PluginOpts;
use once_cell::sync::Lazy;
use serde_json::json;
use std::collections::HashMap;
use thiserror::Error;

/// 场景合并算法
pub mod merge;

pub use merge::merge_plugin_opts;

/// 场景错误类型
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// 合并锚点无法解析
    #[error("Unresolvable {kind} anchor '{target}' for plugin '{plugin}'")]
    AnchorNotFound {
        kind: &'static str,
        target: String,
        plugin: String,
    },
}

/// 场景
///
/// 一份可复用的默认流水线配置模板
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: &'static str,
    pub default_plugin_opts: Vec<PluginOpts>,
}

/// 内置场景注册表
static SCENARIOS: Lazy<HashMap<&'static str, Scenario>> = Lazy::new(|| {
    let mut scenarios = HashMap::new();

    scenarios.insert(
        "static-content",
        Scenario {
            name: "static-content",
            default_plugin_opts: vec![
                PluginOpts::named("select-resource"),
                PluginOpts::named("fetch"),
                PluginOpts {
                    name: "extract-urls".to_string(),
                    opts: json!({ "max_depth": 10 }),
                    ..Default::default()
                },
                PluginOpts {
                    name: "extract-html-content".to_string(),
                    opts: json!({ "selectors": ["h1", "h2", "p"] }),
                    ..Default::default()
                },
                PluginOpts::named("insert-resources"),
                PluginOpts::named("upsert-resource"),
            ],
        },
    );

    scenarios.insert(
        "browser-static-content",
        Scenario {
            name: "browser-static-content",
            default_plugin_opts: vec![
                PluginOpts::named("select-resource"),
                PluginOpts::named("browser-fetch"),
                PluginOpts {
                    name: "extract-urls".to_string(),
                    dom_read: true,
                    opts: json!({ "max_depth": 10 }),
                    ..Default::default()
                },
                PluginOpts {
                    name: "extract-html-content".to_string(),
                    dom_read: true,
                    opts: json!({ "selectors": ["h1", "h2", "p"] }),
                    ..Default::default()
                },
                PluginOpts::named("insert-resources"),
                PluginOpts::named("upsert-resource"),
            ],
        },
    );

    // 滚动插件位于内容提取之后、落库之前：先提取当前视口内容，
    // 再触发滚动产生动态子资源
    scenarios.insert(
        "browser-dynamic-content",
        Scenario {
            name: "browser-dynamic-content",
            default_plugin_opts: vec![
                PluginOpts::named("select-resource"),
                PluginOpts::named("browser-fetch"),
                PluginOpts {
                    name: "extract-urls".to_string(),
                    dom_read: true,
                    opts: json!({ "max_depth": 10 }),
                    ..Default::default()
                },
                PluginOpts {
                    name: "extract-html-content".to_string(),
                    dom_read: true,
                    opts: json!({ "selectors": ["h1", "h2", "p"] }),
                    ..Default::default()
                },
                PluginOpts {
                    name: "scroll".to_string(),
                    dom_write: true,
                    opts: json!({ "max_scroll_no": 5, "delay_ms": 1000 }),
                    ..Default::default()
                },
                PluginOpts::named("insert-resources"),
                PluginOpts::named("upsert-resource"),
            ],
        },
    );

    scenarios
});

/// 查找内置场景
pub fn get(name: &str) -> Option<&'static Scenario> {
    SCENARIOS.get(name)
}

/// 解析作业的插件配置列表
///
/// 场景存在时将其默认列表与覆盖列表合并；场景未知时直接使用覆盖列表
pub fn resolve(scenario: &str, overrides: &[PluginOpts]) -> Result<Vec<PluginOpts>, ScenarioError> {
    match get(scenario) {
        Some(scenario) => merge_plugin_opts(&scenario.default_plugin_opts, overrides),
        None => Ok(overrides.to_vec()),
    }
}
