// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::browser::client::BrowserClient;
use crate::domain::models::plugin_opts::PluginOpts;
use crate::domain::models::project::Project;
use crate::domain::models::resource::{Resource, ResourcePatch};
use crate::plugins::{ApplyResult, Plugin, PluginError};
use async_trait::async_trait;
use scraper::{Html, Selector};
use serde_json::{json, Value};
use tracing::debug;

pub const NAME: &str = "extract-html-content";

/// 在渲染器内运行的对应实现，从实时DOM中提取文本内容
pub const BUNDLE: &str = r#"
class ExtractHtmlContentPlugin {
  constructor(opts) {
    this.opts = opts || {};
  }

  test(project, resource) {
    return !!resource;
  }

  apply(project, resource) {
    const selectors = this.opts.selectors || ['h1', 'h2', 'p'];
    const rows = [];
    for (const selector of selectors) {
      for (const element of document.querySelectorAll(selector)) {
        const text = (element.textContent || '').trim();
        if (text.length > 0) {
          rows.push([selector, text]);
        }
      }
    }
    return { content: rows };
  }
}
"#;

/// HTML内容提取插件
///
/// 按配置的CSS选择器从HTML载荷中提取文本，产出行式结构化内容：
/// 每行为 `[selector, text]`，供导出器直接展开。
pub struct ExtractHtmlContentPlugin {
    opts: PluginOpts,
}

impl ExtractHtmlContentPlugin {
    pub fn new(opts: PluginOpts) -> Self {
        Self { opts }
    }

    fn selectors(&self) -> Vec<String> {
        self.opts
            .opt("selectors")
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_else(|| vec!["h1".to_string(), "h2".to_string(), "p".to_string()])
    }
}

#[async_trait]
impl Plugin for ExtractHtmlContentPlugin {
    fn name(&self) -> &'static str {
        NAME
    }

    fn opts(&self) -> &PluginOpts {
        &self.opts
    }

    async fn test(
        &self,
        _project: &Project,
        resource: Option<&Resource>,
    ) -> Result<bool, PluginError> {
        Ok(resource.is_some_and(|r| {
            r.data.is_some()
                && r.content_type
                    .as_deref()
                    .is_some_and(|ct| ct.contains("html"))
        }))
    }

    async fn apply(
        &self,
        _project: &Project,
        resource: Option<&Resource>,
        _browser: &dyn BrowserClient,
    ) -> Result<Option<ApplyResult>, PluginError> {
        let Some(resource) = resource else {
            return Ok(None);
        };
        let Some(data) = &resource.data else {
            return Ok(None);
        };

        let html = String::from_utf8_lossy(data);
        let document = Html::parse_document(&html);

        let mut rows: Vec<Value> = Vec::new();
        for selector_str in self.selectors() {
            let selector = Selector::parse(&selector_str)
                .map_err(|e| PluginError::InvalidOptions(format!("Invalid selector: {e:?}")))?;

            for element in document.select(&selector) {
                let text: String = element.text().collect::<Vec<_>>().join(" ");
                let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
                if !text.is_empty() {
                    rows.push(json!([selector_str, text]));
                }
            }
        }

        debug!(url = %resource.url, rows = rows.len(), "Extracted html content");

        Ok(Some(ApplyResult::Patch(ResourcePatch {
            content: Some(Value::Array(rows)),
            ..Default::default()
        })))
    }
}
