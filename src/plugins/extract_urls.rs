// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::browser::client::BrowserClient;
use crate::domain::models::plugin_opts::PluginOpts;
use crate::domain::models::project::Project;
use crate::domain::models::resource::{Resource, ResourcePatch, ResourceSeed};
use crate::plugins::{ApplyResult, Plugin, PluginError};
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::debug;
use url::Url;

pub const NAME: &str = "extract-urls";

/// 在渲染器内运行的对应实现，读取实时DOM中的链接
pub const BUNDLE: &str = r#"
class ExtractUrlsPlugin {
  constructor(opts) {
    this.opts = opts || {};
  }

  test(project, resource) {
    if (!resource) return false;
    const maxDepth = this.opts.max_depth !== undefined ? this.opts.max_depth : 10;
    return resource.depth < maxDepth;
  }

  apply(project, resource) {
    const seen = new Set();
    const seeds = [];
    for (const anchor of document.querySelectorAll('a[href]')) {
      let href;
      try {
        href = new URL(anchor.href, resource.url);
      }
      catch (err) {
        continue;
      }
      if (href.protocol !== 'http:' && href.protocol !== 'https:') continue;
      href.hash = '';
      const url = href.toString();
      if (url === resource.url || seen.has(url)) continue;
      seen.add(url);
      seeds.push({ url: url, depth: resource.depth + 1, parent: resource.id });
    }
    return { resources_to_add: seeds };
  }
}
"#;

/// 链接提取插件
///
/// 从HTML载荷中提取 a[href] 链接：相对路径基于资源URL解析，只保留
/// http/https 协议，去掉片段标识以便去重，超过最大深度的资源不再扩展。
/// 产出的种子由 insert-resources 插件落库。
pub struct ExtractUrlsPlugin {
    opts: PluginOpts,
}

impl ExtractUrlsPlugin {
    pub fn new(opts: PluginOpts) -> Self {
        Self { opts }
    }

    fn max_depth(&self) -> i32 {
        self.opts.opt_u64("max_depth", 10) as i32
    }

    fn extract_links(html: &str, base_url: &str) -> Result<HashSet<String>, PluginError> {
        let fragment = Html::parse_document(html);
        let selector = Selector::parse("a[href]")
            .map_err(|e| PluginError::InvalidOptions(format!("Invalid selector: {e:?}")))?;
        let base = Url::parse(base_url)
            .map_err(|e| PluginError::InvalidOptions(format!("Invalid base url: {e}")))?;

        let mut links = HashSet::new();
        for element in fragment.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                // Ignore fragment identifiers, mailto and javascript links
                if href.starts_with('#')
                    || href.starts_with("mailto:")
                    || href.starts_with("javascript:")
                {
                    continue;
                }

                if let Ok(url) = base.join(href) {
                    // Only keep http/https links
                    if url.scheme() == "http" || url.scheme() == "https" {
                        // Remove fragment to improve deduplication
                        let mut url_clean = url.clone();
                        url_clean.set_fragment(None);
                        links.insert(url_clean.to_string());
                    }
                }
            }
        }

        Ok(links)
    }
}

#[async_trait]
impl Plugin for ExtractUrlsPlugin {
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
                && r.depth < self.max_depth()
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
        let links = Self::extract_links(&html, &resource.url)?;

        let seeds: Vec<ResourceSeed> = links
            .into_iter()
            .filter(|link| link != &resource.url)
            .map(|url| ResourceSeed {
                url,
                depth: resource.depth + 1,
                parent: Some(resource.id),
            })
            .collect();

        debug!(url = %resource.url, found = seeds.len(), "Extracted urls");

        Ok(Some(ApplyResult::Patch(ResourcePatch {
            resources_to_add: Some(seeds),
            ..Default::default()
        })))
    }
}
