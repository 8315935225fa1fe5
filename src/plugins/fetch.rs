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
use std::time::Duration;
use tracing::debug;

pub const NAME: &str = "fetch";

/// HTTP抓取插件
///
/// 通过HTTP客户端拉取资源载荷，不经过渲染器。适用于静态内容场景。
pub struct FetchPlugin {
    opts: PluginOpts,
    client: reqwest::Client,
}

impl FetchPlugin {
    pub fn new(opts: PluginOpts, client: reqwest::Client) -> Self {
        Self { opts, client }
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.opts.opt_u64("timeout_secs", 30))
    }
}

#[async_trait]
impl Plugin for FetchPlugin {
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
        // 已有载荷的资源不再重复抓取
        Ok(resource.is_some_and(|r| r.data.is_none()))
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

        let response = self
            .client
            .get(&resource.url)
            .timeout(self.timeout())
            .send()
            .await?;

        let status = response.status().as_u16() as i16;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string());

        let data = response.bytes().await?;
        debug!(url = %resource.url, status, bytes = data.len(), "Fetched resource");

        Ok(Some(ApplyResult::Patch(ResourcePatch {
            status: Some(status),
            content_type,
            data: Some(data.to_vec()),
            ..Default::default()
        })))
    }
}
