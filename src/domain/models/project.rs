// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::plugin_opts::PluginOpts;
use chrono::{DateTime, FixedOffset, Utc};
use serde_json::{json, Value};
use url::Url;
use uuid::Uuid;

/// 项目
///
/// 一个命名的抓取作业。插件配置列表在创建时即固定，抓取过程中不再变更；
/// 由配置实例化出的插件对象只存在于内存中，不持久化。
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    /// 根URL，抓取的起点
    pub url: String,
    /// 已解析的有序插件配置列表
    pub plugin_opts: Vec<PluginOpts>,
    pub created_at: DateTime<FixedOffset>,
}

impl Project {
    /// 从根URL创建新项目，项目名取URL的主机名
    pub fn from_url(url: &str, plugin_opts: Vec<PluginOpts>) -> Result<Self, url::ParseError> {
        let parsed = Url::parse(url)?;
        let name = parsed
            .host_str()
            .map(str::to_string)
            .unwrap_or_else(|| url.to_string());

        Ok(Self {
            id: Uuid::new_v4(),
            name,
            url: url.to_string(),
            plugin_opts,
            created_at: Utc::now().into(),
        })
    }

    /// 生成可注入远程渲染器的JSON快照
    pub fn snapshot(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "url": self.url,
        })
    }
}
