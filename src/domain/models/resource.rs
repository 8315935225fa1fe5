// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

/// 资源
///
/// 一次抓取工作的最小单元：一个URL及其抓取状态。
/// `scraped_at` 非空的资源不会再次被选取；`actions` 非空的资源为动态资源，
/// 在DOM变更后可重新进入插件流水线。
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub id: Uuid,
    pub project_id: Uuid,
    pub url: String,
    /// 爬取深度，根资源为0
    pub depth: i32,
    pub content_type: Option<String>,
    /// 发现本资源的父资源（仅用于溯源）
    pub parent: Option<Uuid>,
    /// 原始二进制载荷
    pub data: Option<Vec<u8>>,
    /// 结构化内容（行式布局）
    pub content: Option<Value>,
    /// HTTP状态码
    pub status: Option<i16>,
    pub scrape_in_progress: bool,
    pub scraped_at: Option<DateTime<FixedOffset>>,
    /// 待执行的DOM变更动作，非空则为动态资源
    pub actions: Vec<String>,
    /// 提取插件发现、等待插入的新资源种子，不持久化
    pub resources_to_add: Vec<ResourceSeed>,
    pub created_at: DateTime<FixedOffset>,
}

/// 新资源种子
///
/// 提取插件产出的最小资源描述，由 insert-resources 插件落库
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSeed {
    pub url: String,
    pub depth: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Uuid>,
}

/// 资源补丁
///
/// 插件返回的部分字段集合，由显式合并逐字段覆盖到当前资源上，
/// 后写者胜。远程桥返回的JSON也反序列化为该类型。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourcePatch {
    pub url: Option<String>,
    pub content_type: Option<String>,
    pub data: Option<Vec<u8>>,
    pub content: Option<Value>,
    pub status: Option<i16>,
    pub scrape_in_progress: Option<bool>,
    pub scraped_at: Option<DateTime<FixedOffset>>,
    pub actions: Option<Vec<String>>,
    pub resources_to_add: Option<Vec<ResourceSeed>>,
}

impl Resource {
    /// 创建一个未抓取的新资源
    pub fn new(project_id: Uuid, url: &str, depth: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id,
            url: url.to_string(),
            depth,
            content_type: None,
            parent: None,
            data: None,
            content: None,
            status: None,
            scrape_in_progress: false,
            scraped_at: None,
            actions: Vec::new(),
            resources_to_add: Vec::new(),
            created_at: Utc::now().into(),
        }
    }

    /// 由种子创建资源
    pub fn from_seed(project_id: Uuid, seed: &ResourceSeed) -> Self {
        let mut resource = Self::new(project_id, &seed.url, seed.depth);
        resource.parent = seed.parent;
        resource
    }

    /// 是否为动态资源（仍有未消费的DOM动作）
    pub fn is_dynamic(&self) -> bool {
        !self.actions.is_empty()
    }

    /// 派生动态子资源
    ///
    /// 仅携带 url/depth/content_type/parent/actions，其余字段重置。
    /// DOM动作执行后，通过该子资源重新走一遍完整的插件流水线。
    pub fn dynamic_child(&self) -> Resource {
        Resource {
            id: Uuid::new_v4(),
            project_id: self.project_id,
            url: self.url.clone(),
            depth: self.depth,
            content_type: self.content_type.clone(),
            parent: self.parent,
            data: None,
            content: None,
            status: None,
            scrape_in_progress: false,
            scraped_at: None,
            actions: self.actions.clone(),
            resources_to_add: Vec::new(),
            created_at: Utc::now().into(),
        }
    }

    /// 合并补丁，产生新的资源值
    ///
    /// 逐字段覆盖，补丁中为 `Some` 的字段胜出。显式产生新值而不是原地
    /// 修改，插件之间不共享可变别名。
    pub fn merged(&self, patch: ResourcePatch) -> Resource {
        let mut next = self.clone();
        if let Some(url) = patch.url {
            next.url = url;
        }
        if let Some(content_type) = patch.content_type {
            next.content_type = Some(content_type);
        }
        if let Some(data) = patch.data {
            next.data = Some(data);
        }
        if let Some(content) = patch.content {
            next.content = Some(content);
        }
        if let Some(status) = patch.status {
            next.status = Some(status);
        }
        if let Some(in_progress) = patch.scrape_in_progress {
            next.scrape_in_progress = in_progress;
        }
        if let Some(scraped_at) = patch.scraped_at {
            next.scraped_at = Some(scraped_at);
        }
        if let Some(actions) = patch.actions {
            next.actions = actions;
        }
        if let Some(seeds) = patch.resources_to_add {
            next.resources_to_add = seeds;
        }
        next
    }

    /// 生成可注入远程渲染器的JSON快照
    ///
    /// 二进制载荷不进入快照，DOM侧插件直接读取页面本身
    pub fn snapshot(&self) -> Value {
        json!({
            "id": self.id,
            "url": self.url,
            "depth": self.depth,
            "content_type": self.content_type,
            "status": self.status,
            "content": self.content,
            "actions": self.actions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merged_overwrites_only_patched_fields() {
        let resource = Resource::new(Uuid::new_v4(), "https://example.com/a", 1);

        let patch = ResourcePatch {
            status: Some(200),
            content_type: Some("text/html".to_string()),
            ..Default::default()
        };
        let merged = resource.merged(patch);

        assert_eq!(merged.status, Some(200));
        assert_eq!(merged.content_type.as_deref(), Some("text/html"));
        assert_eq!(merged.url, resource.url);
        assert_eq!(merged.depth, resource.depth);
        assert!(merged.scraped_at.is_none());
    }

    #[test]
    fn merged_last_writer_wins() {
        let resource = Resource::new(Uuid::new_v4(), "https://example.com/a", 0);

        let first = ResourcePatch {
            content: Some(json!([["title1"]])),
            ..Default::default()
        };
        let second = ResourcePatch {
            content: Some(json!([["title2"]])),
            ..Default::default()
        };

        let merged = resource.merged(first).merged(second);
        assert_eq!(merged.content, Some(json!([["title2"]])));
    }

    #[test]
    fn dynamic_child_carries_identity_fields_only() {
        let mut resource = Resource::new(Uuid::new_v4(), "https://example.com/feed", 2);
        resource.content_type = Some("text/html".to_string());
        resource.parent = Some(Uuid::new_v4());
        resource.data = Some(vec![1, 2, 3]);
        resource.content = Some(json!([["row"]]));
        resource.status = Some(200);
        resource.actions = vec!["scroll".to_string()];

        let child = resource.dynamic_child();

        assert_ne!(child.id, resource.id);
        assert_eq!(child.url, resource.url);
        assert_eq!(child.depth, resource.depth);
        assert_eq!(child.content_type, resource.content_type);
        assert_eq!(child.parent, resource.parent);
        assert_eq!(child.actions, resource.actions);
        assert!(child.data.is_none());
        assert!(child.content.is_none());
        assert!(child.status.is_none());
        assert!(child.scraped_at.is_none());
    }
}
