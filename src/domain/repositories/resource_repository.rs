// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::resource::Resource;
use crate::domain::repositories::RepositoryError;
use async_trait::async_trait;
use uuid::Uuid;

/// 资源分页查询参数
///
/// 支持偏移+限制分页、列投影与非空列过滤
#[derive(Debug, Default, Clone)]
pub struct ResourceQuery {
    pub offset: u64,
    pub limit: Option<u64>,
    /// 仅加载指定列，其余字段保持空值；None 表示全部列
    pub cols: Option<Vec<String>>,
    /// 仅返回指定列非空的资源
    pub where_not_null: Vec<String>,
}

/// 资源仓库特质
///
/// 定义资源数据访问接口。核心引擎只依赖这些操作，不关心表结构与后端。
#[async_trait]
pub trait ResourceRepository: Send + Sync {
    /// 创建新资源
    async fn create(&self, resource: &Resource) -> Result<Resource, RepositoryError>;
    /// 批量创建资源
    async fn create_many(&self, resources: &[Resource]) -> Result<u64, RepositoryError>;
    /// 根据ID查找资源
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Resource>, RepositoryError>;
    /// 获取项目中下一个未抓取的资源并标记其进入抓取
    ///
    /// `scraped_at` 非空或已在抓取中的资源永远不会被返回
    async fn acquire_next_unscraped(
        &self,
        project_id: Uuid,
    ) -> Result<Option<Resource>, RepositoryError>;
    /// 更新资源并盖抓取完成时间戳
    ///
    /// 同时清除 `scrape_in_progress`。一个资源无论成功失败只会被尝试一次，
    /// 依赖的就是这里盖下的时间戳。
    async fn update(&self, resource: &Resource) -> Result<Resource, RepositoryError>;
    /// 检查项目内URL是否已存在
    async fn exists_by_url(&self, project_id: Uuid, url: &str) -> Result<bool, RepositoryError>;
    /// 分页查询项目资源
    async fn find_paged(
        &self,
        project_id: Uuid,
        query: ResourceQuery,
    ) -> Result<Vec<Resource>, RepositoryError>;
    /// 删除资源
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
    /// 删除项目全部资源
    async fn delete_all(&self, project_id: Uuid) -> Result<u64, RepositoryError>;
}
