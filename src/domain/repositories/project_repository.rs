// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::project::Project;
use crate::domain::repositories::RepositoryError;
use async_trait::async_trait;
use uuid::Uuid;

/// 项目仓库特质
///
/// 定义项目数据访问接口
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// 创建新项目
    async fn create(&self, project: &Project) -> Result<Project, RepositoryError>;
    /// 根据ID查找项目
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Project>, RepositoryError>;
    /// 根据名称查找项目
    async fn find_by_name(&self, name: &str) -> Result<Option<Project>, RepositoryError>;
    /// 更新项目
    async fn update(&self, project: &Project) -> Result<Project, RepositoryError>;
    /// 删除项目
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
    /// 删除全部项目
    async fn delete_all(&self) -> Result<u64, RepositoryError>;
    /// 检查存储后端连通性
    async fn ping(&self) -> Result<(), RepositoryError>;
}
