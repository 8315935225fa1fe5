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

use crate::domain::models::project::Project;
use crate::domain::repositories::{ProjectRepository, RepositoryError};
use crate::infrastructure::database::entities::project as project_entity;
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 项目仓库实现
///
/// 基于SeaORM实现的项目数据访问层
#[derive(Clone)]
pub struct ProjectRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl ProjectRepositoryImpl {
    /// 创建新的项目仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<project_entity::Model> for Project {
    fn from(model: project_entity::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            url: model.url,
            plugin_opts: serde_json::from_value(model.plugin_opts).unwrap_or_default(),
            created_at: model.created_at,
        }
    }
}

impl TryFrom<&Project> for project_entity::ActiveModel {
    type Error = RepositoryError;

    fn try_from(project: &Project) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Set(project.id),
            name: Set(project.name.clone()),
            url: Set(project.url.clone()),
            plugin_opts: Set(serde_json::to_value(&project.plugin_opts)?),
            created_at: Set(project.created_at),
        })
    }
}

#[async_trait]
impl ProjectRepository for ProjectRepositoryImpl {
    async fn create(&self, project: &Project) -> Result<Project, RepositoryError> {
        let model: project_entity::ActiveModel = project.try_into()?;

        model.insert(self.db.as_ref()).await?;
        Ok(project.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Project>, RepositoryError> {
        let model = project_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Project>, RepositoryError> {
        let model = project_entity::Entity::find()
            .filter(project_entity::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn update(&self, project: &Project) -> Result<Project, RepositoryError> {
        let model: project_entity::ActiveModel = project.try_into()?;

        let updated = model.update(self.db.as_ref()).await?;
        Ok(updated.into())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        project_entity::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await?;
        Ok(())
    }

    async fn delete_all(&self) -> Result<u64, RepositoryError> {
        let result = project_entity::Entity::delete_many()
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.db.ping().await?;
        Ok(())
    }
}
