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

use crate::domain::models::resource::Resource;
use crate::domain::repositories::{RepositoryError, ResourceQuery, ResourceRepository};
use crate::infrastructure::database::entities::resource as resource_entity;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

/// 资源仓库实现
///
/// 基于SeaORM实现的资源数据访问层。抓取路径上没有并发访问
/// （编排器单线程顺序执行），资源选取只用普通事务，不加行锁。
#[derive(Clone)]
pub struct ResourceRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl ResourceRepositoryImpl {
    /// 创建新的资源仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<resource_entity::Model> for Resource {
    fn from(model: resource_entity::Model) -> Self {
        Self {
            id: model.id,
            project_id: model.project_id,
            url: model.url,
            depth: model.depth,
            content_type: model.content_type,
            parent: model.parent,
            data: model.data,
            content: model.content,
            status: model.status,
            scrape_in_progress: model.scrape_in_progress,
            scraped_at: model.scraped_at,
            actions: model
                .actions
                .and_then(|value| serde_json::from_value(value).ok())
                .unwrap_or_default(),
            resources_to_add: Vec::new(),
            created_at: model.created_at,
        }
    }
}

impl From<&Resource> for resource_entity::ActiveModel {
    fn from(resource: &Resource) -> Self {
        let actions = if resource.actions.is_empty() {
            None
        } else {
            serde_json::to_value(&resource.actions).ok()
        };

        Self {
            id: Set(resource.id),
            project_id: Set(resource.project_id),
            url: Set(resource.url.clone()),
            depth: Set(resource.depth),
            content_type: Set(resource.content_type.clone()),
            parent: Set(resource.parent),
            data: Set(resource.data.clone()),
            content: Set(resource.content.clone()),
            status: Set(resource.status),
            scrape_in_progress: Set(resource.scrape_in_progress),
            scraped_at: Set(resource.scraped_at),
            actions: Set(actions),
            created_at: Set(resource.created_at),
        }
    }
}

#[async_trait]
impl ResourceRepository for ResourceRepositoryImpl {
    async fn create(&self, resource: &Resource) -> Result<Resource, RepositoryError> {
        let model: resource_entity::ActiveModel = resource.into();

        model.insert(self.db.as_ref()).await?;
        Ok(resource.clone())
    }

    async fn create_many(&self, resources: &[Resource]) -> Result<u64, RepositoryError> {
        if resources.is_empty() {
            return Ok(0);
        }

        let models: Vec<resource_entity::ActiveModel> =
            resources.iter().map(Into::into).collect();
        resource_entity::Entity::insert_many(models)
            .exec(self.db.as_ref())
            .await?;

        Ok(resources.len() as u64)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Resource>, RepositoryError> {
        let model = resource_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn acquire_next_unscraped(
        &self,
        project_id: Uuid,
    ) -> Result<Option<Resource>, RepositoryError> {
        let txn = self.db.begin().await?;

        let model = resource_entity::Entity::find()
            .filter(resource_entity::Column::ProjectId.eq(project_id))
            .filter(resource_entity::Column::ScrapedAt.is_null())
            .filter(resource_entity::Column::ScrapeInProgress.eq(false))
            .order_by_asc(resource_entity::Column::CreatedAt)
            .one(&txn)
            .await?;

        if let Some(model) = model {
            let mut active: resource_entity::ActiveModel = model.into();
            active.scrape_in_progress = Set(true);

            let updated = active.update(&txn).await?;
            txn.commit().await?;

            return Ok(Some(updated.into()));
        }

        txn.commit().await?;
        Ok(None)
    }

    async fn update(&self, resource: &Resource) -> Result<Resource, RepositoryError> {
        let mut active: resource_entity::ActiveModel = resource.into();

        // 盖上抓取时间戳：该资源从此不会再被选取，无论本轮成败
        active.scraped_at = Set(Some(Utc::now().into()));
        active.scrape_in_progress = Set(false);

        let updated = active.update(self.db.as_ref()).await?;
        Ok(updated.into())
    }

    async fn exists_by_url(&self, project_id: Uuid, url: &str) -> Result<bool, RepositoryError> {
        let count = resource_entity::Entity::find()
            .filter(resource_entity::Column::ProjectId.eq(project_id))
            .filter(resource_entity::Column::Url.eq(url))
            .count(self.db.as_ref())
            .await?;

        Ok(count > 0)
    }

    async fn find_paged(
        &self,
        project_id: Uuid,
        query: ResourceQuery,
    ) -> Result<Vec<Resource>, RepositoryError> {
        let mut select =
            resource_entity::Entity::find().filter(resource_entity::Column::ProjectId.eq(project_id));

        for column in &query.where_not_null {
            select = match column.as_str() {
                "data" => select.filter(resource_entity::Column::Data.is_not_null()),
                "content" => select.filter(resource_entity::Column::Content.is_not_null()),
                "content_type" => {
                    select.filter(resource_entity::Column::ContentType.is_not_null())
                }
                "status" => select.filter(resource_entity::Column::Status.is_not_null()),
                "scraped_at" => select.filter(resource_entity::Column::ScrapedAt.is_not_null()),
                other => {
                    return Err(RepositoryError::Database(DbErr::Custom(format!(
                        "Unknown filter column: {other}"
                    ))))
                }
            };
        }

        select = select.order_by_asc(resource_entity::Column::CreatedAt);
        if query.offset > 0 {
            select = select.offset(query.offset);
        }
        if let Some(limit) = query.limit {
            select = select.limit(limit);
        }

        let models = select.all(self.db.as_ref()).await?;
        let mut resources: Vec<Resource> = models.into_iter().map(Into::into).collect();

        // 列投影在载入后应用：未选中的列清空，标识列始终保留
        if let Some(cols) = &query.cols {
            for resource in &mut resources {
                if !cols.iter().any(|c| c == "content_type") {
                    resource.content_type = None;
                }
                if !cols.iter().any(|c| c == "data") {
                    resource.data = None;
                }
                if !cols.iter().any(|c| c == "content") {
                    resource.content = None;
                }
                if !cols.iter().any(|c| c == "status") {
                    resource.status = None;
                }
                if !cols.iter().any(|c| c == "scraped_at") {
                    resource.scraped_at = None;
                }
                if !cols.iter().any(|c| c == "actions") {
                    resource.actions = Vec::new();
                }
            }
        }

        Ok(resources)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        resource_entity::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await?;
        Ok(())
    }

    async fn delete_all(&self, project_id: Uuid) -> Result<u64, RepositoryError> {
        let result = resource_entity::Entity::delete_many()
            .filter(resource_entity::Column::ProjectId.eq(project_id))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected)
    }
}
