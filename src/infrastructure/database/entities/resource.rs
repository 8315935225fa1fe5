// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "resources")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub project_id: Uuid,
    pub url: String,
    pub depth: i32,
    pub content_type: Option<String>,
    pub parent: Option<Uuid>,
    pub data: Option<Vec<u8>>,
    pub content: Option<Json>,
    pub status: Option<i16>,
    pub scrape_in_progress: bool,
    pub scraped_at: Option<ChronoDateTimeWithTimeZone>,
    pub actions: Option<Json>,
    pub created_at: ChronoDateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
