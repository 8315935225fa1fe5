// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::project::Project;
use crate::domain::repositories::{ResourceQuery, ResourceRepository};
use crate::export::{ExportError, Exporter};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::json;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

const PAGE_SIZE: u64 = 100;

/// NDJSON导出器
///
/// 每个资源一行JSON，二进制载荷以base64编码
pub struct JsonLinesExporter {
    resources: Arc<dyn ResourceRepository>,
}

impl JsonLinesExporter {
    pub fn new(resources: Arc<dyn ResourceRepository>) -> Self {
        Self { resources }
    }
}

#[async_trait]
impl Exporter for JsonLinesExporter {
    async fn export(&self, project: &Project, path: &Path) -> Result<(), ExportError> {
        let mut file = std::fs::File::create(path)?;
        let mut exported = 0u64;
        let mut offset = 0u64;

        loop {
            let page = self
                .resources
                .find_paged(
                    project.id,
                    ResourceQuery {
                        offset,
                        limit: Some(PAGE_SIZE),
                        ..Default::default()
                    },
                )
                .await?;

            if page.is_empty() {
                break;
            }

            for resource in &page {
                let line = json!({
                    "url": resource.url,
                    "depth": resource.depth,
                    "content_type": resource.content_type,
                    "status": resource.status,
                    "scraped_at": resource.scraped_at,
                    "content": resource.content,
                    "data": resource.data.as_ref().map(|d| BASE64.encode(d)),
                });
                serde_json::to_writer(&mut file, &line)?;
                file.write_all(b"\n")?;
                exported += 1;
            }

            offset += page.len() as u64;
            if (page.len() as u64) < PAGE_SIZE {
                break;
            }
        }

        file.flush()?;
        info!(project = %project.name, resources = exported, path = %path.display(), "NDJSON export complete");

        Ok(())
    }
}
