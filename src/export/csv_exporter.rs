// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::project::Project;
use crate::domain::repositories::{ResourceQuery, ResourceRepository};
use crate::export::{ExportError, Exporter};
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

const PAGE_SIZE: u64 = 100;

/// CSV导出器
///
/// 分页读取结构化内容非空的资源，把行式内容展开成CSV记录：
/// 每条记录为资源URL加上该行的各个单元格。
pub struct CsvExporter {
    resources: Arc<dyn ResourceRepository>,
}

impl CsvExporter {
    pub fn new(resources: Arc<dyn ResourceRepository>) -> Self {
        Self { resources }
    }
}

#[async_trait]
impl Exporter for CsvExporter {
    async fn export(&self, project: &Project, path: &Path) -> Result<(), ExportError> {
        let mut writer = csv::Writer::from_path(path)?;
        let mut exported_rows = 0u64;
        let mut offset = 0u64;

        loop {
            let page = self
                .resources
                .find_paged(
                    project.id,
                    ResourceQuery {
                        offset,
                        limit: Some(PAGE_SIZE),
                        cols: Some(vec!["url".to_string(), "content".to_string()]),
                        where_not_null: vec!["content".to_string()],
                    },
                )
                .await?;

            if page.is_empty() {
                break;
            }

            for resource in &page {
                let Some(Value::Array(rows)) = &resource.content else {
                    continue;
                };

                for row in rows {
                    let mut record = vec![resource.url.clone()];
                    match row {
                        Value::Array(cells) => {
                            record.extend(cells.iter().map(cell_to_string));
                        }
                        other => record.push(cell_to_string(other)),
                    }
                    writer.write_record(&record)?;
                    exported_rows += 1;
                }
            }

            offset += page.len() as u64;
            if (page.len() as u64) < PAGE_SIZE {
                break;
            }
        }

        writer.flush()?;
        info!(project = %project.name, rows = exported_rows, path = %path.display(), "CSV export complete");

        Ok(())
    }
}

fn cell_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
