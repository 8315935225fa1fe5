// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::project::Project;
use crate::domain::repositories::{RepositoryError, ResourceRepository};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

/// CSV导出器
pub mod csv_exporter;
/// NDJSON导出器
pub mod json_lines_exporter;

pub use csv_exporter::CsvExporter;
pub use json_lines_exporter::JsonLinesExporter;

/// 导出错误类型
#[derive(Error, Debug)]
pub enum ExportError {
    /// IO错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// CSV写出错误
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// 仓库错误
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
    /// 序列化错误
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// 导出选项
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// 导出类型：csv 或 ndjson
    pub export_type: String,
}

/// 导出器特质
///
/// 接受一个已完成的项目和目标路径，写出抓取结果
#[async_trait]
pub trait Exporter: Send + Sync {
    async fn export(&self, project: &Project, path: &Path) -> Result<(), ExportError>;
}

/// 按类型分发导出
///
/// 不支持的类型是配置错误：上报后忽略，不影响调用方
pub async fn export_project(
    resources: Arc<dyn ResourceRepository>,
    project: &Project,
    path: &Path,
    opts: &ExportOptions,
) -> Result<(), ExportError> {
    match opts.export_type.as_str() {
        "csv" => CsvExporter::new(resources).export(project, path).await,
        "ndjson" => JsonLinesExporter::new(resources).export(project, path).await,
        other => {
            error!("Unsupported export type {other}");
            Ok(())
        }
    }
}
