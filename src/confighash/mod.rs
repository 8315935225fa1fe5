// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::scraper::ScrapeDefinition;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{Read, Write};
use thiserror::Error;

/// 作业定义编码错误类型
#[derive(Error, Debug)]
pub enum ConfigHashError {
    /// base64解码失败
    #[error("Invalid base64 encoding: {0}")]
    Base64(#[from] base64::DecodeError),
    /// 压缩流无效
    #[error("Invalid deflate stream: {0}")]
    Deflate(#[from] std::io::Error),
    /// JSON载荷无效
    #[error("Invalid definition payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// 将作业定义编码为不透明哈希
///
/// JSON → deflate → base64(url-safe)，便于在命令行和URL里传递
pub fn encode(definition: &ScrapeDefinition) -> Result<String, ConfigHashError> {
    let json = serde_json::to_vec(definition)?;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    let compressed = encoder.finish()?;

    Ok(URL_SAFE_NO_PAD.encode(compressed))
}

/// 将不透明哈希解码回作业定义
pub fn decode(hash: &str) -> Result<ScrapeDefinition, ConfigHashError> {
    let compressed = URL_SAFE_NO_PAD.decode(hash.trim())?;

    let mut decoder = ZlibDecoder::new(compressed.as_slice());
    let mut json = Vec::new();
    decoder.read_to_end(&mut json)?;

    Ok(serde_json::from_slice(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::plugin_opts::PluginOpts;
    use serde_json::json;

    #[test]
    fn decode_inverts_encode() {
        let definition = ScrapeDefinition {
            url: "https://example.com/start".to_string(),
            scenario: "static-content".to_string(),
            plugin_opts: vec![PluginOpts {
                name: "extract-urls".to_string(),
                opts: json!({ "max_depth": 3 }),
                ..Default::default()
            }],
        };

        let hash = encode(&definition).unwrap();
        let decoded = decode(&hash).unwrap();

        assert_eq!(decoded, definition);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode("definitely not a hash!!!").is_err());
        // 合法base64但不是压缩流
        assert!(decode("aGVsbG8").is_err());
    }
}
