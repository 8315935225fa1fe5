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

use crate::domain::models::plugin_opts::PluginOpts;
use crate::domain::models::project::Project;
use crate::domain::models::resource::{Resource, ResourcePatch};
use crate::plugins::{ApplyResult, PluginError};
use serde_json::Value;

/// 插件在渲染器 window 上的实例变量名
///
/// `extract-urls` 映射为 `inst_extract_urls`
pub fn remote_instance_name(plugin_name: &str) -> String {
    format!("inst_{}", plugin_name.replace('-', "_"))
}

/// 插件远程包中约定的类名
///
/// `extract-html-content` 映射为 `ExtractHtmlContentPlugin`
pub fn remote_class_name(plugin_name: &str) -> String {
    let pascal: String = plugin_name
        .split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();
    format!("{pascal}Plugin")
}

/// 生成注入渲染器的自包含执行单元
///
/// 单元的职责：
/// - 惰性实例化插件的远程对应物，一个会话内只创建一次，后续调用复用
///   同一实例（实例累积的状态，如滚动计数，随会话保留）
/// - 以JSON快照形式传入项目与资源，请求是数据而不是代码
/// - 调用远程 `test`/`apply` 契约
/// - 远程抛出的错误打包为 `{err}` 信封返回，由本地侧还原为插件失败
pub fn build_execution_unit(
    opts: &PluginOpts,
    bundle: &str,
    project: &Project,
    resource: &Resource,
) -> String {
    let instance = remote_instance_name(&opts.name);
    let class = remote_class_name(&opts.name);
    let opts_json = if opts.opts.is_null() {
        "{}".to_string()
    } else {
        opts.opts.to_string()
    };
    let project_json = project.snapshot().to_string();
    let resource_json = resource.snapshot().to_string();

    format!(
        r#"(async function() {{
  try {{
    if (!window.{instance}) {{
      {bundle}
      window.{instance} = new {class}({opts_json});
    }}

    let result = null;
    const isApplicable = await window.{instance}.test({project_json}, {resource_json});
    if (isApplicable) {{
      result = await window.{instance}.apply({project_json}, {resource_json});
    }}

    return result;
  }}
  catch (err) {{
    return {{ err: JSON.stringify(err, Object.getOwnPropertyNames(err)) }};
  }}
}})()"#
    )
}

/// 解析远程执行单元的返回值
///
/// `null` 为无操作；带 `err` 字段的信封还原为插件失败并保留远程消息；
/// 其余对象按资源补丁处理（渲染器侧只能产出普通对象，与本地插件返回
/// 部分字段的契约一致）。
pub fn parse_remote_result(
    plugin_name: &str,
    value: Value,
) -> Result<Option<ApplyResult>, PluginError> {
    if value.is_null() {
        return Ok(None);
    }

    if let Some(envelope) = value.get("err") {
        let raw = envelope.as_str().map(str::to_string).unwrap_or_else(|| envelope.to_string());
        // 远程侧将错误整体序列化，尽量还原出 message 字段
        let message = serde_json::from_str::<Value>(&raw)
            .ok()
            .and_then(|parsed| {
                parsed
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or(raw);

        return Err(PluginError::Remote {
            plugin: plugin_name.to_string(),
            message,
        });
    }

    let patch: ResourcePatch = serde_json::from_value(value).map_err(|e| PluginError::Remote {
        plugin: plugin_name.to_string(),
        message: format!("Unparsable remote result: {e}"),
    })?;

    Ok(Some(ApplyResult::Patch(patch)))
}
