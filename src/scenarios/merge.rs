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
use crate::scenarios::ScenarioError;

/// 合并场景默认插件列表与调用方覆盖列表
///
/// 覆盖条目按给定顺序逐条应用，每条的插入位置基于同一次调用中先前覆盖
/// 已变更过的列表计算。规则按先命中者生效：
///
/// 1. `replace: X` —— 原位替换名为 `X` 的条目，找不到则为配置错误
/// 2. `before: X` —— 插入到名为 `X` 的条目之前
/// 3. `after: X` —— 插入到名为 `X` 的条目之后
/// 4. 无锚点且名称命中 —— 原位替换同名条目
/// 5. 无锚点且名称未命中 —— 追加到末尾
///
/// 同一锚点重复使用时的堆叠顺序：`before: X` 依次应用 B1、B2 得到
/// `[B1, B2, X]`；`after: X` 依次应用 A1、A2 得到 `[X, A2, A1]`，
/// 即后应用者落在离锚点最近的位置。
///
/// 合并结果即项目固定的插件配置列表，锚点字段不保留。
pub fn merge_plugin_opts(
    defaults: &[PluginOpts],
    overrides: &[PluginOpts],
) -> Result<Vec<PluginOpts>, ScenarioError> {
    let mut merged: Vec<PluginOpts> = defaults.to_vec();

    for custom in overrides {
        if let Some(target) = &custom.replace {
            let idx = position_of(&merged, target).ok_or_else(|| ScenarioError::AnchorNotFound {
                kind: "replace",
                target: target.clone(),
                plugin: custom.name.clone(),
            })?;
            merged[idx] = custom.clone();
        } else if let Some(target) = &custom.before {
            let idx = position_of(&merged, target).ok_or_else(|| ScenarioError::AnchorNotFound {
                kind: "before",
                target: target.clone(),
                plugin: custom.name.clone(),
            })?;
            merged.insert(idx, custom.clone());
        } else if let Some(target) = &custom.after {
            let idx = position_of(&merged, target).ok_or_else(|| ScenarioError::AnchorNotFound {
                kind: "after",
                target: target.clone(),
                plugin: custom.name.clone(),
            })?;
            merged.insert(idx + 1, custom.clone());
        } else if let Some(idx) = position_of(&merged, &custom.name) {
            merged[idx] = custom.clone();
        } else {
            merged.push(custom.clone());
        }
    }

    Ok(merged.into_iter().map(strip_anchors).collect())
}

fn position_of(list: &[PluginOpts], name: &str) -> Option<usize> {
    list.iter().position(|opts| opts.name == name)
}

fn strip_anchors(mut opts: PluginOpts) -> PluginOpts {
    opts.before = None;
    opts.after = None;
    opts.replace = None;
    opts
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn defaults() -> Vec<PluginOpts> {
        [
            "select-resource",
            "fetch",
            "extract-urls",
            "extract-html-content",
            "insert-resources",
            "upsert-resource",
        ]
        .iter()
        .map(|name| PluginOpts::named(name))
        .collect()
    }

    fn names(list: &[PluginOpts]) -> Vec<&str> {
        list.iter().map(|opts| opts.name.as_str()).collect()
    }

    #[test]
    fn empty_overrides_return_defaults_unchanged() {
        let merged = merge_plugin_opts(&defaults(), &[]).unwrap();
        assert_eq!(merged, defaults());
    }

    #[test]
    fn name_match_replaces_in_place_keeping_length() {
        let custom = PluginOpts {
            name: "extract-urls".to_string(),
            opts: json!({ "max_depth": 5 }),
            ..Default::default()
        };

        let merged = merge_plugin_opts(&defaults(), &[custom.clone()]).unwrap();

        assert_eq!(merged.len(), defaults().len());
        assert_eq!(merged[2], custom);
    }

    #[test]
    fn before_anchor_prepends() {
        let custom = PluginOpts {
            name: "custom".to_string(),
            before: Some("select-resource".to_string()),
            ..Default::default()
        };

        let merged = merge_plugin_opts(&defaults(), &[custom]).unwrap();

        assert_eq!(
            names(&merged),
            vec![
                "custom",
                "select-resource",
                "fetch",
                "extract-urls",
                "extract-html-content",
                "insert-resources",
                "upsert-resource",
            ]
        );
    }

    #[test]
    fn after_anchor_on_last_entry_appends() {
        let custom = PluginOpts {
            name: "custom".to_string(),
            after: Some("upsert-resource".to_string()),
            ..Default::default()
        };

        let merged = merge_plugin_opts(&defaults(), &[custom]).unwrap();
        assert_eq!(merged.last().map(|o| o.name.as_str()), Some("custom"));
    }

    #[test]
    fn replace_anchor_swaps_in_place() {
        let custom = PluginOpts {
            name: "browser-fetch".to_string(),
            replace: Some("fetch".to_string()),
            ..Default::default()
        };

        let merged = merge_plugin_opts(&defaults(), &[custom]).unwrap();

        assert_eq!(merged.len(), defaults().len());
        assert_eq!(merged[1].name, "browser-fetch");
    }

    #[test]
    fn no_anchor_no_match_appends() {
        let custom = PluginOpts::named("custom-tail");
        let merged = merge_plugin_opts(&defaults(), &[custom]).unwrap();
        assert_eq!(merged.last().map(|o| o.name.as_str()), Some("custom-tail"));
    }

    #[test]
    fn repeated_before_anchors_keep_supply_order() {
        let overrides = vec![
            PluginOpts {
                name: "b1".to_string(),
                before: Some("extract-urls".to_string()),
                ..Default::default()
            },
            PluginOpts {
                name: "b2".to_string(),
                before: Some("extract-urls".to_string()),
                ..Default::default()
            },
        ];

        let merged = merge_plugin_opts(&defaults(), &overrides).unwrap();

        let idx = merged.iter().position(|o| o.name == "extract-urls").unwrap();
        assert_eq!(merged[idx - 2].name, "b1");
        assert_eq!(merged[idx - 1].name, "b2");
    }

    #[test]
    fn repeated_after_anchors_stack_last_applied_nearest() {
        let overrides = vec![
            PluginOpts {
                name: "a1".to_string(),
                after: Some("extract-html-content".to_string()),
                ..Default::default()
            },
            PluginOpts {
                name: "a2".to_string(),
                after: Some("extract-html-content".to_string()),
                ..Default::default()
            },
        ];

        let merged = merge_plugin_opts(&defaults(), &overrides).unwrap();

        let idx = merged
            .iter()
            .position(|o| o.name == "extract-html-content")
            .unwrap();
        assert_eq!(merged[idx + 1].name, "a2");
        assert_eq!(merged[idx + 2].name, "a1");
    }

    #[test]
    fn unresolvable_anchor_is_a_configuration_error() {
        for custom in [
            PluginOpts {
                name: "x".to_string(),
                before: Some("missing".to_string()),
                ..Default::default()
            },
            PluginOpts {
                name: "x".to_string(),
                after: Some("missing".to_string()),
                ..Default::default()
            },
            PluginOpts {
                name: "x".to_string(),
                replace: Some("missing".to_string()),
                ..Default::default()
            },
        ] {
            let err = merge_plugin_opts(&defaults(), &[custom]).unwrap_err();
            assert!(matches!(err, ScenarioError::AnchorNotFound { .. }));
        }
    }

    #[test]
    fn anchors_are_stripped_from_result() {
        let custom = PluginOpts {
            name: "custom".to_string(),
            before: Some("fetch".to_string()),
            ..Default::default()
        };

        let merged = merge_plugin_opts(&defaults(), &[custom]).unwrap();
        assert!(merged.iter().all(|o| !o.has_anchor()));
    }
}
