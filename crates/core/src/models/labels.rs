use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

/// 组合ID标签
pub const KEY_COMPOSITION_ID: &str = "krateo.io/composition-id";
/// 已处理标记，存在即表示事件已被本系统处理过
pub const KEY_PATCHED_BY: &str = "krateo.io/patched-by";
pub const PATCHED_BY_VALUE: &str = "krateo";

/// 检查事件是否已带有处理标记
pub fn was_patched(labels: Option<&BTreeMap<String, String>>) -> bool {
    labels.is_some_and(|labels| labels.contains_key(KEY_PATCHED_BY))
}

/// 读取组合ID标签，空值视为不存在
pub fn composition_id(labels: Option<&BTreeMap<String, String>>) -> Option<&str> {
    labels
        .and_then(|labels| labels.get(KEY_COMPOSITION_ID))
        .map(String::as_str)
        .filter(|id| !id.is_empty())
}

/// 构造只触及 metadata.labels 的 merge patch
pub fn marker_patch(composition_id: Option<&str>) -> Value {
    let mut labels = Map::new();
    if let Some(id) = composition_id.filter(|id| !id.is_empty()) {
        labels.insert(KEY_COMPOSITION_ID.to_string(), Value::from(id));
    }
    labels.insert(KEY_PATCHED_BY.to_string(), Value::from(PATCHED_BY_VALUE));

    json!({ "metadata": { "labels": labels } })
}
