use std::collections::HashSet;

use eventrouter_core::{models::ObjectReference, traits::AdmissionPolicy};

/// 按 kind / API组白名单准入
///
/// 组条目以 `*.` 开头时匹配任意子域名；核心组写作 `""` 或 `core`。
/// 两个列表都为空时全部放行。
#[derive(Debug, Clone, Default)]
pub struct AllowListPolicy {
    kinds: HashSet<String>,
    groups: Vec<String>,
}

impl AllowListPolicy {
    pub fn new<K, G>(kinds: K, groups: G) -> Self
    where
        K: IntoIterator,
        K::Item: Into<String>,
        G: IntoIterator,
        G::Item: Into<String>,
    {
        Self {
            kinds: kinds
                .into_iter()
                .map(Into::into)
                .filter(|k: &String| !k.is_empty())
                .collect(),
            groups: groups.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allow_all() -> Self {
        Self::default()
    }

    fn group_matches(pattern: &str, group: &str) -> bool {
        match pattern {
            "" | "core" => group.is_empty(),
            _ => match pattern.strip_prefix("*.") {
                Some(suffix) => group
                    .strip_suffix(suffix)
                    .is_some_and(|head| head.ends_with('.') && head.len() > 1),
                None => pattern == group,
            },
        }
    }
}

impl AdmissionPolicy for AllowListPolicy {
    fn accept(&self, reference: &ObjectReference) -> bool {
        if self.kinds.is_empty() && self.groups.is_empty() {
            return true;
        }

        if self.kinds.contains(&reference.kind) {
            return true;
        }

        let group = reference.group();
        self.groups
            .iter()
            .any(|pattern| Self::group_matches(pattern, group))
    }
}
