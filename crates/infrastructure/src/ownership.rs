use std::collections::HashSet;
use std::sync::Arc;

use eventrouter_core::{
    errors::Result,
    models::{labels, ObjectReference, OwnerEdge},
    traits::ObjectResolver,
};
use tracing::debug;

/// 所有权链默认最大遍历深度
pub const DEFAULT_MAX_OWNER_DEPTH: usize = 10;

/// 沿控制者 owner 链查找组合ID
///
/// 典型链路很浅（Pod -> ReplicaSet -> Deployment），但 owner 元数据不经平台校验，
/// 因此遍历受深度预算和 (kind, namespace, name) 访问集合双重约束。
pub struct CompositionResolver {
    resolver: Arc<dyn ObjectResolver>,
    max_depth: usize,
}

impl CompositionResolver {
    pub fn new(resolver: Arc<dyn ObjectResolver>, max_depth: usize) -> Self {
        Self {
            resolver,
            max_depth: max_depth.max(1),
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// 返回找到的组合ID；链条断开、成环或深度耗尽时返回 None，只有API错误才返回 Err
    pub async fn resolve(&self, reference: &ObjectReference) -> Result<Option<String>> {
        let mut visited = HashSet::new();
        let mut current = reference.clone();

        for depth in 0..self.max_depth {
            if !visited.insert(current.visit_key()) {
                debug!("所有权链成环，停止于 {} (depth={})", current, depth);
                return Ok(None);
            }

            let object = match self.resolver.get(&current).await {
                Ok(Some(object)) => object,
                Ok(None) => {
                    debug!("所有权链上的资源不存在: {} (depth={})", current, depth);
                    return Ok(None);
                }
                Err(e) if e.is_not_found() => return Ok(None),
                Err(e) => return Err(e),
            };

            if let Some(id) = labels::composition_id(object.metadata.labels.as_ref()) {
                debug!("在 {} 上找到组合ID {} (depth={})", current, id, depth);
                return Ok(Some(id.to_string()));
            }

            let edges = OwnerEdge::from_metadata(&object.metadata);
            let Some(edge) = OwnerEdge::controlling(&edges) else {
                debug!("{} 没有控制者owner，组合ID不存在", current);
                return Ok(None);
            };

            // owner 与子资源同命名空间；资源未携带命名空间时沿用引用中的命名空间
            let mut next = edge.owner.clone();
            if next.namespace.is_none() {
                next.namespace = current.namespace.clone();
            }
            current = next;
        }

        debug!(
            "所有权链遍历达到最大深度 {}，起点: {}",
            self.max_depth, reference
        );
        Ok(None)
    }
}
