use crate::models::ObjectReference;

/// 准入判定：决定某个 involvedObject 是否值得解析组合ID
pub trait AdmissionPolicy: Send + Sync {
    fn accept(&self, reference: &ObjectReference) -> bool;
}
