pub mod event;
pub mod labels;
pub mod notification;
pub mod reference;
pub mod registration;

pub use event::{event_identity, last_observed, source_component};
pub use labels::{KEY_COMPOSITION_ID, KEY_PATCHED_BY, PATCHED_BY_VALUE};
pub use notification::{
    EventInfo, EventMetadata, FlatNotification, InvolvedObject, NotificationJob,
    NotificationPayload, PayloadFormat,
};
pub use reference::{ObjectReference, OwnerEdge};
pub use registration::{registration_gvk, Registration};
