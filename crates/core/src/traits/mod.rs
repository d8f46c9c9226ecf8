pub mod admission;
pub mod notifier;
pub mod object_resolver;
pub mod registration_source;

pub use admission::*;
pub use notifier::*;
pub use object_resolver::*;
pub use registration_source::*;
