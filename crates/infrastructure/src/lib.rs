pub mod kube_resolver;
pub mod ownership;
pub mod registration_directory;

pub use kube_resolver::KubeObjectResolver;
pub use ownership::{CompositionResolver, DEFAULT_MAX_OWNER_DEPTH};
pub use registration_directory::{FixedRegistration, RegistrationDirectory};
