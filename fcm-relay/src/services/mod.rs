pub mod classifier;
pub mod credentials;
pub mod metrics;
pub mod providers;

pub use classifier::{classify, FailureKind};
pub use credentials::{CredentialError, ServiceAccount};
pub use metrics::{init_metrics, RelayMetrics};
pub use providers::{FcmProvider, MockPushProvider, ProviderError, PushProvider};
