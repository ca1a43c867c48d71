pub mod app;
pub mod chain;
pub mod domain;
pub mod error;
pub mod infra;
pub mod registry;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::license_service::LicenseService;
pub use chain::{HttpWalletTransport, WalletSessionManager, WalletSigner, WalletTransport};
pub use domain::Application;
pub use error::{DrmError, DrmResult};
pub use registry::{ApplicationRegistry, SupabaseRegistry};
