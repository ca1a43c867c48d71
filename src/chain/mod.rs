pub mod contracts;
pub mod session;
pub mod signer;
pub mod transport;
pub mod units;

pub use session::{SessionSnapshot, SessionState, WalletSessionManager};
pub use signer::WalletSigner;
pub use transport::{HttpWalletTransport, WalletTransport};
