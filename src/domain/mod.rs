pub mod application;

pub use application::{parse_wallet_address, Application, NewApplication};
