pub mod license_service;

pub use license_service::{LicenseService, RegisterApplicationRequest};
