pub mod client;
pub mod supabase;

pub use client::{ApplicationRegistry, RegistryError, UploadFile};
pub use supabase::SupabaseRegistry;
