mod claims;
pub(crate) mod extractors;
pub mod jwt;
pub mod repo;
pub mod repo_types;

pub use extractors::AuthUser;
pub use repo_types::User;
