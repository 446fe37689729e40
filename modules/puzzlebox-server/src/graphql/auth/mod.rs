pub mod jwt;
pub mod middleware;

pub use middleware::{extract_identity, ViewerIdentity};
