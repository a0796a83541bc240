pub mod jwt;
pub mod password;

pub use jwt::TokenService;
pub use password::{hash_password, verify_password};
