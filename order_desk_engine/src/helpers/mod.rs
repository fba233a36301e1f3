mod password;

pub use password::{hash_password, hash_password_async, verify_password, verify_password_async, PasswordError};
