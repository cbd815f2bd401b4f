mod extractor;
mod password;

pub use extractor::{AuthUser, OptionalAuthUser, SESSION_COOKIE};
pub use password::{generate_token, hash_password, hash_token, verify_password};
