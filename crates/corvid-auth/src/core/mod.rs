pub mod hasher;
pub mod user;

pub use hasher::{Argon2Hasher, PasswordHasher};
pub use user::{AnonymousUser, SimpleUser, User};
