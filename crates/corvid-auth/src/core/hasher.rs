use corvid_core::exception::Error;

/// Password hasher trait
///
/// Implement this trait to create custom password hashing algorithms.
///
/// # Examples
///
/// ```
/// use corvid_auth::{Argon2Hasher, PasswordHasher};
///
/// let hasher = Argon2Hasher::new();
/// let password = "my_secure_password";
///
/// let hash = hasher.hash(password).unwrap();
///
/// assert!(hasher.verify(password, &hash).unwrap());
/// assert!(!hasher.verify("wrong_password", &hash).unwrap());
/// ```
pub trait PasswordHasher: Send + Sync {
	/// Hashes a password.
	fn hash(&self, password: &str) -> Result<String, Error>;

	/// Verifies a password against a hash.
	fn verify(&self, password: &str, hash: &str) -> Result<bool, Error>;
}

/// Argon2id password hasher, the default recommended by OWASP for new applications.
pub struct Argon2Hasher;

impl Argon2Hasher {
	pub fn new() -> Self {
		Self
	}
}

impl Default for Argon2Hasher {
	fn default() -> Self {
		Self::new()
	}
}

impl PasswordHasher for Argon2Hasher {
	fn hash(&self, password: &str) -> Result<String, Error> {
		use argon2::{
			Argon2,
			password_hash::{PasswordHasher as _, SaltString},
		};
		use rand::RngCore;

		let mut rng = rand::rng();
		let mut salt_bytes = [0u8; 16];
		rng.fill_bytes(&mut salt_bytes);

		let salt = SaltString::encode_b64(&salt_bytes)
			.map_err(|e| Error::internal(anyhow::anyhow!(e.to_string())))?;

		let argon2 = Argon2::default();
		argon2
			.hash_password(password.as_bytes(), &salt)
			.map(|hash| hash.to_string())
			.map_err(|e| Error::internal(anyhow::anyhow!(e.to_string())))
	}

	fn verify(&self, password: &str, hash: &str) -> Result<bool, Error> {
		use argon2::{
			Argon2,
			password_hash::{PasswordHash, PasswordVerifier},
		};

		let parsed_hash =
			PasswordHash::new(hash).map_err(|e| Error::internal(anyhow::anyhow!(e.to_string())))?;

		Ok(Argon2::default()
			.verify_password(password.as_bytes(), &parsed_hash)
			.is_ok())
	}
}
