use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand::{TryRngCore, rngs::OsRng};

/// Argon2id hashing for account passwords.
#[derive(Clone, Debug)]
pub struct Passwords {
    argon2: Argon2<'static>,
}

impl Default for Passwords {
    fn default() -> Self {
        Self::new()
    }
}

impl Passwords {
    pub fn new() -> Self {
        Self::with_params(Params::default())
    }

    /// Cheaper parameters are fine for tests.
    pub fn with_params(params: Params) -> Self {
        Self { argon2: Argon2::new(Algorithm::Argon2id, Version::default(), params) }
    }

    pub fn hash(&self, password: &str) -> anyhow::Result<String> {
        let mut salt_bytes = [0u8; argon2::password_hash::Salt::RECOMMENDED_LENGTH];
        OsRng.try_fill_bytes(&mut salt_bytes)?;
        let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| anyhow::anyhow!(e))?;
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!(e))?;
        Ok(hash.to_string())
    }

    /// A malformed stored hash verifies as false.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        self.argon2.verify_password(password.as_bytes(), &parsed).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> Passwords {
        Passwords::with_params(Params::new(8, 1, 1, None).unwrap())
    }

    #[test]
    fn hashes_and_verifies() {
        let passwords = fast();
        let hash = passwords.hash("34somepassword34").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(passwords.verify("34somepassword34", &hash));
        assert!(!passwords.verify("wrongpassword123", &hash));
    }

    #[test]
    fn salts_differ() {
        let passwords = fast();
        assert_ne!(passwords.hash("same").unwrap(), passwords.hash("same").unwrap());
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!fast().verify("anything", "not-a-phc-string"));
    }
}
