//! Password hashing. Uses bcrypt (cost 12) rather than the plain SHA digest
//! the original service briefly carried — see DESIGN.md for why.
use thiserror::Error;

const BCRYPT_COST: u32 = 12;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed")]
    HashingFailed(#[from] bcrypt::BcryptError),
}

/// Hashes `password`, mixing in `salt` before handing it to bcrypt. Bcrypt
/// already salts internally; `salt` is an additional, deployment-wide
/// pepper so that a leaked hash alone cannot be brute-forced against a
/// rainbow table built without it.
pub fn hash(password: &str, salt: &str) -> Result<String, PasswordError> {
    let peppered = format!("{password}{salt}");
    Ok(bcrypt::hash(peppered, BCRYPT_COST)?)
}

pub fn verify(password: &str, salt: &str, hash: &str) -> Result<bool, PasswordError> {
    let peppered = format!("{password}{salt}");
    Ok(bcrypt::verify(peppered, hash)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let hashed = hash("hunter22", "pepper").unwrap();
        assert!(verify("hunter22", "pepper", &hashed).unwrap());
        assert!(!verify("wrong", "pepper", &hashed).unwrap());
    }

    #[test]
    fn salt_is_part_of_the_digest() {
        let hashed = hash("hunter22", "pepper-a").unwrap();
        assert!(!verify("hunter22", "pepper-b", &hashed).unwrap());
    }
}
