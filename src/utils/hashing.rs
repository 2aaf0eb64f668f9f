use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::utils::error::CustomError;

/// Hashes are stored base64-wrapped, the format the existing user
/// collection already holds.
const SALT_ROUNDS: u32 = 12;

pub fn hash_password(password: &str) -> Result<String, CustomError> {
    let hashed = bcrypt::hash(password, SALT_ROUNDS)
        .map_err(|e| CustomError::InternalServerError(format!("Failed to hash password: {}", e)))?;
    Ok(STANDARD.encode(hashed))
}

pub fn verify_password(password: &str, encoded: &str) -> Result<bool, CustomError> {
    let decoded = STANDARD
        .decode(encoded)
        .map_err(|_| CustomError::InternalServerError("Stored hash is not base64".to_string()))?;
    let hashed = String::from_utf8(decoded)
        .map_err(|_| CustomError::InternalServerError("Stored hash is not utf-8".to_string()))?;

    bcrypt::verify(password, &hashed)
        .map_err(|e| CustomError::InternalServerError(format!("Failed to verify password: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_printable_ascii() {
        let password = "correct horse battery staple !@#$%^&*()42";
        let encoded = hash_password(password).unwrap();
        assert!(verify_password(password, &encoded).unwrap());
    }

    #[test]
    fn rejects_wrong_password() {
        let encoded = hash_password("hunter2").unwrap();
        assert!(!verify_password("hunter3", &encoded).unwrap());
    }

    #[test]
    fn stored_hash_is_base64_wrapped() {
        let encoded = hash_password("hunter2").unwrap();
        // bcrypt hashes start with $2; the stored value must not.
        assert!(!encoded.starts_with("$2"));
        assert!(STANDARD.decode(&encoded).is_ok());
    }
}
