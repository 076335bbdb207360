use argon2::{password_hash::{rand_core::OsRng, SaltString}, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use secrecy::{ExposeSecret, SecretString};

// Salted argon2 hash in PHC string format. CPU bound, call from the blocking pool
pub fn compute_password_hash(password: &SecretString) -> Result<String, anyhow::Error>{
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
                            .hash_password(password.expose_secret().as_bytes(), &salt)
                            .map_err(|_| anyhow::anyhow!("Failed to compute password hash"))?
                            .to_string();

    Ok(password_hash)
}

// Function to verify if password matches hash
pub fn verify_password(password: &SecretString, hashed_password: &str) -> Result<bool, anyhow::Error>{
    let hashed_password = PasswordHash::new(hashed_password)
                .map_err(|_| anyhow::anyhow!("Failed to parse PasswordHash \
                        from stored hashed password"))?;

    Ok(Argon2::default()
        .verify_password(password.expose_secret().as_bytes(), &hashed_password)
        .is_ok())
}
