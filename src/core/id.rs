use rand::Rng;
use rand::distributions::Alphanumeric;
use sha2::{Digest, Sha256};

pub const ID_LENGTH: usize = 8;

/// Generates an 8 character document id: a random string salted with the
/// current unix timestamp, hashed with SHA-256, keeping every 8th hex digit.
pub fn generate_id() -> String {
    let random: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(10)
        .map(char::from)
        .collect();
    let salt = chrono::Utc::now().timestamp();

    let digest = Sha256::digest(format!("{random}{salt}").as_bytes());
    let hex = format!("{digest:x}");

    hex.chars().step_by(ID_LENGTH).collect()
}

/// Ids are exactly what [`generate_id`] produces: 8 lowercase hex digits.
pub fn is_valid_id(id: &str) -> bool {
    id.len() == ID_LENGTH
        && id
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}
