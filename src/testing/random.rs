use rand::Rng;
use rand::distr::Alphanumeric;

/// Random lowercase alphanumeric string of `len` characters.
pub fn random_string(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(|c| char::from(c).to_ascii_lowercase())
        .collect()
}

/// Random, syntactically valid email address.
pub fn random_email() -> String {
    format!("{}@{}.com", random_string(10), random_string(6))
}
