use sha3::{Digest, Sha3_256};

const SEAL_PREFIX: &str = "modifying this state by hand may produce unsound refutations";

/// A state that is handed to clients and must come back unchanged.
pub trait ProtectedState {
    /// Canonical text describing every field that influences later moves.
    fn compute_seal_info(&self) -> String;

    fn seal(&self) -> String {
        seal(&self.compute_seal_info())
    }

    fn verify_seal(&self, seal: &str) -> bool {
        verify(&self.compute_seal_info(), seal)
    }
}

/// Uppercase hex SHA3-256 digest of `info`.
pub fn seal(info: &str) -> String {
    let mut hasher = Sha3_256::new();
    hasher.update(SEAL_PREFIX);
    hasher.update("|");
    hasher.update(info);
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect()
}

pub fn verify(info: &str, hash: &str) -> bool {
    seal(info) == hash
}
