use super::block::calculate_hash;

/// Required hash prefix for a sealed block. Fixed; there is no retargeting.
pub const DIFFICULTY_PREFIX: &str = "00";

/// Winning nonce and the hash it produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seal {
    pub nonce: u64,
    pub hash: String,
}

/// Checks whether a hash satisfies the difficulty target
pub fn meets_difficulty(hash: &str) -> bool {
    hash.starts_with(DIFFICULTY_PREFIX)
}

/// Performs proof of work to find a valid hash
///
/// Tries nonces upwards from zero and returns the first one whose header hash
/// meets the target. The search is deterministic and has no attempt limit.
pub fn proof_of_work(index: u64, previous_hash: &str, transactions_digest: &str) -> Seal {
    let mut nonce = 0;

    loop {
        let hash = calculate_hash(index, previous_hash, transactions_digest, nonce);

        if meets_difficulty(&hash) {
            return Seal { nonce, hash };
        }

        nonce += 1;
    }
}
