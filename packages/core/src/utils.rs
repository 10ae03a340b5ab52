// ABOUTME: Tracking-code generation and normalization for AgriTrace
// ABOUTME: Codes look like AGR-<base36 timestamp>-<random suffix>

use chrono::Utc;

use crate::constants::TRACKING_PREFIX;

const SUFFIX_LEN: usize = 4;
const BASE36: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Generate a produce tracking code: prefix, base-36 millisecond timestamp,
/// and a short random suffix for collision resistance.
///
/// The code is not guaranteed globally unique; the store's primary-key
/// constraint is the real guarantee, and a collision surfaces as a creation
/// failure rather than being silently accepted.
pub fn generate_tracking_code() -> String {
    use rand::Rng;

    let timestamp = Utc::now().timestamp_millis().max(0) as u64;
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..BASE36.len());
            BASE36[idx] as char
        })
        .collect();

    format!(
        "{}-{}-{}",
        TRACKING_PREFIX,
        encode_base36(timestamp),
        suffix
    )
}

/// Normalize user-entered tracking codes before lookup.
///
/// Scanned and typed codes arrive in mixed case with stray whitespace;
/// stored codes are uppercase.
pub fn normalize_tracking_code(code: &str) -> String {
    code.trim().to_uppercase()
}

fn encode_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize] as char);
        value /= 36;
    }
    digits.reverse();
    digits.into_iter().collect()
}
