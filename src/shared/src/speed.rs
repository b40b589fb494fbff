//! Speed normalization
//!
//! Plans advertise speed as free text ("100Mbps", "1 Gbps", "Fibra 500 MBPS").
//! Everything that compares speeds goes through [`extract_speed_in_mbps`].

use once_cell::sync::Lazy;
use regex::Regex;

static SPEED_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(gbps|mbps)").expect("speed pattern is a valid regex")
});

const MBPS_PER_GBPS: f64 = 1000.0;

/// Parse the first `<number><unit>` pair in `text` and return it in Mbps.
///
/// The unit is `mbps` or `gbps` in any case, optionally separated from the
/// number by whitespace. Returns `0.0` when nothing matches.
pub fn extract_speed_in_mbps(text: &str) -> f64 {
    let Some(captures) = SPEED_PATTERN.captures(text.trim()) else {
        return 0.0;
    };

    let value: f64 = match captures[1].parse() {
        Ok(value) => value,
        Err(_) => return 0.0,
    };

    if captures[2].eq_ignore_ascii_case("gbps") {
        value * MBPS_PER_GBPS
    } else {
        value
    }
}
