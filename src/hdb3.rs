//! HDB3 (High-Density Bipolar 3) line coding
//!
//! Builds on the AMI step: after AMI encoding, every run of four
//! consecutive zero symbols is replaced by a 4-symbol substitution code
//! carrying deliberate bipolar violations, so a receiver never sees more
//! than three pulse-free symbols in a row.
//!
//! Substitution codes (written with their sign markers):
//! - "000+V" / "000-V": three zeros plus a violation pulse matching the
//!   sign of the last pulse before the run. Chosen when an odd number of
//!   pulses occurred since the previous substitution.
//! - "+B00+V" / "-B00-V": a compensating 'B' pulse, two zeros, and a
//!   violation, both pulses the complement of the preceding sign. Chosen
//!   on even parity so the violation still breaks alternation.
//!
//! Encoding is a single left-to-right scan; each substitution consumes
//! exactly four zeros, so leftover zeros of a longer run may form a new
//! window of their own.

use crate::ami::{self, Polarity};

/// Scan state threaded through one encode pass
///
/// Tracks the sign of the last plain pulse emitted and how many pulses
/// were emitted since the previous substitution. Lives only for the
/// duration of a single `encode` call.
struct EncodingCursor {
    last_sign: Polarity,
    pulses_since_sub: usize,
}

impl EncodingCursor {
    /// No pulse yet: the sign defaults positive and the count is even.
    fn new() -> Self {
        Self {
            last_sign: Polarity::Positive,
            pulses_since_sub: 0,
        }
    }

    fn record_pulse(&mut self, sign: Polarity) {
        self.last_sign = sign;
        self.pulses_since_sub += 1;
    }

    /// The substitution code for a 4-zero window at the current state
    fn substitution(&self) -> &'static str {
        let odd = self.pulses_since_sub % 2 == 1;
        match (self.last_sign, odd) {
            (Polarity::Positive, true) => "000+V",
            (Polarity::Positive, false) => "-B00-V",
            (Polarity::Negative, true) => "000-V",
            (Polarity::Negative, false) => "+B00+V",
        }
    }
}

/// Encode a binary digit sequence to HDB3
pub fn encode(bits: &str) -> String {
    substitute_zero_runs(&ami::encode(bits))
}

/// Decode an HDB3 sequence back to binary digits
///
/// 'B' windows are restored before 'V' windows: a 'B' marks a
/// compensating pulse absorbed into the zero run, and its window also
/// contains the run's violation.
pub fn decode(coded: &str) -> String {
    ami::decode(&restore_violations(&restore_compensations(coded)))
}

/// Replace each leftmost 4-zero window in an AMI pulse sequence
fn substitute_zero_runs(pulses: &str) -> String {
    let bytes = pulses.as_bytes();
    let mut coded = String::with_capacity(pulses.len() + pulses.len() / 2);
    let mut cursor = EncodingCursor::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i..].starts_with(b"0000") {
            coded.push_str(cursor.substitution());
            cursor.pulses_since_sub = 0;
            i += 4;
        } else {
            let c = bytes[i] as char;
            if let Some(sign) = Polarity::from_symbol(c) {
                cursor.record_pulse(sign);
            }
            coded.push(c);
            i += 1;
        }
    }
    coded
}

/// Restore every "xB00xV" window to "0000"
///
/// A truncated window or a 'B' with no preceding pulse marks input the
/// encoder never produces; the remainder is passed through untouched.
fn restore_compensations(coded: &str) -> String {
    let mut out = String::with_capacity(coded.len());
    let mut rest = coded;

    while let Some(i) = rest.find('B') {
        if i < 1 || rest.len() < i + 5 {
            break;
        }
        out.push_str(&rest[..i - 1]);
        out.push_str("0000");
        rest = &rest[i + 5..];
    }
    out.push_str(rest);
    out
}

/// Restore every "000xV" window to "0000"
fn restore_violations(coded: &str) -> String {
    let mut out = String::with_capacity(coded.len());
    let mut rest = coded;

    while let Some(i) = rest.find('V') {
        if i < 4 {
            break;
        }
        out.push_str(&rest[..i - 4]);
        out.push_str("0000");
        rest = &rest[i + 1..];
    }
    out.push_str(rest);
    out
}
