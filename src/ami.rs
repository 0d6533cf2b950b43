//! AMI (Alternate Mark Inversion) line coding
//!
//! Maps a binary digit sequence to a pulse sequence: '0' stays '0' (no
//! pulse), each '1' becomes a pulse whose sign alternates, starting '+'.
//! The HDB3 transform builds on top of this step.

/// Sign of a line pulse
///
/// Alternation starts positive: the first '1' of a sequence always
/// encodes as '+'.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    /// The opposite sign
    pub fn flip(self) -> Self {
        match self {
            Polarity::Positive => Polarity::Negative,
            Polarity::Negative => Polarity::Positive,
        }
    }

    /// The pulse character for this sign
    pub fn symbol(self) -> char {
        match self {
            Polarity::Positive => '+',
            Polarity::Negative => '-',
        }
    }

    /// Parse a pulse character; `None` for anything that is not '+' or '-'
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '+' => Some(Polarity::Positive),
            '-' => Some(Polarity::Negative),
            _ => None,
        }
    }
}

/// Encode a binary digit sequence as alternating pulses
///
/// Every '1' is replaced (not prefixed) by '+' or '-', flipping sign on
/// each mark regardless of intervening zeros. Output length equals input
/// length. Assumes the input alphabet is {'0','1'}.
pub fn encode(bits: &str) -> String {
    let mut pulses = String::with_capacity(bits.len());
    let mut polarity = Polarity::Positive;

    for c in bits.chars() {
        if c == '1' {
            pulses.push(polarity.symbol());
            polarity = polarity.flip();
        } else {
            pulses.push(c);
        }
    }
    pulses
}

/// Decode a pulse sequence back to binary digits
///
/// Every pulse symbol is restored to the '1' it replaced; all other
/// characters pass through unchanged, so `decode(encode(b)) == b`.
pub fn decode(pulses: &str) -> String {
    let mut bits = String::with_capacity(pulses.len());

    for c in pulses.chars() {
        if Polarity::from_symbol(c).is_some() {
            bits.push('1');
        } else {
            bits.push(c);
        }
    }
    bits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_single_mark() {
        assert_eq!(encode("1"), "+");
    }

    #[test]
    fn test_encode_alternates_across_zeros() {
        assert_eq!(encode("11011"), "+-0+-");
        assert_eq!(encode("101"), "+0-");
    }

    #[test]
    fn test_encode_zeros_pass_through() {
        assert_eq!(encode("000"), "000");
        assert_eq!(encode(""), "");
    }

    #[test]
    fn test_decode_restores_marks() {
        assert_eq!(decode("+-0+-"), "11011");
        assert_eq!(decode("+0-"), "101");
        assert_eq!(decode("000"), "000");
    }

    #[test]
    fn test_round_trip() {
        for bits in ["", "0", "1", "10", "0110", "11011", "10010001"] {
            assert_eq!(decode(&encode(bits)), bits, "round trip for {bits:?}");
        }
    }

    #[test]
    fn test_alternation_starts_positive() {
        let pulses = encode("1010101");
        let marks: Vec<char> = pulses.chars().filter(|c| *c != '0').collect();
        assert_eq!(marks[0], '+');
        for pair in marks.windows(2) {
            assert_ne!(pair[0], pair[1], "adjacent marks must alternate");
        }
    }

    #[test]
    fn test_polarity_flip() {
        assert_eq!(Polarity::Positive.flip(), Polarity::Negative);
        assert_eq!(Polarity::Negative.flip(), Polarity::Positive);
        assert_eq!(Polarity::from_symbol('0'), None);
    }
}
