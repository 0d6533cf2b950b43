//! Alphabet gates for the line codec
//!
//! Pure predicates deciding whether a chat message is eligible for coding.
//! A `false` result is not an error: it tells the mode controller to fall
//! back to plain forwarding and drop out of coding mode.

/// True iff every character of `text` is in {'0','1','+','-'}
///
/// The pre-condition gate for the encode direction. The empty string is
/// vacuously codeable; whitespace or any other character fails the gate.
pub fn is_codeable(text: &str) -> bool {
    text.chars().all(|c| matches!(c, '0' | '1' | '+' | '-'))
}

/// True iff every character of `text` is in {'0','+','-','B','V'}
///
/// The gate for the decode direction: encoder output carries 'B' and 'V'
/// markers, which the codeable gate would reject, and never a bare '1'.
pub fn is_pulse_sequence(text: &str) -> bool {
    text.chars().all(|c| matches!(c, '0' | '+' | '-' | 'B' | 'V'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codeable_accepts_code_alphabet() {
        assert!(is_codeable("0101"));
        assert!(is_codeable("+-01"));
        assert!(is_codeable(""));
    }

    #[test]
    fn test_codeable_rejects_everything_else() {
        assert!(!is_codeable("abc"));
        assert!(!is_codeable("01 01"));
        assert!(!is_codeable("0102"));
        assert!(!is_codeable("010\n"));
        assert!(!is_codeable("010B"));
    }

    #[test]
    fn test_pulse_sequence_accepts_coded_output() {
        assert!(is_pulse_sequence("-B00-V"));
        assert!(is_pulse_sequence("+000+V"));
        assert!(is_pulse_sequence("0+0-0"));
        assert!(is_pulse_sequence(""));
    }

    #[test]
    fn test_pulse_sequence_rejects_bits_and_noise() {
        assert!(!is_pulse_sequence("0101"));
        assert!(!is_pulse_sequence("hello"));
        assert!(!is_pulse_sequence("-B00-V "));
    }
}
