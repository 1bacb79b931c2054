// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contact handle normalization for the transport's addressing scheme.
//!
//! Accepts phone-style handles with optional `+` country prefix and common
//! formatting noise (spaces, dashes, dots, parentheses). An empty address
//! and a malformed one fail with distinct reasons so dashboards can tell
//! them apart.

use herald_core::types::FailureReason;

const MIN_DIGITS: usize = 7;
const MAX_DIGITS: usize = 15;

/// Normalize a raw contact address into a routable handle.
pub fn normalize(raw: &str) -> Result<String, FailureReason> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FailureReason::MissingAddress);
    }

    let mut normalized = String::with_capacity(trimmed.len());
    for (i, c) in trimmed.chars().enumerate() {
        match c {
            '+' if i == 0 => normalized.push('+'),
            '0'..='9' => normalized.push(c),
            ' ' | '-' | '.' | '(' | ')' => {}
            _ => return Err(FailureReason::InvalidAddress),
        }
    }

    let digits = normalized.chars().filter(|c| c.is_ascii_digit()).count();
    if !(MIN_DIGITS..=MAX_DIGITS).contains(&digits) {
        return Err(FailureReason::InvalidAddress);
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_formatting_noise() {
        assert_eq!(normalize("+49 (151) 234-56.78").unwrap(), "+491512345678");
        assert_eq!(normalize("030 1234567").unwrap(), "0301234567");
    }

    #[test]
    fn empty_is_missing_not_invalid() {
        assert_eq!(normalize(""), Err(FailureReason::MissingAddress));
        assert_eq!(normalize("   "), Err(FailureReason::MissingAddress));
    }

    #[test]
    fn rejects_letters_and_misplaced_plus() {
        assert_eq!(normalize("not-a-number"), Err(FailureReason::InvalidAddress));
        assert_eq!(normalize("12+345678901"), Err(FailureReason::InvalidAddress));
    }

    #[test]
    fn rejects_out_of_range_lengths() {
        assert_eq!(normalize("12345"), Err(FailureReason::InvalidAddress));
        assert_eq!(
            normalize("1234567890123456"),
            Err(FailureReason::InvalidAddress)
        );
    }
}
