//! Checksum validators for Spanish identifiers.
//!
//! Covers the NIF/DNI control letter, the CIF control digit and the social
//! security number. Validators are pure functions: same input, same result,
//! no global state. They report *why* a value failed through
//! [`ValidationError`] and leave presentation to the caller.

use std::fmt;

/// Control letter table for NIF numbers, indexed by `number % 23`.
const NIF_CONTROL_LETTERS: &str = "TRWAGMYFPDXBNJZSQVHLCKET";

/// Organization letters a CIF may start with.
const CIF_LEADING_LETTERS: &str = "ABCDEFGHKLMNPQRS";

/// Reason an identifier failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValidationError {
    /// The identifier has the wrong number of characters.
    InvalidLength,
    /// The identifier is structurally wrong (e.g. a NIF ending in a digit,
    /// or a non-numeric social security number).
    InvalidFormat,
    /// The CIF starts with a letter outside the accepted set.
    InvalidLeadingLetter,
    /// The control character does not match the computed checksum.
    ChecksumMismatch,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidLength => {
                write!(f, "identifier has the wrong length")
            }
            ValidationError::InvalidFormat => {
                write!(f, "identifier format is invalid")
            }
            ValidationError::InvalidLeadingLetter => {
                write!(f, "identifier starts with an unsupported letter")
            }
            ValidationError::ChecksumMismatch => {
                write!(f, "control character does not match the computed checksum")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate a NIF/DNI: numeric part plus control letter.
///
/// The control letter is looked up as `number % 23` in the standard table
/// and compared case-insensitively. There is deliberately no length or
/// digits-only precondition on the numeric part; a prefix that does not
/// parse as a number simply cannot match any control letter and comes back
/// [`ValidationError::ChecksumMismatch`].
///
/// # Arguments
/// * `id` - The full identifier, control letter included
///
/// # Example
/// ```
/// use cadencia::{validate_nif, ValidationError};
///
/// assert!(validate_nif("12345678Z").is_ok());
/// assert!(validate_nif("12345678z").is_ok());
/// assert_eq!(validate_nif("12345678A"), Err(ValidationError::ChecksumMismatch));
///
/// // A NIF must end in its control letter.
/// assert_eq!(validate_nif("123456789"), Err(ValidationError::InvalidFormat));
/// ```
pub fn validate_nif(id: &str) -> Result<(), ValidationError> {
    let control = match id.chars().next_back() {
        Some(c) if !c.is_ascii_digit() => c,
        // Ends in a digit, or there is nothing there at all: the control
        // letter is missing.
        _ => return Err(ValidationError::InvalidFormat),
    };

    let prefix = &id[..id.len() - control.len_utf8()];
    let number: u64 = prefix
        .parse()
        .map_err(|_| ValidationError::ChecksumMismatch)?;

    let expected = NIF_CONTROL_LETTERS.as_bytes()[(number % 23) as usize] as char;
    if control.eq_ignore_ascii_case(&expected) {
        Ok(())
    } else {
        Err(ValidationError::ChecksumMismatch)
    }
}

/// Validate a CIF: leading organization letter, seven digits, control digit.
///
/// The control digit is computed from the middle digits: positions 2, 4 and
/// 6 are summed as-is, positions 1, 3, 5 and 7 are doubled with the result's
/// digits summed (`2*d`, minus 9 when it exceeds 9), and the control is the
/// tens' complement of the total. Non-digit characters anywhere in positions
/// 1 through 8 make the checksum uncomputable and fail the comparison.
///
/// # Example
/// ```
/// use cadencia::{validate_cif, ValidationError};
///
/// assert!(validate_cif("B12345674").is_ok());
/// assert_eq!(validate_cif("B12345675"), Err(ValidationError::ChecksumMismatch));
/// assert_eq!(validate_cif("B1234567"), Err(ValidationError::InvalidLength));
/// assert_eq!(validate_cif("I12345674"), Err(ValidationError::InvalidLeadingLetter));
/// ```
pub fn validate_cif(id: &str) -> Result<(), ValidationError> {
    let chars: Vec<char> = id.chars().collect();
    if chars.len() != 9 {
        return Err(ValidationError::InvalidLength);
    }
    if !CIF_LEADING_LETTERS.contains(chars[0].to_ascii_uppercase()) {
        return Err(ValidationError::InvalidLeadingLetter);
    }

    let digit_at = |i: usize| {
        chars[i]
            .to_digit(10)
            .ok_or(ValidationError::ChecksumMismatch)
    };

    let mut par = 0;
    for i in [2, 4, 6] {
        par += digit_at(i)?;
    }

    let mut non = 0;
    for i in [1, 3, 5, 7] {
        let mut nn = 2 * digit_at(i)?;
        if nn > 9 {
            nn = 1 + (nn - 10);
        }
        non += nn;
    }

    let control = (10 - (par + non) % 10) % 10;
    match chars[8].to_digit(10) {
        Some(d) if d == control => Ok(()),
        _ => Err(ValidationError::ChecksumMismatch),
    }
}

/// Validate a social security number: at least 12 characters, all digits.
///
/// The historical rule is "at least 12", not "exactly 12"; longer all-digit
/// values are accepted on purpose.
///
/// # Example
/// ```
/// use cadencia::validate_ss_number;
///
/// assert!(validate_ss_number("123456789012").is_ok());
/// assert!(validate_ss_number("12345").is_err());
/// ```
pub fn validate_ss_number(value: &str) -> Result<(), ValidationError> {
    if value.chars().count() < 12 {
        return Err(ValidationError::InvalidLength);
    }
    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat);
    }
    Ok(())
}

/// Boolean convenience around [`validate_nif`].
pub fn is_valid_nif(id: &str) -> bool {
    validate_nif(id).is_ok()
}

/// Boolean convenience around [`validate_cif`].
pub fn is_valid_cif(id: &str) -> bool {
    validate_cif(id).is_ok()
}

/// Boolean convenience around [`validate_ss_number`].
pub fn is_valid_ss_number(value: &str) -> bool {
    validate_ss_number(value).is_ok()
}
