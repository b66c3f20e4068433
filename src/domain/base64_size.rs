//! Decoded-size estimation for base64 payloads.
//!
//! Answers "how big is the file behind this base64 string" without decoding
//! it, which is what you want when sizing an inlined image or attachment
//! before accepting it.

/// Estimated decoded size of a base64 payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Base64Weight {
    bytes: u64,
}

impl Base64Weight {
    /// Decoded size in bytes.
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Decoded size in KiB.
    pub fn as_kib(&self) -> f64 {
        self.bytes as f64 / 1024.0
    }

    /// Decoded size in MiB.
    pub fn as_mib(&self) -> f64 {
        self.bytes as f64 / (1024.0 * 1024.0)
    }
}

/// Estimate the decoded size of a base64 string.
///
/// Accepts either a bare payload or a full `data:` URI, whose
/// `data:<mediatype>;base64,` prefix is stripped first. The estimate is
/// `3*n/4` minus one byte per `=` padding character in the final quantum;
/// unpadded payloads round down to the correct size. The payload is not
/// validated against the base64 alphabet.
///
/// # Example
/// ```
/// use cadencia::base64_weight;
///
/// assert_eq!(base64_weight("TWFu").bytes(), 3);
/// assert_eq!(base64_weight("TWE=").bytes(), 2);
/// assert_eq!(base64_weight("data:image/png;base64,TQ==").bytes(), 1);
/// ```
pub fn base64_weight(raw: &str) -> Base64Weight {
    let payload = if raw.contains("data:") {
        raw.split_once(',').map(|(_, rest)| rest).unwrap_or("")
    } else {
        raw
    };

    let len = payload.len() as u64;
    let padding = payload
        .as_bytes()
        .iter()
        .rev()
        .take(2)
        .filter(|&&b| b == b'=')
        .count() as u64;

    Base64Weight {
        bytes: (3 * len / 4).saturating_sub(padding),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_by_padding() {
        // "Man" / "Ma" / "M" are the canonical RFC 4648 vectors.
        assert_eq!(base64_weight("TWFu").bytes(), 3);
        assert_eq!(base64_weight("TWE=").bytes(), 2);
        assert_eq!(base64_weight("TQ==").bytes(), 1);
    }

    #[test]
    fn test_data_uri_prefix_is_stripped() {
        let weight = base64_weight("data:image/png;base64,TWFu");
        assert_eq!(weight.bytes(), 3);

        // No comma after the prefix leaves nothing to weigh.
        assert_eq!(base64_weight("data:image/png;base64").bytes(), 0);
    }

    #[test]
    fn test_unpadded_payload_rounds_down() {
        assert_eq!(base64_weight("TQ").bytes(), 1);
        assert_eq!(base64_weight("TWE").bytes(), 2);
    }

    #[test]
    fn test_empty_payload() {
        assert_eq!(base64_weight("").bytes(), 0);
        assert_eq!(base64_weight("").as_kib(), 0.0);
    }

    #[test]
    fn test_unit_conversions() {
        // 4096 base64 chars decode to 3072 bytes.
        let payload = "A".repeat(4096);
        let weight = base64_weight(&payload);
        assert_eq!(weight.bytes(), 3072);
        assert_eq!(weight.as_kib(), 3.0);
        assert_eq!(weight.as_mib(), 3.0 / 1024.0);
    }
}
