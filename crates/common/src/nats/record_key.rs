use std::fmt::Write;

/// Header carrying the unmodified record key
pub const RECORD_KEY_HEADER: &str = "record-key";

/// Token used for the empty key; never produced by escaping a non-empty key
const EMPTY_KEY_TOKEN: &str = "%";

fn needs_escape(c: char) -> bool {
    matches!(c, '.' | '*' | '>' | '%') || c.is_whitespace() || c.is_control()
}

/// Map a record key onto a single subject token.
///
/// Subject separators, wildcards, whitespace and `%` are percent-escaped per
/// UTF-8 byte, so distinct keys always land on distinct subjects.
pub fn subject_token(key: &str) -> String {
    if key.is_empty() {
        return EMPTY_KEY_TOKEN.to_string();
    }

    let mut token = String::with_capacity(key.len());
    for c in key.chars() {
        if needs_escape(c) {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                let _ = write!(token, "%{:02X}", byte);
            }
        } else {
            token.push(c);
        }
    }
    token
}

/// Recover the record key from a subject token produced by [`subject_token`].
///
/// Returns `None` for tokens that are not valid escapes.
pub fn key_from_subject_token(token: &str) -> Option<String> {
    if token == EMPTY_KEY_TOKEN {
        return Some(String::new());
    }

    let mut bytes = Vec::with_capacity(token.len());
    let mut rest = token.as_bytes();
    while let Some((&byte, tail)) = rest.split_first() {
        if byte == b'%' {
            let hex = tail.get(..2)?;
            let hex = std::str::from_utf8(hex).ok()?;
            bytes.push(u8::from_str_radix(hex, 16).ok()?);
            rest = &tail[2..];
        } else {
            bytes.push(byte);
            rest = tail;
        }
    }

    String::from_utf8(bytes).ok()
}

/// Full subject a record with `key` is published on in `stream`
pub fn record_subject(stream: &str, key: &str) -> String {
    format!("{}.{}", stream, subject_token(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_token_escapes_reserved_characters() {
        assert_eq!(subject_token("dev-1"), "dev-1");
        assert_eq!(subject_token("a.b c*>"), "a%2Eb%20c%2A%3E");
        assert_eq!(subject_token("50%"), "50%25");
        assert_eq!(subject_token(""), "%");
    }

    #[test]
    fn test_similar_keys_get_distinct_subjects() {
        assert_ne!(subject_token("dev.1"), subject_token("dev_1"));
        assert_ne!(subject_token("dev.1"), subject_token("dev%2E1"));
        assert_ne!(subject_token(""), subject_token("_"));
    }

    #[test]
    fn test_key_recovered_from_token() {
        for key in ["dev.1", "dev_1", "HP/123", "a b\tc", "50%", "Bærbar.PC", ""] {
            assert_eq!(key_from_subject_token(&subject_token(key)).as_deref(), Some(key));
        }
    }

    #[test]
    fn test_malformed_escape_is_rejected() {
        assert_eq!(key_from_subject_token("dev%2"), None);
        assert_eq!(key_from_subject_token("dev%zz"), None);
    }

    #[test]
    fn test_record_subject() {
        assert_eq!(record_subject("device", "D1_G1"), "device.D1_G1");
        assert_eq!(record_subject("device", "dev.1"), "device.dev%2E1");
    }
}
