use sha2::{Digest, Sha256};

/// Short, stable content fingerprint: the first 8 bytes of SHA-256 as hex.
pub fn content_fingerprint(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    let mut hex = String::with_capacity(16);
    for byte in digest.iter().take(8) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_and_short() {
        let a = content_fingerprint("<p>hello</p>");
        assert_eq!(a.len(), 16);
        assert_eq!(a, content_fingerprint("<p>hello</p>"));
        assert_ne!(a, content_fingerprint("<p>hello!</p>"));
        assert_eq!(content_fingerprint(""), "e3b0c44298fc1c14");
    }
}
