//! Machine-id derivation: a stable per-credential fingerprint used in the
//! refresh request's `User-Agent` header (§4.6).

use sha2::{Digest, Sha256};

/// Resolve the machine id, honoring a caller-supplied 64-char override first.
pub fn resolve(override_id: Option<&str>, profile_arn: Option<&str>, refresh_token: &str) -> String {
    if let Some(id) = override_id
        && id.len() == 64
    {
        return id.to_string();
    }

    let seed = match profile_arn {
        Some(arn) if arn.starts_with("arn:aws") && arn.contains("profile/") => {
            format!("KotlinNativeAPI/{arn}")
        }
        _ => format!("KotlinNativeAPI/{refresh_token}"),
    };

    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_when_64_chars() {
        let over = "a".repeat(64);
        assert_eq!(resolve(Some(&over), None, "rt"), over);
    }

    #[test]
    fn short_override_is_ignored() {
        let id = resolve(Some("short"), None, "refresh-token-value");
        assert_eq!(id.len(), 64);
        assert_ne!(id, "short");
    }

    #[test]
    fn prefers_profile_arn_when_it_looks_like_one() {
        let a = resolve(None, Some("arn:aws:iam::123:profile/dev"), "rt1");
        let b = resolve(None, Some("arn:aws:iam::123:profile/dev"), "rt2");
        assert_eq!(a, b, "same profile arn should hash identically regardless of refresh token");
    }

    #[test]
    fn falls_back_to_refresh_token() {
        let a = resolve(None, None, "rt1");
        let b = resolve(None, None, "rt2");
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn ignores_non_arn_profile_value() {
        let a = resolve(None, Some("not-an-arn"), "rt1");
        let b = resolve(None, None, "rt1");
        assert_eq!(a, b);
    }
}
