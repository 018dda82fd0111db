//! Stable per-user calendar colors.

use sha2::{Digest, Sha256};

/// Deterministic HSL color for a username.
///
/// Hashing keeps a user's color identical across months and across server
/// restarts without storing anything. Saturation 55-84% and lightness
/// 40-59% keep white text readable against the swatch.
pub fn user_color(username: &str) -> String {
    let digest = Sha256::digest(username.as_bytes());
    let hue = (f64::from(digest[0]) / 255.0) * 360.0;
    let saturation = 55 + (digest[1] % 30);
    let lightness = 40 + (digest[2] % 20);
    format!("hsl({hue:.0}, {saturation}%, {lightness}%)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_user_same_color() {
        assert_eq!(user_color("alice"), user_color("alice"));
    }

    #[test]
    fn different_users_usually_differ() {
        assert_ne!(user_color("alice"), user_color("bob"));
    }

    #[test]
    fn output_is_valid_hsl() {
        let color = user_color("carol");
        assert!(color.starts_with("hsl("));
        assert!(color.ends_with("%)"));
    }
}
