//! Terminal styling and color utilities.
//!
//! ANSI escape code definitions and color detection for the text output of
//! the `airports` and `suggest` commands.

/// ANSI escape codes for text styling and colors.
pub mod colors {
    /// Reset all styling.
    pub const RESET: &str = "\x1b[0m";

    /// Bold reverse green for the shortest-route badge.
    pub const TAG_SHORTEST: &str = "\x1b[1;7;32m";
    /// Bold reverse yellow for the cheapest-route badge.
    pub const TAG_CHEAPEST: &str = "\x1b[1;7;33m";
    /// Bold reverse cyan for the fastest-route badge.
    pub const TAG_FASTEST: &str = "\x1b[1;7;36m";

    /// Bright bold white for airport codes.
    pub const WHITE_BOLD: &str = "\x1b[1;97m";
    /// Gray for indices and secondary text.
    pub const GRAY: &str = "\x1b[90m";
    /// Green for totals.
    pub const GREEN: &str = "\x1b[32m";
    /// Red for unreachable goals.
    pub const RED: &str = "\x1b[31m";
}

/// A collection of resolved color codes, either actual ANSI sequences
/// or empty strings when color is disabled.
#[derive(Debug, Clone, Copy)]
pub struct ColorPalette {
    pub reset: &'static str,
    pub tag_shortest: &'static str,
    pub tag_cheapest: &'static str,
    pub tag_fastest: &'static str,
    pub white_bold: &'static str,
    pub gray: &'static str,
    pub green: &'static str,
    pub red: &'static str,
}

impl ColorPalette {
    /// Create a palette with actual ANSI color codes.
    #[must_use]
    pub const fn colored() -> Self {
        Self {
            reset: colors::RESET,
            tag_shortest: colors::TAG_SHORTEST,
            tag_cheapest: colors::TAG_CHEAPEST,
            tag_fastest: colors::TAG_FASTEST,
            white_bold: colors::WHITE_BOLD,
            gray: colors::GRAY,
            green: colors::GREEN,
            red: colors::RED,
        }
    }

    /// Create a palette with no colors (empty strings).
    #[must_use]
    pub const fn plain() -> Self {
        Self {
            reset: "",
            tag_shortest: "",
            tag_cheapest: "",
            tag_fastest: "",
            white_bold: "",
            gray: "",
            green: "",
            red: "",
        }
    }

    /// Create a palette based on terminal capabilities.
    #[must_use]
    pub fn detect() -> Self {
        if supports_color() {
            Self::colored()
        } else {
            Self::plain()
        }
    }

    /// Badge color for a suggestion label (`Shortest`, `Cheapest`, `Fastest`).
    pub fn tag_for(&self, label: &str) -> &'static str {
        match label {
            "Shortest" => self.tag_shortest,
            "Cheapest" => self.tag_cheapest,
            "Fastest" => self.tag_fastest,
            _ => self.white_bold,
        }
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::detect()
    }
}

/// Check if the terminal supports ANSI color codes.
///
/// This function respects:
/// - The `NO_COLOR` environment variable (https://no-color.org/)
/// - The `TERM=dumb` convention for non-capable terminals
#[must_use]
pub fn supports_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if let Ok(term) = std::env::var("TERM") {
        if term.eq_ignore_ascii_case("dumb") {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::env;
    use std::sync::Mutex;

    /// Environment variables are process-global, so tests touching them are serialised.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn with_env_vars<F, R>(vars: &[(&str, Option<&str>)], f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let saved: Vec<_> = vars.iter().map(|(k, _)| (*k, env::var_os(k))).collect();

        for (key, value) in vars {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }

        let result = f();

        for (key, value) in saved {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }

        result
    }

    #[test]
    fn test_color_palette_colored() {
        let p = ColorPalette::colored();
        assert!(!p.reset.is_empty());
        assert!(!p.tag_shortest.is_empty());
        assert_eq!(p.tag_for("Fastest"), colors::TAG_FASTEST);
    }

    #[test]
    fn test_color_palette_plain() {
        let p = ColorPalette::plain();
        assert!(p.reset.is_empty());
        assert!(p.tag_for("Cheapest").is_empty());
        assert!(p.red.is_empty());
    }

    #[test]
    fn test_supports_color_no_color_set() {
        with_env_vars(&[("NO_COLOR", Some("1")), ("TERM", None)], || {
            assert!(!supports_color(), "NO_COLOR=1 should disable colors");
        });
    }

    #[test]
    fn test_supports_color_term_dumb() {
        with_env_vars(&[("NO_COLOR", None), ("TERM", Some("dumb"))], || {
            assert!(!supports_color(), "TERM=dumb should disable colors");
        });
    }

    #[test]
    fn test_supports_color_default() {
        with_env_vars(
            &[("NO_COLOR", None), ("TERM", Some("xterm-256color"))],
            || {
                assert!(supports_color(), "Normal terminal should support colors");
            },
        );
    }
}
