//! Colors
//!
//! Frame colours arrive either as a bare name (`"Tortoise"`) or as a catalogue variant with a hex
//! swatch and an id. Both shapes deserialise into [`Color`], and every caller goes through
//! [`Color::display_name`] or [`Color::key`] to turn one into a string.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A product colour.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    /// Plain colour name
    Name(String),

    /// Catalogue colour variant
    Variant {
        /// Display name
        name: String,

        /// Swatch colour, e.g. `#1a1a1a`
        hex: String,

        /// Variant identifier
        id: String,
    },
}

impl Color {
    /// Create a plain named colour.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Create a catalogue colour variant.
    pub fn variant(name: impl Into<String>, hex: impl Into<String>, id: impl Into<String>) -> Self {
        Self::Variant {
            name: name.into(),
            hex: hex.into(),
            id: id.into(),
        }
    }

    /// Human-readable colour name, trimmed.
    pub fn display_name(&self) -> &str {
        match self {
            Self::Name(name) | Self::Variant { name, .. } => name.trim(),
        }
    }

    /// Lookup key used to merge cart lines.
    ///
    /// A variant and a plain name with the same display name share a key.
    pub fn key(&self) -> String {
        self.display_name().to_lowercase()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn string_and_object_forms_deserialise() -> TestResult {
        let named: Color = serde_norway::from_str("Tortoise")?;
        let variant: Color =
            serde_norway::from_str("name: Tortoise\nhex: \"#5a3a22\"\nid: tort-01\n")?;

        assert_eq!(named, Color::named("Tortoise"));
        assert_eq!(variant, Color::variant("Tortoise", "#5a3a22", "tort-01"));

        Ok(())
    }

    #[test]
    fn variant_and_name_share_a_key() {
        let named = Color::named(" Matte Black ");
        let variant = Color::variant("matte black", "#111111", "mb-02");

        assert_eq!(named.key(), variant.key());
        assert_eq!(named.key(), "matte black");
    }

    #[test]
    fn display_uses_trimmed_name() {
        assert_eq!(Color::named("  Gold ").to_string(), "Gold");
        assert_eq!(
            Color::variant("Rose Gold", "#b76e79", "rg-1").to_string(),
            "Rose Gold"
        );
    }
}
