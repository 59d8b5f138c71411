//! Cart Fixtures

use serde::Deserialize;

use crate::colors::Color;

/// Wrapper for a cart in YAML
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Lines in the order they were added
    #[serde(default)]
    pub lines: Vec<CartLineFixture>,
}

/// Cart line fixture
#[derive(Debug, Deserialize)]
pub struct CartLineFixture {
    /// Product key from the products fixture
    pub product: String,

    /// Colour, as a name or a catalogue variant
    #[serde(default)]
    pub color: Option<Color>,

    /// Number of units
    pub quantity: u32,
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    const GOLD_AVIATORS: &str = "\
lines:
  - product: aviator
    color: Gold
    quantity: 2
  - product: aviator
    color:
      name: gold
      hex: \"#d4af37\"
      id: gold-01
    quantity: 1
  - product: case
    quantity: 1
";

    #[test]
    fn cart_fixture_accepts_both_colour_forms() -> TestResult {
        let fixture: CartFixture = serde_norway::from_str(GOLD_AVIATORS)?;

        let colors: Vec<_> = fixture
            .lines
            .iter()
            .map(|line| line.color.as_ref().map(Color::key))
            .collect();

        assert_eq!(
            colors,
            vec![Some("gold".to_string()), Some("gold".to_string()), None]
        );

        Ok(())
    }
}
