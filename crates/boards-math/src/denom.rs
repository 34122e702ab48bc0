//! Static registry of the token denominations the client knows how to display

use serde::{Deserialize, Serialize};

/// Display metadata for one denomination
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Minimal-unit denomination, e.g. `ugnot`
    pub denom: String,
    /// Display name, e.g. `GNOT`
    pub name: String,
    /// Number of decimal places between the display unit and the minimal unit
    pub decimals: u32,
}

impl TokenConfig {
    pub fn new(denom: impl Into<String>, name: impl Into<String>, decimals: u32) -> Self {
        Self {
            denom: denom.into(),
            name: name.into(),
            decimals,
        }
    }
}

/// Immutable set of configured tokens, built once at startup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DenomRegistry(Vec<TokenConfig>);

impl DenomRegistry {
    pub fn new(tokens: Vec<TokenConfig>) -> Self {
        Self(tokens)
    }

    /// Find the token configured for `denom`
    pub fn lookup(&self, denom: &str) -> Option<&TokenConfig> {
        self.0.iter().find(|t| t.denom == denom)
    }

    pub fn tokens(&self) -> &[TokenConfig] {
        &self.0
    }

    /// First denomination registered twice, if any
    pub fn duplicate_denom(&self) -> Option<&str> {
        self.0.iter().enumerate().find_map(|(i, token)| {
            self.0[..i]
                .iter()
                .any(|earlier| earlier.denom == token.denom)
                .then_some(token.denom.as_str())
        })
    }
}

impl Default for DenomRegistry {
    fn default() -> Self {
        Self(vec![TokenConfig::new("ugnot", "GNOT", 6)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let registry = DenomRegistry::new(vec![
            TokenConfig::new("ugnot", "GNOT", 6),
            TokenConfig::new("ufoo", "FOO", 3),
        ]);

        assert_eq!(registry.lookup("ufoo").unwrap().name, "FOO");
        assert!(registry.lookup("uatom").is_none());
    }

    #[test]
    fn test_duplicate_denom() {
        assert!(DenomRegistry::default().duplicate_denom().is_none());

        let registry = DenomRegistry::new(vec![
            TokenConfig::new("ugnot", "GNOT", 6),
            TokenConfig::new("ufoo", "FOO", 3),
            TokenConfig::new("ugnot", "GNOT2", 6),
        ]);
        assert_eq!(registry.duplicate_denom(), Some("ugnot"));
    }
}
