// In app/src/input.rs

use anyhow::{Context, Result};
use std::path::Path;

/// Reads a close-price history, oldest first.
///
/// Accepts a JSON array of numbers or plain numbers separated by newlines,
/// commas or whitespace.
pub fn read_closes(path: &Path) -> Result<Vec<f64>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_closes(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn parse_closes(content: &str) -> Result<Vec<f64>> {
    let trimmed = content.trim();
    let closes: Vec<f64> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed).context("Expected a JSON array of numbers")?
    } else {
        trimmed
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(|token| {
                token
                    .parse::<f64>()
                    .with_context(|| format!("Not a number: {:?}", token))
            })
            .collect::<Result<_>>()?
    };

    if let Some(bad) = closes.iter().find(|c| !c.is_finite()) {
        anyhow::bail!("Close prices must be finite, got {}", bad);
    }
    Ok(closes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_arrays() {
        assert_eq!(parse_closes("[1, 2.5, 3]\n").unwrap(), vec![1.0, 2.5, 3.0]);
    }

    #[test]
    fn parses_separated_numbers() {
        assert_eq!(parse_closes("1\n2,3\r\n 4.25\n\n").unwrap(), vec![1.0, 2.0, 3.0, 4.25]);
        assert!(parse_closes("").unwrap().is_empty());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_closes("1\nabc\n").is_err());
        assert!(parse_closes("[1, \"x\"]").is_err());
        assert!(parse_closes("1\ninf").is_err());
    }
}
