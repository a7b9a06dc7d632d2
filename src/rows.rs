use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pricing::HintLevel;

/// One user-entered purchase row, before catalog resolution. `cost` is the
/// discount-adjusted price the user typed; when absent, extraction falls
/// back to the catalog base cost run through the row's hint discount.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawRow {
    pub name: String,
    #[serde(default)]
    pub cost: Option<u32>,
    #[serde(default)]
    pub hint: HintLevel,
    #[serde(default)]
    pub required: bool,
}

impl RawRow {
    pub fn new(name: impl Into<String>, cost: u32) -> Self {
        Self {
            name: name.into(),
            cost: Some(cost),
            hint: HintLevel::Lv0,
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_hint(mut self, hint: HintLevel) -> Self {
        self.hint = hint;
        self
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum RowParseError {
    #[error("line {line}: missing '=' separator: {text}")]
    MissingSeparator { line: usize, text: String },
    #[error("line {line}: empty skill name")]
    EmptyName { line: usize },
    #[error("line {line}: invalid cost: {text}")]
    InvalidCost { line: usize, text: String },
    #[error("line {line}: invalid hint suffix: {text}")]
    InvalidHint { line: usize, text: String },
}

/// Parses the compact build format, one row per line:
/// `Name=cost`, with optional `|H<0-5>` hint and `|R` required suffixes,
/// e.g. `Concentration=457|H1|R`. Cost may be blank (`Name=|H2`) to defer
/// to the catalog base cost. Blank lines are skipped.
pub fn parse_rows(input: &str) -> Result<Vec<RawRow>, RowParseError> {
    let mut rows = Vec::new();
    for (idx, raw_line) in input.lines().enumerate() {
        let line = idx + 1;
        let text = raw_line.trim();
        if text.is_empty() {
            continue;
        }
        let Some((name_part, rest)) = text.split_once('=') else {
            return Err(RowParseError::MissingSeparator {
                line,
                text: text.to_string(),
            });
        };
        let name = name_part.trim();
        if name.is_empty() {
            return Err(RowParseError::EmptyName { line });
        }

        let mut cost_text = rest.trim();
        let mut hint = HintLevel::Lv0;
        let mut required = false;
        while let Some((head, suffix)) = cost_text.rsplit_once('|') {
            let suffix = suffix.trim();
            if suffix.eq_ignore_ascii_case("r") {
                required = true;
            } else if let Some(level) = suffix.strip_prefix(['H', 'h']) {
                let value: u8 = level.trim().parse().map_err(|_| RowParseError::InvalidHint {
                    line,
                    text: suffix.to_string(),
                })?;
                hint = HintLevel::try_from(value).map_err(|_| RowParseError::InvalidHint {
                    line,
                    text: suffix.to_string(),
                })?;
            } else {
                return Err(RowParseError::InvalidHint {
                    line,
                    text: suffix.to_string(),
                });
            }
            cost_text = head.trim();
        }

        let cost = if cost_text.is_empty() {
            None
        } else {
            Some(
                cost_text
                    .parse::<u32>()
                    .map_err(|_| RowParseError::InvalidCost {
                        line,
                        text: cost_text.to_string(),
                    })?,
            )
        };

        rows.push(RawRow {
            name: name.to_string(),
            cost,
            hint,
            required,
        });
    }
    Ok(rows)
}

/// Inverse of [`parse_rows`]; Lv0 hints and the required flag are only
/// emitted when set, so round-trips stay minimal.
pub fn serialize_rows(rows: &[RawRow]) -> String {
    let mut out = String::new();
    for row in rows {
        out.push_str(&row.name);
        out.push('=');
        if let Some(cost) = row.cost {
            out.push_str(&cost.to_string());
        }
        if row.hint != HintLevel::Lv0 {
            out.push_str(&format!("|H{}", row.hint.as_u8()));
        }
        if row.required {
            out.push_str("|R");
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_suffixed_rows() {
        let rows = parse_rows("Concentration=457\nGroundwork=195|H2|R\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], RawRow::new("Concentration", 457));
        assert_eq!(
            rows[1],
            RawRow::new("Groundwork", 195)
                .with_hint(HintLevel::Lv2)
                .required()
        );
    }

    #[test]
    fn blank_cost_defers_to_catalog() {
        let rows = parse_rows("Stealth Mode=|H3\n").unwrap();
        assert_eq!(rows[0].cost, None);
        assert_eq!(rows[0].hint, HintLevel::Lv3);
    }

    #[test]
    fn suffix_order_does_not_matter() {
        let a = parse_rows("X=100|R|H1").unwrap();
        let b = parse_rows("X=100|H1|R").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(matches!(
            parse_rows("no separator here"),
            Err(RowParseError::MissingSeparator { line: 1, .. })
        ));
        assert!(matches!(
            parse_rows("X=abc"),
            Err(RowParseError::InvalidCost { .. })
        ));
        assert!(matches!(
            parse_rows("X=100|H9"),
            Err(RowParseError::InvalidHint { .. })
        ));
    }

    #[test]
    fn round_trip_is_stable() {
        let text = "Concentration=457\nGroundwork=195|H2|R\nStealth Mode=|H3\n";
        let rows = parse_rows(text).unwrap();
        assert_eq!(serialize_rows(&rows), text);
    }
}
