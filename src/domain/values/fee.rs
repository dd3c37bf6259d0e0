use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// `grouped` uses commas as thousands separators; in `plain` a comma is a
/// decimal point (`€7,5 million`).
static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:(?P<grouped>\d{1,3}(?:,\d{3})+(?:\.\d+)?)|(?P<plain>\d+(?:[.,]\d+)?))\s*(?P<unit>bn|billion|million|mil|m|thousand|k)?\b",
    )
    .expect("fee amount regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeUnit {
    None,
    Thousand,
    Million,
}

impl FeeUnit {
    pub fn multiplier(&self) -> f64 {
        match self {
            FeeUnit::None => 1.0,
            FeeUnit::Thousand => 1_000.0,
            FeeUnit::Million => 1_000_000.0,
        }
    }

    fn suffix(&self) -> &'static str {
        match self {
            FeeUnit::None => "",
            FeeUnit::Thousand => "k",
            FeeUnit::Million => "m",
        }
    }
}

/// Transfer fee as reported. Currency symbols are dropped; amounts are
/// treated as GBP-equivalent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Fee {
    Amount { value: f64, unit: FeeUnit },
    #[default]
    Undisclosed,
    FreeTransfer,
    Loan,
}

impl Fee {
    pub fn amount(value: f64, unit: FeeUnit) -> Self {
        Fee::Amount { value, unit }
    }

    /// Numeric GBP-equivalent; sentinels count as zero.
    pub fn gbp_value(&self) -> f64 {
        match self {
            Fee::Amount { value, unit } => value * unit.multiplier(),
            Fee::Undisclosed | Fee::FreeTransfer | Fee::Loan => 0.0,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Fee::Amount { .. })
    }

    /// Like `parse`, falling back to `Undisclosed` for anything unreadable.
    pub fn parse_lenient(text: &str) -> Fee {
        text.parse().unwrap_or_default()
    }
}

impl fmt::Display for Fee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fee::Amount { value, unit } => write!(f, "{}{}", value, unit.suffix()),
            Fee::Undisclosed => write!(f, "Undisclosed"),
            Fee::FreeTransfer => write!(f, "Free Transfer"),
            Fee::Loan => write!(f, "Loan Deal"),
        }
    }
}

impl FromStr for Fee {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(caps) = AMOUNT_RE.captures(s) {
            let digits = match (caps.name("grouped"), caps.name("plain")) {
                (Some(m), _) => m.as_str().replace(',', ""),
                (None, Some(m)) => m.as_str().replace(',', "."),
                (None, None) => return Err(format!("Unrecognised fee: '{s}'")),
            };
            let mut value: f64 = digits
                .parse()
                .map_err(|e| format!("Invalid fee amount '{digits}': {e}"))?;
            let unit = match caps.name("unit").map(|m| m.as_str().to_lowercase()) {
                None => FeeUnit::None,
                Some(u) if u == "k" || u == "thousand" => FeeUnit::Thousand,
                Some(u) if u == "bn" || u == "billion" => {
                    value *= 1_000.0;
                    FeeUnit::Million
                }
                Some(_) => FeeUnit::Million,
            };
            return Ok(Fee::Amount { value, unit });
        }

        let lower = s.to_lowercase();
        if lower.contains("undisclosed") {
            Ok(Fee::Undisclosed)
        } else if lower.contains("free") || lower.contains("released") {
            Ok(Fee::FreeTransfer)
        } else if lower.contains("loan") {
            Ok(Fee::Loan)
        } else {
            Err(format!("Unrecognised fee: '{s}'"))
        }
    }
}

impl TryFrom<String> for Fee {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Fee> for String {
    fn from(fee: Fee) -> Self {
        fee.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_currency_amounts() {
        assert_eq!("£12m".parse::<Fee>().unwrap(), Fee::amount(12.0, FeeUnit::Million));
        assert_eq!(
            "€7.5 million".parse::<Fee>().unwrap(),
            Fee::amount(7.5, FeeUnit::Million)
        );
        assert_eq!("$500k".parse::<Fee>().unwrap(), Fee::amount(500.0, FeeUnit::Thousand));
        assert_eq!("1,250,000".parse::<Fee>().unwrap(), Fee::amount(1_250_000.0, FeeUnit::None));
    }

    #[test]
    fn test_decimal_comma() {
        assert_eq!(
            "€7,5 million".parse::<Fee>().unwrap(),
            Fee::amount(7.5, FeeUnit::Million)
        );
        assert_eq!("12,500".parse::<Fee>().unwrap(), Fee::amount(12_500.0, FeeUnit::None));
        assert_eq!("£1,250.5k".parse::<Fee>().unwrap(), Fee::amount(1_250.5, FeeUnit::Thousand));
    }

    #[test]
    fn test_billions_become_millions() {
        let fee: Fee = "£1.2bn".parse().unwrap();
        assert_eq!(fee.to_string(), "1200m");
    }

    #[test]
    fn test_sentinels() {
        assert_eq!("undisclosed".parse::<Fee>().unwrap(), Fee::Undisclosed);
        assert_eq!("Free Transfer".parse::<Fee>().unwrap(), Fee::FreeTransfer);
        assert_eq!("released".parse::<Fee>().unwrap(), Fee::FreeTransfer);
        assert_eq!("Loan Deal".parse::<Fee>().unwrap(), Fee::Loan);
        assert!("tbc".parse::<Fee>().is_err());
        assert_eq!(Fee::parse_lenient("tbc"), Fee::Undisclosed);
    }

    #[test]
    fn test_gbp_value() {
        assert_eq!(Fee::amount(12.0, FeeUnit::Million).gbp_value(), 12_000_000.0);
        assert_eq!(Fee::amount(40.0, FeeUnit::Thousand).gbp_value(), 40_000.0);
        assert_eq!(Fee::amount(75.0, FeeUnit::None).gbp_value(), 75.0);
        assert_eq!(Fee::Loan.gbp_value(), 0.0);
    }

    #[test]
    fn test_display_forms() {
        assert_eq!(Fee::amount(12.0, FeeUnit::Million).to_string(), "12m");
        assert_eq!(Fee::amount(2.5, FeeUnit::Thousand).to_string(), "2.5k");
        assert_eq!(Fee::FreeTransfer.to_string(), "Free Transfer");
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&Fee::amount(12.0, FeeUnit::Million)).unwrap();
        assert_eq!(json, "\"12m\"");
        let back: Fee = serde_json::from_str("\"Loan Deal\"").unwrap();
        assert_eq!(back, Fee::Loan);
    }
}
