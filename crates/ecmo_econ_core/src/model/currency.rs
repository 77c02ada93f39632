//! Reporting currencies
//!
//! Amounts are converted through TWD, the currency the reference cost
//! tables were collected in.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    Twd,
    #[default]
    Usd,
    Eur,
}

impl Currency {
    /// Units of TWD per one unit of this currency
    pub fn twd_rate(&self) -> f64 {
        match self {
            Currency::Twd => 1.0,
            Currency::Usd => 31.5,
            Currency::Eur => 34.2,
        }
    }

    /// Convert an amount denominated in `self` into `to`.
    pub fn convert(&self, amount: f64, to: Currency) -> f64 {
        if *self == to {
            return amount;
        }
        amount * self.twd_rate() / to.twd_rate()
    }

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Twd => "TWD",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "twd" => Ok(Currency::Twd),
            "usd" => Ok(Currency::Usd),
            "eur" => Ok(Currency::Eur),
            other => Err(format!("unknown currency '{other}' (expected usd, twd or eur)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_usd_to_twd() {
        assert!((Currency::Usd.convert(100.0, Currency::Twd) - 3150.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("EUR".parse::<Currency>(), Ok(Currency::Eur));
        assert!("gbp".parse::<Currency>().is_err());
    }

    #[test]
    fn test_convert_round_trip_through_eur() {
        let eur = Currency::Usd.convert(1_000.0, Currency::Eur);
        let back = Currency::Eur.convert(eur, Currency::Usd);
        assert!((back - 1_000.0).abs() < 1e-9);
    }
}
