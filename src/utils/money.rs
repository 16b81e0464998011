//! Fixed-point money in minor units (cents).
//!
//! Amounts travel as two-decimal strings ("150.00") and are stored as `i64`
//! cents, so sums and balances never drift.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Floors negative amounts at zero.
    pub fn non_negative(self) -> Self {
        Money(self.0.max(0))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim().replace(',', "");
        if raw.is_empty() {
            return Err("Amount is empty".to_string());
        }
        let (negative, digits) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw.as_str()),
        };
        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(format!("Invalid amount: {s}"));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(format!("Invalid amount: {s}"));
        }
        if frac.len() > 2 {
            return Err(format!("Amount has more than two decimal places: {s}"));
        }
        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| format!("Amount is too large: {s}"))?
        };
        let frac: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().unwrap_or(0) * 10,
            _ => frac.parse::<i64>().unwrap_or(0),
        };
        let cents = whole
            .checked_mul(100)
            .and_then(|w| w.checked_add(frac))
            .ok_or_else(|| format!("Amount is too large: {s}"))?;
        Ok(Money(if negative { -cents } else { cents }))
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Float(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Int(units) => units
                .checked_mul(100)
                .map(Money)
                .ok_or_else(|| D::Error::custom("Amount is too large")),
            Raw::Float(value) => {
                if !value.is_finite() {
                    return Err(D::Error::custom("Amount must be a finite number"));
                }
                Ok(Money((value * 100.0).round() as i64))
            }
            Raw::Text(text) => text.parse().map_err(D::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("150".parse::<Money>(), Ok(Money(15000)));
        assert_eq!("150.5".parse::<Money>(), Ok(Money(15050)));
        assert_eq!("1,250.75".parse::<Money>(), Ok(Money(125075)));
        assert_eq!(".25".parse::<Money>(), Ok(Money(25)));
        assert_eq!("-3.10".parse::<Money>(), Ok(Money(-310)));
        assert!("12.345".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("".parse::<Money>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Money(15000).to_string(), "150.00");
        assert_eq!(Money(5).to_string(), "0.05");
        assert_eq!(Money(-310).to_string(), "-3.10");
    }

    #[test]
    fn test_balance_arithmetic() {
        let total = Money(10000);
        let paid: Money = [Money(2500), Money(8000)].into_iter().sum();
        assert_eq!(paid, Money(10500));
        assert_eq!((total - paid).non_negative(), Money::ZERO);
        assert_eq!((total - Money(2500)).non_negative(), Money(7500));
    }

    #[test]
    fn test_json_inputs() {
        let m: Money = serde_json::from_str("\"99.99\"").unwrap();
        assert_eq!(m.cents(), 9999);
        let m: Money = serde_json::from_str("12").unwrap();
        assert_eq!(m.cents(), 1200);
        let m: Money = serde_json::from_str("12.3").unwrap();
        assert_eq!(m.cents(), 1230);
        assert_eq!(serde_json::to_string(&Money(1230)).unwrap(), "\"12.30\"");
    }
}
