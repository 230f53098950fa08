//! Value types carried inside documents: account names, token symbols,
//! assets, content hashes and time points.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Point in time on the engine's clock (UTC, second resolution in practice)
pub type TimePoint = DateTime<Utc>;

/// Account name: lowercase letters, digits `1`-`5` and dots, 1 to 12 characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Name(String);

impl Name {
    /// Longest accepted account name
    pub const MAX_LEN: usize = 12;

    /// Validate and wrap an account name
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.is_empty() || value.len() > Self::MAX_LEN {
            return Err(Error::InvalidName(format!(
                "'{}' must be between 1 and {} characters",
                value,
                Self::MAX_LEN
            )));
        }
        if let Some(c) = value
            .chars()
            .find(|c| !matches!(c, 'a'..='z' | '1'..='5' | '.'))
        {
            return Err(Error::InvalidName(format!(
                "'{}' contains invalid character '{}'",
                value, c
            )));
        }
        Ok(Self(value))
    }

    /// Built-in names known to be valid
    pub(crate) fn from_static(value: &'static str) -> Self {
        Self(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Name {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Name::new(s)
    }
}

impl TryFrom<String> for Name {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Name::new(value)
    }
}

impl From<Name> for String {
    fn from(name: Name) -> Self {
        name.0
    }
}

/// Token symbol: an uppercase code and a fixed number of decimals
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
    code: String,
    precision: u8,
}

impl Symbol {
    /// Largest supported precision; keeps `10^precision` inside an i64
    pub const MAX_PRECISION: u8 = 18;

    pub fn new(code: impl Into<String>, precision: u8) -> Result<Self> {
        let code = code.into();
        if code.is_empty() || code.len() > 7 || !code.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(Error::asset(format!("invalid symbol code '{}'", code)));
        }
        if precision > Self::MAX_PRECISION {
            return Err(Error::asset(format!(
                "precision {} exceeds {}",
                precision,
                Self::MAX_PRECISION
            )));
        }
        Ok(Self { code, precision })
    }

    fn known(code: &str, precision: u8) -> Self {
        Self {
            code: code.to_string(),
            precision,
        }
    }

    /// Utility token paid out on the deferred share of compensation
    pub fn hypha() -> Self {
        Self::known("HYPHA", 2)
    }

    /// Stable token paid out on the liquid share of compensation
    pub fn husd() -> Self {
        Self::known("HUSD", 2)
    }

    /// Voting power token
    pub fn hvoice() -> Self {
        Self::known("HVOICE", 2)
    }

    /// Unit of account for salaries
    pub fn usd() -> Self {
        Self::known("USD", 2)
    }

    pub fn seeds() -> Self {
        Self::known("SEEDS", 4)
    }

    /// The DAO's own symbol with this code, if it is one
    pub fn canonical(code: &str) -> Option<Self> {
        [Self::hypha(), Self::husd(), Self::hvoice(), Self::usd(), Self::seeds()]
            .into_iter()
            .find(|s| s.code == code)
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn precision(&self) -> u8 {
        self.precision
    }

    fn unit(&self) -> i64 {
        10i64.pow(u32::from(self.precision))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.precision, self.code)
    }
}

/// Fixed-precision token amount, written as `"759.75 HYPHA"`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Asset {
    amount: i64,
    symbol: Symbol,
}

impl Asset {
    /// Build an asset from its raw amount in the symbol's smallest unit
    pub fn new(amount: i64, symbol: Symbol) -> Self {
        Self { amount, symbol }
    }

    pub fn zero(symbol: Symbol) -> Self {
        Self::new(0, symbol)
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    pub fn is_positive(&self) -> bool {
        self.amount > 0
    }

    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.amount, u32::from(self.symbol.precision))
    }

    /// Convert a decimal into an asset, truncating toward zero at the
    /// symbol's precision
    pub fn from_decimal(value: Decimal, symbol: Symbol) -> Result<Self> {
        let scaled = value
            .checked_mul(Decimal::from(symbol.unit()))
            .ok_or_else(|| Error::asset(format!("{} overflows {}", value, symbol)))?
            .trunc();
        let amount = scaled
            .to_i64()
            .ok_or_else(|| Error::asset(format!("{} overflows {}", value, symbol)))?;
        Ok(Self::new(amount, symbol))
    }

    /// Multiply by a decimal factor, truncating toward zero
    pub fn scale(&self, factor: Decimal) -> Result<Self> {
        let value = self
            .to_decimal()
            .checked_mul(factor)
            .ok_or_else(|| Error::asset(format!("{} * {} overflows", self, factor)))?;
        Self::from_decimal(value, self.symbol.clone())
    }

    /// Multiply by `numerator / denominator` with exact integer arithmetic,
    /// truncating toward zero
    pub fn mul_ratio(&self, numerator: i128, denominator: i128) -> Result<Self> {
        if denominator == 0 {
            return Err(Error::asset("ratio denominator is zero"));
        }
        let product = i128::from(self.amount)
            .checked_mul(numerator)
            .ok_or_else(|| Error::asset(format!("{} * {} overflows", self, numerator)))?;
        let amount = i64::try_from(product / denominator)
            .map_err(|_| Error::asset(format!("{} * {}/{} overflows", self, numerator, denominator)))?;
        Ok(Self::new(amount, self.symbol.clone()))
    }

    pub fn checked_add(&self, other: &Asset) -> Result<Self> {
        self.ensure_same_symbol(other)?;
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or_else(|| Error::asset(format!("{} + {} overflows", self, other)))?;
        Ok(Self::new(amount, self.symbol.clone()))
    }

    pub fn checked_sub(&self, other: &Asset) -> Result<Self> {
        self.ensure_same_symbol(other)?;
        let amount = self
            .amount
            .checked_sub(other.amount)
            .ok_or_else(|| Error::asset(format!("{} - {} overflows", self, other)))?;
        Ok(Self::new(amount, self.symbol.clone()))
    }

    fn ensure_same_symbol(&self, other: &Asset) -> Result<()> {
        if self.symbol != other.symbol {
            return Err(Error::asset(format!(
                "symbol mismatch: {} vs {}",
                self.symbol, other.symbol
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.amount < 0 { "-" } else { "" };
        let abs = self.amount.unsigned_abs();
        let precision = usize::from(self.symbol.precision);
        if precision == 0 {
            return write!(f, "{}{} {}", sign, abs, self.symbol.code);
        }
        let unit = self.symbol.unit().unsigned_abs();
        write!(
            f,
            "{}{}.{:0width$} {}",
            sign,
            abs / unit,
            abs % unit,
            self.symbol.code,
            width = precision
        )
    }
}

impl FromStr for Asset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (number, code) = s
            .trim()
            .split_once(' ')
            .ok_or_else(|| Error::asset(format!("'{}' is missing a symbol", s)))?;
        let (negative, digits) = match number.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, number),
        };
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if whole.is_empty() || !all_digits(whole) || !all_digits(fraction) {
            return Err(Error::asset(format!("'{}' is not a valid amount", number)));
        }
        let precision = u8::try_from(fraction.len())
            .map_err(|_| Error::asset(format!("'{}' has too many decimals", number)))?;
        let symbol = Symbol::new(code.trim(), precision)?;
        let raw: i64 = format!("{}{}", whole, fraction)
            .parse()
            .map_err(|_| Error::asset(format!("'{}' is out of range", number)))?;
        Ok(Asset::new(if negative { -raw } else { raw }, symbol))
    }
}

impl TryFrom<String> for Asset {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Asset> for String {
    fn from(asset: Asset) -> Self {
        asset.to_string()
    }
}

/// SHA-256 digest, rendered as lowercase hex
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Checksum256([u8; 32]);

impl Checksum256 {
    /// Hash arbitrary bytes
    pub fn hash(data: &[u8]) -> Self {
        let digest = Sha256::digest(data);
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Checksum256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Checksum256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Checksum256({})", self.to_hex())
    }
}

impl FromStr for Checksum256 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = hex::decode(s).map_err(|e| Error::InvalidChecksum(format!("{}: {}", s, e)))?;
        let bytes = <[u8; 32]>::try_from(bytes.as_slice())
            .map_err(|_| Error::InvalidChecksum(format!("{} is not 32 bytes", s)))?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for Checksum256 {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Checksum256> for String {
    fn from(checksum: Checksum256) -> Self {
        checksum.to_hex()
    }
}
