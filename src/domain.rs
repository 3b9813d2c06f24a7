// Domain model: validated value objects and the two records the shop
// deals with, dresses and dress loans.
//
// Every wrapper checks its rule once, at construction, and has no
// setters. Two records are equal when every field is equal.

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::error::{DomainError, DomainResult};

fn check_text(
    field: &'static str,
    value: impl Into<String>,
    max_len: usize,
    allowed: impl Fn(char) -> bool,
) -> DomainResult<String> {
    let value = value.into();
    let len = value.chars().count();
    if len == 0 {
        return Err(DomainError::validation(field, "must not be empty"));
    }
    if len > max_len {
        return Err(DomainError::validation(
            field,
            format!("must be at most {max_len} characters"),
        ));
    }
    if let Some(bad) = value.chars().find(|c| !allowed(*c)) {
        return Err(DomainError::validation(
            field,
            format!("character {bad:?} is not allowed"),
        ));
    }
    Ok(value)
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-'
}

fn is_label_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '&' | '\'' | '.')
}

fn is_printable(c: char) -> bool {
    !c.is_control()
}

fn is_username_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')
}

/// Declares a string wrapper validated by `check_text`.
macro_rules! text_value {
    ($(#[$meta:meta])* $name:ident, $field:literal, $max:expr, $allowed:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> DomainResult<Self> {
                check_text($field, value, $max, $allowed).map(Self)
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

text_value!(
    /// Identifier of a dress, usually a UUID.
    DressId, "dress id", 64, is_identifier_char
);
text_value!(
    /// Identifier of a dress loan.
    DressLoanId, "loan id", 64, is_identifier_char
);

impl DressId {
    /// A fresh random identifier for a dress created on this side.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

text_value!(Brand, "brand", 50, is_label_char);
text_value!(Material, "material", 50, is_label_char);
text_value!(Color, "color", 50, is_label_char);
text_value!(Description, "description", 500, is_printable);
text_value!(
    /// Loan start or end date as sent by the server. Must not be empty;
    /// the content is not interpreted.
    LoanDate, "date", usize::MAX, |_| true
);
text_value!(Username, "username", 150, is_username_char);

/// Login password. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub fn new(value: impl Into<String>) -> DomainResult<Self> {
        check_text("password", value, 128, is_printable).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Amount of money in cents.
///
/// Parsed from `"D"` or `"D.C"`, where `C` has one or two digits and is read
/// as a number of cents (`"12.5"` is twelve and five cents). Always printed
/// with two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(u64);

impl Price {
    pub const MAX_CENTS: u64 = 100_000_000;

    pub fn from_cents(cents: i64) -> DomainResult<Self> {
        if cents < 0 {
            return Err(DomainError::validation("price", "must not be negative"));
        }
        let cents = cents as u64;
        if cents > Self::MAX_CENTS {
            return Err(DomainError::validation(
                "price",
                format!("must be at most {}", Price(Self::MAX_CENTS)),
            ));
        }
        Ok(Self(cents))
    }

    /// Builds a price from its major and minor parts.
    pub fn create(major: i64, minor: i64) -> DomainResult<Self> {
        if major < 0 {
            return Err(DomainError::validation("price", "must not be negative"));
        }
        if !(0..=99).contains(&minor) {
            return Err(DomainError::validation("price", "cents must be within 0..=99"));
        }
        let cents = major
            .checked_mul(100)
            .and_then(|c| c.checked_add(minor))
            .ok_or_else(|| DomainError::validation("price", "too large"))?;
        Self::from_cents(cents)
    }

    pub fn parse(value: &str) -> DomainResult<Self> {
        let value = value.trim();
        let (major, minor) = match value.split_once('.') {
            Some((major, minor)) => (major, Some(minor)),
            None => (value, None),
        };
        let major = parse_digits(major, 18)?;
        let minor = match minor {
            Some(minor) => parse_digits(minor, 2)?,
            None => 0,
        };
        Self::create(major, minor)
    }

    pub fn cents(&self) -> u64 {
        self.0
    }
}

fn parse_digits(digits: &str, max_len: usize) -> DomainResult<i64> {
    if digits.is_empty() || digits.len() > max_len || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DomainError::validation("price", "expected the D.C format"));
    }
    digits
        .parse()
        .map_err(|_| DomainError::validation("price", "expected the D.C format"))
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl FromStr for Price {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Dress size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Size(u32);

impl Size {
    pub const MAX: u32 = 200;

    pub fn new(value: i64) -> DomainResult<Self> {
        if !(1..=Self::MAX as i64).contains(&value) {
            return Err(DomainError::validation(
                "size",
                format!("must be within 1..={}", Self::MAX),
            ));
        }
        Ok(Self(value as u32))
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Size {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<i64>()
            .map_err(|_| DomainError::validation("size", "expected a whole number"))?;
        Self::new(value)
    }
}

/// Numeric identifier of a shop user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserId(u64);

impl UserId {
    pub fn new(value: i64) -> DomainResult<Self> {
        if value < 1 {
            return Err(DomainError::validation("user id", "must be positive"));
        }
        Ok(Self(value as u64))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Length of a loan in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DurationDays(u32);

impl DurationDays {
    pub const MAX: u32 = 3650;

    pub fn new(value: i64) -> DomainResult<Self> {
        if !(1..=Self::MAX as i64).contains(&value) {
            return Err(DomainError::validation(
                "loan duration",
                format!("must be within 1..={} days", Self::MAX),
            ));
        }
        Ok(Self(value as u32))
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for DurationDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bounded integer in `MIN..=MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Number(u16);

impl Number {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 1000;

    pub fn new(value: i64) -> DomainResult<Self> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(DomainError::validation(
                "number",
                format!("must be within {}..={}", Self::MIN, Self::MAX),
            ));
        }
        Ok(Self(value as u16))
    }

    pub fn value(&self) -> i64 {
        i64::from(self.0)
    }
}

impl FromStr for Number {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<i64>()
            .map_err(|_| DomainError::validation("number", "expected a whole number"))?;
        Self::new(value)
    }
}

/// Declares a boolean flag wrapper.
macro_rules! flag_value {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub struct $name(bool);

        impl $name {
            pub fn new(value: bool) -> Self {
                Self(value)
            }

            pub fn value(&self) -> bool {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

flag_value!(
    /// Whether the shop has withdrawn the dress.
    Deleted
);
flag_value!(
    /// Whether the loan is over.
    Terminated
);

/// A dress offered by the shop.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dress {
    pub id: DressId,
    pub brand: Brand,
    pub price: Price,
    pub material: Material,
    pub color: Color,
    pub size: Size,
    pub description: Description,
    pub deleted: Deleted,
}

/// A dress rented by a user for a range of dates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DressLoan {
    pub id: DressLoanId,
    pub start_date: LoanDate,
    pub end_date: LoanDate,
    pub dress: DressId,
    pub loaner: UserId,
    pub total_price: Price,
    pub duration: DurationDays,
    pub inserted_by: UserId,
    pub terminated: Terminated,
}
