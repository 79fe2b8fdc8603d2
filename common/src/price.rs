//! [`Price`]-related definitions.

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;

/// Hourly price of a parking, in the platform currency.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(
    feature = "postgres",
    derive(postgres_types::FromSql, postgres_types::ToSql),
    postgres(transparent)
)]
pub struct Price(Decimal);

impl Price {
    /// Creates a new [`Price`] if the provided amount is not negative.
    #[must_use]
    pub fn new(amount: Decimal) -> Option<Self> {
        (!amount.is_sign_negative() || amount.is_zero()).then_some(Self(amount))
    }

    /// Returns the amount of this [`Price`].
    #[must_use]
    pub fn amount(self) -> Decimal {
        self.0
    }
}

impl From<u32> for Price {
    fn from(amount: u32) -> Self {
        Self(amount.into())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl FromStr for Price {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s.trim()).map_err(|_| "invalid amount")?;
        Self::new(amount).ok_or("negative amount")
    }
}

#[cfg(feature = "serde")]
mod serde {
    //! Module providing integration with [`serde`] crate.
    //!
    //! [`Price`]s are represented as plain JSON numbers.

    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    use super::Price;

    impl Serialize for Price {
        fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
            rust_decimal::serde::float::serialize(&self.0, s)
        }
    }

    impl<'de> Deserialize<'de> for Price {
        fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
            let amount = rust_decimal::serde::float::deserialize(d)?;
            Self::new(amount)
                .ok_or_else(|| de::Error::custom("negative `Price`"))
        }
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use std::str::FromStr as _;

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Hourly price as a decimal string (`5`, `7.50`).
    ///
    /// Integer and float inputs are accepted as well.
    #[graphql_scalar(with = Self, parse_token(String, f64, i32))]
    type Price = super::Price;

    impl Price {
        fn to_output<S: ScalarValue>(p: &Price) -> Value<S> {
            Value::scalar(p.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            let raw = if let Some(s) = input.as_string_value() {
                s.to_owned()
            } else if let Some(i) = input.as_int_value() {
                i.to_string()
            } else if let Some(f) = input.as_float_value() {
                f.to_string()
            } else {
                return Err(format!(
                    "Cannot parse `Price` input scalar from \
                     non-numeric value: {input}",
                ));
            };
            Self::from_str(&raw)
                .map_err(|e| format!("Cannot parse `Price` input scalar: {e}"))
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use super::Price;

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn from_str() {
        assert_eq!(Price::from_str("5").unwrap(), Price::from(5));
        assert_eq!(
            Price::from_str("7.50").unwrap().amount(),
            decimal("7.5"),
        );
        assert_eq!(Price::from_str("0").unwrap(), Price::from(0));

        assert!(Price::from_str("-1").is_err());
        assert!(Price::from_str("5EUR").is_err());
        assert!(Price::from_str("").is_err());
    }

    #[test]
    fn to_string() {
        assert_eq!(Price::from(5).to_string(), "5");
        assert_eq!(Price::from_str("5.00").unwrap().to_string(), "5");
        assert_eq!(Price::from_str("7.50").unwrap().to_string(), "7.5");
    }

    #[test]
    fn compares_by_value() {
        assert_eq!(Price::from_str("5.00").unwrap(), Price::from(5));
        assert_ne!(Price::from(5), Price::from(7));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_as_number() {
        assert_eq!(serde_json::to_string(&Price::from(5)).unwrap(), "5.0");
        assert_eq!(
            serde_json::from_str::<Price>("7.5").unwrap(),
            Price::from_str("7.5").unwrap(),
        );
        assert!(serde_json::from_str::<Price>("-2").is_err());
    }
}
