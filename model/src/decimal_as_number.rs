//! Serializes a [`BigDecimal`] as a JSON number rather than the string
//! `bigdecimal`'s own `Serialize` impl produces. Whole values render as
//! bare integers (`100`, not `100.0`); everything else falls back to a
//! float. Used with `#[serde(serialize_with = "...")]` on the monetary
//! fields in [`crate::balance`], [`crate::order`] and [`crate::withdrawal`].
use bigdecimal::BigDecimal;
use num_traits::ToPrimitive;
use serde::{ser, Serializer};

pub fn serialize<S>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.is_integer() {
        let as_i64 = value
            .to_i64()
            .ok_or_else(|| ser::Error::custom("decimal value out of i64 range"))?;
        serializer.serialize_i64(as_i64)
    } else {
        let as_f64 = value
            .to_f64()
            .ok_or_else(|| ser::Error::custom("decimal value out of f64 range"))?;
        serializer.serialize_f64(as_f64)
    }
}

#[cfg(test)]
mod tests {
    use super::serialize;
    use bigdecimal::BigDecimal;
    use serde_json::value::Serializer;
    use serde_json::Value;
    use std::str::FromStr;

    #[test]
    fn whole_values_render_as_integers() {
        assert_eq!(
            serialize(&BigDecimal::from(100), Serializer).unwrap(),
            Value::from(100)
        );
        assert_eq!(
            serialize(&BigDecimal::from(0), Serializer).unwrap(),
            Value::from(0)
        );
    }

    #[test]
    fn fractional_values_render_as_floats() {
        let value = BigDecimal::from_str("12.34").unwrap();
        assert_eq!(serialize(&value, Serializer).unwrap(), Value::from(12.34));
    }
}
