//! Lenient numeric deserializers.
//!
//! Form-style clients frequently send numbers as strings (`{"amount": "77"}`). These helpers accept either a JSON
//! number or a string holding one, and can be used with `#[serde(deserialize_with = "...")]`.
use serde::{de::Error, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientInt {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientFloat {
    Float(f64),
    Text(String),
}

fn int_to_u32<E: Error>(value: LenientInt) -> Result<u32, E> {
    let value = match value {
        LenientInt::Unsigned(v) => v,
        LenientInt::Signed(v) => return Err(E::custom(format!("{v} is not a non-negative integer"))),
        LenientInt::Float(v) if v.fract() == 0.0 && v >= 0.0 => v as u64,
        LenientInt::Float(v) => return Err(E::custom(format!("{v} is not a non-negative integer"))),
        LenientInt::Text(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| E::custom(format!("'{s}' is not a non-negative integer")))?,
    };
    u32::try_from(value).map_err(|_| E::custom(format!("{value} is too large")))
}

fn float_to_f64<E: Error>(value: LenientFloat) -> Result<f64, E> {
    let value = match value {
        LenientFloat::Float(v) => v,
        LenientFloat::Text(s) => s.trim().parse::<f64>().map_err(|_| E::custom(format!("'{s}' is not a number")))?,
    };
    if value.is_finite() {
        Ok(value)
    } else {
        Err(E::custom("number must be finite"))
    }
}

pub fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where D: Deserializer<'de> {
    int_to_u32(LenientInt::deserialize(deserializer)?)
}

pub fn lenient_opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where D: Deserializer<'de> {
    Option::<LenientInt>::deserialize(deserializer)?.map(int_to_u32).transpose()
}

pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where D: Deserializer<'de> {
    float_to_f64(LenientFloat::deserialize(deserializer)?)
}

pub fn lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where D: Deserializer<'de> {
    Option::<LenientFloat>::deserialize(deserializer)?.map(float_to_f64).transpose()
}
