use std::collections::BTreeMap;

use super::{Decode, Decoder, Encode, Encoder};
use crate::{
    error::{DecodeError, EncodeError},
    value::{Map, Number, Value},
};

impl Decode for bool {
    fn decode(value: Value, de: &mut Decoder) -> Result<Self, DecodeError> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(de.type_mismatch("boolean", &other)),
        }
    }
}

impl Encode for bool {
    fn encode(&self, _: &mut Encoder) -> Result<Value, EncodeError> {
        Ok(Value::Bool(*self))
    }
}

impl Decode for i32 {
    fn decode(value: Value, de: &mut Decoder) -> Result<Self, DecodeError> {
        match value.as_i64().and_then(|n| i32::try_from(n).ok()) {
            Some(n) => Ok(n),
            None => Err(de.type_mismatch("int32", &value)),
        }
    }
}

impl Encode for i32 {
    fn encode(&self, _: &mut Encoder) -> Result<Value, EncodeError> {
        Ok(Value::from(*self))
    }
}

impl Decode for i64 {
    fn decode(value: Value, de: &mut Decoder) -> Result<Self, DecodeError> {
        value.as_i64().ok_or_else(|| de.type_mismatch("int64", &value))
    }
}

impl Encode for i64 {
    fn encode(&self, _: &mut Encoder) -> Result<Value, EncodeError> {
        Ok(Value::from(*self))
    }
}

impl Decode for f64 {
    fn decode(value: Value, de: &mut Decoder) -> Result<Self, DecodeError> {
        value.as_f64().ok_or_else(|| de.type_mismatch("number", &value))
    }
}

// Whole numbers are written without a fraction, as the apiserver does.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

impl Encode for f64 {
    fn encode(&self, en: &mut Encoder) -> Result<Value, EncodeError> {
        if self.fract() == 0.0 && self.abs() <= MAX_EXACT_INTEGER {
            return Ok(Value::from(*self as i64));
        }
        Number::from_f64(*self)
            .map(Value::Number)
            .ok_or_else(|| en.non_finite())
    }
}

impl Decode for String {
    fn decode(value: Value, de: &mut Decoder) -> Result<Self, DecodeError> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(de.type_mismatch("string", &other)),
        }
    }
}

impl Encode for String {
    fn encode(&self, _: &mut Encoder) -> Result<Value, EncodeError> {
        Ok(Value::String(self.clone()))
    }
}

impl Encode for str {
    fn encode(&self, _: &mut Encoder) -> Result<Value, EncodeError> {
        Ok(Value::String(self.to_owned()))
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(value: Value, de: &mut Decoder) -> Result<Self, DecodeError> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| de.element(index, item))
                .collect(),
            other => Err(de.type_mismatch("array", &other)),
        }
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self, en: &mut Encoder) -> Result<Value, EncodeError> {
        self.as_slice().encode(en)
    }
}

impl<T: Encode> Encode for [T] {
    fn encode(&self, en: &mut Encoder) -> Result<Value, EncodeError> {
        self.iter()
            .enumerate()
            .map(|(index, item)| en.element(index, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }
}

impl<T: Decode> Decode for BTreeMap<String, T> {
    fn decode(value: Value, de: &mut Decoder) -> Result<Self, DecodeError> {
        match value {
            Value::Object(map) => map
                .into_iter()
                .map(|(key, item)| {
                    let item = de.entry(&key, item)?;
                    Ok((key, item))
                })
                .collect(),
            other => Err(de.type_mismatch("map", &other)),
        }
    }
}

impl<T: Encode> Encode for BTreeMap<String, T> {
    fn encode(&self, en: &mut Encoder) -> Result<Value, EncodeError> {
        let mut map = Map::new();
        for (key, item) in self {
            map.insert(key.clone(), en.entry(key, item)?);
        }
        Ok(Value::Object(map))
    }
}

impl Decode for Value {
    fn decode(value: Value, _: &mut Decoder) -> Result<Self, DecodeError> {
        Ok(value)
    }
}

impl Encode for Value {
    fn encode(&self, _: &mut Encoder) -> Result<Value, EncodeError> {
        Ok(self.clone())
    }
}

impl<T: Decode> Decode for Box<T> {
    fn decode(value: Value, de: &mut Decoder) -> Result<Self, DecodeError> {
        T::decode(value, de).map(Box::new)
    }
}

impl<T: Encode + ?Sized> Encode for Box<T> {
    fn encode(&self, en: &mut Encoder) -> Result<Value, EncodeError> {
        (**self).encode(en)
    }
}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode(&self, en: &mut Encoder) -> Result<Value, EncodeError> {
        (**self).encode(en)
    }
}
