use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::DispatchError;

/// Splits the request's `parameters` JSON-array-as-string into the
/// top-level array of values (spec §4.2 step 2, first half).
pub fn split_parameters(parameters: &str) -> Result<Vec<Value>, DispatchError> {
    if parameters.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(parameters).map_err(DispatchError::DecodeParameters)
}

fn expect_arity(params: &[Value], want: usize) -> Result<(), DispatchError> {
    if params.len() != want {
        return Err(DispatchError::MethodMismatch {
            got: params.len(),
            want,
        });
    }
    Ok(())
}

fn decode_one<T: DeserializeOwned>(value: &Value) -> Result<T, DispatchError> {
    serde_json::from_value(value.clone()).map_err(DispatchError::DecodeParameters)
}

/// Decodes a zero-arity call, failing with `MethodMismatch` if the caller
/// supplied any parameters.
pub fn decode0(params: &[Value]) -> Result<(), DispatchError> {
    expect_arity(params, 0)
}

pub fn decode1<A: DeserializeOwned>(params: &[Value]) -> Result<A, DispatchError> {
    expect_arity(params, 1)?;
    decode_one(&params[0])
}

pub fn decode2<A: DeserializeOwned, B: DeserializeOwned>(params: &[Value]) -> Result<(A, B), DispatchError> {
    expect_arity(params, 2)?;
    Ok((decode_one(&params[0])?, decode_one(&params[1])?))
}

pub fn decode3<A: DeserializeOwned, B: DeserializeOwned, C: DeserializeOwned>(
    params: &[Value],
) -> Result<(A, B, C), DispatchError> {
    expect_arity(params, 3)?;
    Ok((decode_one(&params[0])?, decode_one(&params[1])?, decode_one(&params[2])?))
}

pub fn decode4<A: DeserializeOwned, B: DeserializeOwned, C: DeserializeOwned, D: DeserializeOwned>(
    params: &[Value],
) -> Result<(A, B, C, D), DispatchError> {
    expect_arity(params, 4)?;
    Ok((
        decode_one(&params[0])?,
        decode_one(&params[1])?,
        decode_one(&params[2])?,
        decode_one(&params[3])?,
    ))
}

/// Encodes a handler's return values as the `[value, error-or-null]` pair
/// the guest contract uses throughout (spec §6 guest contract: every
/// optional method returns `(T, Error?)`).
pub fn encode_fallible<T: Serialize>(
    result: Result<T, warren_proto::Error>,
) -> Result<Vec<Value>, DispatchError> {
    match result {
        Ok(value) => {
            let encoded = serde_json::to_value(value).map_err(DispatchError::EncodeResult)?;
            Ok(vec![encoded, Value::Null])
        }
        Err(err) => {
            let encoded = serde_json::to_value(&err).map_err(DispatchError::EncodeResult)?;
            Ok(vec![Value::Null, encoded])
        }
    }
}

/// Encodes a single successful return value with no error channel, for
/// methods the dispatcher itself produces synthetic responses for (e.g.
/// `Subscribe`'s boolean ack).
pub fn encode_value<T: Serialize>(value: T) -> Result<Vec<Value>, DispatchError> {
    Ok(vec![
        serde_json::to_value(value).map_err(DispatchError::EncodeResult)?,
    ])
}
