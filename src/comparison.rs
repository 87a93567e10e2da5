use crate::value::AnyData;

/// Strict equality: no coercion between types, NaN never equals anything,
/// and object key order is ignored.
pub fn strictly_equal(a: &AnyData, b: &AnyData) -> bool {
    match (a, b) {
        (AnyData::Null, AnyData::Null) => true,
        (AnyData::Bool(x), AnyData::Bool(y)) => x == y,
        (AnyData::Number(x), AnyData::Number(y)) => x == y,
        (AnyData::String(x), AnyData::String(y)) => x == y,
        (AnyData::Array(xs), AnyData::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| strictly_equal(x, y))
        }
        (AnyData::Object(xs), AnyData::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| strictly_equal(x, y)))
        }
        _ => false,
    }
}
