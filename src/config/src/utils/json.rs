// Copyright 2025 OpenObserve Inc.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

pub use serde_json::{Error, Map, Number, Value, from_value, json, to_value};

#[inline(always)]
pub fn to_string<T>(value: &T) -> Result<String, Error>
where
    T: ?Sized + serde::Serialize,
{
    serde_json::to_string(value)
}

#[inline(always)]
pub fn to_vec<T>(value: &T) -> Result<Vec<u8>, Error>
where
    T: ?Sized + serde::Serialize,
{
    serde_json::to_vec(value)
}

#[inline(always)]
pub fn from_str<'a, T>(s: &'a str) -> Result<T, Error>
where
    T: serde::Deserialize<'a>,
{
    from_slice(s.as_bytes())
}

#[inline(always)]
pub fn from_slice<'a, T>(v: &'a [u8]) -> Result<T, Error>
where
    T: serde::Deserialize<'a>,
{
    serde_json::from_slice(v)
}

/// Canonical JSON used as a signing pre-image: object keys emit in
/// lexicographic order and floats that are mathematically integers emit
/// as integer literals. Existing signatures depend on both rules.
pub fn canonical_string(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => write_canonical_number(n, out),
        Value::String(s) => {
            // serde escaping of a plain string cannot fail
            out.push_str(&serde_json::to_string(s).unwrap());
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::to_string(key).unwrap());
                out.push(':');
                write_canonical(&map[key.as_str()], out);
            }
            out.push('}');
        }
    }
}

// 2^53, the largest range where f64 holds integers exactly
const FLOAT_INT_MAX: f64 = 9_007_199_254_740_992.0;

fn write_canonical_number(n: &Number, out: &mut String) {
    if let Some(i) = n.as_i64() {
        out.push_str(&i.to_string());
    } else if let Some(u) = n.as_u64() {
        out.push_str(&u.to_string());
    } else if let Some(f) = n.as_f64() {
        if f.is_finite() && f.fract() == 0.0 && f.abs() < FLOAT_INT_MAX {
            out.push_str(&format!("{}", f as i64));
        } else {
            out.push_str(&n.to_string());
        }
    } else {
        out.push_str("0");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_sorts_keys() {
        let v = json!({"zebra": 1, "alpha": 2, "mid": {"b": 1, "a": 2}});
        assert_eq!(
            canonical_string(&v),
            r#"{"alpha":2,"mid":{"a":2,"b":1},"zebra":1}"#
        );
    }

    #[test]
    fn test_canonical_integer_floats() {
        let v = json!({"count": 5.0, "ratio": 1.5, "neg": -3.0});
        assert_eq!(canonical_string(&v), r#"{"count":5,"neg":-3,"ratio":1.5}"#);
    }

    #[test]
    fn test_canonical_scalars() {
        assert_eq!(canonical_string(&json!(null)), "null");
        assert_eq!(canonical_string(&json!(true)), "true");
        assert_eq!(canonical_string(&json!("a \"quote\"")), r#""a \"quote\"""#);
        assert_eq!(canonical_string(&json!([1, "two", null])), r#"[1,"two",null]"#);
    }

    #[test]
    fn test_canonical_reparses_to_same_value() {
        let v = json!({
            "token": "abc123",
            "nonce": "xyz",
            "expires_at": 1735689600,
            "nested": {"list": [1, 2, 3], "flag": false}
        });
        let canon = canonical_string(&v);
        let reparsed: Value = from_str(&canon).unwrap();
        assert_eq!(reparsed, v);
        // canonicalization is idempotent
        assert_eq!(canonical_string(&reparsed), canon);
    }

    #[test]
    fn test_canonical_idempotent_on_integer_floats() {
        let v = json!({"x": 2.0});
        let canon = canonical_string(&v);
        assert_eq!(canon, r#"{"x":2}"#);
        let reparsed: Value = from_str(&canon).unwrap();
        assert_eq!(canonical_string(&reparsed), canon);
    }
}
