//! Positional printf-style formatting for [`BlueprintValue::Format`].
//!
//! [`BlueprintValue::Format`]: crate::BlueprintValue::Format
//!
//! # Syntax
//!
//! ```text
//! %[index$][-][width][.precision]conversion
//! ```
//!
//! | Conversion | Output |
//! |------------|--------|
//! | `s` / `S` | string form (upper-cased for `S`); precision truncates |
//! | `d` | integer; non-integers are an error |
//! | `f` | floating point, 6 digits unless a precision is given |
//! | `b` | `false` for null, the value for booleans, `true` otherwise |
//! | `n` | newline, consumes no argument |
//! | `%` | literal `%`, consumes no argument |
//!
//! Null arguments render as `null` (except for `b`). Width pads with spaces on
//! the left, or on the right with the `-` flag. An explicit `index$` does not
//! advance the implicit argument counter. Width and precision above
//! [`MAX_FIELD_SIZE`] are rejected.

use serde_json::Value;

use super::coerce::to_text;
use crate::error::{RenderError, Result};

/// Largest accepted width or precision.
pub const MAX_FIELD_SIZE: usize = 4096;

struct Placeholder {
    index: Option<usize>,
    left_align: bool,
    width: Option<usize>,
    precision: Option<usize>,
    conversion: char,
}

/// Formats `pattern` with positional `args`.
pub fn format(pattern: &str, args: &[Option<Value>]) -> Result<String> {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    let mut next_arg = 0usize;

    while let Some(ch) = chars.next() {
        if ch != '%' {
            out.push(ch);
            continue;
        }

        let placeholder = parse_placeholder(&mut chars)?;
        let rendered = match placeholder.conversion {
            '%' => "%".to_string(),
            'n' => "\n".to_string(),
            conversion => {
                let position = match placeholder.index {
                    Some(i) => i,
                    None => {
                        next_arg += 1;
                        next_arg
                    }
                };
                let arg = args.get(position - 1).ok_or_else(|| {
                    RenderError::Format(format!(
                        "missing argument {} for %{} in \"{}\"",
                        position, conversion, pattern
                    ))
                })?;
                convert(conversion, arg.as_ref(), placeholder.precision)?
            }
        };
        pad_into(&mut out, &rendered, placeholder.width, placeholder.left_align);
    }

    Ok(out)
}

fn parse_placeholder(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Result<Placeholder> {
    let mut digits = String::new();
    let mut index = None;
    let mut left_align = false;

    // A leading run of digits is either an explicit index (`2$`) or a width.
    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() {
            digits.push(c);
            chars.next();
        } else {
            break;
        }
    }
    if chars.peek() == Some(&'$') {
        chars.next();
        let i: usize = digits
            .parse()
            .map_err(|_| RenderError::Format("invalid argument index".to_string()))?;
        if i == 0 {
            return Err(RenderError::Format("argument index starts at 1".to_string()));
        }
        index = Some(i);
        digits.clear();
    }

    if digits.is_empty() {
        if chars.peek() == Some(&'-') {
            chars.next();
            left_align = true;
        }
        while let Some(&c) = chars.peek() {
            if c.is_ascii_digit() {
                digits.push(c);
                chars.next();
            } else {
                break;
            }
        }
    }
    let width = if digits.is_empty() {
        None
    } else {
        Some(field_size(&digits, "width")?)
    };

    let mut precision = None;
    if chars.peek() == Some(&'.') {
        chars.next();
        let mut p = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_ascii_digit() {
                p.push(c);
                chars.next();
            } else {
                break;
            }
        }
        if p.is_empty() {
            return Err(RenderError::Format("missing precision after '.'".to_string()));
        }
        precision = Some(field_size(&p, "precision")?);
    }

    let conversion = chars
        .next()
        .ok_or_else(|| RenderError::Format("pattern ends inside a conversion".to_string()))?;

    Ok(Placeholder {
        index,
        left_align,
        width,
        precision,
        conversion,
    })
}

fn field_size(digits: &str, what: &str) -> Result<usize> {
    match digits.parse::<usize>() {
        Ok(n) if n <= MAX_FIELD_SIZE => Ok(n),
        _ => Err(RenderError::Format(format!(
            "{} {} exceeds the limit of {}",
            what, digits, MAX_FIELD_SIZE
        ))),
    }
}

fn convert(conversion: char, arg: Option<&Value>, precision: Option<usize>) -> Result<String> {
    let arg = arg.filter(|v| !v.is_null());
    match conversion {
        's' | 'S' => {
            let mut s = match arg {
                Some(v) => to_text(Some(v)),
                None => "null".to_string(),
            };
            if let Some(p) = precision {
                s = s.chars().take(p).collect();
            }
            if conversion == 'S' {
                s = s.to_uppercase();
            }
            Ok(s)
        }
        'd' => match arg {
            None => Ok("null".to_string()),
            Some(Value::Number(n)) if n.is_i64() || n.is_u64() => Ok(n.to_string()),
            Some(other) => Err(RenderError::Format(format!(
                "%d needs an integer, got {}",
                other
            ))),
        },
        'f' => match arg {
            None => Ok("null".to_string()),
            Some(Value::Number(n)) => {
                let f = n.as_f64().unwrap_or_default();
                Ok(format!("{:.*}", precision.unwrap_or(6), f))
            }
            Some(other) => Err(RenderError::Format(format!(
                "%f needs a number, got {}",
                other
            ))),
        },
        'b' => Ok(match arg {
            None => "false".to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(_) => "true".to_string(),
        }),
        other => Err(RenderError::Format(format!(
            "unknown conversion '%{}'",
            other
        ))),
    }
}

fn pad_into(out: &mut String, s: &str, width: Option<usize>, left_align: bool) {
    let len = s.chars().count();
    let fill = width.map(|w| w.saturating_sub(len)).unwrap_or(0);
    if !left_align {
        out.extend(std::iter::repeat(' ').take(fill));
    }
    out.push_str(s);
    if left_align {
        out.extend(std::iter::repeat(' ').take(fill));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(values: &[Value]) -> Vec<Option<Value>> {
        values.iter().cloned().map(Some).collect()
    }

    #[test]
    fn test_basic_strings() {
        assert_eq!(format("%s-%s", &args(&[json!("a"), json!("b")])).unwrap(), "a-b");
    }

    #[test]
    fn test_no_conversions() {
        assert_eq!(format("plain text", &[]).unwrap(), "plain text");
    }

    #[test]
    fn test_numbers() {
        let a = args(&[json!(42), json!(3.14159)]);
        assert_eq!(format("%d / %.2f", &a).unwrap(), "42 / 3.14");
        assert_eq!(format("%2$f", &a).unwrap(), "3.141590");
    }

    #[test]
    fn test_explicit_index() {
        let a = args(&[json!("x"), json!("y")]);
        assert_eq!(format("%2$s%1$s%2$s", &a).unwrap(), "yxy");
        // explicit indices do not advance the implicit counter
        assert_eq!(format("%2$s %s", &a).unwrap(), "y x");
    }

    #[test]
    fn test_null_arguments() {
        let a = vec![None, Some(Value::Null)];
        assert_eq!(format("%s %s", &a).unwrap(), "null null");
        assert_eq!(format("%b %d", &a).unwrap(), "false null");
    }

    #[test]
    fn test_boolean_conversion() {
        let a = args(&[json!(false), json!("x")]);
        assert_eq!(format("%b %b", &a).unwrap(), "false true");
    }

    #[test]
    fn test_width_and_alignment() {
        let a = args(&[json!("ab"), json!("cd")]);
        assert_eq!(format("[%5s][%-4s]", &a).unwrap(), "[   ab][cd  ]");
    }

    #[test]
    fn test_oversized_fields_are_rejected() {
        let a = args(&[json!("x")]);
        let err = format("%50000000s", &a).unwrap_err();
        assert!(matches!(err, RenderError::Format(_)));
        assert!(err.to_string().contains("width 50000000"));

        assert!(format("%.50000000f", &args(&[json!(1.5)])).is_err());
        assert!(format("%-99999999999999999999999s", &a).is_err());

        let widest = format!("%{}s", MAX_FIELD_SIZE);
        assert_eq!(format(&widest, &a).unwrap().len(), MAX_FIELD_SIZE);
    }

    #[test]
    fn test_precision_truncates_strings() {
        assert_eq!(format("%.3s", &args(&[json!("abcdef")])).unwrap(), "abc");
    }

    #[test]
    fn test_uppercase_string() {
        assert_eq!(format("%S", &args(&[json!("ada")])).unwrap(), "ADA");
    }

    #[test]
    fn test_literals() {
        assert_eq!(format("100%% done%n", &[]).unwrap(), "100% done\n");
    }

    #[test]
    fn test_collections_use_json() {
        assert_eq!(format("%s", &args(&[json!([1, 2])])).unwrap(), "[1,2]");
    }

    #[test]
    fn test_missing_argument() {
        let err = format("%s %s", &args(&[json!("a")])).unwrap_err();
        assert!(matches!(err, RenderError::Format(_)));
        assert!(err.to_string().contains("missing argument 2"));
    }

    #[test]
    fn test_bad_patterns() {
        assert!(format("%q", &args(&[json!(1)])).is_err());
        assert!(format("trailing %", &[]).is_err());
        assert!(format("%0$s", &args(&[json!(1)])).is_err());
        assert!(format("%.f", &args(&[json!(1)])).is_err());
    }

    #[test]
    fn test_type_mismatch() {
        assert!(format("%d", &args(&[json!("x")])).is_err());
        assert!(format("%d", &args(&[json!(1.5)])).is_err());
        assert!(format("%f", &args(&[json!("x")])).is_err());
    }
}
