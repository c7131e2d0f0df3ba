//! Client-side rendering of `$n` placeholders as SQL literals.
//!
//! `DECLARE` is a utility statement and cannot carry bind parameters, so a
//! parameterized streaming fetch has to splice its arguments into the
//! cursor body as literals. The scanner skips quoted strings, quoted
//! identifiers, and comments so placeholder-looking text inside them is
//! left alone.

use crate::error::SqlValetError;
use crate::types::SqlValue;

pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn quote_literal(s: &str) -> String {
    if s.contains('\\') {
        format!("E'{}'", s.replace('\\', "\\\\").replace('\'', "''"))
    } else {
        format!("'{}'", s.replace('\'', "''"))
    }
}

fn render_literal(value: &SqlValue) -> String {
    match value {
        SqlValue::Int(i) => i.to_string(),
        SqlValue::Float(f) if f.is_finite() => {
            let mut s = f.to_string();
            if !s.contains('.') && !s.contains('e') {
                s.push_str(".0");
            }
            s
        }
        SqlValue::Float(f) => format!("'{f}'::float8"),
        SqlValue::Text(s) => quote_literal(s),
        SqlValue::Bool(true) => "TRUE".to_string(),
        SqlValue::Bool(false) => "FALSE".to_string(),
        SqlValue::Timestamp(ts) => {
            format!("'{}'::timestamp", ts.format("%Y-%m-%d %H:%M:%S%.6f"))
        }
        SqlValue::Json(js) => format!("{}::jsonb", quote_literal(&js.to_string())),
        SqlValue::Bytes(bytes) => {
            let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
            format!("'\\x{hex}'::bytea")
        }
        SqlValue::Null => "NULL".to_string(),
    }
}

/// Replace `$1`..`$n` placeholders outside strings/identifiers/comments
/// with rendered literals.
pub(crate) fn interpolate(sql: &str, params: &[SqlValue]) -> Result<String, SqlValetError> {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        match c {
            '\'' => {
                out.push(c);
                // String literal; '' is an escaped quote, not a terminator.
                while let Some((_, c)) = chars.next() {
                    out.push(c);
                    if c == '\'' {
                        if chars.peek().is_some_and(|&(_, n)| n == '\'') {
                            if let Some((_, n)) = chars.next() {
                                out.push(n);
                            }
                        } else {
                            break;
                        }
                    }
                }
            }
            '"' => {
                out.push(c);
                for (_, c) in chars.by_ref() {
                    out.push(c);
                    if c == '"' {
                        break;
                    }
                }
            }
            '-' if chars.peek().is_some_and(|&(_, n)| n == '-') => {
                out.push(c);
                for (_, c) in chars.by_ref() {
                    out.push(c);
                    if c == '\n' {
                        break;
                    }
                }
            }
            '/' if chars.peek().is_some_and(|&(_, n)| n == '*') => {
                out.push(c);
                let mut prev = '\0';
                for (_, c) in chars.by_ref() {
                    out.push(c);
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            '$' => {
                let mut digits = String::new();
                while let Some(&(_, n)) = chars.peek() {
                    if n.is_ascii_digit() {
                        digits.push(n);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if digits.is_empty() {
                    out.push(c);
                    continue;
                }
                let index: usize = digits.parse().map_err(|_| {
                    SqlValetError::ExecutionError(format!("bad placeholder ${digits}"))
                })?;
                let value = index
                    .checked_sub(1)
                    .and_then(|i| params.get(i))
                    .ok_or_else(|| {
                        SqlValetError::ExecutionError(format!(
                            "placeholder ${index} has no matching parameter ({} given)",
                            params.len()
                        ))
                    })?;
                out.push_str(&render_literal(value));
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_literals_in_order() {
        let sql = "select * from t where id = $1 and name = $2";
        let out = interpolate(
            sql,
            &[SqlValue::Int(5), SqlValue::Text("o'brien".into())],
        )
        .unwrap();
        assert_eq!(out, "select * from t where id = 5 and name = 'o''brien'");
    }

    #[test]
    fn leaves_placeholders_inside_strings_alone() {
        let sql = "select '$1' as tag, $1 as id";
        let out = interpolate(sql, &[SqlValue::Int(9)]).unwrap();
        assert_eq!(out, "select '$1' as tag, 9 as id");
    }

    #[test]
    fn leaves_comments_alone() {
        let sql = "select $1 -- not $2\nfrom t";
        let out = interpolate(sql, &[SqlValue::Bool(true)]).unwrap();
        assert_eq!(out, "select TRUE -- not $2\nfrom t");
    }

    #[test]
    fn out_of_range_placeholder_is_an_error() {
        let err = interpolate("select $3", &[SqlValue::Int(1)]).unwrap_err();
        assert!(matches!(err, SqlValetError::ExecutionError(_)));
    }

    #[test]
    fn renders_null_and_bytes() {
        let out = interpolate("values ($1, $2)", &[SqlValue::Null, SqlValue::Bytes(vec![0xde, 0xad])])
            .unwrap();
        assert_eq!(out, "values (NULL, '\\xdead'::bytea)");
    }
}
