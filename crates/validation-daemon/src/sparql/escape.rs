//! Escaping of values interpolated into SPARQL statements

use chrono::{DateTime, SecondsFormat, Utc};

/// Quote a string literal
pub fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

/// Wrap an IRI in angle brackets
///
/// Characters an IRIREF cannot hold are percent-encoded as UTF-8 bytes.
pub fn escape_uri(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('<');
    for c in value.chars() {
        if c <= ' ' || "<>\"{}|^`\\".contains(c) {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{:02X}", byte));
            }
        } else {
            out.push(c);
        }
    }
    out.push('>');
    out
}

/// Typed `xsd:dateTime` literal
pub fn escape_datetime(value: &DateTime<Utc>) -> String {
    format!(
        "\"{}\"^^<http://www.w3.org/2001/XMLSchema#dateTime>",
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_escape_string() {
        assert_eq!(escape_string("plain"), "\"plain\"");
        assert_eq!(
            escape_string("say \"hi\"\nback\\slash"),
            "\"say \\\"hi\\\"\\nback\\\\slash\""
        );
    }

    #[test]
    fn test_escape_uri() {
        assert_eq!(escape_uri("http://a/b"), "<http://a/b>");
        assert_eq!(escape_uri("http://a/b>c"), "<http://a/b%3Ec>");
        assert_eq!(escape_uri("http://a/b c\\d"), "<http://a/b%20c%5Cd>");
        assert_eq!(escape_uri("http://a/é"), "<http://a/é>");
    }

    #[test]
    fn test_escape_datetime() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(
            escape_datetime(&at),
            "\"2024-03-01T12:30:00.000Z\"^^<http://www.w3.org/2001/XMLSchema#dateTime>"
        );
    }
}
