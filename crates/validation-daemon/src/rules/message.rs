//! Rendering of validation error messages

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Named parameters bound by one result row
pub type Params = BTreeMap<String, String>;

/// Message producer invoked with a row's parameters
pub type MessageFn = Arc<dyn Fn(&Params) -> String + Send + Sync>;

/// How a rule turns a violation into an error message
#[derive(Clone)]
pub enum RuleMessage {
    /// The same text for every violation
    Static(String),

    /// Text computed from the violation's bound parameters
    Templated(MessageFn),
}

impl RuleMessage {
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&Params) -> String + Send + Sync + 'static,
    {
        RuleMessage::Templated(Arc::new(f))
    }

    /// Message with `{variable}` placeholders filled from the row
    ///
    /// Text without placeholders becomes a static message. Placeholders
    /// naming an unbound variable are kept verbatim.
    pub fn template(text: impl Into<String>) -> Self {
        let text = text.into();
        if placeholders(&text).next().is_none() {
            return RuleMessage::Static(text);
        }
        RuleMessage::from_fn(move |params| render_template(&text, params))
    }

    pub fn render(&self, params: &Params) -> String {
        match self {
            RuleMessage::Static(text) => text.clone(),
            RuleMessage::Templated(f) => f(params),
        }
    }

    /// Render without parameters, as for a boolean check
    pub fn render_plain(&self) -> String {
        self.render(&Params::new())
    }
}

impl fmt::Debug for RuleMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleMessage::Static(text) => f.debug_tuple("Static").field(text).finish(),
            RuleMessage::Templated(_) => f.write_str("Templated(..)"),
        }
    }
}

impl From<&str> for RuleMessage {
    fn from(text: &str) -> Self {
        RuleMessage::Static(text.to_string())
    }
}

/// Byte ranges `(start, end)` of `{name}` placeholders, braces included
fn placeholders(text: &str) -> impl Iterator<Item = (usize, usize)> + '_ {
    let mut cursor = 0;
    std::iter::from_fn(move || {
        while let Some(open) = text[cursor..].find('{').map(|i| cursor + i) {
            let Some(close) = text[open..].find('}').map(|i| open + i) else {
                cursor = text.len();
                return None;
            };
            cursor = close + 1;
            let name = &text[open + 1..close];
            if !name.is_empty()
                && name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            {
                return Some((open, close + 1));
            }
            cursor = open + 1;
        }
        None
    })
}

fn render_template(text: &str, params: &Params) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (start, end) in placeholders(text) {
        out.push_str(&text[last..start]);
        match params.get(&text[start + 1..end - 1]) {
            Some(value) => out.push_str(value),
            None => out.push_str(&text[start..end]),
        }
        last = end;
    }
    out.push_str(&text[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_static_message_ignores_params() {
        let message = RuleMessage::Static("Something is wrong".to_string());
        assert_eq!(message.render(&params(&[("s", "x")])), "Something is wrong");
        assert_eq!(message.render_plain(), "Something is wrong");
    }

    #[test]
    fn test_function_message() {
        let message = RuleMessage::from_fn(|p| {
            format!("Mandataris {} starts on {}", p["s"], p["start"])
        });
        let rendered = message.render(&params(&[
            ("s", "http://data.example.org/mandataris/123"),
            ("start", "01-12-2018"),
        ]));
        assert_eq!(
            rendered,
            "Mandataris http://data.example.org/mandataris/123 starts on 01-12-2018"
        );
    }

    #[test]
    fn test_template_substitutes_bound_variables() {
        let message = RuleMessage::template("Person {person} has no {missing_field}.");
        assert!(matches!(message, RuleMessage::Templated(_)));
        assert_eq!(
            message.render(&params(&[("person", "http://p/1")])),
            "Person http://p/1 has no {missing_field}."
        );
    }

    #[test]
    fn test_template_without_placeholders_is_static() {
        let message = RuleMessage::template("No placeholders { here }");
        assert!(matches!(message, RuleMessage::Static(_)));
    }

    #[test]
    fn test_template_handles_stray_braces() {
        let message = RuleMessage::template("{ {a} {b");
        assert_eq!(message.render(&params(&[("a", "1")])), "{ 1 {b");
    }
}
