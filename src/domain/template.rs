//! Token substitution for request path and payload templates.
//!
//! A token is replaced only where it stands on its own: an occurrence glued
//! to further identifier characters (`CORE_SYMBOL` inside `CORE_SYMBOL_V2`)
//! is ambiguous, left untouched, and reported.

use std::collections::BTreeMap;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("variable `{0}` has no value for this chain")]
    MissingVariable(String),
    #[error("variable `{token}` only occurs as part of a longer identifier at byte {offset}")]
    AmbiguousMatch { token: String, offset: usize },
}

/// Result of a substitution pass. `text` always holds the best-effort output,
/// even when `errors` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub text: String,
    pub errors: Vec<TemplateError>,
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Whether `text[at..at + len]` lies inside an occurrence of a token that
/// was left in place for lack of a value.
fn within_unresolved(text: &str, at: usize, len: usize, unresolved: &[&String]) -> bool {
    unresolved.iter().any(|token| {
        text.match_indices(token.as_str())
            .any(|(start, _)| start <= at && at + len <= start + token.len())
    })
}

/// Replace every standalone occurrence of each declared token with its
/// resolved value.
///
/// A token without a value is reported once as missing. Shorter tokens that
/// only match inside it are left alone without a further report.
pub fn substitute(
    template: &str,
    tokens: &[String],
    values: &BTreeMap<String, String>,
) -> Substitution {
    let mut text = template.to_string();
    let mut errors = Vec::new();
    let mut unresolved: Vec<&String> = Vec::new();

    // Longest first, so a short token never eats the head of a longer one.
    let mut ordered: Vec<&String> = tokens.iter().filter(|t| !t.is_empty()).collect();
    ordered.sort_by_key(|t| std::cmp::Reverse(t.len()));

    for token in ordered {
        if !text.contains(token.as_str()) {
            continue;
        }
        let Some(value) = values.get(token.as_str()) else {
            errors.push(TemplateError::MissingVariable(token.clone()));
            unresolved.push(token);
            continue;
        };

        let mut out = String::with_capacity(text.len());
        let mut rest = text.as_str();
        let mut consumed = 0;
        while let Some(pos) = rest.find(token.as_str()) {
            let before = rest[..pos].chars().next_back().or_else(|| out.chars().next_back());
            let after = rest[pos + token.len()..].chars().next();
            let glued = before.is_some_and(is_ident_char) || after.is_some_and(is_ident_char);

            out.push_str(&rest[..pos]);
            if within_unresolved(&text, consumed + pos, token.len(), &unresolved) {
                out.push_str(token);
            } else if glued {
                errors.push(TemplateError::AmbiguousMatch {
                    token: token.clone(),
                    offset: consumed + pos,
                });
                out.push_str(token);
            } else {
                out.push_str(value);
            }
            consumed += pos + token.len();
            rest = &rest[pos + token.len()..];
        }
        out.push_str(rest);
        text = out;
    }

    Substitution { text, errors }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn tokens(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn replaces_every_standalone_occurrence() {
        let out = substitute(
            r#"{"code":"eosio.token","symbol":"CORE_SYMBOL","memo":"CORE_SYMBOL"}"#,
            &tokens(&["CORE_SYMBOL"]),
            &values(&[("CORE_SYMBOL", "EOS")]),
        );
        assert!(out.errors.is_empty());
        assert_eq!(out.text, r#"{"code":"eosio.token","symbol":"EOS","memo":"EOS"}"#);
    }

    #[test]
    fn missing_value_keeps_token() {
        let out = substitute(
            "/v1/history/get_transaction?id=HISTORY_TX_ID",
            &tokens(&["HISTORY_TX_ID"]),
            &BTreeMap::new(),
        );
        assert_eq!(out.text, "/v1/history/get_transaction?id=HISTORY_TX_ID");
        assert_eq!(
            out.errors,
            vec![TemplateError::MissingVariable("HISTORY_TX_ID".into())]
        );
    }

    #[test]
    fn rejects_partial_identifier_match() {
        let out = substitute(
            "CORE_SYMBOL_V2 and CORE_SYMBOL",
            &tokens(&["CORE_SYMBOL"]),
            &values(&[("CORE_SYMBOL", "WAX")]),
        );
        assert_eq!(out.text, "CORE_SYMBOL_V2 and WAX");
        assert_eq!(
            out.errors,
            vec![TemplateError::AmbiguousMatch {
                token: "CORE_SYMBOL".into(),
                offset: 0
            }]
        );
    }

    #[test]
    fn longer_token_wins() {
        let out = substitute(
            "ACCOUNT/ACCOUNT_KEY",
            &tokens(&["ACCOUNT", "ACCOUNT_KEY"]),
            &values(&[("ACCOUNT", "alice"), ("ACCOUNT_KEY", "EOS6...")]),
        );
        assert!(out.errors.is_empty());
        assert_eq!(out.text, "alice/EOS6...");
    }

    #[test]
    fn absent_tokens_are_not_errors() {
        let out = substitute("/v1/chain/get_info", &tokens(&["CORE_SYMBOL"]), &BTreeMap::new());
        assert!(out.errors.is_empty());
        assert_eq!(out.text, "/v1/chain/get_info");
    }

    #[test]
    fn missing_long_token_is_reported_once() {
        let out = substitute(
            "ACCOUNT ACCOUNT_KEY",
            &tokens(&["ACCOUNT", "ACCOUNT_KEY"]),
            &values(&[("ACCOUNT", "alice")]),
        );
        assert_eq!(out.text, "alice ACCOUNT_KEY");
        assert_eq!(
            out.errors,
            vec![TemplateError::MissingVariable("ACCOUNT_KEY".into())]
        );
    }
}
