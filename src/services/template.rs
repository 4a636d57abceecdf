//! `{{name}}` placeholder substitution for emails and generated documents.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").expect("valid regex"));

/// Template variables by name.
pub type TemplateVars = HashMap<String, String>;

/// Escape text for inclusion in HTML.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Replace known placeholders with their HTML-escaped value.
///
/// Variables whose name ends in `_html` hold markup built by the server and
/// are inserted as-is. Unknown placeholders are left untouched.
pub fn render(template: &str, vars: &TemplateVars) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            let name = &caps[1];
            match vars.get(name) {
                Some(value) if name.ends_with("_html") => value.clone(),
                Some(value) => escape_html(value),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Build a variable map from `(name, value)` pairs.
pub fn vars<I, K, V>(pairs: I) -> TemplateVars
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitutes_and_escapes() {
        let out = render(
            "Bonjour {{prenom}} {{ nom }}",
            &vars([("prenom", "Zoé"), ("nom", "<b>Martin</b>")]),
        );
        assert_eq!(out, "Bonjour Zoé &lt;b&gt;Martin&lt;/b&gt;");
    }

    #[test]
    fn test_unknown_placeholder_untouched() {
        let out = render("{{inconnu}} / {{prenom}}", &vars([("prenom", "Ana")]));
        assert_eq!(out, "{{inconnu}} / Ana");
    }

    #[test]
    fn test_html_variables_are_raw() {
        let out = render("{{bilan_html}}", &vars([("bilan_html", "<table></table>")]));
        assert_eq!(out, "<table></table>");
    }
}
