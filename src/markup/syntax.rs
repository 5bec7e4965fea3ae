// ABOUTME: Marker syntax shared by the rendering passes
// ABOUTME: Regex patterns for <%& %>, <%= %>, %{ } and <% %> plus partial path building

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::path::{Path, PathBuf};

/// Extension every partial file carries
pub const FILE_EXTENSION: &str = "html";

/// `<%& name %>`
pub static INCLUDE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<%&\s*(.+?)\s*%>").expect("include pattern is valid"));

/// `<%= expression %>`, may span lines
pub static EVALUATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<%=\s*(.+?)\s*%>").expect("evaluate pattern is valid"));

/// `%{name}` inside an expression
pub static EMBEDDED_VAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%\{(.+?)\}").expect("embedded variable pattern is valid"));

/// `<% name %>`
pub static VARIABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<%\s*(.+?)\s*%>").expect("variable pattern is valid"));

/// Characters that mark content as belonging to another marker kind
pub const RESERVED: &[char] = &['=', '&'];

/// `root/name.html`
pub fn partial_path(root: &Path, name: &str) -> PathBuf {
    root.join(format!("{}.{}", name, FILE_EXTENSION))
}

/// `replace_all` with a fallible replacement. Stops at the first error.
pub fn try_replace_all<E, F>(re: &Regex, text: &str, mut replace: F) -> Result<String, E>
where
    F: FnMut(&Captures<'_>) -> Result<String, E>,
{
    let mut output = String::with_capacity(text.len());
    let mut last = 0;

    for caps in re.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        output.push_str(&text[last..whole.start()]);
        output.push_str(&replace(&caps)?);
        last = whole.end();
    }

    output.push_str(&text[last..]);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterns_trim_whitespace() {
        let caps = INCLUDE.captures("<%&   head  %>").unwrap();
        assert_eq!(&caps[1], "head");

        let caps = VARIABLE.captures("<%title%>").unwrap();
        assert_eq!(&caps[1], "title");

        let caps = EVALUATE.captures("<%= 1 +\n 2 %>").unwrap();
        assert_eq!(&caps[1], "1 +\n 2");

        let caps = EMBEDDED_VAR.captures("%{items}.length").unwrap();
        assert_eq!(&caps[1], "items");
    }

    #[test]
    fn test_partial_path() {
        assert_eq!(
            partial_path(Path::new("site/_partials"), "head"),
            Path::new("site/_partials").join("head.html")
        );
    }

    #[test]
    fn test_try_replace_all() {
        let out: Result<String, ()> =
            try_replace_all(&VARIABLE, "a <% x %> b <%y%>", |caps| Ok(caps[1].to_uppercase()));
        assert_eq!(out.unwrap(), "a X b Y");

        let failed: Result<String, String> =
            try_replace_all(&VARIABLE, "<% x %>", |caps| Err(caps[1].to_string()));
        assert_eq!(failed.unwrap_err(), "x");
    }
}
