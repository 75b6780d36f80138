//! Blob listing formats.

use depot_core::Key;

/// Output representation of a blob listing.
///
/// Input order is preserved verbatim; the formatter never sorts or
/// deduplicates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlobListFormat {
    /// Key strings joined by newline.
    Text,
    /// JSON array of key strings.
    Json,
    /// HTML page with one list item per key.
    Html,
}

impl BlobListFormat {
    /// The content type of the rendered listing.
    pub fn mime(&self) -> &'static str {
        match self {
            Self::Text => "text/plain",
            Self::Json => "application/json",
            Self::Html => "text/html",
        }
    }

    /// Render the keys in this format.
    pub fn apply(&self, keys: &[Key]) -> String {
        match self {
            Self::Text => keys
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n"),
            Self::Json => {
                let strings: Vec<String> = keys.iter().map(ToString::to_string).collect();
                serde_json::Value::from(strings).to_string()
            }
            Self::Html => {
                let items: String = keys
                    .iter()
                    .map(|k| format!("<li>{}</li>", escape_html(&k.to_string())))
                    .collect();
                format!(
                    "<!DOCTYPE html>\n<html><head><title>blobs</title></head><body><ul>{items}</ul></body></html>"
                )
            }
        }
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(paths: &[&str]) -> Vec<Key> {
        paths.iter().map(|p| Key::from_path(p).unwrap()).collect()
    }

    #[test]
    fn text_joins_with_newlines_in_order() {
        let ks = keys(&["b/a.txt", "a/z.txt"]);
        assert_eq!(BlobListFormat::Text.apply(&ks), "b/a.txt\na/z.txt");
    }

    #[test]
    fn text_empty_is_empty_string() {
        assert_eq!(BlobListFormat::Text.apply(&[]), "");
    }

    #[test]
    fn json_is_array_of_key_strings_in_order() {
        let ks = keys(&["b/a.txt", "a/z.txt"]);
        let rendered = BlobListFormat::Json.apply(&ks);
        let parsed: Vec<String> = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed, ["b/a.txt", "a/z.txt"]);
    }

    #[test]
    fn json_empty_is_empty_array() {
        assert_eq!(BlobListFormat::Json.apply(&[]), "[]");
    }

    #[test]
    fn html_lists_keys_and_escapes() {
        let ks = keys(&["a/<b>.txt"]);
        let rendered = BlobListFormat::Html.apply(&ks);
        assert!(rendered.contains("<li>a/&lt;b&gt;.txt</li>"));
        assert!(!rendered.contains("<li>a/<b>.txt</li>"));
    }

    #[test]
    fn html_empty_has_empty_list() {
        let rendered = BlobListFormat::Html.apply(&[]);
        assert!(rendered.contains("<ul></ul>"));
    }

    #[test]
    fn formatter_does_not_sort_or_dedup() {
        let ks = keys(&["z", "a", "z"]);
        assert_eq!(BlobListFormat::Text.apply(&ks), "z\na\nz");
        let parsed: Vec<String> =
            serde_json::from_str(&BlobListFormat::Json.apply(&ks)).unwrap();
        assert_eq!(parsed, ["z", "a", "z"]);
    }
}
