//! Front-matter stripping for `.mdx` bodies.
//!
//! Metadata lives in the sibling `.json` record, so a body's own front
//! matter is dropped before rendering. Recognized fences:
//! - YAML: top-of-file `---` … closing `---`
//! - TOML: top-of-file `+++` … closing `+++`
//!
//! An unterminated fence is not front matter; the text is returned as-is.

/// Result of splitting a body file.
#[derive(Debug, PartialEq, Eq)]
pub struct Stripped<'a> {
    /// Raw text between the fences, if a fenced block was found.
    pub front_matter: Option<&'a str>,
    pub body: &'a str,
}

pub fn strip_front_matter(text: &str) -> Stripped<'_> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    for fence in ["---", "+++"] {
        let Some(rest) = strip_fence_line(text, fence) else {
            continue;
        };
        if let Some((fm, body)) = take_until_fence(rest, fence) {
            return Stripped {
                front_matter: Some(fm),
                body: body.trim_start_matches(['\r', '\n']),
            };
        }
        break;
    }

    Stripped {
        front_matter: None,
        body: text,
    }
}

/// `text` minus an opening fence line (`\n` or `\r\n` terminated).
fn strip_fence_line<'a>(text: &'a str, fence: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(fence)?;
    rest.strip_prefix('\n')
        .or_else(|| rest.strip_prefix("\r\n"))
}

/// Scan `rest` for a line that is exactly the fence, returning (front_matter, body).
fn take_until_fence<'a>(rest: &'a str, fence: &str) -> Option<(&'a str, &'a str)> {
    let mut idx = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\n', '\r']) == fence {
            return Some((&rest[..idx], &rest[idx + line.len()..]));
        }
        idx += line.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_block_is_removed() {
        let s = strip_front_matter("---\ntitle: Hello\n---\n\n# Body\nText\n");
        assert_eq!(s.front_matter, Some("title: Hello\n"));
        assert_eq!(s.body, "# Body\nText\n");
    }

    #[test]
    fn toml_block_and_crlf_are_handled() {
        let s = strip_front_matter("+++\r\ntitle = \"x\"\r\n+++\r\nBody\r\n");
        assert_eq!(s.front_matter, Some("title = \"x\"\r\n"));
        assert_eq!(s.body, "Body\r\n");
    }

    #[test]
    fn fence_inside_body_is_preserved() {
        let s = strip_front_matter("---\na: 1\n---\nLine 1\n---\nafter rule\n");
        assert_eq!(s.body, "Line 1\n---\nafter rule\n");
    }

    #[test]
    fn bom_is_dropped() {
        let s = strip_front_matter("\u{feff}---\n---\nbody");
        assert_eq!(s.front_matter, Some(""));
        assert_eq!(s.body, "body");
    }

    #[test]
    fn unterminated_fence_is_plain_body() {
        let text = "---\ntitle: never closed\nbody\n";
        let s = strip_front_matter(text);
        assert_eq!(s.front_matter, None);
        assert_eq!(s.body, text);
    }

    #[test]
    fn no_front_matter_passes_through() {
        let s = strip_front_matter("# Just markdown\n<Callout />\n");
        assert_eq!(s.front_matter, None);
        assert_eq!(s.body, "# Just markdown\n<Callout />\n");
    }
}
