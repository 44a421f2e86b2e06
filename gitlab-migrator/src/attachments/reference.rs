//! Detection of GitLab upload references in markdown.
//!
//! Recognises `[label](/uploads/...)` and `![label](/uploads/...)`. The label
//! runs up to the first `]` and must not be empty; the path runs up to the
//! first `)`.

use std::ops::Range;

const UPLOADS_PREFIX: &str = "/uploads";

/// A single upload reference found in a markdown body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReference<'a> {
    /// Whether the reference is an image (`![...]`) rather than a link.
    pub image: bool,

    /// Text between the brackets.
    pub label: &'a str,

    /// Path between the parentheses, starting with `/uploads`.
    pub path: &'a str,

    /// Byte range of the whole reference in the scanned text.
    pub span: Range<usize>,
}

impl UploadReference<'_> {
    /// Renders the reference again with a different destination.
    #[must_use]
    pub fn render(&self, destination: &str) -> String {
        let bang = if self.image { "!" } else { "" };
        format!("{bang}[{}]({destination})", self.label)
    }
}

/// Finds every upload reference in `text`, left to right, without overlap.
#[must_use]
pub fn find_upload_references(text: &str) -> Vec<UploadReference<'_>> {
    let bytes = text.as_bytes();
    let mut found = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let parsed = match bytes[pos] {
            b'!' if bytes.get(pos + 1) == Some(&b'[') => parse_at(text, pos + 1, true),
            b'[' => parse_at(text, pos, false),
            _ => None,
        };

        match parsed {
            Some(reference) => {
                pos = reference.span.end;
                found.push(reference);
            }
            None => pos += 1,
        }
    }

    found
}

/// Parses a reference whose `[` sits at `open`.
fn parse_at(text: &str, open: usize, image: bool) -> Option<UploadReference<'_>> {
    let label_start = open + 1;
    let label_len = text[label_start..].find(']')?;
    if label_len == 0 {
        return None;
    }
    let label_end = label_start + label_len;

    let rest = &text[label_end + 1..];
    if !rest.starts_with('(') {
        return None;
    }

    let path_start = label_end + 2;
    let path_len = text[path_start..].find(')')?;
    let path = &text[path_start..path_start + path_len];
    if !path.starts_with(UPLOADS_PREFIX) || path.len() == UPLOADS_PREFIX.len() {
        return None;
    }

    let start = if image { open - 1 } else { open };
    Some(UploadReference {
        image,
        label: &text[label_start..label_end],
        path,
        span: start..path_start + path_len + 1,
    })
}

/// The pieces of an upload path needed to download it through the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPath {
    /// Project identifier the upload belongs to.
    pub project: String,

    /// Per-upload secret; doubles as the content hash of the file.
    pub secret: String,

    /// File name.
    pub file_name: String,
}

impl ApiPath {
    /// Splits an upload path into project, secret and file name.
    ///
    /// Paths of the form `/uploads/{secret}/{file}` carry no project and use
    /// `default_project`. Returns `None` when the secret or file name is
    /// missing.
    #[must_use]
    pub fn parse(path: &str, default_project: &str) -> Option<Self> {
        let parts: Vec<&str> = path.split('/').collect();
        let len = parts.len();
        if len < 4 {
            return None;
        }

        let file_name = parts[len - 1];
        let secret = parts[len - 2];
        if file_name.is_empty() || secret.is_empty() {
            return None;
        }

        let project = match parts[len - 4] {
            "" => default_project,
            project => project,
        };

        Some(Self {
            project: project.to_string(),
            secret: secret.to_string(),
            file_name: file_name.to_string(),
        })
    }

    /// Path relative to `/api/v4/projects/`.
    #[must_use]
    pub fn relative_url(&self) -> String {
        format!("{}/uploads/{}/{}", self.project, self.secret, self.file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_links_and_images() {
        let text = "See [log](/uploads/abc/log.txt) and ![shot](/uploads/def/a.png).";
        let refs = find_upload_references(text);

        assert_eq!(refs.len(), 2);
        assert!(!refs[0].image);
        assert_eq!(refs[0].label, "log");
        assert_eq!(refs[0].path, "/uploads/abc/log.txt");
        assert_eq!(&text[refs[0].span.clone()], "[log](/uploads/abc/log.txt)");
        assert!(refs[1].image);
        assert_eq!(&text[refs[1].span.clone()], "![shot](/uploads/def/a.png)");
    }

    #[test]
    fn ignores_non_upload_links() {
        let text = "[docs](https://example.com) [x](/wiki/page) [](/uploads/a/b) [y](/uploads)";
        assert!(find_upload_references(text).is_empty());
    }

    #[test]
    fn bang_without_bracket_is_plain_text() {
        let refs = find_upload_references("Wow! [a](/uploads/s/f.txt)");
        assert_eq!(refs.len(), 1);
        assert!(!refs[0].image);
    }

    #[test]
    fn unterminated_reference_is_ignored() {
        assert!(find_upload_references("[a](/uploads/s/f.txt").is_empty());
    }

    #[test]
    fn handles_multibyte_text_around_references() {
        let text = "Größe → [bild](/uploads/s/ä.png) ✓";
        let refs = find_upload_references(text);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].path, "/uploads/s/ä.png");
    }

    #[test]
    fn render_keeps_prefix_and_label() {
        let text = "![shot](/uploads/def/a.png)";
        let reference = &find_upload_references(text)[0];
        assert_eq!(
            reference.render("https://host/a.png"),
            "![shot](https://host/a.png)"
        );
    }

    #[test]
    fn api_path_defaults_project() {
        let path = ApiPath::parse("/uploads/abc123/file.png", "42").unwrap();
        assert_eq!(path.project, "42");
        assert_eq!(path.secret, "abc123");
        assert_eq!(path.file_name, "file.png");
        assert_eq!(path.relative_url(), "42/uploads/abc123/file.png");
    }

    #[test]
    fn api_path_uses_explicit_project() {
        let path = ApiPath::parse("/-/project/7/uploads/abc/file.png", "42").unwrap();
        assert_eq!(path.project, "7");
    }

    #[test]
    fn api_path_requires_secret_and_file() {
        assert_eq!(ApiPath::parse("/uploads/file.png", "42"), None);
        assert_eq!(ApiPath::parse("/uploads/abc/", "42"), None);
    }
}
