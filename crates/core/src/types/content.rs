//! Content-type classification for the anonymous viewer

use serde::{Deserialize, Serialize};

/// What kind of payload a content type describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Image,
    Pdf,
    Text,
    Other,
}

/// How a fetched payload is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Embedded frame pointing at the blob's local address
    EmbeddedFrame,
    /// The payload's text rendered literally
    LiteralText,
    /// "Preview not available" with an explicit download of the blob
    DownloadFallback,
}

impl ContentKind {
    /// Classify a `Content-Type` header value.
    ///
    /// Parameters (`; charset=...`) are ignored and matching is
    /// case-insensitive. A missing header classifies as `Other`.
    pub fn classify(content_type: &str) -> Self {
        let essence = essence(content_type);
        if essence.starts_with("image/") {
            ContentKind::Image
        } else if essence == "application/pdf" {
            ContentKind::Pdf
        } else if essence == "text/plain" {
            ContentKind::Text
        } else {
            ContentKind::Other
        }
    }

    pub fn is_displayable(self) -> bool {
        !matches!(self, ContentKind::Other)
    }

    pub fn render_mode(self) -> RenderMode {
        match self {
            ContentKind::Image | ContentKind::Pdf => RenderMode::EmbeddedFrame,
            ContentKind::Text => RenderMode::LiteralText,
            ContentKind::Other => RenderMode::DownloadFallback,
        }
    }
}

/// `type/subtype` without parameters, lowercased
pub fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Short uppercase label for a content type, e.g. `PNG` for `image/png`
pub fn file_type_label(content_type: &str) -> String {
    match essence(content_type).split_once('/') {
        Some((_, subtype)) if !subtype.is_empty() => subtype.to_ascii_uppercase(),
        _ => "Unknown".to_string(),
    }
}

/// Reduce a server-supplied filename to a bare name safe to create in the
/// current directory.
///
/// Directory parts (either separator) are dropped. Empty names, `.`, `..`
/// and names carrying control characters yield `None`.
pub fn safe_file_name(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    if base.is_empty() || base == "." || base == ".." || base.chars().any(char::is_control) {
        return None;
    }
    Some(base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_render_paths() {
        assert_eq!(
            ContentKind::classify("image/png").render_mode(),
            RenderMode::EmbeddedFrame
        );
        assert_eq!(
            ContentKind::classify("application/pdf").render_mode(),
            RenderMode::EmbeddedFrame
        );
        assert_eq!(
            ContentKind::classify("text/plain").render_mode(),
            RenderMode::LiteralText
        );
        assert_eq!(
            ContentKind::classify("application/zip").render_mode(),
            RenderMode::DownloadFallback
        );
    }

    #[test]
    fn test_parameters_and_case_ignored() {
        assert_eq!(ContentKind::classify("Text/Plain; charset=UTF-8"), ContentKind::Text);
        assert_eq!(ContentKind::classify(" IMAGE/JPEG "), ContentKind::Image);
        assert_eq!(ContentKind::classify(""), ContentKind::Other);
        assert_eq!(ContentKind::classify("text/html"), ContentKind::Other);
    }

    #[test]
    fn test_file_type_label() {
        assert_eq!(file_type_label("image/png"), "PNG");
        assert_eq!(file_type_label("application/pdf; q=1"), "PDF");
        assert_eq!(file_type_label("garbage"), "Unknown");
    }

    #[test]
    fn test_safe_file_name_strips_directories() {
        assert_eq!(safe_file_name("report.pdf").as_deref(), Some("report.pdf"));
        assert_eq!(safe_file_name("../../../home/u/.bashrc").as_deref(), Some(".bashrc"));
        assert_eq!(safe_file_name("/etc/passwd").as_deref(), Some("passwd"));
        assert_eq!(safe_file_name(r"..\..\boot.ini").as_deref(), Some("boot.ini"));
        assert_eq!(safe_file_name("notes/"), None);
        assert_eq!(safe_file_name(".."), None);
        assert_eq!(safe_file_name("."), None);
        assert_eq!(safe_file_name("   "), None);
        assert_eq!(safe_file_name("a\nb"), None);
    }

    proptest! {
        #[test]
        fn prop_safe_file_name_has_no_separators(name in ".{0,40}") {
            if let Some(safe) = safe_file_name(&name) {
                prop_assert!(!safe.contains('/') && !safe.contains('\\'));
                prop_assert!(safe != "." && safe != "..");
            }
        }

        #[test]
        fn prop_every_image_subtype_embeds(subtype in "[a-z0-9.+-]{1,16}") {
            let kind = ContentKind::classify(&format!("image/{subtype}"));
            prop_assert_eq!(kind.render_mode(), RenderMode::EmbeddedFrame);
        }

        #[test]
        fn prop_only_other_is_not_displayable(ct in "[a-z]{1,10}/[a-z0-9.+-]{1,16}") {
            let kind = ContentKind::classify(&ct);
            prop_assert_eq!(
                kind.is_displayable(),
                kind.render_mode() != RenderMode::DownloadFallback
            );
        }
    }
}
