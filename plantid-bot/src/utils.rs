/// Raster formats the identification service accepts.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp", "tif", "tiff"];

/// Path segment the platform's own image host serves uploads under.
pub const HOSTED_IMAGE_MARKER: &str = "pictrs";

/// URL utilities
pub mod url {
    use super::{HOSTED_IMAGE_MARKER, IMAGE_EXTENSIONS};
    use url::Url;

    /// Lower-cased extension of the last path segment, ignoring query and fragment.
    pub fn file_extension(url_str: &str) -> Option<String> {
        let url = Url::parse(url_str).ok()?;
        let last_segment = url.path_segments()?.next_back()?;
        let (stem, extension) = last_segment.rsplit_once('.')?;
        if stem.is_empty() || extension.is_empty() {
            return None;
        }
        Some(extension.to_ascii_lowercase())
    }

    pub fn is_supported_image(url_str: &str) -> bool {
        file_extension(url_str)
            .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false)
    }

    pub fn is_hosted_image(url_str: &str) -> bool {
        url_str.contains(HOSTED_IMAGE_MARKER)
    }
}

/// Text formatting utilities
pub mod text {
    /// `0.8532` becomes `"85.32 %"`.
    pub fn format_percentage(score: f64) -> String {
        format!("{:.2} %", score * 100.0)
    }

    /// Escapes characters that would break a markdown table cell.
    pub fn escape_table_cell(value: &str) -> String {
        value.replace('|', "\\|").replace(['\n', '\r'], " ")
    }
}
