//! Host documents for loading markup into the browser
//!
//! Both rasterizer backends work by navigating the browser to a throwaway
//! HTML file that embeds the certificate markup. The export variant also
//! carries an in-page script that rasterizes the markup node to a canvas
//! and triggers a synthetic download; the plain variant just displays the
//! markup for a native page capture.

use std::io::Write;
use std::path::Path;

use tempfile::TempPath;
use url::Url;

use crate::{Error, Result};

// Markup is caller-controlled SVG and is inserted as-is.
const EXPORT_DOCUMENT: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<script src="https://cdnjs.cloudflare.com/ajax/libs/html2canvas/1.4.1/html2canvas.min.js"></script>
</head>
<body>
<div id="cert" style="display: flex; width: min-content;">{{MARKUP}}</div>
<script>
window.addEventListener('load', async () => {
    const target = document.getElementById('cert');
    if (!target) return;
    try {
        const canvas = await html2canvas(target, { scale: {{SCALE}} });
        const a = document.createElement('a');
        a.href = canvas.toDataURL('image/png');
        a.download = '{{FILE_NAME}}';
        a.click();
    } catch (error) {
        console.error('certificate export failed:', error);
    }
});
</script>
</body>
</html>
"#;

const PLAIN_DOCUMENT: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="margin: 0;">
<div style="display: flex; width: min-content;">{{MARKUP}}</div>
</body>
</html>
"#;

/// Host document whose in-page script exports the markup node as a PNG
/// download named `file_name`.
pub fn export_document(markup: &str, file_name: &str, scale: u32) -> String {
    EXPORT_DOCUMENT
        .replace("{{MARKUP}}", markup)
        .replace("{{FILE_NAME}}", file_name)
        .replace("{{SCALE}}", &scale.to_string())
}

/// Host document that just displays the markup, for native page capture.
pub fn plain_document(markup: &str) -> String {
    PLAIN_DOCUMENT.replace("{{MARKUP}}", markup)
}

/// Write a host document to a temp file and return its scope-deleted path.
///
/// The returned [`TempPath`] removes the file when dropped, which is what
/// guarantees cleanup on every exit path of a rasterization call.
pub fn write_temp(contents: &str) -> Result<TempPath> {
    let mut file = tempfile::Builder::new()
        .prefix("certpress-")
        .suffix(".html")
        .tempfile()?;
    file.write_all(contents.as_bytes())?;
    Ok(file.into_temp_path())
}

/// `file://` URL for a host document on disk.
pub fn file_url(path: &Path) -> Result<Url> {
    Url::from_file_path(path)
        .map_err(|()| Error::Browser(format!("not an absolute path: {}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"/>"#;

    #[test]
    fn test_export_document_embeds_tokens() {
        let doc = export_document(SVG, "certificate.png", 5);
        assert!(doc.contains(SVG));
        assert!(doc.contains("a.download = 'certificate.png'"));
        assert!(doc.contains("{ scale: 5 }"));
        assert!(!doc.contains("{{MARKUP}}"));
    }

    #[test]
    fn test_plain_document_embeds_markup() {
        let doc = plain_document(SVG);
        assert!(doc.contains(SVG));
        assert!(!doc.contains("html2canvas"));
    }

    #[test]
    fn test_temp_file_lifecycle() {
        let tmp = write_temp("<html></html>").unwrap();
        let path = tmp.to_path_buf();
        assert!(path.exists());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<html></html>");

        let url = file_url(&path).unwrap();
        assert_eq!(url.scheme(), "file");

        drop(tmp);
        assert!(!path.exists());
    }
}
