//! Batch orchestration of the render phase
//!
//! Walks the roster strictly sequentially (the shared-browser backend owns
//! a single tab that is not safe for concurrent calls) and fills one output
//! folder per recipient. Any per-recipient failure aborts the whole batch.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::info;

use crate::roster::Recipient;
use crate::{template, Rasterizer, Result};

/// Certificate image file name inside each recipient folder
pub const CERT_IMAGE_FILE: &str = "certificate.png";
/// Plain-text email body file name
pub const BODY_TEXT_FILE: &str = "email.txt";
/// HTML email body file name
pub const BODY_HTML_FILE: &str = "email.html";

/// The three text templates consumed by a batch run.
#[derive(Debug, Clone)]
pub struct Templates {
    pub certificate: String,
    pub body_text: String,
    pub body_html: String,
}

impl Templates {
    /// Load `certificate.svg`, `email.txt`, and `email.html` from a
    /// templates directory.
    pub fn load(dir: &Path) -> Result<Self> {
        Ok(Self {
            certificate: fs::read_to_string(dir.join("certificate.svg"))?,
            body_text: fs::read_to_string(dir.join("email.txt"))?,
            body_html: fs::read_to_string(dir.join("email.html"))?,
        })
    }
}

/// Merge one recipient's fields over the shared configuration context.
///
/// Recipient keys override configuration keys, and the display name is
/// upper-cased for the certificate regardless of roster casing.
pub fn render_context(
    recipient: &Recipient,
    shared: &HashMap<String, String>,
) -> Result<HashMap<String, String>> {
    let mut ctx = shared.clone();
    for (key, value) in recipient.fields() {
        ctx.insert(key.clone(), value.clone());
    }
    let name = recipient.name()?.to_uppercase();
    ctx.insert("name".to_string(), name);
    Ok(ctx)
}

/// Render every recipient's certificate and email bodies under `out_root`.
///
/// Per recipient: build the context, render all three templates, create the
/// folder (idempotent, with parents), persist both bodies, then rasterize
/// the certificate markup into the folder. Errors propagate immediately.
pub fn generate(
    roster: &[Recipient],
    shared: &HashMap<String, String>,
    templates: &Templates,
    out_root: &Path,
    rasterizer: &mut dyn Rasterizer,
) -> Result<()> {
    for recipient in roster {
        let email = recipient.email()?.to_string();
        let ctx = render_context(recipient, shared)?;

        let certificate = template::render(&templates.certificate, &ctx)?;
        let body_text = template::render(&templates.body_text, &ctx)?;
        let body_html = template::render(&templates.body_html, &ctx)?;

        let dir = out_root.join(&email);
        fs::create_dir_all(&dir)?;
        fs::write(dir.join(BODY_TEXT_FILE), body_text)?;
        fs::write(dir.join(BODY_HTML_FILE), body_html)?;

        rasterizer.rasterize(&certificate, &dir, CERT_IMAGE_FILE)?;
        info!("generated certificate for {email}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipient(pairs: &[(&str, &str)]) -> Recipient {
        Recipient::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn shared() -> HashMap<String, String> {
        [("marathon", "Lakeside Marathon"), ("year", "2024")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_name_is_upper_cased() {
        let rec = recipient(&[("name", "jane doe"), ("email", "jane@example.com")]);
        let ctx = render_context(&rec, &shared()).unwrap();
        assert_eq!(ctx["name"], "JANE DOE");
    }

    #[test]
    fn test_already_upper_name_unchanged() {
        let rec = recipient(&[("name", "JANE DOE"), ("email", "jane@example.com")]);
        let ctx = render_context(&rec, &shared()).unwrap();
        assert_eq!(ctx["name"], "JANE DOE");
    }

    #[test]
    fn test_recipient_overrides_shared() {
        let rec = recipient(&[
            ("name", "jane"),
            ("email", "jane@example.com"),
            ("year", "1999"),
        ]);
        let ctx = render_context(&rec, &shared()).unwrap();
        assert_eq!(ctx["year"], "1999");
        assert_eq!(ctx["marathon"], "Lakeside Marathon");
    }

    #[test]
    fn test_missing_name_fails() {
        let rec = recipient(&[("email", "jane@example.com")]);
        let err = render_context(&rec, &shared()).unwrap_err();
        assert!(matches!(err, crate::Error::MissingKey(ref k) if k == "name"));
    }
}
