//! Mail session abstraction and the SMTP implementation
//!
//! The dispatcher talks to a [`Mailer`] trait so tests can substitute a
//! recording fake; production uses lettre over implicit TLS on the
//! submissions port, authenticating once per session with the configured
//! sender credential. Sessions are never shared across dispatch workers.

use std::fs;

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::EmailConfig;
use crate::dispatch::Outgoing;
use crate::{Error, Result};

/// One mail session capable of sending [`Outgoing`] messages.
pub trait Mailer {
    fn send(&mut self, outgoing: &Outgoing) -> Result<()>;
}

/// Production mailer over a lettre SMTP transport.
pub struct SmtpMailer {
    transport: SmtpTransport,
    sender: Mailbox,
    subject: String,
}

impl SmtpMailer {
    /// Open a session against the configured relay (implicit TLS, port 465).
    pub fn connect(config: &EmailConfig) -> Result<Self> {
        let sender: Mailbox = config
            .sender
            .parse()
            .map_err(|e| Error::Mail(format!("sender address `{}`: {e}", config.sender)))?;

        let transport = SmtpTransport::relay(&config.relay)
            .map_err(|e| Error::Mail(format!("relay `{}`: {e}", config.relay)))?
            .credentials(Credentials::new(
                config.sender.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            sender,
            subject: config.subject.clone(),
        })
    }

    fn build_message(&self, outgoing: &Outgoing) -> Result<Message> {
        let to: Mailbox = outgoing
            .recipient
            .parse()
            .map_err(|e| Error::Mail(format!("recipient `{}`: {e}", outgoing.recipient)))?;

        let mut parts = match &outgoing.body_html {
            Some(html) => MultiPart::mixed().multipart(MultiPart::alternative_plain_html(
                outgoing.body_text.clone(),
                html.clone(),
            )),
            None => MultiPart::mixed().singlepart(SinglePart::plain(outgoing.body_text.clone())),
        };
        for path in &outgoing.attachments {
            let bytes = fs::read(path)?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "attachment".to_string());
            parts = parts.singlepart(Attachment::new(file_name).body(bytes, content_type(path)));
        }

        Message::builder()
            .from(self.sender.clone())
            .to(to)
            .subject(self.subject.clone())
            .multipart(parts)
            .map_err(|e| Error::Mail(format!("message build failed: {e}")))
    }
}

impl Mailer for SmtpMailer {
    fn send(&mut self, outgoing: &Outgoing) -> Result<()> {
        let message = self.build_message(outgoing)?;
        self.transport
            .send(&message)
            .map_err(|e| Error::Mail(format!("send to {} failed: {e}", outgoing.recipient)))?;
        Ok(())
    }
}

fn content_type(path: &std::path::Path) -> ContentType {
    match path.extension().and_then(|e| e.to_str()) {
        Some("png") => ContentType::parse("image/png").unwrap_or(ContentType::TEXT_PLAIN),
        Some("pdf") => ContentType::parse("application/pdf").unwrap_or(ContentType::TEXT_PLAIN),
        _ => ContentType::parse("application/octet-stream").unwrap_or(ContentType::TEXT_PLAIN),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_by_extension() {
        let png = content_type(std::path::Path::new("certificate.png"));
        assert_eq!(png, ContentType::parse("image/png").unwrap());
        let other = content_type(std::path::Path::new("route.gpx"));
        assert_eq!(other, ContentType::parse("application/octet-stream").unwrap());
    }
}
