//! Outbound email for verification and password-reset links.
//!
//! Delivery is fire-and-forget: a failed send is logged and never surfaced
//! to the HTTP caller, so the request-reset path cannot leak whether an
//! account exists. Without SMTP configuration (the development default) the
//! link is logged instead of sent.

use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::Config;

/// Which template the message uses. Template content is deliberately plain.
#[derive(Debug, Clone, Copy)]
pub enum MailKind {
    VerifyEmail,
    PasswordReset,
}

/// SMTP-backed email sender.
pub struct Mailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Option<Mailbox>,
    frontend_url: String,
}

impl Mailer {
    /// Build a mailer from config. Missing SMTP settings produce a
    /// log-only mailer rather than an error.
    pub fn from_config(config: &Config) -> Self {
        let transport = config.smtp_host.as_deref().and_then(|host| {
            let builder = match AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host) {
                Ok(b) => b.port(config.smtp_port),
                Err(e) => {
                    tracing::warn!(host, error = %e, "invalid SMTP relay; email disabled");
                    return None;
                }
            };

            let builder = match (&config.smtp_user, &config.smtp_pass) {
                (Some(user), Some(pass)) => {
                    builder.credentials(Credentials::new(user.clone(), pass.clone()))
                }
                _ => builder,
            };

            Some(builder.build())
        });

        let from = config.smtp_from.as_deref().and_then(|addr| {
            addr.parse::<Mailbox>()
                .map_err(|e| tracing::warn!(addr, error = %e, "invalid SMTP_FROM; email disabled"))
                .ok()
        });

        Mailer {
            transport,
            from,
            frontend_url: config.frontend_url.clone(),
        }
    }

    /// Send `kind` to `address`, embedding the front-end link for `token`.
    pub async fn send(&self, address: &str, kind: MailKind, token: &str) {
        let (subject, link) = match kind {
            MailKind::VerifyEmail => (
                "Verify Your Email Address",
                format!("{}/verify-email?token={}", self.frontend_url, token),
            ),
            MailKind::PasswordReset => (
                "Reset Your Password",
                format!("{}/reset-password?token={}", self.frontend_url, token),
            ),
        };

        let (Some(transport), Some(from)) = (&self.transport, &self.from) else {
            tracing::info!(to = address, link, "email delivery not configured; link logged");
            return;
        };

        let to: Mailbox = match address.parse() {
            Ok(mailbox) => mailbox,
            Err(e) => {
                tracing::warn!(to = address, error = %e, "unroutable recipient address");
                return;
            }
        };

        let body = match kind {
            MailKind::VerifyEmail => format!(
                "Thank you for signing up! Please verify your email address:\n\n{}\n\n\
                 This link expires in 24 hours. If you didn't create an account, ignore this email.",
                link
            ),
            MailKind::PasswordReset => format!(
                "You requested a password reset:\n\n{}\n\n\
                 This link expires in 1 hour. If you didn't request a reset, ignore this email.",
                link
            ),
        };

        let message = match Message::builder()
            .from(from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
        {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(to = address, error = %e, "failed to build email");
                return;
            }
        };

        match transport.send(message).await {
            Ok(_) => tracing::debug!(to = address, ?kind, "email sent"),
            Err(e) => tracing::warn!(to = address, ?kind, error = %e, "failed to send email"),
        }
    }
}
