use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::Config;
use crate::error::Error;

/// An outgoing HTML mail. The sender is decided by the [`Mailer`].
#[derive(Clone, Debug, PartialEq)]
pub struct MailEnvelope {
    pub cc: Option<String>,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Delivers `envelope` to the support desk.
    async fn send(&self, envelope: MailEnvelope) -> Result<(), Error>;
}

/// Sends through an SMTP relay over implicit TLS.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Option<Mailbox>,
    to: Option<Mailbox>,
}

impl SmtpMailer {
    pub fn new(config: &Config) -> Result<SmtpMailer, Error> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|err| Error::InvalidConfiguration(err.to_string()))?
            .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_pass) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(SmtpMailer {
            transport: builder.build(),
            from: parse_mailbox(config.support_from.as_deref())?,
            to: parse_mailbox(config.support_to.as_deref())?,
        })
    }
}

fn parse_mailbox(address: Option<&str>) -> Result<Option<Mailbox>, Error> {
    address
        .map(|address| {
            address
                .parse::<Mailbox>()
                .map_err(|err| Error::InvalidConfiguration(format!("{}: {}", address, err)))
        })
        .transpose()
}

#[async_trait]
impl Mailer for SmtpMailer {
    #[tracing::instrument(skip(self, envelope), fields(subject = %envelope.subject))]
    async fn send(&self, envelope: MailEnvelope) -> Result<(), Error> {
        let (from, to) = match (&self.from, &self.to) {
            (Some(from), Some(to)) => (from.clone(), to.clone()),
            _ => {
                return Err(Error::FailedToSendMail(
                    "SUPPORT_FROM and SUPPORT_TO must be set".to_string(),
                ))
            }
        };

        let mut builder = Message::builder().from(from).to(to).subject(envelope.subject);
        if let Some(cc) = envelope.cc {
            let cc = cc
                .parse::<Mailbox>()
                .map_err(|err| Error::FailedToSendMail(err.to_string()))?;
            builder = builder.cc(cc);
        }

        let message = builder
            .header(ContentType::TEXT_HTML)
            .body(envelope.html)
            .map_err(|err| Error::FailedToSendMail(err.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|err| Error::FailedToSendMail(err.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mailbox_addresses_are_checked_up_front() {
        assert!(parse_mailbox(None).unwrap().is_none());
        assert!(parse_mailbox(Some("\"Support\" <support@example.com>"))
            .unwrap()
            .is_some());
        assert!(matches!(
            parse_mailbox(Some("not an address")),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[tokio::test]
    async fn unconfigured_desk_fails_to_send() {
        let mailer = SmtpMailer::new(&Config::default()).unwrap();

        let result = mailer
            .send(MailEnvelope {
                cc: None,
                subject: "Support Request [Ref ID: 1]".to_string(),
                html: "<p>hi</p>".to_string(),
            })
            .await;

        assert!(matches!(result, Err(Error::FailedToSendMail(_))));
    }
}
