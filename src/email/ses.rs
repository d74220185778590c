use async_trait::async_trait;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use aws_sdk_sesv2::Client as SesClient;

use crate::email::{EmailMessage, MailError, Mailer};

/// Send mail via AWS SESv2 using the ambient AWS credential chain.
pub struct SesMailer {
    client: SesClient,
    from_address: String,
}

impl SesMailer {
    pub async fn from_env(from_address: String) -> Self {
        let aws_config = aws_config::load_from_env().await;
        Self {
            client: SesClient::new(&aws_config),
            from_address,
        }
    }
}

#[async_trait]
impl Mailer for SesMailer {
    async fn send(&self, to: &str, message: &EmailMessage) -> Result<(), MailError> {
        let destination = Destination::builder().to_addresses(to).build();

        let subject = Content::builder()
            .data(&message.subject)
            .charset("UTF-8")
            .build()
            .map_err(|e| MailError::Send(format!("Failed to build subject: {e:?}")))?;

        let html_content = Content::builder()
            .data(&message.html)
            .charset("UTF-8")
            .build()
            .map_err(|e| MailError::Send(format!("Failed to build HTML content: {e:?}")))?;

        let text_content = Content::builder()
            .data(&message.text)
            .charset("UTF-8")
            .build()
            .map_err(|e| MailError::Send(format!("Failed to build text content: {e:?}")))?;

        let body = Body::builder().html(html_content).text(text_content).build();

        let ses_message = Message::builder().subject(subject).body(body).build();

        let content = EmailContent::builder().simple(ses_message).build();

        self.client
            .send_email()
            .from_email_address(&self.from_address)
            .destination(destination)
            .content(content)
            .send()
            .await
            .map_err(|e| MailError::Send(format!("{e:?}")))?;

        Ok(())
    }
}
