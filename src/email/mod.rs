use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::approval::issuer::ApprovalLinks;

pub mod ses;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Failed to send email: {0}")]
    Send(String),
}

/// A fully built outbound message, HTML plus plain-text alternative.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Outbound mail seam. Production uses SES; tests record messages; local
/// development logs them.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, message: &EmailMessage) -> Result<(), MailError>;
}

/// Mailer used when email is disabled: logs the message instead of
/// delivering it, so the rest of the flow behaves identically.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, message: &EmailMessage) -> Result<(), MailError> {
        info!(
            "Email delivery disabled; would have sent to {}: {}\n{}",
            to, message.subject, message.text
        );
        Ok(())
    }
}

/// Build the approver notification for a new admin-role request. Both
/// action links go into one message; each remains valid until expiry and
/// whichever is applied first wins.
pub fn approval_request_email(
    subject_name: &str,
    subject_email: &str,
    links: &ApprovalLinks,
) -> EmailMessage {
    let subject = format!("Admin access request from {subject_name}");

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <style>
        body {{
            font-family: Helvetica, Arial, sans-serif;
            line-height: 1.6;
            color: #333333;
            margin: 0;
            padding: 0;
        }}
        .container {{
            max-width: 600px;
            margin: 0 auto;
            padding: 40px 24px;
        }}
        .title {{
            font-size: 20px;
            font-weight: 300;
            margin: 0 0 24px 0;
        }}
        .text {{
            font-size: 15px;
            margin: 0 0 24px 0;
        }}
        .button {{
            display: inline-block;
            padding: 14px 28px;
            margin-right: 12px;
            color: #ffffff;
            text-decoration: none;
            font-size: 15px;
        }}
        .approve {{ background: #2e7d32; }}
        .reject {{ background: #c62828; }}
        .footer {{
            margin-top: 40px;
            font-size: 13px;
            color: #666666;
        }}
    </style>
</head>
<body>
    <div class="container">
        <h1 class="title">Admin access request</h1>
        <p class="text">
            <strong>{subject_name}</strong> ({subject_email}) registered on Eventify
            and asked for the Admin role. Review the request:
        </p>
        <p>
            <a href="{approve_url}" class="button approve">Approve</a>
            <a href="{reject_url}" class="button reject">Reject</a>
        </p>
        <p class="footer">
            These links expire after a limited time. You can also review the
            request from the Eventify admin dashboard.
        </p>
    </div>
</body>
</html>"#,
        approve_url = links.approve_url,
        reject_url = links.reject_url,
    );

    let text = format!(
        "Admin access request\n\n\
         {subject_name} ({subject_email}) registered on Eventify and asked for the Admin role.\n\n\
         Approve: {approve_url}\n\
         Reject: {reject_url}\n\n\
         These links expire after a limited time. You can also review the request\n\
         from the Eventify admin dashboard.",
        approve_url = links.approve_url,
        reject_url = links.reject_url,
    );

    EmailMessage {
        subject,
        html,
        text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approval::issuer::build_links;
    use uuid::Uuid;

    #[test]
    fn approval_email_carries_both_links() {
        let links = build_links(
            "https://events.campus.edu",
            Uuid::new_v4(),
            b"secret",
            1_700_000_000_000,
        );
        let message = approval_request_email("Sam Doe", "sam@campus.edu", &links);

        assert!(message.html.contains(&links.approve_url));
        assert!(message.html.contains(&links.reject_url));
        assert!(message.text.contains(&links.approve_url));
        assert!(message.text.contains(&links.reject_url));
        assert!(message.subject.contains("Sam Doe"));
    }
}
