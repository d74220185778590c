use chrono::{Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::approval::action::ApprovalAction;
use crate::approval::signature::{sign, signing_message};
use crate::config::ApprovalConfig;
use crate::database::models::User;
use crate::email::{approval_request_email, Mailer};

/// The approve/reject URL pair issued for one admin-role request. Both
/// share the same expiry; each verifies independently until then, and
/// whichever is applied first makes the other a state-machine no-op.
#[derive(Debug, Clone)]
pub struct ApprovalLinks {
    pub approve_url: String,
    pub reject_url: String,
    pub expires_at_ms: i64,
}

/// Build both signed action URLs for a subject. Nothing is persisted:
/// the signature is re-derivable from the URL fields and the server
/// secret, so no token store or revocation list exists.
pub fn build_links(
    base_url: &str,
    subject: Uuid,
    secret: &[u8],
    expires_at_ms: i64,
) -> ApprovalLinks {
    let base = base_url.trim_end_matches('/');
    ApprovalLinks {
        approve_url: action_url(base, subject, ApprovalAction::Approve, secret, expires_at_ms),
        reject_url: action_url(base, subject, ApprovalAction::Reject, secret, expires_at_ms),
        expires_at_ms,
    }
}

fn action_url(
    base: &str,
    subject: Uuid,
    action: ApprovalAction,
    secret: &[u8],
    expires_at_ms: i64,
) -> String {
    let sig = sign(&signing_message(&subject, action, expires_at_ms), secret);
    format!(
        "{base}/api/admin/email/{action}/{subject}?exp={expires_at_ms}&sig={sig}",
        action = action.as_str(),
    )
}

/// Issue the link pair for a freshly registered admin-role request and
/// notify the approver. Delivery is best-effort: a failed send is logged
/// and swallowed, never rolling back registration; the pending request
/// stays reviewable from the authenticated dashboard.
pub async fn issue(
    subject: &User,
    base_url: &str,
    config: &ApprovalConfig,
    mailer: &dyn Mailer,
) -> ApprovalLinks {
    let expires_at_ms = (Utc::now() + Duration::hours(config.link_lifetime_hours as i64))
        .timestamp_millis();
    let links = build_links(
        base_url,
        subject.id,
        config.signing_secret.as_bytes(),
        expires_at_ms,
    );

    let message = approval_request_email(&subject.name, &subject.email, &links);
    match mailer.send(&config.approver_email, &message).await {
        Ok(()) => info!(
            subject = %subject.id,
            approver = %config.approver_email,
            "Sent admin approval request email"
        ),
        Err(e) => warn!(
            subject = %subject.id,
            error = %e,
            "Could not deliver approval request email; the pending request \
             remains reviewable from the admin dashboard"
        ),
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approval::signature::verify;

    const SECRET: &[u8] = b"issuer-test-secret";

    #[test]
    fn both_links_share_one_expiry() {
        let links = build_links("https://events.campus.edu", Uuid::new_v4(), SECRET, 42);
        assert!(links.approve_url.contains("exp=42"));
        assert!(links.reject_url.contains("exp=42"));
        assert_eq!(links.expires_at_ms, 42);
    }

    #[test]
    fn links_carry_verifiable_action_bound_signatures() {
        let subject = Uuid::new_v4();
        let exp = 1_700_000_000_000;
        let links = build_links("https://events.campus.edu", subject, SECRET, exp);

        let approve_sig = links.approve_url.split("sig=").nth(1).unwrap();
        let reject_sig = links.reject_url.split("sig=").nth(1).unwrap();

        let approve_msg = signing_message(&subject, ApprovalAction::Approve, exp);
        let reject_msg = signing_message(&subject, ApprovalAction::Reject, exp);

        assert!(verify(&approve_msg, SECRET, approve_sig));
        assert!(verify(&reject_msg, SECRET, reject_sig));
        // The signatures are not interchangeable between endpoints.
        assert!(!verify(&approve_msg, SECRET, reject_sig));
        assert!(!verify(&reject_msg, SECRET, approve_sig));
    }

    #[test]
    fn link_paths_follow_the_email_action_routes() {
        let subject = Uuid::new_v4();
        let links = build_links("https://events.campus.edu/", subject, SECRET, 1);
        assert!(links
            .approve_url
            .starts_with(&format!("https://events.campus.edu/api/admin/email/approve/{subject}?")));
        assert!(links
            .reject_url
            .starts_with(&format!("https://events.campus.edu/api/admin/email/reject/{subject}?")));
    }
}
