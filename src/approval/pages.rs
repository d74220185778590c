use axum::http::StatusCode;
use axum::response::Html;

use crate::approval::action::ActionOutcome;

/// Render the human-facing page for an action-link outcome. The audience
/// is a person clicking a link in an email client, so every condition
/// terminates in plain HTML rather than a JSON error envelope.
pub fn outcome_page(outcome: ActionOutcome) -> (StatusCode, Html<String>) {
    let (status, heading, body) = match outcome {
        ActionOutcome::Approved => (
            StatusCode::OK,
            "Request approved",
            "The user has been granted the Admin role.",
        ),
        ActionOutcome::Rejected => (
            StatusCode::OK,
            "Request rejected",
            "The request was declined. The user keeps the Student role.",
        ),
        ActionOutcome::MissingParams => (
            StatusCode::BAD_REQUEST,
            "Missing parameters",
            "This link is incomplete. Use the links from the notification email \
             without modification.",
        ),
        ActionOutcome::LinkExpired => (
            StatusCode::GONE,
            "Link expired",
            "This link is no longer valid. The request can still be reviewed \
             from the Eventify admin dashboard.",
        ),
        ActionOutcome::InvalidSignature => (
            StatusCode::BAD_REQUEST,
            "Invalid link",
            "This link could not be validated.",
        ),
        ActionOutcome::UserNotFound => (
            StatusCode::NOT_FOUND,
            "User not found",
            "The account this link refers to no longer exists.",
        ),
        ActionOutcome::AlreadyAdmin => (
            StatusCode::OK,
            "Already an Admin",
            "This user already holds the Admin role. Nothing to do.",
        ),
        ActionOutcome::PrimeAdminImmune => (
            StatusCode::OK,
            "Cannot modify Prime Admin",
            "The Prime Admin account cannot be changed through this workflow.",
        ),
        ActionOutcome::NoPendingRequest => (
            StatusCode::OK,
            "No pending request",
            "This request has already been reviewed. Only pending requests can \
             be approved or rejected.",
        ),
    };
    (status, Html(render(heading, body)))
}

/// Page shown when the store itself failed mid-click. Still HTML: the
/// propagation policy for this flow never hands a person a JSON error.
pub fn service_error_page() -> (StatusCode, Html<String>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(render(
            "Something went wrong",
            "The request could not be processed right now. Please try the link \
             again, or review the request from the admin dashboard.",
        )),
    )
}

fn render(heading: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Eventify - {heading}</title>
    <style>
        body {{
            font-family: Helvetica, Arial, sans-serif;
            color: #333333;
            margin: 0;
            padding: 0;
        }}
        .container {{
            max-width: 560px;
            margin: 80px auto 0 auto;
            padding: 0 24px;
            text-align: center;
        }}
        h1 {{
            font-size: 22px;
            font-weight: 400;
            margin-bottom: 16px;
        }}
        p {{
            font-size: 15px;
            line-height: 1.6;
            color: #555555;
        }}
    </style>
</head>
<body>
    <div class="container">
        <h1>{heading}</h1>
        <p>{body}</p>
    </div>
</body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_the_error_taxonomy() {
        // Malformed and unverifiable links are client errors; reviewed or
        // immune subjects are expected outcomes, not errors.
        let cases = [
            (ActionOutcome::Approved, StatusCode::OK),
            (ActionOutcome::Rejected, StatusCode::OK),
            (ActionOutcome::MissingParams, StatusCode::BAD_REQUEST),
            (ActionOutcome::InvalidSignature, StatusCode::BAD_REQUEST),
            (ActionOutcome::LinkExpired, StatusCode::GONE),
            (ActionOutcome::UserNotFound, StatusCode::NOT_FOUND),
            (ActionOutcome::AlreadyAdmin, StatusCode::OK),
            (ActionOutcome::PrimeAdminImmune, StatusCode::OK),
            (ActionOutcome::NoPendingRequest, StatusCode::OK),
        ];
        for (outcome, expected) in cases {
            let (status, _) = outcome_page(outcome);
            assert_eq!(status, expected, "{outcome:?}");
        }
    }

    #[test]
    fn pages_are_complete_html_documents() {
        let (_, Html(page)) = outcome_page(ActionOutcome::LinkExpired);
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("Link expired"));
        assert!(page.contains("admin dashboard"));
    }
}
