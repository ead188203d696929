//! Gmail compose links for generated emails.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use reachly_engine::{extract_subject, find_subject_line};

const GMAIL_COMPOSE: &str = "https://mail.google.com/mail/?view=cm&fs=1";

/// Everything except RFC 3986 unreserved characters.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Subject used when composing a follow-up email.
pub const FOLLOW_UP_SUBJECT: &str = "Follow-up regarding our previous message";

/// Compose URL with every parameter value percent-encoded.
pub fn gmail_compose_url(to: &str, subject: &str, body: &str) -> String {
    format!(
        "{GMAIL_COMPOSE}&to={}&su={}&body={}",
        encode(to),
        encode(subject),
        encode(body)
    )
}

/// Compose URL for a generated email: the first subject header becomes the subject
/// and is dropped from the body.
pub fn compose_email(to: &str, email: &str) -> String {
    let subject = extract_subject(email);
    let body = strip_subject_line(email);
    gmail_compose_url(to, &subject, &body)
}

fn strip_subject_line(email: &str) -> String {
    let header = find_subject_line(email).map(|(index, _)| index);
    email
        .lines()
        .enumerate()
        .filter(|(index, _)| Some(*index) != header)
        .map(|(_, line)| line)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}
