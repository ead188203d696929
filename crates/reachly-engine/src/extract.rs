//! Deterministic field extraction from raw profile text and generated emails.
//!
//! Every helper is pure and reports "no match" explicitly; a miss never blocks ingestion.

use std::sync::LazyLock;

use regex::Regex;

/// Subject used when a generated email carries no `Subject:` line.
pub const DEFAULT_SUBJECT: &str = "Regarding our connection";

// Title line of a LinkedIn page: "Jalaja Utekar | LinkedIn".
static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^([A-Za-z][A-Za-z \t.'\-]+?)[ \t]+\|[ \t]+LinkedIn").unwrap());

// Headline: "Software Testing Intern @ Eqanim Tech Pvt Ltd". The company stays on one line.
static ROLE_COMPANY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z][^@\n]+?)\s+@\s+([A-Za-z0-9.\-&', \t]+)").unwrap());

// "Subject: X", "  Subject: X", "**Subject:** X", "## Subject: X".
static SUBJECT_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[\s*#_>]*subject[*_]*:[\s*_]*(.*?)[\s*_]*$").unwrap());

/// Person name from a `"<Name> | LinkedIn"` line, if present.
pub fn extract_name(raw_profile: &str) -> Option<String> {
    let caps = NAME_RE.captures(raw_profile)?;
    non_empty(caps.get(1)?.as_str())
}

/// Role and company from the first `"<Role> @ <Company>"` headline.
///
/// Both halves come from the same match, so either both are set or neither is.
pub fn extract_role_company(raw_profile: &str) -> (Option<String>, Option<String>) {
    let Some(caps) = ROLE_COMPANY_RE.captures(raw_profile) else {
        return (None, None);
    };
    let role = caps.get(1).and_then(|m| non_empty(m.as_str()));
    let company = caps.get(2).and_then(|m| non_empty(m.as_str()));
    match (role, company) {
        (Some(role), Some(company)) => (Some(role), Some(company)),
        _ => (None, None),
    }
}

/// Line index and trimmed text of the first subject header in an email.
///
/// Indentation and markdown emphasis around the keyword are tolerated, so
/// `**Subject:** Hello` yields `Hello`. The text may be empty.
pub fn find_subject_line(email: &str) -> Option<(usize, &str)> {
    email.lines().enumerate().find_map(|(index, line)| {
        let caps = SUBJECT_LINE_RE.captures(line)?;
        Some((index, caps.get(1).map_or("", |m| m.as_str().trim())))
    })
}

/// Text of the first subject header of an email, or [`DEFAULT_SUBJECT`].
pub fn extract_subject(email: &str) -> String {
    find_subject_line(email)
        .and_then(|(_, text)| non_empty(text))
        .unwrap_or_else(|| DEFAULT_SUBJECT.to_string())
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE: &str = "Jalaja Utekar | LinkedIn\n\
        Software Testing Intern @ Eqanim Tech Pvt Ltd\n\
        Pune, Maharashtra, India";

    #[test]
    fn name_from_title_line() {
        assert_eq!(extract_name(PROFILE).as_deref(), Some("Jalaja Utekar"));
    }

    #[test]
    fn name_on_later_line() {
        let raw = "Some header\nMary-Jane O'Neil | LinkedIn\nrest";
        assert_eq!(extract_name(raw).as_deref(), Some("Mary-Jane O'Neil"));
    }

    #[test]
    fn name_absent() {
        assert_eq!(extract_name("Backend engineer, loves Rust"), None);
        assert_eq!(extract_name(""), None);
    }

    #[test]
    fn role_and_company_from_headline() {
        let (role, company) = extract_role_company(PROFILE);
        assert_eq!(role.as_deref(), Some("Software Testing Intern"));
        assert_eq!(company.as_deref(), Some("Eqanim Tech Pvt Ltd"));
    }

    #[test]
    fn company_does_not_run_into_next_line() {
        let (_, company) = extract_role_company("Founder @ Acme & Co.\nBerlin");
        assert_eq!(company.as_deref(), Some("Acme & Co."));
    }

    #[test]
    fn role_company_absent() {
        assert_eq!(extract_role_company("no headline here"), (None, None));
        assert_eq!(extract_role_company("mail me: jo@acme.io"), (None, None));
    }

    #[test]
    fn subject_from_email() {
        let email = "Subject: Quick question about QA tooling\n\nDear Jalaja,";
        assert_eq!(extract_subject(email), "Quick question about QA tooling");
    }

    #[test]
    fn subject_fallback() {
        assert_eq!(extract_subject("Dear Jalaja,\n\nHello."), DEFAULT_SUBJECT);
        assert_eq!(extract_subject("Subject:   \n\nDear Jalaja"), DEFAULT_SUBJECT);
    }

    #[test]
    fn subject_behind_markdown_or_indent() {
        assert_eq!(extract_subject("**Subject:** Scaling queues at Acme\n\nDear Jo,"), "Scaling queues at Acme");
        assert_eq!(extract_subject("**Subject**: Scaling queues\n\nDear Jo,"), "Scaling queues");
        assert_eq!(extract_subject("## Subject: Hello__\nDear Jo,"), "Hello");
        assert_eq!(extract_subject("Dear Jo,\n  Subject: Later line"), "Later line");
    }

    #[test]
    fn subject_line_position() {
        assert_eq!(find_subject_line("Hi\n**Subject:** A\nSubject: B"), Some((1, "A")));
        assert_eq!(find_subject_line("Subject to approval, we can meet."), None);
        assert_eq!(find_subject_line("no header"), None);
    }
}
