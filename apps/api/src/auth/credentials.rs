//! Input rules for account creation.

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MIN_FULL_NAME_LEN: usize = 2;

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Loose shape check: one `@`, a non-empty local part and a dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

/// Returns the first rule the password breaks, if any.
pub fn password_problem(password: &str) -> Option<&'static str> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Some("Password must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Some("Password must contain an uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Some("Password must contain a lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Some("Password must contain a number");
    }
    if password.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Some("Password must contain a special character");
    }
    None
}

pub fn is_valid_full_name(name: &str) -> bool {
    name.trim().chars().count() >= MIN_FULL_NAME_LEN
}

/// Splits a comma-separated skills field, dropping blanks.
pub fn split_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Trims and turns blank strings into `None`.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
