//! Input validation helpers.

/// Longest accepted email address.
pub const MAX_EMAIL_LEN: usize = 255;

/// Longest accepted nickname, in characters.
pub const MAX_NICKNAME_LEN: usize = 50;

/// Validate email address format.
///
/// This performs basic validation:
/// - Must contain exactly one `@`
/// - Must have non-empty local and domain parts
/// - Domain must contain a dot with non-empty labels
/// - Length must be between 3 and 255 characters
///
/// # Examples
///
/// ```
/// use cinereview_auth::utils::is_valid_email;
///
/// assert!(is_valid_email("user@example.com"));
/// assert!(is_valid_email("user+tag@subdomain.example.com"));
/// assert!(!is_valid_email("invalid"));
/// assert!(!is_valid_email("@example.com"));
/// assert!(!is_valid_email("user@"));
/// ```
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 3 || email.len() > MAX_EMAIL_LEN {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }

    let valid_local_chars =
        |c: char| c.is_alphanumeric() || matches!(c, '.' | '-' | '+' | '_');
    let valid_domain_chars = |c: char| c.is_alphanumeric() || matches!(c, '.' | '-');

    if !local.chars().all(valid_local_chars) || !domain.chars().all(valid_domain_chars) {
        return false;
    }

    domain.contains('.') && domain.split('.').all(|label| !label.is_empty())
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
///
/// Returns `None` when the header uses another scheme or carries no token.
///
/// # Examples
///
/// ```
/// use cinereview_auth::utils::parse_bearer;
///
/// assert_eq!(parse_bearer("Bearer abc.def"), Some("abc.def"));
/// assert_eq!(parse_bearer("bearer abc.def"), Some("abc.def"));
/// assert_eq!(parse_bearer("Basic dXNlcg=="), None);
/// assert_eq!(parse_bearer("Bearer "), None);
/// ```
#[must_use]
pub fn parse_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
