pub const MAX_POST_LEN: usize = 5000;
pub const MAX_COMMENT_LEN: usize = 1000;
pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 50;
pub const MIN_PASSWORD_LEN: usize = 6;

/// Strip HTML tags, escape what remains, trim the ends. Matches the cleanup
/// the original clients rely on: tag content disappears, the rest is inert.
pub fn sanitize_text(input: &str) -> String {
    let mut stripped = String::with_capacity(input.len());
    let mut in_tag = false;
    for ch in input.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            c if !in_tag => stripped.push(c),
            _ => {}
        }
    }

    let mut escaped = String::with_capacity(stripped.len());
    for ch in stripped.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            c => escaped.push(c),
        }
    }

    escaped.trim().to_string()
}

/// Sanitize an optional field; a value that is empty after cleanup becomes
/// absent rather than an empty string in the database.
pub fn sanitize_opt(input: Option<String>) -> Option<String> {
    input
        .map(|v| sanitize_text(&v))
        .filter(|v| !v.is_empty())
}

/// Good enough for the registration check; deliverability is not our problem.
pub fn is_valid_email(input: &str) -> bool {
    let input = input.trim();
    if input.contains(char::is_whitespace) {
        return false;
    }
    let mut parts = input.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

pub fn validate_username(username: &str) -> Result<(), &'static str> {
    let len = username.chars().count();
    if len < MIN_USERNAME_LEN {
        return Err("Username must be at least 3 characters long");
    }
    if len > MAX_USERNAME_LEN {
        return Err("Username cannot exceed 50 characters");
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err("Password must be at least 6 characters long");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_keeps_text() {
        assert_eq!(sanitize_text("hello <b>world</b>"), "hello world");
        assert_eq!(sanitize_text("<script>alert(1)</script>ok"), "alert(1)ok");
    }

    #[test]
    fn drops_unclosed_tag_tail() {
        assert_eq!(sanitize_text("safe <img src=x"), "safe");
    }

    #[test]
    fn escapes_special_characters() {
        assert_eq!(sanitize_text("a & b"), "a &amp; b");
        assert_eq!(sanitize_text("say \"hi\""), "say &quot;hi&quot;");
        assert_eq!(sanitize_text("it's"), "it&#039;s");
    }

    #[test]
    fn keeps_stray_closing_bracket() {
        assert_eq!(sanitize_text("3 > 2"), "3 &gt; 2");
    }

    #[test]
    fn trims_whitespace() {
        assert_eq!(sanitize_text("  padded  "), "padded");
    }

    #[test]
    fn optional_fields_collapse_to_none() {
        assert_eq!(sanitize_opt(None), None);
        assert_eq!(sanitize_opt(Some("  <b></b>  ".to_string())), None);
        assert_eq!(sanitize_opt(Some(" x ".to_string())), Some("x".to_string()));
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("ana@example.com"));
        assert!(is_valid_email("  ana@example.com  "));
        assert!(!is_valid_email("ana"));
        assert!(!is_valid_email("ana@"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ana@example"));
        assert!(!is_valid_email("ana@ example.com"));
        assert!(!is_valid_email("ana@example."));
    }

    #[test]
    fn username_bounds() {
        assert!(validate_username("ab").is_err());
        assert!(validate_username("abc").is_ok());
        assert!(validate_username(&"x".repeat(50)).is_ok());
        assert!(validate_username(&"x".repeat(51)).is_err());
    }

    #[test]
    fn password_minimum() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }
}
