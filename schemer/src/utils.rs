//! Common helpers: placeholder expansion, indentation and topic file names.

/// Columns per nesting level inside generated XSD syntax blocks.
pub const CONTENT_INDENT: usize = 4;

/// Columns per nesting level in console tree printouts.
pub const CONSOLE_INDENT: usize = 2;

/// Placeholder written wherever no hand-written text could be mined.
pub const PLACEHOLDER: &str = "TBD";

/// Returns `n` spaces.
pub fn indent(n: usize) -> String {
    " ".repeat(n)
}

/// File name of an element topic: `<prefix>-<element>[-<parent>]-element.md`, lower-cased.
pub fn topic_file_name(prefix: &str, element: &str, parent: Option<&str>) -> String {
    let mut name = format!("{prefix}-{}", element.to_lowercase());
    if let Some(parent) = parent {
        name.push('-');
        name.push_str(&parent.to_lowercase());
    }
    name.push_str("-element.md");
    name
}

/// File name of the all-elements landing page.
pub fn landing_file_name(prefix: &str) -> String {
    format!("{prefix}-elements.md")
}

/// Replaces `${env:VAR_NAME}` placeholders with the value of `VAR_NAME`.
///
/// Unset variables expand to an empty string. Anything that is not a
/// complete `${env:...}` placeholder is copied through unchanged.
///
/// # Example
///
/// ```rust
/// use schemer::utils::replace_env_placeholders;
///
/// unsafe { std::env::set_var("DOCS_ROOT", "/src/docs"); }
/// assert_eq!(replace_env_placeholders("${env:DOCS_ROOT}/topics"), "/src/docs/topics");
/// ```
pub fn replace_env_placeholders(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' || chars.peek() != Some(&'{') {
            result.push(ch);
            continue;
        }
        chars.next();

        let mut placeholder = String::new();
        let mut depth = 1;
        let mut closed = false;
        for ch in chars.by_ref() {
            match ch {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        closed = true;
                        break;
                    }
                }
                _ => {}
            }
            placeholder.push(ch);
        }

        match placeholder.strip_prefix("env:") {
            Some(var) if closed => {
                if let Ok(value) = std::env::var(var) {
                    debug!("expanding ${{env:{var}}}");
                    result.push_str(&value);
                }
            }
            _ => {
                result.push_str("${");
                result.push_str(&placeholder);
                if closed {
                    result.push('}');
                }
            }
        }
    }

    result
}
