//! Display-name sanitizing for uploaded files.

/// Characters never allowed in a display name.
const FORBIDDEN: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*', '(', ')', '[', ']', '{', '}'];

const ELLIPSIS: char = '…';

/// Reduce an uploaded filename to a safe display name.
///
/// Control characters and `<>:"/\|?*()[]{}` are dropped, whitespace runs
/// become one `_`, repeated underscores collapse, and leading/trailing dots
/// and underscores go. Names longer than `max_chars` keep their extension and
/// get a `…` where the base name was cut. An empty result becomes `fallback`.
///
/// ```rust
/// use relay_blob::sanitize_filename;
///
/// assert_eq!(sanitize_filename("My Report (final).docx", 120, "document"), "My_Report_final.docx");
/// assert_eq!(sanitize_filename("???", 120, "document"), "document");
/// ```
pub fn sanitize_filename(raw: &str, max_chars: usize, fallback: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    let mut pending_gap = false;

    for c in raw.chars() {
        if c.is_control() || FORBIDDEN.contains(&c) {
            continue;
        }
        if c.is_whitespace() || c == '_' {
            pending_gap = true;
            continue;
        }
        if pending_gap {
            cleaned.push('_');
            pending_gap = false;
        }
        cleaned.push(c);
    }

    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        return fallback.to_string();
    }

    truncate_preserving_extension(trimmed, max_chars)
}

fn truncate_preserving_extension(name: &str, max_chars: usize) -> String {
    let total = name.chars().count();
    if total <= max_chars {
        return name.to_string();
    }

    let (base, ext) = match name.rfind('.') {
        Some(dot) if dot > 0 => (&name[..dot], &name[dot..]),
        _ => (name, ""),
    };

    let ext_chars = ext.chars().count();
    // Room for the base name once the extension and the ellipsis are in.
    let keep = max_chars.saturating_sub(ext_chars + 1);
    if keep == 0 {
        // The extension alone does not fit; cut the whole name instead.
        let mut out: String = name.chars().take(max_chars.saturating_sub(1)).collect();
        out.push(ELLIPSIS);
        return out;
    }

    let mut out: String = base.chars().take(keep).collect();
    out.push(ELLIPSIS);
    out.push_str(ext);
    out
}
