//! Positional template formatting
//!
//! Catalog templates use printf-style placeholders consumed in order:
//! the field label first, then the check's own parameters.
//!
//! - `%s`, `%d`, `%u`, `%f` take the next argument
//! - `%2$s` takes the second argument without moving the cursor
//! - `%%` is a literal percent sign
//!
//! Anything else after a `%` is copied through unchanged. Placeholders
//! without a matching argument render as an empty string.

/// Render `template` with `args`.
///
/// ```
/// use formcheck_i18n::format_template;
///
/// let msg = format_template("%s must be at most %s characters", &["Name", "5"]);
/// assert_eq!(msg, "Name must be at most 5 characters");
///
/// let msg = format_template("%2$s antes que %1$s", &["Fin", "Inicio"]);
/// assert_eq!(msg, "Inicio antes que Fin");
/// ```
pub fn format_template<S: AsRef<str>>(template: &str, args: &[S]) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut next = 0usize;
    let mut chars = template.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        match chars.peek().map(|&(_, c)| c) {
            Some('%') => {
                chars.next();
                out.push('%');
            }
            Some(conv) if is_conversion(conv) => {
                chars.next();
                out.push_str(arg(args, next));
                next += 1;
            }
            Some(d) if d.is_ascii_digit() => {
                // Lookahead for `<digits>$<conv>` without consuming on mismatch.
                let mut probe = chars.clone();
                let mut position = 0usize;
                while let Some(&(_, d)) = probe.peek() {
                    match d.to_digit(10) {
                        Some(v) => {
                            position = position * 10 + v as usize;
                            probe.next();
                        }
                        None => break,
                    }
                }
                let dollar = probe.next().map(|(_, c)| c);
                let conv = probe.next().map(|(_, c)| c);
                match (dollar, conv) {
                    (Some('$'), Some(conv)) if is_conversion(conv) && position > 0 => {
                        chars = probe;
                        out.push_str(arg(args, position - 1));
                    }
                    _ => out.push('%'),
                }
            }
            _ => out.push('%'),
        }
    }

    out
}

fn is_conversion(c: char) -> bool {
    matches!(c, 's' | 'd' | 'u' | 'f' | 'F')
}

fn arg<S: AsRef<str>>(args: &[S], index: usize) -> &str {
    args.get(index).map(AsRef::as_ref).unwrap_or("")
}

/// Count the argument slots a template consumes.
///
/// Used to warn about catalogs whose templates expect more parameters than a
/// check provides.
pub fn placeholder_count(template: &str) -> usize {
    let mut sequential = 0usize;
    let mut highest = 0usize;
    let bytes = template.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            i += 1;
            continue;
        }
        match bytes.get(i + 1) {
            Some(b'%') => i += 2,
            Some(&c) if is_conversion(c as char) => {
                sequential += 1;
                i += 2;
            }
            Some(c) if c.is_ascii_digit() => {
                let mut j = i + 1;
                let mut position = 0usize;
                while let Some(d) = bytes.get(j).filter(|b| b.is_ascii_digit()) {
                    position = position * 10 + (d - b'0') as usize;
                    j += 1;
                }
                if bytes.get(j) == Some(&b'$')
                    && bytes.get(j + 1).is_some_and(|&c| is_conversion(c as char))
                {
                    highest = highest.max(position);
                    i = j + 2;
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }
    sequential.max(highest)
}
