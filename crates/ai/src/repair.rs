//! Best-effort repair of model-written JSON
//!
//! Each repair is a pure text transformation that only touches one class of
//! mistake and leaves valid JSON unchanged. They are applied in a fixed
//! order by [`repair_json`]. This is not a general sanitizer: anything the
//! repairs do not recognise is left for the strict parser to reject.

use tracing::debug;

/// A named text repair
#[derive(Debug, Clone, Copy)]
pub struct Repair {
    pub name: &'static str,
    pub apply: fn(&str) -> String,
}

/// The repairs applied by [`repair_json`], in order
pub const REPAIRS: &[Repair] = &[
    Repair {
        name: "escape invalid backslashes",
        apply: escape_invalid_backslashes,
    },
    Repair {
        name: "escape control characters",
        apply: escape_control_characters,
    },
    Repair {
        name: "strip trailing commas",
        apply: strip_trailing_commas,
    },
];

/// Apply every repair in [`REPAIRS`] to `text`
pub fn repair_json(text: &str) -> String {
    let mut current = text.to_string();
    for repair in REPAIRS {
        let next = (repair.apply)(&current);
        if next != current {
            debug!("Applied JSON repair: {}", repair.name);
            current = next;
        }
    }
    current
}

/// Double any backslash inside a string literal that does not start a valid
/// JSON escape, so regex patterns such as `"^\d+\s*$"` survive parsing with
/// their backslashes intact.
pub fn escape_invalid_backslashes(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if !in_string {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
            i += 1;
            continue;
        }

        match c {
            '"' => {
                in_string = false;
                out.push(c);
                i += 1;
            }
            '\\' => match chars.get(i + 1) {
                Some('"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't') => {
                    out.push(c);
                    out.push(chars[i + 1]);
                    i += 2;
                }
                Some('u') if is_unicode_escape(&chars[i + 2..]) => {
                    out.extend(&chars[i..i + 6]);
                    i += 6;
                }
                _ => {
                    out.push_str("\\\\");
                    i += 1;
                }
            },
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

/// Escape raw newlines, carriage returns and tabs inside string literals
pub fn escape_control_characters(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if !in_string {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
            continue;
        }

        if escaped {
            escaped = false;
            out.push(c);
            continue;
        }

        match c {
            '\\' => {
                escaped = true;
                out.push(c);
            }
            '"' => {
                in_string = false;
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }

    out
}

/// Remove commas that directly precede a closing `}` or `]`
pub fn strip_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            out.push(c);
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                if !matches!(next, Some('}' | ']')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }

    out
}

fn is_unicode_escape(rest: &[char]) -> bool {
    rest.len() >= 4 && rest[..4].iter().all(|c| c.is_ascii_hexdigit())
}

// ============================================================================
// Tests
// ============================================================================
