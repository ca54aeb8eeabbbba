//! File name templates such as `page_{page:03d}_{index:03d}`.

use std::fmt::Write as _;

/// Value substituted into a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Page,
    Index,
    Name,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder {
        field: Field,
        width: usize,
        zero_pad: bool,
    },
}

/// A parsed naming pattern.
///
/// Placeholders are `{page}`, `{index}` and `{name}` (PDF file stem).
/// Numeric placeholders accept a printf-style spec: `{page:03d}` zero-pads
/// to three digits, `{page:3d}` pads with spaces. `{{` and `}}` are
/// literal braces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingPattern {
    segments: Vec<Segment>,
}

impl NamingPattern {
    /// Parse a pattern, rejecting unknown placeholders and malformed specs.
    pub fn parse(pattern: &str) -> Result<Self, String> {
        if pattern.is_empty() {
            return Err("pattern is empty".into());
        }
        if pattern.contains(['/', '\\']) {
            return Err("pattern must not contain path separators".into());
        }

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = pattern.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut body = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        body.push(c);
                    }
                    if !closed {
                        return Err(format!("unclosed placeholder '{{{}'", body));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Self::parse_placeholder(&body)?);
                }
                '}' => return Err("unmatched '}'".into()),
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { segments })
    }

    fn parse_placeholder(body: &str) -> Result<Segment, String> {
        let (name, spec) = match body.split_once(':') {
            Some((name, spec)) => (name, Some(spec)),
            None => (body, None),
        };
        let field = match name {
            "page" => Field::Page,
            "index" => Field::Index,
            "name" => Field::Name,
            other => return Err(format!("unknown placeholder '{{{}}}'", other)),
        };

        let Some(spec) = spec else {
            return Ok(Segment::Placeholder {
                field,
                width: 0,
                zero_pad: false,
            });
        };
        if field == Field::Name {
            return Err("'{name}' takes no format spec".into());
        }

        let digits = spec.strip_suffix('d').unwrap_or(spec);
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!("invalid format spec '{}' for '{{{}}}'", spec, name));
        }
        let zero_pad = digits.len() > 1 && digits.starts_with('0');
        let width = if digits.is_empty() {
            0
        } else {
            digits
                .parse::<usize>()
                .map_err(|_| format!("invalid width in '{}'", spec))?
        };
        if width > 32 {
            return Err(format!("width {} in '{}' is too large", width, spec));
        }
        Ok(Segment::Placeholder {
            field,
            width,
            zero_pad,
        })
    }

    /// Render the file stem for one image (extension not included).
    pub fn render(&self, page: u32, index: u32, name: &str) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => out.push_str(s),
                Segment::Placeholder {
                    field,
                    width,
                    zero_pad,
                } => {
                    let value = match field {
                        Field::Page => page,
                        Field::Index => index,
                        Field::Name => {
                            out.push_str(name);
                            continue;
                        }
                    };
                    let _ = if *zero_pad {
                        write!(out, "{:0width$}", value, width = width)
                    } else {
                        write!(out, "{:>width$}", value, width = width)
                    };
                }
            }
        }
        out
    }
}
