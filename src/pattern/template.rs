//! Destination templates with `#k`, `#lk` and `#uk` back-references.

use regex::Captures;

use crate::errors::MmvError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Keep,
    Lower,
    Upper,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    /// 1-based wildcard index.
    Ref { index: usize, case: Case },
}

/// A parsed "to" pattern whose references are known to be in range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse `text`, validating each reference against `wildcards`.
    ///
    /// A `#` that does not start a reference is kept literally.
    pub fn parse(text: &str, wildcards: usize) -> Result<Self, MmvError> {
        let chars: Vec<char> = text.chars().collect();
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut i = 0;

        while i < chars.len() {
            if chars[i] != '#' {
                literal.push(chars[i]);
                i += 1;
                continue;
            }

            let (case, digits_at) = match chars.get(i + 1) {
                Some('l') => (Case::Lower, i + 2),
                Some('u') => (Case::Upper, i + 2),
                _ => (Case::Keep, i + 1),
            };
            let mut end = digits_at;
            while end < chars.len() && chars[end].is_ascii_digit() {
                end += 1;
            }
            if end == digits_at {
                literal.push('#');
                i += 1;
                continue;
            }

            let digits: String = chars[digits_at..end].iter().collect();
            let index = digits.parse::<usize>().unwrap_or(usize::MAX);
            if index == 0 || index > wildcards {
                return Err(MmvError::InvalidReference { index });
            }
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Ref { index, case });
            i = end;
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: text.to_string(),
            segments,
        })
    }

    /// The template as written by the user.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Substitute captured wildcard text into the template.
    pub fn expand(&self, caps: &Captures<'_>) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Ref { index, case } => {
                    debug_assert!(*index < caps.len(), "reference #{index} out of range");
                    let text = caps.get(*index).map(|m| m.as_str()).unwrap_or("");
                    match case {
                        Case::Keep => out.push_str(text),
                        Case::Lower => out.push_str(&text.to_lowercase()),
                        Case::Upper => out.push_str(&text.to_uppercase()),
                    }
                }
            }
        }
        out
    }
}
