//! Shell-glob "from" patterns compiled to anchored capture-group matchers.
//!
//! Every wildcard becomes exactly one capture group, numbered left to right,
//! so `#k` in a template refers to the k-th wildcard of the from pattern.

use regex::{Captures, Regex};

use crate::errors::MmvError;

/// A parsed from pattern.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    source: String,
    regex: Regex,
    wildcards: usize,
    expansion: String,
}

impl GlobPattern {
    /// Translate `pattern` in one left-to-right scan.
    pub fn parse(pattern: &str) -> Result<Self, MmvError> {
        let chars: Vec<char> = pattern.chars().collect();
        let mut re = String::from("(?s)^");
        let mut expansion = String::with_capacity(pattern.len());
        let mut wildcards = 0usize;
        let mut i = 0;

        while i < chars.len() {
            match chars[i] {
                '*' if chars.get(i + 1) == Some(&'*') => {
                    wildcards += 1;
                    let starts_component = i == 0 || chars[i - 1] == '/';
                    match chars.get(i + 2) {
                        Some('/') if starts_component => {
                            // directory prefix with its separator, possibly empty
                            re.push_str("((?:.*?/)?)");
                            expansion.push_str("**/");
                            i += 3;
                        }
                        None if starts_component => {
                            re.push_str("(.*?)");
                            expansion.push_str("**");
                            i += 2;
                        }
                        _ => {
                            // the enumerator only recurses on a whole `**` component
                            re.push_str("(.*?)");
                            expansion.push('*');
                            i += 2;
                        }
                    }
                }
                '*' => {
                    wildcards += 1;
                    re.push_str("([^/]*?)");
                    expansion.push('*');
                    i += 1;
                }
                '?' => {
                    wildcards += 1;
                    re.push_str("([^/])");
                    expansion.push('?');
                    i += 1;
                }
                '[' => {
                    let class = parse_class(&chars, i).map_err(|reason| MmvError::InvalidPattern {
                        pattern: pattern.to_string(),
                        reason,
                    })?;
                    wildcards += 1;
                    re.push('(');
                    re.push_str(&class.regex);
                    re.push(')');
                    expansion.push_str(&class.glob);
                    i = class.end;
                }
                c => {
                    let mut buf = [0u8; 4];
                    re.push_str(&regex::escape(c.encode_utf8(&mut buf)));
                    expansion.push(c);
                    i += 1;
                }
            }
        }
        re.push('$');

        let regex = Regex::new(&re).map_err(|e| MmvError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        tracing::debug!(pattern, regex = %re, wildcards, "compiled from pattern");

        Ok(Self {
            source: pattern.to_string(),
            regex,
            wildcards,
            expansion,
        })
    }

    /// The pattern as written by the user.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Number of wildcards, and therefore capture groups.
    pub fn wildcards(&self) -> usize {
        self.wildcards
    }

    /// Pattern handed to the filesystem enumerator (`[^` normalised to `[!`).
    pub fn expansion(&self) -> &str {
        &self.expansion
    }

    /// Match a whole path; `None` when it does not match.
    pub fn captures<'t>(&self, text: &'t str) -> Option<Captures<'t>> {
        self.regex.captures(text)
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

struct Class {
    regex: String,
    glob: String,
    /// Index just past the closing `]`.
    end: usize,
}

fn parse_class(chars: &[char], open: usize) -> Result<Class, String> {
    let mut j = open + 1;
    let negated = matches!(chars.get(j), Some('!') | Some('^'));
    if negated {
        j += 1;
    }
    let first = j;
    // `]` right after the opening (or the negation mark) is a member
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    while j < chars.len() && chars[j] != ']' {
        j += 1;
    }
    if j >= chars.len() {
        return Err("unterminated character class".to_string());
    }

    let members = &chars[first..j];
    let mut regex = String::from(if negated { "[^/" } else { "[" });
    let mut glob = String::from(if negated { "[!" } else { "[" });
    for (k, &c) in members.iter().enumerate() {
        glob.push(c);
        if c == '-' && k > 0 && k + 1 < members.len() {
            regex.push('-');
        } else {
            let mut buf = [0u8; 4];
            regex.push_str(&regex::escape(c.encode_utf8(&mut buf)));
        }
    }
    regex.push(']');
    glob.push(']');

    Ok(Class {
        regex,
        glob,
        end: j + 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(p: &GlobPattern, text: &str) -> Option<Vec<String>> {
        p.captures(text).map(|c| {
            c.iter()
                .skip(1)
                .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
                .collect()
        })
    }

    #[test]
    fn star_captures_within_one_component() {
        let p = GlobPattern::parse("*.txt").unwrap();
        assert_eq!(p.wildcards(), 1);
        assert_eq!(groups(&p, "a.txt"), Some(vec!["a".into()]));
        assert!(!p.is_match("d/a.txt"));
        assert!(!p.is_match("a.txt.bak"));
    }

    #[test]
    fn stars_are_lazy() {
        let p = GlobPattern::parse("*.*").unwrap();
        assert_eq!(groups(&p, "a.b.c"), Some(vec!["a".into(), "b.c".into()]));
    }

    #[test]
    fn double_star_slash_may_be_empty() {
        let p = GlobPattern::parse("**/*.txt").unwrap();
        assert_eq!(p.wildcards(), 2);
        assert_eq!(groups(&p, "x.txt"), Some(vec!["".into(), "x".into()]));
        assert_eq!(groups(&p, "d/e/x.txt"), Some(vec!["d/e/".into(), "x".into()]));
        assert_eq!(p.expansion(), "**/*.txt");
    }

    #[test]
    fn bare_double_star_crosses_separators() {
        let p = GlobPattern::parse("src/**").unwrap();
        assert_eq!(groups(&p, "src/a/b.rs"), Some(vec!["a/b.rs".into()]));
    }

    #[test]
    fn partial_double_star_enumerates_as_star() {
        let p = GlobPattern::parse("**.txt").unwrap();
        assert_eq!(p.wildcards(), 1);
        assert_eq!(p.expansion(), "*.txt");
        assert_eq!(groups(&p, "a.txt"), Some(vec!["a".into()]));

        let p = GlobPattern::parse("d/a**b").unwrap();
        assert_eq!(p.expansion(), "d/a*b");
        assert_eq!(groups(&p, "d/axyb"), Some(vec!["xy".into()]));

        let p = GlobPattern::parse("a**/x").unwrap();
        assert_eq!(p.expansion(), "a*/x");
        assert_eq!(groups(&p, "ab/x"), Some(vec!["b".into()]));

        assert_eq!(GlobPattern::parse("d/**").unwrap().expansion(), "d/**");
    }

    #[test]
    fn question_mark_matches_one_character() {
        let p = GlobPattern::parse("f?.log").unwrap();
        assert!(p.is_match("f1.log"));
        assert!(!p.is_match("f.log"));
        assert!(!p.is_match("f12.log"));
    }

    #[test]
    fn classes_support_ranges_and_both_negations() {
        let p = GlobPattern::parse("[a-c]x").unwrap();
        assert!(p.is_match("bx"));
        assert!(!p.is_match("dx"));

        let bang = GlobPattern::parse("[!0-9]*").unwrap();
        let caret = GlobPattern::parse("[^0-9]*").unwrap();
        for p in [&bang, &caret] {
            assert!(p.is_match("a1"));
            assert!(!p.is_match("1a"));
            assert!(!p.is_match("/a"));
        }
        assert_eq!(caret.expansion(), "[!0-9]*");
    }

    #[test]
    fn leading_bracket_is_a_member() {
        let p = GlobPattern::parse("[]a]").unwrap();
        assert!(p.is_match("]"));
        assert!(p.is_match("a"));
        assert!(!p.is_match("b"));
    }

    #[test]
    fn literals_are_escaped() {
        let p = GlobPattern::parse("a+(b).txt").unwrap();
        assert_eq!(p.wildcards(), 0);
        assert!(p.is_match("a+(b).txt"));
        assert!(!p.is_match("aa(b)xtxt"));
    }

    #[test]
    fn unterminated_class_is_invalid() {
        let err = GlobPattern::parse("[abc").unwrap_err();
        assert!(matches!(err, MmvError::InvalidPattern { .. }), "{err}");
    }

    #[test]
    fn reversed_range_is_invalid() {
        assert!(matches!(
            GlobPattern::parse("[z-a]"),
            Err(MmvError::InvalidPattern { .. })
        ));
    }
}
