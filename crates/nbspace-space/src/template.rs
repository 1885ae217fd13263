//! Minimal `${name}` placeholder templates.
//!
//! Substitution is strict in both directions: every placeholder in the text
//! must receive a value and every supplied value must be used. A mismatch
//! means the template files and their parameter structs have drifted.
//! `$$` renders a literal `$`.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template {template}: no value for placeholder ${{{placeholder}}}")]
    MissingValue {
        template: &'static str,
        placeholder: String,
    },

    #[error("template {template}: value supplied for unknown placeholder {placeholder}")]
    UnusedValue {
        template: &'static str,
        placeholder: String,
    },

    #[error("template {template}: malformed placeholder at byte {offset}")]
    Malformed { template: &'static str, offset: usize },

    #[error("template {template}: rendered output is not valid: {reason}")]
    InvalidOutput {
        template: &'static str,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece<'a> {
    Text(&'a str),
    Dollar,
    Placeholder(&'a str),
}

/// A named template source.
#[derive(Debug, Clone, Copy)]
pub struct Template {
    name: &'static str,
    source: &'static str,
}

impl Template {
    pub const fn new(name: &'static str, source: &'static str) -> Self {
        Self { name, source }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn pieces(&self) -> Result<Vec<Piece<'static>>, TemplateError> {
        let src = self.source;
        let mut pieces = Vec::new();
        let mut rest_start = 0;
        let mut search_from = 0;
        while let Some(rel) = src[search_from..].find('$') {
            let at = search_from + rel;
            if at > rest_start {
                pieces.push(Piece::Text(&src[rest_start..at]));
            }
            let after = &src[at + 1..];
            if after.starts_with('$') {
                pieces.push(Piece::Dollar);
                rest_start = at + 2;
            } else if let Some(body) = after.strip_prefix('{') {
                let end = body.find('}').ok_or(TemplateError::Malformed {
                    template: self.name,
                    offset: at,
                })?;
                let ident = &body[..end];
                if ident.is_empty()
                    || !ident
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '_')
                {
                    return Err(TemplateError::Malformed {
                        template: self.name,
                        offset: at,
                    });
                }
                pieces.push(Piece::Placeholder(ident));
                rest_start = at + 2 + end + 1;
            } else {
                return Err(TemplateError::Malformed {
                    template: self.name,
                    offset: at,
                });
            }
            search_from = rest_start;
        }
        if rest_start < src.len() {
            pieces.push(Piece::Text(&src[rest_start..]));
        }
        Ok(pieces)
    }

    /// Placeholder names used by this template.
    pub fn placeholders(&self) -> Result<BTreeSet<&'static str>, TemplateError> {
        Ok(self
            .pieces()?
            .into_iter()
            .filter_map(|p| match p {
                Piece::Placeholder(name) => Some(name),
                _ => None,
            })
            .collect())
    }

    /// Substitute `values` into the template.
    pub fn substitute(&self, values: &[(&'static str, String)]) -> Result<String, TemplateError> {
        let lookup: BTreeMap<&str, &str> = values.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let mut used = BTreeSet::new();
        let mut out = String::with_capacity(self.source.len());
        for piece in self.pieces()? {
            match piece {
                Piece::Text(t) => out.push_str(t),
                Piece::Dollar => out.push('$'),
                Piece::Placeholder(name) => {
                    let value = lookup.get(name).ok_or_else(|| TemplateError::MissingValue {
                        template: self.name,
                        placeholder: name.to_string(),
                    })?;
                    used.insert(name);
                    out.push_str(value);
                }
            }
        }
        if let Some(unused) = lookup.keys().find(|k| !used.contains(*k)) {
            return Err(TemplateError::UnusedValue {
                template: self.name,
                placeholder: unused.to_string(),
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute() {
        let t = Template::new("t", "hello ${who}, port ${port}");
        let out = t
            .substitute(&[("who", "world".into()), ("port", "8888".into())])
            .unwrap();
        assert_eq!(out, "hello world, port 8888");
    }

    #[test]
    fn test_repeated_placeholder() {
        let t = Template::new("t", "${a}-${a}");
        assert_eq!(t.substitute(&[("a", "x".into())]).unwrap(), "x-x");
    }

    #[test]
    fn test_dollar_escape() {
        let t = Template::new("t", "cost $$5 ${a}");
        assert_eq!(t.substitute(&[("a", "ok".into())]).unwrap(), "cost $5 ok");
    }

    #[test]
    fn test_missing_value() {
        let t = Template::new("t", "${a} ${b}");
        let err = t.substitute(&[("a", "x".into())]).unwrap_err();
        assert_eq!(
            err,
            TemplateError::MissingValue {
                template: "t",
                placeholder: "b".into()
            }
        );
    }

    #[test]
    fn test_unused_value() {
        let t = Template::new("t", "${a}");
        let err = t
            .substitute(&[("a", "x".into()), ("b", "y".into())])
            .unwrap_err();
        assert!(matches!(err, TemplateError::UnusedValue { .. }));
    }

    #[test]
    fn test_malformed() {
        for src in ["${a", "$a", "${}", "${a-b}", "tail $"] {
            let t = Template::new("t", src);
            assert!(
                matches!(t.placeholders(), Err(TemplateError::Malformed { .. })),
                "{src} should be malformed"
            );
        }
    }

    #[test]
    fn test_placeholders() {
        let t = Template::new("t", "${b} $$ ${a} ${b}");
        let names: Vec<_> = t.placeholders().unwrap().into_iter().collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
