//! Branch enumeration results and base-branch selection

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A branch as reported by the hosting API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchInfo {
    /// Branch name
    pub name: String,
    /// Whether branch protection is enabled
    pub protected: bool,
}

impl BranchInfo {
    pub fn new(name: impl Into<String>, protected: bool) -> Self {
        Self {
            name: name.into(),
            protected,
        }
    }
}

/// A minimatch-style glob over branch names
///
/// Supported syntax:
/// - `*` matches within one `/`-separated segment
/// - `**` matches across segments
/// - `?` matches one character other than `/`
/// - `[abc]`, `[a-z]`, `[!abc]` character classes
/// - `{a,b}` alternation (nestable)
/// - a leading `!` negates the whole pattern
#[derive(Debug, Clone)]
pub struct BranchPattern {
    source: String,
    regex: Regex,
    negated: bool,
}

impl BranchPattern {
    /// Compile a glob pattern
    pub fn new(pattern: &str) -> Result<Self> {
        let mut body = pattern;
        let mut negated = false;
        while let Some(rest) = body.strip_prefix('!') {
            negated = !negated;
            body = rest;
        }

        let translated = glob_to_regex(body)?;
        let regex = Regex::new(&translated).map_err(|e| {
            Error::Config(format!("Invalid branches pattern {:?}: {}", pattern, e))
        })?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
            negated,
        })
    }

    /// Whether a branch name matches this pattern
    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name) != self.negated
    }

    /// The pattern as written
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

fn glob_to_regex(glob: &str) -> Result<String> {
    let chars: Vec<char> = glob.chars().collect();
    let mut out = String::from("^");
    let mut brace_depth = 0usize;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '*' => {
                if chars.get(i + 1) == Some(&'*') {
                    i += 1;
                    if chars.get(i + 1) == Some(&'/') {
                        i += 1;
                        out.push_str("(?:.*/)?");
                    } else {
                        out.push_str(".*");
                    }
                } else {
                    out.push_str("[^/]*");
                }
            }
            '?' => out.push_str("[^/]"),
            '[' => match chars[i + 1..].iter().position(|&ch| ch == ']') {
                Some(offset) if offset > 0 => {
                    let class: String = chars[i + 1..i + 1 + offset].iter().collect();
                    out.push('[');
                    let class = match class.strip_prefix('!') {
                        Some(rest) => {
                            out.push('^');
                            rest.to_string()
                        }
                        None => class,
                    };
                    out.push_str(&class.replace('\\', "\\\\").replace('[', "\\["));
                    out.push(']');
                    i += offset + 1;
                }
                _ => out.push_str("\\["),
            },
            '{' => {
                brace_depth += 1;
                out.push_str("(?:");
            }
            '}' if brace_depth > 0 => {
                brace_depth -= 1;
                out.push(')');
            }
            ',' if brace_depth > 0 => out.push('|'),
            '\\' if i + 1 < chars.len() => {
                i += 1;
                out.push_str(&regex::escape(&chars[i].to_string()));
            }
            other => out.push_str(&regex::escape(&other.to_string())),
        }
        i += 1;
    }

    if brace_depth > 0 {
        return Err(Error::Config(format!(
            "Invalid branches pattern {:?}: unclosed '{{'",
            glob
        )));
    }

    out.push('$');
    Ok(out)
}

/// How base branches are chosen from the repository's branches
#[derive(Debug, Clone)]
pub enum BranchSelection {
    /// Every protected branch
    Protected,
    /// Every branch whose name matches the pattern
    Matching(BranchPattern),
}

impl BranchSelection {
    /// Build a selection from an optional glob; blank or absent means protected branches
    pub fn from_pattern(pattern: Option<&str>) -> Result<Self> {
        match pattern.map(str::trim) {
            Some(p) if !p.is_empty() => Ok(BranchSelection::Matching(BranchPattern::new(p)?)),
            _ => Ok(BranchSelection::Protected),
        }
    }

    /// Whether a branch is eligible as a base
    pub fn accepts(&self, branch: &BranchInfo) -> bool {
        match self {
            BranchSelection::Protected => branch.protected,
            BranchSelection::Matching(pattern) => pattern.matches(&branch.name),
        }
    }
}

/// Base branches to sync, in enumeration order, never including the pushed branch
pub fn select_base_branches(
    branches: &[BranchInfo],
    selection: &BranchSelection,
    pushed_branch: &str,
) -> Vec<String> {
    branches
        .iter()
        .filter(|b| selection.accepts(b))
        .filter(|b| b.name != pushed_branch)
        .map(|b| b.name.clone())
        .collect()
}
