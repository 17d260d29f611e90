//! Submission lint. A submission may only touch the competitors directory,
//! may not name anything with the framework's reserved `f_` prefix, and
//! every competitor module must implement `Creature`.

use crate::utils::error::{BattleError, Result};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    OutsideCompetitors { path: String },
    ReservedIdentifier { path: String, line: usize, ident: String },
    MissingCreatureImpl { path: String },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::OutsideCompetitors { path } => {
                write!(f, "{}: changes outside the competitors directory", path)
            }
            Violation::ReservedIdentifier { path, line, ident } => {
                write!(f, "{}:{}: reserved identifier '{}'", path, line, ident)
            }
            Violation::MissingCreatureImpl { path } => {
                write!(f, "{}: no `impl Creature for ...` found", path)
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PolicyReport {
    pub checked: Vec<String>,
    pub violations: Vec<Violation>,
}

impl PolicyReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn into_result(self) -> Result<Self> {
        if self.is_clean() {
            Ok(self)
        } else {
            Err(BattleError::PolicyViolation {
                count: self.violations.len(),
            })
        }
    }
}

fn reserved_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b[fF]_\w*").expect("valid reserved identifier regex"))
}

fn creature_impl_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"impl\s+(?:[\w:]+::)?Creature\s+for\s+(\w+)")
            .expect("valid creature impl regex")
    })
}

/// 只看路徑字面，不碰檔案系統；`..` 超出根目錄時回傳 None
fn normalize(path: &Path) -> Option<PathBuf> {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    return None;
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Some(normalized)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn blank(c: char) -> char {
    if c == '\n' {
        '\n'
    } else {
        ' '
    }
}

/// `r"..."`, `r#"..."#`, `br"..."` 開頭時回傳 `#` 的數量
fn raw_string_hashes(chars: &[char], i: usize) -> Option<usize> {
    let boundary = match i {
        0 => true,
        1 => !is_ident_char(chars[0]) || chars[0] == 'b',
        _ => {
            !is_ident_char(chars[i - 1])
                || (chars[i - 1] == 'b' && !is_ident_char(chars[i - 2]))
        }
    };
    if !boundary {
        return None;
    }
    let hashes = chars[i + 1..].iter().take_while(|&&c| c == '#').count();
    (chars.get(i + 1 + hashes) == Some(&'"')).then_some(hashes)
}

/// Remove comments and blank out string and char literal contents, keeping
/// every newline so line numbers still match the original source.
fn strip_comments(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut code = String::with_capacity(source.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        if c == '/' && next == Some('/') {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
        } else if c == '/' && next == Some('*') {
            // 區塊註解可以巢狀
            let mut depth = 0usize;
            while i < chars.len() {
                match (chars[i], chars.get(i + 1).copied()) {
                    ('/', Some('*')) => {
                        depth += 1;
                        code.push_str("  ");
                        i += 2;
                    }
                    ('*', Some('/')) => {
                        depth -= 1;
                        code.push_str("  ");
                        i += 2;
                        if depth == 0 {
                            break;
                        }
                    }
                    (other, _) => {
                        code.push(blank(other));
                        i += 1;
                    }
                }
            }
        } else if c == '"' {
            code.push('"');
            i += 1;
            while i < chars.len() {
                match chars[i] {
                    '\\' => {
                        code.push(' ');
                        if let Some(&escaped) = chars.get(i + 1) {
                            code.push(blank(escaped));
                        }
                        i += 2;
                    }
                    '"' => {
                        code.push('"');
                        i += 1;
                        break;
                    }
                    other => {
                        code.push(blank(other));
                        i += 1;
                    }
                }
            }
        } else if let Some(hashes) = (c == 'r').then(|| raw_string_hashes(&chars, i)).flatten() {
            code.push('r');
            code.push_str(&"#".repeat(hashes));
            code.push('"');
            i += hashes + 2;
            while i < chars.len() {
                let closes = chars[i] == '"'
                    && chars[i + 1..].iter().take(hashes).filter(|&&h| h == '#').count() == hashes;
                if closes {
                    code.push('"');
                    code.push_str(&"#".repeat(hashes));
                    i += hashes + 1;
                    break;
                }
                code.push(blank(chars[i]));
                i += 1;
            }
        } else if c == '\'' && next == Some('\\') {
            // '\n'、'\''、'\u{..}' 這類跳脫字元
            code.push('\'');
            i += 3;
            while i < chars.len() && chars[i] != '\'' {
                i += 1;
            }
            code.push_str("  ");
            code.push('\'');
            i += 1;
        } else if c == '\'' && next.is_some() && chars.get(i + 2) == Some(&'\'') {
            code.push_str("' '");
            i += 3;
        } else {
            // lifetime 或一般程式碼
            code.push(c);
            i += 1;
        }
    }
    code
}

#[derive(Debug, Clone)]
pub struct SubmissionPolicy {
    competitors_dir: PathBuf,
}

impl SubmissionPolicy {
    pub fn new(competitors_dir: impl Into<PathBuf>) -> Self {
        Self {
            competitors_dir: competitors_dir.into(),
        }
    }

    fn is_inside(&self, path: &Path) -> bool {
        match (normalize(&self.competitors_dir), normalize(path)) {
            (Some(dir), Some(path)) => path != dir && path.starts_with(&dir),
            _ => false,
        }
    }

    pub fn check_paths<P: AsRef<Path>>(&self, changed: &[P]) -> Vec<Violation> {
        changed
            .iter()
            .map(AsRef::as_ref)
            .filter(|path| !self.is_inside(path))
            .map(|path| Violation::OutsideCompetitors {
                path: path.display().to_string(),
            })
            .collect()
    }

    pub fn check_source(&self, path: &str, source: &str) -> Vec<Violation> {
        let mut violations = Vec::new();
        let code = strip_comments(source);

        for (number, line) in code.lines().enumerate() {
            for found in reserved_pattern().find_iter(line) {
                violations.push(Violation::ReservedIdentifier {
                    path: path.to_string(),
                    line: number + 1,
                    ident: found.as_str().to_string(),
                });
            }
        }

        let is_mod = Path::new(path).file_name().is_some_and(|name| name == "mod.rs");
        if !is_mod && !creature_impl_pattern().is_match(&code) {
            violations.push(Violation::MissingCreatureImpl {
                path: path.to_string(),
            });
        }
        violations
    }

    /// Check every changed path, reading the Rust sources that still exist
    /// under `root`. Deleted files only count for the path rule.
    pub fn check_submission<P: AsRef<Path>>(
        &self,
        root: &Path,
        changed: &[P],
    ) -> Result<PolicyReport> {
        let mut report = PolicyReport {
            violations: self.check_paths(changed),
            ..PolicyReport::default()
        };

        for path in changed.iter().map(AsRef::as_ref) {
            let display = path.display().to_string();
            report.checked.push(display.clone());

            let is_rust = path.extension().is_some_and(|ext| ext == "rs");
            let full = root.join(path);
            if !self.is_inside(path) || !is_rust || !full.is_file() {
                continue;
            }
            let source = std::fs::read_to_string(&full)?;
            report.violations.extend(self.check_source(&display, &source));
        }

        tracing::debug!(
            "Checked {} path(s), {} violation(s)",
            report.checked.len(),
            report.violations.len()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> SubmissionPolicy {
        SubmissionPolicy::new("src/competitors")
    }

    #[test]
    fn test_paths_inside_competitors_are_allowed() {
        let changed = ["src/competitors/my_team.rs", "./src/competitors/sub/../other.rs"];
        assert!(policy().check_paths(&changed).is_empty());
    }

    #[test]
    fn test_paths_escaping_competitors_are_rejected() {
        let changed = [
            "src/core/world.rs",
            "src/competitors/../core/turn.rs",
            "src/competitors",
            "../../etc/passwd",
        ];
        let violations = policy().check_paths(&changed);
        assert_eq!(violations.len(), 4);
        assert!(matches!(
            &violations[1],
            Violation::OutsideCompetitors { path } if path.contains("..")
        ));
    }

    #[test]
    fn test_reserved_identifiers_found_outside_comments() {
        let source = "use crate::core::turn::{Creature, Turn};\n\
                      // f_ is fine in a comment\n\
                      struct Sneaky { f_strength: i64 }\n\
                      impl Creature for Sneaky {\n\
                      fn do_turn(&mut self, _t: &mut Turn<'_>) { let F_x = 1; } }\n";
        let violations = policy().check_source("src/competitors/sneaky.rs", source);
        assert_eq!(
            violations,
            vec![
                Violation::ReservedIdentifier {
                    path: "src/competitors/sneaky.rs".to_string(),
                    line: 3,
                    ident: "f_strength".to_string(),
                },
                Violation::ReservedIdentifier {
                    path: "src/competitors/sneaky.rs".to_string(),
                    line: 5,
                    ident: "F_x".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_identifiers_merely_containing_f_are_fine() {
        let source = "impl crate::core::turn::Creature for Leaf {\n\
                      fn do_turn(&mut self, turn: &mut Turn<'_>) {\n\
                      let leaf_count = self_f_count; }\n\
                      }\n";
        assert!(policy().check_source("src/competitors/leaf.rs", source).is_empty());
    }

    #[test]
    fn test_missing_creature_impl() {
        let violations = policy().check_source(
            "src/competitors/empty.rs",
            "pub struct Nothing;\n// impl Creature for Nothing\n",
        );
        assert_eq!(
            violations,
            vec![Violation::MissingCreatureImpl {
                path: "src/competitors/empty.rs".to_string()
            }]
        );
        assert!(policy().check_source("src/competitors/mod.rs", "pub mod team;").is_empty());
    }

    #[test]
    fn test_string_containing_slashes_does_not_hide_code() {
        let source = "impl Creature for Web { fn do_turn(&mut self, _t: &mut Turn<'_>) {\n\
                      let url = \"http://x\"; let f_secret = 1;\n\
                      } }\n";
        let violations = policy().check_source("src/competitors/web.rs", source);
        assert_eq!(
            violations,
            vec![Violation::ReservedIdentifier {
                path: "src/competitors/web.rs".to_string(),
                line: 2,
                ident: "f_secret".to_string(),
            }]
        );
    }

    #[test]
    fn test_block_comments_are_ignored() {
        let source = "/* outer /* f_nested */ f_note: still a comment */\n\
                      /* f_other\n   spans lines */\n\
                      impl Creature for Quiet { fn do_turn(&mut self, _t: &mut Turn<'_>) {} }\n\
                      const F_AFTER: i64 = 1;\n";
        let violations = policy().check_source("src/competitors/quiet.rs", source);
        assert_eq!(
            violations,
            vec![Violation::ReservedIdentifier {
                path: "src/competitors/quiet.rs".to_string(),
                line: 5,
                ident: "F_AFTER".to_string(),
            }]
        );
    }

    #[test]
    fn test_commented_out_impl_does_not_count() {
        let source = "pub struct S;\n/* impl Creature for S */\n";
        assert_eq!(
            policy().check_source("src/competitors/s.rs", source),
            vec![Violation::MissingCreatureImpl {
                path: "src/competitors/s.rs".to_string()
            }]
        );

        let in_string = "pub struct S;\nconst DOC: &str = \"impl Creature for S\";\n";
        assert_eq!(policy().check_source("src/competitors/s.rs", in_string).len(), 1);
    }

    #[test]
    fn test_literals_are_not_identifiers() {
        let source = r####"impl Creature for Lit { fn do_turn(&mut self, _t: &mut Turn<'_>) {
let a = r#"f_raw " // still a string"#; let f_real = '"';
let b = '\''; let c = "f_plain \" f_escaped"; let d = b'/';
} }
"####;
        let violations = policy().check_source("src/competitors/lit.rs", source);
        assert_eq!(
            violations,
            vec![Violation::ReservedIdentifier {
                path: "src/competitors/lit.rs".to_string(),
                line: 2,
                ident: "f_real".to_string(),
            }]
        );
    }

    #[test]
    fn test_strip_comments_keeps_line_numbers() {
        let code = strip_comments("a /* x\ny */ b\n// c\nd");
        assert_eq!(code.lines().count(), 4);
        assert_eq!(code.lines().nth(3), Some("d"));
        assert!(!code.contains('x'));
    }

    #[test]
    fn test_report_into_result() {
        assert!(PolicyReport::default().into_result().is_ok());
        let report = PolicyReport {
            checked: vec!["a".to_string()],
            violations: vec![Violation::MissingCreatureImpl { path: "a".to_string() }],
        };
        assert!(matches!(
            report.into_result(),
            Err(BattleError::PolicyViolation { count: 1 })
        ));
    }
}
