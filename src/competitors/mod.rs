//! The competitors directory.
//!
//! Every competing team lives in its own module here and registers its main
//! creature in [`roster`]. Submissions may only change files in this
//! directory (see `core::policy`).

pub mod agrarian_instructors;
pub mod brown_gillingham;
pub mod hunting_instructors;

use crate::core::turn::Creature;
use crate::domain::model::{colour_for, Entrant};
use crate::utils::error::{BattleError, Result};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

#[derive(Clone, Copy)]
pub struct Competitor {
    pub name: &'static str,
    /// Module path of the team, e.g. `bug_battle::competitors::hunting_instructors`.
    pub module: &'static str,
    pub spawn: fn() -> Box<dyn Creature>,
}

impl Competitor {
    pub fn group(&self) -> String {
        group_name(self.module)
    }

    pub fn entrant(&self, index: usize) -> Entrant {
        Entrant {
            name: self.name.to_string(),
            group: self.group(),
            colour: colour_for(index).to_string(),
        }
    }
}

impl fmt::Debug for Competitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Competitor")
            .field("name", &self.name)
            .field("module", &self.module)
            .finish()
    }
}

/// 所有已登記的參賽者
pub fn roster() -> Vec<Competitor> {
    vec![
        hunting_instructors::competitor(),
        agrarian_instructors::competitor(),
        brown_gillingham::competitor(),
    ]
}

/// Look competitors up by name (case-insensitive). `all` picks everyone.
pub fn select(names: &[String]) -> Result<Vec<Competitor>> {
    let roster = roster();
    if names.iter().any(|name| name.eq_ignore_ascii_case("all")) {
        return Ok(roster);
    }

    names
        .iter()
        .map(|name| {
            roster
                .iter()
                .find(|competitor| competitor.name.eq_ignore_ascii_case(name.trim()))
                .copied()
                .ok_or_else(|| BattleError::UnknownCompetitor { name: name.clone() })
        })
        .collect()
}

/// Human-readable team name from a module name:
/// `hunting_instructors` and `HuntingInstructors` both become `Hunting Instructors`.
pub fn group_name(module: &str) -> String {
    static CAMEL: OnceLock<Regex> = OnceLock::new();
    let camel = CAMEL.get_or_init(|| Regex::new(r"([A-Z][a-z0-9]*)").expect("valid regex"));

    let last = module.rsplit("::").next().unwrap_or(module);
    let last = last.rsplit('.').next().unwrap_or(last);

    if last.contains('_') || last.chars().all(|c| !c.is_ascii_uppercase()) {
        return last
            .split('_')
            .filter(|word| !word.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
    }

    camel.replace_all(last, "$1 ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_name_from_snake_case_module() {
        assert_eq!(
            group_name("bug_battle::competitors::hunting_instructors"),
            "Hunting Instructors"
        );
        assert_eq!(group_name("brown_gillingham"), "Brown Gillingham");
    }

    #[test]
    fn test_group_name_from_camel_case_module() {
        assert_eq!(group_name("competitors.HuntingInstructors"), "Hunting Instructors");
        assert_eq!(group_name("AgrarianInstructors"), "Agrarian Instructors");
    }

    #[test]
    fn test_select_is_case_insensitive() {
        let chosen = select(&["hunter".to_string(), "SUPERPLANT".to_string()]).unwrap();
        let names: Vec<_> = chosen.iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Hunter", "SuperPlant"]);
    }

    #[test]
    fn test_select_all() {
        let chosen = select(&["all".to_string()]).unwrap();
        assert_eq!(chosen.len(), roster().len());
    }

    #[test]
    fn test_select_unknown_competitor_fails() {
        let err = select(&["Godzilla".to_string()]).unwrap_err();
        assert!(matches!(err, BattleError::UnknownCompetitor { name } if name == "Godzilla"));
    }

    #[test]
    fn test_roster_entrants_have_groups() {
        let entrants: Vec<_> = roster()
            .iter()
            .enumerate()
            .map(|(i, c)| c.entrant(i))
            .collect();
        assert_eq!(entrants[0].group, "Hunting Instructors");
        assert_eq!(entrants[1].group, "Agrarian Instructors");
        assert_eq!(entrants[2].group, "Brown Gillingham");
        assert_ne!(entrants[0].colour, entrants[1].colour);
    }
}
