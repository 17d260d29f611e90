use bug_battle::{SubmissionPolicy, Violation};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const GOOD_SUBMISSION: &str = r#"
use crate::core::organ::{Cilia, Organ};
use crate::core::turn::{Creature, Turn};

#[derive(Default)]
pub struct Wanderer {
    cilia: Option<Organ<Cilia>>,
}

impl Creature for Wanderer {
    fn do_turn(&mut self, turn: &mut Turn<'_>) {
        match self.cilia {
            Some(cilia) => {
                let direction = turn.random_direction();
                turn.move_in_direction(cilia, direction);
            }
            None => self.cilia = turn.grow::<Cilia>(),
        }
    }
}
"#;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_clean_submission_passes() {
    let repo = TempDir::new().unwrap();
    write(repo.path(), "src/competitors/wanderers.rs", GOOD_SUBMISSION);
    write(repo.path(), "src/competitors/mod.rs", "pub mod wanderers;\n");

    let policy = SubmissionPolicy::new("src/competitors");
    let report = policy
        .check_submission(
            repo.path(),
            &["src/competitors/wanderers.rs", "src/competitors/mod.rs"],
        )
        .unwrap();

    assert!(report.is_clean(), "{:?}", report.violations);
    assert_eq!(report.checked.len(), 2);
    assert!(report.into_result().is_ok());
}

#[test]
fn test_framework_changes_and_cheats_are_reported() {
    let repo = TempDir::new().unwrap();
    let cheat = GOOD_SUBMISSION.replace("cilia: Option", "f_cilia: Option");
    write(repo.path(), "src/competitors/cheaters.rs", &cheat);
    write(repo.path(), "src/competitors/helpers.rs", "pub fn helper() {}\n");
    write(repo.path(), "src/core/world.rs", "// tampered\n");

    let policy = SubmissionPolicy::new("src/competitors");
    let report = policy
        .check_submission(
            repo.path(),
            &[
                "src/competitors/cheaters.rs",
                "src/competitors/helpers.rs",
                "src/core/world.rs",
            ],
        )
        .unwrap();

    assert_eq!(report.violations.len(), 3);
    assert!(report
        .violations
        .contains(&Violation::OutsideCompetitors {
            path: "src/core/world.rs".to_string()
        }));
    assert!(report
        .violations
        .contains(&Violation::MissingCreatureImpl {
            path: "src/competitors/helpers.rs".to_string()
        }));
    assert!(report.violations.iter().any(|v| matches!(
        v,
        Violation::ReservedIdentifier { ident, .. } if ident == "f_cilia"
    )));
    assert!(report.into_result().is_err());
}

#[test]
fn test_deleted_files_only_checked_for_location() {
    let repo = TempDir::new().unwrap();
    let policy = SubmissionPolicy::new("src/competitors");
    let report = policy
        .check_submission(repo.path(), &["src/competitors/retired.rs"])
        .unwrap();
    assert!(report.is_clean());
}

#[test]
fn test_report_serializes_for_ci() {
    let repo = TempDir::new().unwrap();
    let policy = SubmissionPolicy::new("src/competitors");
    let report = policy
        .check_submission(repo.path(), &["Cargo.toml"])
        .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["violations"][0]["kind"], "outside_competitors");
    assert_eq!(json["violations"][0]["path"], "Cargo.toml");
}
