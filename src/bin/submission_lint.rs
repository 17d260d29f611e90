use bug_battle::utils::logger;
use bug_battle::SubmissionPolicy;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "submission-lint")]
#[command(about = "Check that a submission only touches the competitors directory")]
struct Args {
    /// Repository root the changed paths are relative to
    #[arg(long, default_value = ".")]
    root: PathBuf,

    #[arg(long, default_value = "src/competitors")]
    competitors_dir: PathBuf,

    /// Changed paths, e.g. from `git diff --name-only`
    #[arg(required = true)]
    changed: Vec<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let policy = SubmissionPolicy::new(&args.competitors_dir);
    let report = match policy.check_submission(&args.root, &args.changed) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(3);
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for violation in &report.violations {
            println!("❌ {}", violation);
        }
        if report.is_clean() {
            println!("✅ {} path(s) checked, submission is clean", report.checked.len());
        }
    }

    if let Err(e) = report.into_result() {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}
