//! Command-line interface of the `campus-core` binary.

use clap::{Args, Parser, Subcommand, ValueEnum};
use shared_types::{OverrideRuleType, StudentId, UserId};
use std::path::PathBuf;

/// Campus-Core: regulation freezing and academic promotion engine
#[derive(Parser, Debug)]
#[command(name = "campus-core", version)]
#[command(about = "Administer regulations, frozen batches, promotions and overrides")]
pub struct Cli {
    /// Store file (overrides CC_DATA_FILE)
    #[arg(long, global = true, env = "CC_DATA_FILE")]
    pub data_file: Option<PathBuf>,

    /// Emit JSON log lines on stderr (overrides CC_JSON_LOGS)
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Regulation templates
    #[command(subcommand)]
    Regulation(RegulationCommand),

    /// Academic batches and their frozen rules
    #[command(subcommand)]
    Batch(BatchCommand),

    /// Promotion eligibility
    #[command(subcommand)]
    Promote(PromoteCommand),

    /// Override ledger
    #[command(subcommand)]
    Override(OverrideCommand),
}

#[derive(Subcommand, Debug)]
pub enum RegulationCommand {
    /// Create a regulation with its rows from a JSON file
    Import {
        /// Path to the import file
        file: PathBuf,
    },
    /// Lock a regulation against further edits
    Lock {
        code: String,
        #[arg(long)]
        actor: UserId,
    },
    /// Show a regulation's rule set and its current checksum
    Show { code: String },
    /// List all regulations
    List,
}

#[derive(Subcommand, Debug)]
pub enum BatchCommand {
    /// Register a batch against a regulation
    Create(CreateBatchArgs),
    /// Freeze a registered batch
    Freeze {
        code: String,
        #[arg(long)]
        actor: UserId,
    },
    /// Recompute a frozen batch's checksum
    Verify { code: String },
    /// Show a batch, with its snapshot when frozen
    Show { code: String },
    /// List all batches
    List,
}

#[derive(Args, Debug)]
pub struct CreateBatchArgs {
    #[arg(long)]
    pub code: String,
    #[arg(long)]
    pub name: String,
    /// Regulation code
    #[arg(long)]
    pub regulation: String,
    #[arg(long)]
    pub admission_year: u16,
    /// Freeze in the same write, acting as this user
    #[arg(long)]
    pub freeze_as: Option<UserId>,
}

#[derive(Subcommand, Debug)]
pub enum PromoteCommand {
    /// Dry-run promotion of a student into the target year
    Evaluate {
        #[arg(long)]
        student: StudentId,
        #[arg(long)]
        target_year: u8,
        /// JSON file with student enrolments and semester records
        #[arg(long)]
        history: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum OverrideCommand {
    /// Record an override made outside the ledger
    Record(RecordOverrideArgs),
    /// Amend a frozen row and record the override in one write
    Apply(ApplyOverrideArgs),
    /// List a batch's overrides (batch code, or id once the batch is deleted)
    List { batch: String },
    /// Compare a batch's rows with its checksum and ledger
    Audit { code: String },
}

#[derive(Args, Debug)]
pub struct ApprovalArgs {
    #[arg(long)]
    pub reason: String,
    #[arg(long)]
    pub approver: UserId,
    #[arg(long)]
    pub document_ref: Option<String>,
}

#[derive(Args, Debug)]
pub struct RecordOverrideArgs {
    /// Batch code
    #[arg(long)]
    pub batch: String,
    #[arg(long, value_enum)]
    pub rule_type: RuleKind,
    /// Frozen row the override concerns
    #[arg(long)]
    pub rule_id: Option<uuid::Uuid>,
    /// Previous value, as JSON
    #[arg(long)]
    pub old: String,
    /// New value, as JSON
    #[arg(long)]
    pub new: String,
    #[command(flatten)]
    pub approval: ApprovalArgs,
}

#[derive(Args, Debug)]
pub struct ApplyOverrideArgs {
    /// Batch code
    #[arg(long)]
    pub batch: String,
    /// Amendment as JSON, e.g. {"kind":"SUBJECT_CREDITS","subject_id":"..","credits":3}
    #[arg(long)]
    pub amendment: String,
    #[command(flatten)]
    pub approval: ApprovalArgs,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Subject,
    Semester,
    PromotionRule,
}

impl From<RuleKind> for OverrideRuleType {
    fn from(kind: RuleKind) -> Self {
        match kind {
            RuleKind::Subject => OverrideRuleType::Subject,
            RuleKind::Semester => OverrideRuleType::Semester,
            RuleKind::PromotionRule => OverrideRuleType::PromotionRule,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_override_record() {
        let approver = UserId::new();
        let approver_arg = approver.to_string();
        let cli = Cli::try_parse_from([
            "campus-core",
            "override",
            "record",
            "--batch",
            "CSE-2024",
            "--rule-type",
            "promotion-rule",
            "--old",
            "50",
            "--new",
            "45",
            "--reason",
            "Council resolution 17",
            "--approver",
            approver_arg.as_str(),
        ])
        .unwrap();

        match cli.command {
            Command::Override(OverrideCommand::Record(args)) => {
                assert_eq!(args.batch, "CSE-2024");
                assert_eq!(args.rule_type, RuleKind::PromotionRule);
                assert_eq!(args.approval.approver, approver);
                assert_eq!(args.approval.document_ref, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
