//! Command dispatch. Every command returns the JSON document printed on
//! stdout.

use crate::cli::{
    ApplyOverrideArgs, ApprovalArgs, BatchCommand, Command, CreateBatchArgs, OverrideCommand,
    PromoteCommand, RecordOverrideArgs, RegulationCommand,
};
use crate::container::CoreContainer;
use crate::import::{import_regulation, RegulationImport};
use anyhow::{Context, Result};
use cc_01_rule_store::RuleStoreApi;
use cc_02_freeze_engine::{checksum_rule_set, FreezeEngineApi, NewBatch};
use cc_03_promotion::{InMemoryAcademicHistory, PromotionApi, StudentHistory};
use cc_04_override_ledger::{AmendmentRequest, Approval, NewOverride, OverrideLedgerApi};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use shared_types::BatchId;
use std::path::Path;

pub fn execute(container: &CoreContainer, command: Command) -> Result<Value> {
    match command {
        Command::Regulation(cmd) => regulation(container, cmd),
        Command::Batch(cmd) => batch(container, cmd),
        Command::Promote(cmd) => promote(container, cmd),
        Command::Override(cmd) => override_ledger(container, cmd),
    }
}

fn regulation(container: &CoreContainer, command: RegulationCommand) -> Result<Value> {
    let rules = &container.rules;
    match command {
        RegulationCommand::Import { file } => {
            let import: RegulationImport = read_json(&file)?;
            let rule_set = import_regulation(rules, import).context("import failed")?;
            Ok(serde_json::to_value(rule_set)?)
        }
        RegulationCommand::Lock { code, actor } => {
            let regulation = rules.find_regulation_by_code(&code)?;
            Ok(serde_json::to_value(rules.lock_regulation(regulation.id, actor)?)?)
        }
        RegulationCommand::Show { code } => {
            let regulation = rules.find_regulation_by_code(&code)?;
            let rule_set = rules.load_rule_set(regulation.id)?;
            Ok(json!({
                "checksum": checksum_rule_set(&rule_set),
                "rule_set": rule_set,
            }))
        }
        RegulationCommand::List => Ok(serde_json::to_value(rules.list_regulations()?)?),
    }
}

fn batch(container: &CoreContainer, command: BatchCommand) -> Result<Value> {
    let engine = &container.freeze;
    match command {
        BatchCommand::Create(args) => create_batch(container, args),
        BatchCommand::Freeze { code, actor } => {
            let batch = engine.find_batch_by_code(&code)?;
            Ok(serde_json::to_value(engine.freeze(batch.id, actor)?)?)
        }
        BatchCommand::Verify { code } => {
            let batch = engine.find_batch_by_code(&code)?;
            Ok(serde_json::to_value(engine.verify_integrity(batch.id)?)?)
        }
        BatchCommand::Show { code } => {
            let batch = engine.find_batch_by_code(&code)?;
            if batch.is_frozen() {
                Ok(serde_json::to_value(engine.load_snapshot(batch.id)?)?)
            } else {
                Ok(serde_json::to_value(batch)?)
            }
        }
        BatchCommand::List => Ok(serde_json::to_value(engine.list_batches()?)?),
    }
}

fn create_batch(container: &CoreContainer, args: CreateBatchArgs) -> Result<Value> {
    let regulation = container.rules.find_regulation_by_code(&args.regulation)?;
    let new = NewBatch {
        code: args.code,
        name: args.name,
        program_id: regulation.program_id,
        admission_year: args.admission_year,
        regulation_id: regulation.id,
    };
    let batch = match args.freeze_as {
        Some(actor) => container.freeze.register_and_freeze(new, actor)?,
        None => container.freeze.register_batch(new)?,
    };
    Ok(serde_json::to_value(batch)?)
}

fn promote(container: &CoreContainer, command: PromoteCommand) -> Result<Value> {
    match command {
        PromoteCommand::Evaluate {
            student,
            target_year,
            history,
        } => {
            let histories: Vec<StudentHistory> = read_json(&history)?;
            let evaluator = container.evaluator(InMemoryAcademicHistory::from_histories(histories));
            Ok(serde_json::to_value(evaluator.evaluate(student, target_year, true)?)?)
        }
    }
}

fn override_ledger(container: &CoreContainer, command: OverrideCommand) -> Result<Value> {
    let ledger = &container.ledger;
    match command {
        OverrideCommand::Record(args) => record_override(container, args),
        OverrideCommand::Apply(args) => apply_override(container, args),
        OverrideCommand::List { batch } => {
            let batch_id = match batch.parse::<BatchId>() {
                Ok(id) => id,
                Err(_) => container.freeze.find_batch_by_code(&batch)?.id,
            };
            Ok(serde_json::to_value(ledger.list_overrides(batch_id)?)?)
        }
        OverrideCommand::Audit { code } => {
            let batch = container.freeze.find_batch_by_code(&code)?;
            Ok(serde_json::to_value(ledger.audit_batch(batch.id)?)?)
        }
    }
}

fn record_override(container: &CoreContainer, args: RecordOverrideArgs) -> Result<Value> {
    let batch = container.freeze.find_batch_by_code(&args.batch)?;
    let new = NewOverride {
        batch_id: batch.id,
        rule_type: args.rule_type.into(),
        rule_id: args.rule_id,
        old_value: parse_value("--old", &args.old)?,
        new_value: parse_value("--new", &args.new)?,
        approval: approval(args.approval),
    };
    Ok(serde_json::to_value(container.ledger.record_override(new)?)?)
}

fn apply_override(container: &CoreContainer, args: ApplyOverrideArgs) -> Result<Value> {
    let batch = container.freeze.find_batch_by_code(&args.batch)?;
    let amendment = serde_json::from_str(&args.amendment).context("invalid --amendment")?;
    let request = AmendmentRequest {
        batch_id: batch.id,
        amendment,
        approval: approval(args.approval),
    };
    Ok(serde_json::to_value(container.ledger.apply_override(request)?)?)
}

fn approval(args: ApprovalArgs) -> Approval {
    Approval {
        reason: args.reason,
        approved_by_id: args.approver,
        document_ref: args.document_ref,
    }
}

/// Parse a JSON argument, treating anything that is not valid JSON as a
/// plain string.
fn parse_value(flag: &str, raw: &str) -> Result<Value> {
    if raw.trim().is_empty() {
        anyhow::bail!("{} must not be empty", flag);
    }
    Ok(serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("failed to parse {}", path.display()))
}
