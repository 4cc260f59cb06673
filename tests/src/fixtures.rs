//! # Test Harness
//!
//! Every service wired onto one shared store and a manual clock, plus a
//! reference regulation used throughout the suite.

use cc_01_rule_store::{
    NewPromotionRule, NewRegulation, NewSemester, NewSubject, RuleStoreApi, RuleStoreService,
};
use cc_02_freeze_engine::{FreezeConfig, FreezeEngine, FreezeEngineApi, NewBatch};
use cc_03_promotion::{InMemoryAcademicHistory, PromotionEvaluator};
use cc_04_override_ledger::{OverrideConfig, OverrideLedger, StaticApproverDirectory};
use shared_store::{KeyValueStore, ManualTimeSource};
use shared_types::{
    AcademicBatch, EvaluationScheme, MarksScheme, ProgramId, PromotionRuleType, Regulation,
    SemesterRecord, StudentId, SubjectType, UserId,
};
use std::sync::Arc;

pub const START: u64 = 1_717_200_000;

/// All services over a store of type `KV`.
pub struct Harness<KV: KeyValueStore + Clone> {
    pub store: KV,
    pub clock: Arc<ManualTimeSource>,
    pub rules: RuleStoreService<KV, Arc<ManualTimeSource>>,
    pub freeze: FreezeEngine<KV, Arc<ManualTimeSource>>,
    pub ledger: OverrideLedger<KV, Arc<ManualTimeSource>, Arc<StaticApproverDirectory>>,
    pub history: Arc<InMemoryAcademicHistory>,
    pub evaluator: PromotionEvaluator<KV, Arc<InMemoryAcademicHistory>>,
    pub approver: UserId,
    pub admin: UserId,
    pub program_id: ProgramId,
}

impl<KV: KeyValueStore + Clone> Harness<KV> {
    pub fn new(store: KV) -> Self {
        let clock = Arc::new(ManualTimeSource::new(START));
        let approver = UserId::new();
        let directory = Arc::new(StaticApproverDirectory::new([approver]));
        let history = Arc::new(InMemoryAcademicHistory::new());
        Self {
            rules: RuleStoreService::new(store.clone(), clock.clone()),
            freeze: FreezeEngine::new(store.clone(), clock.clone(), FreezeConfig::default()),
            ledger: OverrideLedger::new(
                store.clone(),
                clock.clone(),
                directory,
                OverrideConfig::default(),
            ),
            evaluator: PromotionEvaluator::new(store.clone(), history.clone()),
            history,
            store,
            clock,
            approver,
            admin: UserId::new(),
            program_id: ProgramId::new(),
        }
    }

    /// Four-year regulation: two 50-credit semesters per year for years 1
    /// and 2, three subjects, and a 50% credit rule for 1 -> 2.
    pub fn seed_regulation(&self, code: &str) -> Regulation {
        let reg = self
            .rules
            .create_regulation(NewRegulation {
                code: code.into(),
                name: format!("Regulation {}", code),
                program_id: self.program_id,
                total_credits: 200.0,
                duration_years: 4,
                semesters_per_year: 2,
                min_pass_percentage: 40.0,
                min_attendance_percentage: 75.0,
            })
            .expect("create regulation");
        let mut version = reg.version;
        for number in 1u8..=4 {
            self.rules
                .add_semester(
                    reg.id,
                    version,
                    NewSemester {
                        semester_number: number,
                        total_credits: 50.0,
                        min_credits_required: 20.0,
                    },
                )
                .expect("add semester");
            version += 1;
        }
        for (semester, code, credits) in [(1u8, "CS101", 4.0), (1, "MA101", 3.5), (2, "CS102", 4.0)] {
            self.rules
                .add_subject(
                    reg.id,
                    version,
                    NewSubject {
                        semester_number: semester,
                        code: code.into(),
                        name: format!("Subject {}", code),
                        subject_type: SubjectType::Theory,
                        credits,
                        marks: marks(),
                        evaluation_scheme: EvaluationScheme::Absolute,
                    },
                )
                .expect("add subject");
            version += 1;
        }
        self.rules
            .add_promotion_rule(
                reg.id,
                version,
                NewPromotionRule {
                    from_year: 1,
                    to_year: 2,
                    rule_type: PromotionRuleType::CreditPercentage,
                    min_credits_required: None,
                    min_credit_percentage_required: Some(50.0),
                    max_backlogs_allowed: None,
                },
            )
            .expect("add promotion rule");
        self.rules.get_regulation(reg.id).expect("reload regulation")
    }

    pub fn new_batch(&self, code: &str, regulation: &Regulation) -> NewBatch {
        NewBatch {
            code: code.into(),
            name: format!("Batch {}", code),
            program_id: self.program_id,
            admission_year: 2024,
            regulation_id: regulation.id,
        }
    }

    pub fn frozen_batch(&self, code: &str, regulation: &Regulation) -> AcademicBatch {
        self.freeze
            .register_and_freeze(self.new_batch(code, regulation), self.admin)
            .expect("register and freeze")
    }

    /// Enrol a new student with `(semester, earned, backlogs)` results.
    pub fn enrol(&self, batch: &AcademicBatch, results: &[(u8, f64, &[&str])]) -> StudentId {
        let student = StudentId::new();
        self.history.enroll(student, batch.id);
        for (semester, earned, backlogs) in results {
            self.history.record(SemesterRecord {
                student_id: student,
                semester_number: *semester,
                earned_credits: *earned,
                backlog_subjects: backlogs.iter().map(|c| c.to_string()).collect(),
            });
        }
        student
    }
}

pub fn marks() -> MarksScheme {
    MarksScheme {
        internal_max_marks: 40,
        external_max_marks: 60,
        internal_pass_marks: 16,
        external_pass_marks: 24,
        total_pass_marks: 40,
    }
}
