// check_flow.rs — End-to-end integration test for the consistency check flow.
//
// Drives the whole core through the same artifacts a real run touches:
// ontology files on disk, extraction-output JSON, a pipeline config, and
// the three report files. The reasoning itself never does I/O; this test
// proves the seams between loading, reasoning, and reporting line up.
//
// Flow:
//   1. Write vocab.json + compatibility_rules.json (ontology storage)
//   2. Write fp/tp extraction output (the extraction collaborator's JSON)
//   3. Load everything and run the comparison
//   4. Check findings pair by pair
//   5. Render and re-read the machine report

use std::fs;

use concord_engine::StructuralVerifier;
use concord_pipeline::{
    build_human_report, build_machine_report, build_run_summary, load_operations, run_comparison,
    PipelineConfig,
};
use tempfile::TempDir;

const VOCAB: &str = r#"{
    "actions": [
        {"uri": "action:share", "label": "share", "alt_labels": ["disclose to"]},
        {"uri": "action:collect", "label": "collect"}
    ],
    "subjects": [
        {"uri": "subject:identifier", "label": "identifier"},
        {"uri": "subject:device_id", "label": "device identifier", "parent": "subject:identifier"}
    ],
    "purposes": [
        {"uri": "purpose:advertising", "label": "advertising"},
        {"uri": "purpose:marketing", "label": "marketing"},
        {"uri": "purpose:analytics", "label": "analytics"}
    ],
    "views": [
        {"uri": "view:may", "label": "may"},
        {"uri": "view:do_not", "label": "do not"}
    ]
}"#;

const RULES: &str = r#"{
    "purpose_subsumption": [
        {"parent": "purpose:advertising", "child": "purpose:marketing"}
    ],
    "subject_subsumption": []
}"#;

// Three first-party claims: a share for analytics, a share the policy
// prohibits, and a collection for advertising (broad enough to cover
// marketing via the rule edge above).
const FP_OPS: &str = r#"[
    {
        "op_id": "fp_1",
        "statement_id": "stmt_1",
        "action": {"label": "share"},
        "subject": {"label": "device identifier"},
        "view": {"label": "may"},
        "purposes": [{"label": "analytics"}],
        "evidence_spans": [{
            "policy_id": "fp_policy",
            "section_id": "sec_3",
            "section_path": "Privacy Policy > Sharing",
            "start_char": 120,
            "end_char": 178,
            "quote": "we may share device identifiers with partners for analytics"
        }]
    },
    {
        "op_id": "fp_2",
        "statement_id": "stmt_2",
        "action": {"label": "share"},
        "subject": {"label": "identifier"},
        "view": {"label": "do not"},
        "purposes": [{"label": "advertising"}],
        "evidence_spans": [{
            "policy_id": "fp_policy",
            "section_id": "sec_4",
            "section_path": "Privacy Policy > Your Choices",
            "start_char": 10,
            "end_char": 64,
            "quote": "we do not share identifiers for advertising purposes"
        }]
    },
    {
        "op_id": "fp_3",
        "statement_id": "stmt_3",
        "action": {"label": "collect"},
        "subject": {"label": "device identifier"},
        "view": {"label": "may"},
        "purposes": [{"label": "advertising"}],
        "evidence_spans": [{
            "policy_id": "fp_policy",
            "section_id": "sec_1",
            "section_path": "Privacy Policy > Collection",
            "start_char": 0,
            "end_char": 52,
            "quote": "we collect device identifiers for advertising"
        }]
    }
]"#;

const TP_OPS: &str = r#"[
    {
        "op_id": "tp_1",
        "statement_id": "stmt_1",
        "action": {"label": "collect"},
        "subject": {"label": "device identifier"},
        "view": {"label": "may"},
        "purposes": [{"label": "advertising"}, {"label": "analytics"}],
        "evidence_spans": [{
            "policy_id": "tp_policy",
            "section_id": "sec_2",
            "section_path": "SDK Policy > Data We Collect",
            "start_char": 40,
            "end_char": 101,
            "quote": "the SDK collects device identifiers for advertising and analytics"
        }]
    },
    {
        "op_id": "tp_2",
        "statement_id": "stmt_2",
        "action": {"label": "share"},
        "subject": {"label": "identifier"},
        "view": {"label": "may"},
        "purposes": [{"label": "advertising"}],
        "evidence_spans": [{
            "policy_id": "tp_policy",
            "section_id": "sec_5",
            "section_path": "SDK Policy > Sharing",
            "start_char": 0,
            "end_char": 47,
            "quote": "we may share identifiers with advertising partners"
        }]
    },
    {
        "op_id": "tp_3",
        "statement_id": "stmt_3",
        "action": {"label": "collect"},
        "subject": {"label": "device identifier"},
        "view": {"label": "may"},
        "purposes": [{"label": "marketing"}],
        "evidence_spans": [{
            "policy_id": "tp_policy",
            "section_id": "sec_2",
            "section_path": "SDK Policy > Data We Collect",
            "start_char": 102,
            "end_char": 150,
            "quote": "device identifiers may also be used for marketing"
        }]
    }
]"#;

#[test]
fn check_flow_files_to_reports() {
    // =========================================================
    // 1. Ontology storage and extraction output on disk
    // =========================================================

    let dir = TempDir::new().unwrap();
    let vocab_path = dir.path().join("vocab.json");
    let rules_path = dir.path().join("compatibility_rules.json");
    let fp_path = dir.path().join("fp.operations.json");
    let tp_path = dir.path().join("tp.operations.json");
    fs::write(&vocab_path, VOCAB).unwrap();
    fs::write(&rules_path, RULES).unwrap();
    fs::write(&fp_path, FP_OPS).unwrap();
    fs::write(&tp_path, TP_OPS).unwrap();

    let config_path = dir.path().join("pipeline.yaml");
    fs::write(&config_path, "reasoning:\n  min_alignment_score: 1.25\n").unwrap();

    // =========================================================
    // 2. Load and run the comparison
    // =========================================================

    let vocab = concord_ontology::load_vocab(&vocab_path).unwrap();
    let rules = concord_ontology::load_rules(&rules_path).unwrap();
    let config = PipelineConfig::load(&config_path).unwrap();
    let fp_ops = load_operations(&fp_path).unwrap();
    let tp_ops = load_operations(&tp_path).unwrap();

    let outcome = run_comparison(
        &fp_ops,
        &tp_ops,
        &vocab,
        &rules,
        &config,
        None,
        &StructuralVerifier,
    );

    // =========================================================
    // 3. Alignment: each third-party op claimed at most once
    // =========================================================

    assert!(!outcome.blocking_errors);
    assert_eq!(outcome.aligned.len(), 3);
    let mut claimed: Vec<&str> = outcome.aligned.iter().map(|p| p.tp_op_id.as_str()).collect();
    claimed.sort();
    claimed.dedup();
    assert_eq!(claimed.len(), 3);

    // =========================================================
    // 4. Findings, pair by pair
    // =========================================================

    assert_eq!(outcome.findings.len(), 3);
    for finding in &outcome.findings {
        assert!(!finding.fp_evidence.is_empty());
        assert!(!finding.tp_evidence.is_empty());
    }

    let by_fp = |fp_op_id: &str| {
        outcome
            .findings
            .iter()
            .find(|f| f.fp_op_id.as_deref() == Some(fp_op_id))
            .unwrap()
    };

    // fp_1 shares for analytics only; tp_1 adds advertising → overreach.
    let mismatch = by_fp("fp_1");
    assert_eq!(mismatch.finding_type.to_string(), "purpose_mismatch");
    assert_eq!(
        mismatch.metadata["excess_purposes"],
        serde_json::json!(["purpose:advertising"])
    );

    // fp_2 prohibits the sharing tp_2 declares → contradiction.
    let contradiction = by_fp("fp_2");
    assert_eq!(
        contradiction.finding_type.to_string(),
        "inconsistent_requirement"
    );
    assert_eq!(
        contradiction.status.to_string(),
        "potentially_non_compliant"
    );

    // fp_3 discloses advertising, which subsumes tp_3's marketing via
    // the rule edge → consistent.
    let satisfied = by_fp("fp_3");
    assert_eq!(satisfied.finding_type.to_string(), "satisfied_requirement");
    assert_eq!(satisfied.status.to_string(), "consistent");

    // =========================================================
    // 5. Reports render and round-trip
    // =========================================================

    let machine = build_machine_report(&outcome, "fp_policy", "tp_policy");
    let summary = build_run_summary(&outcome, &config);
    let human = build_human_report(&outcome);

    let out = dir.path().join("out");
    fs::create_dir_all(&out).unwrap();
    fs::write(
        out.join("report.machine.json"),
        serde_json::to_string_pretty(&machine).unwrap(),
    )
    .unwrap();
    fs::write(out.join("report.human.txt"), &human).unwrap();
    fs::write(
        out.join("summary.json"),
        serde_json::to_string_pretty(&summary).unwrap(),
    )
    .unwrap();

    let reread: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("report.machine.json")).unwrap())
            .unwrap();
    assert_eq!(reread["first_party_policy_id"], "fp_policy");
    assert_eq!(reread["third_party_policy_id"], "tp_policy");
    assert_eq!(reread["findings"].as_array().unwrap().len(), 3);

    assert!(human.contains("purpose_mismatch"));
    assert!(human.contains("we do not share identifiers for advertising purposes"));

    let summary_json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("summary.json")).unwrap()).unwrap();
    assert_eq!(summary_json["reason"]["aligned_pairs"], 3);
    assert_eq!(summary_json["validate"]["blocking_errors"], false);
}

#[test]
fn blocked_run_reports_no_findings() {
    let dir = TempDir::new().unwrap();
    let vocab_path = dir.path().join("vocab.json");
    let rules_path = dir.path().join("compatibility_rules.json");
    fs::write(&vocab_path, VOCAB).unwrap();
    fs::write(&rules_path, RULES).unwrap();

    // An action the vocabulary cannot canonicalize → error-level issue.
    let fp_path = dir.path().join("fp.operations.json");
    fs::write(
        &fp_path,
        r#"[{
            "op_id": "fp_1",
            "statement_id": "stmt_1",
            "action": {"label": "transmogrify"},
            "subject": {"label": "device identifier"},
            "view": {"label": "may"},
            "purposes": [],
            "evidence_spans": [{
                "policy_id": "fp_policy",
                "section_id": "sec_1",
                "section_path": "Policy",
                "start_char": 0,
                "end_char": 10,
                "quote": "quote"
            }]
        }]"#,
    )
    .unwrap();
    let tp_path = dir.path().join("tp.operations.json");
    fs::write(&tp_path, TP_OPS).unwrap();

    let vocab = concord_ontology::load_vocab(&vocab_path).unwrap();
    let rules = concord_ontology::load_rules(&rules_path).unwrap();
    let fp_ops = load_operations(&fp_path).unwrap();
    let tp_ops = load_operations(&tp_path).unwrap();

    let outcome = run_comparison(
        &fp_ops,
        &tp_ops,
        &vocab,
        &rules,
        &PipelineConfig::default(),
        None,
        &StructuralVerifier,
    );

    assert!(outcome.blocking_errors);
    assert!(outcome.aligned.is_empty());
    assert!(outcome.findings.is_empty());

    let human = build_human_report(&outcome);
    assert!(human.contains("blocking errors"));
    assert!(human.contains("Findings: none."));
}
