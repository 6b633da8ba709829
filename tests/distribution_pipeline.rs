//! Distribution pipeline integration tests
//!
//! Covers a full iApp run end to end:
//! 1. Input directory -> result.json with verifiable claims
//! 2. Determinism across input ordering and file layout
//! 3. Duplicate holder policies
//! 4. Degenerate inputs (empty, zero supply, single holder)
//! 5. Fatal boundary errors still leave a failure result behind
//! 6. Claim verification as the on-chain pool would do it

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use proptest::prelude::*;
use serde_json::{json, Value};

use arckana_aggregator::{build_distribution, DistributionReport};
use arckana_cli::{input, run, run_from, verify_claim, RunOverrides, NO_BALANCES_MESSAGE};
use arckana_core::{hash_from_hex, Address, DuplicatePolicy, U256, U512};
use arckana_prover::{merkle_leaf, verify_proof};
use arckana_settings::Settings;

fn holder(seed: u8) -> String {
    format!("0x{}", hex_byte(seed).repeat(20))
}

fn hex_byte(b: u8) -> String {
    format!("{:02x}", b)
}

fn settings_in(dir: &Path) -> Settings {
    let settings = Settings {
        input_dir: dir.join("iexec_in"),
        output_dir: dir.join("iexec_out"),
        ..Settings::default()
    };
    fs::create_dir_all(&settings.input_dir).unwrap();
    settings
}

fn write_protected(settings: &Settings, records: Value) {
    fs::write(
        settings.input_dir.join(input::PROTECTED_DATA_FILE),
        records.to_string(),
    )
    .unwrap();
}

fn write_pool(settings: &Settings, pool: &str) {
    fs::write(settings.input_dir.join(input::ARGS_FILE), pool).unwrap();
}

fn read_result(settings: &Settings) -> DistributionReport {
    serde_json::from_str(&fs::read_to_string(settings.result_path()).unwrap()).unwrap()
}

fn assert_claims_verify(report: &DistributionReport) {
    let root = hash_from_hex(&report.merkle_root).unwrap();
    for claim in &report.distribution {
        let leaf = merkle_leaf(&claim.holder, &claim.amount);
        let proof: Vec<_> = claim.proof.iter().map(|p| hash_from_hex(p).unwrap()).collect();
        assert!(
            verify_proof(&root, &leaf, &proof),
            "claim for {} should verify",
            claim.holder
        );
    }
}

fn sum_amounts(report: &DistributionReport) -> U512 {
    report
        .distribution
        .iter()
        .fold(U512::zero(), |acc, c| acc + c.amount.widen())
}

// ============================================================================
// 1. Full run
// ============================================================================

#[test]
fn test_run_exact_shares() {
    arckana_logging::init_test();
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path());
    write_protected(
        &settings,
        json!([
            { "holder": holder(0xA1), "balance": 100 },
            { "holder": holder(0xB2), "balance": "300" }
        ]),
    );
    write_pool(&settings, "1000\n");

    let report = run(&settings, None).unwrap();
    assert_eq!(report, read_result(&settings));

    assert!(report.success);
    assert_eq!(report.holder_count, 2);
    assert_eq!(report.total_supply, U512::from(400u64));
    assert_eq!(report.total_distributed, U256::from(1000u64));
    assert_eq!(report.distribution[0].amount, U256::from(250u64));
    assert_eq!(report.distribution[1].amount, U256::from(750u64));
    assert_claims_verify(&report);

    let computed: Value =
        serde_json::from_str(&fs::read_to_string(settings.computed_path()).unwrap()).unwrap();
    assert_eq!(
        computed["deterministic-output-path"],
        settings.result_path().to_string_lossy().as_ref()
    );
}

#[test]
fn test_run_dust_to_smallest_address_among_ties() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path());
    write_protected(
        &settings,
        json!([
            { "holder": holder(0x0C), "balance": 1 },
            { "holder": holder(0x0A), "balance": 1 },
            { "holder": holder(0x0B), "balance": 1 }
        ]),
    );
    write_pool(&settings, "100");

    let report = run(&settings, None).unwrap();
    let amounts: Vec<U256> = report.distribution.iter().map(|c| c.amount).collect();
    assert_eq!(
        amounts,
        vec![U256::from(34u64), U256::from(33u64), U256::from(33u64)]
    );
    assert_eq!(report.distribution[0].holder.to_string(), holder(0x0A));
    assert_eq!(sum_amounts(&report), U512::from(100u64));
    // Three leaves: the odd tail still gets one sibling per level
    assert!(report.distribution.iter().all(|c| c.proof.len() == 2));
    assert_claims_verify(&report);
}

#[test]
fn test_run_wide_json_number_balances() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path());
    // 100 and 300 tokens at 18 decimals, written as bare JSON numbers
    let records = format!(
        r#"[{{"holder":"{}","balance":100000000000000000000}},{{"holder":"{}","balance":300000000000000000000}}]"#,
        holder(0xA1),
        holder(0xB2)
    );
    fs::write(settings.input_dir.join(input::PROTECTED_DATA_FILE), records).unwrap();

    let report = run(&settings, Some(U256::from(1000u64))).unwrap();
    assert_eq!(report.holder_count, 2);
    assert_eq!(report.total_supply, U512::from(400u64) * U512::exp10(18));
    assert_eq!(report.distribution[0].amount, U256::from(250u64));
    assert_eq!(report.distribution[1].amount, U256::from(750u64));
}

#[test]
fn test_run_skips_malformed_records() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path());
    write_protected(
        &settings,
        json!([
            { "holder": holder(1), "balance": 10 },
            { "holder": "0xnothex", "balance": 10 },
            { "holder": holder(2), "balance": -4 },
            { "holder": holder(3), "balance": 2.5 },
            { "holder": holder(4) },
            "not an object",
            { "holder": holder(5), "balance": 30 }
        ]),
    );

    let report = run(&settings, Some(U256::from(4000u64))).unwrap();
    assert_eq!(report.holder_count, 2);
    assert_eq!(report.distribution[0].amount, U256::from(1000u64));
    assert_eq!(report.distribution[1].amount, U256::from(3000u64));
}

#[test]
fn test_run_uses_default_pool_without_args() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path());
    write_protected(&settings, json!({ "holder": holder(9), "balance": 1 }));

    let report = run(&settings, None).unwrap();
    assert_eq!(report.total_distributed, U256::from(1_000_000_000u64));
}

#[test]
fn test_run_large_balances_stay_exact() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path());
    let max = U256::MAX.to_string();
    write_protected(
        &settings,
        json!([
            { "holder": holder(1), "balance": max },
            { "holder": holder(2), "balance": max },
            { "holder": holder(3), "balance": "7" }
        ]),
    );
    write_pool(&settings, &max);

    let report = run(&settings, None).unwrap();
    assert_eq!(sum_amounts(&report), U256::MAX.widen());
    assert_claims_verify(&report);
}

// ============================================================================
// 2. Determinism
// ============================================================================

#[test]
fn test_root_independent_of_record_order_and_layout() {
    let records = vec![
        json!({ "holder": holder(0x10), "balance": 5 }),
        json!({ "holder": holder(0x20), "balance": 7 }),
        json!({ "holder": holder(0x30), "balance": 11 }),
        json!({ "holder": holder(0x40), "balance": 13 }),
        json!({ "holder": holder(0x50), "balance": 17 }),
    ];

    // One bulk file, forward order
    let dir_a = tempfile::tempdir().unwrap();
    let settings_a = settings_in(dir_a.path());
    write_protected(&settings_a, Value::Array(records.clone()));
    let report_a = run(&settings_a, Some(U256::from(1_000_001u64))).unwrap();

    // One file per holder, names reversing the order
    let dir_b = tempfile::tempdir().unwrap();
    let settings_b = settings_in(dir_b.path());
    for (i, record) in records.iter().enumerate() {
        let name = format!("{}.json", records.len() - i);
        fs::write(settings_b.input_dir.join(name), record.to_string()).unwrap();
    }
    let report_b = run(&settings_b, Some(U256::from(1_000_001u64))).unwrap();

    assert_eq!(report_a.merkle_root, report_b.merkle_root);
    assert_eq!(report_a, report_b);
}

#[test]
fn test_address_case_does_not_change_root() {
    let mut lower = BTreeMap::new();
    lower.insert(holder(0xAB).parse::<Address>().unwrap(), U256::from(3u64));
    let upper_str = holder(0xAB).to_uppercase().replace("0X", "0x");
    let mut upper = BTreeMap::new();
    upper.insert(upper_str.parse::<Address>().unwrap(), U256::from(3u64));

    let a = build_distribution(&lower, U256::from(10u64)).unwrap();
    let b = build_distribution(&upper, U256::from(10u64)).unwrap();
    assert_eq!(a.root, b.root);
}

// ============================================================================
// 3. Duplicate policies
// ============================================================================

fn duplicate_records() -> Value {
    json!([
        { "holder": holder(1), "balance": 10 },
        { "holder": holder(2), "balance": 60 },
        { "holder": holder(1).to_uppercase().replace("0X", "0x"), "balance": 30 }
    ])
}

#[test]
fn test_duplicates_last_wins() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path());
    write_protected(&settings, duplicate_records());

    let report = run(&settings, Some(U256::from(90u64))).unwrap();
    assert_eq!(report.holder_count, 2);
    assert_eq!(report.total_supply, U512::from(90u64));
    assert_eq!(report.distribution[0].amount, U256::from(30u64));
}

#[test]
fn test_duplicates_merge() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings {
        duplicate_policy: DuplicatePolicy::Merge,
        ..settings_in(dir.path())
    };
    write_protected(&settings, duplicate_records());

    let report = run(&settings, Some(U256::from(100u64))).unwrap();
    assert_eq!(report.total_supply, U512::from(100u64));
    assert_eq!(report.distribution[0].amount, U256::from(40u64));
}

#[test]
fn test_duplicates_reject_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings {
        duplicate_policy: DuplicatePolicy::Reject,
        ..settings_in(dir.path())
    };
    write_protected(&settings, duplicate_records());

    assert!(run(&settings, Some(U256::from(100u64))).is_err());
    let written = read_result(&settings);
    assert!(!written.success);
    assert!(written.distribution.is_empty());
    assert!(written.error.unwrap().contains("Duplicate holder"));
}

// ============================================================================
// 4. Degenerate inputs
// ============================================================================

#[test]
fn test_empty_input_structured_failure() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path());

    let report = run(&settings, None).unwrap();
    assert!(!report.success);
    assert_eq!(report.error.as_deref(), Some(NO_BALANCES_MESSAGE));
    assert_eq!(report.merkle_root, format!("0x{}", "0".repeat(64)));
    assert_eq!(report.holder_count, 0);

    let raw: Value =
        serde_json::from_str(&fs::read_to_string(settings.result_path()).unwrap()).unwrap();
    assert_eq!(raw["success"], false);
    assert_eq!(raw["holder_count"], 0);
}

#[test]
fn test_zero_supply_leaves_pool_undistributed() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path());
    write_protected(
        &settings,
        json!([
            { "holder": holder(1), "balance": 0 },
            { "holder": holder(2), "balance": "0" }
        ]),
    );

    let report = run(&settings, Some(U256::from(500u64))).unwrap();
    assert!(report.success);
    assert!(report.distribution.iter().all(|c| c.amount.is_zero()));
    assert_eq!(report.total_distributed, U256::zero());
    assert_eq!(report.undistributed, Some(U256::from(500u64)));
    assert_claims_verify(&report);
}

#[test]
fn test_single_holder_root_is_leaf() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path());
    write_protected(&settings, json!([{ "holder": holder(0x77), "balance": 12 }]));

    let report = run(&settings, Some(U256::from(999u64))).unwrap();
    let claim = &report.distribution[0];
    assert_eq!(claim.amount, U256::from(999u64));
    assert!(claim.proof.is_empty());
    assert_eq!(
        hash_from_hex(&report.merkle_root).unwrap(),
        merkle_leaf(&claim.holder, &claim.amount)
    );
}

// ============================================================================
// 5. Fatal boundary errors
// ============================================================================

fn overrides_in(dir: &Path) -> RunOverrides {
    let input_dir = dir.join("iexec_in");
    fs::create_dir_all(&input_dir).unwrap();
    RunOverrides {
        input_dir: Some(input_dir),
        output_dir: Some(dir.join("iexec_out")),
        ..RunOverrides::default()
    }
}

fn read_failure(dir: &Path) -> Value {
    let out = dir.join("iexec_out");
    assert!(out.join("computed.json").is_file());
    serde_json::from_str(&fs::read_to_string(out.join("result.json")).unwrap()).unwrap()
}

#[test]
fn test_pool_flag_out_of_range_writes_failure() {
    let dir = tempfile::tempdir().unwrap();
    let overrides = RunOverrides {
        pool: Some("9".repeat(90)),
        ..overrides_in(dir.path())
    };
    fs::write(
        dir.path().join("iexec_in").join(input::PROTECTED_DATA_FILE),
        json!({ "holder": holder(1), "balance": 1 }).to_string(),
    )
    .unwrap();

    assert!(run_from(&overrides).is_err());
    let result = read_failure(dir.path());
    assert_eq!(result["success"], false);
    assert_eq!(result["merkle_root"], format!("0x{}", "0".repeat(64)));
    assert!(result["error"].as_str().unwrap().contains("does not fit in 256 bits"));
    assert_eq!(result["distribution"], json!([]));
}

#[test]
fn test_pool_flag_not_a_number_writes_failure() {
    let dir = tempfile::tempdir().unwrap();
    let overrides = RunOverrides {
        pool: Some("lots".to_string()),
        ..overrides_in(dir.path())
    };

    assert!(run_from(&overrides).is_err());
    assert_eq!(read_failure(dir.path())["success"], false);
}

#[test]
fn test_broken_settings_file_writes_failure() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("settings.json");
    fs::write(&config, "{ not json").unwrap();
    let overrides = RunOverrides {
        config: Some(config),
        ..overrides_in(dir.path())
    };

    assert!(run_from(&overrides).is_err());
    let result = read_failure(dir.path());
    assert_eq!(result["success"], false);
    assert!(result["error"].as_str().unwrap().contains("Failed to load settings"));
}

#[test]
fn test_run_from_applies_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let overrides = RunOverrides {
        pool: Some("90".to_string()),
        duplicate_policy: Some(DuplicatePolicy::Merge),
        ..overrides_in(dir.path())
    };
    fs::write(
        dir.path().join("iexec_in").join(input::PROTECTED_DATA_FILE),
        duplicate_records().to_string(),
    )
    .unwrap();

    let report = run_from(&overrides).unwrap();
    assert_eq!(report.total_supply, U512::from(100u64));
    assert_eq!(report.total_distributed, U256::from(90u64));
    assert!(dir.path().join("iexec_out").join("result.json").is_file());
}

// ============================================================================
// 6. Claim verification
// ============================================================================

#[test]
fn test_verify_claim_against_run_output() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path());
    write_protected(
        &settings,
        json!([
            { "holder": holder(1), "balance": 1 },
            { "holder": holder(2), "balance": 2 },
            { "holder": holder(3), "balance": 3 }
        ]),
    );
    let report = run(&settings, Some(U256::from(6_000_000u64))).unwrap();

    for claim in &report.distribution {
        let amount = claim.amount.to_string();
        assert!(verify_claim(&report.merkle_root, &claim.holder.to_string(), &amount, &claim.proof).unwrap());

        let inflated = (claim.amount + U256::one()).to_string();
        assert!(!verify_claim(&report.merkle_root, &claim.holder.to_string(), &inflated, &claim.proof).unwrap());
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_distribution_sums_and_verifies(
        entries in prop::collection::btree_map(any::<[u8; 20]>(), any::<u64>(), 1..25),
        pool in any::<u64>(),
    ) {
        let balances: BTreeMap<Address, U256> = entries
            .into_iter()
            .map(|(a, b)| (Address::new(a), U256::from(b)))
            .collect();
        let dist = build_distribution(&balances, U256::from(pool)).unwrap();

        let sum = dist.entries.iter().fold(U512::zero(), |acc, e| acc + e.amount.widen());
        if dist.allocation.total_supply.is_zero() {
            prop_assert!(sum.is_zero());
        } else {
            prop_assert_eq!(sum, U512::from(pool));
        }
        for entry in &dist.entries {
            prop_assert!(verify_proof(&dist.root, &entry.leaf, &entry.proof));
        }
    }
}
