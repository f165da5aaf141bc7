//! End-to-end CLI tests for kbrag.
//!
//! These tests exercise the full CLI binary with isolated test environments.
//! Each test creates its own temporary knowledge file and config to ensure isolation.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

// =============================================================================
// Test Environment Helper
// =============================================================================

/// Isolated test environment with its own knowledge file and config.
struct TestEnv {
    _temp_dir: TempDir,
    knowledge_path: PathBuf,
    config_path: PathBuf,
}

impl TestEnv {
    /// Create a test environment whose config points at a knowledge file
    /// that does not exist yet.
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();

        let knowledge_path = root.join("data").join("knowledge.json");

        let config_path = root.join("config.toml");
        let config_content = format!(
            "[knowledge]\nfile = \"{}\"\n",
            knowledge_path.display()
        );
        fs::write(&config_path, config_content).expect("Failed to write config");

        Self {
            _temp_dir: temp_dir,
            knowledge_path,
            config_path,
        }
    }

    /// Create a test environment with a small fictional universe.
    fn with_entries() -> Self {
        let env = Self::new();
        env.write_knowledge(
            r#"{
    "character_aris_thorne": {
        "keywords": ["aris", "thorne", "xenobotanist"],
        "content": "Dr. Aris Thorne is the lead xenobotanist of the Kepler expedition.",
        "category": "character"
    },
    "location_kepler_station": {
        "keywords": ["kepler", "station"],
        "content": "Kepler Station orbits the gas giant Vesper.",
        "category": "location"
    },
    "character_mira_vance": {
        "keywords": ["mira", "vance", "pilot"],
        "content": "Mira Vance pilots the shuttle Corvid.",
        "category": "character"
    },
    "glossary_vesper": {
        "keywords": ["vesper"],
        "content": "Vesper is a gas giant."
    }
}"#,
        );
        env
    }

    fn write_knowledge(&self, contents: &str) {
        if let Some(parent) = self.knowledge_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create data dir");
        }
        fs::write(&self.knowledge_path, contents).expect("Failed to write knowledge file");
    }

    fn write_config(&self, extra: &str) {
        let config_content = format!(
            "[knowledge]\nfile = \"{}\"\n{extra}",
            self.knowledge_path.display()
        );
        fs::write(&self.config_path, config_content).expect("Failed to write config");
    }

    /// Get a Command configured for this test environment.
    fn command(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("kbrag");
        cmd.env("KBRAG_CONFIG", &self.config_path);
        cmd.env_remove("RUST_LOG");
        cmd
    }
}

// =============================================================================
// 1. Help / No Command Tests
// =============================================================================

#[test]
fn tc_1_1_no_subcommand_shows_help() {
    let env = TestEnv::new();

    env.command()
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("context"))
        .stdout(predicate::str::contains("categories"));
}

#[test]
fn tc_1_2_version_flag() {
    let env = TestEnv::new();

    env.command()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("kbrag"));
}

// =============================================================================
// 2. Search Command Tests
// =============================================================================

#[test]
fn tc_2_1_search_with_match() {
    let env = TestEnv::with_entries();

    env.command()
        .args(["search", "Who is Dr. Aris Thorne?"])
        .assert()
        .success()
        .stdout(predicate::str::contains("character_aris_thorne"))
        .stdout(predicate::str::contains("Relevance: 0.67"))
        .stdout(predicate::str::contains("Keywords: aris, thorne"))
        .stdout(predicate::str::contains("1 result(s) found"));
}

#[test]
fn tc_2_2_search_with_no_matches() {
    let env = TestEnv::with_entries();

    env.command()
        .args(["search", "sourdough baking"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "No matches found for 'sourdough baking'",
        ));
}

#[test]
fn tc_2_3_search_with_limit() {
    let env = TestEnv::with_entries();

    env.command()
        .args(["search", "kepler station vesper", "--limit", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("location_kepler_station"))
        .stdout(predicate::str::contains("1 result(s) found"));
}

#[test]
fn tc_2_4_search_zero_limit() {
    let env = TestEnv::with_entries();

    env.command()
        .args(["search", "kepler", "--limit", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No matches found"));
}

#[test]
fn tc_2_5_search_negative_limit_is_configuration_error() {
    let env = TestEnv::with_entries();

    env.command()
        .args(["search", "kepler", "--limit", "-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_results"));
}

#[test]
fn tc_2_6_search_min_relevance_filters() {
    let env = TestEnv::with_entries();

    env.command()
        .args(["search", "aris", "--min-relevance", "0.5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No matches found"));
}

#[test]
fn tc_2_7_search_query_too_long() {
    let env = TestEnv::with_entries();
    let long_query = "a".repeat(1001);

    env.command()
        .args(["search", &long_query])
        .assert()
        .failure()
        .stderr(predicate::str::contains("too long"));
}

#[test]
fn tc_2_8_search_missing_knowledge_file() {
    let env = TestEnv::new();

    env.command()
        .args(["search", "kepler"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load knowledge base"));
}

#[test]
fn tc_2_9_search_invalid_knowledge_file() {
    let env = TestEnv::new();
    env.write_knowledge("not valid json");

    env.command()
        .args(["search", "kepler"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse knowledge source"));
}

#[test]
fn tc_2_10_search_with_rag_disabled() {
    let env = TestEnv::with_entries();

    env.command()
        .args(["--no-rag", "search", "aris thorne"])
        .assert()
        .success()
        .stdout(predicate::str::contains("disabled"));
}

#[test]
fn tc_2_11_verbose_logs_tokens_to_stderr() {
    let env = TestEnv::with_entries();

    env.command()
        .args(["--verbose", "search", "Who is Dr. Aris Thorne?"])
        .assert()
        .success()
        .stderr(predicate::str::contains("character_aris_thorne"))
        .stdout(predicate::str::contains("1 result(s) found"));
}

// =============================================================================
// 3. Context Command Tests
// =============================================================================

#[test]
fn tc_3_1_context_block_for_match() {
    let env = TestEnv::with_entries();

    env.command()
        .args(["context", "Tell me about Kepler Station"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "[KNOWLEDGE CONTEXT - Relevant information:]",
        ))
        .stdout(predicate::str::contains(
            "1. Kepler Station orbits the gas giant Vesper. (location)",
        ))
        .stdout(predicate::str::contains("[END KNOWLEDGE CONTEXT]"));
}

#[test]
fn tc_3_2_context_empty_without_match() {
    let env = TestEnv::with_entries();

    env.command()
        .args(["context", "sourdough baking"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn tc_3_3_context_respects_retrieval_config() {
    let env = TestEnv::with_entries();
    env.write_config("[retrieval]\nmin_relevance = 0.9\n");

    env.command()
        .args(["context", "aris"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn tc_3_4_invalid_retrieval_config_fails() {
    let env = TestEnv::with_entries();
    env.write_config("[retrieval]\nmin_relevance = 1.5\n");

    env.command()
        .args(["context", "aris"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("min_relevance"));
}

// =============================================================================
// 4. Browse Command Tests
// =============================================================================

#[test]
fn tc_4_1_list_all_entries_in_file_order() {
    let env = TestEnv::with_entries();

    env.command()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::is_match(
            "(?s)character_aris_thorne.*location_kepler_station.*character_mira_vance.*glossary_vesper \\[uncategorized\\]",
        )
        .unwrap());
}

#[test]
fn tc_4_2_list_by_category() {
    let env = TestEnv::with_entries();

    env.command()
        .args(["list", "--category", "character"])
        .assert()
        .success()
        .stdout(predicate::str::contains("character_aris_thorne"))
        .stdout(predicate::str::contains("character_mira_vance"))
        .stdout(predicate::str::contains("location_kepler_station").not());
}

#[test]
fn tc_4_3_list_unknown_category() {
    let env = TestEnv::with_entries();

    env.command()
        .args(["list", "--category", "ship"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No entries found."));
}

#[test]
fn tc_4_4_get_existing_entry() {
    let env = TestEnv::with_entries();

    env.command()
        .args(["get", "character_mira_vance"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Category: character"))
        .stdout(predicate::str::contains("Mira Vance pilots the shuttle Corvid."));
}

#[test]
fn tc_4_5_get_unknown_entry() {
    let env = TestEnv::with_entries();

    env.command()
        .args(["get", "ship_corvid"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Entry not found: ship_corvid"));
}

#[test]
fn tc_4_6_categories_sorted() {
    let env = TestEnv::with_entries();

    env.command()
        .arg("categories")
        .assert()
        .success()
        .stdout("character\nlocation\n");
}

#[test]
fn tc_4_7_stats() {
    let env = TestEnv::with_entries();

    env.command()
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total entries: 4"))
        .stdout(predicate::str::contains("Total keywords: 9"))
        .stdout(predicate::str::contains("Average keywords per entry: 2.25"))
        .stdout(predicate::str::contains("character: 2"))
        .stdout(predicate::str::contains("location: 1"));
}

// =============================================================================
// 5. Check / Init Command Tests
// =============================================================================

#[test]
fn tc_5_1_check_valid_file() {
    let env = TestEnv::with_entries();

    env.command()
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("OK: 4 entries"));
}

#[test]
fn tc_5_2_check_reports_offending_entry() {
    let env = TestEnv::new();
    env.write_knowledge(r#"{"good": {"keywords": ["alpha"], "content": "x"}, "bad": {"content": "y"}}"#);

    env.command()
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid knowledge entry 'bad'"));
}

#[test]
fn tc_5_3_init_then_search() {
    let env = TestEnv::new();

    env.command()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"));

    env.command()
        .args(["search", "hello"])
        .assert()
        .success()
        .stdout(predicate::str::contains("welcome"));
}

#[test]
fn tc_5_4_init_refuses_overwrite() {
    let env = TestEnv::with_entries();

    env.command()
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    env.command()
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("OK: 4 entries"));
}

// =============================================================================
// 6. Config Tests
// =============================================================================

#[test]
fn tc_6_1_knowledge_flag_overrides_config() {
    let env = TestEnv::new();
    let other = TestEnv::with_entries();

    env.command()
        .args(["--knowledge"])
        .arg(&other.knowledge_path)
        .arg("categories")
        .assert()
        .success()
        .stdout(predicate::str::contains("character"));
}

#[test]
fn tc_6_2_invalid_config_toml() {
    let env = TestEnv::with_entries();
    fs::write(&env.config_path, "this is not [valid toml").unwrap();

    env.command()
        .arg("stats")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config"));
}

#[test]
fn tc_6_3_disabled_in_config() {
    let env = TestEnv::with_entries();
    env.write_config("enabled = false\n");

    env.command()
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("disabled"));
}
