//! Prompt resolution tests

#[cfg(target_os = "linux")]
use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run(dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_novelgloss"))
        .env("NO_COLOR", "1")
        .env("XDG_CONFIG_HOME", dir.path().join("config"))
        .env_remove("RUST_LOG")
        .arg("--store")
        .arg(dir.path().join("glossaries.db"))
        .args(args)
        .output()
        .expect("Failed to run novelgloss")
}

fn run_ok(dir: &TempDir, args: &[&str]) -> String {
    let output = run(dir, args);
    assert!(
        output.status.success(),
        "{:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_builtin_tier_selection() {
    let dir = TempDir::new().unwrap();

    let stdout = run_ok(&dir, &["prompt", "resolve", "ja_en", "translate", "本文"]);
    assert!(stdout.contains("-> specific (ja_en/translate)"));
    assert!(stdout.contains("本文"));

    let stdout = run_ok(&dir, &["prompt", "resolve", "zh-CN_ko", "translate"]);
    assert!(stdout.contains("-> common (common/translate)"));

    let stdout = run_ok(&dir, &["prompt", "resolve", "fr_de", "translate"]);
    assert!(stdout.contains("-> generic (generic/translate)"));
    assert!(stdout.contains("from fr to de"));

    let stdout = run_ok(&dir, &["prompt", "resolve", "ja_en", "post-edit", "src", "draft"]);
    assert!(stdout.contains("-> generic (generic/post-edit)"));
    assert!(stdout.contains("Draft:\ndraft"));
}

#[test]
fn test_invalid_arguments() {
    let dir = TempDir::new().unwrap();

    let output = run(&dir, &["prompt", "resolve", "ja_en", "polish"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown stage"));

    let output = run(&dir, &["prompt", "resolve", "japanese", "translate"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid language pair"));
}

#[test]
fn test_stages_listed() {
    let dir = TempDir::new().unwrap();
    let stdout = run_ok(&dir, &["prompt", "stages"]);
    for stage in [
        "segment",
        "translate",
        "post-edit",
        "glossary-generate",
        "glossary-update",
    ] {
        assert!(stdout.lines().any(|l| l == stage), "missing {}", stage);
    }
}

#[test]
fn test_glossary_context_injected() {
    let dir = TempDir::new().unwrap();
    run_ok(
        &dir,
        &["glossary", "add", "glossary_global_ja_en", "-t", "王都", "-v", "Royal Capital"],
    );
    run_ok(
        &dir,
        &["glossary", "add", "glossary_global_ja_en", "-t", "勇者", "-v", "Hero"],
    );

    let stdout = run_ok(
        &dir,
        &[
            "prompt",
            "resolve",
            "ja_en",
            "translate",
            "王都に着いた",
            "--glossary",
            "glossary_syosetu_n1234ab_ja_en",
        ],
    );
    assert!(stdout.contains("\"王都\" → Royal Capital"));
    assert!(!stdout.contains("Hero"));
}

#[test]
fn test_glossary_context_keeps_positional_arguments() {
    let dir = TempDir::new().unwrap();
    run_ok(
        &dir,
        &["glossary", "add", "glossary_global_ja_en", "-t", "魔王", "-v", "Demon Lord"],
    );

    let stdout = run_ok(
        &dir,
        &[
            "prompt",
            "resolve",
            "ja_en",
            "post-edit",
            "魔王が来た",
            "The demon lord came",
            "--glossary",
            "glossary_global_ja_en",
        ],
    );
    assert!(stdout.contains("Draft:\nThe demon lord came"), "stdout: {}", stdout);
    assert!(stdout.contains("\"魔王\" → Demon Lord"));

    let stdout = run_ok(
        &dir,
        &[
            "prompt",
            "resolve",
            "ja_en",
            "glossary-update",
            "{}",
            "魔王が来た",
            "--glossary",
            "glossary_global_ja_en",
        ],
    );
    assert!(stdout.contains("Text:\n魔王が来た"), "stdout: {}", stdout);
}

#[cfg(target_os = "linux")]
fn write_config(dir: &TempDir, templates: &str) {
    let config_dir = dir.path().join("config").join("novelgloss");
    fs::create_dir_all(&config_dir).unwrap();
    let templates_path = dir.path().join("templates.toml");
    fs::write(&templates_path, templates).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        format!(
            "[prompts]\ntemplates = {:?}\n",
            templates_path.to_str().unwrap()
        ),
    )
    .unwrap();
}

#[cfg(target_os = "linux")]
#[test]
fn test_template_overrides() {
    let dir = TempDir::new().unwrap();
    write_config(
        &dir,
        r#"
[templates."common/translate"]
system = "Romance group {source}->{target}"
user = "{0}"
supported_languages = ["en", "es", "fr"]

[templates."fr_de/translate"]
system = "French to German"
user = "{0}"
"#,
    );

    let stdout = run_ok(&dir, &["prompt", "resolve", "es_fr", "translate"]);
    assert!(stdout.contains("-> common"));
    assert!(stdout.contains("Romance group es->fr"));

    let stdout = run_ok(&dir, &["prompt", "resolve", "fr_de", "translate"]);
    assert!(stdout.contains("-> specific"));

    // The bundled CJK group was replaced by the override.
    let stdout = run_ok(&dir, &["prompt", "resolve", "zh-CN_ko", "translate"]);
    assert!(stdout.contains("-> generic"));
}

#[cfg(target_os = "linux")]
#[test]
fn test_module_without_template_fails() {
    let dir = TempDir::new().unwrap();
    write_config(
        &dir,
        r#"
[templates."ko_en/translate"]
system = "Only a system template"
"#,
    );

    let output = run(&dir, &["prompt", "resolve", "ko_en", "translate"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("has no build template"), "stderr: {}", stderr);
}
