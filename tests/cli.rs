use std::f32::consts::PI;
use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::tempdir;

fn tone_bytes(segments: &[(f32, usize)], sample_rate: u32) -> Vec<u8> {
    segments
        .iter()
        .flat_map(|&(frequency, len)| {
            (0..len).map(move |index| {
                let t = index as f32 / sample_rate as f32;
                ((2.0 * PI * frequency * t).sin() * 0.5 * 32767.0) as i16
            })
        })
        .flat_map(i16::to_le_bytes)
        .collect()
}

fn write_rising_pcm(path: &Path) {
    let bytes = tone_bytes(&[(150.0, 45 * 2048), (250.0, 5 * 2048)], 44_100);
    fs::write(path, bytes).unwrap();
}

fn run_json(args: &[&str]) -> Value {
    let output = Command::cargo_bin("intonalyzer")
        .unwrap()
        .args(args)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn scores_raw_pcm_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("take.raw");
    write_rising_pcm(&input);

    let report = run_json(&[input.to_str().unwrap()]);
    assert_eq!(report["outcome"]["status"], "scored");
    assert_eq!(report["outcome"]["detail"]["phrase_final"], 100.0);
    let score = report["intonation_score"].as_u64().unwrap();
    assert!((85..=100).contains(&score), "score={score}");
    assert!(report.get("final_score").is_none());
}

#[test]
fn fuses_with_text_score() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("take.pcm");
    write_rising_pcm(&input);

    let report = run_json(&[
        input.to_str().unwrap(),
        "--text-score",
        "60",
        "--dialect-text",
        "ほんまにええやん",
    ]);
    let acoustic = report["intonation_score"].as_u64().unwrap();
    let expected = ((60 + acoustic) as f64 / 2.0).round() as u64;
    assert_eq!(report["final_score"].as_u64().unwrap(), expected);
    assert_eq!(report["kansai_level"], 60);
    assert_eq!(report["dialect_text"], "ほんまにええやん");
}

#[test]
fn reads_critique_reply() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("silence.raw");
    fs::write(&input, vec![0u8; 44_100]).unwrap();
    let reply = dir.path().join("reply.txt");
    fs::write(&reply, "関西弁レベル: 81\n分析: 語尾が自然です。").unwrap();

    let report = run_json(&[
        input.to_str().unwrap(),
        "--critique-file",
        reply.to_str().unwrap(),
    ]);
    assert_eq!(report["intonation_score"], 0);
    assert_eq!(report["outcome"]["status"], "unscorable");
    assert_eq!(report["outcome"]["detail"], "no_pitch_detected");
    assert_eq!(report["kansai_level"], 81);
    assert_eq!(report["final_score"], 41);
    assert_eq!(report["analysis"], "語尾が自然です。");
}

#[test]
fn decodes_wav_and_dumps_analysed_audio() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("take.wav");
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&input, spec).unwrap();
    for pair in tone_bytes(&[(200.0, 16_000)], 16_000).chunks_exact(2) {
        writer
            .write_sample(i16::from_le_bytes([pair[0], pair[1]]))
            .unwrap();
    }
    writer.finalize().unwrap();
    let dump = dir.path().join("analysed.wav");

    let report = run_json(&[
        input.to_str().unwrap(),
        "--dump-wav",
        dump.to_str().unwrap(),
    ]);
    assert_eq!(report["outcome"]["status"], "scored");

    let reader = hound::WavReader::open(&dump).unwrap();
    assert_eq!(reader.spec().sample_rate, 44_100);
    assert_eq!(reader.len(), 44_100);
}

#[test]
fn config_override_is_applied() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("take.raw");
    write_rising_pcm(&input);
    let config = dir.path().join("config.json");
    fs::write(
        &config,
        r#"{"weights": {"phrase_final": 0.0, "pitch_range": 0.0, "accent_pattern": 0.5}}"#,
    )
    .unwrap();

    let report = run_json(&[
        input.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ]);
    assert_eq!(report["intonation_score"], 50);
}

#[test]
fn missing_input_fails() {
    Command::cargo_bin("intonalyzer")
        .unwrap()
        .arg("does-not-exist.raw")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file does not exist"));
}

#[test]
fn invalid_config_fails() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("take.raw");
    write_rising_pcm(&input);
    let config = dir.path().join("config.json");
    fs::write(&config, r#"{"window_size": 0}"#).unwrap();

    Command::cargo_bin("intonalyzer")
        .unwrap()
        .args([
            input.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("window_size"));
}
