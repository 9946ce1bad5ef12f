//! Integration tests for the coprocess text modes.

mod common;

use common::{body_lines, coprocess_output};
use par_term_script_tools::coprocess::text::{KeywordMatcher, Transform};
use par_term_script_tools::coprocess::{CoprocessConfig, run_coprocess};
use par_term_script_tools::shutdown::Shutdown;
use regex::Regex;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_banners_frame_output() {
    let config = CoprocessConfig::Echo {
        prefix: "COPROC".to_string(),
    };
    let output = coprocess_output(&config, "hello\n");
    assert_eq!(
        output,
        "[coprocess] started in 'echo' mode\n[COPROC] hello\n[coprocess] exiting\n"
    );
}

#[test]
fn test_transform_upper_strips_ansi_first() {
    let config = CoprocessConfig::Transform(Transform::Upper);
    let output = coprocess_output(&config, "\x1b[31mERROR\x1b[0m: bad\n");
    assert_eq!(body_lines(&output), vec!["ERROR: BAD"]);
}

#[test]
fn test_transform_reverse_and_strip() {
    let input = "\x1b[1mabc\x1b[0m\n";
    let reversed = coprocess_output(&CoprocessConfig::Transform(Transform::Reverse), input);
    assert_eq!(body_lines(&reversed), vec!["cba"]);
    let stripped = coprocess_output(&CoprocessConfig::Transform(Transform::Strip), input);
    assert_eq!(body_lines(&stripped), vec!["abc"]);
}

#[test]
fn test_filter_passes_matching_lines_only() {
    let config = CoprocessConfig::Filter {
        pattern: Regex::new(r"warn|error").unwrap(),
    };
    let output = coprocess_output(&config, "build ok\nerror: x\nwarning: y\nERROR z\n");
    assert_eq!(body_lines(&output), vec!["error: x", "warning: y"]);
}

#[test]
fn test_alert_first_keyword_wins() {
    let config = CoprocessConfig::Alert {
        keywords: KeywordMatcher::parse("error,panic").unwrap(),
    };
    let output = coprocess_output(&config, "system panic detected\nall quiet\n");
    let body = body_lines(&output);
    assert_eq!(body[0], "[alert] Watching for: error, panic");
    let alerts: Vec<&&str> = body.iter().filter(|l| l.starts_with("[ALERT ")).collect();
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].contains("matched 'panic'"));
    assert!(!alerts[0].contains("'error'"));
    assert!(alerts[0].ends_with(": system panic detected"));
}

#[test]
fn test_alert_one_line_when_both_keywords_present() {
    let config = CoprocessConfig::Alert {
        keywords: KeywordMatcher::parse("error,panic").unwrap(),
    };
    let output = coprocess_output(&config, "panic after error   \n");
    let alerts: Vec<&str> = body_lines(&output)
        .into_iter()
        .filter(|l| l.starts_with("[ALERT "))
        .collect();
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].ends_with("matched 'error': panic after error"));
}

#[test]
fn test_log_mode_writes_session_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logs/coproc.log");
    let config = CoprocessConfig::Log { path: path.clone() };

    let output = coprocess_output(&config, "first\nsecond\n");
    assert_eq!(
        body_lines(&output),
        vec![format!("Logging to {}", path.display())]
    );

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("\n--- Session started "));
    assert!(text.trim_end().ends_with(" ---"));
    assert_eq!(text.matches("--- Session ended ").count(), 1);
    let first = text.find("] first\n").unwrap();
    let second = text.find("] second\n").unwrap();
    assert!(first < second);
}

#[test]
fn test_log_mode_closes_file_on_interrupt() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("coproc.log");
    let config = CoprocessConfig::Log { path: path.clone() };
    let shutdown = Shutdown::new();
    shutdown.trigger();

    let mut output = Vec::new();
    run_coprocess(
        &config,
        Cursor::new(b"never logged\n".to_vec()),
        &mut output,
        &shutdown,
    )
    .unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.matches("--- Session ended ").count(), 1);
    assert!(!text.contains("never logged"));
}

#[test]
fn test_counter_final_total_at_end_of_input() {
    let config = CoprocessConfig::Counter {
        interval: Duration::from_secs(3600),
    };
    let output = coprocess_output(&config, "a\nb\nc\n");
    assert_eq!(body_lines(&output), vec!["[counter] final: 3 lines"]);
}

#[test]
fn test_counter_reports_are_monotonic() {
    // Slow reader so ticks interleave with lines.
    struct Trickle {
        remaining: usize,
    }
    impl std::io::Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.remaining == 0 || buf.is_empty() {
                return Ok(0);
            }
            std::thread::sleep(Duration::from_millis(5));
            self.remaining -= 1;
            buf[0] = b'\n';
            Ok(1)
        }
    }

    let config = CoprocessConfig::Counter {
        interval: Duration::from_millis(20),
    };
    let mut output = Vec::new();
    run_coprocess(
        &config,
        std::io::BufReader::with_capacity(1, Trickle { remaining: 40 }),
        &mut output,
        &Shutdown::new(),
    )
    .unwrap();
    let text = String::from_utf8(output).unwrap();

    let counts: Vec<u64> = text
        .lines()
        .filter_map(|l| l.strip_prefix("[counter] "))
        .filter_map(|l| {
            l.strip_suffix(" lines received")
                .or_else(|| l.strip_prefix("final: ").and_then(|r| r.strip_suffix(" lines")))
        })
        .map(|n| n.parse().unwrap())
        .collect();
    assert!(counts.windows(2).all(|w| w[0] <= w[1]), "{counts:?}");
    assert!(counts.iter().all(|&c| c <= 40));
    assert_eq!(counts.last(), Some(&40));
}

#[test]
fn test_periodic_beats_until_shutdown() {
    let config = CoprocessConfig::Periodic {
        interval: Duration::from_millis(20),
    };
    let shutdown = Shutdown::new();
    let stopper = Arc::clone(&shutdown);
    std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(150));
        stopper.trigger();
    });

    let mut output = Vec::new();
    // Empty stdin: the heartbeat keeps going after end of input.
    run_coprocess(&config, Cursor::new(Vec::new()), &mut output, &shutdown).unwrap();
    let text = String::from_utf8(output).unwrap();
    let beats: Vec<&str> = text
        .lines()
        .filter(|l| l.starts_with("[heartbeat #"))
        .collect();
    assert!(beats.len() >= 2, "{text}");
    assert!(beats[0].starts_with("[heartbeat #1] "));
    assert!(beats[1].starts_with("[heartbeat #2] "));
    assert!(text.ends_with("[coprocess] exiting\n"));
}
