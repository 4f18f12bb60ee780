use std::path::PathBuf;
use std::process;

use clap::Parser;

use bucket_rs::bucket::{self, BucketConfig};
use bucket_rs::common::io_error_msg;

#[derive(Parser)]
#[command(
    name = "fbucket",
    version,
    about = "Bucket lines of FILE into per-leading-character files"
)]
struct Cli {
    /// Input file, one record per line
    #[arg(default_value = bucket::DEFAULT_INPUT)]
    file: PathBuf,

    /// Directory receiving the <char>.txt output files (created if absent)
    #[arg(short = 'o', long = "output-dir", default_value = bucket::DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,
}

fn main() {
    bucket_rs::common::reset_sigpipe();
    let cli = Cli::parse();

    if let Err(e) = std::fs::create_dir_all(&cli.output_dir) {
        eprintln!(
            "fbucket: cannot create directory '{}': {}",
            cli.output_dir.display(),
            io_error_msg(&e)
        );
        process::exit(1);
    }

    let config = BucketConfig {
        input: cli.file,
        output_dir: cli.output_dir,
        ..BucketConfig::default()
    };

    match bucket::run(&config) {
        Ok(summary) => {
            bucket::print_timings(&summary.workers);
            let malformed = summary.malformed();
            if malformed > 0 {
                eprintln!(
                    "fbucket: skipped {} malformed line(s) in '{}'",
                    malformed,
                    config.input.display()
                );
            }
        }
        Err(e) => {
            eprintln!("fbucket: {}", e);
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::process::Command;

    fn cmd() -> Command {
        let mut path = std::env::current_exe().unwrap();
        path.pop();
        path.pop();
        path.push("fbucket");
        Command::new(path)
    }

    #[test]
    fn test_zero_arg_contract() {
        // The external harness invokes the tool with no arguments and relies
        // on the fixed contacts.txt / results paths
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("contacts.txt"),
            "Иванов;Иван;Иванович;+79161234567\nПетров;Петр;Петрович;+79261234568\n",
        )
        .unwrap();
        let output = cmd().current_dir(dir.path()).output().unwrap();
        assert!(
            output.status.success(),
            "stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        let results = dir.path().join("results");
        assert!(results.join("И.txt").exists());
        assert!(results.join("П.txt").exists());
        let content = std::fs::read_to_string(results.join("И.txt")).unwrap();
        assert_eq!(content, "Иванов;Иван;Иванович;+79161234567\n");
    }

    #[test]
    fn test_missing_input_exits_1() {
        let dir = tempfile::tempdir().unwrap();
        let output = cmd().current_dir(dir.path()).output().unwrap();
        assert_eq!(output.status.code(), Some(1));
        assert!(!output.stderr.is_empty());
    }

    #[test]
    fn test_explicit_paths() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("people.txt");
        std::fs::write(&input, "alice\nbob\n").unwrap();
        let out_dir = dir.path().join("buckets");
        let output = cmd()
            .args([
                input.to_str().unwrap(),
                "-o",
                out_dir.to_str().unwrap(),
            ])
            .current_dir(dir.path())
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        assert!(out_dir.join("a.txt").exists());
        assert!(out_dir.join("b.txt").exists());
    }

    #[test]
    fn test_timing_report_shape() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("contacts.txt"), "x\n").unwrap();
        let output = cmd().current_dir(dir.path()).output().unwrap();
        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        let lines: Vec<&str> = stdout.lines().collect();
        assert_eq!(lines.len(), 4);
        for (i, line) in lines.iter().enumerate() {
            assert!(line.starts_with(&format!("worker {} elapsed time: ", i + 1)));
            assert!(line.ends_with(" seconds"));
            // Fixed 8-decimal precision
            let value = line.split_whitespace().nth(4).unwrap();
            let frac = value.split('.').nth(1).unwrap();
            assert_eq!(frac.len(), 8, "timing value '{value}'");
        }
    }

    #[test]
    fn test_second_run_appends() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("contacts.txt"), "apple\n").unwrap();
        assert!(cmd().current_dir(dir.path()).status().unwrap().success());
        assert!(cmd().current_dir(dir.path()).status().unwrap().success());
        let content =
            std::fs::read_to_string(dir.path().join("results").join("a.txt")).unwrap();
        assert_eq!(content, "apple\napple\n");
    }

    #[test]
    fn test_empty_input_creates_no_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("contacts.txt"), "").unwrap();
        let output = cmd().current_dir(dir.path()).output().unwrap();
        assert!(output.status.success());
        assert_eq!(
            std::fs::read_dir(dir.path().join("results")).unwrap().count(),
            0
        );
    }

    #[test]
    fn test_malformed_line_warns_but_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("contacts.txt"), b"ok\n\xff\xfe\n").unwrap();
        let output = cmd().current_dir(dir.path()).output().unwrap();
        assert!(output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("skipped 1 malformed line"));
        assert!(dir.path().join("results").join("o.txt").exists());
    }
}
