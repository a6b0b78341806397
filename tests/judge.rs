use glue_judge::data::{CaseSpec, JobSpec};
use glue_judge::details::SolutionDetails;
use glue_judge::error::Result;
use glue_judge::judge::judge_feedback;
use glue_judge::report::{ReportChannel, ReportSink};
use glue_judge::run::RunLimit;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Default)]
struct VecSink {
    lines: Vec<String>,
}

#[async_trait::async_trait]
impl ReportSink for VecSink {
    async fn write_line(&mut self, line: &str) -> Result<()> {
        self.lines.push(line.to_string());
        Ok(())
    }
}

fn sh(script: &str) -> Vec<String> {
    vec!["/bin/sh".to_string(), "-c".to_string(), script.to_string()]
}

fn trivial_spec() -> JobSpec {
    JobSpec {
        name: "main".to_string(),
        cases: vec![CaseSpec::trivial()],
    }
}

struct JudgedRun {
    lines: Vec<String>,
    details: SolutionDetails,
}

async fn run_judge(spec: &JobSpec, cmd: &[String], lim: &RunLimit) -> JudgedRun {
    let dir = tempfile::tempdir().expect("should create a tempdir");
    let details_path: PathBuf = dir.path().join("details.json");
    let mut report = ReportChannel::new(VecSink::default());
    judge_feedback(spec, cmd, lim, &mut report, &details_path)
        .await
        .expect("judging should not fail at the infrastructure level");
    let body = std::fs::read(&details_path).expect("details document should be written");
    let details: SolutionDetails =
        serde_json::from_slice(&body).expect("details document should parse");
    JudgedRun {
        lines: report.into_inner().lines,
        details,
    }
}

fn wire_value<'a>(lines: &'a [String], key: &str) -> Option<&'a str> {
    let prefix = format!("{}=", key);
    lines
        .iter()
        .rev()
        .find_map(|l| l.strip_prefix(prefix.as_str()))
}

#[async_std::test]
async fn correct_answer_is_accepted() {
    // cat echoes the fed "1\n" back, which is the expected answer.
    let r = run_judge(&trivial_spec(), &sh("cat"), &RunLimit::default()).await;
    assert_eq!(wire_value(&r.lines, "score"), Some("100"));
    assert_eq!(wire_value(&r.lines, "status"), Some("Accepted"));
    assert_eq!(r.details.jobs[0].tests[0].status, "Accepted");
    assert_eq!(r.details.jobs[0].score, r.details.jobs[0].tests[0].score);
}

#[async_std::test]
async fn wrong_answer_scores_zero() {
    let r = run_judge(&trivial_spec(), &sh("echo 0"), &RunLimit::default()).await;
    assert_eq!(wire_value(&r.lines, "score"), Some("0"));
    assert_eq!(wire_value(&r.lines, "status"), Some("Wrong Answer"));
    assert_eq!(r.details.jobs[0].status, "Wrong Answer");
}

#[async_std::test]
async fn crash_is_a_runtime_error_with_excerpt() {
    let r = run_judge(
        &trivial_spec(),
        &sh("echo something broke >&2; exit 1"),
        &RunLimit::default(),
    )
    .await;
    assert_eq!(wire_value(&r.lines, "status"), Some("Runtime Error"));
    assert_eq!(wire_value(&r.lines, "score"), Some("0"));
    assert!(
        r.details.summary.contains("something broke"),
        "stderr excerpt should reach the details summary, got {:?}",
        r.details.summary
    );
}

#[async_std::test]
async fn hang_is_a_time_limit() {
    let lim = RunLimit {
        time: Duration::from_millis(200),
        ..RunLimit::default()
    };
    let r = run_judge(&trivial_spec(), &sh("sleep 30"), &lim).await;
    assert_eq!(wire_value(&r.lines, "status"), Some("Time Limit Exceeded"));
    assert_eq!(wire_value(&r.lines, "score"), Some("0"));
}

#[async_std::test]
async fn unlaunchable_solution_is_reported_not_fatal() {
    let cmd = vec!["/nonexistent/solution".to_string()];
    let r = run_judge(&trivial_spec(), &cmd, &RunLimit::default()).await;
    assert_eq!(wire_value(&r.lines, "status"), Some("Runtime Error"));
    assert!(r.details.summary.contains("Cannot launch solution"));
}

#[async_std::test]
async fn commit_is_emitted_once_and_last() {
    let r = run_judge(&trivial_spec(), &sh("cat"), &RunLimit::default()).await;
    let commits = r.lines.iter().filter(|l| l.as_str() == "commit").count();
    assert_eq!(commits, 1);
    assert_eq!(r.lines.last().map(String::as_str), Some("commit"));
}

#[async_std::test]
async fn cpu_metric_is_nonnegative_milliseconds() {
    let r = run_judge(&trivial_spec(), &sh("cat"), &RunLimit::default()).await;
    let raw = wire_value(&r.lines, "metrics").expect("metrics should be emitted");
    let metrics: BTreeMap<String, f64> =
        serde_json::from_str(raw).expect("metrics should be a JSON object");
    let cpu = metrics.get("cpu").expect("cpu metric should be present");
    assert!(*cpu >= 0.0);
    assert_eq!(cpu.fract(), 0.0, "cpu should be whole milliseconds");
}

#[async_std::test]
async fn scores_respect_their_scales() {
    let r = run_judge(&trivial_spec(), &sh("echo 0"), &RunLimit::default()).await;
    for job in &r.details.jobs {
        assert!(job.score >= 0.0 && job.score <= job.score_scale);
        for test in &job.tests {
            assert!(test.score >= 0.0 && test.score <= test.score_scale);
        }
    }
}

#[async_std::test]
async fn mixed_cases_average_into_the_job_score() {
    let spec = JobSpec {
        name: "samples".to_string(),
        cases: vec![
            CaseSpec {
                name: "ok".to_string(),
                input: "1\n".to_string(),
                answer: "1".to_string(),
            },
            CaseSpec {
                name: "bad".to_string(),
                input: "2\n".to_string(),
                answer: "1".to_string(),
            },
        ],
    };
    let r = run_judge(&spec, &sh("cat"), &RunLimit::default()).await;
    let job = &r.details.jobs[0];
    assert_eq!(job.tests.len(), 2);
    assert_eq!(job.score, 50.0);
    assert_eq!(job.status, "Wrong Answer");
    assert_eq!(job.tests[0].status, "Accepted");
    assert_eq!(job.tests[1].status, "Wrong Answer");
    // One progress message per case, in order.
    let messages: Vec<_> = r
        .lines
        .iter()
        .filter(|l| l.starts_with("message="))
        .collect();
    assert_eq!(messages[0], "message=Running on case 1");
    assert_eq!(messages[1], "message=Running on case 2");
}
