//! The scoring driver: runs every test case of a job, classifies each
//! run into a verdict, and narrates the aggregate result through the
//! report channel and the details document.

use crate::data::{JobSpec, Verdict};
use crate::details::{self, Job, SolutionDetails, Test, DETAILS_VERSION};
use crate::prelude::*;
use crate::report::{ReportChannel, ReportSink};
use crate::run::{run_solution, FinishedRun, RunLimit};
use std::collections::BTreeMap;

/// Upper bound on the stderr excerpt quoted in a summary.
const EXCERPT_LIMIT: usize = 4096;

/// Map one finished run to a verdict. Deterministic in the captured
/// output and exit status; never inspects anything else.
pub fn classify(run: &FinishedRun, answer: &str) -> Verdict {
    if run.timed_out() {
        return Verdict::TimeLimit;
    }
    if run.is_failed() {
        return Verdict::RunError;
    }
    if run.stdout().trim() == answer.trim() {
        Verdict::Correct
    } else {
        Verdict::WrongAnswer
    }
}

struct CaseResult {
    name: String,
    verdict: Verdict,
    summary: String,
}

fn run_error_summary(stderr: &[u8]) -> String {
    let excerpt = util::excerpt(stderr, EXCERPT_LIMIT);
    if excerpt.is_empty() {
        Verdict::RunError.summary().to_string()
    } else {
        format!("Runtime error: {}", excerpt)
    }
}

/// Run and classify every case of `spec`, emitting a progress message
/// per case. Returns the details document and the largest per-case
/// wall time.
///
/// A failure to even launch the solution is a judged outcome, not an
/// error: it becomes a runtime-error case result with the OS error in
/// the summary.
pub async fn judge<S: ReportSink>(
    spec: &JobSpec,
    cmd: &[String],
    lim: &RunLimit,
    report: &mut ReportChannel<S>,
) -> Result<(SolutionDetails, Duration)> {
    let mut results = Vec::with_capacity(spec.cases.len());
    let mut max_time = Duration::new(0, 0);

    for (cnt, case) in spec.cases.iter().enumerate() {
        let cnt = cnt + 1;
        info!("testing case {} ({})", cnt, case.name);
        report.message(&format!("Running on case {}", cnt)).await?;

        let (verdict, summary) = match run_solution(cmd, &case.input, lim).await {
            Ok(run) => {
                max_time = std::cmp::max(max_time, run.wall_time_usage());
                info!(
                    "{} seconds used for case {}",
                    run.wall_time_usage().as_secs_f64(),
                    cnt,
                );
                let verdict = classify(&run, &case.answer);
                let summary = match verdict {
                    Verdict::RunError => run_error_summary(run.stderr().as_bytes()),
                    v => v.summary().to_string(),
                };
                (verdict, summary)
            }
            Err(Error::SpawnError(e)) => {
                warn!("cannot launch solution for case {}: {}", cnt, e);
                (Verdict::RunError, format!("Cannot launch solution: {}", e))
            }
            Err(e) => return Err(e),
        };
        info!("case {} ({}): {:?}", cnt, case.name, verdict);
        results.push(CaseResult {
            name: case.name.clone(),
            verdict,
            summary,
        });
    }

    let n = results.len().max(1) as f64;
    let score = results.iter().map(|r| r.verdict.score()).sum::<f64>() / n;
    let worst = results.iter().find(|r| r.verdict != Verdict::Correct);
    let (status, summary) = match worst {
        None => ("Accepted".to_string(), "Correct".to_string()),
        Some(r) => (r.verdict.status().to_string(), r.summary.clone()),
    };

    let tests = results
        .iter()
        .map(|r| Test {
            name: r.name.clone(),
            score: r.verdict.score(),
            score_scale: 100.0,
            status: r.verdict.status().to_string(),
            summary: r.summary.clone(),
        })
        .collect();
    let job = Job {
        name: spec.name.clone(),
        score,
        score_scale: 100.0,
        status,
        tests,
        summary: summary.clone(),
    };
    let details = SolutionDetails {
        version: DETAILS_VERSION,
        jobs: vec![job],
        summary,
    };
    Ok((details, max_time))
}

/// Judge `spec` and publish the result: score, status, message and
/// metrics on the report channel, the details document on its own
/// sink, and a final commit. The commit is emitted last, after the
/// details are durable.
pub async fn judge_feedback<S: ReportSink>(
    spec: &JobSpec,
    cmd: &[String],
    lim: &RunLimit,
    report: &mut ReportChannel<S>,
    details_target: &Path,
) -> Result<()> {
    let (details, max_time) = judge(spec, cmd, lim, report).await?;
    let job = &details.jobs[0];

    report.score(job.score).await?;
    report.status(&job.status).await?;
    report.message(&details.summary).await?;
    let mut metrics = BTreeMap::new();
    metrics.insert("cpu".to_string(), max_time.as_millis() as f64);
    report.metrics(&metrics).await?;

    details::write_details(details_target, &details).await?;
    report.commit().await?;

    info!("verdict: {} (score {})", job.status, job.score);
    Ok(())
}
