use crate::prelude::*;

/// Possible outcomes of running one test case, mostly aligned with
/// the status vocabulary the report supervisor displays.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Verdict {
    Correct,
    WrongAnswer,
    RunError,
    TimeLimit,
}

impl Verdict {
    /// The short status phrase for the report stream.
    pub fn status(&self) -> &'static str {
        match self {
            Self::Correct => "Accepted",
            Self::WrongAnswer => "Wrong Answer",
            Self::RunError => "Runtime Error",
            Self::TimeLimit => "Time Limit Exceeded",
        }
    }

    /// Score on the 0 to 100 scale.
    pub fn score(&self) -> f64 {
        match self {
            Self::Correct => 100.0,
            _ => 0.0,
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            Self::Correct => "Correct",
            Self::WrongAnswer => "Incorrect",
            Self::RunError => "Runtime error",
            Self::TimeLimit => "Time limit exceeded",
        }
    }
}

/// One test case: the input fed to the solution and the answer its
/// trimmed output must equal.
#[derive(Debug, Clone)]
pub struct CaseSpec {
    pub name: String,
    pub input: String,
    pub answer: String,
}

impl CaseSpec {
    /// The built-in check used when the problem ships no judge
    /// configuration: feed "1", expect "1" back.
    pub fn trivial() -> Self {
        Self {
            name: "main".to_string(),
            input: "1\n".to_string(),
            answer: "1".to_string(),
        }
    }
}

/// A judged job: a named, ordered group of test cases.
#[derive(Debug, Clone)]
pub struct JobSpec {
    pub name: String,
    pub cases: Vec<CaseSpec>,
}

#[derive(Debug, Deserialize)]
pub struct CaseConfig {
    pub name: Option<String>,
    pub input: String,
    pub answer: String,
}

fn main_name() -> String {
    "main".to_string()
}

/// The `[job]` table of `problem/judge.toml`. Cases may be listed
/// inline or enumerated from a directory of `.in`/`.ans` pairs; with
/// neither, the job falls back to the trivial check.
#[derive(Debug, Deserialize)]
pub struct JobConfig {
    #[serde(default = "main_name")]
    pub name: String,
    #[serde(default)]
    pub case: Vec<CaseConfig>,
    pub testcase_dir: Option<PathBuf>,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            name: main_name(),
            case: Vec::new(),
            testcase_dir: None,
        }
    }
}

impl JobConfig {
    pub fn to_spec(&self) -> Result<JobSpec> {
        let mut cases = Vec::with_capacity(self.case.len());
        for (i, c) in self.case.iter().enumerate() {
            let name = c.name.clone().unwrap_or_else(|| (i + 1).to_string());
            cases.push(CaseSpec {
                name,
                input: c.input.clone(),
                answer: c.answer.clone(),
            });
        }
        if let Some(dir) = &self.testcase_dir {
            for (inp, ans) in util::enumerate_testcase(dir)? {
                let name = inp
                    .file_stem()
                    .and_then(|x| x.to_str())
                    .unwrap_or("[bad filename]")
                    .to_string();
                cases.push(CaseSpec {
                    name,
                    input: util::load_file(&inp)?,
                    answer: util::load_file(&ans)?,
                });
            }
        }
        if cases.is_empty() {
            cases.push(CaseSpec::trivial());
        }
        Ok(JobSpec {
            name: self.name.clone(),
            cases,
        })
    }
}
