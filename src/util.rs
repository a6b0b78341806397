use crate::prelude::*;

pub fn load_file<P: AsRef<Path>>(path: P) -> Result<String> {
    debug!(
        "loading file {}",
        path.as_ref().to_str().unwrap_or("[non UTF-8 path]")
    );
    std::fs::read_to_string(path).map_err(Error::IOError)
}

/// Collect `X.in`/`X.ans` pairs from a testcase directory, sorted by
/// input file name so the case order is stable across runs.
pub fn enumerate_testcase<P: AsRef<Path>>(dir: P) -> Result<Vec<(PathBuf, PathBuf)>> {
    let dir_log = dir.as_ref().display();
    info!("enumerating testcases from {}", dir_log);

    let mut r = std::fs::read_dir(&dir)
        .map_err(Error::IOError)?
        .filter_map(|x| {
            let x = match x {
                Err(e) => {
                    warn!("error listing {}: {}", dir_log, e);
                    return None;
                }
                Ok(x) => x,
            };
            let p = x.path();
            let name = x.file_name();
            let name = match name.to_str() {
                None => {
                    warn!("skip non-UTF8 file name {} in {}", p.display(), dir_log);
                    return None;
                }
                Some(n) => n,
            };
            let stem = name.strip_suffix(".in")?;
            let ans = dir.as_ref().join(stem.to_owned() + ".ans");
            if !ans.is_file() {
                warn!("skip {}: no matching {}", p.display(), ans.display());
                return None;
            }
            Some((p, ans))
        })
        .collect::<Vec<_>>();
    r.sort();
    Ok(r)
}

/// Prepare captured stderr for a human-readable summary: non-ASCII
/// bytes become '?', and anything over `limit` bytes is cut with an
/// ellipsis.
pub fn excerpt(data: &[u8], limit: usize) -> String {
    let mut x = data[..data.len().min(limit + 1)].to_vec();
    if x.len() > limit {
        x.truncate(limit.saturating_sub(3));
        x.extend(b"...");
    }
    for c in &mut x {
        if !c.is_ascii() {
            *c = b'?';
        }
    }
    String::from_utf8_lossy(&x).trim().to_string()
}
