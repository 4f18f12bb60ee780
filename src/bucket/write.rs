use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use super::core::BucketError;

/// Flush merged buckets to `<key>.txt` files under `output_dir`.
///
/// Files are opened in append/create mode, so repeated runs accumulate;
/// callers wanting a clean slate clear the directory first. Each line is
/// written verbatim followed by `\n`. The directory must exist; any open or
/// write failure aborts the run.
pub fn write_buckets(
    buckets: &BTreeMap<char, Vec<&[u8]>>,
    output_dir: &Path,
) -> Result<(), BucketError> {
    for (key, lines) in buckets {
        // The key lands in the filename as-is; a separator-hostile leading
        // character (e.g. '/') surfaces as an open error.
        let path = output_dir.join(format!("{key}.txt"));
        append_bucket(&path, lines).map_err(|e| BucketError::Output {
            path: path.display().to_string(),
            source: e,
        })?;
    }
    Ok(())
}

fn append_bucket(path: &Path, lines: &[&[u8]]) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut out = BufWriter::new(file);
    for line in lines {
        out.write_all(line)?;
        out.write_all(b"\n")?;
    }
    out.flush()
}
