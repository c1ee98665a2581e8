use anyhow::{bail, Context};
use std::io::{BufRead, Write};

pub const REQUESTS_PROMPT: &str = "Enter the number of concurrent requests: ";
pub const ID_PROMPT: &str = "Enter the id of the request: ";

/// Writes `message`, then reads one line from `input` as an integer.
pub fn read_number<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    message: &str,
) -> anyhow::Result<i64> {
    write!(output, "{message}")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("no input given for {:?}", message.trim_end());
    }
    let text = line.trim();
    text.parse::<i64>()
        .with_context(|| format!("invalid number: {text:?}"))
}

/// Negative counts mean no workers.
pub fn worker_count(n: i64) -> usize {
    if n < 0 {
        log::warn!("negative request count {n}, sending nothing");
        0
    } else {
        usize::try_from(n).unwrap_or(usize::MAX)
    }
}
