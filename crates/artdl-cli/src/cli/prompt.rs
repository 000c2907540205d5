//! Interactive fallback when no URL is given on the command line.

use std::io::{BufRead, Write};

use anyhow::{bail, Context, Result};

/// Ask for the start URL once. Empty input is an error.
pub fn prompt_for_url<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<String> {
    write!(output, "URL? ").context("writing prompt")?;
    output.flush().context("flushing prompt")?;

    let mut line = String::new();
    input.read_line(&mut line).context("reading URL from stdin")?;
    let url = line.trim();
    if url.is_empty() {
        bail!("no URL given");
    }
    Ok(url.to_string())
}
