use anyhow::{Context, Result};
use std::io::{BufRead, Write};

/// Ask a yes/no question. An empty answer or end of input picks `default`;
/// anything unrecognised asks again.
pub fn confirm(
    message: &str,
    default: bool,
    input: &mut dyn BufRead,
    output: &mut dyn Write,
) -> Result<bool> {
    let hint = if default { "Y/n" } else { "y/N" };
    loop {
        write!(output, "{message} ({hint}) ").context("failed to write prompt")?;
        output.flush().context("failed to flush prompt")?;

        let mut answer = String::new();
        let read = input
            .read_line(&mut answer)
            .context("failed to read answer")?;
        if read == 0 {
            writeln!(output).context("failed to write prompt")?;
            return Ok(default);
        }

        match answer.trim().to_ascii_lowercase().as_str() {
            "" => return Ok(default),
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => writeln!(output, "Please answer 'y' or 'n'.").context("failed to write prompt")?,
        }
    }
}
