use std::io::{self, BufRead, Write};

use crate::settings::WindowSettings;

/// Console stand-in for a render-system configuration dialog.
///
/// Prints the window configuration and reads one answer. An empty line,
/// `y` or `yes` accept; anything else, or end of input, cancels.
pub fn confirm(
    window: &WindowSettings,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> io::Result<bool> {
    writeln!(
        output,
        "Render window: \"{}\" {}x{}",
        window.title, window.width, window.height
    )?;
    write!(output, "Start with this configuration? [Y/n] ")?;
    output.flush()?;

    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        return Ok(false);
    }
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "" | "y" | "yes"
    ))
}
