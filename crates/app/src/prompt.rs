use std::io::{self, BufRead, Write};

/// Print `label` and read one trimmed line. `None` on end of input.
pub fn read_line(label: &str) -> io::Result<Option<String>> {
    let mut stdout = io::stdout();
    write!(stdout, "{label}")?;
    stdout.flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_owned()))
}

/// Parse a 1-based menu choice into an index below `len`.
pub fn menu_index(raw: &str, len: usize) -> Option<usize> {
    raw.parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .filter(|i| *i < len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_choices_are_one_based() {
        assert_eq!(menu_index("1", 3), Some(0));
        assert_eq!(menu_index("3", 3), Some(2));
        assert_eq!(menu_index("0", 3), None);
        assert_eq!(menu_index("4", 3), None);
        assert_eq!(menu_index("x", 3), None);
    }
}
