pub fn parse_progress_from_line(line: &str) -> Option<f32> {
    let rest = line.strip_prefix("[download]")?.trim_start();
    let token = rest.split_whitespace().next()?;
    let number = token.strip_suffix('%')?;
    match number.parse::<f32>() {
        Ok(v) if (0.0..=100.0).contains(&v) => Some(v / 100.0),
        _ => None,
    }
}
