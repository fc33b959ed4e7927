//! Plain-text rendering for the `analyze` report.

const TICKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const HOUR_MARKS: [u32; 4] = [0, 6, 12, 18];

/// One tick per value, scaled between the profile's min and max.
pub fn sparkline(values: &[f64]) -> String {
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if values.is_empty() || hi <= lo {
        return TICKS[0].to_string().repeat(values.len());
    }
    let top = (TICKS.len() - 1) as f64;
    values
        .iter()
        .map(|&v| {
            let idx = ((v - lo) / (hi - lo) * top).round() as usize;
            TICKS[idx.min(TICKS.len() - 1)]
        })
        .collect()
}

/// Column of each hour mark in a row of `width` characters.
fn mark_columns(width: usize) -> impl Iterator<Item = (u32, usize)> {
    HOUR_MARKS
        .into_iter()
        .map(move |h| (h, h as usize * width / 24))
        .filter(move |&(_, col)| col < width)
}

/// `|` under each of hours 0, 6, 12 and 18.
pub fn hour_axis(width: usize) -> String {
    let mut row = vec![' '; width];
    for (_, col) in mark_columns(width) {
        row[col] = '|';
    }
    row.into_iter().collect()
}

/// Two-digit hour labels starting at each mark.
pub fn hour_labels(width: usize) -> String {
    let mut row = vec![' '; width];
    for (hour, col) in mark_columns(width) {
        for (i, c) in format!("{hour:02}").chars().enumerate() {
            if let Some(cell) = row.get_mut(col + i) {
                *cell = c;
            }
        }
    }
    row.into_iter().collect()
}

/// `7h 05m`.
pub fn format_duration(minutes: u32) -> String {
    format!("{}h {:02}m", minutes / 60, minutes % 60)
}
