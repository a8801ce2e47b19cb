use std::time::Duration;

/// Default canvas size for the terminal chart.
pub const DEFAULT_WIDTH: usize = 100;
pub const DEFAULT_HEIGHT: usize = 20;

/// Render round-trip times as a character grid, one column per slice of
/// the sample pool. Callers pass the pool sorted ascending, which turns
/// the plot into a latency curve from fastest to slowest; the function
/// itself plots whatever order it is given.
///
/// The y axis is labeled at the bottom, middle, and top with the smallest,
/// midpoint, and largest value. Output always ends with a newline.
pub fn render(samples: &[Duration], width: usize, height: usize) -> String {
    if samples.is_empty() || width == 0 || height == 0 {
        return String::from("no samples to chart\n");
    }

    let mut min = samples[0];
    let mut max = samples[0];
    for &s in samples {
        min = min.min(s);
        max = max.max(s);
    }
    let span = (max - min).as_nanos();

    let mut grid = vec![vec![' '; width]; height];
    let denom = (width - 1).max(1);
    for col in 0..width {
        let idx = col * (samples.len() - 1) / denom;
        let row = if span == 0 {
            0
        } else {
            ((samples[idx] - min).as_nanos() * (height as u128 - 1) / span) as usize
        };
        grid[height - 1 - row][col] = '*';
    }

    let mid = min + (max - min) / 2;
    let labels = [format!("{max:?}"), format!("{mid:?}"), format!("{min:?}")];
    let gutter = labels.iter().map(|l| l.len()).max().unwrap_or(0);

    let mut out = String::new();
    for (row, cells) in grid.iter().enumerate() {
        let label = if row == 0 {
            labels[0].as_str()
        } else if row == height - 1 {
            labels[2].as_str()
        } else if height > 2 && row == height / 2 {
            labels[1].as_str()
        } else {
            ""
        };
        out.push_str(&format!("{label:>gutter$} |"));
        out.extend(cells.iter());
        out.push('\n');
    }
    out.push_str(&format!("{:>gutter$} +{}\n", "", "-".repeat(width)));
    out.push_str(&format!(
        "{:>gutter$}  {} requests, fastest to slowest\n",
        "",
        samples.len()
    ));
    out
}
