use std::borrow::Cow;
use std::fmt::Write as _;

/// Renders an aligned plain-text table. Cells longer than `max_width`
/// characters are cut (0 disables the limit).
pub fn render_table(headers: &[String], rows: &[Vec<String>], max_width: usize) -> String {
    let fit = |value: &str| fit_cell(value, max_width);
    let headers = headers.iter().map(|h| fit(h.as_str())).collect::<Vec<_>>();
    let rows = rows
        .iter()
        .map(|row| row.iter().map(|cell| fit(cell.as_str())).collect::<Vec<_>>())
        .collect::<Vec<_>>();

    let column_count = rows
        .iter()
        .map(Vec::len)
        .max()
        .unwrap_or(0)
        .max(headers.len());
    let mut widths = vec![1usize; column_count];
    for line in std::iter::once(&headers).chain(rows.iter()) {
        for (idx, cell) in line.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(&headers, &widths));
    let separator = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&separator, &widths));
    for row in &rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let mut line = widths
        .iter()
        .enumerate()
        .map(|(idx, width)| {
            let value = values.get(idx).map(String::as_str).unwrap_or("");
            let padding = width.saturating_sub(value.chars().count());
            format!("{value}{}", " ".repeat(padding))
        })
        .collect::<Vec<_>>()
        .join(" | ");
    while line.ends_with(' ') {
        line.pop();
    }
    line
}

fn fit_cell(value: &str, max_width: usize) -> String {
    let sanitized = sanitize_cell(value);
    if max_width == 0 || sanitized.chars().count() <= max_width {
        return sanitized.into_owned();
    }
    sanitized.chars().take(max_width).collect()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}
