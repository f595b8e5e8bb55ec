use textwrap::{wrap, Options as WrapOptions};

use crate::width::visible_width;

const MIN_COLUMN_WIDTH: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColumnAlignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Pre-rendered cell text for one table. Cells may contain escape sequences
/// and hard line breaks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableData {
    pub alignments: Vec<ColumnAlignment>,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableData {
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain([self.alignments.len(), self.header.len()])
            .max()
            .unwrap_or(0)
    }

    fn alignment(&self, column: usize) -> ColumnAlignment {
        self.alignments.get(column).copied().unwrap_or_default()
    }
}

/// Lays `table` out as box-drawn lines no wider than `max_width` where the
/// borders leave room; cells wrap to fit their column.
pub fn layout_table(table: &TableData, max_width: usize) -> Vec<String> {
    let columns = table.column_count();
    if columns == 0 {
        return Vec::new();
    }

    let mut widths = vec![MIN_COLUMN_WIDTH; columns];
    for row in std::iter::once(&table.header).chain(&table.rows) {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell_width(cell));
        }
    }
    fit_widths(&mut widths, max_width);

    let mut lines = vec![border('┌', '┬', '┐', &widths)];
    if !table.header.is_empty() {
        lines.extend(row_lines(table, &table.header, &widths));
        lines.push(border('├', '┼', '┤', &widths));
    }
    for (idx, row) in table.rows.iter().enumerate() {
        lines.extend(row_lines(table, row, &widths));
        if idx + 1 < table.rows.len() {
            lines.push(border('├', '┼', '┤', &widths));
        }
    }
    lines.push(border('└', '┴', '┘', &widths));
    lines
}

fn cell_width(cell: &str) -> usize {
    cell.lines().map(visible_width).max().unwrap_or(0)
}

/// Shrinks column widths proportionally until borders plus content fit in
/// `max_width`, never below the minimum column width.
fn fit_widths(widths: &mut [usize], max_width: usize) {
    let border_space = 3 * widths.len() + 1;
    let min_total = MIN_COLUMN_WIDTH * widths.len();
    let Some(budget) = max_width.checked_sub(border_space).filter(|&b| b > min_total) else {
        widths.fill(MIN_COLUMN_WIDTH);
        return;
    };
    let total: usize = widths.iter().sum();
    if total <= budget {
        return;
    }
    for width in widths.iter_mut() {
        *width = (*width * budget / total).max(MIN_COLUMN_WIDTH);
    }
    let mut total: usize = widths.iter().sum();
    while total > budget {
        let Some(widest) = widths
            .iter_mut()
            .filter(|w| **w > MIN_COLUMN_WIDTH)
            .max_by_key(|w| **w)
        else {
            break;
        };
        *widest -= 1;
        total -= 1;
    }
    let mut idx = 0;
    while total < budget {
        widths[idx % widths.len()] += 1;
        total += 1;
        idx += 1;
    }
}

fn border(left: char, junction: char, right: char, widths: &[usize]) -> String {
    let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
    format!("{left}{}{right}", segments.join(&junction.to_string()))
}

fn row_lines(table: &TableData, row: &[String], widths: &[usize]) -> Vec<String> {
    let columns: Vec<Vec<String>> = widths
        .iter()
        .enumerate()
        .map(|(idx, &width)| {
            let cell = row.get(idx).map(String::as_str).unwrap_or("");
            cell_lines(cell, width, table.alignment(idx))
        })
        .collect();
    let height = columns.iter().map(Vec::len).max().unwrap_or(1);

    (0..height)
        .map(|line_idx| {
            let mut line = String::from("│");
            for (col_idx, column) in columns.iter().enumerate() {
                let blank = " ".repeat(widths[col_idx]);
                let text = column.get(line_idx).unwrap_or(&blank);
                line.push(' ');
                line.push_str(text);
                line.push_str(" │");
            }
            line
        })
        .collect()
}

fn cell_lines(cell: &str, width: usize, alignment: ColumnAlignment) -> Vec<String> {
    let mut lines: Vec<String> = cell
        .lines()
        .flat_map(|line| wrap_cell_line(line, width))
        .map(|segment| pad(&segment, width, alignment))
        .collect();
    if lines.is_empty() {
        lines.push(" ".repeat(width));
    }
    lines
}

fn wrap_cell_line(line: &str, width: usize) -> Vec<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return vec![String::new()];
    }
    wrap(trimmed, WrapOptions::new(width).break_words(true))
        .into_iter()
        .map(|segment| segment.into_owned())
        .collect()
}

fn pad(text: &str, width: usize, alignment: ColumnAlignment) -> String {
    let used = visible_width(text);
    if used >= width {
        return text.to_string();
    }
    let gap = width - used;
    match alignment {
        ColumnAlignment::Left => format!("{text}{}", " ".repeat(gap)),
        ColumnAlignment::Right => format!("{}{text}", " ".repeat(gap)),
        ColumnAlignment::Center => {
            let left = gap / 2;
            format!("{}{text}{}", " ".repeat(left), " ".repeat(gap - left))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(header: &[&str], rows: &[&[&str]]) -> TableData {
        TableData {
            alignments: Vec::new(),
            header: header.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn renders_borders_header_and_rows() {
        let lines = layout_table(&table(&["A", "B"], &[&["x", "y"]]), 80);
        assert_eq!(
            lines,
            vec![
                "┌─────┬─────┐",
                "│ A   │ B   │",
                "├─────┼─────┤",
                "│ x   │ y   │",
                "└─────┴─────┘",
            ]
        );
    }

    #[test]
    fn every_line_has_the_same_visible_width() {
        let lines = layout_table(&table(&["Emoji", "Word"], &[&["漢字", "text"]]), 80);
        let widths: Vec<usize> = lines.iter().map(|l| visible_width(l)).collect();
        assert!(widths.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[test]
    fn wide_tables_shrink_and_wrap_cells() {
        let long = "superlongwordwithoutbreaks and more words after it";
        let lines = layout_table(&table(&["A", "B"], &[&[long, "short"]]), 24);
        assert!(lines.iter().all(|l| visible_width(l) <= 24));
        let row_lines = lines.iter().filter(|l| l.starts_with('│')).count();
        assert!(row_lines >= 3, "header plus wrapped row lines: {lines:?}");
    }

    #[test]
    fn alignment_pads_cells() {
        assert_eq!(pad("ab", 6, ColumnAlignment::Right), "    ab");
        assert_eq!(pad("ab", 6, ColumnAlignment::Center), "  ab  ");
        assert_eq!(pad("ab", 6, ColumnAlignment::Left), "ab    ");
        assert_eq!(pad("\x1b[1mab\x1b[0m", 3, ColumnAlignment::Left), "\x1b[1mab\x1b[0m ");
    }

    #[test]
    fn hard_breaks_split_cells_across_lines() {
        let lines = layout_table(&table(&["A"], &[&["line1\nline2"]]), 40);
        let first = lines.iter().position(|l| l.contains("line1"));
        let second = lines.iter().position(|l| l.contains("line2"));
        assert!(first.is_some() && second.is_some());
        assert_ne!(first, second);
    }

    #[test]
    fn ragged_rows_are_padded_to_the_column_count() {
        let data = table(&["A", "B", "C"], &[&["only"]]);
        assert_eq!(data.column_count(), 3);
        let lines = layout_table(&data, 80);
        assert!(lines.iter().all(|l| visible_width(l) == visible_width(&lines[0])));
    }
}
