//! Table rendering for registry and check output.

use console::measure_text_width;

/// A simple boxed table.
#[derive(Debug)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    column_widths: Vec<usize>,
}

impl Table {
    /// Create a new table with the given headers.
    pub fn new(headers: &[&str]) -> Self {
        let headers: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
        let column_widths = headers.iter().map(|h| measure_text_width(h)).collect();

        Self {
            headers,
            rows: Vec::new(),
            column_widths,
        }
    }

    /// Add a row; cells beyond the header count are ignored.
    pub fn add_row<S: Into<String>>(&mut self, row: impl IntoIterator<Item = S>) {
        let row: Vec<String> = row
            .into_iter()
            .map(Into::into)
            .take(self.headers.len())
            .collect();

        for (width, cell) in self.column_widths.iter_mut().zip(&row) {
            *width = (*width).max(measure_text_width(cell));
        }

        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render the table as a string.
    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.rows.len() + 4);
        lines.push(self.render_border('┌', '┬', '┐'));
        lines.push(self.render_row(&self.headers));
        lines.push(self.render_border('├', '┼', '┤'));
        for row in &self.rows {
            lines.push(self.render_row(row));
        }
        lines.push(self.render_border('└', '┴', '┘'));
        lines.join("\n")
    }

    fn render_border(&self, left: char, mid: char, right: char) -> String {
        let segments: Vec<String> = self
            .column_widths
            .iter()
            .map(|width| "─".repeat(width + 2))
            .collect();
        format!("{}{}{}", left, segments.join(&mid.to_string()), right)
    }

    fn render_row(&self, row: &[String]) -> String {
        let mut s = String::from("│");
        for (i, width) in self.column_widths.iter().enumerate() {
            let cell = row.get(i).map(String::as_str).unwrap_or("");
            let pad = width.saturating_sub(measure_text_width(cell));
            s.push_str(&format!(" {}{} │", cell, " ".repeat(pad)));
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_table_renders_headers() {
        let table = Table::new(&["Component", "Repository"]);
        assert!(table.is_empty());
        let output = table.render();
        assert!(output.contains("Component"));
        assert!(output.contains("Repository"));
    }

    #[test]
    fn columns_widen_to_fit() {
        let mut table = Table::new(&["Name", "Repo"]);
        table.add_row(["widget", "acme/widget-extended"]);
        assert_eq!(table.row_count(), 1);

        let output = table.render();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[3].contains("acme/widget-extended"));
        let widths: Vec<usize> = lines.iter().map(|l| l.chars().count()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn short_rows_are_padded() {
        let mut table = Table::new(&["A", "B", "C"]);
        table.add_row(["only"]);
        assert!(table.render().contains("│ only │"));
    }
}
