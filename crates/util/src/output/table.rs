use unicode_width::UnicodeWidthStr;

/// Column gap between cells.
const CELL_PADDING: usize = 2;

/// Left-aligned text table with a header row, sized to its widest cells.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn add_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Render every line, each terminated by a newline. The last column is
    /// not padded.
    pub fn render(&self) -> String {
        let lines: Vec<&Vec<String>> = std::iter::once(&self.headers).chain(self.rows.iter()).collect();
        let columns = lines.iter().map(|line| line.len()).max().unwrap_or(0);
        let widths: Vec<usize> = (0..columns)
            .map(|column| {
                lines
                    .iter()
                    .filter_map(|line| line.get(column))
                    .map(|cell| UnicodeWidthStr::width(cell.as_str()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        for line in lines {
            let mut rendered = String::new();
            for (column, cell) in line.iter().enumerate() {
                rendered.push_str(cell);
                if column + 1 < line.len() {
                    let fill = widths[column] - UnicodeWidthStr::width(cell.as_str()) + CELL_PADDING;
                    rendered.extend(std::iter::repeat_n(' ', fill));
                }
            }
            out.push_str(rendered.trim_end());
            out.push('\n');
        }
        out
    }
}
