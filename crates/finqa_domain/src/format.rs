use crate::{Error, TableCell};

/// Renders a table as markdown, with the first row as header.
///
/// Cells are left aligned and padded to the widest cell of their column.
pub fn markdown_table(rows: &[Vec<TableCell>]) -> Result<String, Error> {
    if rows.is_empty() {
        return Err(Error::EmptyTable);
    }

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect();

    let columns = cells.iter().map(Vec::len).max().unwrap_or_default();
    let widths: Vec<usize> = (0..columns)
        .map(|column| {
            cells
                .iter()
                .filter_map(|row| row.get(column))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or_default()
        })
        .collect();

    let render_row = |row: &Vec<String>| {
        let mut line = String::from("|");
        for (cell, width) in row.iter().zip(&widths) {
            line.push_str(&format!(" {cell:<width$} |"));
        }
        line
    };

    let separator = format!(
        "|{}|",
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("|")
    );

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(render_row(&cells[0]));
    lines.push(separator);
    lines.extend(cells[1..].iter().map(render_row));
    Ok(lines.join("\n"))
}

/// Joins sentences into a single paragraph.
pub fn paragraph(sentences: &[String]) -> String {
    sentences.join(" ")
}
