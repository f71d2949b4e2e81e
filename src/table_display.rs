use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use trans_matrix::markup::rendered_text;
use trans_matrix::MatrixView;

/// Marker painted in place of a collapsed column's content
const COLLAPSED: &str = "…";

pub fn display_view(view: &MatrixView) {
    if view.columns.is_empty() {
        println!("No languages loaded.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let mut headers = vec![Cell::new("key").add_attribute(Attribute::Bold)];
    headers.extend(view.columns.iter().map(|column| {
        let label = if column.collapsed {
            format!("{} {}", column.code, COLLAPSED)
        } else {
            column.code.clone()
        };
        Cell::new(label).add_attribute(Attribute::Bold)
    }));
    table.set_header(headers);

    for row in &view.rows {
        let mut cells = vec![row.key.clone()];
        cells.extend(row.cells.iter().map(|cell| {
            if cell.collapsed {
                COLLAPSED.to_string()
            } else {
                rendered_text(&cell.value)
            }
        }));
        table.add_row(cells);
    }

    println!("{table}");
    println!("\n{}", view.pagination_info());
    if view.total_pages > 1 {
        println!("Page {} of {}", view.page_number, view.total_pages);
    }
}
