//! HTML table reports.

use std::fmt::Write;
use welltab_engine::engine::Table;

/// Row cap for the print/PDF rendering.
pub const PRINT_ROW_LIMIT: usize = 500;

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Full HTML document with every row of the table.
pub fn render_html(table: &Table, title: &str) -> String {
    render(table, title, None)
}

/// HTML document for printing, limited to [`PRINT_ROW_LIMIT`] rows.
pub fn render_print_html(table: &Table, title: &str) -> String {
    render(table, title, Some(PRINT_ROW_LIMIT))
}

fn render(table: &Table, title: &str, row_limit: Option<usize>) -> String {
    let title = escape_html(title);
    let shown = row_limit.map_or(table.row_count(), |limit| table.row_count().min(limit));
    let generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");

    let mut html = String::new();
    // fmt::Write into a String cannot fail
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
         <style>\n\
         body {{ font-family: sans-serif; margin: 20px; }}\n\
         table {{ border-collapse: collapse; width: 100%; }}\n\
         th, td {{ border: 1px solid #ccc; padding: 4px 8px; text-align: left; }}\n\
         th {{ background: #f0f0f0; }}\n\
         .summary {{ color: #555; margin-bottom: 12px; }}\n\
         </style>\n</head>\n<body>\n<h1>{title}</h1>\n\
         <div class=\"summary\">{} rows × {} columns, generated {generated}</div>\n",
        table.row_count(),
        table.column_count(),
    );

    html.push_str("<table>\n<thead>\n<tr>");
    for header in table.headers() {
        let _ = write!(html, "<th>{}</th>", escape_html(header));
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");
    for row in 0..shown {
        html.push_str("<tr>");
        for text in table.row_texts(row) {
            let _ = write!(html, "<td>{}</td>", escape_html(text));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n");

    if shown < table.row_count() {
        let _ = writeln!(
            html,
            "<p class=\"note\">Showing the first {} of {} rows.</p>",
            shown,
            table.row_count()
        );
    }
    html.push_str("</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>&\"'"), "&lt;b&gt;&amp;&quot;&#39;");
    }

    #[test]
    fn test_render_escapes_cells_and_counts() {
        let t = Table::from_rows(["p<1>"], [vec!["a&b"], vec!["2"]]);
        let html = render_html(&t, "Well <A>");
        assert!(html.contains("<title>Well &lt;A&gt;</title>"));
        assert!(html.contains("<th>p&lt;1&gt;</th>"));
        assert!(html.contains("<td>a&amp;b</td>"));
        assert!(html.contains("2 rows × 1 columns"));
        assert!(!html.contains("Showing the first"));
    }

    #[test]
    fn test_print_html_is_capped() {
        let rows: Vec<Vec<String>> = (0..PRINT_ROW_LIMIT + 5).map(|i| vec![i.to_string()]).collect();
        let t = Table::from_rows(["n"], rows);
        let html = render_print_html(&t, "big");
        assert_eq!(html.matches("<td>").count(), PRINT_ROW_LIMIT);
        assert!(html.contains("Showing the first 500 of 505 rows."));
    }
}
