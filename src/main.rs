use anyhow::{bail, Context, Result};
use trans_matrix::config::Config;
use trans_matrix::{AppStateContainer, SortOrder};

mod table_display;

use table_display::display_view;

fn print_help() {
    println!("trans-matrix - Translation matrix viewer");
    println!();
    println!("Usage:");
    println!("  trans-matrix [OPTIONS] <DATASET.json>");
    println!();
    println!("Options:");
    println!("  --search <TERM>        - Filter keys and values (case-insensitive)");
    println!("  --sort <COL>[:desc]    - Sort by a language code or column index");
    println!("  --collapse <COL>       - Collapse a column (repeatable)");
    println!("  --page <N>             - Page to show, starting at 1");
    println!("  --page-size <N>        - Rows per page: 25, 50, 100 or 200");
    println!("  --generate-config      - Write a config file with defaults");
    println!("  --logs                 - Print captured log lines to stderr");
    println!("  --help                 - Show this help");
    println!();
}

/// Options collected from the command line
#[derive(Debug, Default)]
struct CliOptions {
    dataset: Option<String>,
    search: Option<String>,
    sort: Option<(String, SortOrder)>,
    collapse: Vec<String>,
    page: Option<usize>,
    page_size: Option<usize>,
    show_logs: bool,
}

fn value_after<'a>(args: &'a [String], pos: usize, flag: &str) -> Result<&'a str> {
    args.get(pos + 1)
        .map(String::as_str)
        .with_context(|| format!("{} needs a value", flag))
}

fn parse_args(args: &[String]) -> Result<CliOptions> {
    let mut options = CliOptions::default();
    let mut pos = 1;

    while pos < args.len() {
        let arg = args[pos].as_str();
        match arg {
            "--search" => {
                options.search = Some(value_after(args, pos, arg)?.to_string());
                pos += 1;
            }
            "--sort" => {
                let spec = value_after(args, pos, arg)?;
                let (column, order) = match spec.rsplit_once(':') {
                    Some((column, "desc")) => (column, SortOrder::Descending),
                    Some((column, "asc")) => (column, SortOrder::Ascending),
                    _ => (spec, SortOrder::Ascending),
                };
                options.sort = Some((column.to_string(), order));
                pos += 1;
            }
            "--collapse" => {
                options.collapse.push(value_after(args, pos, arg)?.to_string());
                pos += 1;
            }
            "--page" => {
                let raw = value_after(args, pos, arg)?;
                options.page = Some(raw.parse().with_context(|| format!("Bad page {:?}", raw))?);
                pos += 1;
            }
            "--page-size" => {
                let raw = value_after(args, pos, arg)?;
                options.page_size =
                    Some(raw.parse().with_context(|| format!("Bad page size {:?}", raw))?);
                pos += 1;
            }
            "--logs" => options.show_logs = true,
            other if other.starts_with("--") => bail!("Unknown option {}", other),
            other => options.dataset = Some(other.to_string()),
        }
        pos += 1;
    }

    Ok(options)
}

/// A column given either as a language code or as a 0-based index
fn resolve_column(app: &AppStateContainer, column: &str) -> Result<usize> {
    app.column_for_code(column)
        .or_else(|| column.parse().ok())
        .with_context(|| {
            format!(
                "No language column {:?} (have {})",
                column,
                app.working().language_codes().join(", ")
            )
        })
}

fn run(options: CliOptions) -> Result<()> {
    let dataset = options
        .dataset
        .context("No dataset given (try --help)")?;

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Using default config: {}", e);
        Config::default()
    });

    let json = std::fs::read_to_string(&dataset)
        .with_context(|| format!("Failed to read {}", dataset))?;
    let mut app = AppStateContainer::with_config(&config);
    if !app.load_json(&json)? {
        println!("Dataset {} has no languages.", dataset);
        return Ok(());
    }

    if let Some(size) = options.page_size {
        if size != app.view_state().page.size && !app.set_page_size(size) {
            bail!("Page size must be one of {:?}", trans_matrix::PAGE_SIZES);
        }
    }

    if let Some(term) = &options.search {
        app.apply_search(term);
    }

    // Searching clears the sort, so sort after it
    if let Some((column, order)) = &options.sort {
        let index = resolve_column(&app, column)?;
        app.toggle_sort(index);
        if *order == SortOrder::Descending {
            app.toggle_sort(index);
        }
    }

    for column in &options.collapse {
        let index = resolve_column(&app, column)?;
        app.toggle_collapse(index);
    }

    if let Some(page) = options.page {
        if page != 1 && !app.set_page(page) {
            bail!("Page {} is out of range (1-{})", page, app.total_pages());
        }
    }

    display_view(&app.get_view());
    Ok(())
}

fn main() -> Result<()> {
    let log_buffer = trans_matrix::logging::init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    // Check for config file generation
    if args.contains(&"--generate-config".to_string()) {
        let path = Config::get_config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Error creating config directory {}", parent.display()))?;
        }
        std::fs::write(&path, Config::create_default_with_comments())
            .with_context(|| format!("Error writing config file {}", path.display()))?;
        println!("Configuration file created at: {:?}", path);
        return Ok(());
    }

    let options = parse_args(&args)?;
    let show_logs = options.show_logs;
    let result = run(options);

    if show_logs {
        for entry in log_buffer.get_recent(100) {
            eprintln!("{}", entry.format_for_display());
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("trans-matrix")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_args() {
        let options = parse_args(&args(&[
            "data.json",
            "--search",
            "hi",
            "--sort",
            "hr:desc",
            "--collapse",
            "en",
            "--page-size",
            "50",
        ]))
        .unwrap();
        assert_eq!(options.dataset.as_deref(), Some("data.json"));
        assert_eq!(options.search.as_deref(), Some("hi"));
        assert_eq!(
            options.sort,
            Some(("hr".to_string(), SortOrder::Descending))
        );
        assert_eq!(options.collapse, vec!["en".to_string()]);
        assert_eq!(options.page_size, Some(50));
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse_args(&args(&["--page"])).is_err());
        assert!(parse_args(&args(&["--page", "two"])).is_err());
        assert!(parse_args(&args(&["--bogus"])).is_err());
    }
}
