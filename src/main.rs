//! Faux feelings iceberg explorer
//!
//! Type what you say you feel, pick the faux feelings that fit, and see the
//! feelings and needs underneath.
//!
//! Run with: cargo run
//! One-shot: iceberg search <query> [--json]
//! Server:   iceberg --serve [--port=3100]

use anyhow::Result;
use feelings_iceberg::{
    app::IcebergApp,
    config::Config,
    mcp, render,
    selection::Action,
    server,
    types::GraphGatingMode,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    // Logs go to stderr so stdout stays parseable in --json / --tools mode
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    if args.iter().any(|a| a == "--tools") {
        // Output tool definitions as JSON
        println!("{}", serde_json::to_string_pretty(&mcp::get_tools())?);
        return Ok(());
    }

    let config = Config::load(&args)?;
    let mut app = match IcebergApp::load(&config).await {
        Ok(app) => app,
        Err(e) => {
            tracing::error!("Error loading data: {}", e);
            eprintln!(
                "Error loading feelings data. Please check {} and try again.",
                config.dataset
            );
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };

    let positional: Vec<&str> = args
        .iter()
        .skip(1)
        .filter(|a| !a.starts_with("--"))
        .map(|a| a.as_str())
        .collect();

    if args.iter().any(|a| a == "--serve") {
        return server::run(&mut app, config.port);
    }

    match positional.first() {
        Some(&"search") => {
            let query = positional[1..].join(" ");
            let json_output = args.iter().any(|a| a == "--json");
            run_search(&mut app, &query, json_output)
        }
        Some(other) => {
            eprintln!("Unknown command: {}. Try: search <query>, --serve, --tools, --repl", other);
            std::process::exit(2);
        }
        None => run_cli_mode(&mut app),
    }
}

fn run_search(app: &mut IcebergApp, query: &str, json_output: bool) -> Result<()> {
    let view = app.dispatch(Action::SetQuery(query.to_string()));
    if json_output {
        println!("{}", serde_json::to_string_pretty(&view.search)?);
    } else {
        print!("{}", render::render_view(&view));
    }
    Ok(())
}

// ============================================================================
// REPL
// ============================================================================

fn run_cli_mode(app: &mut IcebergApp) -> Result<()> {
    use std::io::{self, BufRead, Write};

    println!("Faux Feelings Iceberg");
    println!("=====================");
    println!("Type to search, /help for commands, 'quit' to exit.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end_matches(['\r', '\n']);

        if line == "quit" || line == "exit" {
            break;
        }

        if line.starts_with('/') {
            handle_command(app, line);
        } else {
            let view = app.dispatch(Action::SetQuery(line.to_string()));
            print!("{}", render::render_view(&view));
        }
    }

    Ok(())
}

fn handle_command(app: &mut IcebergApp, line: &str) {
    let (cmd, arg) = line.split_once(' ').unwrap_or((line, ""));
    let arg = arg.trim();

    let action = match cmd {
        "/faux" | "/f" => Some(Action::ToggleFauxFeeling(arg.to_string())),
        "/feeling" => Some(Action::ToggleFeeling(arg.to_string())),
        "/need" => Some(Action::ToggleNeed(arg.to_string())),
        "/clear" => Some(Action::ClearQuery),
        "/reset" => Some(Action::ClearSelections),
        _ => None,
    };
    if let Some(action) = action {
        let view = app.dispatch(action);
        print!("{}", render::render_view(&view));
        return;
    }

    match cmd {
        "/graph" => print!("{}", render::render_graph(&app.get_graph())),
        "/view" => match serde_json::to_string_pretty(&app.view()) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error: {}", e),
        },
        "/gating" => match arg.parse::<GraphGatingMode>() {
            Ok(mode) => {
                app.set_gating(mode);
                println!("Graph gating: {}", mode);
            }
            Err(e) => println!("{}", e),
        },
        "/categories" => {
            if app.categories().is_empty() {
                println!("No categories loaded.");
            }
            for category in app.categories() {
                println!("  {:<12} {} - {}", category.id, category.label, category.description);
            }
        }
        "/category" => {
            // /category <id> [feeling]
            let (id, feeling) = arg.split_once(' ').unwrap_or((arg, ""));
            if !feeling.trim().is_empty() {
                app.toggle_category_feeling(id, feeling.trim());
            }
            match app.category_view(id) {
                Some(view) => {
                    println!("{} ({})", view.category.label, view.category.color);
                    for f in &view.feelings {
                        println!("  [{}] {}", if f.selected { "✓" } else { " " }, f.feeling);
                    }
                }
                None => println!("Unknown category: {}", id),
            }
        }
        "/help" => {
            println!("Commands:");
            println!("  <text>                   Search faux feelings and feelings");
            println!("  /faux <label>            Toggle a faux feeling");
            println!("  /feeling <label>         Toggle a feeling (iceberg)");
            println!("  /need <label>            Toggle a need (iceberg)");
            println!("  /clear                   Clear the search");
            println!("  /reset                   Clear all selections");
            println!("  /graph                   Show the iceberg graph");
            println!("  /gating <mode>           faux-only | all-dimensions");
            println!("  /categories              List categories");
            println!("  /category <id> [feeling] Show a category, optionally toggling a feeling");
            println!("  /view                    Dump the view model as JSON");
            println!("  quit                     Exit");
        }
        _ => println!("Unknown command: {}. Try /help", cmd),
    }
}
