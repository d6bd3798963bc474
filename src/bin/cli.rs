use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;

use typedsql::demo::{self, Person, DEMO_QUERIES};
use typedsql::query::parser;
use typedsql::{EngineConfig, QueryEngine, QueryPlan};

const HISTORY_FILE: &str = ".tsql_history";

#[derive(Parser)]
#[command(author, version, about = "tsql - run typed queries over the demonstration data set")]
struct Cli {
    /// Skip the filter/project fusion optimizer
    #[arg(long)]
    no_optimize: bool,

    /// Dispatch every row individually instead of copying whole slices
    #[arg(long)]
    no_batch: bool,

    /// Command to execute
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive shell
    Shell,

    /// Execute a query directly
    Query {
        /// Query text, e.g. "SELECT Name FROM $ WHERE age > 30"
        query: String,
    },

    /// Show the compiled plan of a query
    Explain {
        /// Query text
        query: String,

        /// Print the parsed query as JSON instead of the plan
        #[arg(long)]
        json: bool,
    },

    /// Run the demonstration queries
    Demo,
}

/// Demonstration rows with an engine that knows their schema
struct Session {
    engine: QueryEngine,
    rows: Vec<Person>,
}

impl Session {
    fn new(config: EngineConfig) -> Self {
        Session {
            engine: QueryEngine::with_registry(demo::registry(), config),
            rows: demo::people(),
        }
    }

    fn plan(&self, query: &str) -> Result<QueryPlan<Person>> {
        self.engine
            .plan::<Person>(query)
            .with_context(|| format!("Failed to compile `{}`", query))
    }

    fn execute_query(&self, query: &str) -> Result<()> {
        let plan = self.plan(query)?;
        display_result(&plan, &self.rows);
        Ok(())
    }

    fn explain(&self, query: &str, json: bool) -> Result<()> {
        if json {
            let parsed = parser::parse(query).with_context(|| format!("Failed to parse `{}`", query))?;
            println!("{}", serde_json::to_string_pretty(&parsed)?);
        } else {
            print!("{}", self.plan(query)?);
        }
        Ok(())
    }

    fn run_demo(&self) -> Result<()> {
        println!("Input data:");
        for row in &self.rows {
            println!("  {:?}", row);
        }
        println!();

        for (title, query) in DEMO_QUERIES {
            println!("-- {}", title);
            let plan = self.plan(query)?;
            print!("{}", plan);
            display_result(&plan, &self.rows);
            println!();
        }
        Ok(())
    }
}

fn display_result(plan: &QueryPlan<Person>, rows: &[Person]) {
    print!("{}", render_result(plan, rows));
}

/// Run `plan` and render the result as a table
fn render_result(plan: &QueryPlan<Person>, rows: &[Person]) -> String {
    let buffer = plan.run(rows);
    let header = plan.public_shape().to_string();

    let mut lines = vec![format!("| {} |", header), format!("+{}+", "-".repeat(header.len() + 2))];
    lines.extend((0..buffer.len()).filter_map(|index| buffer.format_row(index)).map(|row| format!("| {}", row)));
    lines.push(format!("({} rows)", buffer.len()));

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn run_shell(session: &Session) -> Result<()> {
    println!("Welcome to tsql. Type 'help' for assistance or 'exit' to quit.");

    let mut rl = Editor::<(), DefaultHistory>::new()?;
    if let Err(err) = rl.load_history(HISTORY_FILE) {
        if !err.to_string().contains("No such file or directory") {
            println!("Error loading history: {}", err);
        }
    }

    loop {
        match rl.readline("tsql> ") {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);

                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let lower = line.to_lowercase();
                let outcome = match lower.as_str() {
                    "exit" | "quit" => {
                        println!("Goodbye!");
                        break;
                    }
                    "help" => {
                        print_help();
                        Ok(())
                    }
                    "demo" => session.run_demo(),
                    _ => match strip_keyword(line, "explain ") {
                        Some(query) => session.explain(query.trim(), false),
                        None => session.execute_query(line),
                    },
                };

                if let Err(err) = outcome {
                    println!("Error: {:#}", err);
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {}", err);
                break;
            }
        }
    }

    if let Err(err) = rl.save_history(HISTORY_FILE) {
        println!("Error saving history: {}", err);
    }
    Ok(())
}

/// The rest of `line` after a leading `keyword`, ignoring ASCII case
fn strip_keyword<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let head = line.get(..keyword.len())?;
    if head.eq_ignore_ascii_case(keyword) {
        line.get(keyword.len()..)
    } else {
        None
    }
}

const HELP_TEXT: &str = "\
Available commands:
  SELECT * FROM $ [WHERE ...]          - Query the demonstration rows
  SELECT col[, col...] FROM $ ...      - Project columns
  EXPLAIN <query>                      - Show the compiled plan
  demo                                 - Run the demonstration queries

Predicates:
  col = | != | > | >= | < | <= literal - Literals: 42, 2.5, 'text', true, false, null
  AND, OR, NOT, ( ... )                - Combine comparisons

Columns: id, name, age, city, salary, department, isManager,
         yearsAtCompany, country, team, level

Other commands:
  help                                 - Display this help message
  exit                                 - Exit the shell
";

fn print_help() {
    print!("{}", HELP_TEXT);
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let session = Session::new(EngineConfig {
        optimize: !cli.no_optimize,
        batch_shortcut: !cli.no_batch,
    });

    match &cli.command {
        Some(Commands::Shell) | None => run_shell(&session)?,
        Some(Commands::Query { query }) => {
            if let Err(err) = session.execute_query(query) {
                eprintln!("Error executing query: {:#}", err);
            }
        }
        Some(Commands::Explain { query, json }) => session.explain(query, *json)?,
        Some(Commands::Demo) => session.run_demo()?,
    }

    Ok(())
}
