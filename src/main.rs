use clap::Parser;
use log::debug;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

use kmap_solver::token::format_tokens;
use kmap_solver::{Cell, Form, KMap, Minimized, Session, TruthTable, VarContext};

//
// TRUTH TABLE AND K-MAP PRINTING
//

fn border(left: &str, mid: &str, right: &str, widths: &[usize]) -> String {
    let cols: Vec<String> = widths.iter().map(|&w| "─".repeat(w)).collect();
    format!("{}{}{}", left, cols.join(mid), right)
}

fn row(cells: &[String], widths: &[usize]) -> String {
    let cols: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &w)| format!("{:^w$}", cell, w = w))
        .collect();
    format!("│{}│", cols.join("│"))
}

/// Prints the truth table with one column per variable, then `Y` and `m`.
fn print_truth_table(table: &TruthTable) {
    // Extra padding for each column.
    let padding = 2;
    let mut header: Vec<String> = table
        .context()
        .names()
        .iter()
        .map(char::to_string)
        .collect();
    header.push("Y".to_string());
    header.push("m".to_string());
    let widths: Vec<usize> = header.iter().map(|h| h.len().max(2) + padding * 2).collect();

    println!("{}", border("┌", "┬", "┐", &widths));
    println!("{}", row(&header, &widths));
    println!("{}", border("├", "┼", "┤", &widths));
    for r in table.rows() {
        let mut cells: Vec<String> = r
            .env
            .values()
            .iter()
            .map(|&v| u8::from(v).to_string())
            .collect();
        cells.push(u8::from(r.y).to_string());
        cells.push(r.m.to_string());
        println!("{}", row(&cells, &widths));
    }
    println!("{}", border("└", "┴", "┘", &widths));
}

/// Prints the map as a Gray-coded grid, rows labelled by the leading variables.
fn print_kmap(kmap: &KMap) {
    let layout = kmap.layout();
    let corner = format!(
        "{}\\{}",
        layout.row_names().iter().collect::<String>(),
        layout.col_names().iter().collect::<String>()
    );
    let mut widths = vec![corner.len() + 2];
    widths.extend(std::iter::repeat(6).take(layout.cols()));

    let mut header = vec![corner];
    header.extend(layout.col_labels());
    println!("{}", border("┌", "┬", "┐", &widths));
    println!("{}", row(&header, &widths));
    println!("{}", border("├", "┼", "┤", &widths));
    for (label, cells) in layout.row_labels().into_iter().zip(kmap.grid()) {
        let mut line = vec![label];
        line.extend(cells.iter().map(Cell::to_string));
        println!("{}", row(&line, &widths));
    }
    println!("{}", border("└", "┴", "┘", &widths));
}

fn print_minimized(result: &Minimized) {
    println!("{}: {}", result.form, result.expression);
    let terms: Vec<&str> = result.implicants.iter().map(|imp| imp.term()).collect();
    println!("Implicants: [{}] in {:?}", terms.join(", "), result.elapsed);
}

//
// COMMAND-LINE INTERFACE (Clap)
//

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Display the simplified expression.
    #[clap(short = 's', long = "simplify")]
    simplify: bool,

    /// Display the truth table.
    #[clap(short = 't', long = "table")]
    table: bool,

    /// Display the Karnaugh map.
    #[clap(short = 'k', long = "kmap")]
    kmap: bool,

    /// Simplify to product-of-sums instead of sum-of-products.
    #[clap(short = 'p', long = "pos")]
    pos: bool,

    /// Show the token stream and postfix form of the expression.
    #[clap(long = "postfix")]
    postfix: bool,

    /// Number of variables (2 to 4). Derived from the input when omitted.
    #[clap(short = 'n', long = "vars")]
    vars: Option<usize>,

    /// Minterms to import instead of an expression, e.g. "1,3,5".
    #[clap(short = 'm', long = "minterms", conflicts_with = "expression")]
    minterms: Option<String>,

    /// Cells to mark as don't-care, e.g. "4,5".
    #[clap(short = 'd', long = "dont-cares")]
    dont_cares: Option<String>,

    /// Log level: off, error, warn, info, debug or trace.
    #[clap(long = "log-level", default_value = "warn")]
    log_level: LevelFilter,

    /// Boolean expression (e.g., A'B + AC). If the expression contains spaces, use quotes.
    expression: Vec<String>,
}

fn run(args: &Args) -> kmap_solver::Result<()> {
    let context = args.vars.map(VarContext::new).transpose()?;
    let mut session = Session::default();

    if let Some(list) = &args.minterms {
        let dont_cares = args.dont_cares.as_deref().unwrap_or("");
        session.import_with_dont_cares(list, dont_cares, context)?;
    } else {
        let input_str = args.expression.join(" ");
        let eval = match context {
            Some(ctx) => session.evaluate_with(&input_str, ctx)?,
            None => session.evaluate(&input_str)?,
        };
        if args.postfix {
            println!("Tokens:  {}", format_tokens(&eval.tokens));
            println!("Postfix: {}", format_tokens(&eval.postfix));
        }
        if let Some(list) = &args.dont_cares {
            session.mark_dont_cares(list)?;
        }
    }
    debug!("cells: {:?}", session.kmap().cells());

    let form = if args.pos { Form::Pos } else { Form::Sop };
    // If no output flag is set, display everything.
    let all = !args.simplify && !args.table && !args.kmap;
    if all || args.simplify {
        print_minimized(&session.simplify(form));
    }
    if all || args.table {
        println!("\nTruth Table:");
        print_truth_table(&session.truth_table()?);
    }
    if all || args.kmap {
        println!("\nK-Map:");
        print_kmap(session.kmap());
    }
    Ok(())
}

//
// MAIN FUNCTION
//

fn main() {
    let args = Args::parse();

    if let Err(e) = TermLogger::init(
        args.log_level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Warning: could not initialize logging: {}", e);
    }

    if args.expression.is_empty() && args.minterms.is_none() {
        eprintln!("Error: Please provide a Boolean expression or --minterms.");
        std::process::exit(1);
    }
    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
