use clap::Parser;
use todo_list::cli::commands::Cli;
use todo_list::cli::handlers;

fn main() {
    todo_list::logging::init();
    let cli = Cli::parse();

    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
