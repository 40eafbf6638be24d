use clap::Parser;

mod cli;

use cli::setup::Cli;

fn main() {
    let cli = Cli::parse();

    let log_filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "info,relink=debug",
        _ => "trace",
    };
    let log_env = env_logger::Env::default().default_filter_or(log_filter);
    env_logger::Builder::from_env(log_env)
        .format_module_path(false)
        .format_timestamp(None)
        // Indent following lines past the level label, like `[WARN ] `
        .format_indent(Some(8))
        .init();

    if let Err(e) = cli::run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
