//! spv-embed: compile GLSL shader variants and embed the SPIR-V as constants

use anyhow::Context;
use spv_embed::cli::{self, Cli};

fn main() {
    let cli = match Cli::parse(std::env::args_os().skip(1)) {
        Ok(cli) => cli,
        // Usage errors exit 1 like every other failure; help and version go to stdout
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            std::process::exit(1);
        }
        Err(e) => e.exit(),
    };

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();

    if let Err(e) = run(&cli) {
        log::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let written = cli::execute(&cli.command).context("shader embedding failed")?;
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}
