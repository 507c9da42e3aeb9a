use cidr_algebra::cli::run;
use cidr_algebra::config::Config;
use cidr_algebra::output::format_parse_error;
use clap::Parser;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    dotenv::dotenv().ok();
    let config = Config::parse();
    if let Err(e) = log4rs::init_file(&config.log_config, Default::default()) {
        eprintln!("Logging disabled, {}: {e}", config.log_config.display());
    }
    log::info!("#Start main()");

    let report = run(&config)?;
    for (source, err) in &report.parse_errors {
        eprintln!("{source}: {}", format_parse_error(err));
    }
    println!("{}", report.output);

    Ok(())
}
