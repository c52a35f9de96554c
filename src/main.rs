use padel_rust::cli::{list_catalog, parse_args, run_calc, CliError, Command};
use padel_rust::{init_dotenv, EngineConfig, Registry};

fn main() {
    // Cargar .env si existe (PADEL_ENGINE_MODE, PADEL_EPADEL_JAR, ...)
    init_dotenv();
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = run(&args) {
        eprintln!("[padel] {e}");
        std::process::exit(e.exit_code());
    }
}

fn run(args: &[String]) -> Result<(), CliError> {
    match parse_args(args)? {
        Command::List => {
            let registry = Registry::global().map_err(padel_rust::PadelError::from)?;
            print!("{}", list_catalog(registry));
        }
        Command::Calc(calc) => {
            let config = EngineConfig::from_env()?;
            print!("{}", run_calc(&calc, &config)?);
        }
    }
    Ok(())
}
