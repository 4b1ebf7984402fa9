use coalsim::{Scenario, Simulation, SimulationConfig};
use std::env;
use std::path::PathBuf;
use std::process;

const USAGE: &str = "usage: coalsim -f <file> [-cR]";

struct Args {
    file: Option<String>,
    relative_to_cwd: bool,
}

fn parse_args() -> Args {
    let mut parsed = Args {
        file: None,
        relative_to_cwd: false,
    };
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-cR" => parsed.relative_to_cwd = true,
            "-f" => {
                if let Some(file) = args.next() {
                    parsed.file = Some(file);
                }
            }
            other => eprintln!("ignoring unknown argument '{other}'"),
        }
    }
    parsed
}

fn resolve(file: String, relative_to_cwd: bool) -> Result<PathBuf, std::io::Error> {
    if relative_to_cwd {
        Ok(env::current_dir()?.join(file))
    } else {
        Ok(PathBuf::from(file))
    }
}

fn main() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .target(env_logger::Target::Stdout)
        .format_timestamp(None)
        .parse_default_env()
        .init();

    let args = parse_args();
    let Some(file) = args.file else {
        eprintln!("Error: no file specified. Use -f to specify the file.");
        eprintln!("{USAGE}");
        return;
    };

    let path = match resolve(file, args.relative_to_cwd) {
        Ok(path) => path,
        Err(err) => {
            eprintln!("Error: cannot resolve current directory: {err}");
            process::exit(1);
        }
    };

    let scenario = match Scenario::from_file(&path) {
        Ok(scenario) => scenario,
        Err(err) => {
            eprintln!("Error: {}: {err}", path.display());
            process::exit(1);
        }
    };

    let mut sim = match Simulation::from_scenario(scenario, SimulationConfig::default()) {
        Ok(sim) => sim,
        Err(err) => {
            eprintln!("Error: {err}");
            process::exit(1);
        }
    };

    println!("Amount of orders to be delivered: {}", sim.queue().len());
    match sim.run() {
        Ok(report) => {
            println!("Amount of completed orders: {}", report.completed_orders);
            println!("Amount of delivered coal: {}", report.delivered_coal);
        }
        Err(err) => {
            eprintln!("Error: simulation failed: {err}");
            process::exit(1);
        }
    }
}
