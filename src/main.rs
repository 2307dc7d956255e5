use clap::Parser;

mod commands;

use commands::release;
use item_tracker_release::{args, output};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "item-tracker-release")]
#[command(version = VERSION)]
#[command(about = "Build the item-tracker docker images and optionally publish them")]
#[command(after_help = "Example:\n  item-tracker-release -BUILD_VERSION 1.0.0 -PUBLISH \
    -DOCKER_REGISTRY registry.example.com -DOCKER_REGISTRY_USERNAME user \
    -DOCKER_REGISTRY_PASSWORD password")]
struct Cli {
    #[command(flatten)]
    release: release::ReleaseArgs,
}

fn main() -> std::process::ExitCode {
    let argv = args::normalize(std::env::args().collect());

    let cli = match Cli::try_parse_from(argv) {
        Ok(cli) => cli,
        Err(e) => {
            e.exit();
        }
    };

    let (json_result, exit_code) = commands::run_json(cli.release);

    if let Err(err) = output::print_result(json_result) {
        eprintln!("{}", err);
    }

    std::process::ExitCode::from(output::exit_code_to_u8(exit_code))
}
