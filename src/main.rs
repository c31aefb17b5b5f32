use clap::Parser;
use mesh::cli::{
    handle_completions, handle_config_init, market, providers, route, Cli, Commands,
    ConfigCommands, ProvidersCommands,
};

fn print_output(
    result: Result<String, Box<dyn std::error::Error>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = result?;
    println!("{}", output);
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve(args) => mesh::cli::serve::run_serve(args).await,
        Commands::Providers(cmd) => match cmd {
            ProvidersCommands::List(args) => {
                print_output(providers::handle_providers_list(&args).await)
            }
            ProvidersCommands::Add(args) => {
                print_output(providers::handle_providers_add(&args).await)
            }
        },
        Commands::Market(args) => print_output(market::handle_market(&args).await),
        Commands::Route(args) => print_output(route::handle_route(&args).await),
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Init(args) => print_output(handle_config_init(&args)),
        },
        Commands::Completions(args) => {
            handle_completions(&args);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
