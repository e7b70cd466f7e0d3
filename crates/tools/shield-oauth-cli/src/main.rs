use clap::Parser;
use shield_oauth_cli::cli::Args;
use shield_oauth_cli::error::ToolError;

#[tokio::main]
async fn main() -> Result<(), ToolError> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    match args.run().await {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}
