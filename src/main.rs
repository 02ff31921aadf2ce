use clap::Parser;
use sessionguard::cli::{
    Args, Command, GenerateArgs, ServeArgs, build_config, example_payload, generate_token,
    init_logging, load_signing_key,
};
use sessionguard::{create_app, run_server};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(&args.log_format);

    match args.command {
        Command::Serve(serve) => run_serve(serve).await,
        Command::Generate(generate) => run_generate(generate),
    }
}

async fn run_serve(args: ServeArgs) {
    let Some(signing_key) = load_signing_key(args.signing_key_file.as_deref()) else {
        std::process::exit(1);
    };

    let app = match build_config(&args, signing_key).and_then(create_app) {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            error!(address = %addr, error = %e, "Failed to bind");
            std::process::exit(1);
        });

    match listener.local_addr() {
        Ok(local_addr) => info!(
            address = %local_addr,
            cookie = %args.cookie_name,
            token_expires_in = args.token_expires_in,
            max_renewal_time = args.max_renewal_time,
            "Listening"
        ),
        Err(e) => error!(error = %e, "Failed to get local address"),
    }

    if let Err(e) = run_server(app, listener).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

fn run_generate(args: GenerateArgs) {
    let Some(payload) = args.payload else {
        println!(
            "Please provide an identity payload with --payload. A valid example could be: {}",
            example_payload()
        );
        return;
    };

    let Some(signing_key) = load_signing_key(args.signing_key_file.as_deref()) else {
        std::process::exit(1);
    };

    match generate_token(signing_key, &payload) {
        Ok(token) => {
            println!("Generated Token:");
            println!("{}", token);
        }
        Err(e) => {
            error!(error = %e, "Failed to generate token");
            std::process::exit(1);
        }
    }
}
