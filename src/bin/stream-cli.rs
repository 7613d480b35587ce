use std::io::{Read, Write};

use clap::Parser;
use promise_stream::client::StreamClient;
use reqwest::Method;

#[derive(Parser)]
#[command(name = "stream-cli")]
#[command(about = "Send a stream request to a promise server", long_about = None)]
struct Cli {
    /// Server mount point.
    #[arg(short, long, default_value = "http://localhost:8080/ws")]
    url: String,

    /// Handler path relative to the mount point.
    #[arg(short, long, default_value = "/echo")]
    path: String,

    /// HTTP method.
    #[arg(short, long, default_value = "POST")]
    method: String,

    /// Request payload; read from stdin when omitted.
    #[arg(short, long)]
    data: Option<String>,

    /// Print the terminal status as JSON on stderr.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let payload = match cli.data {
        Some(data) => data.into_bytes(),
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };

    let method = Method::from_bytes(cli.method.to_uppercase().as_bytes())?;
    let client = StreamClient::new(&cli.url);
    let response = client.send_with_method(method, &cli.path, &payload).await?;

    std::io::stdout().write_all(&response.payload)?;
    std::io::stdout().flush()?;

    if cli.json {
        eprintln!("{}", serde_json::to_string_pretty(&response.status)?);
    } else {
        eprintln!("status: {}", response.status);
    }

    if !response.status.is_ok() {
        std::process::exit(1);
    }
    Ok(())
}
