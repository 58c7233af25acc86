//! Entry point for the cache server.
#![forbid(unsafe_code)]

use pota_cache_server::ServerError;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match pota_cache_server::run().await {
        Ok(()) => {}
        Err(ServerError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("pota-cache: {err}");
            std::process::exit(1);
        }
    }
}
