#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Entry point for the `EnforceIQ` API server.
//!
//! ```text
//! enforceiq_server            # configure from the environment
//! enforceiq_server --interactive
//! ```

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    if std::env::args().skip(1).any(|arg| arg == "--interactive" || arg == "-i") {
        return enforceiq_server::interactive::run().await;
    }

    enforceiq_server::run_server().await
}
