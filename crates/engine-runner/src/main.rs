//! Storyloom Engine - server for the build-your-own adventure game
//!
//! This crate is the *composition root*: it loads the environment, wires the
//! store adapter into the engine, and starts the server.

mod run;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run::run().await
}
