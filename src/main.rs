use anyhow::Result;

mod command;
mod error;

#[tokio::main]
async fn main() -> Result<()> {
    command::run().await
}
