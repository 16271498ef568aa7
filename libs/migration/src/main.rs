use core_config::load_dotenv;
use migration::Migrator;
use sea_orm_migration::cli;

/// `DATABASE_URL` may come from a local `.env`; the CLI installs its own subscriber
#[tokio::main]
async fn main() {
    load_dotenv();
    cli::run_cli(Migrator).await;
}
