use std::{net::IpAddr, path::PathBuf};

use anyhow::Result;
use essentials::info;
use structopt::StructOpt;
use taskflow::Config;

#[derive(Debug, StructOpt)]
#[structopt(name = "taskflow", about = "Serves the TaskFlow API and frontend.")]
struct Opt {
    /// Address to listen on [env: HOST]
    #[structopt(long)]
    host: Option<IpAddr>,

    /// Port to listen on [env: PORT]
    #[structopt(short, long)]
    port: Option<u16>,

    /// Directory with the built frontend [env: DIST_PATH]
    #[structopt(long, parse(from_os_str))]
    dist: Option<PathBuf>,

    /// SQLite database file [env: DB_DATABASE]
    #[structopt(long, parse(from_os_str))]
    database: Option<PathBuf>,

    #[structopt(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Serve the API and frontend (default)
    Serve,
    /// Create the sample todos, settings and SEO entries that are missing, then exit
    Seed,
}

#[tokio::main]
async fn main() -> Result<()> {
    essentials::install();
    let opt = Opt::from_args();
    let mut config = Config::from_env()?;
    if let Some(host) = opt.host {
        config = config.with_host(host);
    }
    if let Some(port) = opt.port {
        config = config.with_port(port);
    }
    if let Some(dist) = opt.dist {
        config = config.with_dist_path(dist);
    }
    if let Some(database) = opt.database {
        config = config.with_database(taskflow::config::Database::Sqlite(database));
    }
    info!(
        env = config.env.as_str(),
        dist = ?config.dist_path,
        database = ?config.database,
        "Loaded configuration"
    );
    let builder = taskflow::builder(config).connect().await?;
    match opt.command.unwrap_or(Command::Serve) {
        Command::Seed => {
            let stores = builder.stores().clone();
            tokio::task::spawn_blocking(move || taskflow::store::seed(&stores)).await??;
        }
        Command::Serve => {
            let server = builder.build()?;
            info!(addr = %server.addr(), "Starting TaskFlow");
            server.run().await;
        }
    }
    Ok(())
}
