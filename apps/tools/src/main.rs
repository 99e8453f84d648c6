use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use shared::domain::{MatterId, MatterStatus};
use storage::{NewMatter, Storage};

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/matters.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    CreateMatter {
        #[arg(long)]
        name: String,
        #[arg(long)]
        number: Option<String>,
        #[arg(long)]
        client: Option<String>,
        #[arg(long)]
        status: Option<MatterStatus>,
    },
    ListMatters,
    SetStatus {
        matter_id: i64,
        status: MatterStatus,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::CreateMatter {
            name,
            number,
            client,
            status,
        } => {
            let matter_id = storage
                .create_matter(&NewMatter {
                    name,
                    number,
                    client_name: client,
                    status,
                })
                .await?;
            println!("created matter_id={matter_id}");
        }
        Command::ListMatters => {
            for matter in storage.list_matters().await? {
                println!("{}\t{}\t{}", matter.id, matter.status, matter.name);
            }
        }
        Command::SetStatus { matter_id, status } => {
            if storage
                .update_matter_status(MatterId(matter_id), status)
                .await?
                .is_none()
            {
                bail!("matter {matter_id} not found");
            }
            println!("matter_id={matter_id} status={status}");
        }
    }

    Ok(())
}
