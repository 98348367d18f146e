use chrono::NaiveDate;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Load one or more IDR tables into the destination database
    Load {
        #[arg(long, help = "Source (IDR) connection string")]
        source: String,

        #[arg(long, help = "Destination connection string")]
        target: String,

        #[arg(
            long,
            help = "Tables to load, in order (defaults to every known table)"
        )]
        table: Vec<String>,

        /// Load mode: "local" or "idr"
        #[arg(long, default_value = "idr")]
        mode: String,

        #[arg(long, default_value_t = 100_000, help = "Rows per batch")]
        batch_size: usize,

        #[arg(
            long,
            default_value = "2018-01-01",
            help = "Extraction floor for incremental scans"
        )]
        min_transaction_date: NaiveDate,

        #[arg(long, help = "Persist load progress even in local mode")]
        force_load_progress: bool,

        #[arg(long, default_value = "0", help = "Partition key for progress rows")]
        partition: String,
    },
    /// Show the persisted progress row for a table
    Progress {
        #[arg(long, help = "Destination connection string")]
        target: String,

        #[arg(long, help = "Destination table, e.g. idr.beneficiary")]
        table: String,

        #[arg(long, default_value = "0", help = "Partition key")]
        partition: String,

        #[arg(long, help = "Print the progress row as JSON instead of a table")]
        json: bool,
    },
    /// Test a Postgres connection string
    TestConn {
        #[arg(long)]
        conn_str: String,
    },
}
