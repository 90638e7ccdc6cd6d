//! bucketkv CLI
//!
//! Command-line interface operating directly on a database file.

use std::io::{self, Write};
use std::path::PathBuf;

use bucketkv::{Batch, Config, Result, Store};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

/// bucketkv CLI
#[derive(Parser, Debug)]
#[command(name = "bucketkv")]
#[command(about = "Manage buckets and keys in a bucketkv database file")]
#[command(version)]
struct Args {
    /// Database file
    file: PathBuf,

    /// Attempts to open a locked database file
    #[arg(long, default_value = "10")]
    open_attempts: u32,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Add a bucket, or a key/value pair to an existing bucket
    Add {
        bucket: String,

        #[arg(requires = "value")]
        key: Option<String>,

        value: Option<String>,
    },

    /// List buckets, list the keys of a bucket, or print a value
    Get {
        bucket: Option<String>,

        key: Option<String>,
    },

    /// List the values of a bucket, optionally only those containing a string
    Val {
        bucket: String,

        needle: Option<String>,
    },

    /// Delete a bucket and its keys, or a single key
    Del {
        bucket: String,

        key: Option<String>,
    },

    /// Find buckets containing a string, or keys in a bucket containing it
    Find {
        /// Search string, or bucket when a second argument follows
        first: String,

        /// Search string within the bucket
        second: Option<String>,
    },

    /// List the key/value pairs whose key starts with a prefix
    Prefix {
        bucket: String,

        prefix: String,
    },

    /// Read a bucket one page at a time
    Batch {
        bucket: String,

        /// Resume after this key (printed as `next:` by the previous page)
        #[arg(long, default_value = "")]
        after: String,

        /// Entries per page
        #[arg(long, default_value = "10")]
        count: usize,

        /// Keep reading pages until the bucket is exhausted
        #[arg(long)]
        all: bool,
    },

    /// Back up the database to a file
    Backup {
        destination: PathBuf,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(io::stderr).init();

    let args = Args::parse();

    let config = Config::builder()
        .path(&args.file)
        .open_attempts(args.open_attempts)
        .build();

    let store = match Store::open(config) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Could not open database file: {}", e);
            std::process::exit(1);
        }
    };

    let outcome = execute(&store, args.action);

    if let Err(e) = store.close() {
        eprintln!("{}", e);
    }

    if let Err(e) = outcome {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

/// Run one action, printing results on stdout
fn execute(store: &Store, action: Action) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match action {
        Action::Add { bucket, key: None, .. } => store.create_bucket(&bucket)?,
        Action::Add {
            bucket,
            key: Some(key),
            value,
        } => store.write(&bucket, &key, value.unwrap_or_default().as_bytes())?,

        Action::Get { bucket: None, .. } => print_lines(&mut out, store.all_buckets()?)?,
        Action::Get {
            bucket: Some(bucket),
            key: None,
        } => print_lines(&mut out, store.all_keys(&bucket)?)?,
        Action::Get {
            bucket: Some(bucket),
            key: Some(key),
        } => {
            if let Some(value) = store.read(&bucket, &key)? {
                out.write_all(&value)?;
                writeln!(out)?;
            }
        }

        Action::Val { bucket, needle } => {
            let values = match needle {
                Some(needle) => store.find_values(&bucket, needle.as_bytes())?,
                None => store.all_values(&bucket)?,
            };
            for value in values {
                writeln!(out, "{}", String::from_utf8_lossy(&value))?;
            }
        }

        Action::Del { bucket, key: None } => store.delete_bucket(&bucket)?,
        Action::Del {
            bucket,
            key: Some(key),
        } => store.delete(&bucket, &key)?,

        Action::Find {
            first,
            second: None,
        } => print_lines(&mut out, store.find_buckets(&first)?)?,
        Action::Find {
            first,
            second: Some(second),
        } => print_lines(&mut out, store.find_keys(&first, &second)?)?,

        Action::Prefix { bucket, prefix } => {
            for entry in store.iter_prefix(&bucket, &prefix)? {
                let (key, value) = entry?;
                writeln!(out, "{}\t{}", key, String::from_utf8_lossy(&value))?;
            }
        }

        Action::Batch {
            bucket,
            after,
            count,
            all,
        } => {
            let mut batch = Batch::new(bucket, count).resume_after(after);
            loop {
                store.read_batch(&mut batch)?;
                for (key, value) in batch.items() {
                    writeln!(out, "{}\t{}", key, String::from_utf8_lossy(value))?;
                }
                if !all || batch.is_finished() {
                    break;
                }
            }
            if !batch.is_finished() {
                writeln!(out, "next: {}", batch.next_key())?;
            }
        }

        Action::Backup { destination } => store.backup(&destination)?,
    }

    Ok(())
}

fn print_lines(out: &mut impl Write, items: Vec<String>) -> Result<()> {
    for item in items {
        writeln!(out, "{}", item)?;
    }
    Ok(())
}
