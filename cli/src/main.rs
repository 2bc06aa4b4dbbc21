use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use volid_core::{ProbeOptions, VolumeId};
use volid_filesystems::{detect_path, list_available_probes};

#[derive(Parser)]
#[command(name = "volid")]
#[command(about = "Identify the filesystem on a device or image", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe a device or image file
    Probe {
        /// Device or image path
        path: PathBuf,
        /// Byte offset of the extent to probe
        #[arg(short, long)]
        offset: Option<u64>,
        /// Size of the extent in bytes
        #[arg(short, long)]
        size: Option<u64>,
        /// JSON file with probe options
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Only run these probes (comma separated)
        #[arg(long, value_delimiter = ',')]
        only: Option<Vec<String>>,
        /// Print the result as JSON
        #[arg(long, conflicts_with = "export")]
        json: bool,
        /// Print ID_FS_* KEY=VALUE lines
        #[arg(short = 'x', long)]
        export: bool,
    },
    /// List available probes
    ListProbes,
}

/// No probe recognized the volume.
const EXIT_NO_MATCH: u8 = 2;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::ListProbes => {
            println!("Available probes:\n");
            for name in list_available_probes() {
                println!("  {}", name);
            }
        }
        Commands::Probe { path, offset, size, config, only, json, export } => {
            let mut options = match config {
                Some(config) => ProbeOptions::from_json_file(&config)?,
                None => ProbeOptions::default(),
            };
            if let Some(offset) = offset {
                options.offset = offset;
            }
            if size.is_some() {
                options.size = size;
            }
            if only.is_some() {
                options.only = only;
            }

            log::debug!("Probe options: {:?}", options);

            let id = match detect_path(&path, &options)
                .map_err(|e| anyhow::anyhow!("Failed to probe {}: {}", path.display(), e))?
            {
                Some(id) => id,
                None => {
                    eprintln!("{}: unknown volume type", path.display());
                    return Ok(ExitCode::from(EXIT_NO_MATCH));
                }
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&id)?);
            } else if export {
                print_export(&id);
            } else {
                print_human(&path, &id);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_export(id: &VolumeId) {
    println!("ID_FS_USAGE={}", id.usage.map(|u| u.as_str()).unwrap_or(""));
    println!("ID_FS_TYPE={}", id.kind.unwrap_or(""));
    println!("ID_FS_VERSION={}", id.version.as_deref().unwrap_or(""));
    println!("ID_FS_UUID={}", id.uuid.as_deref().unwrap_or(""));
    println!("ID_FS_LABEL={}", id.label_safe().unwrap_or_default());
    println!("ID_FS_LABEL_ENC={}", id.label_encoded().unwrap_or_default());
}

fn print_human(path: &std::path::Path, id: &VolumeId) {
    println!("Volume: {}", path.display());
    println!("  Type: {}", id.kind.unwrap_or("unknown"));
    if let Some(usage) = id.usage {
        println!("  Usage: {}", usage);
    }
    if let Some(version) = &id.version {
        println!("  Version: {}", version);
    }
    if let Some(label) = &id.label {
        println!("  Label: {}", label);
    }
    if let Some(uuid) = &id.uuid {
        println!("  UUID: {}", uuid);
    }
}
