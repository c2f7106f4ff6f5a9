use anyhow::Result;
use clap::{Parser, Subcommand};
use elfabi_core::ElfObject;
use serde::Serialize;

/// Multilib ABI identification CLI
#[derive(Parser)]
#[command(
    name = "elf-abi",
    about = "Identify the multilib ABI of an ELF object (and its GNU_STACK markings)",
    version,
    author
)]
struct Cli {
    /// Path to an ELF object file
    #[arg(required = true)]
    path: std::path::PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the canonical multilib ABI identifier
    Abi {
        /// Emit a JSON report instead of the bare identifier
        #[arg(long)]
        json: bool,
    },
    /// Report the permission flags of the GNU_STACK program header
    GnuStack,
}

#[derive(Serialize)]
struct AbiReport<'a> {
    path: &'a str,
    abi: &'static str,
    machine: u16,
    word_width: u32,
    byte_order: &'static str,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Abi { json } => {
            let obj = ElfObject::open(&cli.path)?;
            if json {
                let report = AbiReport {
                    path: &obj.path,
                    abi: obj.abi().as_str(),
                    machine: obj.identity.machine,
                    word_width: obj.identity.word_width.bits(),
                    byte_order: obj.identity.byte_order.as_str(),
                };
                println!("{}", serde_json::to_string(&report)?);
            } else {
                println!("{}", obj.abi());
            }
        }

        Command::GnuStack => match elfabi_core::gnu_stack(&cli.path)? {
            Some(perms) => println!("GNU_STACK: {perms}"),
            None => println!("No GNU_STACK program header."),
        },
    }

    Ok(())
}
