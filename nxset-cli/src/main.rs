//! nxset CLI
//!
//! A command-line front end for managing ipset sets.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nxset_ipset::{Family, Ipset, IpsetConfig, Options, SetType};

/// nxset - typed ipset management
#[derive(Parser)]
#[command(name = "nxset")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a set
    Create {
        name: String,
        /// Set type, e.g. hash:ip or hash:net,iface
        #[arg(value_name = "TYPE")]
        set_type: SetType,
        #[command(flatten)]
        create: CreateFlags,
    },

    /// Add an entry to a set
    Add {
        #[command(flatten)]
        target: Target,
        entry: String,
        #[command(flatten)]
        entry_flags: EntryFlags,
    },

    /// Delete an entry from a set
    Del {
        #[command(flatten)]
        target: Target,
        entry: String,
        /// Do not fail if the entry is missing
        #[arg(long)]
        exist: bool,
    },

    /// Test whether an entry is in a set; exits 1 when it is not
    Test {
        #[command(flatten)]
        target: Target,
        entry: String,
    },

    /// List a set
    List {
        name: String,
        /// Resolve addresses to hostnames
        #[arg(long)]
        resolve: bool,
        /// Write the listing to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Save a set in restore format
    Save {
        name: String,
        /// Write the dump to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Flush the named sets, or every set when none is named
    Flush { names: Vec<String> },

    /// Destroy the named sets, or every set when none is named
    Destroy { names: Vec<String> },

    /// Swap the contents of two sets
    Swap { from: String, to: String },

    /// Rename a set
    Rename { from: String, to: String },

    /// Restore sets from a save dump
    Restore {
        /// Dump produced by `save`
        file: PathBuf,
    },

    /// Print the ipset utility version
    Version,

    /// Convert between dotted IPv4 addresses and integers
    Ipconv {
        /// An IPv4 address or an unsigned integer
        value: String,
    },

    /// Check whether a TCP endpoint accepts connections
    Probe {
        /// Address as host:port
        addr: String,
        /// Connect timeout in milliseconds
        #[arg(short, long, default_value_t = 1000)]
        timeout: u64,
    },

    /// Generate a sample configuration file
    GenConfig {
        /// Output path for the configuration file
        #[arg(short, long, default_value = "nxset.toml")]
        output: PathBuf,
    },
}

#[derive(Args)]
struct Target {
    /// Set name
    name: String,
    /// Set type; decides which entry modifiers apply
    #[arg(short = 't', long = "type", default_value = "hash:ip")]
    set_type: SetType,
}

#[derive(Args)]
struct CreateFlags {
    /// Default entry timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
    /// Do not fail if an identical set exists
    #[arg(long)]
    exist: bool,
    /// Enable per-entry counters
    #[arg(long)]
    counters: bool,
    /// Enable per-entry comments
    #[arg(long)]
    comment: bool,
    /// Enable skb metadata
    #[arg(long)]
    skbinfo: bool,
    /// Address family (inet, inet6)
    #[arg(long)]
    family: Option<Family>,
    /// Initial hash size
    #[arg(long)]
    hashsize: Option<u64>,
}

#[derive(Args)]
struct EntryFlags {
    /// Entry timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
    /// Do not fail if the entry already exists
    #[arg(long)]
    exist: bool,
    /// Initial packet counter
    #[arg(long)]
    packets: Option<u64>,
    /// Initial byte counter
    #[arg(long)]
    bytes: Option<u64>,
    /// Entry comment
    #[arg(long)]
    comment: Option<String>,
    /// skb mark, e.g. 0x1/0xff
    #[arg(long)]
    skbmark: Option<String>,
    /// skb priority, e.g. 1:10
    #[arg(long)]
    skbprio: Option<String>,
    /// skb queue number
    #[arg(long)]
    skbqueue: Option<u64>,
    /// Add the entry as an exception
    #[arg(long)]
    nomatch: bool,
}

impl CreateFlags {
    fn apply(&self, opts: &mut Options) {
        opts.exist = self.exist;
        opts.counters = self.counters;
        opts.comment = self.comment;
        opts.skb_info = self.skbinfo;
        opts.family = self.family;
        if let Some(secs) = self.timeout {
            opts.timeout = Duration::from_secs(secs);
        }
        if let Some(size) = self.hashsize {
            opts.hash_size = size;
        }
    }
}

impl EntryFlags {
    fn apply(&self, opts: &mut Options) {
        opts.exist = self.exist;
        opts.no_match = self.nomatch;
        if let Some(secs) = self.timeout {
            opts.timeout = Duration::from_secs(secs);
        }
        opts.counters_packets = self.packets.unwrap_or_default();
        opts.counters_bytes = self.bytes.unwrap_or_default();
        opts.skb_queue = self.skbqueue.unwrap_or_default();
        if let Some(comment) = &self.comment {
            opts.comment_content.push_str(comment);
        }
        if let Some(mark) = &self.skbmark {
            opts.skb_mark.push_str(mark);
        }
        if let Some(prio) = &self.skbprio {
            opts.skb_prio.push_str(prio);
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level);

    match cli.command {
        Commands::Ipconv { value } => ipconv(&value),
        Commands::Probe { addr, timeout } => probe(&addr, Duration::from_millis(timeout)),
        Commands::GenConfig { output } => generate_config(output),
        command => {
            let config = load_config(cli.config.as_deref())?;
            let ipset = Ipset::from_config(&config).context("Failed to initialize ipset")?;
            run(&ipset, command)
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&Path>) -> Result<IpsetConfig> {
    match path {
        Some(path) => IpsetConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {:?}", path)),
        None => Ok(IpsetConfig::default()),
    }
}

fn run(ipset: &Ipset, command: Commands) -> Result<()> {
    match command {
        Commands::Create {
            name,
            set_type,
            create,
        } => {
            let mut opts = ipset.options();
            create.apply(&mut opts);
            ipset.create(&name, set_type, &opts)?;
            info!("Created set {} ({})", name, set_type);
        }
        Commands::Add {
            target,
            entry,
            entry_flags,
        } => {
            let mut opts = ipset.options();
            entry_flags.apply(&mut opts);
            ipset.set(&target.name, target.set_type).add(&entry, &opts)?;
        }
        Commands::Del {
            target,
            entry,
            exist,
        } => {
            let mut opts = ipset.options();
            opts.exist = exist;
            ipset.set(&target.name, target.set_type).del(&entry, &opts)?;
        }
        Commands::Test { target, entry } => {
            let found = ipset.set(&target.name, target.set_type).test(&entry)?;
            if !found {
                println!("{} is NOT in set {}", entry, target.name);
                std::process::exit(1);
            }
            println!("{} is in set {}", entry, target.name);
        }
        Commands::List {
            name,
            resolve,
            output,
        } => {
            let mut opts = ipset.options();
            opts.resolve = resolve;
            // the set type does not reach list arguments
            let set = ipset.set(&name, SetType::HashIp);
            match output {
                Some(path) => set
                    .list_to_file(&path, &opts)
                    .with_context(|| format!("Failed to list {} to {:?}", name, path))?,
                None => write_stdout(&set.list(&opts)?)?,
            }
        }
        Commands::Save { name, output } => {
            let set = ipset.set(&name, SetType::HashIp);
            match output {
                Some(path) => set
                    .save_to_file(&path, &Options::EMPTY)
                    .with_context(|| format!("Failed to save {} to {:?}", name, path))?,
                None => write_stdout(&set.save(&Options::EMPTY)?)?,
            }
        }
        Commands::Flush { names } => {
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            ipset.flush(&names)?;
        }
        Commands::Destroy { names } => {
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            ipset.destroy(&names)?;
        }
        Commands::Swap { from, to } => ipset.swap(&from, &to)?,
        Commands::Rename { from, to } => {
            let mut set = ipset.set(&from, SetType::HashIp);
            set.rename(&to)?;
        }
        Commands::Restore { file } => ipset
            .restore_from_file(&file)
            .with_context(|| format!("Failed to restore from {:?}", file))?,
        Commands::Version => println!("{}", ipset.version()?),
        Commands::Ipconv { .. } | Commands::Probe { .. } | Commands::GenConfig { .. } => {
            unreachable!("handled before the utility is located")
        }
    }
    Ok(())
}

fn write_stdout(data: &[u8]) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(data)?;
    stdout.flush()?;
    Ok(())
}

fn ipconv(value: &str) -> Result<()> {
    if let Ok(n) = value.parse::<u32>() {
        println!("{}", nxset_netutil::long_to_v4(n));
        return Ok(());
    }
    let n = nxset_netutil::v4_to_long(value)
        .with_context(|| format!("{:?} is neither an integer nor an IPv4 address", value))?;
    println!("{}", n);
    Ok(())
}

fn probe(addr: &str, timeout: Duration) -> Result<()> {
    debug!("Probing {} with timeout {:?}", addr, timeout);
    if nxset_netutil::detect(addr, timeout).with_context(|| format!("Failed to probe {}", addr))? {
        println!("{} is reachable", addr);
        Ok(())
    } else {
        bail!("{} is not reachable", addr)
    }
}

fn generate_config(output: PathBuf) -> Result<()> {
    std::fs::write(&output, IpsetConfig::sample())
        .with_context(|| format!("Failed to write configuration to {:?}", output))?;

    info!("Generated sample configuration at {:?}", output);
    println!("Sample configuration written to {:?}", output);

    Ok(())
}
