//! cluster-vfs command line entry point

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cluster_vfs::cluster::StaticMetastoreLocator;
use cluster_vfs::config::Config;
use cluster_vfs::manager::FileSystemManager;
use cluster_vfs::provider::{HdfsFileProvider, HDFS_PROVIDER_SCHEMES};
use cluster_vfs::resolver::ClusterResolver;
use cluster_vfs::runtime_test::{RuntimeTester, ShimLoadTest};
use cluster_vfs::vfs::{FileSystemOptions, MemoryLocator};

/// Print usage information
fn print_usage() {
    eprintln!("Usage: cluster-vfs <config.yaml> <command> [args]");
    eprintln!();
    eprintln!("cluster-vfs - Resolve URIs to named Hadoop clusters");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  clusters        List configured named clusters");
    eprintln!("  resolve <uri>   Show the named cluster owning a URI");
    eprintln!("  test <name>     Run runtime tests against a named cluster");
    eprintln!("  ls <uri>        List a folder through the cluster filesystem");
    eprintln!();
    eprintln!("Example:");
    eprintln!("  cluster-vfs /etc/cluster-vfs/clusters.yaml resolve hc://clusterA/data");
}

enum Command {
    Clusters,
    Resolve(String),
    Test(String),
    Ls(String),
}

impl Command {
    fn parse(args: &[String]) -> Option<Self> {
        match args {
            [cmd] if cmd == "clusters" => Some(Command::Clusters),
            [cmd, uri] if cmd == "resolve" => Some(Command::Resolve(uri.clone())),
            [cmd, name] if cmd == "test" => Some(Command::Test(name.clone())),
            [cmd, uri] if cmd == "ls" => Some(Command::Ls(uri.clone())),
            _ => None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let command = match args.get(2..).and_then(Command::parse) {
        Some(c) => c,
        None => {
            print_usage();
            std::process::exit(1);
        }
    };

    let config_path = PathBuf::from(&args[1]);

    // Load configuration
    let config = match Config::from_file(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    }

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Loaded configuration from {:?}", config_path);
    info!(
        "{} named cluster(s) in metastore {:?}",
        config.clusters.len(),
        config.metastore
    );

    // Wire the metastore, registry and provider
    let metastore_locator = Arc::new(StaticMetastoreLocator::new(config.metastore()));
    let registry = Arc::new(config.registry());
    let resolver = ClusterResolver::new(registry.clone(), metastore_locator.clone());

    let manager = FileSystemManager::new();
    let provider = HdfsFileProvider::new(
        Arc::new(MemoryLocator::new(config.installed_shims.clone())),
        registry,
        metastore_locator,
    );
    manager.add_provider(&HDFS_PROVIDER_SCHEMES, Arc::new(provider))?;

    match command {
        Command::Clusters => {
            print!("{}", serde_yaml::to_string(&resolver.all_clusters())?);
        }
        Command::Resolve(uri) => {
            let cluster = resolver.resolve(&uri);
            print!("{}", serde_yaml::to_string(&cluster)?);
        }
        Command::Test(name) => {
            let Some(cluster) = resolver.all_clusters().into_iter().find(|c| c.name == name)
            else {
                error!("No named cluster called {:?}", name);
                std::process::exit(1);
            };

            let mut tester = RuntimeTester::new();
            tester.register(Arc::new(ShimLoadTest::new()));

            let mut failed = false;
            for (id, summary) in tester.run_all(&cluster) {
                println!(
                    "[{}] {}: {}",
                    summary.max_severity(),
                    id,
                    summary.overall.description
                );
                println!("    {}", summary.overall.message);
                failed |= !summary.max_severity().is_passing();
            }
            if failed {
                std::process::exit(2);
            }
        }
        Command::Ls(uri) => {
            let (fs, name) = manager.resolve(&uri, &FileSystemOptions::new())?;
            info!(
                "Listing {} on named cluster {:?}",
                name,
                fs.cluster().name
            );
            for status in fs.list_children(&name.path).await? {
                let kind = if status.is_folder() { "d" } else { "-" };
                println!("{} {:>12} {}", kind, status.len, status.path);
            }
        }
    }

    Ok(())
}
