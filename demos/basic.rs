//! Basic usage example
//!
//! Try `cargo run --example basic -- --worker-count 8` or
//! `DEMO_LISTEN_ADDR=0.0.0.0:9000 cargo run --example basic`.

use std::time::Duration;

use flagconf::{FlagConf, Record};

#[derive(Debug, Default, FlagConf)]
struct Config {
    // --listen-addr / DEMO_LISTEN_ADDR
    #[conf(default = "127.0.0.1:8080", help = "address to listen on")]
    pub listen_addr: String,

    // --worker-count / DEMO_WORKER_COUNT
    #[conf(default = 4, help = "number of worker threads")]
    pub worker_count: usize,

    // --shutdown-grace / DEMO_SHUTDOWN_GRACE
    #[conf(default = "10s", help = "time allowed for in-flight requests on shutdown")]
    pub shutdown_grace: Duration,

    // --debug-mode / DEMO_DEBUG_MODE
    #[conf(default = false)]
    pub debug_mode: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut config = Config::default();
    let mut flags = config.bind("demo")?;
    flags.parse_env_args()?;
    drop(flags);

    println!("Configuration loaded:");
    println!("  Listen Address: {}", config.listen_addr);
    println!("  Worker Count: {}", config.worker_count);
    println!("  Shutdown Grace: {:?}", config.shutdown_grace);
    println!("  Debug Mode: {}", config.debug_mode);

    Ok(())
}
