//! rsq-sign: build (and optionally send) a signed remote SysRq request.

use anyhow::{Context, Result};
use clap::Parser;
use rsq_sign::{build_payload, send_payload, SignRequest};
use rsq_telemetry::{init_logging, TelemetryConfig};
use std::io::Write;

/// Build a signed remote SysRq request
#[derive(Parser, Debug)]
#[command(name = "rsq-sign")]
#[command(about = "Build and send signed remote SysRq requests")]
struct Args {
    /// SysRq command characters, e.g. "s" or "sub"
    #[arg(short, long)]
    commands: String,

    /// Shared secret
    #[arg(short, long, env = "RSQ_PASSWORD", hide_env_values = true)]
    password: String,

    /// Digest algorithm (sha1, sha224, sha256, sha384, sha512)
    #[arg(long, env = "RSQ_HASH", default_value = "sha1")]
    hash: String,

    /// Sequence number (default: current Unix time)
    #[arg(short, long)]
    seqno: Option<i64>,

    /// Salt (default: random hex)
    #[arg(long)]
    salt: Option<String>,

    /// Send the payload to HOST:PORT instead of printing it
    #[arg(long, value_name = "HOST:PORT")]
    send: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let telemetry = TelemetryConfig::for_tool("sign").with_verbose(args.verbose);
    init_logging(&telemetry).context("failed to initialize logging")?;

    let request = SignRequest {
        commands: args.commands,
        password: args.password,
        hash: args.hash,
        seqno: args.seqno,
        salt: args.salt,
    };
    let payload = build_payload(&request)?;

    match args.send {
        Some(target) => {
            send_payload(&target, &payload)?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&payload)?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}
