//! # rsq-sign
//!
//! Client side of the remote SysRq wire format: builds
//! `commands,seqno,salt,digest` payloads and optionally sends them.

use anyhow::{Context, Result};
use rand::RngCore;
use rsq_telemetry::log_event;
use rsq_01_remote_sysrq::{HashAlgorithm, RequestSigner, SequenceNumber, SharedSecret};
use std::net::{ToSocketAddrs, UdpSocket};

/// Salt length in random bytes; the encoded salt is twice as long.
pub const DEFAULT_SALT_BYTES: usize = 8;

/// Everything needed to build one request.
#[derive(Debug, Clone)]
pub struct SignRequest {
    pub commands: String,
    pub password: String,
    pub hash: String,
    pub seqno: Option<SequenceNumber>,
    pub salt: Option<String>,
}

/// Random lowercase hex salt.
pub fn random_salt(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

/// Current Unix time as a sequence number.
pub fn now_seqno() -> Result<SequenceNumber> {
    SequenceNumber::try_from(shared_types::current_timestamp())
        .context("system clock does not fit a sequence number")
}

/// Build the signed payload for `request`.
pub fn build_payload(request: &SignRequest) -> Result<Vec<u8>> {
    let algorithm: HashAlgorithm = request
        .hash
        .parse()
        .with_context(|| format!("unsupported hash {:?}", request.hash))?;
    let signer = RequestSigner::new(
        SharedSecret::new(request.password.as_bytes()),
        algorithm.engine(),
    )
    .context("password is empty")?;

    let seqno = match request.seqno {
        Some(seqno) => seqno,
        None => now_seqno()?,
    };
    let salt = request
        .salt
        .clone()
        .unwrap_or_else(|| random_salt(DEFAULT_SALT_BYTES));

    tracing::debug!(hash = %algorithm, seqno, salt = %salt, "Signing request");

    signer
        .sign(request.commands.as_bytes(), seqno, salt.as_bytes())
        .context("could not sign request")
}

/// Send `payload` as one UDP datagram. Returns the bytes sent.
pub fn send_payload(target: &str, payload: &[u8]) -> Result<usize> {
    let addr = target
        .to_socket_addrs()
        .with_context(|| format!("cannot resolve {}", target))?
        .next()
        .with_context(|| format!("no address for {}", target))?;
    let bind = if addr.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
    let socket = UdpSocket::bind(bind).context("cannot open UDP socket")?;
    let sent = socket
        .send_to(payload, addr)
        .with_context(|| format!("cannot send to {}", addr))?;
    log_event!(info, "rsq-sign", "Request sent", destination = %addr, bytes = sent);
    Ok(sent)
}
