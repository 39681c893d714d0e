use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Mutating admission webhook pinning StatefulSet replicas to nodes by ordinal
#[derive(Parser, Debug, Clone)]
#[command(name = "statefulset-affinity-injector-webhook", version, about, long_about = None)]
pub struct ServerOptions {
    /// Serve HTTPS using the certificate and key files
    #[arg(long, env = "ENABLE_TLS")]
    pub enable_tls: bool,

    /// PEM certificate chain, ignored if TLS is not enabled
    #[arg(long, env = "CERT_FILE", default_value = "./secrets/certs/tls.crt")]
    pub cert_file: PathBuf,

    /// PEM private key, ignored if TLS is not enabled
    #[arg(long, env = "KEY_FILE", default_value = "./secrets/certs/tls.key")]
    pub key_file: PathBuf,

    /// Seconds to wait for in-flight requests after SIGINT/SIGTERM
    #[arg(long, env = "GRACEFUL_SHUTDOWN_SECONDS", default_value_t = 5)]
    pub graceful_shutdown_seconds: u64,

    /// Listen port [default: 8443 with TLS, 8080 without]
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Listen address
    #[arg(long, env = "BIND_ADDRESS", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind_address: IpAddr,
}

impl ServerOptions {
    pub fn scheme(&self) -> &'static str {
        if self.enable_tls { "https" } else { "http" }
    }

    pub fn port(&self) -> u16 {
        match (self.port, self.enable_tls) {
            (Some(port), _) => port,
            (None, true) => 8443,
            (None, false) => 8080,
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port())
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.graceful_shutdown_seconds)
    }
}
