//! TLS connector for SMTP relays

use std::fs;

use native_tls::{Certificate, Protocol};
use tracing::{debug, warn};

use crate::{SmtpError, TlsConfig};

/// Builds a `native_tls::TlsConnector` from the TLS configuration
///
/// Callers wrap the result in `tokio_native_tls::TlsConnector`.
pub fn build_native_tls_connector(
    tls_config: &TlsConfig,
) -> Result<native_tls::TlsConnector, SmtpError> {
    let mut builder = native_tls::TlsConnector::builder();

    if !tls_config.should_verify() {
        warn!("TLS certificate verification disabled for SMTP relay");
        builder.danger_accept_invalid_certs(true);
    } else if let Some(ca_cert_path) = &tls_config.ca_cert_path {
        debug!(path = %ca_cert_path.display(), "Loading custom CA certificate");
        let cert_data = fs::read(ca_cert_path).map_err(|e| {
            SmtpError::ConnectionFailed(format!(
                "Failed to read CA certificate at {}: {e}",
                ca_cert_path.display()
            ))
        })?;
        let cert = Certificate::from_pem(&cert_data).map_err(|e| {
            SmtpError::ConnectionFailed(format!("Failed to parse CA certificate: {e}"))
        })?;
        builder.add_root_certificate(cert);
    }

    builder.min_protocol_version(Some(min_protocol(&tls_config.min_tls_version)));

    builder
        .build()
        .map_err(|e| SmtpError::ConnectionFailed(format!("TLS builder failed: {e}")))
}

fn min_protocol(version: &str) -> Protocol {
    match version {
        "1.0" => Protocol::Tlsv10,
        "1.1" => Protocol::Tlsv11,
        _ => Protocol::Tlsv12,
    }
}
