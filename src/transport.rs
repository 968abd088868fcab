//! SMTP transport construction and configuration-keyed pooling.

use lettre::{
    AsyncSmtpTransport, Tokio1Executor,
    transport::smtp::{
        authentication::Credentials,
        client::{Certificate, Tls, TlsParameters},
    },
};
use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::{EmailNotifierConfig, Result};

/// Transport-level SMTP settings, derived from the per-notification
/// configuration. Two sends with equal settings share a pooled client.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SmtpSettings {
    /// SMTP server host.
    pub host: String,
    /// SMTP server port.
    pub port: u16,
    /// Username for authentication.
    pub username: Option<String>,
    /// Password for authentication.
    pub password: Option<String>,
    /// Skip server certificate validation.
    pub trust_all: bool,
    /// PEM root certificate bundle for custom CA trust.
    pub root_cert: Option<PathBuf>,
    /// Require STARTTLS; connecting plaintext is a failure, not a downgrade.
    pub starttls_required: bool,
}

impl From<&EmailNotifierConfig> for SmtpSettings {
    fn from(config: &EmailNotifierConfig) -> Self {
        if config.ssl_key_store_password.is_some() {
            warn!("sslKeyStorePassword is ignored; the key store is read as a PEM bundle");
        }
        Self {
            host: config.host.clone(),
            port: config.port,
            username: config.username.clone(),
            password: config.password.clone(),
            trust_all: config.ssl_trust_all,
            root_cert: config.ssl_key_store.clone().map(PathBuf::from),
            starttls_required: config.start_tls_enabled,
        }
    }
}

impl SmtpSettings {
    /// Canonical fingerprint used as the pool key.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    fn tls_parameters(&self, root_cert: Option<&[u8]>) -> Result<TlsParameters> {
        let mut builder = TlsParameters::builder(self.host.clone());
        if self.trust_all {
            builder = builder.dangerous_accept_invalid_certs(true);
        }
        if let Some(pem) = root_cert {
            builder = builder.add_root_certificate(Certificate::from_pem(pem)?);
        }
        Ok(builder.build()?)
    }

    /// Build an SMTP client for these settings.
    pub async fn build_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let root_cert = match &self.root_cert {
            Some(path) => Some(tokio::fs::read(path).await?),
            None => None,
        };

        let parameters = self.tls_parameters(root_cert.as_deref())?;
        let tls = if self.starttls_required {
            Tls::Required(parameters)
        } else {
            Tls::Opportunistic(parameters)
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.host)
            .port(self.port)
            .tls(tls);

        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        info!(
            host = %self.host,
            port = self.port,
            starttls_required = self.starttls_required,
            "SMTP transport initialized"
        );

        Ok(builder.build())
    }
}

/// Shared SMTP clients, keyed by settings fingerprint so repeated sends to
/// the same endpoint reuse connections instead of re-authenticating. Clients
/// live for the lifetime of the pool.
#[derive(Default)]
pub struct TransportPool {
    clients: Mutex<HashMap<u64, Arc<AsyncSmtpTransport<Tokio1Executor>>>>,
}

impl TransportPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the client for these settings, creating it on first use.
    pub async fn get(
        &self,
        settings: &SmtpSettings,
    ) -> Result<Arc<AsyncSmtpTransport<Tokio1Executor>>> {
        let key = settings.fingerprint();
        if let Some(client) = self.lookup(key) {
            return Ok(client);
        }

        // Built outside the lock; concurrent first sends may race to build,
        // the first insert wins and the rest are dropped.
        let client = Arc::new(settings.build_transport().await?);
        let mut clients = self
            .clients
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(Arc::clone(clients.entry(key).or_insert(client)))
    }

    fn lookup(&self, key: u64) -> Option<Arc<AsyncSmtpTransport<Tokio1Executor>>> {
        self.clients
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&key)
            .map(Arc::clone)
    }
}
