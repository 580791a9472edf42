//! HTTPS front end with a throwaway self-signed certificate.
//!
//! Clients that verify certificates reject it; clients that skip
//! verification get the same routes as the plain listener.

use std::{io, net::SocketAddr, sync::Arc};

use axum::serve::Listener;
use rustls::{
    pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer},
    ServerConfig,
};
use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::{server::TlsStream, TlsAcceptor};

use crate::{router, Shared};

/// Names the generated certificate is issued for.
pub const CERT_NAMES: [&str; 2] = ["localhost", "127.0.0.1"];

/// A TCP listener that finishes the TLS handshake before handing out a
/// stream. Connections whose handshake fails are dropped.
pub struct TlsListener {
    inner: TcpListener,
    acceptor: TlsAcceptor,
}

impl TlsListener {
    pub fn self_signed(inner: TcpListener) -> io::Result<Self> {
        let names = CERT_NAMES.iter().map(|name| name.to_string()).collect::<Vec<_>>();
        let rcgen::CertifiedKey { cert, key_pair } =
            rcgen::generate_simple_self_signed(names).map_err(io::Error::other)?;
        let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key_pair.serialize_der()));

        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let config = ServerConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(io::Error::other)?
            .with_no_client_auth()
            .with_single_cert(vec![cert.der().clone()], key)
            .map_err(io::Error::other)?;

        Ok(Self {
            inner,
            acceptor: TlsAcceptor::from(Arc::new(config)),
        })
    }
}

impl Listener for TlsListener {
    type Io = TlsStream<TcpStream>;
    type Addr = SocketAddr;

    async fn accept(&mut self) -> (Self::Io, Self::Addr) {
        loop {
            let (stream, addr) = Listener::accept(&mut self.inner).await;
            if let Ok(stream) = self.acceptor.accept(stream).await {
                return (stream, addr);
            }
        }
    }

    fn local_addr(&self) -> io::Result<Self::Addr> {
        self.inner.local_addr()
    }
}

pub async fn serve_tls(listener: TcpListener, state: Shared) -> Result<(), io::Error> {
    axum::serve(TlsListener::self_signed(listener)?, router(state)).await
}
