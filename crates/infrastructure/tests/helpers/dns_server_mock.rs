#![allow(dead_code)]

use ferrous_dig_infrastructure::dns::transport::tls::install_crypto_provider;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio::sync::oneshot;
use tokio_rustls::TlsAcceptor;

/// Builds the reply bytes for a received query. `None` means stay silent.
pub type Responder = Arc<dyn Fn(&[u8]) -> Option<Vec<u8>> + Send + Sync>;

pub fn responder<F>(f: F) -> Responder
where
    F: Fn(&[u8]) -> Option<Vec<u8>> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Loopback UDP responder.
pub struct MockUdpServer {
    addr: SocketAddr,
    queries: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockUdpServer {
    pub async fn start(responder: Responder) -> std::io::Result<Self> {
        let socket = UdpSocket::bind("127.0.0.1:0").await?;
        Ok(Self::serve(socket, responder))
    }

    /// Serves on an already bound socket (used to share a port with TCP).
    pub fn serve(socket: UdpSocket, responder: Responder) -> Self {
        let addr = socket.local_addr().expect("bound socket has an address");
        let queries = Arc::new(AtomicUsize::new(0));
        let counter = queries.clone();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            let mut buf = vec![0u8; 65535];

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        break;
                    }
                    result = socket.recv_from(&mut buf) => {
                        if let Ok((len, peer)) = result {
                            counter.fetch_add(1, Ordering::SeqCst);
                            if let Some(response) = responder(&buf[..len]) {
                                let _ = socket.send_to(&response, peer).await;
                            }
                        }
                    }
                }
            }
        });

        Self {
            addr,
            queries,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl Drop for MockUdpServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// What a stream server does with each accepted connection.
#[derive(Clone)]
pub enum StreamBehavior {
    /// Read one framed query, write one framed reply.
    Framed(Responder),
    /// Read one framed query, write these bytes verbatim, close.
    Raw(Vec<u8>),
    /// Read one framed query, never answer, hold the connection open until
    /// the client hangs up.
    Silent,
}

/// Loopback TCP responder, optionally speaking TLS.
pub struct MockStreamServer {
    addr: SocketAddr,
    connections: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockStreamServer {
    pub async fn start_tcp(behavior: StreamBehavior) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        Ok(Self::serve(listener, behavior, None))
    }

    pub async fn start_tls(
        behavior: StreamBehavior,
        certificate: &SelfSignedCert,
    ) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        Ok(Self::serve(
            listener,
            behavior,
            Some(certificate.acceptor()),
        ))
    }

    pub fn serve(
        listener: TcpListener,
        behavior: StreamBehavior,
        acceptor: Option<TlsAcceptor>,
    ) -> Self {
        let addr = listener.local_addr().expect("bound listener has an address");
        let connections = Arc::new(AtomicUsize::new(0));
        let counter = connections.clone();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        break;
                    }
                    accepted = listener.accept() => {
                        let Ok((stream, _)) = accepted else { continue };
                        counter.fetch_add(1, Ordering::SeqCst);
                        let behavior = behavior.clone();
                        let acceptor = acceptor.clone();
                        tokio::spawn(handle_connection(stream, behavior, acceptor));
                    }
                }
            }
        });

        Self {
            addr,
            connections,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

impl Drop for MockStreamServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn handle_connection(stream: TcpStream, behavior: StreamBehavior, acceptor: Option<TlsAcceptor>) {
    match acceptor {
        Some(acceptor) => {
            // A client rejecting our certificate ends the handshake here.
            if let Ok(tls) = acceptor.accept(stream).await {
                answer_one(tls, behavior).await;
            }
        }
        None => answer_one(stream, behavior).await,
    }
}

async fn answer_one<S>(mut stream: S, behavior: StreamBehavior)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut len_buf = [0u8; 2];
    if stream.read_exact(&mut len_buf).await.is_err() {
        return;
    }
    let mut query = vec![0u8; u16::from_be_bytes(len_buf) as usize];
    if stream.read_exact(&mut query).await.is_err() {
        return;
    }

    match behavior {
        StreamBehavior::Framed(responder) => {
            if let Some(reply) = responder(&query) {
                let _ = stream.write_all(&(reply.len() as u16).to_be_bytes()).await;
                let _ = stream.write_all(&reply).await;
            }
        }
        StreamBehavior::Raw(bytes) => {
            let _ = stream.write_all(&bytes).await;
        }
        StreamBehavior::Silent => {
            let mut rest = Vec::new();
            let _ = stream.read_to_end(&mut rest).await;
            return;
        }
    }
    let _ = stream.flush().await;
    let _ = stream.shutdown().await;
}

/// UDP and TCP responders on the same loopback port, as a real server.
pub async fn start_udp_and_tcp(
    udp: Responder,
    tcp: StreamBehavior,
) -> std::io::Result<(MockUdpServer, MockStreamServer)> {
    let mut last_error = None;
    for _ in 0..16 {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();
        match UdpSocket::bind(("127.0.0.1", port)).await {
            Ok(socket) => {
                return Ok((
                    MockUdpServer::serve(socket, udp),
                    MockStreamServer::serve(listener, tcp, None),
                ))
            }
            Err(e) => last_error = Some(e),
        }
    }
    Err(last_error.unwrap_or_else(|| std::io::Error::other("no shared port found")))
}

/// A self-signed certificate for `localhost` and 127.0.0.1.
pub struct SelfSignedCert {
    pub cert: CertificateDer<'static>,
    key_der: Vec<u8>,
}

impl SelfSignedCert {
    pub fn generate() -> Self {
        let certified = rcgen::generate_simple_self_signed(vec![
            "localhost".to_string(),
            "127.0.0.1".to_string(),
        ])
        .expect("rcgen generates a certificate");

        Self {
            cert: certified.cert.der().clone(),
            key_der: certified.key_pair.serialize_der(),
        }
    }

    pub fn acceptor(&self) -> TlsAcceptor {
        install_crypto_provider();

        let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(self.key_der.clone()));
        let config = rustls::ServerConfig::builder()
            .with_no_client_auth()
            .with_single_cert(vec![self.cert.clone()], key)
            .expect("valid server certificate");

        TlsAcceptor::from(Arc::new(config))
    }

    /// A client config that trusts only this certificate.
    pub fn client_config(&self) -> Arc<rustls::ClientConfig> {
        install_crypto_provider();

        let mut roots = rustls::RootCertStore::empty();
        roots.add(self.cert.clone()).expect("certificate is a valid root");

        Arc::new(
            rustls::ClientConfig::builder()
                .with_root_certificates(roots)
                .with_no_client_auth(),
        )
    }
}
