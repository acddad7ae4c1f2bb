use std::{
    io::{self, Read, Write},
    net::{Shutdown, TcpStream, ToSocketAddrs},
    sync::Arc,
};

use log::{debug, warn};
use rustls::{
    ClientConfig, ClientConnection, DigitallySignedStruct, SignatureScheme, StreamOwned,
    client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier},
    crypto::{CryptoProvider, ring, verify_tls12_signature, verify_tls13_signature},
    pki_types::{CertificateDer, ServerName, UnixTime},
};

use crate::protocol::TransportError;

use super::SessionConfig;

/// Byte stream to a device, plaintext or TLS.
pub enum Stream {
    Plain(TcpStream),
    Tls(Box<StreamOwned<ClientConnection, TcpStream>>),
}

impl Stream {
    /// Opens a TCP connection with the configured timeouts, wrapping it in
    /// TLS when enabled.
    pub fn open(config: &SessionConfig) -> Result<Self, TransportError> {
        let socket = connect_tcp(config)?;
        if !config.tls {
            return Ok(Stream::Plain(socket));
        }

        let name = ServerName::try_from(config.host.clone())
            .map_err(|_| TransportError::InvalidServerName(config.host.clone()))?;
        let conn = ClientConnection::new(tls_config()?, name)?;
        let mut stream = StreamOwned::new(conn, socket);

        // Drive the handshake now so certificate and cipher problems surface from connect.
        while stream.conn.is_handshaking() {
            stream.conn.complete_io(&mut stream.sock)?;
        }
        debug!("tls handshake completed with {}", config.host);

        Ok(Stream::Tls(Box::new(stream)))
    }

    /// Closes the stream. Failures are logged and otherwise ignored.
    pub fn shutdown(self) {
        let socket = match self {
            Stream::Plain(socket) => socket,
            Stream::Tls(mut stream) => {
                stream.conn.send_close_notify();
                if let Err(e) = stream.flush() {
                    debug!("failed to send close_notify: {e}");
                }
                (*stream).into_parts().1
            }
        };

        if let Err(e) = socket.shutdown(Shutdown::Both) {
            debug!("socket shutdown: {e}");
        }
    }
}

impl Read for Stream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Stream::Plain(s) => s.read(buf),
            Stream::Tls(s) => s.read(buf),
        }
    }
}

impl Write for Stream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Stream::Plain(s) => s.write(buf),
            Stream::Tls(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Stream::Plain(s) => s.flush(),
            Stream::Tls(s) => s.flush(),
        }
    }
}

fn connect_tcp(config: &SessionConfig) -> Result<TcpStream, TransportError> {
    let mut last_err = None;

    for addr in (config.host.as_str(), config.port()).to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, config.timeout) {
            Ok(socket) => {
                socket.set_read_timeout(Some(config.timeout))?;
                socket.set_write_timeout(Some(config.timeout))?;
                socket.set_nodelay(true)?;
                return Ok(socket);
            }
            Err(e) => {
                warn!("failed to connect to {addr}: {e}");
                last_err = Some(e);
            }
        }
    }

    Err(last_err
        .unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("no address found for {}", config.host),
            )
        })
        .into())
}

fn tls_config() -> Result<Arc<ClientConfig>, TransportError> {
    let provider = Arc::new(ring::default_provider());
    let config = ClientConfig::builder_with_provider(provider.clone())
        .with_safe_default_protocol_versions()?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate(provider)))
        .with_no_client_auth();
    Ok(Arc::new(config))
}

/// Accepts any server certificate and name. Devices ship self-signed
/// certificates, so only the handshake signatures are checked.
#[derive(Debug)]
struct AcceptAnyCertificate(Arc<CryptoProvider>);

impl ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}

#[cfg(test)]
mod tests {
    use std::{net::TcpListener, thread, time::Duration};

    use rcgen::CertifiedKey;
    use rustls::{
        ServerConfig, ServerConnection,
        pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer},
    };

    use crate::protocol::ProtocolTransport;

    use super::*;

    /// Server side TLS config with a freshly generated self-signed certificate.
    fn self_signed_server() -> Arc<ServerConfig> {
        let CertifiedKey { cert, key_pair } =
            rcgen::generate_simple_self_signed(vec!["router.lan".to_string()]).unwrap();
        let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key_pair.serialize_der()));

        let config = ServerConfig::builder_with_provider(Arc::new(ring::default_provider()))
            .with_safe_default_protocol_versions()
            .unwrap()
            .with_no_client_auth()
            .with_single_cert(vec![cert.der().clone()], key)
            .unwrap();
        Arc::new(config)
    }

    #[test]
    fn tls_config_builds() {
        tls_config().unwrap();
    }

    #[test]
    fn plain_stream_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let peer = std::thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            let mut buf = [0u8; 4];
            socket.read_exact(&mut buf).unwrap();
            socket.write_all(&buf).unwrap();
        });

        let config = SessionConfig::new("127.0.0.1", "admin", "").with_port(port);
        let mut stream = Stream::open(&config).unwrap();
        stream.write_all(b"ping").unwrap();
        let mut buf = [0u8; 4];
        stream.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"ping");

        stream.shutdown();
        peer.join().unwrap();
    }

    #[test]
    fn tls_stream_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server_config = self_signed_server();
        let device = thread::spawn(move || {
            let (socket, _) = listener.accept().unwrap();
            socket.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
            let conn = ServerConnection::new(server_config).unwrap();
            let mut transport = ProtocolTransport::new(StreamOwned::new(conn, socket));

            let received = transport.read_sentence().unwrap();
            transport.write_sentence(&["!done"]).unwrap();

            // A clean close_notify reads as end of stream rather than an error.
            let mut rest = Vec::new();
            let closed_cleanly = transport.into_inner().read_to_end(&mut rest).is_ok();
            (received, closed_cleanly)
        });

        // The certificate names another host and is self-signed; both are accepted.
        let config = SessionConfig::new("127.0.0.1", "admin", "")
            .with_tls(true)
            .with_port(port)
            .with_timeout(Duration::from_secs(2));
        let mut transport = ProtocolTransport::new(Stream::open(&config).unwrap());

        transport.write_sentence(&["/system/identity/print"]).unwrap();
        assert_eq!(transport.read_sentence().unwrap(), vec!["!done"]);

        let stream = transport.into_inner();
        assert!(matches!(stream, Stream::Tls(_)));
        stream.shutdown();

        let (received, closed_cleanly) = device.join().unwrap();
        assert_eq!(received, vec!["/system/identity/print"]);
        assert!(closed_cleanly);
    }

    #[test]
    #[should_panic(expected = "Io")]
    fn refused_connection_is_io_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = SessionConfig::new("127.0.0.1", "admin", "").with_port(port);
        Stream::open(&config).unwrap();
    }
}
