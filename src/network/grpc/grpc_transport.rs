use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::async_trait;
use tonic::codec::CompressionEncoding;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::metadata::MetadataValue;
use tonic::transport::Certificate;
use tonic::transport::Channel;
use tonic::transport::ClientTlsConfig;
use tonic::transport::Endpoint;
use tonic::Request;
use tonic::Status;
use tonic::Streaming;
use tracing::debug;
use tracing::trace;

use crate::constants::LISTEN_METHOD_PATH;
use crate::constants::REQUEST_PARAMS_HEADER;
use crate::constants::RESOURCE_PREFIX_HEADER;
use crate::proto::ListenRequest;
use crate::proto::ListenResponse;
use crate::proto::Target;
use crate::ConnectionConfig;
use crate::DatabasePath;
use crate::ListenConnection;
use crate::ListenTransport;
use crate::Result;

/// Only the add-target request is ever queued
const LISTEN_REQUEST_BUFFER: usize = 1;

/// Opens `Listen` streams over a shared tonic channel
#[derive(Debug, Clone)]
pub struct GrpcListenTransport {
    // Tonic's Channel is thread-safe and reference-counted.
    channel: Channel,
    database: DatabasePath,
    enable_compression: bool,
}

impl GrpcListenTransport {
    pub fn new(
        channel: Channel,
        database: DatabasePath,
    ) -> Self {
        Self {
            channel,
            database,
            enable_compression: false,
        }
    }

    /// Builds a lazily connecting channel from `config`.
    ///
    /// No request timeout is set on the endpoint: listen streams stay open
    /// for as long as the watch runs.
    pub fn connect(config: &ConnectionConfig) -> Result<Self> {
        let channel = Self::create_channel(config)?;
        Ok(Self {
            channel,
            database: config.database(),
            enable_compression: config.enable_compression,
        })
    }

    pub fn database(&self) -> &DatabasePath {
        &self.database
    }

    fn create_channel(config: &ConnectionConfig) -> Result<Channel> {
        debug!(endpoint = %config.endpoint, "create_channel");
        let mut endpoint = Endpoint::from_shared(config.endpoint.clone())?
            .connect_timeout(config.connect_timeout())
            .tcp_keepalive(Some(config.tcp_keepalive()))
            .http2_keep_alive_interval(config.http2_keepalive_interval())
            .keep_alive_timeout(config.http2_keepalive_timeout())
            .keep_alive_while_idle(true);

        if config.enable_tls {
            let mut tls = ClientTlsConfig::new().with_native_roots();
            if let Some(path) = &config.ca_cert_path {
                let pem = std::fs::read(path)?;
                tls = tls.ca_certificate(Certificate::from_pem(pem));
            }
            endpoint = endpoint.tls_config(tls)?;
        }

        Ok(endpoint.connect_lazy())
    }

    /// Wraps the outbound message stream and attaches the routing headers
    /// for this database.
    pub(crate) fn listen_request<S>(
        &self,
        outbound: S,
    ) -> std::result::Result<Request<S>, Status> {
        let database = self.database.to_string();
        let routing = format!("database={database}");
        let mut request = Request::new(outbound);

        let prefix = MetadataValue::try_from(database.as_str())
            .map_err(|e| Status::invalid_argument(format!("invalid database path {database:?}: {e}")))?;
        let params = MetadataValue::try_from(routing.as_str())
            .map_err(|e| Status::invalid_argument(format!("invalid database path {database:?}: {e}")))?;

        request.metadata_mut().insert(RESOURCE_PREFIX_HEADER, prefix);
        request.metadata_mut().insert(REQUEST_PARAMS_HEADER, params);
        Ok(request)
    }
}

#[async_trait]
impl ListenTransport for GrpcListenTransport {
    async fn open(
        &self,
        target: &Target,
    ) -> std::result::Result<Box<dyn ListenConnection>, Status> {
        let (tx, rx) = mpsc::channel(LISTEN_REQUEST_BUFFER);
        tx.send(ListenRequest::add_target(self.database.to_string(), target.clone()))
            .await
            .map_err(|_| Status::internal("listen request channel closed"))?;

        let request = self.listen_request(ReceiverStream::new(rx))?;

        let mut grpc = tonic::client::Grpc::new(self.channel.clone());
        if self.enable_compression {
            grpc = grpc
                .send_compressed(CompressionEncoding::Gzip)
                .accept_compressed(CompressionEncoding::Gzip);
        }
        grpc.ready()
            .await
            .map_err(|e| Status::unavailable(format!("listen channel not ready: {e}")))?;

        let codec: ProstCodec<ListenRequest, ListenResponse> = ProstCodec::default();
        let response = grpc
            .streaming(request, PathAndQuery::from_static(LISTEN_METHOD_PATH), codec)
            .await?;

        trace!(target_id = target.target_id, "listen stream opened");
        Ok(Box::new(GrpcListenConnection {
            requests: Some(tx),
            responses: response.into_inner(),
        }))
    }
}

/// One open `Listen` call
pub struct GrpcListenConnection {
    /// Dropping the sender half-closes the request stream
    requests: Option<mpsc::Sender<ListenRequest>>,
    responses: Streaming<ListenResponse>,
}

#[async_trait]
impl ListenConnection for GrpcListenConnection {
    async fn receive(&mut self) -> std::result::Result<Option<ListenResponse>, Status> {
        self.responses.message().await
    }

    async fn close(&mut self) -> std::result::Result<(), Status> {
        self.requests.take();
        Ok(())
    }
}
