use embassy_net::{
    Stack,
    dns::DnsSocket,
    tcp::client::{TcpClient, TcpClientState},
};
use log::{info, warn};
use odometer_core::strava::{
    FetchError, GearReading, TOKEN_URL, bearer_header, gear_url, parse_access_token, parse_gear,
    token_request_body,
};
use odometer_hal_esp32s3::network::StravaConfig;
use reqwless::{
    client::{HttpClient, TlsConfig, TlsVerify},
    headers::ContentType,
    request::{Method, RequestBuilder},
    response::StatusCode,
};
use static_cell::StaticCell;

const TCP_BUFFER_BYTES: usize = 4096;
// One full TLS record plus header/tag overhead.
const TLS_RECORD_BYTES: usize = 16_640;
const RESPONSE_BYTES: usize = 4096;
const REQUEST_BODY_BYTES: usize = 512;

struct HttpsBuffers {
    tls_read: [u8; TLS_RECORD_BYTES],
    tls_write: [u8; TLS_RECORD_BYTES],
    request_body: [u8; REQUEST_BODY_BYTES],
    response: [u8; RESPONSE_BYTES],
}

impl HttpsBuffers {
    const fn new() -> Self {
        Self {
            tls_read: [0; TLS_RECORD_BYTES],
            tls_write: [0; TLS_RECORD_BYTES],
            request_body: [0; REQUEST_BODY_BYTES],
            response: [0; RESPONSE_BYTES],
        }
    }
}

static TCP_STATE: StaticCell<TcpClientState<1, TCP_BUFFER_BYTES, TCP_BUFFER_BYTES>> =
    StaticCell::new();
static HTTPS_BUFFERS: StaticCell<HttpsBuffers> = StaticCell::new();

/// One-shot Strava client: refreshes the access token, then reads one gear.
pub struct GearDistanceClient<'a> {
    tcp: TcpClient<'a, 1, TCP_BUFFER_BYTES, TCP_BUFFER_BYTES>,
    dns: DnsSocket<'a>,
    buffers: &'a mut HttpsBuffers,
    config: StravaConfig,
    seed: u64,
}

impl<'a> GearDistanceClient<'a> {
    /// Must be built at most once; the transport buffers are static.
    pub fn new(stack: Stack<'a>, config: StravaConfig, seed: u64) -> Self {
        Self {
            tcp: TcpClient::new(stack, TCP_STATE.init(TcpClientState::new())),
            dns: DnsSocket::new(stack),
            buffers: HTTPS_BUFFERS.init(HttpsBuffers::new()),
            config,
            seed,
        }
    }

    pub async fn fetch_gear(&mut self) -> Result<GearReading, FetchError> {
        let HttpsBuffers {
            tls_read,
            tls_write,
            request_body,
            response,
        } = &mut *self.buffers;

        // Certificates are not verified on-device.
        let tls = TlsConfig::new(self.seed, tls_read, tls_write, TlsVerify::None);
        let mut client = HttpClient::new_with_tls(&self.tcp, &self.dns, tls);

        let body_len = token_request_body(&self.config.credentials(), request_body)?;
        let token = {
            let mut request = client
                .request(Method::POST, TOKEN_URL)
                .await
                .map_err(transport)?
                .content_type(ContentType::ApplicationJson)
                .body(&request_body[..body_len]);
            let reply = request.send(response).await.map_err(transport)?;
            check_status("token", reply.status)?;
            let bytes = reply.body().read_to_end().await.map_err(transport)?;
            parse_access_token(bytes)?
        };
        info!("strava: token refreshed");

        let url = gear_url(self.config.gear_id)?;
        let authorization = bearer_header(token.as_str())?;
        let headers = [("Authorization", authorization.as_str())];
        let mut request = client
            .request(Method::GET, url.as_str())
            .await
            .map_err(transport)?
            .headers(&headers);
        let reply = request.send(response).await.map_err(transport)?;
        check_status("gear", reply.status)?;
        let bytes = reply.body().read_to_end().await.map_err(transport)?;
        parse_gear(bytes).inspect_err(|err| warn!("strava: gear body rejected err={:?}", err))
    }
}

fn transport(err: reqwless::Error) -> FetchError {
    warn!("strava: transport err={:?}", err);
    FetchError::Transport
}

fn check_status(step: &str, status: StatusCode) -> Result<(), FetchError> {
    if status.is_successful() {
        return Ok(());
    }
    warn!("strava: {} status={}", step, status.0);
    Err(FetchError::Status(status.0))
}
