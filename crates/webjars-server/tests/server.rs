//! Service and server tests over a real jar fixture.

use std::io::{self, Cursor, Read, Write};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use flate2::read::GzDecoder;
use http::{header, Method, Request, StatusCode};
use http_body_util::{BodyExt, Empty};
use hyper_util::rt::TokioIo;
use tempfile::TempDir;
use tokio::net::{TcpListener, TcpStream};
use webjars_config::WebjarsConfig;
use webjars_core::{AssetSource, DeliveryPipeline, EntrySink, SearchPath, StreamError};
use webjars_server::{HttpResponse, Server, ShutdownSignal, WebjarsService};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const JQUERY_MIN: &[u8] = b"/*! jQuery v3.6.0 */!function(e,t){\"use strict\";}(window);";
const BOOTSTRAP_CSS: &[u8] = b".btn{display:inline-block}";

fn write_jar(dir: &TempDir, name: &str, files: &[(&str, &[u8])]) {
    let mut buffer = Cursor::new(Vec::new());
    let mut zip = ZipWriter::new(&mut buffer);
    for (path, content) in files {
        zip.start_file(
            format!("META-INF/resources/webjars/{path}"),
            SimpleFileOptions::default(),
        )
        .unwrap();
        zip.write_all(content).unwrap();
    }
    zip.finish().unwrap();
    std::fs::write(dir.path().join(name), buffer.into_inner()).unwrap();
}

fn fixture() -> (TempDir, WebjarsConfig) {
    let dir = tempfile::tempdir().unwrap();
    write_jar(&dir, "jquery-3.6.0.jar", &[("jquery/3.6.0/jquery.min.js", JQUERY_MIN)]);
    write_jar(
        &dir,
        "bootstrap-5.3.0.jar",
        &[("bootstrap/5.3.0/css/bootstrap.min.css", BOOTSTRAP_CSS)],
    );

    let config = WebjarsConfig::builder()
        .search_path_entry(dir.path().to_string_lossy())
        .routes([("/webjars/**", "*")])
        .build();
    (dir, config)
}

fn get(path: &str) -> Request<()> {
    Request::get(path).body(()).unwrap()
}

fn body(response: HttpResponse) -> Bytes {
    tokio_test::block_on(response.into_body().collect())
        .unwrap()
        .to_bytes()
}

#[test]
fn serves_asset_with_headers() {
    let (_dir, config) = fixture();
    let service = WebjarsService::from_config(&config).unwrap();

    let response = service.handle(&get("/webjars/jquery/jquery.min.js")).unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::CONTENT_TYPE], "application/javascript;charset=UTF-8");
    assert_eq!(headers[header::CONTENT_LENGTH], JQUERY_MIN.len().to_string().as_str());
    assert_eq!(headers[header::CONTENT_DISPOSITION], "inline");
    assert!(headers.get(header::CACHE_CONTROL).is_none());
    assert_eq!(body(response), Bytes::from_static(JQUERY_MIN));
}

#[test]
fn head_has_headers_but_no_body() {
    let (_dir, config) = fixture();
    let service = WebjarsService::from_config(&config).unwrap();

    let request = Request::head("/webjars/bootstrap/css/bootstrap.min.css")
        .body(())
        .unwrap();
    let response = service.handle(&request).unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/css;charset=UTF-8");
    assert!(body(response).is_empty());
}

#[test]
fn other_methods_pass_through() {
    let (_dir, config) = fixture();
    let service = WebjarsService::from_config(&config).unwrap();

    for method in [Method::POST, Method::PUT, Method::DELETE] {
        let request = Request::builder()
            .method(method)
            .uri("/webjars/jquery/jquery.min.js")
            .body(())
            .unwrap();
        assert!(service.handle(&request).is_none());
    }
}

#[test]
fn unmatched_and_missing() {
    let (_dir, config) = fixture();
    let service = WebjarsService::from_config(&config).unwrap();

    assert!(service.handle(&get("/api/users")).is_none());

    let response = service.handle(&get("/webjars/jquery/missing.js")).unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body(response).is_empty());
}

/// Lists one entry whose bytes run out into a read error.
#[derive(Debug)]
struct TruncatedSource;

struct TruncatedReader(usize);

impl Read for TruncatedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.0 == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "entry truncated"));
        }
        let n = self.0.min(buf.len());
        buf[..n].fill(b';');
        self.0 -= n;
        Ok(n)
    }
}

impl AssetSource for TruncatedSource {
    fn name(&self) -> &str {
        "truncated"
    }

    fn entry_paths(&self) -> Vec<String> {
        vec!["META-INF/resources/webjars/broken/1.0.0/broken.js".to_string()]
    }

    fn read_entry(&self, path: &str, sink: &mut EntrySink<'_>) -> Result<u64, StreamError> {
        sink(&mut TruncatedReader(8)).map_err(|e| StreamError::transfer(path, e))
    }
}

#[test]
fn read_failure_midway_is_server_error() {
    let config = WebjarsConfig::builder().routes([("/webjars/**", "broken")]).build();
    let pipeline = DeliveryPipeline::builder(SearchPath::new().with_source(TruncatedSource))
        .routes(config.route_table().unwrap())
        .build();
    let service = WebjarsService::new(Arc::new(pipeline));

    for request in [
        get("/webjars/broken/broken.js"),
        Request::head("/webjars/broken/broken.js").body(()).unwrap(),
    ] {
        let response = service.handle(&request).unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(header::CONTENT_LENGTH).is_none());
        assert!(body(response).is_empty());
    }
}

#[test]
fn gzip_when_accepted() {
    let (_dir, config) = fixture();
    let service = WebjarsService::from_config(&config).unwrap();

    let request = Request::get("/webjars/jquery/jquery.min.js")
        .header(header::ACCEPT_ENCODING, "gzip, deflate")
        .body(())
        .unwrap();
    let response = service.handle(&request).unwrap();
    assert_eq!(response.headers()[header::CONTENT_ENCODING], "gzip");
    assert_eq!(response.headers()[header::VARY], "Accept-Encoding");
    assert!(response.headers().get(header::CONTENT_LENGTH).is_none());

    let mut decoded = Vec::new();
    GzDecoder::new(body(response).as_ref())
        .read_to_end(&mut decoded)
        .unwrap();
    assert_eq!(decoded, JQUERY_MIN);
}

#[test]
fn gzip_disabled_by_config() {
    let (_dir, mut config) = fixture();
    config.delivery.gzip = false;
    let service = WebjarsService::from_config(&config).unwrap();

    let request = Request::get("/webjars/jquery/jquery.min.js")
        .header(header::ACCEPT_ENCODING, "gzip")
        .body(())
        .unwrap();
    let response = service.handle(&request).unwrap();
    assert!(response.headers().get(header::CONTENT_ENCODING).is_none());
    assert_eq!(body(response), Bytes::from_static(JQUERY_MIN));
}

#[test]
fn delivery_section_shapes_headers() {
    let (_dir, mut config) = fixture();
    config.delivery.allow_caching = false;
    config.delivery.content_disposition = Some(String::new());
    config.delivery.content_charset = Some("ISO-8859-1".to_string());
    config
        .delivery
        .content_types
        .insert("js".to_string(), "text/javascript".to_string());
    let service = WebjarsService::from_config(&config).unwrap();

    let response = service.handle(&get("/webjars/jquery/jquery.min.js")).unwrap();
    let headers = response.headers();
    assert_eq!(headers[header::CONTENT_TYPE], "text/javascript;charset=ISO-8859-1");
    assert_eq!(headers[header::PRAGMA], "no-cache");
    assert_eq!(headers[header::CACHE_CONTROL], "no-cache, no-store, must-revalidate");
    assert_eq!(headers[header::EXPIRES], "Thu, 01 Jan 1970 00:00:00 GMT");
    assert!(headers.get(header::CONTENT_DISPOSITION).is_none());
}

#[test]
fn context_path_from_config() {
    let (_dir, mut config) = fixture();
    config.server.context_path = "/shop".to_string();
    let service = WebjarsService::from_config(&config).unwrap();

    let response = service.handle(&get("/shop/webjars/jquery/jquery.min.js")).unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(service.handle(&get("/webjars/jquery/jquery.min.js")).is_none());
}

#[test]
fn missing_search_path_entry_fails() {
    let (_dir, mut config) = fixture();
    config.assets.search_path.push("/nonexistent/lib".to_string());
    assert!(WebjarsService::from_config(&config).is_err());
}

async fn send(addr: std::net::SocketAddr, path: &str) -> (StatusCode, Bytes) {
    let stream = TcpStream::connect(addr).await.unwrap();
    let (mut sender, connection) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
        .await
        .unwrap();
    tokio::spawn(connection);

    let request = Request::get(path)
        .header(header::HOST, "localhost")
        .body(Empty::<Bytes>::new())
        .unwrap();
    let response = sender.send_request(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

#[tokio::test]
async fn server_round_trip() {
    let (_dir, config) = fixture();
    let service = WebjarsService::from_config(&config).unwrap();
    let server = Server::from_config(&config, service).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = ShutdownSignal::new();
    let handle = tokio::spawn(server.serve(listener, shutdown.clone()));

    let (status, body) = send(addr, "/webjars/bootstrap/css/bootstrap.min.css").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Bytes::from_static(BOOTSTRAP_CSS));

    let (status, body) = send(addr, "/webjars/jquery/nope.js").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.is_empty());

    let (status, _) = send(addr, "/index.html").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
}
