use crate::command::api::ApiClient;
use reqwest::Client;
use std::{
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    task::JoinHandle,
};
use url::Url;

static SERVER_PROCESS: Mutex<()> = Mutex::new(());

/// Serializes tests that run a server child process. Interrupts are delivered
/// to every listener in the test binary, so only one such test runs at a time.
pub fn lock_server_process() -> MutexGuard<'static, ()> {
    SERVER_PROCESS
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Writes an executable shell script standing in for the java runtime.
#[cfg(unix)]
pub fn write_runtime(directory: &Path, script: &str) -> PathBuf {
    use std::{fs, os::unix::fs::PermissionsExt};

    let path = directory.join("java");

    fs::write(&path, format!("#!/bin/sh\n{script}\n")).expect("failed to write runtime");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
        .expect("failed to set permissions");

    path
}

/// Local HTTP responder that answers a fixed sequence of requests with canned
/// responses. The join handle yields the request lines it received.
pub struct Responder<T = String> {
    pub api: ApiClient,
    pub endpoint: Url,
    pub request: JoinHandle<T>,
}

async fn respond(socket: &mut TcpStream, status: &str, body: &[u8]) -> String {
    let mut request = Vec::new();
    let mut buffer = [0u8; 1024];

    while !request.windows(4).any(|window| window == b"\r\n\r\n") {
        let read = socket.read(&mut buffer).await.expect("failed to read");

        if read == 0 {
            break;
        }

        request.extend_from_slice(&buffer[..read]);
    }

    let head = format!(
        "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );

    socket
        .write_all(head.as_bytes())
        .await
        .expect("failed to write head");
    socket.write_all(body).await.expect("failed to write body");
    let _ = socket.shutdown().await;

    String::from_utf8_lossy(&request)
        .lines()
        .next()
        .unwrap_or_default()
        .to_string()
}

pub async fn serve(responses: Vec<(&str, Vec<u8>)>) -> Responder<Vec<String>> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind listener");
    let address = listener.local_addr().expect("failed to get local address");

    let responses = responses
        .into_iter()
        .map(|(status, body)| (status.to_string(), body))
        .collect::<Vec<_>>();

    let request = tokio::spawn(async move {
        let mut requests = Vec::new();

        for (status, body) in responses {
            let (mut socket, _) = listener.accept().await.expect("failed to accept");

            requests.push(respond(&mut socket, &status, &body).await);
        }

        requests
    });

    let endpoint = Url::parse(&format!("http://{address}/v2/projects/paper"))
        .expect("failed to parse endpoint");
    let client = Client::builder()
        .no_proxy()
        .build()
        .expect("failed to build client");

    Responder {
        api: ApiClient::with_client(client, endpoint.clone()),
        endpoint,
        request,
    }
}

pub async fn serve_once(status: &str, body: impl Into<Vec<u8>>) -> Responder {
    let Responder {
        api,
        endpoint,
        request,
    } = serve(vec![(status, body.into())]).await;

    let request = tokio::spawn(async move {
        request
            .await
            .expect("responder task")
            .pop()
            .unwrap_or_default()
    });

    Responder {
        api,
        endpoint,
        request,
    }
}
