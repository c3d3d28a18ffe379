//! A canned HTTP responder for exercising the providers end to end.

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

/// What the responder sends back to every request.
#[derive(Debug, Clone)]
pub enum Reply {
    /// A JSON body with the given status code.
    Json { status: u16, body: String },
    /// Read the request, then stay silent for the given time.
    Stall(Duration),
}

impl Reply {
    pub fn ok(body: &str) -> Self {
        Self::Json {
            status: 200,
            body: body.to_owned(),
        }
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self::Json {
            status,
            body: body.to_owned(),
        }
    }
}

/// Local server answering each connection with a fixed [`Reply`].
#[derive(Debug)]
pub struct CannedServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl CannedServer {
    pub fn start(reply: Reply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind canned server");
        let addr = listener.local_addr().expect("local address");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                serve(stream, &reply, &log);
            }
        });
        Self { addr, requests }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Request targets (path and query) received so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// A base URL nothing is listening on.
pub fn refused_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind probe");
    let addr = listener.local_addr().expect("local address");
    drop(listener);
    format!("http://{addr}")
}

fn serve(stream: TcpStream, reply: &Reply, log: &Mutex<Vec<String>>) {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    loop {
        let mut header = String::new();
        match reader.read_line(&mut header) {
            Ok(0) | Err(_) => break,
            Ok(_) if header == "\r\n" => break,
            Ok(_) => {}
        }
    }
    if let Some(target) = request_line.split_whitespace().nth(1) {
        log.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(target.to_owned());
    }

    let mut stream = reader.into_inner();
    match reply {
        Reply::Json { status, body } => {
            let response = format!(
                "HTTP/1.1 {status} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.flush();
        }
        Reply::Stall(pause) => thread::sleep(*pause),
    }
}
