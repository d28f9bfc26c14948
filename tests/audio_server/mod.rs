use std::sync::mpsc;
use std::thread;
use std::time::Duration;

pub const A_MP3: &[u8] = b"ID3\x03\x00\x00\x00fake mp3 a";
pub const B_WAV: &[u8] = b"RIFF\x24\x00\x00\x00WAVEfake wav b";

const PAGE_HTML: &str = r#"<!doctype html>
<html>
  <head><title>Sound board</title></head>
  <body>
    <audio controls>
      <source src="/media/a.mp3">
      <source src="/media/a.mp3?v=2">
    </audio>
    <a href="/media/b.wav">b</a>
    <a href="/media/b.wav">b again</a>
    <a href="/media/missing.ogg">missing</a>
    <a href="/w/index.php?title=Special:Export&amp;file=b.mp3">export</a>
    <a href="/wiki/File:Theme.ogg">file page</a>
  </body>
</html>
"#;

const EMPTY_HTML: &str = r#"<!doctype html>
<html><body><p>Nothing to hear here.</p><a href="/about">about</a></body></html>
"#;

const BROKEN_HTML: &str = r#"<!doctype html>
<html><body>
  <a href="/media/missing.ogg">missing</a>
  <audio src="/media/gone.wav"></audio>
</body></html>
"#;

/// Local HTTP server with a few pages and audio files.
pub struct AudioServer {
    pub base_url: String,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl AudioServer {
    pub fn spawn() -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start tiny_http server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let url = request.url().to_string();
                let path = url.split('?').next().unwrap_or(&url);

                let (status, content_type, body): (u16, &str, &[u8]) = match path {
                    "/page" => (200, "text/html; charset=utf-8", PAGE_HTML.as_bytes()),
                    "/empty" => (200, "text/html; charset=utf-8", EMPTY_HTML.as_bytes()),
                    "/broken" => (200, "text/html; charset=utf-8", BROKEN_HTML.as_bytes()),
                    "/media/a.mp3" => (200, "audio/mpeg", A_MP3),
                    "/media/b.wav" => (200, "audio/wav", B_WAV),
                    _ => (404, "text/plain", b"not found"),
                };

                let header =
                    tiny_http::Header::from_bytes(&b"Content-Type"[..], content_type.as_bytes())
                        .expect("build header");
                let response = tiny_http::Response::from_data(body.to_vec())
                    .with_status_code(status)
                    .with_header(header);
                let _ = request.respond(response);
            }
        });

        Self {
            base_url,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl Drop for AudioServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
