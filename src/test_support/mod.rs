//! Test utilities for minify unit tests.
//!
//! Fake compiler executables (shell scripts, unix only) that honour the
//! `--js` / `--js_output_file` handoff, and a one-shot HTTP responder that
//! stands in for the compilation service.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

/// File the fake compilers write their argument list to, one per line.
pub const ARGS_FILE: &str = "args.txt";

const PARSE_ARGS: &str = r#"printf '%s\n' "$@" > "$(dirname "$0")/args.txt"
out=""
src=""
while [ $# -gt 0 ]; do
  case "$1" in
    --js_output_file) out="$2"; shift 2 ;;
    --js) src="$2"; shift 2 ;;
    *) shift ;;
  esac
done
"#;

/// Write an executable shell script to `dir/name`.
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// A compiler that prefixes the staged source with `/* compiled */`.
#[cfg(unix)]
pub fn fake_compiler(dir: &Path, name: &str) -> PathBuf {
    write_script(
        dir,
        name,
        &format!(
            "{}printf '/* compiled */' > \"$out\"\ncat \"$src\" >> \"$out\"\n",
            PARSE_ARGS
        ),
    )
}

/// A compiler that rejects its input with exit code 1.
#[cfg(unix)]
pub fn failing_compiler(dir: &Path, name: &str) -> PathBuf {
    write_script(
        dir,
        name,
        &format!(
            "{}echo \"$src:1: ERROR - Parse error. syntax error\" >&2\nexit 1\n",
            PARSE_ARGS
        ),
    )
}

/// A compiler that produces output but also writes to stderr.
#[cfg(unix)]
pub fn noisy_compiler(dir: &Path, name: &str) -> PathBuf {
    write_script(
        dir,
        name,
        &format!(
            "{}cat \"$src\" > \"$out\"\necho \"$src:1: WARNING - dangerous use of this\" >&2\n",
            PARSE_ARGS
        ),
    )
}

/// Arguments recorded by the last fake compiler run in `dir`.
pub fn recorded_args(dir: &Path) -> Vec<String> {
    let contents = std::fs::read_to_string(dir.join(ARGS_FILE)).unwrap();
    contents.lines().map(str::to_string).collect()
}

/// A captured HTTP request.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub request_line: String,
    pub content_type: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    /// Decoded `key=value` pairs of an URL-encoded body, in order.
    pub fn form(&self) -> Vec<(String, String)> {
        url::form_urlencoded::parse(self.body.as_bytes())
            .into_owned()
            .collect()
    }
}

/// Serve exactly one request with `status` and `body`.
///
/// Returns the endpoint URL and a handle yielding the request it received.
pub fn serve_once(status: u16, body: &str) -> (String, JoinHandle<RecordedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/compile", listener.local_addr().unwrap());
    let body = body.to_string();

    let handle = std::thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream);

        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();

        let mut content_length = 0usize;
        let mut content_type = None;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                let value = value.trim();
                match name.to_ascii_lowercase().as_str() {
                    "content-length" => content_length = value.parse().unwrap(),
                    "content-type" => content_type = Some(value.to_string()),
                    _ => {}
                }
            }
        }

        let mut request_body = vec![0u8; content_length];
        reader.read_exact(&mut request_body).unwrap();

        let response = format!(
            "HTTP/1.1 {} STATUS\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        let mut stream = reader.into_inner();
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();

        RecordedRequest {
            request_line: request_line.trim_end().to_string(),
            content_type,
            body: String::from_utf8(request_body).unwrap(),
        }
    });

    (url, handle)
}
