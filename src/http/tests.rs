use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use super::*;
use crate::error::HttpError;
use crate::template::ResolvedRequest;

fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

/// Serves one canned status per connection, in order, and records the raw
/// requests it saw.
async fn spawn_server(statuses: Vec<u16>) -> Result<(String, Arc<Mutex<Vec<String>>>), String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|err| format!("bind failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("local_addr failed: {}", err))?;
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    tokio::spawn(async move {
        for status in statuses {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let mut raw = Vec::new();
            let mut buf = [0_u8; 4096];
            while let Ok(read) = stream.read(&mut buf).await {
                if read == 0 {
                    break;
                }
                raw.extend_from_slice(buf.get(..read).unwrap_or_default());
                let text = String::from_utf8_lossy(&raw);
                if let Some(head_end) = text.find("\r\n\r\n") {
                    let length = text
                        .lines()
                        .find_map(|line| {
                            line.to_ascii_lowercase()
                                .strip_prefix("content-length:")
                                .and_then(|value| value.trim().parse::<usize>().ok())
                        })
                        .unwrap_or(0);
                    if raw.len() >= head_end + 4 + length {
                        break;
                    }
                }
            }
            log.lock().await.push(String::from_utf8_lossy(&raw).into_owned());
            let body = format!("status {}", status);
            let response = format!(
                "HTTP/1.1 {} X\r\nContent-Length: {}\r\nX-Test: one\r\nX-Test: two\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });
    Ok((format!("http://{}", addr), seen))
}

fn sender(retry: u32) -> Result<Sender, String> {
    Sender::new(&SenderConfig {
        timeout: Duration::from_secs(5),
        proxy: None,
        retry,
        user_agent: "s2req-test".to_owned(),
    })
    .map_err(|err| err.to_string())
}

fn request(url: String, body: &str, headers: &[(&str, &str)]) -> ResolvedRequest {
    ResolvedRequest {
        method: "POST".to_owned(),
        url,
        headers: headers
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect(),
        body: body.to_owned(),
        request_id: None,
    }
}

#[test]
fn prepare_headers_adds_defaults() -> Result<(), String> {
    let headers = BTreeMap::new();
    let prepared = prepare_headers(&headers, "a=1", "agent/1");
    let expected = vec![
        ("Content-Type".to_owned(), FORM_CONTENT_TYPE.to_owned()),
        ("User-Agent".to_owned(), "agent/1".to_owned()),
    ];
    if prepared != expected {
        return Err(format!("Unexpected headers: {:?}", prepared));
    }
    if !prepare_headers(&headers, "", "agent/1")
        .iter()
        .all(|(name, _)| name != "Content-Type")
    {
        return Err("Empty body must not get a content type".to_owned());
    }
    Ok(())
}

#[test]
fn prepare_headers_keeps_template_values() -> Result<(), String> {
    let headers = BTreeMap::from([
        ("content-type".to_owned(), "application/json".to_owned()),
        ("USER-AGENT".to_owned(), "custom".to_owned()),
    ]);
    let prepared = prepare_headers(&headers, "{}", "agent/1");
    if prepared.len() != 2 {
        return Err(format!("Defaults must not be added: {:?}", prepared));
    }
    Ok(())
}

#[test]
fn sender_returns_response_data() -> Result<(), String> {
    run_async_test(async {
        let (base, seen) = spawn_server(vec![201]).await?;
        let response = sender(0)?
            .dispatch(&request(format!("{}/echo", base), "a=1", &[("X-Custom", "v")]))
            .await
            .map_err(|err| err.to_string())?;
        if response.status_code != 201 || response.body != "status 201" {
            return Err(format!("Unexpected response: {:?}", response));
        }
        if response.headers.get("x-test") != Some(&vec!["one".to_owned(), "two".to_owned()]) {
            return Err(format!("Unexpected headers: {:?}", response.headers));
        }
        if response.time.total <= 0.0 || response.time.dns != 0.0 {
            return Err(format!("Unexpected timing: {:?}", response.time));
        }
        let seen = seen.lock().await;
        let raw = seen.first().ok_or("Server saw no request")?.to_ascii_lowercase();
        for needle in [
            "post /echo http/1.1",
            "x-custom: v",
            "content-type: application/x-www-form-urlencoded",
            "user-agent: s2req-test",
            "\r\n\r\na=1",
        ] {
            if !raw.contains(needle) {
                return Err(format!("Request missing {:?}: {}", needle, raw));
            }
        }
        Ok(())
    })
}

#[test]
fn sender_retries_server_errors() -> Result<(), String> {
    run_async_test(async {
        let (base, seen) = spawn_server(vec![503, 200]).await?;
        let response = sender(1)?
            .dispatch(&request(base, "", &[]))
            .await
            .map_err(|err| err.to_string())?;
        if response.status_code != 200 {
            return Err(format!("Unexpected status: {}", response.status_code));
        }
        if seen.lock().await.len() != 2 {
            return Err("Expected two attempts".to_owned());
        }
        Ok(())
    })
}

#[test]
fn sender_reports_exhausted_retries() -> Result<(), String> {
    run_async_test(async {
        let (base, _seen) = spawn_server(vec![500]).await?;
        match sender(0)?.dispatch(&request(base, "", &[])).await {
            Err(HttpError::RetriesExhausted { retries: 0, last }) => match *last {
                HttpError::ServerError { status: 500 } => Ok(()),
                other => Err(format!("Unexpected last error: {:?}", other)),
            },
            other => Err(format!("Expected RetriesExhausted, got {:?}", other)),
        }
    })
}

#[test]
fn invalid_method_and_proxy_are_rejected() -> Result<(), String> {
    run_async_test(async {
        let mut bad = request("http://127.0.0.1:9".to_owned(), "", &[]);
        bad.method = "BAD METHOD".to_owned();
        match sender(0)?.dispatch(&bad).await {
            Err(HttpError::InvalidMethod { .. }) => {}
            other => return Err(format!("Expected InvalidMethod, got {:?}", other)),
        }
        let proxied = Sender::new(&SenderConfig {
            timeout: Duration::from_secs(1),
            proxy: Some("not a url".to_owned()),
            retry: 0,
            user_agent: String::new(),
        });
        if proxied.is_ok() {
            return Err("Expected invalid proxy error".to_owned());
        }
        Ok(())
    })
}

#[test]
fn dry_run_sends_nothing() -> Result<(), String> {
    run_async_test(async {
        let response = DryRun
            .dispatch(&request("http://127.0.0.1:9/x".to_owned(), "a", &[]))
            .await
            .map_err(|err| err.to_string())?;
        if response != ResponseData::default() {
            return Err(format!("Unexpected dry-run response: {:?}", response));
        }
        Ok(())
    })
}
