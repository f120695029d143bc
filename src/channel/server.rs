use crate::channel::dispatch::{Event, Reply, bad_request, dispatch};
use crate::channel::method::Method;
use crate::config::codes;
use crate::wifi::{PermissionGate, PermissionOutcome, RadioSubsystem, WifiScanService};
use color_eyre::eyre::{Report, Result, eyre};
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};

const OUTBOX_CAPACITY: usize = 32;

/// Split a request line into its echoed `id` and its method name
fn parse_request(line: &[u8]) -> (Option<Value>, Result<String, String>) {
    let value: Value = match serde_json::from_slice(line) {
        Ok(value) => value,
        Err(e) => return (None, Err(e.to_string())),
    };
    let id = value.get("id").filter(|id| !id.is_null()).cloned();
    let method = match value.get("method") {
        Some(Value::String(name)) => Ok(name.clone()),
        Some(_) => Err("`method` must be a string".to_string()),
        None => Err("missing field `method`".to_string()),
    };
    (id, method)
}

#[derive(Debug, Serialize)]
struct Envelope<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a Value>,
    #[serde(flatten)]
    reply: &'a Reply,
}

fn encode<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        format!(
            r#"{{"status":"error","code":"{}","message":"{}"}}"#,
            codes::INTERNAL_ERROR,
            e.to_string().replace('"', "'")
        )
    })
}

/// Run a call on the blocking pool so a slow OS call only stalls that worker
async fn call<R, P>(
    service: &WifiScanService<R, P>,
    method: Method,
) -> (Reply, Option<PermissionOutcome>)
where
    R: RadioSubsystem + 'static,
    P: PermissionGate + 'static,
{
    let service = service.clone();
    let name = method.name().to_string();
    match tokio::task::spawn_blocking(move || dispatch(&service, &method)).await {
        Ok(answer) => answer,
        Err(e) => {
            warn!("Call `{name}` did not complete: {e}");
            (Reply::error(codes::INTERNAL_ERROR, e.to_string()), None)
        }
    }
}

async fn forward_permission_result(outcome: PermissionOutcome, outbox: mpsc::Sender<String>) {
    let granted = outcome.wait().await.is_granted();
    let line = encode(&Event::PermissionResult { granted });
    if outbox.send(line).await.is_err() {
        debug!("Channel closed before the permission result arrived");
    }
}

async fn write_lines<W>(mut output: W, mut outbox: mpsc::Receiver<String>) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = outbox.recv().await {
        output.write_all(line.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
    }
    Ok(())
}

/// Report why the writer task stopped taking lines
async fn writer_failure(writer: JoinHandle<std::io::Result<()>>) -> Report {
    match writer.await {
        Ok(Err(e)) => Report::new(e).wrap_err("channel writer stopped"),
        Err(e) => Report::new(e).wrap_err("channel writer stopped"),
        Ok(Ok(())) => eyre!("channel writer stopped"),
    }
}

/// Serve the WiFi channel over newline-delimited JSON until `input` ends.
///
/// Each request line `{"id": .., "method": ".."}` gets exactly one reply line,
/// in request order. Permission answers arrive later as event lines.
pub async fn serve<R, P, I, O>(service: WifiScanService<R, P>, input: I, output: O) -> Result<()>
where
    R: RadioSubsystem + 'static,
    P: PermissionGate + 'static,
    I: AsyncRead + Unpin,
    O: AsyncWrite + Unpin + Send + 'static,
{
    let (outbox, inbox) = mpsc::channel::<String>(OUTBOX_CAPACITY);
    let writer = tokio::spawn(write_lines(output, inbox));
    let mut watchers = JoinSet::new();
    let mut input = BufReader::new(input);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let line = buf.trim_ascii();
        if line.is_empty() {
            continue;
        }

        let (id, reply, pending) = match parse_request(line) {
            (id, Ok(name)) => {
                let (reply, pending) = call(&service, Method::from_name(&name)).await;
                (id, reply, pending)
            }
            (id, Err(e)) => {
                warn!("Malformed request: {e}");
                (id, bad_request(e), None)
            }
        };
        let envelope = Envelope {
            id: id.as_ref(),
            reply: &reply,
        };
        if outbox.send(encode(&envelope)).await.is_err() {
            watchers.abort_all();
            return Err(writer_failure(writer).await);
        }

        if let Some(outcome) = pending {
            watchers.spawn(forward_permission_result(outcome, outbox.clone()));
        }
    }

    info!("Channel input closed");
    watchers.abort_all();
    while watchers.join_next().await.is_some() {}
    drop(outbox);

    writer.await??;
    Ok(())
}

/// Run a single call and print its reply line to stdout.
///
/// With `wait_for_prompt`, also wait for an open permission prompt and print
/// its event line. Returns whether the call succeeded.
pub async fn call_once<R, P>(
    service: WifiScanService<R, P>,
    method: Method,
    wait_for_prompt: bool,
) -> Result<bool>
where
    R: RadioSubsystem + 'static,
    P: PermissionGate + 'static,
{
    let mut stdout = tokio::io::stdout();
    let (reply, pending) = call(&service, method).await;
    let envelope = Envelope {
        id: None,
        reply: &reply,
    };
    stdout.write_all(encode(&envelope).as_bytes()).await?;
    stdout.write_all(b"\n").await?;

    if let (true, Some(outcome)) = (wait_for_prompt, pending) {
        info!("Waiting for the permission prompt to be answered");
        let granted = outcome.wait().await.is_granted();
        let line = encode(&Event::PermissionResult { granted });
        stdout.write_all(line.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
    }

    stdout.flush().await?;
    Ok(reply.is_success())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceConfig;
    use crate::wifi::types::PermissionState;
    use crate::wifi::fake::{FakeGate, FakeRadio};
    use serde_json::json;
    use std::sync::Arc;
    use tokio::io::{duplex, split};

    struct Harness {
        writer: tokio::io::WriteHalf<tokio::io::DuplexStream>,
        reader: tokio::io::Lines<BufReader<tokio::io::ReadHalf<tokio::io::DuplexStream>>>,
        server: tokio::task::JoinHandle<Result<()>>,
    }

    impl Harness {
        fn start(radio: Arc<FakeRadio>, gate: Arc<FakeGate>) -> Self {
            let _ = env_logger::builder().is_test(true).try_init();

            let service = WifiScanService::new(radio, gate, ServiceConfig::default());
            let (client, server) = duplex(4096);
            let (server_read, server_write) = split(server);
            let (client_read, client_write) = split(client);

            Self {
                writer: client_write,
                reader: BufReader::new(client_read).lines(),
                server: tokio::spawn(serve(service, server_read, server_write)),
            }
        }

        async fn send(&mut self, line: &str) {
            self.send_bytes(line.as_bytes()).await;
        }

        async fn send_bytes(&mut self, line: &[u8]) {
            self.writer.write_all(line).await.unwrap();
            self.writer.write_all(b"\n").await.unwrap();
        }

        async fn recv(&mut self) -> Value {
            let line = self.reader.next_line().await.unwrap().expect("reply line");
            serde_json::from_str(&line).unwrap()
        }

        async fn close(mut self) {
            self.writer.shutdown().await.unwrap();
            self.server.await.unwrap().unwrap();
        }
    }

    #[tokio::test]
    async fn replies_follow_request_order_and_echo_ids() {
        let radio = Arc::new(FakeRadio::with_ssids(&["Net_B", "", "Net_A", "Net_B"]));
        let mut h = Harness::start(radio, Arc::new(FakeGate::granted()));

        h.send(r#"{"id": 1, "method": "scanWiFi"}"#).await;
        h.send(r#"{"id": "two", "method": "isWiFiEnabled"}"#).await;
        h.send(r#"{"method": "connectWiFi"}"#).await;

        assert_eq!(
            h.recv().await,
            json!({"id": 1, "status": "success", "result": ["Net_A", "Net_B"]})
        );
        assert_eq!(
            h.recv().await,
            json!({"id": "two", "status": "success", "result": true})
        );
        assert_eq!(h.recv().await, json!({"status": "notImplemented"}));
        h.close().await;
    }

    #[tokio::test]
    async fn denied_scan_is_an_error_reply() {
        let radio = Arc::new(FakeRadio::with_ssids(&["Net_A"]));
        let mut h = Harness::start(radio.clone(), Arc::new(FakeGate::denied()));

        h.send(r#"{"id": 7, "method": "scanWiFi"}"#).await;
        assert_eq!(
            h.recv().await,
            json!({
                "id": 7,
                "status": "error",
                "code": "PERMISSION_DENIED",
                "message": "WiFi scan permission not granted"
            })
        );
        assert_eq!(radio.scan_count(), 0);
        h.close().await;
    }

    #[tokio::test]
    async fn malformed_lines_do_not_stop_the_server() {
        let radio = Arc::new(FakeRadio::with_ssids(&[]));
        let mut h = Harness::start(radio, Arc::new(FakeGate::granted()));

        h.send("not json").await;
        h.send("").await;
        h.send(r#"{"id": 3}"#).await;
        h.send(r#"{"id": 4, "method": "isWiFiEnabled"}"#).await;

        let first = h.recv().await;
        assert_eq!(first["status"], "error");
        assert_eq!(first["code"], "BAD_REQUEST");
        let second = h.recv().await;
        assert_eq!(second["id"], 3);
        assert_eq!(second["code"], "BAD_REQUEST");
        assert_eq!(
            h.recv().await,
            json!({"id": 4, "status": "success", "result": true})
        );
        h.close().await;
    }

    #[tokio::test]
    async fn invalid_utf8_line_gets_bad_request() {
        let radio = Arc::new(FakeRadio::with_ssids(&[]));
        let mut h = Harness::start(radio, Arc::new(FakeGate::granted()));

        h.send_bytes(b"\xff").await;
        h.send_bytes(b"{\"id\": 1, \"method\": \"scan\xffWiFi\"}").await;
        h.send(r#"{"id": 2, "method": "isWiFiEnabled"}"#).await;

        let first = h.recv().await;
        assert_eq!(first["code"], "BAD_REQUEST");
        assert!(first.get("id").is_none());
        assert_eq!(h.recv().await["code"], "BAD_REQUEST");
        assert_eq!(
            h.recv().await,
            json!({"id": 2, "status": "success", "result": true})
        );
        h.close().await;
    }

    #[tokio::test]
    async fn non_string_method_echoes_id() {
        let mut h = Harness::start(Arc::new(FakeRadio::default()), Arc::new(FakeGate::granted()));

        h.send(r#"{"id": "x", "method": 5}"#).await;
        let reply = h.recv().await;
        assert_eq!(reply["id"], "x");
        assert_eq!(reply["status"], "error");
        assert_eq!(reply["code"], "BAD_REQUEST");
        h.close().await;
    }

    struct BrokenOutput;

    impl AsyncWrite for BrokenOutput {
        fn poll_write(
            self: std::pin::Pin<&mut Self>,
            _: &mut std::task::Context<'_>,
            _: &[u8],
        ) -> std::task::Poll<std::io::Result<usize>> {
            std::task::Poll::Ready(Err(std::io::ErrorKind::BrokenPipe.into()))
        }

        fn poll_flush(
            self: std::pin::Pin<&mut Self>,
            _: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Ok(()))
        }

        fn poll_shutdown(
            self: std::pin::Pin<&mut Self>,
            _: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn failed_output_reports_the_write_error() {
        let _ = env_logger::builder().is_test(true).try_init();
        let service = WifiScanService::new(
            Arc::new(FakeRadio::default()),
            Arc::new(FakeGate::granted()),
            ServiceConfig::default(),
        );
        let (mut client, server_read) = duplex(4096);
        let server = tokio::spawn(serve(service, server_read, BrokenOutput));

        // Input stays open, so the server can only stop on the failed write.
        for _ in 0..100 {
            if server.is_finished() {
                break;
            }
            let request = br#"{"method": "isWiFiEnabled"}"#;
            if client.write_all(request).await.is_err() || client.write_all(b"\n").await.is_err() {
                break;
            }
            tokio::task::yield_now().await;
        }

        let err = server.await.unwrap().unwrap_err();
        let io = err.root_cause().downcast_ref::<std::io::Error>().expect("io error");
        assert_eq!(io.kind(), std::io::ErrorKind::BrokenPipe);
        drop(client);
    }

    #[tokio::test]
    async fn permission_answer_arrives_as_event() {
        let radio = Arc::new(FakeRadio::with_ssids(&["Home"]));
        let gate = Arc::new(FakeGate::denied());
        let mut h = Harness::start(radio, gate.clone());

        h.send(r#"{"id": 1, "method": "requestWiFiPermission"}"#).await;
        assert_eq!(
            h.recv().await,
            json!({"id": 1, "status": "success", "result": false})
        );
        assert_eq!(gate.prompt_count(), 1);

        gate.answer(PermissionState::Granted);
        assert_eq!(
            h.recv().await,
            json!({"event": "permissionResult", "granted": true})
        );

        h.send(r#"{"id": 2, "method": "scanWiFi"}"#).await;
        assert_eq!(
            h.recv().await,
            json!({"id": 2, "status": "success", "result": ["Home"]})
        );
        h.close().await;
    }

    #[tokio::test]
    async fn closing_input_with_open_prompt_shuts_down() {
        let gate = Arc::new(FakeGate::denied());
        let mut h = Harness::start(Arc::new(FakeRadio::default()), gate);

        h.send(r#"{"method": "requestWiFiPermission"}"#).await;
        assert_eq!(h.recv().await, json!({"status": "success", "result": false}));
        h.close().await;
    }
}
