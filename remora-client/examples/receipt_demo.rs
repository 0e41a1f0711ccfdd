//! Encode a test receipt and push it through the full client flow against
//! an in-process daemon stand-in.
//!
//! ```sh
//! cargo run -p remora-client --example receipt_demo
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use remora_cert::{Certificate, SigningStrategy, StaticSource};
use remora_client::{
    BridgeConnection, ConnectOptions, ConnectionError, Dialer, MemoryTransport, PrintDispatcher,
    PrinterDirectory, PrintJob, Transport,
};
use remora_printer::{encode_receipt, LineItem, Receipt, ReceiptOptions};
use shared::job::PrintProfile;
use shared::message::{
    BridgeMessage, EventType, HelloAckPayload, PrintAckPayload, PrinterListPayload,
    PrintRequestPayload, SignChallengePayload, SignResponsePayload, PROTOCOL_VERSION,
};

const DEMO_CERT: &str =
    "-----BEGIN CERTIFICATE-----\nMIIBszCCAVmgAwIBAgIUdemo\n-----END CERTIFICATE-----\n";

/// Minimal daemon: acks the handshake, challenges every privileged
/// request, reports one printer, accepts every job.
async fn run_daemon(transport: MemoryTransport) {
    let hello = transport.read_message().await.expect("hello frame");
    let ack = BridgeMessage::response(
        EventType::HelloAck,
        hello.request_id,
        &HelloAckPayload { version: PROTOCOL_VERSION },
    )
    .expect("encode ack");
    transport.write_message(&ack).await.expect("write ack");

    while let Ok(msg) = transport.read_message().await {
        let challenge = BridgeMessage::request(
            EventType::SignChallenge,
            &SignChallengePayload { data: msg.event_type.to_string() },
        )
        .expect("encode challenge");
        transport.write_message(&challenge).await.expect("write challenge");
        let answer = transport.read_message().await.expect("signature");
        let signature: SignResponsePayload = answer.payload_as().expect("signature payload");
        println!("daemon: signature received ({} chars)", signature.signature.len());

        let reply = match msg.event_type {
            EventType::FindPrinters => BridgeMessage::response(
                EventType::PrinterList,
                msg.request_id,
                &PrinterListPayload { printers: vec!["Demo Thermal 58mm".to_string()] },
            ),
            EventType::PrintRequest => {
                let job: PrintRequestPayload = msg.payload_as().expect("print payload");
                println!(
                    "daemon: job '{}' for '{}' ({} fragments, {} bytes)",
                    job.config.job_name,
                    job.printer,
                    job.data.len(),
                    job.data.iter().map(String::len).sum::<usize>(),
                );
                BridgeMessage::response(EventType::PrintAck, msg.request_id, &PrintAckPayload {})
            }
            other => panic!("demo daemon got unexpected frame: {other}"),
        }
        .expect("encode reply");
        transport.write_message(&reply).await.expect("write reply");
    }
}

struct DemoDialer;

#[async_trait]
impl Dialer for DemoDialer {
    async fn dial(&self, _options: &ConnectOptions) -> Result<Box<dyn Transport>, ConnectionError> {
        let (client_side, daemon_side) = MemoryTransport::pair();
        tokio::spawn(run_daemon(daemon_side));
        Ok(Box::new(client_side))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let certificate = Certificate::from_pem(DEMO_CERT)?;
    let signer = SigningStrategy::DigestOnly.build(Arc::new(StaticSource::new("")));

    let conn = BridgeConnection::new(certificate, signer, Box::new(DemoDialer));
    let options = ConnectOptions::default()
        .with_retries(3)
        .with_retry_delay(Duration::from_secs(1));
    conn.connect(&options).await?;

    let directory = PrinterDirectory::new(conn.clone());
    let printers = directory.refresh().await?;
    println!("printers: {printers:?}");
    let printer = directory
        .selected()
        .await
        .ok_or("no printer available")?;

    let receipt = Receipt {
        header: "POS PRINTER TEST".to_string(),
        items: vec![
            LineItem::new("Item 1", "$10.00"),
            LineItem::new("Item 2", "$15.50"),
        ],
        total: "$25.50".to_string(),
        footer: "Thank you!".to_string(),
    };
    let stream = encode_receipt(&receipt, &ReceiptOptions::default());
    let job = PrintJob::new(PrintProfile::SilentDialogSuppress.job_config("receipt"), stream);

    let dispatcher = PrintDispatcher::new(conn.clone());
    dispatcher.send(&printer, &job).await?;
    println!("receipt printed on '{printer}'");

    conn.disconnect().await;
    Ok(())
}
