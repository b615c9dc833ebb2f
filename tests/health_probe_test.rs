use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};
use warden::config::HealthSettings;
use warden::events::{RestartReason, SupervisorEvent};
use warden::health::HealthProbe;

/// Minimal HTTP responder answering every request with a fixed status
async fn serve_status(listener: TcpListener, status_line: &'static str) {
    loop {
        let Ok((mut socket, _)) = listener.accept().await else {
            break;
        };
        tokio::spawn(async move {
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok",
                status_line
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });
    }
}

fn probe_settings(max_failures: u32) -> HealthSettings {
    HealthSettings {
        url: None,
        interval_secs: 1,
        timeout_secs: 1,
        max_consecutive_failures: max_failures,
    }
}

#[tokio::test]
async fn test_healthy_endpoint_produces_no_restart_request() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve_status(listener, "200 OK"));

    let (events_tx, mut events_rx) = mpsc::channel(8);
    let (_pid_tx, pid_rx) = watch::channel(Some(1));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let probe = HealthProbe::new(
        format!("http://{}/health", addr),
        &probe_settings(2),
        events_tx,
        pid_rx,
    )
    .unwrap();
    tokio::spawn(probe.run(shutdown_rx));

    // Several probe cycles against a healthy endpoint
    tokio::time::sleep(Duration::from_secs(4)).await;
    assert!(events_rx.try_recv().is_err());

    let _ = shutdown_tx.send(true);
}

#[tokio::test]
async fn test_failing_endpoint_requests_forced_restart() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve_status(listener, "500 Internal Server Error"));

    let (events_tx, mut events_rx) = mpsc::channel(8);
    let (_pid_tx, pid_rx) = watch::channel(Some(1));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let probe = HealthProbe::new(
        format!("http://{}/health", addr),
        &probe_settings(2),
        events_tx,
        pid_rx,
    )
    .unwrap();
    tokio::spawn(probe.run(shutdown_rx));

    let event = tokio::time::timeout(Duration::from_secs(6), events_rx.recv())
        .await
        .expect("Probe should request a restart within a few cycles")
        .expect("Event channel open");

    match event {
        SupervisorEvent::ForceRestart {
            reason: RestartReason::HealthCheck {
                consecutive_failures,
            },
        } => assert_eq!(consecutive_failures, 2),
        other => panic!("Unexpected event: {:?}", other),
    }

    let _ = shutdown_tx.send(true);
}

#[tokio::test]
async fn test_probe_ignores_downtime_between_workers() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve_status(listener, "500 Internal Server Error"));

    let (events_tx, mut events_rx) = mpsc::channel(8);
    // No worker running: every reading is Unknown
    let (_pid_tx, pid_rx) = watch::channel(None);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let probe = HealthProbe::new(
        format!("http://{}/health", addr),
        &probe_settings(1),
        events_tx,
        pid_rx,
    )
    .unwrap();
    tokio::spawn(probe.run(shutdown_rx));

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(
        events_rx.try_recv().is_err(),
        "Unknown readings must not count as failures"
    );

    let _ = shutdown_tx.send(true);
}
