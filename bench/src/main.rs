use log::info;
use std::sync::Arc;
use std::time::Instant;
use xchannel::{ChannelConfig, LocalChannel, LocalConnection, LocalConnectionContext, TokioExecutor};

mod sink;

use sink::Sink;

const MESSAGE_COUNT: usize = 1024;
const MESSAGE_SIZE: usize = 256 * 1024; // 256 KB
const CHUNK_SIZE: usize = 16 * 1024;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let context = Arc::new(LocalConnectionContext::new(LocalConnection::new("bench")));
    let (client, server) = LocalChannel::pair(
        ChannelConfig::default(),
        Arc::new(TokioExecutor::current()),
        context.clone(),
    );
    info!("Channel pair ready: {:?}", client);

    let (done_tx, done_rx) = futures::channel::oneshot::channel();
    server
        .receive_message(Sink::new(done_tx))
        .expect("Failed to register receiver");

    info!(
        "Sending {} messages of {} KB...",
        MESSAGE_COUNT,
        MESSAGE_SIZE / 1024
    );
    let start = Instant::now();
    let producer = tokio::task::spawn_blocking(move || -> xchannel::Result<()> {
        let chunk = vec![0xAB; CHUNK_SIZE];
        for _ in 0..MESSAGE_COUNT {
            let mut message = client.write_message()?;
            for _ in 0..MESSAGE_SIZE / CHUNK_SIZE {
                std::io::Write::write_all(&mut message, &chunk)?;
            }
            message.close()?;
        }
        client.write_shutdown();
        client.close();
        Ok(())
    });

    producer
        .await
        .expect("Producer task panicked")
        .expect("Failed to send messages");
    let stats = done_rx.await.expect("Receiver dropped before end-of-stream");
    let elapsed = start.elapsed();

    let total_mb = stats.bytes as f64 / 1024.0 / 1024.0;
    info!("=== Transfer Complete ===");
    info!("Messages received: {}", stats.messages);
    info!("Total received: {:.2} MB", total_mb);
    info!("Time: {:.2} seconds", elapsed.as_secs_f64());
    info!("Speed: {:.2} MB/s", total_mb / elapsed.as_secs_f64());
    info!("Remote-closed notifications: {}", context.remote_closed_count());

    let closed = server.closed();
    server.close();
    closed.await;
}
