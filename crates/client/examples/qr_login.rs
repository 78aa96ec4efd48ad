//! Scan-to-login demo: runs the handshake against the live gateway and
//! prints each lifecycle event.
//!
//! ```sh
//! RUST_LOG=client=debug cargo run --example qr_login
//! ```

use client::{AuthClient, AuthEvent, ClientConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut client = AuthClient::new(ClientConfig::default());
    let mut events = client.events().expect("receiver taken once");

    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                AuthEvent::QrCode(code) => println!("Got qrCode: {}", code),
                AuthEvent::User(account) => {
                    println!("Got user: {} (id {})", account, account.id)
                }
                AuthEvent::Token(token) => println!("Got token: {}", token),
                AuthEvent::Timeout => println!("Got timeout"),
                AuthEvent::Cancel => println!("Got cancel"),
            }
        }
    });

    client.run().await?;
    drop(client);
    printer.await?;

    Ok(())
}
