//! Test support: player proxies that need no session bus.

#![allow(clippy::unwrap_used)]

use zbus::{Connection, Guid, connection::Builder, proxy::CacheProperties};

use super::proxy::MediaPlayer2PlayerProxy;

/// Build a player proxy over a peer-to-peer connection whose remote end has
/// already hung up. Constructing the proxy needs no traffic, so it succeeds;
/// any player call on it fails fast, standing in for a vanished player.
pub(crate) async fn vanished_player_proxy() -> (MediaPlayer2PlayerProxy<'static>, Connection) {
    let guid = Guid::generate();
    let (server_stream, client_stream) = tokio::net::UnixStream::pair().unwrap();

    let server = Builder::unix_stream(server_stream)
        .server(guid)
        .unwrap()
        .p2p()
        .build();
    let client = Builder::unix_stream(client_stream).p2p().build();
    let (server_conn, client_conn) = futures::join!(server, client);

    // Dropping the remote end closes the stream under the client.
    drop(server_conn.unwrap());
    let client_conn = client_conn.unwrap();

    let proxy = MediaPlayer2PlayerProxy::builder(&client_conn)
        .destination("org.mpris.MediaPlayer2.test")
        .unwrap()
        .cache_properties(CacheProperties::No)
        .build()
        .await
        .unwrap();

    (proxy, client_conn)
}
