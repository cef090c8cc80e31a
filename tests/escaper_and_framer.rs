//! Integration-style tests exercising the parameter escaper and the packet
//! framer against the public API, without a live server (SPEC_FULL.md §4
//! Test tooling). The unit tests colocated with `params`/`framer` cover
//! individual codec paths; these drive a few calls together the way a
//! caller actually would.

use mysql_wire::params::{Param, Params};
use mysql_wire::Framer;

#[test]
fn renders_a_mixed_insert_statement() {
    let params = Params::Positional(vec![
        Param::from(1i64),
        Param::from("O'Brien".to_string()),
        Param::Null,
    ]);
    let rendered =
        mysql_wire::params::format(b"insert into users values (%s, %s, %s)", &params, "utf8mb4")
            .unwrap();
    assert_eq!(
        rendered,
        b"insert into users values (1, 'O\\'Brien', NULL)".to_vec()
    );
}

#[test]
fn splices_executemany_rows_into_one_statement() {
    let rows = vec![
        Params::Positional(vec![Param::from(1i64), Param::from("a".to_string())]),
        Params::Positional(vec![Param::from(2i64), Param::from("b".to_string())]),
    ];
    let (prefix, template, suffix) =
        mysql_wire::params::split_insert_values("insert into t (id, name) values (%s, %s)").unwrap();
    let statements =
        mysql_wire::params::render_bulk_insert(&prefix, &template, &suffix, &rows, "utf8mb4", 16 * 1024 * 1024)
            .unwrap();
    assert_eq!(statements.len(), 1);
    assert_eq!(
        statements[0],
        b"insert into t (id, name) values (1, 'a'),(2, 'b')".to_vec()
    );
}

#[tokio::test]
async fn framer_round_trips_a_packet_over_a_duplex_stream() {
    let (client, server) = tokio::io::duplex(4096);
    let mut client_framer = Framer::new(client);
    let mut server_framer = Framer::new(server);

    client_framer.write_packet(b"select 1").await.unwrap();
    let received = server_framer.read_packet().await.unwrap();
    assert_eq!(received, b"select 1");

    server_framer.reset_sequence();
    client_framer.reset_sequence();
    server_framer.write_packet(b"ok").await.unwrap();
    let reply = client_framer.read_packet().await.unwrap();
    assert_eq!(reply, b"ok");
}

#[tokio::test]
async fn framer_reassembles_a_packet_spanning_the_continuation_boundary() {
    let (client, server) = tokio::io::duplex(64 * 1024);
    let mut client_framer = Framer::new(client);
    let mut server_framer = Framer::new(server);

    let payload = vec![0x42u8; mysql_wire::framer::MAX_FRAME_LEN + 10];
    let payload_for_write = payload.clone();

    let writer = tokio::spawn(async move {
        client_framer.write_packet(&payload_for_write).await.unwrap();
    });
    let received = server_framer.read_packet().await.unwrap();
    writer.await.unwrap();

    assert_eq!(received, payload);
}
