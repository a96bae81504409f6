// Copyright (c) 2023 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

//! Publish a handful of messages to a local broker.

use std::time::Duration;

use fengbo::{Client, ConnectOptions, Error, QoS};

fn main() -> Result<(), Error> {
    env_logger::init();

    let client = Client::new();
    client.set_callback(|msg, err| {
        if let Some(msg) = msg {
            println!("[{}] {:?}", msg.topic, String::from_utf8_lossy(&msg.payload));
        }
        if let Some(err) = err {
            eprintln!("connection lost: {err}");
        }
        Ok(())
    });

    let mut options = ConnectOptions::new("mqtt://localhost:1883");
    options.set_client_id("fengbo-example").set_keep_alive("30s");

    let connected = client.connect(options)?;
    let reply = connected
        .wait(Duration::from_secs(3))
        .expect("broker did not answer");
    println!("connected, session present: {}", reply.session_present());

    for round in 0..5 {
        let payload = format!("round {round}");
        let published =
            client.publish("fengbo/example", payload.as_bytes(), QoS::AtLeastOnce, false)?;
        published
            .wait(Duration::from_secs(1))
            .expect("publish not acknowledged");
    }

    client.disconnect()
}
