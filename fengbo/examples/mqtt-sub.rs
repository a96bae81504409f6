// Copyright (c) 2023 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

//! Subscribe to a topic filter and print everything that arrives.

use std::time::Duration;

use fengbo::{Client, ConnectOptions, Error, QoS};

fn main() -> Result<(), Error> {
    env_logger::init();

    let client = Client::new();
    client.set_callback(|msg, err| {
        if let Some(msg) = msg {
            println!(
                "[{}] qos {:?}: {:?}",
                msg.topic,
                msg.qos,
                String::from_utf8_lossy(&msg.payload)
            );
        }
        if let Some(err) = err {
            eprintln!("connection lost: {err}");
        }
        Ok(())
    });

    let connected = client.connect(ConnectOptions::new("mqtt://localhost:1883"))?;
    connected
        .wait(Duration::from_secs(3))
        .expect("broker did not answer");

    let subscribed = client.subscribe("fengbo/#", QoS::ExactOnce)?;
    let granted = subscribed
        .wait(Duration::from_secs(1))
        .expect("subscribe not acknowledged");
    println!("granted: {granted:?}");

    loop {
        std::thread::sleep(Duration::from_secs(60));
    }
}
