use std::{
    thread,
    time::Duration,
};

use glogjson::{
    pipe,
    receive,
};

use crate::support::input;

pub fn test() {
    let (blocked, reader) = input::blocked();

    let mut pipe = pipe::build(reader, receive::build(Default::default()), |_| Ok(()))
        .expect("failed to build pipe");

    let handle = pipe.take_handle().expect("no pipe handle");

    let (done_tx, done_rx) = crossbeam_channel::bounded(1);
    thread::spawn(move || {
        pipe.run().expect("failed to run pipe");
        done_tx.send(()).expect("failed to signal completion");
    });

    // Let the pipe start its read
    thread::sleep(Duration::from_millis(200));

    assert!(handle.close());

    done_rx
        .recv_timeout(Duration::from_secs(3))
        .expect("the pipe didn't stop while its input was blocked");

    drop(blocked);
}
