use futures::{select, FutureExt, StreamExt};

use tokio::{io::AsyncRead, runtime::Runtime, signal::ctrl_c, sync::oneshot};

use tokio_util::codec::FramedRead;

use anyhow::Error;

use bytes::Bytes;

use crate::{diagnostics::*, receive::Lines};

metrics! {
    process_ok,
    process_err
}

/**
A running conversion from an input stream of lines.
*/
pub struct Pipe {
    fut: futures::future::BoxFuture<'static, ()>,
    handle: Option<Handle>,
}

impl Pipe {
    pub fn take_handle(&mut self) -> Option<Handle> {
        self.handle.take()
    }

    pub fn run(self) -> Result<(), Error> {
        // Run the pipe on a fresh runtime
        let runtime = Runtime::new()?;

        runtime.block_on(self.fut);

        // A blocking read from stdin can't be cancelled, so don't
        // wait for it before returning
        runtime.shutdown_background();

        Ok(())
    }
}

/**
A handle to a running pipe that can be used to interact with it
programmatically.
*/
pub struct Handle {
    close: oneshot::Sender<()>,
}

impl Handle {
    /**
    Close the pipe.

    This returns `false` if the pipe has already stopped.
    */
    pub fn close(self) -> bool {
        self.close.send(()).is_ok()
    }
}

/**
Build a pipe that reads lines from `input` and processes them.

The pipe runs until the input is closed, its handle is closed,
or a termination signal is received. A line that fails to process
is reported and skipped.
*/
pub fn build(
    input: impl AsyncRead + Send + Unpin + 'static,
    lines: Lines,
    mut process: impl FnMut(Bytes) -> Result<(), Error> + Send + Unpin + 'static,
) -> Result<Pipe, Error> {
    emit("Starting glog pipe");

    let (handle_tx, handle_rx) = oneshot::channel();

    // Build a handle
    let handle = Some(Handle { close: handle_tx });

    let pipe = async move {
        let mut close = handle_rx.fuse();
        let mut ctrl_c = ctrl_c().boxed().fuse();
        let mut incoming = FramedRead::new(input, lines).fuse();

        // NOTE: We don't use `?` here because we never want to carry results
        // We always want to match them and deal with error cases directly
        loop {
            select! {
                // A line that's ready to process
                line = incoming.next() => match line {
                    Some(Ok(line)) => {
                        match process(line) {
                            Ok(()) => {
                                increment!(pipe.process_ok);
                            }
                            Err(err) => {
                                increment!(pipe.process_err);
                                emit_err(&err, "glog processing failed");
                            }
                        }
                    },
                    // An unrecoverable error occurred reading the input
                    Some(Err(err)) => {
                        emit_err(&err, "glog input failed irrecoverably");
                        break;
                    },
                    // The input has been closed
                    None => {
                        emit("Input closed; shutting down");
                        break;
                    },
                },
                // A termination signal from the programmatic handle
                _ = close => {
                    emit("Handle closed; shutting down");
                    break;
                },
                // A termination signal from the environment
                _ = ctrl_c => {
                    emit("Termination signal received; shutting down");
                    break;
                },
            };
        }

        emit("Stopping glog pipe");
    };

    Ok(Pipe {
        fut: Box::pin(pipe),
        handle,
    })
}
