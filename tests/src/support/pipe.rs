use std::{
    sync::{
        Arc,
        Mutex,
    },
    thread,
    time::Duration,
};

use crossbeam_channel::{
    self,
    Receiver,
};

use serde_json::Value;

use glogjson::{
    pipe,
    process,
    receive,
};

use super::input::{
    self,
    Input,
};

pub const SOURCE_HOST: &'static str = "test.here.com";

pub struct Builder {
    max_size_bytes: usize,
    extra_fields: process::ExtraFields,
    line_number: process::LineNumberPolicy,
}

impl Builder {
    fn new() -> Self {
        Builder {
            max_size_bytes: 512,
            extra_fields: Default::default(),
            line_number: process::LineNumberPolicy::Reject,
        }
    }

    pub fn max_size_bytes(mut self, v: usize) -> Self {
        self.max_size_bytes = v;
        self
    }

    pub fn extra_field(mut self, k: &str, v: impl Into<Value>) -> Self {
        self.extra_fields.insert(k, v);
        self
    }

    pub fn line_number(mut self, v: process::LineNumberPolicy) -> Self {
        self.line_number = v;
        self
    }

    pub fn build(self) -> Pipe {
        Pipe::new(
            receive::Config {
                max_size_bytes: self.max_size_bytes,
            },
            process::Config {
                source_host: SOURCE_HOST.into(),
                extra_fields: self.extra_fields,
                line_number: self.line_number,
            },
        )
    }
}

pub struct Pipe {
    pipe: thread::JoinHandle<()>,
    handle: pipe::Handle,
    input: Option<Input>,
    received: Arc<Mutex<usize>>,
    rx: Receiver<Value>,
}

pub fn builder() -> Builder {
    Builder::new()
}

pub fn pipe() -> Pipe {
    Builder::new().build()
}

impl Pipe {
    fn new(receive: receive::Config, process: process::Config) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        let received = Arc::new(Mutex::new(0));

        let (input, reader) = input::channel();

        let mut pipe = pipe::build(reader, receive::build(receive), {
            let process = process::build(process);

            let received = received.clone();
            move |line| {
                *(received.lock().expect("poisoned lock")) += 1;

                let json = process.write_json(&line)?;
                tx.send(serde_json::from_slice::<Value>(&json)?)?;

                Ok(())
            }
        })
        .expect("failed to build pipe");

        let handle = pipe.take_handle().expect("no pipe handle");
        let pipe = thread::spawn(move || pipe.run().expect("failed to run pipe"));

        Pipe {
            handle,
            pipe,
            input: Some(input),
            rx,
            received,
        }
    }

    pub fn write(&mut self, chunks: Vec<Vec<u8>>) {
        self.input
            .as_mut()
            .expect("the input is closed")
            .write(chunks);
    }

    /**
    Close the input, so any final line without a terminator is read.
    */
    pub fn close_input(&mut self) {
        if let Some(input) = self.input.take() {
            input.close();
        }
    }

    /**
    The number of lines the pipe has tried to process.
    */
    pub fn received(&mut self) -> usize {
        *(self.received.lock().expect("poisoned lock"))
    }

    pub fn receive(&mut self, f: impl FnOnce(Value)) {
        let msg = self
            .rx
            .recv_timeout(Duration::from_secs(3))
            .expect("failed to receive an event");

        f(msg)
    }

    pub fn close(mut self) {
        self.close_input();
        self.handle.close();
        self.pipe.join().expect("failed to run pipe");
    }
}
