use std::str;

use crate::support::*;

pub fn test() {
    let mut pipe = pipe::builder().max_size_bytes(128).build();

    let message = str::from_utf8(&[b'a'; 1024]).unwrap();

    pipe.write(chunks![
        ..glog('I', "7", "main.go", 42, message),
        ..glog('I', "7", "main.go", 43, "bar")
    ]);

    pipe.receive(|received| {
        assert_eq!("bar", received["message"]);
        assert_eq!(43, received["@fields"]["line"]);
    });

    assert_eq!(1, pipe.received());

    pipe.close();
}
