use glogjson::process::LineNumberPolicy;

use crate::support::*;

pub fn test() {
    let mut pipe = pipe::builder()
        .line_number(LineNumberPolicy::Zero)
        .build();

    pipe.write(chunks![
        ..glog('I', "7", "main.go", "4x2", "hello")
    ]);

    pipe.receive(|received| {
        assert_eq!(0, received["@fields"]["line"]);
        assert_eq!("hello", received["message"]);
    });

    pipe.close();
}
