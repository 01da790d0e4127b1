use crate::support::*;

pub fn test() {
    let mut pipe = pipe::pipe();

    let mut lines = Vec::new();
    lines.extend(glog('I', "7", "main.go", 1, "first"));
    lines.extend(bytes("not glog\n"));
    lines.extend(glog('E', "7", "main.go", 3, "third"));

    // All lines arrive in a single chunk
    pipe.write(vec![lines.concat()]);

    pipe.receive(|received| {
        assert_eq!("first", received["message"]);
    });

    pipe.receive(|received| {
        assert_eq!("not glog\n", received["message"]);
        assert_eq!(json!({}), received["@fields"]);
    });

    pipe.receive(|received| {
        assert_eq!("third", received["message"]);
        assert_eq!("ERROR", received["@fields"]["level"]);
    });

    pipe.close();
}
