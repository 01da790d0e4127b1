use crate::support::*;

pub fn test() {
    let mut pipe = pipe::pipe();

    pipe.write(chunks![
        ..bytes("plain text without header\n")
    ]);

    pipe.receive(|received| {
        assert_eq!(json!({}), received["@fields"]);
        assert_eq!("plain text without header\n", received["message"]);
    });

    pipe.close();
}
