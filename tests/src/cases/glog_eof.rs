use crate::support::*;

pub fn test() {
    let mut pipe = pipe::pipe();

    pipe.write(chunks![
        ..bytes("F0512 10:23:45.123456 7 main.go:42] last words")
    ]);

    pipe.close_input();

    pipe.receive(|received| {
        assert_eq!("FATAL", received["@fields"]["level"]);
        assert_eq!("last words", received["message"]);
    });

    assert_eq!(1, pipe.received());

    pipe.close();
}
