pub mod pipe;

macro_rules! chunks {
    ($(..$chunks:expr),+) => {{
        let mut v = Vec::new();

        $(
            v.extend($chunks);
        )+

        v
    }};
}

/**
A glog line with a fixed timestamp.
*/
pub(crate) fn glog(
    severity: char,
    thread_id: &str,
    file: &str,
    line: impl std::fmt::Display,
    message: &str,
) -> Vec<Vec<u8>> {
    vec![format!(
        "{}0512 10:23:45.123456 {} {}:{}] {}\n",
        severity, thread_id, file, line, message
    )
    .into_bytes()]
}

pub(crate) fn bytes(b: impl AsRef<[u8]>) -> Vec<Vec<u8>> {
    vec![b.as_ref().to_vec()]
}

pub(crate) fn line_end() -> Vec<Vec<u8>> {
    vec![vec![b'\n']]
}

pub(crate) fn test_child(name: &str) -> bool {
    use std::{
        env,
        process::{
            Command,
            Stdio,
        },
    };

    let self_bin = env::args().next().expect("missing self command");

    let mut test = Command::new(self_bin)
        .arg(name)
        .stdout(Stdio::inherit())
        .spawn()
        .expect("failed to start child process");

    test.wait().expect("test execution failed").success()
}

macro_rules! cases {
    ($($case:ident),+) => {
        $(
            mod $case;
        )+

        pub(crate) fn test_all() {
            use std::process;

            let mut failed = Vec::new();

            $(
                if !$crate::support::test_child(stringify!($case)) {
                    failed.push(stringify!($case));
                }
            )+

            if failed.len() > 0 {
                eprintln!("test execution failed. Failures: {:#?}", failed);
                process::exit(1);
            }
        }

        pub(crate) fn test(name: impl AsRef<str>) {
            let name = name.as_ref();

            $(
                if name == stringify!($case) {
                    use glogjson::diagnostics;

                    diagnostics::init(diagnostics::Config {
                        min_level: diagnostics::Level::Debug,
                        ..Default::default()
                    });

                    println!("running {}...", stringify!($case));
                    self::$case::test();

                    diagnostics::stop().expect("failed to stop diagnostics");
                }
            )+
        }
    }
}
