use std::io::{self, Write};

use glogjson::{diagnostics, pipe, process, receive, Config, Error};

fn main() -> Result<(), Error> {
    let config = Config::from_env()?;

    diagnostics::init(config.diagnostics);

    let pipe = pipe::build(tokio::io::stdin(), receive::build(config.receive), {
        let process = process::build(config.process);

        move |line| {
            let mut json = process.write_json(&line)?;
            json.push(b'\n');

            let stdout = io::stdout();
            let mut stdout = stdout.lock();

            stdout.write_all(&json)?;
            stdout.flush()?;

            Ok(())
        }
    })?;

    pipe.run()?;

    diagnostics::stop()?;

    Ok(())
}
