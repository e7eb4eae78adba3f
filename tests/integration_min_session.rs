// Drives the compiled binary through a PTY: the real event loop, crossterm input
// handling and terminal setup/teardown.
//
// Requires a TTY, so it is Unix-only and ignored by default.
// Run manually via: `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn minimal_session_completes_and_exits() -> Result<(), Box<dyn std::error::Error>> {
    let bin = assert_cmd::cargo::cargo_bin("typepad");
    let cmd = format!("{} -p hi -w 20", bin.display());

    let mut p = spawn(cmd)?;

    // let the app enter the alternate screen
    std::thread::sleep(Duration::from_millis(200));

    p.send("hi")?;
    std::thread::sleep(Duration::from_millis(200));

    // enter on the results screen starts the next round of the same prompt
    p.send("\r")?;
    std::thread::sleep(Duration::from_millis(100));
    p.send("hi")?;
    std::thread::sleep(Duration::from_millis(200));

    // ctrl-c quits from the results screen
    p.send("\x03")?;

    p.expect(Eof)?;
    Ok(())
}
