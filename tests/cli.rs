use assert_cmd::Command;

#[test]
fn help_lists_options() {
    let output = Command::cargo_bin("typepad")
        .unwrap()
        .arg("--help")
        .output()
        .unwrap();

    assert!(output.status.success());
    let help = String::from_utf8(output.stdout).unwrap();
    assert!(help.contains("--robot"));
    assert!(help.contains("--strict"));
    assert!(help.contains("--tabsize"));
}

#[test]
fn rejects_unknown_unit() {
    Command::cargo_bin("typepad")
        .unwrap()
        .args(["--unit", "furlongs"])
        .assert()
        .failure();
}

#[test]
fn requires_a_tty() {
    Command::cargo_bin("typepad")
        .unwrap()
        .args(["-p", "hello"])
        .env("HOME", std::env::temp_dir())
        .write_stdin("")
        .assert()
        .failure();
}
