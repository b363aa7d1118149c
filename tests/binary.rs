use std::process::Command;

use opcode_dump::DUMP_MATRIX;

#[test]
fn binary_dumps_every_config_and_exits_cleanly() {
    let output = Command::new(env!("CARGO_BIN_EXE_opcode-dump"))
        .env_remove("RUST_LOG")
        .output()
        .expect("run opcode-dump");

    assert!(output.status.success(), "exit status: {}", output.status);

    let stdout = String::from_utf8(output.stdout).expect("utf-8 stdout");
    let headers: Vec<&str> = stdout
        .lines()
        .filter(|l| l.starts_with("Opcodes ["))
        .collect();
    let expected: Vec<String> = DUMP_MATRIX.iter().map(|c| c.to_string()).collect();
    assert_eq!(headers, expected);

    let mut lines = stdout.lines();
    assert_eq!(lines.next(), Some(expected[0].as_str()));
    if cfg!(feature = "logging") {
        assert!(lines.next().is_some_and(|l| l.ends_with("; C3")));
    }
}
