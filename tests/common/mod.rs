use assert_cmd::Command;

pub fn bedside_bin() -> Command {
    #[allow(deprecated)]
    {
        Command::cargo_bin("bedside").expect("bedside test binary should build")
    }
}
