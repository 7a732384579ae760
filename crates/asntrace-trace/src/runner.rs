use asntrace_model::AddressFamily;
use std::process::{Command, Stdio};

#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub binary: String,
    pub rounds: u32,
    pub max_hops: u32,
    pub family: AddressFamily,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            binary: "mtr".to_string(),
            rounds: 3,
            max_hops: 30,
            family: AddressFamily::Any,
        }
    }
}

/// Raw event output, numeric addresses, fixed round count.
pub fn probe_args(target: &str, settings: &ProbeSettings) -> Vec<String> {
    let mut args = vec![
        "--raw".to_string(),
        "-n".to_string(),
        "-c".to_string(),
        settings.rounds.to_string(),
        "-m".to_string(),
        settings.max_hops.to_string(),
    ];
    match settings.family {
        AddressFamily::Any => {}
        AddressFamily::V4 => args.push("-4".to_string()),
        AddressFamily::V6 => args.push("-6".to_string()),
    }
    args.push(target.to_string());
    args
}

pub fn probe_command(target: &str, settings: &ProbeSettings) -> Command {
    let mut command = Command::new(&settings.binary);
    command
        .args(probe_args(target, settings))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    command
}
