use std::process::ExitCode;

use tether::IpcError;

pub type CliResult<T> = anyhow::Result<T>;

/// The host answered but rejected the call
const EXIT_REJECTED: u8 = 2;
/// The host could not be reached or hung up mid-call
const EXIT_UNREACHABLE: u8 = 3;

/// Print the error chain to stderr and pick an exit code for it
pub fn to_exit_code(result: CliResult<()>) -> ExitCode {
    let Err(e) = result else {
        return ExitCode::SUCCESS;
    };

    eprintln!("error: {e}");
    for cause in e.chain().skip(1) {
        eprintln!("  caused by: {cause}");
    }

    ExitCode::from(exit_status(&e))
}

fn exit_status(error: &anyhow::Error) -> u8 {
    match error.chain().find_map(|cause| cause.downcast_ref::<IpcError>()) {
        Some(IpcError::Remote(_)) => EXIT_REJECTED,
        Some(IpcError::Disconnected | IpcError::Io(_)) => EXIT_UNREACHABLE,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_exit_status_follows_ipc_cause() {
        let rejected = Err::<(), _>(IpcError::Remote("denied".into()))
            .context("call failed")
            .unwrap_err();
        assert_eq!(exit_status(&rejected), EXIT_REJECTED);

        let gone = anyhow::Error::from(IpcError::Disconnected);
        assert_eq!(exit_status(&gone), EXIT_UNREACHABLE);

        assert_eq!(exit_status(&anyhow::anyhow!("bad args")), 1);
    }
}
