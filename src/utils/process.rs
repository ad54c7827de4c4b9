use std::ffi::OsStr;
use std::fmt::Debug;
use std::process::{Command, Stdio};

use anyhow::{anyhow, Context, Result};

macro_rules! exec_err {
    ($p:expr, $args:expr, $ext_msg:expr) => {
        anyhow::anyhow!(
            "error occured when executing command `{} {}`{}",
            $p.as_ref().to_string_lossy().to_string(),
            $args
                .iter()
                .map(|oss| oss.as_ref().to_string_lossy().to_string())
                .collect::<std::vec::Vec<_>>()
                .join(" "),
            $ext_msg
        )
    };
}

/// Execute a command using [`Command`] api.
///
/// # Errors
///
/// This will return errors if:
/// 1. The specific command cannot be execute.
/// 2. The command was executed but failed.
pub fn execute<P, A>(program: P, args: &[A]) -> Result<()>
where
    P: AsRef<OsStr> + Debug,
    A: AsRef<OsStr>,
{
    execute_with_env(program, args, [])
}

/// Execute a command using [`Command`] api, with environment variables.
///
/// # Errors
///
/// This will return errors if:
/// 1. The specific command cannot be execute.
/// 2. The command was executed but failed.
pub fn execute_with_env<'a, P, A, I>(program: P, args: &[A], envs: I) -> Result<()>
where
    P: AsRef<OsStr> + Debug,
    A: AsRef<OsStr>,
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let output = Command::new(program.as_ref())
        .args(args)
        .envs(envs)
        .stdout(Stdio::inherit())
        .stderr(Stdio::piped())
        .output()
        .with_context(|| exec_err!(program, args, ""))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(exec_err!(program, args, format!(": {stderr}")));
    }

    Ok(())
}

/// Execute a command and return its exit code, regardless of success.
pub fn execute_for_ret_code<P, A>(program: P, args: &[A]) -> Result<i32>
where
    P: AsRef<OsStr> + Debug,
    A: AsRef<OsStr>,
{
    let status = Command::new(program.as_ref())
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .with_context(|| exec_err!(program, args, ""))?;

    status.code().ok_or_else(|| {
        anyhow!(
            "failed to retrive exit code because the program {:?} was terminated by a signal",
            program.as_ref()
        )
    })
}

/// Execute a command with all standard streams inherited, waiting until it exits.
///
/// Used to hand the terminal over to an interactive program such as a shell.
pub fn execute_interactive<P, A>(program: P, args: &[A]) -> Result<()>
where
    P: AsRef<OsStr> + Debug,
    A: AsRef<OsStr>,
{
    let status = Command::new(program.as_ref())
        .args(args)
        .status()
        .with_context(|| exec_err!(program, args, ""))?;

    if !status.success() {
        return Err(exec_err!(
            program,
            args,
            format!(": exited with status {status}")
        ));
    }
    Ok(())
}
