//! External trainer launcher.
//!
//! Training itself happens in the Ultralytics `yolo` CLI; this module only
//! builds its command line and reports whether it succeeded.

use std::path::PathBuf;
use std::process::Command;

use log::info;

use crate::error::PrepError;

/// Trainer invocation settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrainOptions {
    /// Trainer executable.
    pub program: String,
    /// Dataset descriptor passed as `data=`.
    pub data: PathBuf,
    pub epochs: u32,
    /// Model or weights passed as `model=`; trainer default when unset.
    pub model: Option<String>,
    /// Directory the trainer writes its runs into (`project=`).
    pub runs_dir: PathBuf,
    /// Further `key=value` arguments, passed through verbatim.
    pub extra_args: Vec<String>,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            program: "yolo".to_string(),
            data: PathBuf::from("data/coco8.yaml"),
            epochs: 1,
            model: None,
            runs_dir: PathBuf::from("runs"),
            extra_args: Vec::new(),
        }
    }
}

/// Builds `<program> train data=.. epochs=.. [model=..] project=.. [extra..]`.
pub fn build_train_command(opts: &TrainOptions) -> Command {
    let mut cmd = Command::new(&opts.program);
    cmd.arg("train")
        .arg(format!("data={}", opts.data.display()))
        .arg(format!("epochs={}", opts.epochs));
    if let Some(model) = &opts.model {
        cmd.arg(format!("model={model}"));
    }
    cmd.arg(format!("project={}", opts.runs_dir.display()));
    cmd.args(&opts.extra_args);
    cmd
}

/// Runs the trainer to completion with inherited stdio.
pub fn run_training(opts: &TrainOptions) -> Result<(), PrepError> {
    let mut cmd = build_train_command(opts);
    info!("Launching trainer: {:?}", cmd);

    let status = cmd.status().map_err(|source| PrepError::TrainLaunch {
        program: opts.program.clone(),
        source,
    })?;

    if !status.success() {
        return Err(PrepError::TrainFailed {
            program: opts.program.clone(),
            status,
        });
    }

    info!("Training finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    #[test]
    fn command_line_has_expected_shape() {
        let opts = TrainOptions {
            model: Some("yolov8n.pt".to_string()),
            extra_args: vec!["imgsz=1024".to_string()],
            ..Default::default()
        };
        let cmd = build_train_command(&opts);

        assert_eq!(cmd.get_program(), OsStr::new("yolo"));
        let args: Vec<&OsStr> = cmd.get_args().collect();
        assert_eq!(
            args,
            vec![
                OsStr::new("train"),
                OsStr::new("data=data/coco8.yaml"),
                OsStr::new("epochs=1"),
                OsStr::new("model=yolov8n.pt"),
                OsStr::new("project=runs"),
                OsStr::new("imgsz=1024"),
            ]
        );
    }

    #[test]
    fn missing_program_is_a_launch_error() {
        let opts = TrainOptions {
            program: "cxrprep-no-such-trainer".to_string(),
            ..Default::default()
        };
        let err = run_training(&opts).unwrap_err();
        assert!(matches!(err, PrepError::TrainLaunch { .. }));
    }
}
