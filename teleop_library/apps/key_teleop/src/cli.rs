use clap::Parser;
use std::path::PathBuf;
use teleop_core::params::{
    PARAM_ANGULAR_MAX, PARAM_ANGULAR_MIN, PARAM_HZ, PARAM_LINEAR_BACKWARD_MAX,
    PARAM_LINEAR_BACKWARD_MIN, PARAM_LINEAR_FORWARD_MAX, PARAM_LINEAR_FORWARD_MIN, PARAM_STEPS,
    PARAM_TOPIC,
};
use teleop_core::{RuntimeParams, TeleopResult};

#[derive(Parser, Debug)]
#[command(name = "key_teleop")]
#[command(about = "Drive a robot from the terminal: arrow keys change speed, space stops")]
#[command(version)]
pub struct Cli {
    /// Parameter file (.toml, .yaml or .yml); flags below override it
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Publish rate while idle, in Hz
    #[arg(long)]
    pub hz: Option<f64>,

    /// Speed steps per direction
    #[arg(short = 's', long)]
    pub steps: Option<i64>,

    #[arg(long = "forward-min", value_name = "M/S")]
    pub forward_min: Option<f64>,

    #[arg(long = "forward-max", value_name = "M/S")]
    pub forward_max: Option<f64>,

    #[arg(long = "backward-min", value_name = "M/S")]
    pub backward_min: Option<f64>,

    #[arg(long = "backward-max", value_name = "M/S")]
    pub backward_max: Option<f64>,

    #[arg(long = "angular-min", value_name = "RAD/S")]
    pub angular_min: Option<f64>,

    #[arg(long = "angular-max", value_name = "RAD/S")]
    pub angular_max: Option<f64>,

    /// Topic to publish velocity commands on
    #[arg(short = 't', long)]
    pub topic: Option<String>,

    /// Also write every published command to this JSON-lines file
    #[arg(short = 'r', long = "record", value_name = "FILE")]
    pub record: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long = "log-level", default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Defaults, then the config file, then any flags given
    pub fn to_params(&self) -> TeleopResult<RuntimeParams> {
        let params = RuntimeParams::new();
        if let Some(path) = &self.config {
            params.load_from_disk(path)?;
        }

        let overrides = [
            (PARAM_HZ, self.hz),
            (PARAM_LINEAR_FORWARD_MIN, self.forward_min),
            (PARAM_LINEAR_FORWARD_MAX, self.forward_max),
            (PARAM_LINEAR_BACKWARD_MIN, self.backward_min),
            (PARAM_LINEAR_BACKWARD_MAX, self.backward_max),
            (PARAM_ANGULAR_MIN, self.angular_min),
            (PARAM_ANGULAR_MAX, self.angular_max),
        ];
        for (key, value) in overrides {
            if let Some(value) = value {
                params.set(key, value)?;
            }
        }
        if let Some(steps) = self.steps {
            params.set(PARAM_STEPS, steps)?;
        }
        if let Some(topic) = &self.topic {
            params.set(PARAM_TOPIC, topic)?;
        }
        Ok(params)
    }
}
