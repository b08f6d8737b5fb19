use crate::messages::CmdVel;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use teleop_core::{Hub, Node, NodeInfo, TeleopError, TeleopResult, TopicMetadata};

/// Appends every velocity command seen on a topic to a JSON-lines file
///
/// The output file is created and the subscription starts when the node is
/// built, so a bad path fails before anything runs and nothing published
/// after construction is missed.
pub struct CmdVelRecorderNode {
    subscriber: Hub<CmdVel>,
    topic: String,
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    recorded: u64,
}

impl CmdVelRecorderNode {
    pub fn new(topic: &str, path: impl AsRef<Path>) -> TeleopResult<Self> {
        let path = path.as_ref().to_path_buf();
        let writer = BufWriter::new(File::create(&path)?);
        Ok(Self {
            subscriber: Hub::new(topic)?,
            topic: topic.to_string(),
            path,
            writer: Some(writer),
            recorded: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Commands written so far
    pub fn recorded(&self) -> u64 {
        self.recorded
    }

    fn drain(&mut self, ctx: &mut NodeInfo) {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        while let Some(cmd) = self.subscriber.recv(None) {
            let result = serde_json::to_writer(&mut *writer, &cmd)
                .map_err(TeleopError::from)
                .and_then(|_| writer.write_all(b"\n").map_err(TeleopError::from));
            match result {
                Ok(()) => self.recorded += 1,
                Err(e) => ctx.log_warning(&format!("Failed to record command: {}", e)),
            }
        }
    }
}

impl Node for CmdVelRecorderNode {
    fn name(&self) -> &'static str {
        "CmdVelRecorderNode"
    }

    fn init(&mut self, ctx: &mut NodeInfo) -> TeleopResult<()> {
        if self.writer.is_none() {
            return Err(TeleopError::Internal(format!(
                "recording to {} was already closed",
                self.path.display()
            )));
        }
        ctx.log_info(&format!("Recording '{}' to {}", self.topic, self.path.display()));
        Ok(())
    }

    fn tick(&mut self, ctx: &mut NodeInfo) {
        self.drain(ctx);
    }

    fn shutdown(&mut self, ctx: &mut NodeInfo) -> TeleopResult<()> {
        self.drain(ctx);
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        ctx.log_info(&format!("Recorded {} commands", self.recorded));
        Ok(())
    }

    fn get_subscribers(&self) -> Vec<TopicMetadata> {
        vec![TopicMetadata::of::<CmdVel>(&self.topic)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cmds.jsonl");
        let topic = "unit_recorder_json_lines";

        let mut recorder = CmdVelRecorderNode::new(topic, &path).unwrap();
        let publisher: Hub<CmdVel> = Hub::new(topic).unwrap();
        let mut ctx = NodeInfo::new("CmdVelRecorderNode", false);

        recorder.init(&mut ctx).unwrap();
        publisher.send(CmdVel::with_timestamp(0.5, 0.0, 1), None).unwrap();
        recorder.tick(&mut ctx);
        publisher.send(CmdVel::with_timestamp(0.0, -0.7, 2), None).unwrap();
        recorder.shutdown(&mut ctx).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<CmdVel> = contents
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], CmdVel::with_timestamp(0.5, 0.0, 1));
        assert_eq!(lines[1].angular, -0.7);
        assert_eq!(recorder.recorded(), 2);
    }

    #[test]
    fn test_bad_path_fails_at_construction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("cmds.jsonl");
        let result = CmdVelRecorderNode::new("unit_recorder_bad_path", &path);
        assert!(matches!(result, Err(TeleopError::Io(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_file_exists_before_init() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cmds.jsonl");
        let _recorder = CmdVelRecorderNode::new("unit_recorder_eager_file", &path).unwrap();
        assert!(path.exists());
    }
}
