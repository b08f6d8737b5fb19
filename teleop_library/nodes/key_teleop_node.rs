use crate::algorithms::TurboCurves;
use crate::config::TeleopConfig;
use crate::messages::CmdVel;
use crate::terminal::{Key, StatusLayout, TerminalInterface};
use teleop_core::{Hub, Node, NodeInfo, Rate, TeleopResult, TopicMetadata};

/// A terminal that keeps failing is reported on the first failure and then
/// once every this many consecutive failures
pub const TERMINAL_WARN_EVERY: u64 = 50;

/// Consecutive failure count for one terminal operation
#[derive(Debug, Default)]
struct FaultStreak {
    consecutive: u64,
}

impl FaultStreak {
    /// Count a failure; returns the streak length when it should be logged
    fn failed(&mut self) -> Option<u64> {
        self.consecutive += 1;
        (self.consecutive == 1 || self.consecutive % TERMINAL_WARN_EVERY == 0).then_some(self.consecutive)
    }

    /// End the streak; returns its length if there was one
    fn recovered(&mut self) -> Option<u64> {
        let streak = std::mem::take(&mut self.consecutive);
        (streak > 0).then_some(streak)
    }
}

/// What a key press did to the step counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Counters changed (or were reset)
    Accepted,
    /// Recognized key that would leave `[-steps, steps]`; counters unchanged
    Rejected,
    /// Not a motion key
    Ignored,
}

/// Signed speed-step counters for both axes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeleopState {
    pub linear: i32,
    pub angular: i32,
}

impl TeleopState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one key press with both counters bounded by `steps`
    ///
    /// Space zeroes both counters without a bounds check.
    pub fn apply(&mut self, key: Key, steps: u32) -> KeyOutcome {
        let (counter, delta) = match key {
            Key::Up => (&mut self.linear, 1),
            Key::Down => (&mut self.linear, -1),
            Key::Left => (&mut self.angular, 1),
            Key::Right => (&mut self.angular, -1),
            Key::Space => {
                *self = Self::default();
                return KeyOutcome::Accepted;
            }
            _ => return KeyOutcome::Ignored,
        };

        let bound = i64::from(steps);
        let next = i64::from(*counter) + delta;
        if next < -bound || next > bound {
            return KeyOutcome::Rejected;
        }
        // |next| <= steps <= i32::MAX
        *counter = next as i32;
        KeyOutcome::Accepted
    }
}

/// Keyboard teleop node
///
/// Each tick reads at most one key from the terminal. A motion key is
/// applied and published straight away; with no key pending the current
/// command is republished and the tick sleeps out the rest of its period.
pub struct KeyTeleopNode<I: TerminalInterface> {
    interface: I,
    state: TeleopState,
    curves: TurboCurves,
    steps: u32,
    rate: Rate,
    publisher: Hub<CmdVel>,
    topic: String,
    read_faults: FaultStreak,
    draw_faults: FaultStreak,
}

impl<I: TerminalInterface> KeyTeleopNode<I> {
    pub fn new(interface: I, config: &TeleopConfig) -> TeleopResult<Self> {
        config.validate()?;
        Ok(Self {
            interface,
            state: TeleopState::new(),
            curves: TurboCurves::new(config)?,
            steps: config.steps,
            rate: Rate::new(config.hz)?,
            publisher: Hub::new(&config.topic)?,
            topic: config.topic.clone(),
            read_faults: FaultStreak::default(),
            draw_faults: FaultStreak::default(),
        })
    }

    pub fn state(&self) -> TeleopState {
        self.state
    }

    pub fn interface(&self) -> &I {
        &self.interface
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Velocity command for the current counters
    pub fn command(&self) -> CmdVel {
        let (linear, angular) = self.curves.twist(self.state.linear, self.state.angular);
        CmdVel::new(linear, angular)
    }

    fn publish(&mut self, ctx: &mut NodeInfo) {
        match StatusLayout::render(&mut self.interface, self.state.linear, self.state.angular) {
            Ok(()) => {
                if let Some(streak) = self.draw_faults.recovered() {
                    ctx.log_info(&format!("Status drawing recovered after {} failures", streak));
                }
            }
            Err(e) => {
                if let Some(streak) = self.draw_faults.failed() {
                    ctx.log_warning(&format!("Failed to draw status ({} in a row): {}", streak, e));
                }
            }
        }
        let cmd = self.command();
        let _ = self.publisher.send(cmd, Some(ctx));
    }

    fn handle_key(&mut self, key: Key, ctx: &mut NodeInfo) {
        if key == Key::Interrupt {
            ctx.log_info("Interrupt key pressed, stopping");
            ctx.request_shutdown();
            return;
        }

        match self.state.apply(key, self.steps) {
            KeyOutcome::Accepted => self.publish(ctx),
            KeyOutcome::Rejected => {
                if let Err(e) = self.interface.beep() {
                    ctx.log_warning(&format!("Failed to beep: {}", e));
                }
                ctx.log_debug(&format!("{:?} rejected at {:?}", key, self.state));
                self.publish(ctx);
            }
            KeyOutcome::Ignored => {}
        }
    }
}

impl<I: TerminalInterface + 'static> Node for KeyTeleopNode<I> {
    fn name(&self) -> &'static str {
        "KeyTeleopNode"
    }

    fn init(&mut self, ctx: &mut NodeInfo) -> TeleopResult<()> {
        self.state = TeleopState::new();
        self.rate.reset();
        ctx.log_info(&format!(
            "Publishing on '{}' with {} steps at {:.1} Hz",
            self.topic,
            self.steps,
            1.0 / self.rate.period().as_secs_f64()
        ));
        Ok(())
    }

    fn tick(&mut self, ctx: &mut NodeInfo) {
        let key = match self.interface.read_key() {
            Ok(key) => {
                if let Some(streak) = self.read_faults.recovered() {
                    ctx.log_info(&format!("Key input recovered after {} failures", streak));
                }
                key
            }
            Err(e) => {
                if let Some(streak) = self.read_faults.failed() {
                    ctx.log_warning(&format!("Failed to read key ({} in a row): {}", streak, e));
                }
                None
            }
        };

        match key {
            Some(key) => self.handle_key(key, ctx),
            None => {
                self.publish(ctx);
                self.rate.sleep();
            }
        }
    }

    fn shutdown(&mut self, ctx: &mut NodeInfo) -> TeleopResult<()> {
        // leave the robot stopped; the counters stay as they were
        let _ = self.publisher.send(CmdVel::zero(), Some(&mut *ctx));
        ctx.log_info("Published final stop command");
        Ok(())
    }

    fn get_publishers(&self) -> Vec<TopicMetadata> {
        vec![TopicMetadata::of::<CmdVel>(&self.topic)]
    }
}
