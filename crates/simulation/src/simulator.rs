//! The tick-driven simulator.

use crate::stop_conditions::{ArgumentError, StopCondition, StopConditionRegistry};
use crate::trace::SimulationTrace;
use sensorgraph_graph::{NullRpcExecutor, RpcExecutor, SensorGraph};
use sensorgraph_types::{known, DataStream, DataStreamSelector, Reading};
use std::cell::RefCell;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Default simulated battery voltage in volts.
const DEFAULT_VOLTAGE: f64 = 3.6;

/// How often the battery voltage stream is produced, in ticks.
const BATTERY_INTERVAL: u32 = 10;

/// Drives a compiled [`SensorGraph`] with synthetic timed inputs.
///
/// One tick is one simulated second. A simulator can `run` multiple times;
/// the tick counter carries across runs while `run_time` stop conditions are
/// measured from each run's start.
pub struct SensorGraphSimulator {
    graph: SensorGraph,
    tick_count: u32,
    run_start: u32,
    voltage: f64,
    stop_conditions: Vec<StopCondition>,
    registry: StopConditionRegistry,
    rpc: Box<dyn RpcExecutor>,
    trace: Option<Rc<RefCell<SimulationTrace>>>,
}

impl SensorGraphSimulator {
    /// Wrap a compiled graph. Constant streams are seeded here so step-only
    /// sessions observe them without ever calling [`run`](Self::run).
    pub fn new(mut graph: SensorGraph) -> Self {
        graph.load_constants();
        Self {
            graph,
            tick_count: 0,
            run_start: 0,
            voltage: DEFAULT_VOLTAGE,
            stop_conditions: Vec::new(),
            registry: StopConditionRegistry::default(),
            rpc: Box::new(NullRpcExecutor),
            trace: None,
        }
    }

    pub fn graph(&self) -> &SensorGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut SensorGraph {
        &mut self.graph
    }

    /// The current absolute tick.
    pub fn tick(&self) -> u32 {
        self.tick_count
    }

    pub fn set_voltage(&mut self, volts: f64) {
        self.voltage = volts;
    }

    /// Swap the RPC executor, e.g. for one that forwards calls to a live
    /// device so logic runs on the host while physical RPCs execute on real
    /// hardware.
    pub fn set_rpc_executor(&mut self, rpc: Box<dyn RpcExecutor>) {
        self.rpc = rpc;
    }

    /// Parse and register a textual stop condition, e.g. `run_time 2 minutes`
    /// or `tick_count 500`.
    pub fn stop_condition(&mut self, text: &str) -> Result<(), ArgumentError> {
        let condition = self.registry.parse(text)?;
        self.stop_conditions.push(condition);
        Ok(())
    }

    pub fn add_stop_condition(&mut self, condition: StopCondition) {
        self.stop_conditions.push(condition);
    }

    /// Install log watchers accumulating matching readings into an ordered
    /// trace. With no explicit selectors the graph's streamer selectors are
    /// traced, which records exactly what the device would export.
    pub fn record_trace(&mut self, selectors: Option<Vec<DataStreamSelector>>) {
        let selectors = selectors.unwrap_or_else(|| {
            self.graph
                .streamers()
                .iter()
                .map(|streamer| streamer.selector)
                .collect()
        });

        let trace = Rc::new(RefCell::new(SimulationTrace {
            selectors: selectors.clone(),
            readings: Vec::new(),
        }));
        for selector in selectors {
            let sink = Rc::clone(&trace);
            self.graph.log_mut().watch(
                selector,
                Box::new(move |reading| sink.borrow_mut().readings.push(*reading)),
            );
        }
        self.trace = Some(trace);
    }

    /// A copy of the recorded trace; empty if tracing was never enabled.
    pub fn trace(&self) -> SimulationTrace {
        self.trace
            .as_ref()
            .map(|trace| trace.borrow().clone())
            .unwrap_or_default()
    }

    /// Inject one input at the current tick, without advancing the clock.
    /// Used for precise, manually sequenced test inputs.
    pub fn step(&mut self, stream: DataStream, value: u32) {
        let reading = Reading::new(stream, self.tick_count, value);
        self.graph.process_input(stream, reading, &mut *self.rpc);
    }

    /// Advance the clock until a stop condition reports true.
    ///
    /// Each iteration advances the tick by one and pushes the system tick,
    /// the user tick at the configured interval, and the battery voltage
    /// every ten ticks. In non-accelerated mode the loop sleeps so simulated
    /// time tracks wall-clock time at one tick per second; accelerated runs
    /// go as fast as possible.
    ///
    /// `include_reset` pushes a `system_reset` reading before the first tick
    /// of the run, mirroring a device power-on.
    pub fn run(&mut self, accelerated: bool, include_reset: bool) {
        if self.stop_conditions.is_empty() {
            warn!("no stop conditions registered, refusing to run forever");
            return;
        }

        self.run_start = self.tick_count;
        let user_interval = self.graph.user_tick();
        let started = Instant::now();
        info!(
            start_tick = self.run_start,
            user_interval, accelerated, "starting run"
        );

        if include_reset {
            self.step(known::SYSTEM_RESET, 0);
        }

        while !self.should_stop() {
            self.tick_count += 1;
            let tick = self.tick_count;

            self.step(known::SYSTEM_TICK, tick);
            if user_interval > 0 && tick % user_interval == 0 {
                self.step(known::USER_TICK, tick);
            }
            if tick % BATTERY_INTERVAL == 0 {
                self.step(known::BATTERY_VOLTAGE, encode_voltage(self.voltage));
            }

            if !accelerated {
                let target =
                    started + Duration::from_secs(u64::from(tick - self.run_start));
                let now = Instant::now();
                if target > now {
                    thread::sleep(target - now);
                }
            }
        }
        debug!(tick = self.tick_count, "run stopped");
    }

    fn should_stop(&self) -> bool {
        self.stop_conditions
            .iter()
            .any(|condition| condition.should_stop(self.tick_count, self.run_start))
    }
}

/// Battery voltage in 16.16 fixed point, as the firmware reports it.
fn encode_voltage(volts: f64) -> u32 {
    (volts * 65536.0) as u32
}
