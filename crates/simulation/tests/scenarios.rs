//! Behavioral scenarios: source text compiled and driven through the
//! simulator.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sensorgraph_compiler::compile;
use sensorgraph_graph::{RpcError, RpcExecutor};
use sensorgraph_lang::parse;
use sensorgraph_simulation::SensorGraphSimulator;
use sensorgraph_types::{known, DataStream, DataStreamSelector, DeviceModel, SlotIdentifier, StreamKind};

fn simulator(source: &str) -> SensorGraphSimulator {
    let graph = compile(&parse(source).unwrap(), &DeviceModel::default()).unwrap();
    SensorGraphSimulator::new(graph)
}

fn stream(text: &str) -> DataStream {
    text.parse().unwrap()
}

#[test]
fn every_minute_block_fires_twice_in_two_minutes() {
    let mut sim = simulator("every 1 minute {\n    count => counter 1;\n    count => counter 2;\n}");
    sim.record_trace(Some(vec![DataStreamSelector::all(StreamKind::Counter)]));
    sim.stop_condition("run_time 2 minutes").unwrap();
    sim.run(true, false);

    let trace = sim.trace();
    for counter in ["counter 1", "counter 2"] {
        let readings: Vec<_> = trace
            .readings
            .iter()
            .filter(|r| r.stream == stream(counter))
            .collect();
        assert_eq!(readings.len(), 2, "{counter}");
        assert_eq!(readings[0].timestamp, 60);
        assert_eq!(readings[1].timestamp, 120);
        // Sixty ticks accumulate between firings.
        assert!(readings.iter().all(|r| r.value == 60));
    }
}

#[test]
fn when_block_counts_user_ticks_while_connected() {
    let mut sim = simulator("when connected to slot 1 {\n    copy => unbuffered 16;\n}");
    sim.record_trace(Some(vec![DataStreamSelector::exact(stream("unbuffered 16"))]));

    // One priming connect, then a minute of ticks.
    sim.step(known::SYSTEM_CONNECT, 1);
    sim.stop_condition("run_time 60 seconds").unwrap();
    sim.run(true, false);
    assert_eq!(sim.trace().len(), 60);

    // After a disconnect the block goes silent.
    sim.step(known::SYSTEM_DISCONNECT, 1);
    sim.run(true, false);
    assert_eq!(sim.tick(), 120);
    assert_eq!(sim.trace().len(), 60);
}

#[test]
fn value_trigger_fires_only_on_matching_inputs() {
    let mut sim = simulator("on value(input 1) == 5 {\n    copy => output 1;\n}");
    sim.record_trace(Some(vec![DataStreamSelector::exact(stream("output 1"))]));

    for value in [5, 3, 5, 7, 5, 0, 5, 1, 5, 2] {
        sim.step(stream("input 1"), value);
    }

    assert_eq!(sim.trace().len(), 5);
    assert!(sim.trace().values().iter().all(|&v| v == 5));
}

#[test]
fn range_trigger_on_one_stream_fires_once_per_reading() {
    let mut sim =
        simulator("on value(input 1) > 2 and value(input 1) < 10 {\n    copy => output 1;\n}");
    sim.record_trace(Some(vec![DataStreamSelector::exact(stream("output 1"))]));

    sim.step(stream("input 1"), 5);
    assert_eq!(sim.trace().values(), vec![5]);

    sim.step(stream("input 1"), 11);
    assert_eq!(sim.trace().len(), 1);

    sim.step(stream("input 1"), 3);
    assert_eq!(sim.trace().values(), vec![5, 3]);
}

#[test]
fn or_trigger_fires_on_either_side_and_restarts_the_count() {
    let mut sim =
        simulator("on count(counter 1) >= 2 or value(input 1) == 5 {\n    copy => output 1;\n}");
    sim.record_trace(Some(vec![DataStreamSelector::exact(stream("output 1"))]));

    // The count side alone reaches its threshold.
    sim.step(stream("counter 1"), 1);
    assert_eq!(sim.trace().len(), 0);
    sim.step(stream("counter 1"), 2);
    assert_eq!(sim.trace().values(), vec![2]);

    // The value side alone fires with zero pending counter readings.
    sim.step(stream("input 1"), 5);
    assert_eq!(sim.trace().values(), vec![2, 2]);

    // A counter reading arriving while the value still matches fires and is
    // consumed, so after the value drops the threshold must be met afresh.
    sim.step(stream("counter 1"), 3);
    assert_eq!(sim.trace().values(), vec![2, 2, 3]);
    sim.step(stream("input 1"), 4);
    sim.step(stream("counter 1"), 4);
    assert_eq!(sim.trace().len(), 3);
    sim.step(stream("counter 1"), 5);
    assert_eq!(sim.trace().values(), vec![2, 2, 3, 5]);
}

#[test]
fn battery_voltage_is_produced_every_ten_ticks() {
    let mut sim = simulator("on system input 5 {\n    copy => output 1;\n}");
    sim.record_trace(Some(vec![DataStreamSelector::exact(stream("output 1"))]));
    sim.stop_condition("run_time 20").unwrap();
    sim.run(true, false);

    let trace = sim.trace();
    assert_eq!(trace.len(), 2);
    // 3.6 V in 16.16 fixed point.
    assert!(trace.values().iter().all(|&v| v == 235929));
    assert_eq!(trace.readings[0].timestamp, 10);
    assert_eq!(trace.readings[1].timestamp, 20);
}

#[test]
fn literal_copies_flow_from_constant_streams() {
    let mut sim = simulator("every 10 seconds {\n    copy 60 => output 2;\n}");
    sim.record_trace(Some(vec![DataStreamSelector::exact(stream("output 2"))]));
    sim.stop_condition("run_time 30").unwrap();
    sim.run(true, false);

    assert_eq!(sim.trace().values(), vec![60, 60, 60]);
}

#[test]
fn literal_copies_are_seeded_before_any_stepping() {
    let mut sim = simulator("on input 1 {\n    copy 7 => output 1;\n}");
    sim.record_trace(Some(vec![DataStreamSelector::exact(stream("output 1"))]));

    // No run() in between; the constant must already be in the log.
    sim.step(stream("input 1"), 0);
    assert_eq!(sim.trace().values(), vec![7]);
}

#[test]
fn reset_reading_precedes_the_first_tick() {
    let mut sim = simulator("on system input 1024 {\n    copy 1 => unbuffered 1;\n}");
    sim.record_trace(Some(vec![DataStreamSelector::exact(stream("unbuffered 1"))]));
    sim.stop_condition("tick_count 5").unwrap();
    sim.run(true, true);

    let trace = sim.trace();
    assert_eq!(trace.len(), 1);
    assert_eq!(trace.readings[0].timestamp, 0);
    assert_eq!(sim.tick(), 5);
}

#[test]
fn step_does_not_advance_the_clock() {
    let mut sim = simulator("on input 1 {\n    copy => output 1;\n}");
    sim.step(stream("input 1"), 1);
    sim.step(stream("input 1"), 2);
    assert_eq!(sim.tick(), 0);
}

#[test]
fn unparseable_stop_conditions_are_argument_errors() {
    let mut sim = simulator("every 1 second {\n    count => counter 1;\n}");
    let err = sim.stop_condition("voltage below 3.0").unwrap_err();
    assert_eq!(err.text, "voltage below 3.0");
}

/// Answers every RPC with the same little-endian u32.
struct FixedRpc(u32);

impl RpcExecutor for FixedRpc {
    fn call(
        &mut self,
        _address: SlotIdentifier,
        _rpc_id: u16,
        _payload: &[u8],
    ) -> Result<Vec<u8>, RpcError> {
        Ok(self.0.to_le_bytes().to_vec())
    }
}

#[test]
fn rpc_responses_flow_into_the_destination_stream() {
    let mut sim = simulator("every 10 seconds {\n    call 0x8000 on slot 1 => unbuffered 2;\n}");
    sim.set_rpc_executor(Box::new(FixedRpc(777)));
    sim.record_trace(Some(vec![DataStreamSelector::exact(stream("unbuffered 2"))]));
    sim.stop_condition("run_time 20").unwrap();
    sim.run(true, false);

    assert_eq!(sim.trace().values(), vec![777, 777]);
}

#[test]
fn random_acyclic_chains_always_terminate() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    for _ in 0..5 {
        let streams = rng.gen_range(4..8);
        let mut source = String::new();
        // Every stream's parent has a smaller id, so the graph is acyclic
        // and everything descends from stream 0.
        for child in 1..streams {
            let parent = rng.gen_range(0..child);
            source.push_str(&format!(
                "on unbuffered {parent} {{ copy => unbuffered {child}; }}\n"
            ));
        }

        let mut sim = simulator(&source);
        for value in 0..10 {
            sim.step(stream("unbuffered 0"), value);
        }

        let leaf = stream(&format!("unbuffered {}", streams - 1));
        assert_eq!(sim.graph().log().inspect_last(leaf).unwrap().value, 9);
    }
}
