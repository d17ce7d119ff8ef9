//! Statement lowering.
//!
//! Each statement lowers independently into zero or more nodes. Block
//! statements establish a *gate*: the trigger inputs every node generated
//! from their body shares. Multi-input trigger chains are right-folded into
//! binary nodes linked through synthetic internal streams, so every emitted
//! node has at most two inputs.

use crate::CompileError;
use sensorgraph_graph::{Combiner, DataStreamer, GraphNode, InputTrigger, NodeFunc, NodeInput};
use sensorgraph_lang::{CopySource, Statement, TriggerSpec};
use sensorgraph_log::SensorLog;
use sensorgraph_types::{
    known, CompareOp, ConfigType, DataStream, DataStreamSelector, DeviceModel, SlotIdentifier,
    StreamKind,
};
use std::collections::BTreeMap;
use tracing::debug;

/// First id used for compiler-allocated streams: latches, constants, and
/// chain intermediates. Everything at or above this id is internal.
const INTERNAL_STREAM_BASE: u16 = 0xF000;

/// The shared trigger inputs of one block's body.
#[derive(Debug, Clone, Copy)]
struct Gate {
    a: (DataStream, InputTrigger),
    b: Option<((DataStream, InputTrigger), Combiner)>,
}

impl Gate {
    fn single(stream: DataStream, trigger: InputTrigger) -> Self {
        Self {
            a: (stream, trigger),
            b: None,
        }
    }
}

pub(crate) struct Lowerer<'a> {
    model: &'a DeviceModel,
    pub(crate) log: SensorLog,
    pub(crate) nodes: Vec<GraphNode>,
    pub(crate) streamers: Vec<DataStreamer>,
    pub(crate) config: BTreeMap<(SlotIdentifier, u16), (ConfigType, u32)>,
    pub(crate) constants: Vec<(DataStream, u32)>,
    next_internal: u16,
}

impl<'a> Lowerer<'a> {
    pub(crate) fn new(model: &'a DeviceModel) -> Self {
        Self {
            model,
            log: SensorLog::new(),
            nodes: Vec::new(),
            streamers: Vec::new(),
            config: BTreeMap::new(),
            constants: Vec::new(),
            next_internal: INTERNAL_STREAM_BASE,
        }
    }

    pub(crate) fn lower_top(&mut self, statement: &Statement) -> Result<(), CompileError> {
        match statement {
            Statement::Every {
                interval_seconds,
                body,
            } => {
                let gate = Gate::single(
                    known::SYSTEM_TICK,
                    InputTrigger::Count(CompareOp::Ge, *interval_seconds),
                );
                self.lower_body(gate, body)
            }
            Statement::WhenConnected { slot, body } => self.lower_when(*slot, body),
            Statement::OnTrigger { trigger, body } => {
                let gate = self.lower_trigger(trigger)?;
                self.lower_body(gate, body)
            }
            Statement::OnConnect { .. } => Err(CompileError::InvalidContext {
                statement: "on connect",
            }),
            Statement::OnDisconnect { .. } => Err(CompileError::InvalidContext {
                statement: "on disconnect",
            }),
            Statement::Copy { source, dest } => match source {
                // `copy S => X` at top level means "on every update of S".
                CopySource::Stream(stream) => {
                    self.validate_source(*stream)?;
                    let gate = Gate::single(*stream, InputTrigger::Always);
                    self.emit_node(gate, None, NodeFunc::CopyLatestA, *dest)
                }
                CopySource::Implicit | CopySource::Literal(_) => {
                    Err(CompileError::NoTriggerContext { statement: "copy" })
                }
            },
            Statement::Count { .. } => Err(CompileError::NoTriggerContext { statement: "count" }),
            Statement::Average { .. } => Err(CompileError::NoTriggerContext {
                statement: "average",
            }),
            Statement::Call { .. } => Err(CompileError::NoTriggerContext { statement: "call" }),
            Statement::Config {
                slot,
                key,
                ty,
                value,
            } => self.lower_config(*slot, *key, *ty, *value),
            Statement::Streamer {
                selector,
                dest,
                with_other,
            } => self.lower_streamer(*selector, *dest, *with_other),
        }
    }

    /// Lower the body of an `every` or `on` block: every statement becomes
    /// one node sharing the block's gate.
    fn lower_body(&mut self, gate: Gate, body: &[Statement]) -> Result<(), CompileError> {
        for statement in body {
            self.lower_body_statement(gate, statement)?;
        }
        Ok(())
    }

    fn lower_body_statement(
        &mut self,
        gate: Gate,
        statement: &Statement,
    ) -> Result<(), CompileError> {
        match statement {
            Statement::Copy { source, dest } => match source {
                CopySource::Implicit => self.emit_node(gate, None, NodeFunc::CopyLatestA, *dest),
                CopySource::Stream(stream) => {
                    self.validate_source(*stream)?;
                    self.emit_node(gate, Some(*stream), NodeFunc::CopyLatestB, *dest)
                }
                CopySource::Literal(value) => {
                    let constant = self.alloc_internal(StreamKind::Constant)?;
                    self.constants.push((constant, *value));
                    self.emit_node(gate, Some(constant), NodeFunc::CopyLatestB, *dest)
                }
            },
            Statement::Count { dest } => self.emit_node(gate, None, NodeFunc::CountA, *dest),
            Statement::Average { dest } => self.emit_node(gate, None, NodeFunc::AverageA, *dest),
            Statement::Call { rpc_id, slot, dest } => {
                self.validate_slot(*slot)?;
                self.emit_node(
                    gate,
                    None,
                    NodeFunc::CallRpc {
                        slot: *slot,
                        rpc_id: *rpc_id,
                    },
                    *dest,
                )
            }
            Statement::Config { .. } | Statement::Streamer { .. } => {
                // Declarations are global; allowing them inside a block would
                // suggest a scoping that does not exist.
                Err(CompileError::InvalidContext {
                    statement: "declaration",
                })
            }
            Statement::Every { .. } => Err(CompileError::InvalidContext { statement: "every" }),
            Statement::WhenConnected { .. } => {
                Err(CompileError::InvalidContext { statement: "when" })
            }
            Statement::OnTrigger { .. } => Err(CompileError::InvalidContext { statement: "on" }),
            Statement::OnConnect { .. } => Err(CompileError::InvalidContext {
                statement: "on connect",
            }),
            Statement::OnDisconnect { .. } => Err(CompileError::InvalidContext {
                statement: "on disconnect",
            }),
        }
    }

    /// `when connected to <slot>` lowers to a connection latch: an internal
    /// unbuffered stream written 1 on connect and 0 on disconnect. Body
    /// statements gate on `count(user_tick) >= 1 AND value(latch) == 1`,
    /// which makes the block tick-driven while connected and silent while
    /// not. The compiler also configures a user-tick interval of one second
    /// so the gating clock actually runs.
    fn lower_when(
        &mut self,
        slot: SlotIdentifier,
        body: &[Statement],
    ) -> Result<(), CompileError> {
        self.validate_slot(slot)?;
        let latch = self.alloc_internal(StreamKind::Unbuffered)?;
        debug!(%slot, latch = %latch, "lowering connection latch");

        let on_connect = Gate::single(known::SYSTEM_CONNECT, InputTrigger::Always);
        self.emit_node(on_connect, None, NodeFunc::Constant(1), latch)?;
        let on_disconnect = Gate::single(known::SYSTEM_DISCONNECT, InputTrigger::Always);
        self.emit_node(on_disconnect, None, NodeFunc::Constant(0), latch)?;

        self.config.insert(
            (SlotIdentifier::Controller, known::CONFIG_USER_TICK),
            (ConfigType::U32, 1),
        );

        let gate = Gate {
            a: (known::USER_TICK, InputTrigger::Count(CompareOp::Ge, 1)),
            b: Some(((latch, InputTrigger::Value(CompareOp::Eq, 1)), Combiner::And)),
        };

        for statement in body {
            match statement {
                Statement::OnConnect { body } => self.lower_body(on_connect, body)?,
                Statement::OnDisconnect { body } => self.lower_body(on_disconnect, body)?,
                other => self.lower_body_statement(gate, other)?,
            }
        }
        Ok(())
    }

    /// Fold a trigger chain into a gate. The chain is right-associative:
    /// `x and y and z` pairs as `x and (y and z)`; the nested side is lowered
    /// into its own chain node whose output, an internal stream, becomes the
    /// outer gate's second input.
    fn lower_trigger(&mut self, spec: &TriggerSpec) -> Result<Gate, CompileError> {
        match spec {
            TriggerSpec::Combined {
                left,
                combiner,
                right,
            } => {
                let a = self.trigger_operand(left)?;
                let b = self.trigger_operand(right)?;
                Ok(Gate {
                    a,
                    b: Some((b, *combiner)),
                })
            }
            primary => {
                let (stream, trigger) = self.primary_operand(primary)?;
                Ok(Gate::single(stream, trigger))
            }
        }
    }

    /// One side of a combined trigger. A nested chain becomes a chain node
    /// copying its triggering value onto an internal stream, watched with an
    /// always trigger.
    fn trigger_operand(
        &mut self,
        spec: &TriggerSpec,
    ) -> Result<(DataStream, InputTrigger), CompileError> {
        match spec {
            TriggerSpec::Combined { .. } => {
                let inner = self.lower_trigger(spec)?;
                let intermediate = self.alloc_internal(StreamKind::Unbuffered)?;
                self.emit_node(inner, None, NodeFunc::CopyLatestA, intermediate)?;
                Ok((intermediate, InputTrigger::Always))
            }
            primary => self.primary_operand(primary),
        }
    }

    fn primary_operand(
        &mut self,
        spec: &TriggerSpec,
    ) -> Result<(DataStream, InputTrigger), CompileError> {
        let (stream, trigger) = match spec {
            TriggerSpec::Stream(stream) => (*stream, InputTrigger::Always),
            TriggerSpec::Count { stream, op, value } => {
                (*stream, InputTrigger::Count(*op, *value))
            }
            TriggerSpec::Value { stream, op, value } => {
                (*stream, InputTrigger::Value(*op, *value))
            }
            TriggerSpec::Combined { .. } => unreachable!("handled by trigger_operand"),
        };
        self.validate_source(stream)?;
        Ok((stream, trigger))
    }

    fn lower_config(
        &mut self,
        slot: SlotIdentifier,
        key: u16,
        ty: ConfigType,
        value: u32,
    ) -> Result<(), CompileError> {
        self.validate_slot(slot)?;
        if let Some(expected) = self.model.config_type(key) {
            if expected != ty {
                return Err(CompileError::ConfigTypeMismatch {
                    slot,
                    key,
                    expected,
                    found: ty,
                });
            }
        }
        self.config.insert((slot, key), (ty, value));
        Ok(())
    }

    fn lower_streamer(
        &mut self,
        selector: DataStreamSelector,
        dest: SlotIdentifier,
        with_other: Option<u8>,
    ) -> Result<(), CompileError> {
        if self.streamers.len() == self.model.max_streamers {
            return Err(CompileError::TooManyStreamers {
                limit: self.model.max_streamers,
            });
        }
        if let DataStreamSelector::Exact(stream) = selector {
            self.validate_source(stream)?;
        }
        self.validate_slot(dest)?;
        self.streamers.push(DataStreamer {
            selector,
            dest,
            with_other,
        });
        Ok(())
    }

    /// Emit one node. When the gate already uses both inputs and the
    /// statement needs a data operand, the gate is first funneled through a
    /// chain node so the data operand gets the freed second input.
    fn emit_node(
        &mut self,
        gate: Gate,
        data: Option<DataStream>,
        func: NodeFunc,
        output: DataStream,
    ) -> Result<(), CompileError> {
        self.validate_dest(output)?;

        let (gate, data) = match (gate.b, data) {
            (Some(_), Some(data)) => {
                let intermediate = self.alloc_internal(StreamKind::Unbuffered)?;
                self.push_node(gate, None, NodeFunc::CopyLatestA, intermediate)?;
                (
                    Gate::single(intermediate, InputTrigger::Always),
                    Some(data),
                )
            }
            (_, data) => (gate, data),
        };

        self.push_node(gate, data, func, output)
    }

    fn push_node(
        &mut self,
        gate: Gate,
        data: Option<DataStream>,
        func: NodeFunc,
        output: DataStream,
    ) -> Result<(), CompileError> {
        if self.nodes.len() == self.model.max_nodes {
            return Err(CompileError::TooManyNodes {
                limit: self.model.max_nodes,
            });
        }

        let a = self.node_input(gate.a.0, Some(gate.a.1));
        let (b, combiner) = match (gate.b, data) {
            (Some(((stream, trigger), combiner)), None) => {
                (Some(self.node_input(stream, Some(trigger))), combiner)
            }
            (None, Some(data)) => (Some(self.node_input(data, None)), Combiner::And),
            (None, None) => (None, Combiner::And),
            (Some(_), Some(_)) => unreachable!("emit_node frees the second input first"),
        };

        self.nodes.push(GraphNode {
            a,
            b,
            combiner,
            func,
            output,
        });
        Ok(())
    }

    fn node_input(&mut self, stream: DataStream, trigger: Option<InputTrigger>) -> NodeInput {
        NodeInput {
            stream,
            trigger,
            walker: self.log.create_walker(DataStreamSelector::exact(stream)),
        }
    }

    fn alloc_internal(&mut self, kind: StreamKind) -> Result<DataStream, CompileError> {
        let id = self.next_internal;
        self.next_internal = self
            .next_internal
            .checked_add(1)
            .ok_or(CompileError::InternalStreamExhausted)?;
        Ok(DataStream::new(kind, id))
    }

    /// A stream a source file reads from: must exist within the device's
    /// user range (internal compiler streams are above it, system streams
    /// are exempt).
    fn validate_source(&self, stream: DataStream) -> Result<(), CompileError> {
        if stream.id >= INTERNAL_STREAM_BASE || !self.model.validate_stream(&stream) {
            return Err(CompileError::InvalidStream { stream });
        }
        Ok(())
    }

    /// A stream a node writes to: must be user-range and of a kind the
    /// engine can produce readings on.
    fn validate_dest(&self, stream: DataStream) -> Result<(), CompileError> {
        let writable = matches!(
            stream.kind,
            StreamKind::Output | StreamKind::Counter | StreamKind::Buffered | StreamKind::Unbuffered
        );
        // Internal destinations (latches, chain intermediates) are allocated
        // by the compiler itself and bypass the user-range check.
        if stream.id >= INTERNAL_STREAM_BASE {
            return Ok(());
        }
        if !writable {
            return Err(CompileError::InvalidDestination { stream });
        }
        if !self.model.validate_stream(&stream) {
            return Err(CompileError::InvalidStream { stream });
        }
        Ok(())
    }

    fn validate_slot(&self, slot: SlotIdentifier) -> Result<(), CompileError> {
        if self.model.validate_slot(&slot) {
            Ok(())
        } else {
            Err(CompileError::UnknownSlot { slot })
        }
    }
}
