//! The parsed statement tree.
//!
//! Statements are purely syntactic: nesting the graph cannot express (for
//! example an `every` block inside an `on` block) still parses and is
//! rejected by the compiler.

use sensorgraph_types::{
    Combiner, CompareOp, ConfigType, DataStream, DataStreamSelector, SlotIdentifier,
};

/// One source statement, possibly with a nested body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `every <n> <unit> { <body> }`, normalized to seconds.
    Every {
        interval_seconds: u32,
        body: Vec<Statement>,
    },

    /// `when connected to <slot> { <body> }`.
    WhenConnected {
        slot: SlotIdentifier,
        body: Vec<Statement>,
    },

    /// `on <trigger> { <body> }`.
    OnTrigger {
        trigger: TriggerSpec,
        body: Vec<Statement>,
    },

    /// `on connect { <body> }` inside a `when` block.
    OnConnect { body: Vec<Statement> },

    /// `on disconnect { <body> }` inside a `when` block.
    OnDisconnect { body: Vec<Statement> },

    /// `copy [<stream>|<literal>] => <stream>;`
    Copy {
        source: CopySource,
        dest: DataStream,
    },

    /// `count => <stream>;` — running count of the triggering input.
    Count { dest: DataStream },

    /// `average => <stream>;` — average of the triggering input's pending
    /// readings.
    Average { dest: DataStream },

    /// `call <rpc> on <slot> => <stream>;`
    Call {
        rpc_id: u16,
        slot: SlotIdentifier,
        dest: DataStream,
    },

    /// `config <slot> <key> = <type> <value>;`
    Config {
        slot: SlotIdentifier,
        key: u16,
        ty: ConfigType,
        value: u32,
    },

    /// `streamer <selector> => <slot> [with_other <n>];`
    Streamer {
        selector: DataStreamSelector,
        dest: SlotIdentifier,
        with_other: Option<u8>,
    },
}

/// Where a `copy` statement takes its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopySource {
    /// `copy => X` — the reading that triggered the enclosing block.
    Implicit,
    /// `copy <stream> => X` — the latest reading on a named stream.
    Stream(DataStream),
    /// `copy <literal> => X` — a literal, resolved through a constant stream.
    Literal(u32),
}

/// The condition of an `on` block, before lowering to binary nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerSpec {
    /// Bare stream: fires on every update.
    Stream(DataStream),
    /// `count(<stream>) <op> <n>`: pending-count comparison.
    Count {
        stream: DataStream,
        op: CompareOp,
        value: u32,
    },
    /// `value(<stream>) <op> <n>`: latest-value comparison.
    Value {
        stream: DataStream,
        op: CompareOp,
        value: u32,
    },
    /// Two triggers joined with `and` / `or`. Chains associate to the right.
    Combined {
        left: Box<TriggerSpec>,
        combiner: Combiner,
        right: Box<TriggerSpec>,
    },
}
