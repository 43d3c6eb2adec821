//! Pipeline stages and supporting structures: fetch, decode, rename,
//! dispatch, reservation stations, functional units, the ROB, the
//! checkpoint stack, and the engine that sequences them each tick.

/// Per-branch snapshots of speculative rename state, used by recovery.
pub mod checkpoint;
/// Instruction decode: raw word -> [`decode::DecodePacket`].
pub mod decode;
/// The cycle-driving engine: sequences all stages per the mandated
/// evaluation order and owns every piece of pipeline state.
pub mod engine;
/// Fetch: PC management and the instruction-memory request/response
/// state machine.
pub mod fetch;
/// Free list: the pool of physical registers not currently mapped.
pub mod free_list;
/// Functional units: ALU, BRU, and LSU execution.
pub mod functional_units;
/// Map table (register alias table).
pub mod rat;
/// Rename: the renamed instruction packet produced for dispatch.
pub mod rename;
/// Reservation stations: per-functional-unit queues of waiting instructions.
pub mod reservation_station;
/// Reorder buffer: the in-order retirement queue.
pub mod rob;
/// ROB tag allocator.
pub mod tag_allocator;
