use std::collections::VecDeque;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::decoder::Decoded;
use crate::exec;
use crate::hardware::Device;
use crate::instructions::{class, folded_value, is_conditional};
use crate::memory::Memory;
use crate::operand::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuConfig {
    /// Pending interrupts beyond this many are dropped.
    pub interrupt_queue: usize,
    /// Attach the generic clock as device 0.
    pub clock: bool,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            interrupt_queue: 256,
            clock: true,
        }
    }
}

bitflags! {
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags: u8 {
const SKIP = 1 << 0; // Next instruction is fetched but not executed
const QUEUEING = 1 << 1; // Interrupts are queued, not dispatched
}
}

/// A storage cell an operand resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loc {
    Ram(u16),
    Reg(u8),
    Sp,
    Pc,
    Ex,
    /// Immediate value. Writes land in the literal sink and are lost.
    Literal(u16),
}

/// What a single `step` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Step {
    Executed,
    Skipped,
    /// A `BRK` executed. The machine keeps running if stepped again.
    Break,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cpu {
    pub ram: Memory,
    pub reg: [u16; 8], // A B C X Y Z I J
    pub sp: u16,
    pub pc: u16,
    pub ex: u16,
    pub ia: u16,
    pub flags: Flags,
    pub cycle: u64,
    sink: u16,
    interrupts: VecDeque<u16>,
    cfg: CpuConfig,
}

impl Cpu {
    pub fn new(cfg: CpuConfig) -> Self {
        Self {
            ram: Memory::new(),
            reg: [0; 8],
            sp: 0,
            pc: 0,
            ex: 0,
            ia: 0,
            flags: Flags::empty(),
            cycle: 0,
            sink: 0,
            interrupts: VecDeque::with_capacity(cfg.interrupt_queue),
            cfg,
        }
    }

    pub fn reset(&mut self) {
        self.ram.clear();
        self.reg = [0; 8];
        self.sp = 0;
        self.pc = 0;
        self.ex = 0;
        self.ia = 0;
        self.flags = Flags::empty();
        self.cycle = 0;
        self.sink = 0;
        self.interrupts.clear();
    }

    pub fn config(&self) -> &CpuConfig {
        &self.cfg
    }

    pub fn skipping(&self) -> bool {
        self.flags.contains(Flags::SKIP)
    }

    pub fn pending_interrupts(&self) -> usize {
        self.interrupts.len()
    }

    pub fn read(&self, loc: Loc) -> u16 {
        match loc {
            Loc::Ram(a) => self.ram.read(a),
            Loc::Reg(r) => self.reg[r as usize],
            Loc::Sp => self.sp,
            Loc::Pc => self.pc,
            Loc::Ex => self.ex,
            Loc::Literal(v) => v,
        }
    }

    pub fn write(&mut self, loc: Loc, val: u16) {
        match loc {
            Loc::Ram(a) => self.ram.write(a, val),
            Loc::Reg(r) => self.reg[r as usize] = val,
            Loc::Sp => self.sp = val,
            Loc::Pc => self.pc = val,
            Loc::Ex => self.ex = val,
            Loc::Literal(_) => self.sink = val,
        }
    }

    pub fn push(&mut self, val: u16) {
        self.sp = self.sp.wrapping_sub(1);
        self.ram.write(self.sp, val);
    }

    pub fn pop(&mut self) -> u16 {
        let val = self.ram.read(self.sp);
        self.sp = self.sp.wrapping_add(1);
        val
    }

    /// Queues an interrupt message. Messages past the queue capacity are dropped.
    pub fn interrupt(&mut self, message: u16) {
        if self.interrupts.len() >= self.cfg.interrupt_queue {
            tracing::warn!(message, "interrupt queue full, message dropped");
            return;
        }
        self.interrupts.push_back(message);
    }

    fn next_word(&mut self) -> u16 {
        let word = self.ram.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        if !self.skipping() {
            self.cycle += 1;
        }
        word
    }

    /// Resolves an operand class to a location, consuming its trailing word.
    /// While skipping, trailing words cost nothing and SP does not move.
    fn resolve(&mut self, code: u8, role: Role) -> Loc {
        let skipping = self.skipping();
        match code {
            0x00..=0x07 => Loc::Reg(code),
            0x08..=0x0f => Loc::Ram(self.reg[(code - class::AT_REG) as usize]),
            0x10..=0x17 => {
                let base = self.reg[(code - class::AT_REG_WORD) as usize];
                Loc::Ram(base.wrapping_add(self.next_word()))
            }
            class::STACK => match role {
                Role::Src => {
                    let addr = self.sp;
                    if !skipping {
                        self.sp = self.sp.wrapping_add(1);
                    }
                    Loc::Ram(addr)
                }
                Role::Dst => {
                    if !skipping {
                        self.sp = self.sp.wrapping_sub(1);
                    }
                    Loc::Ram(self.sp)
                }
            },
            class::PEEK => Loc::Ram(self.sp),
            class::PICK => Loc::Ram(self.sp.wrapping_add(self.next_word())),
            class::SP => Loc::Sp,
            class::PC => Loc::Pc,
            class::EX => Loc::Ex,
            class::AT_WORD => Loc::Ram(self.next_word()),
            class::WORD => Loc::Literal(self.next_word()),
            c => Loc::Literal(folded_value(c).unwrap_or(0)),
        }
    }

    /// Fetches, decodes and executes one instruction, then lets devices run
    /// and dispatches a queued interrupt if no skip is pending.
    pub fn step(&mut self, devices: &mut [Box<dyn Device>]) -> Step {
        let at = self.pc;
        let word = self.ram.read(at);
        self.pc = at.wrapping_add(1);
        let d = Decoded::decode(word);

        let outcome = if !d.is_special() {
            let src = self.resolve(d.src, Role::Src);
            let value = self.read(src);
            let dst = self.resolve(d.dst, Role::Dst);
            if self.skipping() {
                self.skip_over(is_conditional(d.op))
            } else {
                tracing::trace!(pc = at, op = d.op, ?dst, value, "basic");
                let cycles = exec::basic(self, d.op, dst, value);
                self.cycle += cycles;
                Step::Executed
            }
        } else {
            let a = self.resolve(d.src, Role::Src);
            if self.skipping() {
                self.skip_over(false)
            } else {
                tracing::trace!(pc = at, op = d.dst, ?a, "special");
                let cycles = exec::special(self, devices, d.dst, a);
                self.cycle += cycles;
                if d.dst == exec::BRK {
                    tracing::debug!(pc = at, "break");
                    Step::Break
                } else {
                    Step::Executed
                }
            }
        };

        for dev in devices.iter_mut() {
            dev.tick(self);
        }
        if !self.flags.intersects(Flags::SKIP | Flags::QUEUEING) {
            self.dispatch_interrupt();
        }
        outcome
    }

    /// A skipped conditional costs one cycle and keeps the skip armed for
    /// the instruction after it.
    fn skip_over(&mut self, conditional: bool) -> Step {
        if conditional {
            self.cycle += 1;
        } else {
            self.flags.remove(Flags::SKIP);
        }
        Step::Skipped
    }

    fn dispatch_interrupt(&mut self) {
        let Some(message) = self.interrupts.pop_front() else { return };
        if self.ia == 0 {
            tracing::debug!(message, "interrupt discarded, IA is zero");
            return;
        }
        tracing::debug!(message, ia = self.ia, "interrupt dispatched");
        self.flags.insert(Flags::QUEUEING);
        self.push(self.pc);
        self.push(self.reg[0]);
        self.pc = self.ia;
        self.reg[0] = message;
    }
}
