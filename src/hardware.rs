//! Attached hardware, reached through HWN/HWQ/HWI.

use crate::cpu::Cpu;

/// Nominal clock rate used to convert device timing into cycles.
pub const CPU_HZ: u64 = 100_000;

pub trait Device: Send {
    fn id(&self) -> u32;
    fn version(&self) -> u16;
    fn manufacturer(&self) -> u32;
    /// Handles HWI. Returns cycles charged on top of the instruction.
    fn interrupt(&mut self, cpu: &mut Cpu) -> u64;
    /// Called after every step.
    fn tick(&mut self, _cpu: &mut Cpu) {}
    fn reset(&mut self) {}
}

/// Generic clock: ticks `60 / B` times a second once started with A=0.
#[derive(Debug, Clone, Default)]
pub struct Clock {
    rate: u16,
    next: u64,
    ticks: u16,
    message: u16,
}

impl Clock {
    pub const ID: u32 = 0x12d0_b402;
    pub const MANUFACTURER: u32 = 0x1c6c_8b36;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticks(&self) -> u16 {
        self.ticks
    }

    fn next_tick(&self, cycle: u64) -> u64 {
        cycle + CPU_HZ * self.rate as u64 / 60
    }
}

impl Device for Clock {
    fn id(&self) -> u32 {
        Self::ID
    }

    fn version(&self) -> u16 {
        1
    }

    fn manufacturer(&self) -> u32 {
        Self::MANUFACTURER
    }

    fn interrupt(&mut self, cpu: &mut Cpu) -> u64 {
        match cpu.reg[0] {
            0 => {
                self.rate = cpu.reg[1];
                self.ticks = 0;
                self.next = if self.rate != 0 { self.next_tick(cpu.cycle) } else { 0 };
            }
            1 => cpu.reg[2] = self.ticks,
            2 => self.message = cpu.reg[1],
            _ => {}
        }
        0
    }

    fn tick(&mut self, cpu: &mut Cpu) {
        if self.rate == 0 || cpu.cycle < self.next {
            return;
        }
        self.ticks = self.ticks.wrapping_add(1);
        self.next = self.next_tick(cpu.cycle);
        if self.message != 0 {
            cpu.interrupt(self.message);
        }
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::CpuConfig;

    #[test]
    fn clock_counts_ticks_at_its_rate() {
        let mut cpu = Cpu::new(CpuConfig::default());
        let mut clock = Clock::new();
        cpu.reg[0] = 0;
        cpu.reg[1] = 6;
        clock.interrupt(&mut cpu);

        cpu.cycle = 9_999;
        clock.tick(&mut cpu);
        assert_eq!(clock.ticks(), 0);
        cpu.cycle = 10_000;
        clock.tick(&mut cpu);
        assert_eq!(clock.ticks(), 1);
        assert_eq!(cpu.pending_interrupts(), 0);

        cpu.reg[0] = 1;
        clock.interrupt(&mut cpu);
        assert_eq!(cpu.reg[2], 1);
    }

    #[test]
    fn clock_raises_its_message() {
        let mut cpu = Cpu::new(CpuConfig::default());
        let mut clock = Clock::new();
        cpu.reg = [2, 0x42, 0, 0, 0, 0, 0, 0];
        clock.interrupt(&mut cpu);
        cpu.reg = [0, 1, 0, 0, 0, 0, 0, 0];
        clock.interrupt(&mut cpu);
        cpu.cycle = CPU_HZ;
        clock.tick(&mut cpu);
        assert_eq!(cpu.pending_interrupts(), 1);

        clock.reset();
        cpu.cycle *= 4;
        clock.tick(&mut cpu);
        assert_eq!(clock.ticks(), 0);
    }
}
