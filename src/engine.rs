use crate::cpu::{Cpu, CpuConfig, Step};
use crate::hardware::{Clock, Device};

/// Host-facing call surface of an execution backend. Any backend must
/// match the reference `Dcpu` bit for bit.
pub trait Engine {
    /// Resets, then copies `words` to address 0.
    fn load(&mut self, words: &[u16]);
    fn reset(&mut self);
    fn step(&mut self) -> Step;
    fn cpu(&self) -> &Cpu;

    fn n_steps(&mut self, count: u64) {
        for _ in 0..count {
            self.step();
        }
    }

    /// Steps until the cycle counter has advanced by at least `count`.
    fn n_cycles(&mut self, count: u64) {
        let target = self.cpu().cycle + count;
        while self.cpu().cycle < target {
            self.step();
        }
    }

    fn memory(&self) -> &[u16] {
        self.cpu().ram.as_slice()
    }
}

/// Reference engine: a CPU plus its attached devices.
pub struct Dcpu {
    cpu: Cpu,
    devices: Vec<Box<dyn Device>>,
}

impl Dcpu {
    pub fn new(cfg: CpuConfig) -> Self {
        let mut devices: Vec<Box<dyn Device>> = Vec::new();
        if cfg.clock {
            devices.push(Box::new(Clock::new()));
        }
        Self { cpu: Cpu::new(cfg), devices }
    }

    /// Attaches a device at the next hardware index.
    pub fn attach(&mut self, device: Box<dyn Device>) -> usize {
        self.devices.push(device);
        self.devices.len() - 1
    }

    pub fn devices(&self) -> &[Box<dyn Device>] {
        &self.devices
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }
}

impl Default for Dcpu {
    fn default() -> Self {
        Self::new(CpuConfig::default())
    }
}

impl Engine for Dcpu {
    fn load(&mut self, words: &[u16]) {
        self.reset();
        self.cpu.ram.load(words);
    }

    fn reset(&mut self) {
        self.cpu.reset();
        for dev in &mut self.devices {
            dev.reset();
        }
    }

    fn step(&mut self) -> Step {
        self.cpu.step(&mut self.devices)
    }

    fn cpu(&self) -> &Cpu {
        &self.cpu
    }
}
